//! Type descriptors.
//!
//! A [`Shape`] is a `'static`, immutable description of a Rust type: its identity, its
//! layout, and enough type-erased operations ([vtables](SequenceVTable)) for a
//! [`Codec`](crate::Codec) to walk and rebuild values of the type without knowing it
//! statically.
//!
//! Shapes are produced by [`Reflect`]. The library implements it for primitives, strings,
//! collections, smart pointers, arrays and tuples; structs get it from
//! `#[derive(Reflect)]`.
//!
//! Nested shapes are referenced lazily, through `fn() -> &'static Shape`, so a type can
//! describe itself:
//!
//! ```
//! # #[cfg(feature = "derive")] {
//! use shapecodec::{Def, Reflect};
//!
//! #[derive(Reflect, Default)]
//! pub struct Node {
//!     pub value: u32,
//!     pub children: Vec<Node>,
//! }
//!
//! let Def::Struct(def) = Node::SHAPE.def else { unreachable!() };
//! assert_eq!(def.fields.len(), 2);
//! assert_eq!(def.fields[1].name, "children");
//! # }
//! ```
use {
    crate::error::ReadResult,
    core::{alloc::Layout, any::TypeId, fmt},
};

mod impls;

/// Type-erased pointer to an initialized value.
pub type PtrConst = *const u8;
/// Type-erased pointer to an initialized, uniquely borrowed value.
pub type PtrMut = *mut u8;

/// Types with a [`Shape`].
///
/// # Safety
///
/// [`Reflect::SHAPE`] must describe `Self` exactly: the layout must be `Layout::new::<Self>()`,
/// every field offset must be the offset of that field within `Self` and carry the field's
/// own shape, and every vtable must operate on values of `Self`. Codecs read and write
/// through these descriptions with raw pointers.
pub unsafe trait Reflect: Sized + 'static {
    const SHAPE: &'static Shape;

    /// The value decoding starts from when a fresh `Self` is needed.
    fn zeroed() -> Self;
}

/// [`Reflect::SHAPE`] as a function, for lazily referencing nested shapes.
#[inline]
pub const fn shape_of<T: Reflect>() -> &'static Shape {
    T::SHAPE
}

/// Description of a type.
pub struct Shape {
    pub id: fn() -> TypeId,
    pub type_name: fn() -> &'static str,
    pub layout: Layout,
    pub def: Def,
}

impl Shape {
    /// Shape header for `T`, paired with `def`.
    pub const fn of<T: 'static>(def: Def) -> Self {
        Self {
            id: TypeId::of::<T>,
            type_name: core::any::type_name::<T>,
            layout: Layout::new::<T>(),
            def,
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        (self.id)()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id() == TypeId::of::<T>()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type_name", &self.type_name())
            .field("layout", &self.layout)
            .field("def", &self.def)
            .finish()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for Shape {}

/// What kind of type a [`Shape`] describes.
#[derive(Debug, Clone, Copy)]
pub enum Def {
    Scalar(ScalarKind),
    Struct(StructDef),
    Sequence(SequenceDef),
    Array(ArrayDef),
    Map(MapDef),
    Pointer(PointerDef),
    /// A type with no binary representation.
    Opaque,
}

/// Types encoded by a single primitive protocol call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    F32,
    F64,
    Char,
    String,
    Complex32,
    Complex64,
}

#[derive(Debug, Clone, Copy)]
pub struct StructDef {
    /// Fields in declaration order.
    pub fields: &'static [Field],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    /// Byte offset of the field within its struct.
    pub offset: usize,
    /// `None` for fields that are never encoded.
    pub shape: Option<fn() -> &'static Shape>,
    pub visibility: Visibility,
    /// Set by `#[shapecodec(skip)]`.
    pub skip: bool,
}

impl Field {
    /// Whether the field takes part in the encoding.
    pub const fn is_encoded(&self) -> bool {
        matches!(self.visibility, Visibility::Public) && !self.skip
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("shape", &self.shape.map(|shape| shape().type_name()))
            .field("visibility", &self.visibility)
            .field("skip", &self.skip)
            .finish()
    }
}

/// Element callback handed to [`SequenceVTable::for_each`].
pub type VisitElement<'a> = &'a mut dyn FnMut(PtrConst);
/// Element callback handed to [`SequenceVTable::rebuild`]; decodes into the given element.
pub type FillElement<'a> = &'a mut dyn FnMut(PtrMut) -> ReadResult<()>;
/// Entry callback handed to [`MapVTable::for_each`].
pub type VisitEntry<'a> = &'a mut dyn FnMut(PtrConst, PtrConst);
/// Entry callback handed to [`MapVTable::rebuild`]; decodes into the given key and value.
pub type FillEntry<'a> = &'a mut dyn FnMut(PtrMut, PtrMut) -> ReadResult<()>;

/// Operations on a variable-length collection.
///
/// All functions take a pointer to the collection itself.
pub struct SequenceVTable {
    pub len: unsafe fn(PtrConst) -> usize,
    /// Visit every element in iteration order.
    pub for_each: unsafe fn(PtrConst, VisitElement<'_>),
    /// Make the collection hold `len` elements, each filled by the callback in order.
    ///
    /// Collections that can be indexed reuse existing elements in place; others are
    /// rebuilt from zeroed elements.
    pub rebuild: unsafe fn(PtrMut, usize, FillElement<'_>) -> ReadResult<()>,
}

/// Raw byte access for collections of `u8`.
pub struct BytesVTable {
    pub as_bytes: unsafe fn(PtrConst) -> *const [u8],
    pub replace: unsafe fn(PtrMut, &[u8]),
}

#[derive(Clone, Copy)]
pub struct SequenceDef {
    pub element: fn() -> &'static Shape,
    pub vtable: &'static SequenceVTable,
    /// Only consulted when the element is `u8`.
    pub bytes: Option<&'static BytesVTable>,
}

impl fmt::Debug for SequenceDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceDef")
            .field("element", &(self.element)().type_name())
            .field("bytes", &self.bytes.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy)]
pub struct ArrayDef {
    pub element: fn() -> &'static Shape,
    pub len: usize,
}

impl fmt::Debug for ArrayDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayDef")
            .field("element", &(self.element)().type_name())
            .field("len", &self.len)
            .finish()
    }
}

pub struct MapVTable {
    pub len: unsafe fn(PtrConst) -> usize,
    pub for_each: unsafe fn(PtrConst, VisitEntry<'_>),
    /// Replace the map with `len` entries, each filled by the callback in order.
    pub rebuild: unsafe fn(PtrMut, usize, FillEntry<'_>) -> ReadResult<()>,
}

#[derive(Clone, Copy)]
pub struct MapDef {
    pub key: fn() -> &'static Shape,
    pub value: fn() -> &'static Shape,
    pub vtable: &'static MapVTable,
}

impl fmt::Debug for MapDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapDef")
            .field("key", &(self.key)().type_name())
            .field("value", &(self.value)().type_name())
            .finish_non_exhaustive()
    }
}

pub struct PointerVTable {
    /// The pointee, or `None` when absent.
    pub get: unsafe fn(PtrConst) -> Option<PtrConst>,
    /// Make the pointer absent. Only called on nullable pointers.
    pub clear: unsafe fn(PtrMut),
    /// Hand a uniquely owned pointee to the callback, reusing the current one when possible
    /// and otherwise starting from a zeroed value.
    pub emplace: unsafe fn(PtrMut, FillElement<'_>) -> ReadResult<()>,
}

#[derive(Clone, Copy)]
pub struct PointerDef {
    pub pointee: fn() -> &'static Shape,
    pub vtable: &'static PointerVTable,
    /// Whether the pointer can be absent.
    pub nullable: bool,
}

impl fmt::Debug for PointerDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerDef")
            .field("pointee", &(self.pointee)().type_name())
            .field("nullable", &self.nullable)
            .finish_non_exhaustive()
    }
}
