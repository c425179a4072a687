//! [`Reflect`] for std types.
use {
    super::*,
    crate::complex::Complex,
    core::{any::Any, hash::BuildHasher, hash::Hash, marker::PhantomData, mem::offset_of, ptr},
    std::{
        collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
        rc::Rc,
        sync::{mpsc, Arc},
    },
};

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            unsafe impl Reflect for $ty {
                const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Scalar(ScalarKind::$kind));

                #[inline]
                fn zeroed() -> Self {
                    Default::default()
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    Complex<f32> => Complex32,
    Complex<f64> => Complex64,
}

/// Raw byte access shared by every `Vec<T>` shape; only valid when `T` is `u8`.
const VEC_U8_BYTES: BytesVTable = BytesVTable {
    as_bytes: vec_u8_as_bytes,
    replace: vec_u8_replace,
};

unsafe fn vec_u8_as_bytes(ptr: PtrConst) -> *const [u8] {
    // SAFETY: caller guarantees `ptr` points to a `Vec<u8>`.
    let vec = unsafe { &*ptr.cast::<Vec<u8>>() };
    ptr::slice_from_raw_parts(vec.as_ptr(), vec.len())
}

unsafe fn vec_u8_replace(ptr: PtrMut, bytes: &[u8]) {
    // SAFETY: caller guarantees `ptr` points to a uniquely borrowed `Vec<u8>`.
    let vec = unsafe { &mut *ptr.cast::<Vec<u8>>() };
    vec.clear();
    vec.extend_from_slice(bytes);
}

/// Sequence operations for collections that can be resized and indexed in place.
macro_rules! impl_indexed_sequence {
    ($ops:ident, $collection:ident, $bytes:expr) => {
        struct $ops<T>(PhantomData<T>);

        impl<T: Reflect> $ops<T> {
            const VTABLE: SequenceVTable = SequenceVTable {
                len: Self::len,
                for_each: Self::for_each,
                rebuild: Self::rebuild,
            };

            unsafe fn len(ptr: PtrConst) -> usize {
                // SAFETY: `ptr` points to the collection this vtable belongs to.
                unsafe { &*ptr.cast::<$collection<T>>() }.len()
            }

            unsafe fn for_each(ptr: PtrConst, visit: VisitElement<'_>) {
                // SAFETY: `ptr` points to the collection this vtable belongs to.
                let collection = unsafe { &*ptr.cast::<$collection<T>>() };
                for item in collection.iter() {
                    visit(ptr::from_ref(item).cast());
                }
            }

            unsafe fn rebuild(ptr: PtrMut, len: usize, fill: FillElement<'_>) -> ReadResult<()> {
                // SAFETY: `ptr` points to a uniquely borrowed collection of this type.
                let collection = unsafe { &mut *ptr.cast::<$collection<T>>() };
                collection.truncate(len);
                collection.resize_with(len, T::zeroed);
                for item in collection.iter_mut() {
                    fill(ptr::from_mut(item).cast())?;
                }
                Ok(())
            }
        }

        unsafe impl<T: Reflect> Reflect for $collection<T> {
            const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Sequence(SequenceDef {
                element: shape_of::<T>,
                vtable: &$ops::<T>::VTABLE,
                bytes: $bytes,
            }));

            #[inline]
            fn zeroed() -> Self {
                $collection::new()
            }
        }
    };
}

impl_indexed_sequence!(VecOps, Vec, Some(&VEC_U8_BYTES));
impl_indexed_sequence!(VecDequeOps, VecDeque, None);

struct HashSetOps<T, S>(PhantomData<(T, S)>);

impl<T, S> HashSetOps<T, S>
where
    T: Reflect + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    const VTABLE: SequenceVTable = SequenceVTable {
        len: Self::len,
        for_each: Self::for_each,
        rebuild: Self::rebuild,
    };

    unsafe fn len(ptr: PtrConst) -> usize {
        // SAFETY: `ptr` points to the set this vtable belongs to.
        unsafe { &*ptr.cast::<HashSet<T, S>>() }.len()
    }

    unsafe fn for_each(ptr: PtrConst, visit: VisitElement<'_>) {
        // SAFETY: `ptr` points to the set this vtable belongs to.
        for item in unsafe { &*ptr.cast::<HashSet<T, S>>() } {
            visit(ptr::from_ref(item).cast());
        }
    }

    unsafe fn rebuild(ptr: PtrMut, len: usize, fill: FillElement<'_>) -> ReadResult<()> {
        let mut set = HashSet::with_capacity_and_hasher(len, S::default());
        for _ in 0..len {
            let mut item = T::zeroed();
            fill(ptr::from_mut(&mut item).cast())?;
            set.insert(item);
        }
        // SAFETY: `ptr` points to a uniquely borrowed set of this type.
        unsafe { *ptr.cast::<HashSet<T, S>>() = set };
        Ok(())
    }
}

unsafe impl<T, S> Reflect for HashSet<T, S>
where
    T: Reflect + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Sequence(SequenceDef {
        element: shape_of::<T>,
        vtable: &HashSetOps::<T, S>::VTABLE,
        bytes: None,
    }));

    #[inline]
    fn zeroed() -> Self {
        HashSet::with_hasher(S::default())
    }
}

struct BTreeSetOps<T>(PhantomData<T>);

impl<T: Reflect + Ord> BTreeSetOps<T> {
    const VTABLE: SequenceVTable = SequenceVTable {
        len: Self::len,
        for_each: Self::for_each,
        rebuild: Self::rebuild,
    };

    unsafe fn len(ptr: PtrConst) -> usize {
        // SAFETY: `ptr` points to the set this vtable belongs to.
        unsafe { &*ptr.cast::<BTreeSet<T>>() }.len()
    }

    unsafe fn for_each(ptr: PtrConst, visit: VisitElement<'_>) {
        // SAFETY: `ptr` points to the set this vtable belongs to.
        for item in unsafe { &*ptr.cast::<BTreeSet<T>>() } {
            visit(ptr::from_ref(item).cast());
        }
    }

    unsafe fn rebuild(ptr: PtrMut, len: usize, fill: FillElement<'_>) -> ReadResult<()> {
        let mut set = BTreeSet::new();
        for _ in 0..len {
            let mut item = T::zeroed();
            fill(ptr::from_mut(&mut item).cast())?;
            set.insert(item);
        }
        // SAFETY: `ptr` points to a uniquely borrowed set of this type.
        unsafe { *ptr.cast::<BTreeSet<T>>() = set };
        Ok(())
    }
}

unsafe impl<T: Reflect + Ord> Reflect for BTreeSet<T> {
    const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Sequence(SequenceDef {
        element: shape_of::<T>,
        vtable: &BTreeSetOps::<T>::VTABLE,
        bytes: None,
    }));

    #[inline]
    fn zeroed() -> Self {
        BTreeSet::new()
    }
}

struct HashMapOps<K, V, S>(PhantomData<(K, V, S)>);

impl<K, V, S> HashMapOps<K, V, S>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
    S: BuildHasher + Default + 'static,
{
    const VTABLE: MapVTable = MapVTable {
        len: Self::len,
        for_each: Self::for_each,
        rebuild: Self::rebuild,
    };

    unsafe fn len(ptr: PtrConst) -> usize {
        // SAFETY: `ptr` points to the map this vtable belongs to.
        unsafe { &*ptr.cast::<HashMap<K, V, S>>() }.len()
    }

    unsafe fn for_each(ptr: PtrConst, visit: VisitEntry<'_>) {
        // SAFETY: `ptr` points to the map this vtable belongs to.
        for (key, value) in unsafe { &*ptr.cast::<HashMap<K, V, S>>() } {
            visit(ptr::from_ref(key).cast(), ptr::from_ref(value).cast());
        }
    }

    unsafe fn rebuild(ptr: PtrMut, len: usize, fill: FillEntry<'_>) -> ReadResult<()> {
        let mut map = HashMap::with_capacity_and_hasher(len, S::default());
        for _ in 0..len {
            let (mut key, mut value) = (K::zeroed(), V::zeroed());
            fill(ptr::from_mut(&mut key).cast(), ptr::from_mut(&mut value).cast())?;
            map.insert(key, value);
        }
        // SAFETY: `ptr` points to a uniquely borrowed map of this type.
        unsafe { *ptr.cast::<HashMap<K, V, S>>() = map };
        Ok(())
    }
}

unsafe impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
    S: BuildHasher + Default + 'static,
{
    const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Map(MapDef {
        key: shape_of::<K>,
        value: shape_of::<V>,
        vtable: &HashMapOps::<K, V, S>::VTABLE,
    }));

    #[inline]
    fn zeroed() -> Self {
        HashMap::with_hasher(S::default())
    }
}

struct BTreeMapOps<K, V>(PhantomData<(K, V)>);

impl<K: Reflect + Ord, V: Reflect> BTreeMapOps<K, V> {
    const VTABLE: MapVTable = MapVTable {
        len: Self::len,
        for_each: Self::for_each,
        rebuild: Self::rebuild,
    };

    unsafe fn len(ptr: PtrConst) -> usize {
        // SAFETY: `ptr` points to the map this vtable belongs to.
        unsafe { &*ptr.cast::<BTreeMap<K, V>>() }.len()
    }

    unsafe fn for_each(ptr: PtrConst, visit: VisitEntry<'_>) {
        // SAFETY: `ptr` points to the map this vtable belongs to.
        for (key, value) in unsafe { &*ptr.cast::<BTreeMap<K, V>>() } {
            visit(ptr::from_ref(key).cast(), ptr::from_ref(value).cast());
        }
    }

    unsafe fn rebuild(ptr: PtrMut, len: usize, fill: FillEntry<'_>) -> ReadResult<()> {
        let mut map = BTreeMap::new();
        for _ in 0..len {
            let (mut key, mut value) = (K::zeroed(), V::zeroed());
            fill(ptr::from_mut(&mut key).cast(), ptr::from_mut(&mut value).cast())?;
            map.insert(key, value);
        }
        // SAFETY: `ptr` points to a uniquely borrowed map of this type.
        unsafe { *ptr.cast::<BTreeMap<K, V>>() = map };
        Ok(())
    }
}

unsafe impl<K: Reflect + Ord, V: Reflect> Reflect for BTreeMap<K, V> {
    const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Map(MapDef {
        key: shape_of::<K>,
        value: shape_of::<V>,
        vtable: &BTreeMapOps::<K, V>::VTABLE,
    }));

    #[inline]
    fn zeroed() -> Self {
        BTreeMap::new()
    }
}

struct OptionOps<T>(PhantomData<T>);

impl<T: Reflect> OptionOps<T> {
    const VTABLE: PointerVTable = PointerVTable {
        get: Self::get,
        clear: Self::clear,
        emplace: Self::emplace,
    };

    unsafe fn get(ptr: PtrConst) -> Option<PtrConst> {
        // SAFETY: `ptr` points to an `Option<T>`.
        unsafe { &*ptr.cast::<Option<T>>() }
            .as_ref()
            .map(|value| ptr::from_ref(value).cast())
    }

    unsafe fn clear(ptr: PtrMut) {
        // SAFETY: `ptr` points to a uniquely borrowed `Option<T>`.
        unsafe { *ptr.cast::<Option<T>>() = None };
    }

    unsafe fn emplace(ptr: PtrMut, fill: FillElement<'_>) -> ReadResult<()> {
        // SAFETY: `ptr` points to a uniquely borrowed `Option<T>`.
        let option = unsafe { &mut *ptr.cast::<Option<T>>() };
        fill(ptr::from_mut(option.get_or_insert_with(T::zeroed)).cast())
    }
}

unsafe impl<T: Reflect> Reflect for Option<T> {
    const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Pointer(PointerDef {
        pointee: shape_of::<T>,
        vtable: &OptionOps::<T>::VTABLE,
        nullable: true,
    }));

    #[inline]
    fn zeroed() -> Self {
        None
    }
}

/// Pointers that are never absent. `clear` is a no-op for them.
unsafe fn never_absent(_: PtrMut) {}

struct BoxOps<T>(PhantomData<T>);

impl<T: Reflect> BoxOps<T> {
    const VTABLE: PointerVTable = PointerVTable {
        get: Self::get,
        clear: never_absent,
        emplace: Self::emplace,
    };

    unsafe fn get(ptr: PtrConst) -> Option<PtrConst> {
        // SAFETY: `ptr` points to a `Box<T>`.
        let boxed = unsafe { &*ptr.cast::<Box<T>>() };
        Some(ptr::from_ref(&**boxed).cast())
    }

    unsafe fn emplace(ptr: PtrMut, fill: FillElement<'_>) -> ReadResult<()> {
        // SAFETY: `ptr` points to a uniquely borrowed `Box<T>`.
        let boxed = unsafe { &mut *ptr.cast::<Box<T>>() };
        fill(ptr::from_mut(&mut **boxed).cast())
    }
}

unsafe impl<T: Reflect> Reflect for Box<T> {
    const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Pointer(PointerDef {
        pointee: shape_of::<T>,
        vtable: &BoxOps::<T>::VTABLE,
        nullable: false,
    }));

    #[inline]
    fn zeroed() -> Self {
        Box::new(T::zeroed())
    }
}

/// Shared-ownership pointers: decode in place when uniquely owned, otherwise decode a fresh
/// value and swap it in.
macro_rules! impl_shared_pointer {
    ($ops:ident, $pointer:ident) => {
        struct $ops<T>(PhantomData<T>);

        impl<T: Reflect> $ops<T> {
            const VTABLE: PointerVTable = PointerVTable {
                get: Self::get,
                clear: never_absent,
                emplace: Self::emplace,
            };

            unsafe fn get(ptr: PtrConst) -> Option<PtrConst> {
                // SAFETY: `ptr` points to a pointer of this type.
                let shared = unsafe { &*ptr.cast::<$pointer<T>>() };
                Some(ptr::from_ref(&**shared).cast())
            }

            unsafe fn emplace(ptr: PtrMut, fill: FillElement<'_>) -> ReadResult<()> {
                // SAFETY: `ptr` points to a uniquely borrowed pointer of this type.
                let shared = unsafe { &mut *ptr.cast::<$pointer<T>>() };
                if let Some(value) = $pointer::get_mut(shared) {
                    return fill(ptr::from_mut(value).cast());
                }
                let mut value = T::zeroed();
                fill(ptr::from_mut(&mut value).cast())?;
                *shared = $pointer::new(value);
                Ok(())
            }
        }

        unsafe impl<T: Reflect> Reflect for $pointer<T> {
            const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Pointer(PointerDef {
                pointee: shape_of::<T>,
                vtable: &$ops::<T>::VTABLE,
                nullable: false,
            }));

            #[inline]
            fn zeroed() -> Self {
                $pointer::new(T::zeroed())
            }
        }
    };
}

impl_shared_pointer!(ArcOps, Arc);
impl_shared_pointer!(RcOps, Rc);

unsafe impl<T: Reflect, const N: usize> Reflect for [T; N] {
    const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Array(ArrayDef {
        element: shape_of::<T>,
        len: N,
    }));

    #[inline]
    fn zeroed() -> Self {
        core::array::from_fn(|_| T::zeroed())
    }
}

unsafe impl Reflect for () {
    const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Struct(StructDef { fields: &[] }));

    #[inline]
    fn zeroed() -> Self {}
}

macro_rules! impl_tuple {
    ($($name:ident : $idx:tt),+) => {
        unsafe impl<$($name: Reflect),+> Reflect for ($($name,)+) {
            const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Struct(StructDef {
                fields: &[$(
                    Field {
                        name: stringify!($idx),
                        offset: offset_of!(Self, $idx),
                        shape: Some(shape_of::<$name>),
                        visibility: Visibility::Public,
                        skip: false,
                    }
                ),+],
            }));

            #[inline]
            fn zeroed() -> Self {
                ($($name::zeroed(),)+)
            }
        }
    };
}

impl_tuple!(A: 0);
impl_tuple!(A: 0, B: 1);
impl_tuple!(A: 0, B: 1, C: 2);
impl_tuple!(A: 0, B: 1, C: 2, D: 3);

macro_rules! impl_opaque {
    ($(<$($gen:ident),*> $ty:ty => $zeroed:expr),* $(,)?) => {
        $(
            unsafe impl<$($gen: 'static),*> Reflect for $ty {
                const SHAPE: &'static Shape = &Shape::of::<Self>(Def::Opaque);

                #[inline]
                fn zeroed() -> Self {
                    $zeroed
                }
            }
        )*
    };
}

impl_opaque! {
    <T> *const T => ptr::null(),
    <T> *mut T => ptr::null_mut(),
    <> Box<dyn Any + Send + Sync> => Box::new(()),
    <T> mpsc::Sender<T> => mpsc::channel().0,
    <T> mpsc::Receiver<T> => mpsc::channel().1,
}
