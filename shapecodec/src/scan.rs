//! Type scanner and codec cache.
//!
//! Scanning walks a [`Shape`] once and compiles it into a [`Codec`]. Every codec built along
//! the way is memoized in a [`CodecCache`] keyed by [`TypeId`], so each type is scanned at
//! most once per cache (modulo races, where the first writer wins).
use {
    crate::{
        codec::{
            ArrayCodec, BytesCodec, Codec, FieldCodec, MapCodec, PointerCodec, RecursiveCodec,
            SequenceCodec, StructCodec,
        },
        error::UnsupportedType,
        shape::{Def, Reflect, Shape},
    },
    core::{any::TypeId, fmt},
    dashmap::DashMap,
    std::{
        collections::HashMap,
        sync::{Arc, LazyLock, OnceLock},
    },
    tracing::debug,
};

static GLOBAL: LazyLock<CodecCache> = LazyLock::new(CodecCache::new);

/// Concurrent map from type to compiled codec.
///
/// Lazily populated, never evicted. Scans are transactional: the codecs built while scanning a
/// type are only published once the whole type has been compiled, so a failed scan leaves the
/// cache as it was.
///
/// ```
/// use shapecodec::{Codec, CodecCache, Reflect};
///
/// let cache = CodecCache::new();
/// let codec = cache.scan::<Vec<u8>>().unwrap();
/// assert!(matches!(*codec, Codec::Bytes(_)));
/// assert!(cache.contains::<Vec<u8>>());
/// ```
///
/// Codecs are only ever compiled from [`Reflect::SHAPE`], so a cached codec always matches the
/// layout of the type it is keyed by.
#[derive(Default)]
pub struct CodecCache {
    codecs: DashMap<TypeId, Arc<Codec>>,
}

impl CodecCache {
    pub fn new() -> Self {
        Self {
            codecs: DashMap::new(),
        }
    }

    /// The process-wide cache used by [`Encoder::new`](crate::Encoder::new),
    /// [`Decoder::new`](crate::Decoder::new) and the pools.
    pub fn global() -> &'static CodecCache {
        &GLOBAL
    }

    /// Return the codec for `T`, compiling and publishing it on first use.
    ///
    /// Only `T`'s own shape can be compiled; a hand-built [`Shape`] is not accepted.
    ///
    /// ```compile_fail
    /// use shapecodec::{CodecCache, Def, ScalarKind, Shape};
    ///
    /// static WIDE_U8: Shape = Shape::of::<u8>(Def::Scalar(ScalarKind::U64));
    /// CodecCache::new().scan(&WIDE_U8).unwrap();
    /// ```
    pub fn scan<T: Reflect>(&self) -> Result<Arc<Codec>, UnsupportedType> {
        // SAFETY: `T::SHAPE` describes `T`, as `Reflect` requires.
        unsafe { self.scan_shape(T::SHAPE) }
    }

    /// Shape-taking form of [`CodecCache::scan`].
    ///
    /// # Safety
    ///
    /// `shape` must describe the type it identifies the way its `Reflect::SHAPE` would. The
    /// resulting codec is cached under that type for every later user of the cache.
    pub(crate) unsafe fn scan_shape(
        &self,
        shape: &'static Shape,
    ) -> Result<Arc<Codec>, UnsupportedType> {
        let id = shape.type_id();
        if let Some(codec) = self.codecs.get(&id) {
            return Ok(Arc::clone(codec.value()));
        }

        let mut scanner = Scanner::new(self);
        let root = match scanner.build(shape) {
            Ok(root) => root,
            Err(err) => {
                debug!(type_name = shape.type_name(), %err, "scan failed");
                return Err(err);
            }
        };

        let published = scanner.built.len();
        for (built_id, codec) in scanner.built {
            if built_id != id {
                self.codecs.entry(built_id).or_insert(codec);
            }
        }
        let winner = Arc::clone(self.codecs.entry(id).or_insert(root).value());
        debug!(
            type_name = shape.type_name(),
            codecs = published,
            "published codecs"
        );
        Ok(winner)
    }

    pub fn contains<T: Reflect>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl fmt::Debug for CodecCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecCache")
            .field("len", &self.codecs.len())
            .finish()
    }
}

/// A type whose codec is being built.
struct Frame {
    id: TypeId,
    /// Indirections crossed when the frame was entered.
    indirection: usize,
    slot: Arc<OnceLock<Arc<Codec>>>,
}

/// State of one top-level scan.
struct Scanner<'a> {
    cache: &'a CodecCache,
    built: HashMap<TypeId, Arc<Codec>>,
    in_progress: Vec<Frame>,
    indirection: usize,
}

impl<'a> Scanner<'a> {
    fn new(cache: &'a CodecCache) -> Self {
        Self {
            cache,
            built: HashMap::new(),
            in_progress: Vec::new(),
            indirection: 0,
        }
    }

    fn build(&mut self, shape: &'static Shape) -> Result<Arc<Codec>, UnsupportedType> {
        let id = shape.type_id();
        if let Some(codec) = self.cache.codecs.get(&id) {
            return Ok(Arc::clone(codec.value()));
        }
        if let Some(codec) = self.built.get(&id) {
            return Ok(Arc::clone(codec));
        }
        if let Some(frame) = self.in_progress.iter().rev().find(|frame| frame.id == id) {
            if frame.indirection == self.indirection {
                return Err(UnsupportedType::ByValueCycle(shape.type_name()));
            }
            return Ok(Arc::new(Codec::Recursive(RecursiveCodec {
                type_name: shape.type_name(),
                target: Arc::clone(&frame.slot),
            })));
        }

        self.in_progress.push(Frame {
            id,
            indirection: self.indirection,
            slot: Arc::new(OnceLock::new()),
        });
        let result = self.compile(shape);
        let frame = self.in_progress.pop();
        let codec = Arc::new(result?);
        if let Some(frame) = frame {
            // Unused when nothing referred back to this type.
            let _ = frame.slot.set(Arc::clone(&codec));
        }
        self.built.insert(id, Arc::clone(&codec));
        Ok(codec)
    }

    /// Build through a sequence, map or pointer.
    fn build_indirect(&mut self, shape: &'static Shape) -> Result<Arc<Codec>, UnsupportedType> {
        self.indirection += 1;
        let result = self.build(shape);
        self.indirection -= 1;
        result
    }

    fn compile(&mut self, shape: &'static Shape) -> Result<Codec, UnsupportedType> {
        match shape.def {
            Def::Scalar(kind) => Ok(Codec::Scalar(kind)),
            Def::Struct(def) => {
                let mut fields = Vec::with_capacity(def.fields.len());
                for field in def.fields.iter().filter(|field| field.is_encoded()) {
                    let Some(field_shape) = field.shape else {
                        return Err(UnsupportedType::MissingFieldShape {
                            type_name: shape.type_name(),
                            field: field.name,
                        });
                    };
                    fields.push(FieldCodec {
                        name: field.name,
                        offset: field.offset,
                        codec: self.build(field_shape())?,
                    });
                }
                Ok(Codec::Struct(StructCodec {
                    fields: fields.into_boxed_slice(),
                }))
            }
            Def::Sequence(def) => {
                let element = (def.element)();
                if let Some(vtable) = def.bytes.filter(|_| element.is::<u8>()) {
                    return Ok(Codec::Bytes(BytesCodec { vtable }));
                }
                Ok(Codec::Sequence(SequenceCodec {
                    vtable: def.vtable,
                    element: self.build_indirect(element)?,
                    element_size: element.layout.size(),
                }))
            }
            Def::Array(def) => {
                let element = (def.element)();
                Ok(Codec::Array(ArrayCodec {
                    element: self.build(element)?,
                    len: def.len,
                    stride: element.layout.size(),
                }))
            }
            Def::Map(def) => {
                let (key, value) = ((def.key)(), (def.value)());
                Ok(Codec::Map(MapCodec {
                    vtable: def.vtable,
                    key: self.build_indirect(key)?,
                    value: self.build_indirect(value)?,
                    entry_size: key.layout.size() + value.layout.size(),
                }))
            }
            Def::Pointer(def) => Ok(Codec::Pointer(PointerCodec {
                vtable: def.vtable,
                pointee: self.build_indirect((def.pointee)())?,
                nullable: def.nullable,
            })),
            Def::Opaque => Err(UnsupportedType::Opaque(shape.type_name())),
        }
    }
}
