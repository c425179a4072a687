//! Compiled codecs.
//!
//! A [`Codec`] is what a [`Shape`](crate::Shape) compiles to: a tree of encoding
//! instructions specialised to one type. Codecs are built by the
//! [`CodecCache`](crate::CodecCache), immutable afterwards and shared as `Arc<Codec>`.
use {
    crate::{
        complex::{Complex32, Complex64},
        decoder::Decoder,
        encoder::Encoder,
        error::{integer_overflow, ReadError, ReadResult, WriteError},
        io::{Reader, Writer},
        shape::{
            BytesVTable, MapVTable, PointerVTable, PtrConst, PtrMut, ScalarKind, SequenceVTable,
        },
    },
    core::fmt,
    std::sync::{Arc, OnceLock},
};

pub enum Codec {
    Scalar(ScalarKind),
    /// `Vec<u8>` and friends, copied as a single block.
    Bytes(BytesCodec),
    Struct(StructCodec),
    Sequence(SequenceCodec),
    Array(ArrayCodec),
    Map(MapCodec),
    Pointer(PointerCodec),
    /// A type reached again through an indirection while it was being built.
    Recursive(RecursiveCodec),
}

pub struct BytesCodec {
    pub(crate) vtable: &'static BytesVTable,
}

pub struct FieldCodec {
    pub(crate) name: &'static str,
    pub(crate) offset: usize,
    pub(crate) codec: Arc<Codec>,
}

pub struct StructCodec {
    pub(crate) fields: Box<[FieldCodec]>,
}

pub struct SequenceCodec {
    pub(crate) vtable: &'static SequenceVTable,
    pub(crate) element: Arc<Codec>,
    pub(crate) element_size: usize,
}

pub struct ArrayCodec {
    pub(crate) element: Arc<Codec>,
    pub(crate) len: usize,
    pub(crate) stride: usize,
}

pub struct MapCodec {
    pub(crate) vtable: &'static MapVTable,
    pub(crate) key: Arc<Codec>,
    pub(crate) value: Arc<Codec>,
    pub(crate) entry_size: usize,
}

pub struct PointerCodec {
    pub(crate) vtable: &'static PointerVTable,
    pub(crate) pointee: Arc<Codec>,
    pub(crate) nullable: bool,
}

pub struct RecursiveCodec {
    pub(crate) type_name: &'static str,
    /// Filled once the codec of `type_name` is built.
    pub(crate) target: Arc<OnceLock<Arc<Codec>>>,
}

impl StructCodec {
    /// Names of the encoded fields, in wire order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }
}

impl SequenceCodec {
    pub fn element(&self) -> &Codec {
        &self.element
    }
}

impl ArrayCodec {
    pub fn element(&self) -> &Codec {
        &self.element
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl MapCodec {
    pub fn key(&self) -> &Codec {
        &self.key
    }

    pub fn value(&self) -> &Codec {
        &self.value
    }
}

impl PointerCodec {
    pub fn pointee(&self) -> &Codec {
        &self.pointee
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

impl RecursiveCodec {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The codec this refers back to, once resolved.
    pub fn target(&self) -> Option<&Arc<Codec>> {
        self.target.get()
    }
}

#[inline]
unsafe fn read<T: Copy>(src: PtrConst) -> T {
    // SAFETY: caller guarantees `src` points to a `T`.
    unsafe { *src.cast::<T>() }
}

#[inline]
unsafe fn write<T>(dst: PtrMut, val: T) {
    // SAFETY: caller guarantees `dst` points to a uniquely borrowed `T`.
    unsafe { *dst.cast::<T>() = val }
}

/// Narrow a decoded integer into a target type, rejecting values that don't fit.
#[inline]
fn narrow<T, U>(val: U) -> ReadResult<T>
where
    T: TryFrom<U>,
{
    T::try_from(val).map_err(|_| integer_overflow(core::any::type_name::<T>()))
}

impl Codec {
    /// Write the value at `src`.
    ///
    /// Failures are latched on the encoder.
    ///
    /// # Safety
    ///
    /// `src` must point to a live value of the type this codec was built for.
    pub(crate) unsafe fn encode_to<W: Writer>(&self, enc: &mut Encoder<'_, W>, src: PtrConst) {
        if enc.is_poisoned() {
            return;
        }
        // SAFETY: every pointer handed down is derived from `src` through the shape this
        // codec was built from.
        unsafe {
            match self {
                Codec::Scalar(kind) => encode_scalar(*kind, enc, src),
                Codec::Bytes(codec) => enc.write_bytes(&*(codec.vtable.as_bytes)(src)),
                Codec::Struct(codec) => {
                    for field in codec.fields.iter() {
                        field.codec.encode_to(enc, src.add(field.offset));
                    }
                }
                Codec::Sequence(codec) => {
                    enc.write_uvarint((codec.vtable.len)(src) as u64);
                    (codec.vtable.for_each)(src, &mut |item| codec.element.encode_to(enc, item));
                }
                Codec::Array(codec) => {
                    for i in 0..codec.len {
                        codec.element.encode_to(enc, src.add(i * codec.stride));
                    }
                }
                Codec::Map(codec) => {
                    enc.write_uvarint((codec.vtable.len)(src) as u64);
                    (codec.vtable.for_each)(src, &mut |key, value| {
                        codec.key.encode_to(enc, key);
                        codec.value.encode_to(enc, value);
                    });
                }
                Codec::Pointer(codec) => match (codec.vtable.get)(src) {
                    Some(pointee) => {
                        if codec.nullable {
                            enc.write_bool(true);
                        }
                        codec.pointee.encode_to(enc, pointee);
                    }
                    None => enc.write_bool(false),
                },
                Codec::Recursive(codec) => {
                    let Some(target) = codec.target.get() else {
                        enc.fail(WriteError::Custom("recursive codec used before it was built"));
                        return;
                    };
                    target.encode_to(enc, src);
                }
            }
        }
    }

    /// Decode into the value at `dst`, in place.
    ///
    /// # Safety
    ///
    /// `dst` must point to an initialized, uniquely borrowed value of the type this codec was
    /// built for.
    pub(crate) unsafe fn decode_to<R: Reader>(
        &self,
        dec: &mut Decoder<'_, R>,
        dst: PtrMut,
    ) -> ReadResult<()> {
        // SAFETY: every pointer handed down is derived from `dst` through the shape this
        // codec was built from.
        unsafe {
            match self {
                Codec::Scalar(kind) => decode_scalar(*kind, dec, dst),
                Codec::Bytes(codec) => dec.read_prefixed_bytes(|bytes| {
                    (codec.vtable.replace)(dst, bytes);
                    Ok(())
                }),
                Codec::Struct(codec) => {
                    for field in codec.fields.iter() {
                        field.codec.decode_to(dec, dst.add(field.offset))?;
                    }
                    Ok(())
                }
                Codec::Sequence(codec) => {
                    let len = dec.read_len(codec.element_size)?;
                    (codec.vtable.rebuild)(dst, len, &mut |item| {
                        codec.element.decode_to(dec, item)
                    })
                }
                Codec::Array(codec) => {
                    for i in 0..codec.len {
                        codec.element.decode_to(dec, dst.add(i * codec.stride))?;
                    }
                    Ok(())
                }
                Codec::Map(codec) => {
                    let len = dec.read_len(codec.entry_size)?;
                    (codec.vtable.rebuild)(dst, len, &mut |key, value| {
                        codec.key.decode_to(dec, key)?;
                        codec.value.decode_to(dec, value)
                    })
                }
                Codec::Pointer(codec) => {
                    if codec.nullable && !dec.read_bool()? {
                        (codec.vtable.clear)(dst);
                        return Ok(());
                    }
                    (codec.vtable.emplace)(dst, &mut |pointee| {
                        codec.pointee.decode_to(dec, pointee)
                    })
                }
                Codec::Recursive(codec) => {
                    let Some(target) = codec.target.get() else {
                        return Err(ReadError::Custom("recursive codec used before it was built"));
                    };
                    dec.enter()?;
                    let result = target.decode_to(dec, dst);
                    dec.leave();
                    result
                }
            }
        }
    }
}

unsafe fn encode_scalar<W: Writer>(kind: ScalarKind, enc: &mut Encoder<'_, W>, src: PtrConst) {
    // SAFETY: `src` points to a value of the type `kind` stands for.
    unsafe {
        match kind {
            ScalarKind::Bool => enc.write_bool(read(src)),
            ScalarKind::U8 => enc.write_uvarint(u64::from(read::<u8>(src))),
            ScalarKind::U16 => enc.write_uvarint(u64::from(read::<u16>(src))),
            ScalarKind::U32 => enc.write_uvarint(u64::from(read::<u32>(src))),
            ScalarKind::U64 => enc.write_uvarint(read(src)),
            ScalarKind::U128 => enc.write_uvarint128(read(src)),
            ScalarKind::Usize => enc.write_uvarint(read::<usize>(src) as u64),
            ScalarKind::I8 => enc.write_varint(i64::from(read::<i8>(src))),
            ScalarKind::I16 => enc.write_varint(i64::from(read::<i16>(src))),
            ScalarKind::I32 => enc.write_varint(i64::from(read::<i32>(src))),
            ScalarKind::I64 => enc.write_varint(read(src)),
            ScalarKind::I128 => enc.write_varint128(read(src)),
            ScalarKind::Isize => enc.write_varint(read::<isize>(src) as i64),
            ScalarKind::F32 => enc.write_f32(read(src)),
            ScalarKind::F64 => enc.write_f64(read(src)),
            ScalarKind::Char => enc.write_char(read(src)),
            ScalarKind::String => enc.write_str(&*src.cast::<String>()),
            ScalarKind::Complex32 => enc.write_complex_f32(read::<Complex32>(src)),
            ScalarKind::Complex64 => enc.write_complex_f64(read::<Complex64>(src)),
        }
    }
}

unsafe fn decode_scalar<R: Reader>(
    kind: ScalarKind,
    dec: &mut Decoder<'_, R>,
    dst: PtrMut,
) -> ReadResult<()> {
    // SAFETY: `dst` points to a uniquely borrowed value of the type `kind` stands for.
    unsafe {
        match kind {
            ScalarKind::Bool => write(dst, dec.read_bool()?),
            ScalarKind::U8 => write::<u8>(dst, narrow(dec.read_uvarint()?)?),
            ScalarKind::U16 => write::<u16>(dst, narrow(dec.read_uvarint()?)?),
            ScalarKind::U32 => write::<u32>(dst, narrow(dec.read_uvarint()?)?),
            ScalarKind::U64 => write(dst, dec.read_uvarint()?),
            ScalarKind::U128 => write(dst, dec.read_uvarint128()?),
            ScalarKind::Usize => write::<usize>(dst, narrow(dec.read_uvarint()?)?),
            ScalarKind::I8 => write::<i8>(dst, narrow(dec.read_varint()?)?),
            ScalarKind::I16 => write::<i16>(dst, narrow(dec.read_varint()?)?),
            ScalarKind::I32 => write::<i32>(dst, narrow(dec.read_varint()?)?),
            ScalarKind::I64 => write(dst, dec.read_varint()?),
            ScalarKind::I128 => write(dst, dec.read_varint128()?),
            ScalarKind::Isize => write::<isize>(dst, narrow(dec.read_varint()?)?),
            ScalarKind::F32 => write(dst, dec.read_f32()?),
            ScalarKind::F64 => write(dst, dec.read_f64()?),
            ScalarKind::Char => write(dst, dec.read_char()?),
            ScalarKind::String => dec.read_string(&mut *dst.cast::<String>())?,
            ScalarKind::Complex32 => write(dst, dec.read_complex_f32()?),
            ScalarKind::Complex64 => write(dst, dec.read_complex_f64()?),
        }
    }
    Ok(())
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            Codec::Bytes(_) => f.write_str("Bytes"),
            Codec::Struct(codec) => {
                let mut s = f.debug_struct("Struct");
                for field in codec.fields.iter() {
                    s.field(field.name, &field.codec);
                }
                s.finish()
            }
            Codec::Sequence(codec) => f.debug_tuple("Sequence").field(&codec.element).finish(),
            Codec::Array(codec) => f
                .debug_struct("Array")
                .field("element", &codec.element)
                .field("len", &codec.len)
                .finish(),
            Codec::Map(codec) => f
                .debug_struct("Map")
                .field("key", &codec.key)
                .field("value", &codec.value)
                .finish(),
            Codec::Pointer(codec) => f
                .debug_struct("Pointer")
                .field("pointee", &codec.pointee)
                .field("nullable", &codec.nullable)
                .finish(),
            Codec::Recursive(codec) => f.debug_tuple("Recursive").field(&codec.type_name).finish(),
        }
    }
}
