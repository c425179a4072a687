//! shapecodec is a compact binary serializer driven by type descriptors.
//!
//! Every supported type carries a `'static` [`Shape`] describing its layout. The first time
//! a type is encoded or decoded, its shape is compiled into a [`Codec`] and cached; later
//! calls reuse the cached codec.
//!
//! # Quickstart
//!
//! [`Reflect`] is implemented for primitives, `String`, `Vec`, `VecDeque`, sets, maps,
//! `Option`, `Box`, `Arc`, `Rc`, arrays and tuples. Structs derive it:
//!
//! ```
//! # #[cfg(feature = "derive")] {
//! use shapecodec::Reflect;
//!
//! #[derive(Reflect, Default, Debug, PartialEq)]
//! pub struct Message {
//!     pub name: String,
//!     pub value: u64,
//! }
//!
//! let msg = Message { name: "ok".into(), value: 1 };
//! let bytes = shapecodec::marshal(&msg).unwrap();
//! assert_eq!(bytes, [0x02, b'o', b'k', 0x01]);
//!
//! let mut decoded = Message::default();
//! shapecodec::unmarshal(&bytes, &mut decoded).unwrap();
//! assert_eq!(decoded, msg);
//! # }
//! ```
//!
//! # Wire format
//!
//! There is no header and there are no type tags; both sides must agree on the type.
//!
//! |Value|Encoding|
//! |---|---|
//! |unsigned integers|LEB128 varint|
//! |signed integers|zig-zag, then LEB128 varint|
//! |`f32`, `f64`|IEEE-754 bit pattern as an unsigned varint|
//! |`bool`|one byte, `0` or `1`|
//! |`char`|scalar value as an unsigned varint|
//! |[`Complex`]|real then imaginary part, fixed width, little-endian|
//! |`String`, `Vec<u8>`|varint length, then the bytes|
//! |sequences, maps|varint count, then elements or key/value pairs|
//! |arrays|elements only|
//! |`Option<T>`|presence byte, then `T` when present|
//! |`Box<T>`, `Arc<T>`, `Rc<T>`|`T`|
//! |structs|encoded fields in declaration order|
//!
//! Map iteration order is not canonical, so equal maps may encode differently.
//!
//! # Field selection
//!
//! Only `pub` fields are encoded. Public fields can be left out with
//! `#[shapecodec(skip)]`; excluded fields keep whatever value the target already holds when
//! decoding.
//!
//! # Derive attributes
//!
//! ## Top level
//! |Attribute|Type|Default|Description
//! |---|---|---|---|
//! |`internal`|`bool`|`false`|Refer to this crate as `crate` rather than `::shapecodec`.|
//!
//! ## Field level
//! |Attribute|Type|Default|Description
//! |---|---|---|---|
//! |`skip`|`bool`|`false`|Leave a public field out of the encoding.|
//!
//! Derived types must implement `Default`, which provides the value decoding starts from.
//!
//! # Recursive types
//!
//! Types may contain themselves through a `Vec`, map, `Option`, `Box` or other pointer.
//! Decoding bounds nesting through such types by [`Config::max_depth`]; encoding does not.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod codec;
pub use codec::*;
pub mod complex;
pub use complex::{Complex, Complex32, Complex64};
pub mod config;
pub use config::Config;
mod decoder;
pub use decoder::Decoder;
mod encoder;
pub use encoder::Encoder;
pub mod error;
pub use error::{Error, ReadError, ReadResult, Result, UnsupportedType, WriteError, WriteResult};
pub mod io;
mod marshal;
pub use marshal::*;
pub mod pool;
pub use pool::{DecoderPool, EncoderPool, PooledDecoder, PooledEncoder};
#[cfg(test)]
mod proptest_config;
mod scan;
pub use scan::CodecCache;
mod shape;
pub use shape::*;
pub mod varint;
#[cfg(feature = "derive")]
pub use shapecodec_derive::Reflect;
