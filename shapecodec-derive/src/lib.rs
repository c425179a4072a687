//! Derive macro for `Reflect`.
//!
//! Note using this on packed structs is rejected, as field offsets would be unaligned.
//!
//! Refer to the [`shapecodec`](https://docs.rs/shapecodec) crate for examples.
use {
    proc_macro::TokenStream,
    syn::{parse_macro_input, DeriveInput},
};

mod common;
mod reflect;

/// Implement `Reflect` for a struct.
///
/// Only `pub` fields are encoded; `#[shapecodec(skip)]` leaves a public field out as well.
/// The struct must implement `Default`.
#[proc_macro_derive(Reflect, attributes(shapecodec))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match reflect::generate(input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.write_errors().into(),
    }
}
