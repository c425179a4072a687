use {
    darling::{ast::Data, FromDeriveInput, FromField, Result},
    proc_macro2::TokenStream,
    syn::{parse_quote, DeriveInput, Generics, Ident, Member, Path, Type, Visibility},
};

#[derive(FromField)]
#[darling(attributes(shapecodec))]
pub(crate) struct Field {
    pub(crate) ident: Option<Ident>,
    pub(crate) ty: Type,
    pub(crate) vis: Visibility,

    /// Leave a public field out of the encoding.
    ///
    /// For example:
    /// ```ignore
    /// struct Foo {
    ///     pub x: u64,
    ///     #[shapecodec(skip)]
    ///     pub cached: u64,
    /// }
    /// ```
    #[darling(default)]
    pub(crate) skip: bool,
}

impl Field {
    /// Get the identifier for a struct member.
    ///
    /// If the field has a named identifier, return it.
    /// Otherwise (tuple struct), return an anonymous identifier with the given index.
    pub(crate) fn struct_member_ident(&self, index: usize) -> Member {
        if let Some(ident) = &self.ident {
            ident.clone().into()
        } else {
            index.into()
        }
    }

    /// Like [`Self::struct_member_ident`], but return a `String`.
    pub(crate) fn struct_member_ident_to_string(&self, index: usize) -> String {
        if let Some(ident) = &self.ident {
            ident.to_string()
        } else {
            index.to_string()
        }
    }

    /// Only plain `pub` counts; `pub(crate)` and friends are private to the encoding.
    pub(crate) fn is_public(&self) -> bool {
        matches!(self.vis, Visibility::Public(_))
    }

    pub(crate) fn is_encoded(&self) -> bool {
        self.is_public() && !self.skip
    }
}

pub(crate) type ImplBody = Data<(), Field>;

#[derive(FromDeriveInput)]
#[darling(attributes(shapecodec), supports(struct_any))]
pub(crate) struct ReflectArgs {
    pub(crate) ident: Ident,
    pub(crate) generics: Generics,
    pub(crate) data: ImplBody,

    /// Used to determine the `shapecodec` path.
    ///
    /// If `internal` is `true`, the generated code will use the `crate::` path.
    /// Otherwise, it will use the `shapecodec` path.
    #[darling(default)]
    pub(crate) internal: bool,
}

/// Get the path to `shapecodec` based on the `internal` flag.
pub(crate) fn get_crate_name(args: &ReflectArgs) -> Path {
    if args.internal {
        parse_quote!(crate)
    } else {
        parse_quote!(::shapecodec)
    }
}

/// Reject deriving on `#[repr(packed)]` types, whose fields cannot be referenced in place.
pub(crate) fn ensure_not_repr_packed(input: &DeriveInput, trait_name: &str) -> Result<()> {
    for attr in &input.attrs {
        if !attr.path().is_ident("repr") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("packed") {
                return Err(meta.error(format!(
                    "`{trait_name}` cannot be derived for types annotated with `#[repr(packed)]` \
                     or `#[repr(packed(n))]`"
                )));
            }

            // Parse left over input for `align(n)`
            let _ = meta.input.parse::<TokenStream>();

            Ok(())
        })?;
    }
    Ok(())
}
