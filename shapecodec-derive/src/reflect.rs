use {
    crate::common::{ensure_not_repr_packed, get_crate_name, Field, ReflectArgs},
    darling::{ast::Data, Error, FromDeriveInput, Result},
    proc_macro2::{TokenStream, TokenTree},
    quote::{quote, ToTokens},
    syn::{parse_quote, DeriveInput, Ident, Path, Type, WhereClause},
};

/// Whether `ident` appears anywhere in `ty`.
fn mentions(ty: &Type, ident: &Ident) -> bool {
    fn walk(tokens: TokenStream, ident: &Ident) -> bool {
        tokens.into_iter().any(|token| match token {
            TokenTree::Ident(found) => found == *ident,
            TokenTree::Group(group) => walk(group.stream(), ident),
            _ => false,
        })
    }
    walk(ty.to_token_stream(), ident)
}

/// `Field` descriptor for one struct member.
fn field_descriptor(crate_name: &Path, field: &Field, index: usize) -> TokenStream {
    let member = field.struct_member_ident(index);
    let name = field.struct_member_ident_to_string(index);
    let skip = field.skip;
    let shape = if field.is_encoded() {
        let ty = &field.ty;
        quote! { ::core::option::Option::Some(#crate_name::shape_of::<#ty>) }
    } else {
        quote! { ::core::option::Option::None }
    };
    let visibility = if field.is_public() {
        quote! { #crate_name::Visibility::Public }
    } else {
        quote! { #crate_name::Visibility::Private }
    };

    quote! {
        #crate_name::Field {
            name: #name,
            offset: ::core::mem::offset_of!(Self, #member),
            shape: #shape,
            visibility: #visibility,
            skip: #skip,
        }
    }
}

pub(crate) fn generate(input: DeriveInput) -> Result<TokenStream> {
    ensure_not_repr_packed(&input, "Reflect")?;
    let args = ReflectArgs::from_derive_input(&input)?;
    let crate_name = get_crate_name(&args);
    let Data::Struct(fields) = &args.data else {
        return Err(Error::custom("`Reflect` can only be derived for structs").with_span(&args.ident));
    };

    let ident = &args.ident;
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();
    let mut where_clause: WhereClause = where_clause
        .cloned()
        .unwrap_or_else(|| parse_quote!(where));
    // Bounds go on type parameters only. A bound on a field type such as `Vec<Self>` would make
    // recursive structs unprovable.
    for param in args.generics.type_params() {
        let param = &param.ident;
        if fields
            .iter()
            .any(|field| field.is_encoded() && mentions(&field.ty, param))
        {
            where_clause
                .predicates
                .push(parse_quote!(#param: #crate_name::Reflect));
        }
    }
    where_clause
        .predicates
        .push(parse_quote!(#ident #ty_generics: ::core::default::Default + 'static));

    let descriptors = fields
        .iter()
        .enumerate()
        .map(|(i, field)| field_descriptor(&crate_name, field, i));

    Ok(quote! {
        unsafe impl #impl_generics #crate_name::Reflect for #ident #ty_generics #where_clause {
            const SHAPE: &'static #crate_name::Shape = &#crate_name::Shape::of::<Self>(
                #crate_name::Def::Struct(#crate_name::StructDef {
                    fields: &[#(#descriptors),*],
                }),
            );

            #[inline]
            fn zeroed() -> Self {
                ::core::default::Default::default()
            }
        }
    })
}
