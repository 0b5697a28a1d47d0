use proc_macro2::TokenStream;
use quote::quote;
use syn::{Generics, ImplGenerics, TypeGenerics};

/// Splits `generics` for an impl block and builds its where clause.
///
/// Every type parameter must be `Typed` so the fields mentioning it can be
/// described. Lifetime parameters force `Self: 'static`, as `Typed`
/// requires `Any`.
pub(crate) fn split_generics<'a>(
    generics: &'a Generics,
    typed_: &TokenStream,
) -> (ImplGenerics<'a>, TypeGenerics<'a>, TokenStream) {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut predicates = quote! {};
    if generics.lifetimes().next().is_some() {
        predicates.extend(quote! { Self: 'static, });
    }
    for param in generics.type_params() {
        let ident = &param.ident;
        predicates.extend(quote! { #ident: #typed_, });
    }
    if let Some(where_clause) = where_clause {
        let existing = where_clause.predicates.iter();
        predicates.extend(quote! { #(#existing,)* });
    }

    let where_clause = if predicates.is_empty() {
        TokenStream::new()
    } else {
        quote! { where #predicates }
    };
    (impl_generics, ty_generics, where_clause)
}
