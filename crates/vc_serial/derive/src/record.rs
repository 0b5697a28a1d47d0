use std::collections::BTreeMap;

use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Ident, Type};

use crate::attributes::{DefaultSource, FieldAttributes, TypeAttributes};
use crate::generics::split_generics;

struct RecordField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    attrs: FieldAttributes,
}

fn collect_fields(ast: &DeriveInput) -> syn::Result<Vec<RecordField<'_>>> {
    let Data::Struct(data) = &ast.data else {
        return Err(syn::Error::new(
            ast.ident.span(),
            "`Record` can only be derived for structs with named fields",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new(
            data.fields.span(),
            "`Record` can only be derived for structs with named fields",
        ));
    };
    if named.named.is_empty() {
        return Err(syn::Error::new(
            ast.ident.span(),
            "a record must declare at least one field",
        ));
    }

    // key -> field name, to report collisions at compile time
    let mut keys: BTreeMap<String, String> = BTreeMap::new();
    let mut fields = Vec::with_capacity(named.named.len());

    for field in &named.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = FieldAttributes::parse_attrs(&field.attrs)?;

        if let Some(span) = attrs.skip {
            if attrs.default.is_none() {
                return Err(syn::Error::new(
                    span,
                    "a skipped field needs `default`, `default = ...` or `default_with = ...` \
                     to be rebuilt",
                ));
            }
            if let Some(with) = &attrs.with {
                return Err(syn::Error::new(with.span(), "`with` has no effect on a skipped field"));
            }
        }

        let name = ident.to_string();
        let key = attrs.key.as_ref().map_or_else(|| name.clone(), |key| key.value());
        if let Some(other) = keys.insert(key.clone(), name) {
            let span = attrs.key.as_ref().map_or_else(|| ident.span(), |key| key.span());
            return Err(syn::Error::new(
                span,
                format!("serialized key `{key}` is already used by field `{other}`"),
            ));
        }

        fields.push(RecordField {
            ident,
            ty: &field.ty,
            attrs,
        });
    }

    Ok(fields)
}

/// Implements `Typed` and `Record` for a struct with named fields.
pub(crate) fn impl_record(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let type_attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
    if let Some(span) = type_attrs.by_name {
        return Err(syn::Error::new(span, "`by_name` only applies to enumerations"));
    }
    let fields = collect_fields(ast)?;

    let vc_serial_path = crate::path::vc_serial();
    let typed_ = crate::path::typed_(&vc_serial_path);
    let declared_type_ = crate::path::declared_type_(&vc_serial_path);
    let record_ = crate::path::record_(&vc_serial_path);
    let record_info_ = crate::path::record_info_(&vc_serial_path);
    let describe_field_ = crate::path::describe_field_(&vc_serial_path);
    let field_converter_ = crate::path::field_converter_(&vc_serial_path);
    let field_values_ = crate::path::field_values_(&vc_serial_path);
    let configuration_error_ = crate::path::configuration_error_(&vc_serial_path);
    let construct_error_ = crate::path::construct_error_(&vc_serial_path);

    let is_generic = !ast.generics.params.is_empty();
    let type_cell_ = crate::path::declared_type_cell_(&vc_serial_path, is_generic);
    let info_cell_ = crate::path::record_info_cell_(&vc_serial_path, is_generic);
    let (get_from_cell, cell_marker) = if is_generic {
        (quote! { get_or_insert }, quote! { ::<Self> })
    } else {
        (quote! { get_or_init }, TokenStream::new())
    };

    let descriptors = fields.iter().map(|field| {
        let ty = field.ty;
        let name = field.ident.to_string();
        let key = match &field.attrs.key {
            Some(key) => quote! { .key(#key) },
            None => TokenStream::new(),
        };
        let exclude = match field.attrs.skip {
            Some(_) => quote! { .exclude() },
            None => TokenStream::new(),
        };
        let default = match &field.attrs.default {
            None => TokenStream::new(),
            Some(DefaultSource::Trait) => {
                quote! { .default_with(<#ty as ::core::default::Default>::default) }
            }
            Some(DefaultSource::Value(expr)) => quote! { .default_value(#expr) },
            Some(DefaultSource::Factory(path)) => quote! { .default_with(#path) },
        };
        let converter = match &field.attrs.with {
            Some(module) => quote! {
                .converter(#field_converter_::new::<#ty>(
                    #module::to_primitive,
                    #module::from_primitive,
                ))
            },
            None => TokenStream::new(),
        };
        quote! {
            #describe_field_::<#ty>(#name) #key #exclude #default #converter .build()?
        }
    });

    let field_arms = fields.iter().filter(|field| field.attrs.skip.is_none()).map(|field| {
        let ident = field.ident;
        let name = ident.to_string();
        quote! { #name => ::core::option::Option::Some(&self.#ident) }
    });

    let initializers = fields.iter().map(|field| {
        let ident = field.ident;
        let ty = field.ty;
        let name = ident.to_string();
        if field.attrs.skip.is_none() {
            return quote! { #ident: values.take::<#ty>(#name)? };
        }
        match &field.attrs.default {
            Some(DefaultSource::Value(expr)) => quote! { #ident: #expr },
            Some(DefaultSource::Factory(path)) => quote! { #ident: #path() },
            Some(DefaultSource::Trait) | None => {
                quote! { #ident: <#ty as ::core::default::Default>::default() }
            }
        }
    });

    let validate = match &type_attrs.validate {
        Some(path) => quote! {
            if let ::core::result::Result::Err(error) = #path(&record) {
                return ::core::result::Result::Err(#construct_error_::rejected(error));
            }
        },
        None => TokenStream::new(),
    };

    let ident = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = split_generics(&ast.generics, &typed_);

    Ok(quote! {
        const _: () = {
            impl #impl_generics #typed_ for #ident #ty_generics #where_clause {
                fn declared_type() -> &'static #declared_type_ {
                    static CELL: #type_cell_ = #type_cell_::new();
                    CELL.#get_from_cell #cell_marker (#declared_type_::record::<Self>)
                }
            }

            impl #impl_generics #record_ for #ident #ty_generics #where_clause {
                fn record_info() -> ::core::result::Result<&'static #record_info_, #configuration_error_> {
                    static CELL: #info_cell_ = #info_cell_::new();
                    CELL.#get_from_cell #cell_marker (|| {
                        #record_info_::new::<Self>([
                            #(#descriptors,)*
                        ])
                    })
                    .as_ref()
                    .map_err(::core::clone::Clone::clone)
                }

                fn field(&self, name: &str) -> ::core::option::Option<&dyn ::core::any::Any> {
                    match name {
                        #(#field_arms,)*
                        _ => ::core::option::Option::None,
                    }
                }

                #[allow(unused_mut, unused_variables)]
                fn construct(mut values: #field_values_) -> ::core::result::Result<Self, #construct_error_> {
                    let record = Self {
                        #(#initializers,)*
                    };
                    #validate
                    ::core::result::Result::Ok(record)
                }
            }
        };
    })
}
