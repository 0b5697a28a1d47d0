//! Paths into `vc_serial` used by the generated code.
//!
//! Kept in one place so a change in the `vc_serial` module layout only
//! touches this file.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the correct access path to the `vc_serial` crate.
///
/// 1. For crates that depend on `vc_serial`, `::vc_serial` is returned.
/// 2. For crates that depend on `vc_data` (or an alias `vc`), `::vc_data::serial`
///    is returned.
/// 3. Otherwise `::vc_serial` is returned, which may be incorrect.
///
/// Reading the manifest is not cheap, so the path is resolved once per
/// macro invocation and passed around.
pub(crate) fn vc_serial() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_serial"))
}

// -----------------------------------------------------------------------------
// info

#[inline(always)]
pub(crate) fn typed_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::Typed }
}

#[inline(always)]
pub(crate) fn declared_type_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::DeclaredType }
}

#[inline(always)]
pub(crate) fn record_info_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::RecordInfo }
}

#[inline(always)]
pub(crate) fn describe_field_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::describe_field }
}

#[inline(always)]
pub(crate) fn field_converter_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::FieldConverter }
}

#[inline(always)]
pub(crate) fn enum_member_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::info::EnumMember }
}

// -----------------------------------------------------------------------------
// impls

#[inline(always)]
pub(crate) fn declared_type_cell_(vc_serial_path: &syn::Path, generic: bool) -> TokenStream {
    if generic {
        quote! { #vc_serial_path::impls::GenericDeclaredTypeCell }
    } else {
        quote! { #vc_serial_path::impls::NonGenericDeclaredTypeCell }
    }
}

#[inline(always)]
pub(crate) fn record_info_cell_(vc_serial_path: &syn::Path, generic: bool) -> TokenStream {
    if generic {
        quote! { #vc_serial_path::impls::GenericRecordInfoCell }
    } else {
        quote! { #vc_serial_path::impls::NonGenericRecordInfoCell }
    }
}

// -----------------------------------------------------------------------------
// record & error

#[inline(always)]
pub(crate) fn record_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::record::Record }
}

#[inline(always)]
pub(crate) fn enumeration_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::record::Enumeration }
}

#[inline(always)]
pub(crate) fn field_values_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::record::FieldValues }
}

#[inline(always)]
pub(crate) fn configuration_error_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::error::ConfigurationError }
}

#[inline(always)]
pub(crate) fn construct_error_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! { #vc_serial_path::error::ConstructError }
}
