//! Parsing of `#[serial(...)]` attributes.

use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, Lit, LitStr, Path};

use crate::SERIAL_ATTRIBUTE_NAME;

fn for_each_serial_meta(
    attrs: &[Attribute],
    mut logic: impl FnMut(ParseNestedMeta) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs {
        if attr.path().is_ident(SERIAL_ATTRIBUTE_NAME) {
            attr.parse_nested_meta(&mut logic)?;
        }
    }
    Ok(())
}

fn set_once<T>(slot: &mut Option<T>, value: T, meta: &ParseNestedMeta) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *slot = Some(value);
    Ok(())
}

// -----------------------------------------------------------------------------
// Type

/// Attributes on the struct or enum itself.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    /// `#[serial(validate = path)]`, records only.
    pub validate: Option<Path>,
    /// `#[serial(by_name)]`, enumerations only.
    pub by_name: Option<Span>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for_each_serial_meta(attrs, |meta| {
            if meta.path.is_ident("validate") {
                let path: Path = meta.value()?.parse()?;
                set_once(&mut this.validate, path, &meta)
            } else if meta.path.is_ident("by_name") {
                set_once(&mut this.by_name, meta.path.span(), &meta)
            } else {
                Err(meta.error("unknown attribute, expected `validate` or `by_name`"))
            }
        })?;
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// Field

/// Where the value of an absent field comes from.
pub(crate) enum DefaultSource {
    /// `#[serial(default)]`
    Trait,
    /// `#[serial(default = expr)]`
    Value(Expr),
    /// `#[serial(default_with = path)]`
    Factory(Path),
}

/// Attributes on a named field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub key: Option<LitStr>,
    pub skip: Option<Span>,
    pub default: Option<DefaultSource>,
    pub with: Option<Path>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for_each_serial_meta(attrs, |meta| {
            if meta.path.is_ident("key") {
                let key: LitStr = meta.value()?.parse()?;
                set_once(&mut this.key, key, &meta)
            } else if meta.path.is_ident("skip") {
                set_once(&mut this.skip, meta.path.span(), &meta)
            } else if meta.path.is_ident("default") {
                let source = if meta.input.peek(syn::Token![=]) {
                    DefaultSource::Value(meta.value()?.parse()?)
                } else {
                    DefaultSource::Trait
                };
                this.set_default(source, &meta)
            } else if meta.path.is_ident("default_with") {
                let factory: Path = meta.value()?.parse()?;
                this.set_default(DefaultSource::Factory(factory), &meta)
            } else if meta.path.is_ident("with") {
                let module: Path = meta.value()?.parse()?;
                set_once(&mut this.with, module, &meta)
            } else {
                Err(meta.error(
                    "unknown attribute, expected `key`, `skip`, `default`, `default_with` or `with`",
                ))
            }
        })?;
        Ok(this)
    }

    fn set_default(&mut self, source: DefaultSource, meta: &ParseNestedMeta) -> syn::Result<()> {
        if self.default.is_some() {
            return Err(meta.error("a field takes either a default value or a default factory, not both"));
        }
        self.default = Some(source);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Variant

/// Attributes on an enumeration member.
#[derive(Default)]
pub(crate) struct VariantAttributes {
    /// `#[serial(value = lit)]`
    pub value: Option<Lit>,
    /// `#[serial(rename = "name")]`
    pub rename: Option<LitStr>,
}

impl VariantAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for_each_serial_meta(attrs, |meta| {
            if meta.path.is_ident("value") {
                let value: Lit = meta.value()?.parse()?;
                set_once(&mut this.value, value, &meta)
            } else if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                set_once(&mut this.rename, name, &meta)
            } else {
                Err(meta.error("unknown attribute, expected `value` or `rename`"))
            }
        })?;
        Ok(this)
    }
}
