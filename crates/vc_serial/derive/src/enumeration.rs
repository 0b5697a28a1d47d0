use std::collections::BTreeMap;
use std::fmt;

use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DataEnum, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Ident, Lit, UnOp};

use crate::attributes::{TypeAttributes, VariantAttributes};

/// Implements `Typed` and `Enumeration` for a fieldless enum.
///
/// Members are stored as their discriminant by default, as their name with
/// `#[serial(by_name)]`, or as an explicit `#[serial(value = ...)]` literal.
pub(crate) fn impl_enumeration(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &ast.data else {
        return Err(syn::Error::new(
            ast.ident.span(),
            "`Enumeration` can only be derived for enums",
        ));
    };
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new(
            ast.generics.span(),
            "`Enumeration` cannot be derived for generic enums",
        ));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new(
            ast.ident.span(),
            "an enumeration must declare at least one member",
        ));
    }

    let type_attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
    if let Some(path) = &type_attrs.validate {
        return Err(syn::Error::new(path.span(), "`validate` only applies to records"));
    }
    let by_name = type_attrs.by_name.is_some();

    let vc_serial_path = crate::path::vc_serial();
    let typed_ = crate::path::typed_(&vc_serial_path);
    let declared_type_ = crate::path::declared_type_(&vc_serial_path);
    let enumeration_ = crate::path::enumeration_(&vc_serial_path);
    let enum_member_ = crate::path::enum_member_(&vc_serial_path);
    let type_cell_ = crate::path::declared_type_cell_(&vc_serial_path, false);

    let variants = collect_members(data, by_name)?;

    let mut members = Vec::with_capacity(variants.len());
    let mut index_arms = Vec::with_capacity(variants.len());
    let mut member_arms = Vec::with_capacity(variants.len());
    for (index, Member { ident, name, value }) in variants.iter().enumerate() {
        members.push(quote! { #enum_member_::new(#name, #value) });
        index_arms.push(quote! { Self::#ident => #index });
        member_arms.push(quote! { #index => ::core::option::Option::Some(Self::#ident) });
    }

    let ident = &ast.ident;

    Ok(quote! {
        const _: () = {
            impl #typed_ for #ident {
                fn declared_type() -> &'static #declared_type_ {
                    static CELL: #type_cell_ = #type_cell_::new();
                    CELL.get_or_init(#declared_type_::enumeration::<Self>)
                }
            }

            impl #enumeration_ for #ident {
                fn members() -> ::std::vec::Vec<#enum_member_> {
                    ::std::vec![#(#members,)*]
                }

                fn member_index(&self) -> usize {
                    match self {
                        #(#index_arms,)*
                    }
                }

                fn from_member_index(index: usize) -> ::core::option::Option<Self> {
                    match index {
                        #(#member_arms,)*
                        _ => ::core::option::Option::None,
                    }
                }
            }
        };
    })
}

struct Member<'a> {
    ident: &'a Ident,
    name: String,
    value: TokenStream,
}

/// Reads every member's name and stored value, rejecting two members
/// stored as equal primitives.
fn collect_members(data: &DataEnum, by_name: bool) -> syn::Result<Vec<Member<'_>>> {
    // stored value -> member
    let mut stored: BTreeMap<StoredValue, String> = BTreeMap::new();
    let mut members = Vec::with_capacity(data.variants.len());
    // `None` once a discriminant is not an integer literal
    let mut discriminant: Option<i128> = Some(-1);

    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.fields.span(),
                "enumeration members cannot carry data",
            ));
        }
        let attrs = VariantAttributes::parse_attrs(&variant.attrs)?;
        let ident = &variant.ident;
        let name = attrs
            .rename
            .as_ref()
            .map_or_else(|| ident.to_string(), |rename| rename.value());

        discriminant = match &variant.discriminant {
            Some((_, expr)) => literal_discriminant(expr),
            None => discriminant.and_then(|prev| prev.checked_add(1)),
        };

        let stored_value = match &attrs.value {
            Some(lit) => StoredValue::of_literal(lit)?,
            None if by_name => Some(StoredValue::Str(name.clone())),
            None => discriminant.map(StoredValue::Int),
        };
        if let Some(stored_value) = stored_value
            && let Some(other) = stored.insert(stored_value.clone(), ident.to_string())
        {
            return Err(syn::Error::new(
                variant.span(),
                format!("member `{ident}` is stored as {stored_value}, like member `{other}`"),
            ));
        }

        let value = match &attrs.value {
            Some(lit) => literal_value(lit)?,
            None if by_name => quote! { #name },
            None => quote! { Self::#ident as i64 },
        };
        members.push(Member { ident, name, value });
    }

    Ok(members)
}

/// Unsuffixed numbers are pinned to `i64` / `f64`, so the literal has a
/// single primitive conversion.
fn literal_value(lit: &Lit) -> syn::Result<TokenStream> {
    match lit {
        Lit::Str(_) | Lit::Bool(_) => Ok(quote! { #lit }),
        Lit::Int(int) if int.suffix().is_empty() => Ok(quote! { #int as i64 }),
        Lit::Float(float) if float.suffix().is_empty() => Ok(quote! { #float as f64 }),
        Lit::Int(_) | Lit::Float(_) => Ok(quote! { #lit }),
        other => Err(syn::Error::new(
            other.span(),
            "a member value must be a string, number or bool literal",
        )),
    }
}

/// A member's primitive, compared the way primitives compare: integers by
/// value whatever their suffix, floats apart from integers.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
enum StoredValue {
    Str(String),
    Bool(bool),
    Int(i128),
    Float(u64),
}

impl StoredValue {
    fn of_literal(lit: &Lit) -> syn::Result<Option<Self>> {
        Ok(match lit {
            Lit::Str(s) => Some(StoredValue::Str(s.value())),
            Lit::Bool(b) => Some(StoredValue::Bool(b.value)),
            Lit::Int(int) => Some(StoredValue::Int(int.base10_parse()?)),
            Lit::Float(float) => {
                let value: f64 = float.base10_parse()?;
                // 0.0 and -0.0 are equal primitives
                Some(StoredValue::Float((value + 0.0).to_bits()))
            }
            _ => None,
        })
    }
}

impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Str(s) => write!(f, "{s:?}"),
            StoredValue::Bool(b) => write!(f, "{b}"),
            StoredValue::Int(i) => write!(f, "{i}"),
            StoredValue::Float(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
        }
    }
}

/// Evaluates `1`, `-1`, `0x10`, ... Anything else is left to the runtime check.
fn literal_discriminant(expr: &Expr) -> Option<i128> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_parse().ok(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => literal_discriminant(expr).and_then(i128::checked_neg),
        Expr::Group(group) => literal_discriminant(&group.expr),
        Expr::Paren(paren) => literal_discriminant(&paren.expr),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use syn::{Data, DeriveInput, parse_quote};

    use super::collect_members;

    fn check(ast: DeriveInput, by_name: bool) -> Result<Vec<String>, String> {
        let Data::Enum(data) = &ast.data else {
            unreachable!()
        };
        collect_members(data, by_name)
            .map(|members| members.into_iter().map(|m| m.name).collect())
            .map_err(|e| e.to_string())
    }

    #[test]
    fn distinct_members() {
        let ast = parse_quote! {
            enum Level { Low = 1, Mid, #[serial(value = 3)] High = 10 }
        };
        assert_eq!(check(ast, false).unwrap(), ["Low", "Mid", "High"]);

        let ast = parse_quote! {
            enum Shape { Circle, #[serial(rename = "rect")] Rectangle, #[serial(value = 0)] Nothing }
        };
        assert_eq!(check(ast, true).unwrap(), ["Circle", "rect", "Nothing"]);
    }

    #[test]
    fn value_shadowing_a_discriminant() {
        let ast = parse_quote! {
            enum Clash { A = 1, #[serial(value = 1)] B = 2 }
        };
        let error = check(ast, false).unwrap_err();
        assert_eq!(error, "member `B` is stored as 1, like member `A`");
    }

    #[test]
    fn implicit_discriminants_count_up() {
        let ast = parse_quote! {
            enum Clash { A = -1, B, #[serial(value = 0)] C }
        };
        let error = check(ast, false).unwrap_err();
        assert_eq!(error, "member `C` is stored as 0, like member `B`");
    }

    #[test]
    fn suffixes_do_not_matter() {
        let ast = parse_quote! {
            enum Clash { #[serial(value = 1)] A, #[serial(value = 1u8)] B }
        };
        assert!(check(ast, false).is_err());

        let ast = parse_quote! {
            enum Apart { #[serial(value = 1)] A, #[serial(value = 1.0)] B, #[serial(value = "1")] C }
        };
        assert!(check(ast, false).is_ok());
    }

    #[test]
    fn renamed_members_collide_by_name() {
        let ast = parse_quote! {
            enum Clash { Red, #[serial(rename = "Red")] Crimson }
        };
        assert!(check(ast, true).is_err());
    }
}
