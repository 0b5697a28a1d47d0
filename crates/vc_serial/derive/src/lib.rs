//! See following macros:
//!
//! - [`Record`]
//! - [`Enumeration`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static SERIAL_ATTRIBUTE_NAME: &str = "serial";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod enumeration;
mod generics;
mod path;
mod record;

// -----------------------------------------------------------------------------
// Macros

/// # Record Derivation
///
/// `#[derive(Record)]` implements `Typed` and `Record` for a struct with
/// named fields. Every field type must implement `Typed`.
///
/// ```rust, ignore
/// #[derive(Record)]
/// #[serial(validate = Self::check)]
/// struct Order {
///     #[serial(key = "ID")]
///     id: u64,
///     #[serial(default_with = Vec::new)]
///     lines: Vec<Line>,
///     #[serial(default = 1.0)]
///     rate: f64,
///     #[serial(with = cents)]
///     total: u64,
///     #[serial(skip, default)]
///     cache: Option<String>,
/// }
/// ```
///
/// ## Field attributes
///
/// - `key = "k"`: the serialized key, defaults to the field name.
/// - `default`: uses `Default::default()` when the key is absent.
/// - `default = expr`: uses a clone of `expr` when the key is absent.
/// - `default_with = path`: calls `path()` when the key is absent.
/// - `with = module`: converts the field with `module::to_primitive` and
///   `module::from_primitive` instead of the registry.
/// - `skip`: never serialized or deserialized. The field is rebuilt from its
///   default, so `skip` requires one of the default attributes.
///
/// Only one default attribute may be given, and two fields may not share a
/// serialized key. Both are compile errors.
///
/// ## Type attributes
///
/// - `validate = path`: after construction, calls `path(&record)`, which
///   returns `Result<(), E>` with `E: Display`. An error rejects the record.
///
/// ## Generics
///
/// Type parameters are required to implement `Typed`.
#[proc_macro_derive(Record, attributes(serial))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match record::impl_record(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// # Enumeration Derivation
///
/// `#[derive(Enumeration)]` implements `Typed` and `Enumeration` for an enum
/// whose members carry no data.
///
/// ```rust, ignore
/// #[derive(Enumeration, Clone, Copy)]
/// enum Priority {
///     Low = 1,
///     High = 10,
/// }
///
/// #[derive(Enumeration, Clone, Copy)]
/// #[serial(by_name)]
/// enum Shape {
///     Circle,
///     #[serial(rename = "rect")]
///     Rectangle,
///     #[serial(value = 0)]
///     Nothing,
/// }
/// ```
///
/// Members are stored as their discriminant (`i64`) by default, or as their
/// name with `#[serial(by_name)]`.
///
/// ## Member attributes
///
/// - `value = literal`: stores the member as this string, number or bool.
/// - `rename = "name"`: the member name, used when stored by name.
///
/// Two members stored as the same value are a compile error.
#[proc_macro_derive(Enumeration, attributes(serial))]
pub fn derive_enumeration(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match enumeration::impl_enumeration(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
