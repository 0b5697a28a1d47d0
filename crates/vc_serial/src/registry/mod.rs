//! Converters and the registry that resolves them from declared types.
//!
//! ## Menu
//!
//! - [`Converter`]: a predicate over [`DeclaredType`] plus a pair of inverse functions.
//! - [`ConverterRegistry`]: ordered converters, newest registration first.
//! - [`ConverterRegistryArc`]: a shareable registry behind a lock.
//! - [`global_registry`]: the process-wide registry used by
//!   [`serialize`](crate::serialize) and [`deserialize`](crate::deserialize).
//!
//! ## Built-in converters
//!
//! - `()` ↔ null, `bool`, `char` ↔ one-character string, `String`
//! - integers and floats ↔ numbers, integers are range checked
//! - `Option<T>` ↔ null or the inner value
//! - `Vec<T>`, `VecDeque<T>` ↔ sequence
//! - `HashSet<T>`, `BTreeSet<T>` ↔ sequence, duplicates dropped when rebuilt
//! - tuples ↔ sequence of the exact arity
//! - `HashMap<K, V>`, `BTreeMap<K, V>` ↔ mapping, keys must convert to a
//!   string, number or bool
//! - enumerations ↔ the primitive of their member
//! - `PathBuf` ↔ string, `Duration` ↔ `"{secs}.{nanos:09}s"`
//! - "chrono" feature: `DateTime<Utc>`, `DateTime<FixedOffset>`,
//!   `SystemTime`, `NaiveDate`, `NaiveTime`, `NaiveDateTime` ↔ ISO 8601 strings
//!
//! ## auto_register
//!
//! See [`ConverterRegistry::auto_register`] and [`submit_converter`].
//!
//! We use [`inventory`] crate to implement static registration, not all
//! platforms support it (although major platforms do).
//!
//! [`DeclaredType`]: crate::info::DeclaredType
//! [`submit_converter`]: crate::submit_converter

// -----------------------------------------------------------------------------
// Modules

mod builtin;
mod converter;
mod converter_registry;

#[cfg(feature = "chrono")]
mod temporal;

#[cfg(feature = "auto_register")]
mod auto_register;

// -----------------------------------------------------------------------------
// Exports

pub use converter::Converter;
pub use converter_registry::{ConverterRegistry, ConverterRegistryArc};

#[cfg(feature = "auto_register")]
pub use auto_register::AutoConverter;

/// Does nothing without the `auto_register` feature.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! submit_converter {
    ($constructor:path) => {};
}

// -----------------------------------------------------------------------------
// Global registry

use std::sync::LazyLock;

static GLOBAL_REGISTRY: LazyLock<ConverterRegistryArc> = LazyLock::new(|| {
    let mut registry = ConverterRegistry::new();
    registry.auto_register();
    ConverterRegistryArc::new(registry)
});

/// The process-wide registry.
///
/// Holds the built-in converters and, with `auto_register`, every
/// submitted converter. Register custom converters during setup,
/// before serializing concurrently.
#[inline]
pub fn global_registry() -> &'static ConverterRegistryArc {
    &GLOBAL_REGISTRY
}

/// Adds `converter` to the process-wide registry at the highest priority.
///
/// # Example
///
/// ```
/// use vc_serial::registry::{global_registry, register_converter, Converter};
/// use vc_serial::info::Typed;
/// use vc_serial::value::Primitive;
///
/// struct Secret(String);
///
/// vc_serial::impl_typed_scalar!(Secret);
///
/// register_converter(Converter::of::<Secret>(
///     |_| Ok(Primitive::from("***")),
///     |p| Ok(Secret(p.as_str().unwrap_or_default().to_owned())),
/// ));
///
/// let registry = global_registry().read();
/// assert!(registry.resolve(Secret::declared_type()).is_ok());
/// ```
pub fn register_converter(converter: Converter) {
    global_registry().write().register(converter);
}
