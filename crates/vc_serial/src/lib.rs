#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macros emit `::vc_serial::...` paths, which must also resolve
// inside this crate's own tests.
extern crate self as vc_serial;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod error;
pub mod impls;
pub mod info;
pub mod record;
pub mod registry;
pub mod value;
pub mod walk;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
}

pub use registry::register_converter;
pub use vc_serial_derive as derive;

use crate::error::SerialError;
use crate::record::Record;
use crate::registry::global_registry;
use crate::value::Primitive;
use crate::walk::Walker;

/// Serializes `record` with the process-wide registry.
///
/// The registry's read lock is held for the whole walk.
///
/// # Example
///
/// ```
/// use vc_serial::derive::Record;
///
/// #[derive(Record)]
/// struct User {
///     name: String,
///     #[serial(key = "e-mail")]
///     email: Option<String>,
/// }
///
/// let user = User { name: "ann".into(), email: None };
/// let primitive = vc_serial::serialize(&user).unwrap();
/// assert_eq!(primitive.to_string(), r#"{"name": "ann", "e-mail": null}"#);
/// ```
pub fn serialize<R: Record>(record: &R) -> Result<Primitive, SerialError> {
    let registry = global_registry().read();
    Walker::new(&registry).serialize(record)
}

/// Deserializes an `R` with the process-wide registry.
///
/// # Example
///
/// ```
/// use vc_serial::derive::Record;
/// use vc_serial::error::ErrorKind;
/// use vc_serial::value::Primitive;
///
/// #[derive(Record, Debug, PartialEq)]
/// struct Tags {
///     #[serial(default_with = Vec::new)]
///     tags: Vec<String>,
/// }
///
/// let empty = Primitive::Mapping(Default::default());
/// assert_eq!(vc_serial::deserialize::<Tags>(&empty).unwrap(), Tags { tags: vec![] });
///
/// let wrong = Primitive::from(3);
/// let error = vc_serial::deserialize::<Tags>(&wrong).unwrap_err();
/// assert!(matches!(error.kind(), ErrorKind::TypeMismatch { .. }));
/// ```
pub fn deserialize<R: Record>(primitive: &Primitive) -> Result<R, SerialError> {
    let registry = global_registry().read();
    Walker::new(&registry).deserialize(primitive)
}
