//! Walks record graphs to and from [`Primitive`](crate::value::Primitive)s.
//!
//! A [`Walker`] borrows a [`ConverterRegistry`](crate::registry::ConverterRegistry)
//! and resolves every value in this order:
//!
//! 1. the explicit converter of the field, if any;
//! 2. recursion, if the declared type is a record;
//! 3. the registry, by declared type.
//!
//! Serializing a record produces a mapping in field declaration order.
//! Deserializing resolves every included field first and constructs the
//! record once, so a failure never leaves a partially built value behind.

// -----------------------------------------------------------------------------
// Modules

mod options;
mod record;
mod walker;

// -----------------------------------------------------------------------------
// Exports

pub use options::WalkOptions;
pub use walker::Walker;
