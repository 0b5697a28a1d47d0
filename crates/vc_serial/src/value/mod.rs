//! The primitive representation.
//!
//! - [`Primitive`]: null, bool, number, string, sequence or mapping.
//! - [`Number`]: signed, unsigned or floating point.
//! - [`Mapping`]: an insertion-ordered, string-keyed mapping.
//!
//! All three implement `serde_core::Serialize` and `Deserialize`, encoding
//! into text is left to whichever serde format the caller picks.

// -----------------------------------------------------------------------------
// Modules

mod mapping;
mod number;
mod primitive;
mod serde;

// -----------------------------------------------------------------------------
// Exports

pub use mapping::Mapping;
pub use number::{Number, ParseNumberError};
pub use primitive::{Primitive, PrimitiveKind};
