//! Static type information.
//!
//! - [`Typed`]: gives access to the [`DeclaredType`] of a type.
//! - [`DeclaredType`]: type id, type path and [`Shape`].
//! - [`Shape`]: scalar, optional, sequence, set, tuple, map, record or enum,
//!   with the type-erased accessors converters recurse through.
//! - [`FieldInfo`]: how one record field takes part in conversion,
//!   built with [`describe_field`].
//! - [`RecordInfo`]: the ordered field table of a record type.

// -----------------------------------------------------------------------------
// Modules

mod declared_type;
mod field;
mod record_info;
mod shape;
mod typed;

// -----------------------------------------------------------------------------
// Exports

pub use declared_type::DeclaredType;
pub use field::{FieldBuilder, FieldConverter, FieldDefault, FieldInfo, describe_field};
pub use record_info::RecordInfo;
pub use shape::{EnumMember, EnumShape, MapShape, OptionalShape, RecordShape, SequenceShape};
pub use shape::{Shape, TupleShape, TypeFn};
pub use typed::Typed;

pub use crate::error::ConfigurationError;
