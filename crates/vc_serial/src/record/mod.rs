//! The capabilities a type provides to be walked.
//!
//! - [`Record`]: enumerate fields, read a field by name, construct from values.
//! - [`Enumeration`]: a closed set of members stored as primitives.
//! - [`FieldValues`]: named values passed to [`Record::construct`].
//!
//! Both traits are normally derived, see [`derive`](crate::derive).

// -----------------------------------------------------------------------------
// Modules

mod values;

// -----------------------------------------------------------------------------
// Exports

pub use values::FieldValues;

use core::any::Any;

use crate::error::{ConfigurationError, ConstructError};
use crate::info::{EnumMember, RecordInfo, Typed};

// -----------------------------------------------------------------------------
// Record

/// A structured value with named, ordered fields.
///
/// Serialization reads included fields through [`Record::field`];
/// deserialization resolves every included field first and then calls
/// [`Record::construct`] exactly once. Fields are never assigned after
/// construction, so whatever validation `construct` performs always runs.
///
/// # Manually Impl
///
/// ```
/// use std::any::Any;
/// use vc_serial::error::{ConfigurationError, ConstructError};
/// use vc_serial::impls::{NonGenericDeclaredTypeCell, NonGenericRecordInfoCell};
/// use vc_serial::info::{describe_field, DeclaredType, RecordInfo, Typed};
/// use vc_serial::record::{FieldValues, Record};
/// use vc_serial::value::Primitive;
///
/// #[derive(Debug, PartialEq)]
/// struct Span {
///     start: u32,
///     end: u32,
/// }
///
/// impl Typed for Span {
///     fn declared_type() -> &'static DeclaredType {
///         static CELL: NonGenericDeclaredTypeCell = NonGenericDeclaredTypeCell::new();
///         CELL.get_or_init(DeclaredType::record::<Self>)
///     }
/// }
///
/// impl Record for Span {
///     fn record_info() -> Result<&'static RecordInfo, ConfigurationError> {
///         static CELL: NonGenericRecordInfoCell = NonGenericRecordInfoCell::new();
///         CELL.get_or_init(|| {
///             RecordInfo::new::<Self>([
///                 describe_field::<u32>("start").build()?,
///                 describe_field::<u32>("end").build()?,
///             ])
///         })
///         .as_ref()
///         .map_err(Clone::clone)
///     }
///
///     fn field(&self, name: &str) -> Option<&dyn Any> {
///         match name {
///             "start" => Some(&self.start),
///             "end" => Some(&self.end),
///             _ => None,
///         }
///     }
///
///     fn construct(mut values: FieldValues) -> Result<Self, ConstructError> {
///         let span = Span {
///             start: values.take("start")?,
///             end: values.take("end")?,
///         };
///         if span.start > span.end {
///             return Err(ConstructError::rejected("span ends before it starts"));
///         }
///         Ok(span)
///     }
/// }
///
/// let span = Span { start: 2, end: 5 };
/// let primitive = vc_serial::serialize(&span).unwrap();
/// assert_eq!(primitive.get("end"), Some(&Primitive::from(5_u32)));
/// assert_eq!(vc_serial::deserialize::<Span>(&primitive).unwrap(), span);
/// ```
pub trait Record: Typed + Sized {
    /// The ordered field table of this type.
    fn record_info() -> Result<&'static RecordInfo, ConfigurationError>;

    /// Borrows the value of the field `name`.
    fn field(&self, name: &str) -> Option<&dyn Any>;

    /// Builds an instance from resolved values, through the type's validating path.
    fn construct(values: FieldValues) -> Result<Self, ConstructError>;
}

// -----------------------------------------------------------------------------
// Enumeration

/// A closed set of members, each stored as a fixed primitive value.
///
/// Deserializing a primitive that matches no member fails, so only
/// declared members ever come back.
pub trait Enumeration: Typed + Sized {
    /// All members in declaration order.
    fn members() -> Vec<EnumMember>;

    /// The position of `self` in [`Enumeration::members`].
    fn member_index(&self) -> usize;

    /// The member at `index` in [`Enumeration::members`].
    fn from_member_index(index: usize) -> Option<Self>;
}
