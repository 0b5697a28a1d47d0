use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::error::ConstructError;
use crate::info::{EnumShape, RecordShape, Shape};
use crate::record::{Enumeration, FieldValues, Record};

/// The runtime description of a static Rust type.
///
/// Converters are resolved against a `DeclaredType`, never against a value,
/// so an absent optional value is still converted by the converter of its
/// declared type.
///
/// Obtained through [`Typed::declared_type`](crate::info::Typed::declared_type).
///
/// # Example
///
/// ```
/// use vc_serial::info::{Shape, Typed};
///
/// let ty = <Vec<(u8, String)>>::declared_type();
/// let Shape::Sequence(shape) = ty.shape() else { unreachable!() };
///
/// assert!(ty.is::<Vec<(u8, String)>>());
/// assert!(matches!(shape.item().shape(), Shape::Tuple(tuple) if tuple.arity() == 2));
/// ```
pub struct DeclaredType {
    type_id: TypeId,
    type_path: &'static str,
    shape: Shape,
}

impl DeclaredType {
    /// Describes `T` with the given shape.
    #[inline]
    pub fn new<T: Any>(shape: Shape) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: core::any::type_name::<T>(),
            shape,
        }
    }

    /// Describes a leaf type.
    #[inline]
    pub fn scalar<T: Any>() -> Self {
        Self::new::<T>(Shape::Scalar)
    }

    /// Describes a record type.
    pub fn record<R: Record>() -> Self {
        Self::new::<R>(Shape::Record(RecordShape::new(
            R::record_info,
            record_field::<R>,
            record_construct::<R>,
        )))
    }

    /// Describes an enumeration.
    pub fn enumeration<E: Enumeration>() -> Self {
        Self::new::<E>(Shape::Enum(EnumShape::new(
            E::members(),
            enum_index::<E>,
            enum_member::<E>,
        )))
    }

    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The full type name, as reported by [`core::any::type_name`].
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns `true` if this describes `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    #[inline]
    pub const fn is_record(&self) -> bool {
        matches!(self.shape, Shape::Record(_))
    }
}

impl fmt::Debug for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredType")
            .field("type_path", &self.type_path)
            .field("shape", &self.shape)
            .finish()
    }
}

impl PartialEq for DeclaredType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for DeclaredType {}

fn record_field<'a, R: Record>(record: &'a dyn Any, name: &str) -> Option<&'a dyn Any> {
    record.downcast_ref::<R>()?.field(name)
}

fn record_construct<R: Record>(values: FieldValues) -> Result<Box<dyn Any>, ConstructError> {
    R::construct(values).map(|record| Box::new(record) as Box<dyn Any>)
}

fn enum_index<E: Enumeration>(value: &dyn Any) -> Option<usize> {
    value.downcast_ref::<E>().map(E::member_index)
}

fn enum_member<E: Enumeration>(index: usize) -> Option<Box<dyn Any>> {
    E::from_member_index(index).map(|member| Box::new(member) as Box<dyn Any>)
}
