use core::any::Any;

use crate::info::DeclaredType;

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to the [`DeclaredType`] of a type.
///
/// Implemented for common standard types, and by
/// [`#[derive(Record)]`](crate::derive::Record) and
/// [`#[derive(Enumeration)]`](crate::derive::Enumeration).
///
/// # Manually Impl
///
/// Leaf types converted by a custom converter can use [`impl_typed_scalar`].
///
/// Containers describe their shape and cache it in a
/// [`GenericDeclaredTypeCell`]:
///
/// ```
/// use std::any::Any;
/// use vc_serial::impls::GenericDeclaredTypeCell;
/// use vc_serial::info::{DeclaredType, SequenceShape, Shape, Typed};
///
/// struct Stack<T>(Vec<T>);
///
/// fn items<T: Typed>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
///     let stack = value.downcast_ref::<Stack<T>>()?;
///     Some(stack.0.iter().map(|item| item as &dyn Any).collect())
/// }
///
/// fn collect<T: Typed>(items: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
///     let items = items
///         .into_iter()
///         .map(|item| item.downcast::<T>().ok().map(|item| *item))
///         .collect::<Option<Vec<T>>>()?;
///     Some(Box::new(Stack(items)))
/// }
///
/// impl<T: Typed> Typed for Stack<T> {
///     fn declared_type() -> &'static DeclaredType {
///         static CELL: GenericDeclaredTypeCell = GenericDeclaredTypeCell::new();
///         CELL.get_or_insert::<Self>(|| {
///             DeclaredType::new::<Self>(Shape::Sequence(SequenceShape::new(
///                 T::declared_type,
///                 items::<T>,
///                 collect::<T>,
///             )))
///         })
///     }
/// }
///
/// assert!(matches!(<Stack<u8>>::declared_type().shape(), Shape::Sequence(_)));
/// ```
///
/// [`impl_typed_scalar`]: crate::impl_typed_scalar
/// [`GenericDeclaredTypeCell`]: crate::impls::GenericDeclaredTypeCell
#[diagnostic::on_unimplemented(
    message = "`{Self}` has no declared type",
    note = "consider `#[derive(Record)]`, `#[derive(Enumeration)]` or `impl_typed_scalar!`"
)]
pub trait Typed: Any {
    /// Returns the compile-time type information for the implementing type.
    fn declared_type() -> &'static DeclaredType;
}
