//! Containers for static storage of per-type information.
//!
//! ## NonGenericTypeCell
//!
//! For non generic types. Internally an [`OnceLock<T>`], almost no
//! additional expenses.
//!
//! ## GenericTypeCell
//!
//! A `static` declared inside a generic function is shared by every
//! instantiation, so the cell keeps one entry per [`TypeId`] in a map
//! wrapped in [`RwLock`].
//!
//! Both are used for [`DeclaredType`]s and for the field tables of records.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use crate::error::ConfigurationError;
use crate::info::{DeclaredType, RecordInfo};

mod sealed {
    use super::{ConfigurationError, DeclaredType, RecordInfo};

    pub trait TypedProperty: Send + Sync + 'static {}

    impl TypedProperty for DeclaredType {}
    impl TypedProperty for Result<RecordInfo, ConfigurationError> {}
}

use sealed::TypedProperty;

/// Static storage for information about one non-generic type.
pub struct NonGenericTypeCell<T: TypedProperty>(OnceLock<T>);

/// Caches the [`DeclaredType`] of a non-generic type.
///
/// ```
/// use vc_serial::impls::NonGenericDeclaredTypeCell;
/// use vc_serial::info::{DeclaredType, Typed};
///
/// struct Celsius(f64);
///
/// impl Typed for Celsius {
///     fn declared_type() -> &'static DeclaredType {
///         static CELL: NonGenericDeclaredTypeCell = NonGenericDeclaredTypeCell::new();
///         CELL.get_or_init(DeclaredType::scalar::<Self>)
///     }
/// }
///
/// assert!(std::ptr::eq(Celsius::declared_type(), Celsius::declared_type()));
/// ```
pub type NonGenericDeclaredTypeCell = NonGenericTypeCell<DeclaredType>;

/// Caches the field table of a non-generic record.
pub type NonGenericRecordInfoCell = NonGenericTypeCell<Result<RecordInfo, ConfigurationError>>;

impl<T: TypedProperty> NonGenericTypeCell<T> {
    /// Create a empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored value, generating it with `f` on first access.
    #[inline]
    pub fn get_or_init<F>(&self, f: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.0.get_or_init(f)
    }
}

type TypeIdMap<T> = HashMap<TypeId, T, FixedState>;

/// Static storage for information about every instantiation of a generic type.
pub struct GenericTypeCell<T: TypedProperty>(RwLock<Option<TypeIdMap<&'static T>>>);

/// Caches the [`DeclaredType`]s of a generic type.
///
/// See [`Typed`](crate::info::Typed) for an example.
pub type GenericDeclaredTypeCell = GenericTypeCell<DeclaredType>;

/// Caches the field tables of a generic record.
pub type GenericRecordInfoCell = GenericTypeCell<Result<RecordInfo, ConfigurationError>>;

impl<T: TypedProperty> GenericTypeCell<T> {
    /// Create a empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(None))
    }

    /// Returns the entry for `G`, generating it with `f` if there is none.
    ///
    /// `f` runs without holding the lock, so it may describe other types.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> T) -> &T {
        // Separate to reduce code compilation times
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> T) -> &T {
        match self.get_by_type_id(type_id) {
            Some(info) => info,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&T> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()?
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, value: T) -> &T {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        *guard
            .get_or_insert_with(TypeIdMap::default)
            .entry(type_id)
            .or_insert_with(|| Box::leak(Box::new(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::GenericDeclaredTypeCell;
    use crate::info::DeclaredType;

    #[test]
    fn one_entry_per_type() {
        static CELL: GenericDeclaredTypeCell = GenericDeclaredTypeCell::new();

        let a = CELL.get_or_insert::<u8>(DeclaredType::scalar::<u8>);
        let b = CELL.get_or_insert::<u16>(DeclaredType::scalar::<u16>);
        let c = CELL.get_or_insert::<u8>(|| unreachable!());

        assert!(a.is::<u8>());
        assert!(b.is::<u16>());
        assert!(core::ptr::eq(a, c));
    }
}
