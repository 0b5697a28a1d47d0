use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::error::ConstructError;

/// Field values resolved by deserialization, handed to
/// [`Record::construct`](crate::record::Record::construct) by name.
///
/// Excluded fields never appear here.
#[derive(Default)]
pub struct FieldValues {
    values: Vec<(&'static str, Box<dyn Any>)>,
}

impl FieldValues {
    #[inline]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Adds a resolved value, replacing any earlier value for `name`.
    pub fn insert(&mut self, name: &'static str, value: Box<dyn Any>) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    /// Typed shorthand for [`FieldValues::insert`].
    #[inline]
    pub fn insert_value<T: Any>(&mut self, name: &'static str, value: T) {
        self.insert(name, Box::new(value));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(n, _)| *n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.iter().map(|(name, _)| *name)
    }

    /// Removes the value of `name` as a `T`.
    ///
    /// # Example
    ///
    /// ```
    /// use vc_serial::error::ConstructError;
    /// use vc_serial::record::FieldValues;
    ///
    /// let mut values = FieldValues::new();
    /// values.insert_value("x", 3_i32);
    /// values.insert_value("label", String::from("a"));
    ///
    /// assert_eq!(values.take::<i32>("x"), Ok(3));
    /// assert!(matches!(values.take::<i32>("x"), Err(ConstructError::MissingValue(_))));
    /// assert!(matches!(values.take::<u8>("label"), Err(ConstructError::ValueType { .. })));
    /// ```
    pub fn take<T: Any>(&mut self, name: &str) -> Result<T, ConstructError> {
        let index = self
            .values
            .iter()
            .position(|(n, _)| *n == name)
            .ok_or_else(|| ConstructError::MissingValue(name.to_owned()))?;
        let (_, value) = self.values.swap_remove(index);
        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| ConstructError::ValueType {
                field: name.to_owned(),
                expected: core::any::type_name::<T>(),
            })
    }
}

impl fmt::Debug for FieldValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
