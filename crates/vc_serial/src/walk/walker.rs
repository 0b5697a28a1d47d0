use alloc::boxed::Box;
use core::any::Any;

use crate::error::SerialError;
use crate::info::{DeclaredType, Shape, Typed};
use crate::record::Record;
use crate::registry::ConverterRegistry;
use crate::value::Primitive;
use crate::walk::WalkOptions;

/// Converts values against one [`ConverterRegistry`].
///
/// Walks are stateless apart from the borrowed registry, so one walker can
/// be reused for any number of calls. Converters receive the walker and
/// recurse through it.
///
/// # Example
///
/// ```
/// use vc_serial::derive::Record;
/// use vc_serial::registry::ConverterRegistry;
/// use vc_serial::value::Primitive;
/// use vc_serial::walk::{WalkOptions, Walker};
///
/// #[derive(Record, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let registry = ConverterRegistry::new();
/// let walker = Walker::new(&registry);
///
/// let primitive = walker.serialize(&Point { x: 1, y: -1 }).unwrap();
/// assert_eq!(primitive.to_string(), r#"{"x": 1, "y": -1}"#);
///
/// let strict = Walker::with_options(&registry, WalkOptions::default().deny_unknown_keys());
/// let mut input = primitive.as_mapping().unwrap().clone();
/// input.insert("z", Primitive::from(0));
///
/// let input = Primitive::Mapping(input);
/// assert_eq!(walker.deserialize::<Point>(&input).unwrap(), Point { x: 1, y: -1 });
/// assert!(strict.deserialize::<Point>(&input).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Walker<'a> {
    registry: &'a ConverterRegistry,
    options: WalkOptions,
}

impl<'a> Walker<'a> {
    #[inline]
    pub fn new(registry: &'a ConverterRegistry) -> Self {
        Self::with_options(registry, WalkOptions::default())
    }

    #[inline]
    pub const fn with_options(registry: &'a ConverterRegistry, options: WalkOptions) -> Self {
        Self { registry, options }
    }

    #[inline]
    pub const fn registry(&self) -> &'a ConverterRegistry {
        self.registry
    }

    #[inline]
    pub const fn options(&self) -> WalkOptions {
        self.options
    }

    /// Converts `record` into a mapping of its included fields.
    ///
    /// Any failure aborts the whole call; no partial mapping is returned.
    #[inline]
    pub fn serialize<R: Record>(&self, record: &R) -> Result<Primitive, SerialError> {
        self.to_primitive_of(record)
    }

    /// Builds an `R` from a mapping.
    ///
    /// `R::construct` is called once, after every field was resolved.
    #[inline]
    pub fn deserialize<R: Record>(&self, primitive: &Primitive) -> Result<R, SerialError> {
        self.from_primitive_as::<R>(primitive)
    }

    /// Converts a value of the declared type `ty`.
    pub fn to_primitive(&self, value: &dyn Any, ty: &DeclaredType) -> Result<Primitive, SerialError> {
        if let Shape::Record(shape) = ty.shape() {
            return self.record_to_primitive(value, ty, shape);
        }
        self.registry
            .resolve(ty)?
            .to_primitive(value, ty, self)
            .map_err(|e| e.with_value_type(ty.type_path()))
    }

    /// Rebuilds a value of the declared type `ty`.
    ///
    /// The returned box always holds a value of type `ty`.
    pub fn from_primitive(
        &self,
        primitive: &Primitive,
        ty: &DeclaredType,
    ) -> Result<Box<dyn Any>, SerialError> {
        if let Shape::Record(shape) = ty.shape() {
            return self.record_from_primitive(primitive, ty, shape);
        }
        let value = self
            .registry
            .resolve(ty)?
            .from_primitive(primitive, ty, self)
            .map_err(|e| e.with_value_type(ty.type_path()))?;
        if (*value).type_id() != ty.type_id() {
            return Err(SerialError::value_type(ty));
        }
        Ok(value)
    }

    /// Typed shorthand for [`Walker::to_primitive`].
    #[inline]
    pub fn to_primitive_of<T: Typed>(&self, value: &T) -> Result<Primitive, SerialError> {
        self.to_primitive(value, T::declared_type())
    }

    /// Typed shorthand for [`Walker::from_primitive`].
    pub fn from_primitive_as<T: Typed>(&self, primitive: &Primitive) -> Result<T, SerialError> {
        let ty = T::declared_type();
        self.from_primitive(primitive, ty)?
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| SerialError::value_type(ty))
    }
}
