use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;
use core::marker::PhantomData;

use crate::error::{ConfigurationError, SerialError};
use crate::info::{DeclaredType, TypeFn, Typed};
use crate::value::Primitive;
use crate::walk::Walker;

// -----------------------------------------------------------------------------
// FieldDefault

type Produce = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// What deserialization does when a field's key is absent.
#[derive(Clone)]
pub enum FieldDefault {
    /// Fail with [`ErrorKind::MissingField`](crate::error::ErrorKind::MissingField).
    Required,
    /// Use a clone of a fixed value.
    Value(Produce),
    /// Call a factory, producing a fresh value each time.
    Factory(Produce),
}

impl FieldDefault {
    #[inline]
    pub const fn is_required(&self) -> bool {
        matches!(self, FieldDefault::Required)
    }

    /// Produces the default, or `None` for a required field.
    pub fn produce(&self) -> Option<Box<dyn Any>> {
        match self {
            FieldDefault::Required => None,
            FieldDefault::Value(f) | FieldDefault::Factory(f) => Some(f()),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldDefault::Required => "Required",
            FieldDefault::Value(_) => "Value",
            FieldDefault::Factory(_) => "Factory",
        })
    }
}

// -----------------------------------------------------------------------------
// FieldConverter

type ToPrimitive = dyn Fn(&dyn Any, &Walker<'_>) -> Result<Primitive, SerialError> + Send + Sync;
type FromPrimitive =
    dyn Fn(&Primitive, &Walker<'_>) -> Result<Box<dyn Any>, SerialError> + Send + Sync;

/// An explicit converter attached to one field.
///
/// It takes precedence over both record recursion and the registry.
///
/// # Example
///
/// ```
/// use vc_serial::error::SerialError;
/// use vc_serial::info::FieldConverter;
/// use vc_serial::value::Primitive;
///
/// // Stores a flag as "yes" / "no".
/// let converter = FieldConverter::new::<bool>(
///     |flag| Ok(Primitive::from(if *flag { "yes" } else { "no" })),
///     |primitive| match primitive.as_str() {
///         Some("yes") => Ok(true),
///         Some("no") => Ok(false),
///         _ => Err(SerialError::conversion("expected `yes` or `no`")),
///     },
/// );
/// # let _ = converter;
/// ```
#[derive(Clone)]
pub struct FieldConverter {
    value_type: Option<(TypeId, &'static str)>,
    to_primitive: Arc<ToPrimitive>,
    from_primitive: Arc<FromPrimitive>,
}

impl FieldConverter {
    /// Creates a converter for values of type `T`.
    pub fn new<T: Any>(
        to_primitive: impl Fn(&T) -> Result<Primitive, SerialError> + Send + Sync + 'static,
        from_primitive: impl Fn(&Primitive) -> Result<T, SerialError> + Send + Sync + 'static,
    ) -> Self {
        let type_path = core::any::type_name::<T>();
        Self {
            value_type: Some((TypeId::of::<T>(), type_path)),
            to_primitive: Arc::new(move |value: &dyn Any, _: &Walker<'_>| {
                match value.downcast_ref::<T>() {
                    Some(value) => to_primitive(value).map_err(|e| e.with_value_type(type_path)),
                    None => Err(
                        SerialError::conversion("the value does not have its declared type")
                            .with_value_type(type_path),
                    ),
                }
            }),
            from_primitive: Arc::new(move |primitive: &Primitive, _: &Walker<'_>| {
                from_primitive(primitive)
                    .map(|value| Box::new(value) as Box<dyn Any>)
                    .map_err(|e| e.with_value_type(type_path))
            }),
        }
    }

    /// Creates a converter from type-erased functions that may recurse
    /// through the [`Walker`].
    ///
    /// The value type is unknown, so attaching it to a field is not checked.
    pub fn erased(
        to_primitive: impl Fn(&dyn Any, &Walker<'_>) -> Result<Primitive, SerialError>
        + Send
        + Sync
        + 'static,
        from_primitive: impl Fn(&Primitive, &Walker<'_>) -> Result<Box<dyn Any>, SerialError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            value_type: None,
            to_primitive: Arc::new(to_primitive),
            from_primitive: Arc::new(from_primitive),
        }
    }

    #[inline]
    pub fn to_primitive(&self, value: &dyn Any, walker: &Walker<'_>) -> Result<Primitive, SerialError> {
        (self.to_primitive)(value, walker)
    }

    #[inline]
    pub fn from_primitive(
        &self,
        primitive: &Primitive,
        walker: &Walker<'_>,
    ) -> Result<Box<dyn Any>, SerialError> {
        (self.from_primitive)(primitive, walker)
    }
}

impl fmt::Debug for FieldConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConverter")
            .field("value_type", &self.value_type.map(|(_, path)| path))
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// FieldInfo

/// Describes how one field of a record takes part in conversion.
#[derive(Clone)]
pub struct FieldInfo {
    name: &'static str,
    key: Cow<'static, str>,
    ty: TypeFn,
    include: bool,
    default: FieldDefault,
    converter: Option<FieldConverter>,
}

impl FieldInfo {
    /// The Rust field name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The key used in the serialized mapping.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn declared_type(&self) -> &'static DeclaredType {
        (self.ty)()
    }

    /// Whether the field is serialized and deserialized at all.
    #[inline]
    pub const fn is_included(&self) -> bool {
        self.include
    }

    #[inline]
    pub const fn default(&self) -> &FieldDefault {
        &self.default
    }

    #[inline]
    pub const fn converter(&self) -> Option<&FieldConverter> {
        self.converter.as_ref()
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("type_path", &self.declared_type().type_path())
            .field("include", &self.include)
            .field("default", &self.default)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// FieldBuilder

/// Starts describing the field `name` of type `T`.
///
/// # Example
///
/// ```
/// use vc_serial::info::{describe_field, FieldDefault};
///
/// let field = describe_field::<Vec<String>>("tags")
///     .key("labels")
///     .default_with(Vec::new)
///     .build()
///     .unwrap();
///
/// assert_eq!(field.key(), "labels");
/// assert!(matches!(field.default(), FieldDefault::Factory(_)));
///
/// let conflict = describe_field::<u8>("level")
///     .default_value(1)
///     .default_with(|| 2)
///     .build();
/// assert!(conflict.is_err());
/// ```
#[inline]
pub fn describe_field<T: Typed>(name: &'static str) -> FieldBuilder<T> {
    FieldBuilder {
        name,
        key: None,
        include: true,
        default: FieldDefault::Required,
        conflicting_defaults: false,
        converter: None,
        _marker: PhantomData,
    }
}

/// Builder returned by [`describe_field`].
pub struct FieldBuilder<T> {
    name: &'static str,
    key: Option<Cow<'static, str>>,
    include: bool,
    default: FieldDefault,
    conflicting_defaults: bool,
    converter: Option<FieldConverter>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Typed> FieldBuilder<T> {
    /// Overrides the serialized key, which defaults to the field name.
    pub fn key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets whether the field is serialized at all.
    pub fn include(mut self, include: bool) -> Self {
        self.include = include;
        self
    }

    /// Excludes the field from serialization and deserialization.
    pub fn exclude(self) -> Self {
        self.include(false)
    }

    /// Uses a clone of `value` when the key is absent.
    pub fn default_value(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        self.set_default(FieldDefault::Value(Arc::new(move || -> Box<dyn Any> {
            Box::new(value.clone())
        })));
        self
    }

    /// Calls `factory` when the key is absent.
    pub fn default_with(mut self, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.set_default(FieldDefault::Factory(Arc::new(move || -> Box<dyn Any> {
            Box::new(factory())
        })));
        self
    }

    /// Attaches an explicit converter.
    pub fn converter(mut self, converter: FieldConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    fn set_default(&mut self, default: FieldDefault) {
        if !self.default.is_required() {
            self.conflicting_defaults = true;
        }
        self.default = default;
    }

    /// Finishes the description.
    ///
    /// Fails if more than one default was given, or if the converter was
    /// made for another type than `T`.
    pub fn build(self) -> Result<FieldInfo, ConfigurationError> {
        if self.conflicting_defaults {
            return Err(ConfigurationError::ConflictingDefaults { field: self.name });
        }
        if let Some((type_id, type_path)) = self.converter.as_ref().and_then(|c| c.value_type)
            && type_id != TypeId::of::<T>()
        {
            return Err(ConfigurationError::ConverterType {
                field: self.name,
                expected: core::any::type_name::<T>(),
                found: type_path,
            });
        }
        Ok(FieldInfo {
            name: self.name,
            key: self.key.unwrap_or(Cow::Borrowed(self.name)),
            ty: T::declared_type,
            include: self.include,
            default: self.default,
            converter: self.converter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldConverter, describe_field};
    use crate::error::{ConfigurationError, SerialError};
    use crate::value::Primitive;

    fn small() -> FieldConverter {
        FieldConverter::new::<u8>(
            |value| Ok(Primitive::from(*value)),
            |_| Err(SerialError::conversion("unused")),
        )
    }

    #[test]
    fn converter_must_match_the_field_type() {
        let error = describe_field::<u16>("port").converter(small()).build().unwrap_err();
        assert_eq!(
            error,
            ConfigurationError::ConverterType {
                field: "port",
                expected: "u16",
                found: "u8",
            }
        );

        assert!(describe_field::<u8>("port").converter(small()).build().is_ok());
    }

    #[test]
    fn erased_converters_are_not_checked() {
        let erased = FieldConverter::erased(
            |_, _| Ok(Primitive::Null),
            |_, _| Err(SerialError::conversion("unused")),
        );
        assert!(describe_field::<u16>("port").converter(erased).build().is_ok());
    }

    #[test]
    fn one_default_only() {
        let error = describe_field::<u8>("level")
            .default_value(1)
            .default_with(|| 2)
            .build()
            .unwrap_err();
        assert_eq!(error, ConfigurationError::ConflictingDefaults { field: "level" });
    }
}
