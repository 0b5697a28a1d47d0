use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::error::SerialError;
use crate::info::DeclaredType;
use crate::value::Primitive;
use crate::walk::Walker;

type Matches = dyn Fn(&DeclaredType) -> bool + Send + Sync;
type ToPrimitive =
    dyn Fn(&dyn Any, &DeclaredType, &Walker<'_>) -> Result<Primitive, SerialError> + Send + Sync;
type FromPrimitive = dyn Fn(&Primitive, &DeclaredType, &Walker<'_>) -> Result<Box<dyn Any>, SerialError>
    + Send
    + Sync;

/// A pair of inverse functions between a family of declared types and
/// their primitive representation.
///
/// `matches` decides which declared types the converter handles. Both
/// directions receive the declared type they were resolved for and the
/// [`Walker`], so container converters can recurse into their elements.
///
/// A converter must satisfy `from_primitive(to_primitive(v)) == v` for every
/// value it accepts.
#[derive(Clone)]
pub struct Converter {
    name: Cow<'static, str>,
    matches: Arc<Matches>,
    to_primitive: Arc<ToPrimitive>,
    from_primitive: Arc<FromPrimitive>,
}

impl Converter {
    /// Creates a converter from type-erased functions.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        matches: impl Fn(&DeclaredType) -> bool + Send + Sync + 'static,
        to_primitive: impl Fn(&dyn Any, &DeclaredType, &Walker<'_>) -> Result<Primitive, SerialError>
        + Send
        + Sync
        + 'static,
        from_primitive: impl Fn(&Primitive, &DeclaredType, &Walker<'_>) -> Result<Box<dyn Any>, SerialError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            matches: Arc::new(matches),
            to_primitive: Arc::new(to_primitive),
            from_primitive: Arc::new(from_primitive),
        }
    }

    /// Creates a converter for exactly the type `T`.
    ///
    /// # Example
    ///
    /// ```
    /// use vc_serial::error::SerialError;
    /// use vc_serial::info::Typed;
    /// use vc_serial::registry::{Converter, ConverterRegistry};
    /// use vc_serial::value::Primitive;
    /// use vc_serial::walk::Walker;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Hex(u32);
    ///
    /// vc_serial::impl_typed_scalar!(Hex);
    ///
    /// let mut registry = ConverterRegistry::new();
    /// registry.register(Converter::of::<Hex>(
    ///     |hex| Ok(Primitive::from(format!("{:x}", hex.0))),
    ///     |primitive| {
    ///         let text = primitive
    ///             .as_str()
    ///             .ok_or_else(|| SerialError::mismatch("string", primitive))?;
    ///         u32::from_str_radix(text, 16)
    ///             .map(Hex)
    ///             .map_err(SerialError::conversion)
    ///     },
    /// ));
    ///
    /// let walker = Walker::new(&registry);
    /// let primitive = walker.to_primitive_of(&Hex(255)).unwrap();
    /// assert_eq!(primitive, Primitive::from("ff"));
    /// assert_eq!(walker.from_primitive_as::<Hex>(&primitive).unwrap(), Hex(255));
    /// ```
    pub fn of<T: Any>(
        to_primitive: impl Fn(&T) -> Result<Primitive, SerialError> + Send + Sync + 'static,
        from_primitive: impl Fn(&Primitive) -> Result<T, SerialError> + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            core::any::type_name::<T>(),
            DeclaredType::is::<T>,
            move |value: &dyn Any, ty: &DeclaredType, _: &Walker<'_>| match value.downcast_ref::<T>() {
                Some(value) => to_primitive(value),
                None => Err(SerialError::value_type(ty)),
            },
            move |primitive: &Primitive, _: &DeclaredType, _: &Walker<'_>| {
                from_primitive(primitive).map(|value| Box::new(value) as Box<dyn Any>)
            },
        )
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn matches(&self, ty: &DeclaredType) -> bool {
        (self.matches)(ty)
    }

    #[inline]
    pub fn to_primitive(
        &self,
        value: &dyn Any,
        ty: &DeclaredType,
        walker: &Walker<'_>,
    ) -> Result<Primitive, SerialError> {
        (self.to_primitive)(value, ty, walker)
    }

    #[inline]
    pub fn from_primitive(
        &self,
        primitive: &Primitive,
        ty: &DeclaredType,
        walker: &Walker<'_>,
    ) -> Result<Box<dyn Any>, SerialError> {
        (self.from_primitive)(primitive, ty, walker)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Converter").field(&self.name).finish()
    }
}
