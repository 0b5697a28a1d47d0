use core::any::Any;
use core::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::SerialError;
use crate::info::DeclaredType;
use crate::registry::Converter;
use crate::value::Primitive;

// -----------------------------------------------------------------------------
// ConverterRegistry

/// An ordered collection of [`Converter`]s.
///
/// Lookup walks the converters from the highest priority to the lowest and
/// returns the first whose predicate matches. [`register`] adds at the
/// highest priority, so a later registration overrides an earlier one for
/// the types both match, built-ins included. [`register_fallback`] adds at
/// the lowest priority.
///
/// Record types are never looked up here, the [`Walker`] recurses into them.
///
/// [`register`]: ConverterRegistry::register
/// [`register_fallback`]: ConverterRegistry::register_fallback
/// [`Walker`]: crate::walk::Walker
#[derive(Clone)]
pub struct ConverterRegistry {
    // lowest priority first
    converters: Vec<Converter>,
    #[cfg_attr(not(feature = "auto_register"), allow(dead_code))]
    auto_registered: bool,
}

impl Default for ConverterRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterRegistry {
    /// Creates a registry without any converter.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            converters: Vec::new(),
            auto_registered: false,
        }
    }

    /// Creates a registry holding the built-in converters.
    ///
    /// See [`registry`](crate::registry) for the list.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        crate::registry::builtin::register_builtins(&mut registry);
        registry
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Adds `converter` at the highest priority.
    pub fn register(&mut self, converter: Converter) {
        if self.converters.iter().any(|c| c.name() == converter.name()) {
            log::warn!(
                "converter `{}` registered again, the newest registration takes precedence",
                converter.name()
            );
        } else {
            log::debug!("registered converter `{}`", converter.name());
        }
        self.converters.push(converter);
    }

    /// Adds `converter` at the lowest priority.
    pub fn register_fallback(&mut self, converter: Converter) {
        log::debug!("registered fallback converter `{}`", converter.name());
        self.converters.insert(0, converter);
    }

    /// Registers a converter for exactly the type `T`.
    ///
    /// Shorthand for `register(Converter::of::<T>(..))`.
    pub fn register_type<T: Any>(
        &mut self,
        to_primitive: impl Fn(&T) -> Result<Primitive, SerialError> + Send + Sync + 'static,
        from_primitive: impl Fn(&Primitive) -> Result<T, SerialError> + Send + Sync + 'static,
    ) {
        self.register(Converter::of::<T>(to_primitive, from_primitive));
    }

    /// Returns the highest priority converter matching `ty`.
    ///
    /// # Example
    ///
    /// ```
    /// use vc_serial::error::ErrorKind;
    /// use vc_serial::info::Typed;
    /// use vc_serial::registry::{Converter, ConverterRegistry};
    /// use vc_serial::value::Primitive;
    ///
    /// let mut registry = ConverterRegistry::new();
    /// assert_eq!(registry.resolve(u8::declared_type()).unwrap().name(), "u8");
    ///
    /// registry.register(Converter::new(
    ///     "small numbers as strings",
    ///     |ty| ty.is::<u8>(),
    ///     |value, _, _| Ok(Primitive::from(value.downcast_ref::<u8>().unwrap().to_string())),
    ///     |_, _, _| unimplemented!(),
    /// ));
    /// assert_eq!(
    ///     registry.resolve(u8::declared_type()).unwrap().name(),
    ///     "small numbers as strings"
    /// );
    ///
    /// let empty = ConverterRegistry::empty();
    /// let error = empty.resolve(u8::declared_type()).unwrap_err();
    /// assert!(matches!(error.kind(), ErrorKind::NoConverter { type_path: "u8" }));
    /// ```
    pub fn resolve(&self, ty: &DeclaredType) -> Result<&Converter, SerialError> {
        self.converters
            .iter()
            .rev()
            .find(|converter| converter.matches(ty))
            .ok_or_else(|| SerialError::no_converter(ty))
    }

    /// Converters from the highest priority to the lowest.
    pub fn iter(&self) -> impl Iterator<Item = &Converter> + '_ {
        self.converters.iter().rev()
    }

    /// Registers every converter submitted with [`submit_converter`].
    ///
    /// Runs once per registry, later calls do nothing. Returns `false` if
    /// the `auto_register` feature is disabled.
    ///
    /// [`submit_converter`]: crate::submit_converter
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            if !self.auto_registered {
                self.auto_registered = true;
                crate::registry::auto_register::register_submitted(self);
            }
            true
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(Converter::name))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ConverterRegistryArc

/// A shareable [`ConverterRegistry`] behind a read-write lock.
#[derive(Clone, Default)]
pub struct ConverterRegistryArc {
    /// The wrapped [`ConverterRegistry`].
    pub internal: Arc<RwLock<ConverterRegistry>>,
}

impl ConverterRegistryArc {
    pub fn new(registry: ConverterRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`ConverterRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, ConverterRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`ConverterRegistry`].
    ///
    /// Must not be called from inside a converter: walks hold the read lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, ConverterRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ConverterRegistryArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.read(), f)
    }
}

#[cfg(test)]
mod tests {
    use core::any::Any;

    use super::ConverterRegistry;
    use crate::error::ErrorKind;
    use crate::info::Typed;
    use crate::registry::Converter;
    use crate::value::Primitive;

    fn constant(name: &'static str, value: i64) -> Converter {
        Converter::new(
            name,
            |ty| ty.is::<i64>(),
            move |_, _, _| Ok(Primitive::from(value)),
            move |_, _, _| Ok(Box::new(value) as Box<dyn Any>),
        )
    }

    #[test]
    fn newest_registration_wins() {
        let mut registry = ConverterRegistry::empty();
        registry.register(constant("first", 1));
        registry.register(constant("second", 2));
        assert_eq!(registry.resolve(i64::declared_type()).unwrap().name(), "second");

        registry.register_fallback(constant("fallback", 3));
        assert_eq!(registry.resolve(i64::declared_type()).unwrap().name(), "second");

        let order: Vec<_> = registry.iter().map(Converter::name).collect();
        assert_eq!(order, ["second", "first", "fallback"]);
    }

    #[test]
    fn unmatched_type_has_no_converter() {
        let mut registry = ConverterRegistry::empty();
        registry.register(constant("only", 1));
        let error = registry.resolve(u8::declared_type()).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::NoConverter { type_path: "u8" }));
    }

    #[test]
    fn builtins_cover_common_types() {
        let registry = ConverterRegistry::new();
        assert!(registry.resolve(String::declared_type()).is_ok());
        assert!(registry.resolve(<Vec<Option<u8>>>::declared_type()).is_ok());
        assert!(registry.resolve(<(bool, f32)>::declared_type()).is_ok());
        assert!(registry.resolve(std::path::PathBuf::declared_type()).is_ok());
    }
}
