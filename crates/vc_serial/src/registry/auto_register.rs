use crate::registry::{Converter, ConverterRegistry};

/// A converter constructor submitted with [`submit_converter`](crate::submit_converter).
pub struct AutoConverter(pub fn() -> Converter);

inventory::collect!(AutoConverter);

pub(crate) fn register_submitted(registry: &mut ConverterRegistry) {
    for submitted in inventory::iter::<AutoConverter> {
        registry.register((submitted.0)());
    }
}

/// Submits a converter constructor for [`ConverterRegistry::auto_register`].
///
/// The process-wide registry calls `auto_register` when it is first used,
/// so submitted converters apply to [`serialize`](crate::serialize) and
/// [`deserialize`](crate::deserialize) without explicit setup.
///
/// # Example
///
/// ```
/// use vc_serial::registry::{Converter, ConverterRegistry};
/// use vc_serial::value::Primitive;
///
/// struct Version(u16, u16);
///
/// vc_serial::impl_typed_scalar!(Version);
///
/// fn version_converter() -> Converter {
///     Converter::of::<Version>(
///         |v| Ok(Primitive::from(format!("{}.{}", v.0, v.1))),
///         |_| unimplemented!(),
///     )
/// }
///
/// vc_serial::submit_converter!(version_converter);
///
/// let mut registry = ConverterRegistry::empty();
/// assert!(registry.auto_register());
/// assert_eq!(registry.len(), 1);
/// ```
#[macro_export]
macro_rules! submit_converter {
    ($constructor:path) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoConverter($constructor)
        }
    };
}
