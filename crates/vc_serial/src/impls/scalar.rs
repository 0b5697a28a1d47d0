use core::time::Duration;
use std::path::PathBuf;

/// Implements [`Typed`](crate::info::Typed) for leaf types.
///
/// The types are described as [`Shape::Scalar`](crate::info::Shape::Scalar),
/// a converter for each must be registered before they can be converted.
///
/// # Example
///
/// ```
/// use vc_serial::impl_typed_scalar;
/// use vc_serial::info::{Shape, Typed};
///
/// struct Rgb(u8, u8, u8);
///
/// impl_typed_scalar!(Rgb);
///
/// assert!(matches!(Rgb::declared_type().shape(), Shape::Scalar));
/// ```
#[macro_export]
macro_rules! impl_typed_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::info::Typed for $ty {
            fn declared_type() -> &'static $crate::info::DeclaredType {
                static CELL: $crate::impls::NonGenericDeclaredTypeCell =
                    $crate::impls::NonGenericDeclaredTypeCell::new();
                CELL.get_or_init($crate::info::DeclaredType::scalar::<$ty>)
            }
        }
    )*};
}

impl_typed_scalar!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    PathBuf,
    Duration,
);

#[cfg(feature = "chrono")]
impl_typed_scalar!(
    std::time::SystemTime,
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::FixedOffset>,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
);
