use core::fmt;
use core::str::FromStr;

/// A numeric primitive.
///
/// Integers keep their signedness so that the full `i64` and `u64` ranges
/// survive a round trip. Equality is numeric across the two integer
/// variants (`Int(5) == UInt(5)`), but an integer never equals a float.
#[derive(Clone, Copy, Debug)]
pub enum Number {
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating point number.
    Float(f64),
}

impl Number {
    /// Returns the value as `i64` if it is an integer within range.
    #[inline]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(v),
            Number::UInt(v) => i64::try_from(v).ok(),
            Number::Float(_) => None,
        }
    }

    /// Returns the value as `u64` if it is a non-negative integer.
    #[inline]
    pub fn as_u64(self) -> Option<u64> {
        match self {
            Number::Int(v) => u64::try_from(v).ok(),
            Number::UInt(v) => Some(v),
            Number::Float(_) => None,
        }
    }

    /// Returns the value as `f64`, possibly losing precision for large integers.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::UInt(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    /// Returns `true` for the two integer variants.
    #[inline]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Number::Float(_))
    }

    #[inline]
    fn as_i128(self) -> Option<i128> {
        match self {
            Number::Int(v) => Some(v as i128),
            Number::UInt(v) => Some(v as i128),
            Number::Float(_) => None,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Float(a), Number::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (a, b) => match (a.as_i128(), b.as_i128()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => fmt::Display::fmt(v, f),
            Number::UInt(v) => fmt::Display::fmt(v, f),
            Number::Float(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// Error returned when a string is not a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a number")]
pub struct ParseNumberError(pub String);

impl FromStr for Number {
    type Err = ParseNumberError;

    /// Parses integers first, so `"1"` becomes `Int(1)` and `"1.0"` becomes `Float(1.0)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Number::Int(v));
        }
        if let Ok(v) = s.parse::<u64>() {
            return Ok(Number::UInt(v));
        }
        s.parse::<f64>()
            .map(Number::Float)
            .map_err(|_| ParseNumberError(s.to_owned()))
    }
}

macro_rules! impl_number_from {
    ($variant:ident as $target:ty: $($ty:ty),*) => {$(
        impl From<$ty> for Number {
            #[inline]
            fn from(value: $ty) -> Self {
                Number::$variant(value as $target)
            }
        }
    )*};
}

impl_number_from!(Int as i64: i8, i16, i32, i64, isize);
impl_number_from!(UInt as u64: u8, u16, u32, u64, usize);
impl_number_from!(Float as f64: f32, f64);

#[cfg(test)]
mod tests {
    use super::Number;

    #[test]
    fn integer_equality_ignores_signedness() {
        assert_eq!(Number::Int(5), Number::UInt(5));
        assert_ne!(Number::Int(-1), Number::UInt(u64::MAX));
        assert_ne!(Number::Int(1), Number::Float(1.0));
        assert_eq!(Number::Float(f64::NAN), Number::Float(f64::NAN));
    }

    #[test]
    fn range_checked_accessors() {
        assert_eq!(Number::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Number::Int(-3).as_u64(), None);
        assert_eq!(Number::Int(7).as_u64(), Some(7));
        assert_eq!(Number::Float(2.5).as_i64(), None);
    }

    #[test]
    fn parse_prefers_integers() {
        assert!(matches!("12".parse::<Number>(), Ok(Number::Int(12))));
        assert!(matches!("18446744073709551615".parse::<Number>(), Ok(Number::UInt(u64::MAX))));
        assert!(matches!("1.5".parse::<Number>(), Ok(Number::Float(v)) if v == 1.5));
        assert!("one".parse::<Number>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for n in [Number::Int(-4), Number::UInt(9), Number::Float(0.1)] {
            assert_eq!(n.to_string().parse::<Number>().ok(), Some(n));
        }
    }
}
