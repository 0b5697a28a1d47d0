use core::fmt;

use crate::value::{Mapping, Number};

/// The primitive representation produced by serialization.
///
/// Everything a record turns into is built from these six shapes, which map
/// directly onto the data model shared by common text formats.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Primitive {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Primitive>),
    Mapping(Mapping),
}

/// The shape of a [`Primitive`], used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
}

impl PrimitiveKind {
    /// Lower-case name used in error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Null => "null",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Number => "number",
            PrimitiveKind::String => "string",
            PrimitiveKind::Sequence => "sequence",
            PrimitiveKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Primitive {
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Null => PrimitiveKind::Null,
            Primitive::Bool(_) => PrimitiveKind::Bool,
            Primitive::Number(_) => PrimitiveKind::Number,
            Primitive::String(_) => PrimitiveKind::String,
            Primitive::Sequence(_) => PrimitiveKind::Sequence,
            Primitive::Mapping(_) => PrimitiveKind::Mapping,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Primitive::Null)
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_number(&self) -> Option<Number> {
        match self {
            Primitive::Number(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_sequence(&self) -> Option<&[Primitive]> {
        match self {
            Primitive::Sequence(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Primitive::Mapping(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up `key` if this is a mapping.
    ///
    /// ```
    /// use vc_serial::value::Primitive;
    ///
    /// let value = Primitive::Mapping([("x", Primitive::from(1))].into_iter().collect());
    /// assert_eq!(value.get("x"), Some(&Primitive::from(1)));
    /// assert_eq!(Primitive::Null.get("x"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<&Primitive> {
        self.as_mapping()?.get(key)
    }
}

/// Compact, JSON-like rendering used in diagnostics.
///
/// ```
/// use vc_serial::value::Primitive;
///
/// let value = Primitive::Sequence(vec![Primitive::from("a"), Primitive::Null, Primitive::from(1.5)]);
/// assert_eq!(value.to_string(), r#"["a", null, 1.5]"#);
/// ```
impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Null => f.write_str("null"),
            Primitive::Bool(v) => fmt::Display::fmt(v, f),
            Primitive::Number(v) => fmt::Display::fmt(v, f),
            Primitive::String(v) => write!(f, "{v:?}"),
            Primitive::Sequence(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
            Primitive::Mapping(mapping) => {
                f.write_str("{")?;
                for (index, (key, value)) in mapping.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_primitive_from_number {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Primitive {
            #[inline]
            fn from(value: $ty) -> Self {
                Primitive::Number(Number::from(value))
            }
        }
    )*};
}

impl_primitive_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<Number> for Primitive {
    #[inline]
    fn from(value: Number) -> Self {
        Primitive::Number(value)
    }
}

impl From<bool> for Primitive {
    #[inline]
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

impl From<String> for Primitive {
    #[inline]
    fn from(value: String) -> Self {
        Primitive::String(value)
    }
}

impl From<&str> for Primitive {
    #[inline]
    fn from(value: &str) -> Self {
        Primitive::String(value.to_owned())
    }
}

impl From<Vec<Primitive>> for Primitive {
    #[inline]
    fn from(value: Vec<Primitive>) -> Self {
        Primitive::Sequence(value)
    }
}

impl From<Mapping> for Primitive {
    #[inline]
    fn from(value: Mapping) -> Self {
        Primitive::Mapping(value)
    }
}

impl<T: Into<Primitive>> From<Option<T>> for Primitive {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Primitive::Null, Into::into)
    }
}
