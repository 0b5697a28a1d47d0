use alloc::borrow::Cow;
use core::fmt;

use thiserror::Error;

use crate::info::DeclaredType;
use crate::value::Primitive;

// -----------------------------------------------------------------------------
// ConfigurationError

/// A record's field table or an enumeration's member list is invalid.
///
/// Raised while the table is built, which happens once per type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurationError {
    #[error("field `{field}` declares both a default value and a default factory")]
    ConflictingDefaults { field: &'static str },

    #[error("field `{field}` uses serialized key `{key}`, which is already taken by field `{other}`")]
    DuplicateKey {
        field: &'static str,
        key: String,
        other: &'static str,
    },

    #[error("field `{0}` is declared more than once")]
    DuplicateField(&'static str),

    #[error("a record must declare at least one field")]
    NoFields,

    #[error("field `{field}` is a `{expected}`, but its converter handles `{found}`")]
    ConverterType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("members `{member}` and `{other}` are both stored as {value}")]
    DuplicateMember {
        member: &'static str,
        other: &'static str,
        value: String,
    },
}

// -----------------------------------------------------------------------------
// ConstructError

/// A record constructor refused the resolved field values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConstructError {
    #[error("no value was resolved for field `{0}`")]
    MissingValue(String),

    #[error("the value resolved for field `{field}` is not a `{expected}`")]
    ValueType {
        field: String,
        expected: &'static str,
    },

    #[error("{0}")]
    Rejected(String),
}

impl ConstructError {
    /// Wraps a validation failure message.
    pub fn rejected(message: impl fmt::Display) -> Self {
        ConstructError::Rejected(message.to_string())
    }
}

// -----------------------------------------------------------------------------
// ErrorKind

/// What went wrong during a walk.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    #[error("invalid record configuration: {0}")]
    Configuration(ConfigurationError),

    #[error("no converter is registered for `{type_path}`")]
    NoConverter { type_path: &'static str },

    #[error("failed to convert a `{type_path}` value: {message}")]
    Conversion {
        type_path: &'static str,
        message: String,
    },

    #[error("required key `{key}` is missing")]
    MissingField { key: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: Cow<'static, str>,
        found: Cow<'static, str>,
    },

    #[error("unknown key `{key}`")]
    UnknownKey { key: String },

    #[error("the record exposes no value for a declared field")]
    FieldAccess,

    #[error("construction was rejected: {0}")]
    Construct(ConstructError),
}

// -----------------------------------------------------------------------------
// FieldPath

/// One step from a record down to the failing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(&'static str),
    Index(usize),
    Key(String),
}

/// The route from the outermost record to the failing value,
/// displayed like `orders[2].sku` or `labels["en"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    fn push_front(&mut self, segment: PathSegment) {
        self.0.insert(0, segment);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if index == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// SerialError

/// Where an error happened: the innermost record and field, and the full path.
#[derive(Debug, Clone, Default, PartialEq)]
struct Location {
    record: Option<&'static str>,
    field: Option<&'static str>,
    path: FieldPath,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.record, self.field) {
            (Some(record), Some(field)) => write!(f, " (field `{field}` of `{record}`")?,
            (Some(record), None) => write!(f, " (in `{record}`")?,
            _ => return Ok(()),
        }
        if self.path.0.len() > 1 {
            write!(f, ", at `{}`", self.path)?;
        }
        f.write_str(")")
    }
}

/// The error returned by serialization and deserialization.
///
/// Carries an [`ErrorKind`] plus the record type, field name and field path
/// of the innermost record that failed.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}{location}")]
pub struct SerialError {
    kind: ErrorKind,
    location: Location,
}

impl SerialError {
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: Location::default(),
        }
    }

    /// A converter failed on a value.
    ///
    /// The value's type is filled in by the walker.
    pub fn conversion(message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Conversion {
            type_path: "",
            message: message.to_string(),
        })
    }

    /// The primitive has the wrong shape for the declared type.
    pub fn mismatch(expected: impl Into<Cow<'static, str>>, found: &Primitive) -> Self {
        Self::mismatch_with(expected, found.kind().as_str())
    }

    /// Like [`SerialError::mismatch`] with a free-form description of what was found.
    pub fn mismatch_with(
        expected: impl Into<Cow<'static, str>>,
        found: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        })
    }

    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The innermost record type involved, if any.
    #[inline]
    pub fn record(&self) -> Option<&'static str> {
        self.location.record
    }

    /// The failing field of [`SerialError::record`].
    #[inline]
    pub fn field(&self) -> Option<&'static str> {
        self.location.field
    }

    /// The path from the outermost record.
    #[inline]
    pub fn path(&self) -> &FieldPath {
        &self.location.path
    }

    pub(crate) fn no_converter(ty: &DeclaredType) -> Self {
        Self::new(ErrorKind::NoConverter {
            type_path: ty.type_path(),
        })
    }

    /// A value handed to a converter is not of the type it was resolved for.
    pub(crate) fn value_type(ty: &DeclaredType) -> Self {
        Self::new(ErrorKind::Conversion {
            type_path: ty.type_path(),
            message: "the value does not have its declared type".to_owned(),
        })
    }

    pub(crate) fn missing_field(key: &str) -> Self {
        Self::new(ErrorKind::MissingField {
            key: key.to_owned(),
        })
    }

    pub(crate) fn unknown_key(record: &'static str, key: &str) -> Self {
        Self::new(ErrorKind::UnknownKey {
            key: key.to_owned(),
        })
        .in_record(record)
    }

    pub(crate) fn configuration(record: &'static str, error: ConfigurationError) -> Self {
        Self::new(ErrorKind::Configuration(error)).in_record(record)
    }

    pub(crate) fn construct(record: &'static str, error: ConstructError) -> Self {
        Self::new(ErrorKind::Construct(error)).in_record(record)
    }

    pub(crate) fn field_access() -> Self {
        Self::new(ErrorKind::FieldAccess)
    }

    /// Fills in the value type of a conversion error raised without one.
    pub(crate) fn with_value_type(mut self, type_path: &'static str) -> Self {
        if let ErrorKind::Conversion { type_path: slot, .. } = &mut self.kind
            && slot.is_empty()
        {
            *slot = type_path;
        }
        self
    }

    pub(crate) fn in_record(mut self, record: &'static str) -> Self {
        if self.location.record.is_none() {
            self.location.record = Some(record);
        }
        self
    }

    /// Records that the error happened inside `field` of `record`.
    pub(crate) fn within(mut self, record: &'static str, field: &'static str) -> Self {
        if self.location.record.is_none() {
            self.location.record = Some(record);
            self.location.field = Some(field);
        }
        self.location.path.push_front(PathSegment::Field(field));
        self
    }

    pub(crate) fn at_index(mut self, index: usize) -> Self {
        self.location.path.push_front(PathSegment::Index(index));
        self
    }

    pub(crate) fn at_key(mut self, key: &str) -> Self {
        self.location.path.push_front(PathSegment::Key(key.to_owned()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, SerialError};

    #[test]
    fn location_display() {
        let error = SerialError::conversion("bad digit")
            .with_value_type("u8")
            .within("demo::Line", "sku")
            .at_index(2)
            .within("demo::Order", "lines");

        assert_eq!(error.record(), Some("demo::Line"));
        assert_eq!(error.field(), Some("sku"));
        assert_eq!(error.path().to_string(), "lines[2].sku");
        assert_eq!(
            error.to_string(),
            "failed to convert a `u8` value: bad digit (field `sku` of `demo::Line`, at `lines[2].sku`)"
        );
    }

    #[test]
    fn value_type_is_filled_once() {
        let error = SerialError::conversion("x")
            .with_value_type("inner")
            .with_value_type("outer");
        assert!(matches!(
            error.kind(),
            ErrorKind::Conversion { type_path: "inner", .. }
        ));
    }

    #[test]
    fn single_segment_path_is_not_repeated() {
        let error = SerialError::missing_field("x").within("demo::Point", "x");
        assert_eq!(
            error.to_string(),
            "required key `x` is missing (field `x` of `demo::Point`)"
        );
    }
}
