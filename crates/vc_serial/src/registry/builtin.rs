use alloc::boxed::Box;
use core::any::Any;
use core::time::Duration;
use std::path::PathBuf;

use crate::error::{ErrorKind, SerialError};
use crate::info::{DeclaredType, EnumShape, Shape};
use crate::registry::{Converter, ConverterRegistry};
use crate::value::{Mapping, Number, Primitive};
use crate::walk::Walker;

/// Registers the built-in converters, structural ones first.
pub(crate) fn register_builtins(registry: &mut ConverterRegistry) {
    registry.register(optional());
    registry.register(sequence());
    registry.register(set());
    registry.register(tuple());
    registry.register(map());
    registry.register(enumeration());

    register_scalars(registry);

    registry.register_type::<PathBuf>(path_to_primitive, path_from_primitive);
    registry.register_type::<Duration>(duration_to_primitive, duration_from_primitive);

    #[cfg(feature = "chrono")]
    crate::registry::temporal::register_temporal(registry);
}

// -----------------------------------------------------------------------------
// Helpers

pub(crate) fn expect_str(primitive: &Primitive) -> Result<&str, SerialError> {
    primitive
        .as_str()
        .ok_or_else(|| SerialError::mismatch("string", primitive))
}

fn expect_number(primitive: &Primitive) -> Result<Number, SerialError> {
    primitive
        .as_number()
        .ok_or_else(|| SerialError::mismatch("number", primitive))
}

fn expect_sequence(primitive: &Primitive) -> Result<&[Primitive], SerialError> {
    primitive
        .as_sequence()
        .ok_or_else(|| SerialError::mismatch("sequence", primitive))
}

fn expect_mapping(primitive: &Primitive) -> Result<&Mapping, SerialError> {
    primitive
        .as_mapping()
        .ok_or_else(|| SerialError::mismatch("mapping", primitive))
}

/// Converters are only resolved for types their predicate matched, so a
/// shape mismatch here is a broken predicate.
fn shape_error(ty: &DeclaredType) -> SerialError {
    SerialError::conversion(format!("unexpected {} shape", ty.shape().name()))
        .with_value_type(ty.type_path())
}

fn rebuild_error(ty: &DeclaredType) -> SerialError {
    SerialError::conversion("the converted elements could not be assembled")
        .with_value_type(ty.type_path())
}

// -----------------------------------------------------------------------------
// Optional

fn optional() -> Converter {
    Converter::new(
        "optional",
        |ty| matches!(ty.shape(), Shape::Optional(_)),
        |value, ty, walker| {
            let Shape::Optional(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            match shape.unwrap(value) {
                None => Err(SerialError::value_type(ty)),
                Some(None) => Ok(Primitive::Null),
                Some(Some(inner)) => walker.to_primitive(inner, shape.inner()),
            }
        },
        |primitive, ty, walker| {
            let Shape::Optional(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            let inner = match primitive {
                Primitive::Null => None,
                primitive => Some(walker.from_primitive(primitive, shape.inner())?),
            };
            shape.wrap(inner).ok_or_else(|| rebuild_error(ty))
        },
    )
}

// -----------------------------------------------------------------------------
// Sequences and sets

fn items_to_primitive(
    items: Vec<&dyn Any>,
    item_ty: &DeclaredType,
    walker: &Walker<'_>,
) -> Result<Primitive, SerialError> {
    let mut sequence = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        sequence.push(
            walker
                .to_primitive(item, item_ty)
                .map_err(|e| e.at_index(index))?,
        );
    }
    Ok(Primitive::Sequence(sequence))
}

fn items_from_primitive(
    primitive: &Primitive,
    item_ty: &DeclaredType,
    walker: &Walker<'_>,
) -> Result<Vec<Box<dyn Any>>, SerialError> {
    let sequence = expect_sequence(primitive)?;
    let mut items = Vec::with_capacity(sequence.len());
    for (index, item) in sequence.iter().enumerate() {
        items.push(
            walker
                .from_primitive(item, item_ty)
                .map_err(|e| e.at_index(index))?,
        );
    }
    Ok(items)
}

fn sequence() -> Converter {
    Converter::new(
        "sequence",
        |ty| matches!(ty.shape(), Shape::Sequence(_)),
        |value, ty, walker| {
            let Shape::Sequence(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            let items = shape.items(value).ok_or_else(|| SerialError::value_type(ty))?;
            items_to_primitive(items, shape.item(), walker)
        },
        |primitive, ty, walker| {
            let Shape::Sequence(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            let items = items_from_primitive(primitive, shape.item(), walker)?;
            shape.collect(items).ok_or_else(|| rebuild_error(ty))
        },
    )
}

/// Sets become sequences; rebuilding a set drops duplicates.
fn set() -> Converter {
    Converter::new(
        "set",
        |ty| matches!(ty.shape(), Shape::Set(_)),
        |value, ty, walker| {
            let Shape::Set(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            let items = shape.items(value).ok_or_else(|| SerialError::value_type(ty))?;
            items_to_primitive(items, shape.item(), walker)
        },
        |primitive, ty, walker| {
            let Shape::Set(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            let items = items_from_primitive(primitive, shape.item(), walker)?;
            shape.collect(items).ok_or_else(|| rebuild_error(ty))
        },
    )
}

// -----------------------------------------------------------------------------
// Tuple

fn tuple() -> Converter {
    Converter::new(
        "tuple",
        |ty| matches!(ty.shape(), Shape::Tuple(_)),
        |value, ty, walker| {
            let Shape::Tuple(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            let elements = shape.split(value).ok_or_else(|| SerialError::value_type(ty))?;
            let mut sequence = Vec::with_capacity(elements.len());
            for (index, element) in elements.into_iter().enumerate() {
                let element_ty = shape.element(index).ok_or_else(|| rebuild_error(ty))?;
                sequence.push(
                    walker
                        .to_primitive(element, element_ty)
                        .map_err(|e| e.at_index(index))?,
                );
            }
            Ok(Primitive::Sequence(sequence))
        },
        |primitive, ty, walker| {
            let Shape::Tuple(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            let sequence = expect_sequence(primitive)?;
            if sequence.len() != shape.arity() {
                return Err(SerialError::mismatch_with(
                    format!("sequence of length {}", shape.arity()),
                    format!("sequence of length {}", sequence.len()),
                ));
            }
            let mut elements = Vec::with_capacity(sequence.len());
            for (index, item) in sequence.iter().enumerate() {
                let element_ty = shape.element(index).ok_or_else(|| rebuild_error(ty))?;
                elements.push(
                    walker
                        .from_primitive(item, element_ty)
                        .map_err(|e| e.at_index(index))?,
                );
            }
            shape.assemble(elements).ok_or_else(|| rebuild_error(ty))
        },
    )
}

// -----------------------------------------------------------------------------
// Map

/// Mapping keys are strings; numbers and booleans are written in their
/// textual form.
fn key_to_string(primitive: Primitive) -> Result<String, SerialError> {
    match primitive {
        Primitive::String(key) => Ok(key),
        Primitive::Number(key) => Ok(key.to_string()),
        Primitive::Bool(key) => Ok(key.to_string()),
        other => Err(SerialError::mismatch("string, number or bool key", &other)),
    }
}

/// Tries the key as a string first, then as the number or bool it spells.
fn key_from_string(
    key: &str,
    key_ty: &DeclaredType,
    walker: &Walker<'_>,
) -> Result<Box<dyn Any>, SerialError> {
    let error = match walker.from_primitive(&Primitive::from(key), key_ty) {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };
    let parsed = match key {
        "true" => Primitive::Bool(true),
        "false" => Primitive::Bool(false),
        _ => match key.parse::<Number>() {
            Ok(number) => Primitive::Number(number),
            Err(_) => return Err(error),
        },
    };
    walker.from_primitive(&parsed, key_ty).map_err(|_| error)
}

fn map() -> Converter {
    Converter::new(
        "map",
        |ty| matches!(ty.shape(), Shape::Map(_)),
        |value, ty, walker| {
            let Shape::Map(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            let entries = shape.entries(value).ok_or_else(|| SerialError::value_type(ty))?;
            let (key_ty, value_ty) = (shape.key(), shape.value());
            let mut mapping = Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                let key = key_to_string(walker.to_primitive(key, key_ty)?)?;
                let value = walker
                    .to_primitive(value, value_ty)
                    .map_err(|e| e.at_key(&key))?;
                mapping.insert(key, value);
            }
            Ok(Primitive::Mapping(mapping))
        },
        |primitive, ty, walker| {
            let Shape::Map(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            let mapping = expect_mapping(primitive)?;
            let (key_ty, value_ty) = (shape.key(), shape.value());
            let mut entries = Vec::with_capacity(mapping.len());
            for (key, value) in mapping.iter() {
                let native_key = key_from_string(key, key_ty, walker).map_err(|e| e.at_key(key))?;
                let native_value = walker
                    .from_primitive(value, value_ty)
                    .map_err(|e| e.at_key(key))?;
                entries.push((native_key, native_value));
            }
            shape.collect(entries).ok_or_else(|| rebuild_error(ty))
        },
    )
}

// -----------------------------------------------------------------------------
// Enumeration

fn enumeration() -> Converter {
    Converter::new(
        "enum",
        |ty| matches!(ty.shape(), Shape::Enum(_)),
        |value, ty, _| {
            let Shape::Enum(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            check_members(shape, ty)?;
            shape
                .member_of(value)
                .map(|member| member.value().clone())
                .ok_or_else(|| SerialError::value_type(ty))
        },
        |primitive, ty, _| {
            let Shape::Enum(shape) = ty.shape() else {
                return Err(shape_error(ty));
            };
            check_members(shape, ty)?;
            shape.instantiate(primitive).ok_or_else(|| {
                SerialError::conversion(format!("{primitive} is not a member"))
                    .with_value_type(ty.type_path())
            })
        },
    )
}

fn check_members(shape: &EnumShape, ty: &DeclaredType) -> Result<(), SerialError> {
    shape
        .check()
        .map_err(|error| {
            SerialError::new(ErrorKind::Configuration(error)).in_record(ty.type_path())
        })
}

// -----------------------------------------------------------------------------
// Scalars

fn register_scalars(registry: &mut ConverterRegistry) {
    registry.register_type::<()>(
        |_| Ok(Primitive::Null),
        |primitive| match primitive {
            Primitive::Null => Ok(()),
            other => Err(SerialError::mismatch("null", other)),
        },
    );

    registry.register_type::<bool>(
        |value| Ok(Primitive::Bool(*value)),
        |primitive| {
            primitive
                .as_bool()
                .ok_or_else(|| SerialError::mismatch("bool", primitive))
        },
    );

    registry.register_type::<String>(
        |value| Ok(Primitive::String(value.clone())),
        |primitive| expect_str(primitive).map(str::to_owned),
    );

    registry.register_type::<char>(
        |value| Ok(Primitive::String(value.to_string())),
        |primitive| {
            let text = expect_str(primitive)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(SerialError::conversion(format!(
                    "{primitive} is not a single character"
                ))),
            }
        },
    );

    macro_rules! register_ints {
        ($as_wide:ident: $($ty:ty),*) => {$(
            registry.register_type::<$ty>(
                |value| Ok(Primitive::from(*value)),
                |primitive| {
                    let number = expect_number(primitive)?;
                    if !number.is_integer() {
                        return Err(SerialError::mismatch_with("integer", "floating point number"));
                    }
                    number
                        .$as_wide()
                        .and_then(|wide| <$ty>::try_from(wide).ok())
                        .ok_or_else(|| SerialError::conversion(format!("{number} is out of range")))
                },
            );
        )*};
    }

    register_ints!(as_i64: i8, i16, i32, i64, isize);
    register_ints!(as_u64: u8, u16, u32, u64, usize);

    registry.register_type::<f32>(
        |value| Ok(Primitive::from(*value)),
        |primitive| {
            let number = expect_number(primitive)?;
            let wide = number.as_f64();
            if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
                return Err(SerialError::conversion(format!("{number} is out of range")));
            }
            Ok(wide as f32)
        },
    );

    registry.register_type::<f64>(
        |value| Ok(Primitive::from(*value)),
        |primitive| expect_number(primitive).map(Number::as_f64),
    );
}

// -----------------------------------------------------------------------------
// Standard library types

fn path_to_primitive(path: &PathBuf) -> Result<Primitive, SerialError> {
    path.to_str()
        .map(Primitive::from)
        .ok_or_else(|| SerialError::conversion("the path is not valid UTF-8"))
}

fn path_from_primitive(primitive: &Primitive) -> Result<PathBuf, SerialError> {
    expect_str(primitive).map(PathBuf::from)
}

/// Durations are written as `"{seconds}.{nanoseconds:09}s"`.
fn duration_to_primitive(duration: &Duration) -> Result<Primitive, SerialError> {
    Ok(Primitive::String(format!(
        "{}.{:09}s",
        duration.as_secs(),
        duration.subsec_nanos()
    )))
}

fn duration_from_primitive(primitive: &Primitive) -> Result<Duration, SerialError> {
    let text = expect_str(primitive)?;
    let invalid = || SerialError::conversion(format!("{primitive} is not a duration like \"1.5s\""));

    let body = text.strip_suffix('s').ok_or_else(invalid)?;
    let (secs, nanos) = match body.split_once('.') {
        Some((secs, fraction)) => {
            if fraction.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let scale = 10u32.pow(9 - fraction.len() as u32);
            let nanos = fraction.parse::<u32>().map_err(|_| invalid())? * scale;
            (secs, nanos)
        }
        None => (body, 0),
    };
    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let secs = secs.parse::<u64>().map_err(|_| invalid())?;
    Ok(Duration::new(secs, nanos))
}

#[cfg(test)]
mod tests {
    use core::time::Duration;
    use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
    use std::path::PathBuf;

    use crate::error::{ConfigurationError, ErrorKind};
    use crate::impls::NonGenericDeclaredTypeCell;
    use crate::info::{DeclaredType, EnumMember, Typed};
    use crate::record::Enumeration;
    use crate::registry::ConverterRegistry;
    use crate::value::{Number, Primitive};
    use crate::walk::Walker;

    fn round_trip<T: Typed + PartialEq + core::fmt::Debug>(value: T) -> Primitive {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let primitive = walker.to_primitive_of(&value).unwrap();
        let back = walker.from_primitive_as::<T>(&primitive).unwrap();
        assert_eq!(back, value);
        primitive
    }

    #[test]
    fn scalars_round_trip() {
        assert_eq!(round_trip(()), Primitive::Null);
        assert_eq!(round_trip(true), Primitive::Bool(true));
        assert_eq!(round_trip('λ'), Primitive::from("λ"));
        assert_eq!(round_trip(String::from("text")), Primitive::from("text"));
        assert_eq!(round_trip(i64::MIN), Primitive::Number(Number::Int(i64::MIN)));
        assert_eq!(round_trip(u64::MAX), Primitive::Number(Number::UInt(u64::MAX)));
        assert_eq!(round_trip(-7_i8), Primitive::from(-7));
        round_trip(0.1_f32);
        round_trip(f64::MAX);
    }

    #[test]
    fn integers_are_range_checked() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);

        let error = walker.from_primitive_as::<u8>(&Primitive::from(300)).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Conversion { type_path: "u8", .. }));

        let error = walker.from_primitive_as::<i32>(&Primitive::from(1.5)).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::TypeMismatch { .. }));

        let error = walker.from_primitive_as::<u32>(&Primitive::from("1")).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn narrow_floats_are_range_checked() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);

        let error = walker.from_primitive_as::<f32>(&Primitive::from(1e300_f64)).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Conversion { type_path: "f32", .. }));

        let value = walker.from_primitive_as::<f32>(&Primitive::from(-2.5_f64)).unwrap();
        assert_eq!(value, -2.5);
        let value = walker.from_primitive_as::<f32>(&Primitive::from(f64::INFINITY)).unwrap();
        assert_eq!(value, f32::INFINITY);
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Clash {
        First,
        Second,
    }

    impl Typed for Clash {
        fn declared_type() -> &'static DeclaredType {
            static CELL: NonGenericDeclaredTypeCell = NonGenericDeclaredTypeCell::new();
            CELL.get_or_init(DeclaredType::enumeration::<Self>)
        }
    }

    impl Enumeration for Clash {
        fn members() -> Vec<EnumMember> {
            vec![EnumMember::new("First", 1_i64), EnumMember::new("Second", 1_u8)]
        }

        fn member_index(&self) -> usize {
            *self as usize
        }

        fn from_member_index(index: usize) -> Option<Self> {
            [Self::First, Self::Second].get(index).copied()
        }
    }

    #[test]
    fn members_sharing_a_value_are_rejected() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);

        let expected = ConfigurationError::DuplicateMember {
            member: "Second",
            other: "First",
            value: "1".to_owned(),
        };
        let error = walker.to_primitive_of(&Clash::Second).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::Configuration(expected.clone()));
        let error = walker.from_primitive_as::<Clash>(&Primitive::from(1)).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::Configuration(expected));
    }

    #[test]
    fn containers_round_trip() {
        assert_eq!(
            round_trip(vec![1_u8, 2, 3]),
            Primitive::Sequence(vec![Primitive::from(1), Primitive::from(2), Primitive::from(3)])
        );
        round_trip(VecDeque::from([Some(1.5_f64), None]));
        round_trip(BTreeSet::from(["b".to_owned(), "a".to_owned()]));
        round_trip(BTreeMap::from([(3_u16, vec![true]), (1, vec![])]));
        round_trip(HashMap::from([(false, 'x'), (true, 'y')]));
        round_trip(Some((1_i32, String::from("pair"))));
    }

    #[test]
    fn tuple_restores_exact_types() {
        let primitive = round_trip((1_u8, -2_i64, 3.5_f32));
        assert_eq!(primitive.as_sequence().map(<[Primitive]>::len), Some(3));

        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let short = Primitive::Sequence(vec![Primitive::from(1)]);
        let error = walker.from_primitive_as::<(u8, u8)>(&short).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn set_drops_duplicates() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let primitive = Primitive::Sequence(vec![Primitive::from(2), Primitive::from(2)]);
        let set = walker.from_primitive_as::<BTreeSet<u8>>(&primitive).unwrap();
        assert_eq!(set, BTreeSet::from([2]));
    }

    #[test]
    fn map_keys_become_strings() {
        let primitive = round_trip(BTreeMap::from([(10_u32, "ten".to_owned())]));
        assert_eq!(primitive.get("10"), Some(&Primitive::from("ten")));

        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let bad: Primitive = Primitive::Mapping([("ten", Primitive::from("x"))].into_iter().collect());
        let error = walker.from_primitive_as::<BTreeMap<u32, String>>(&bad).unwrap_err();
        assert_eq!(error.path().to_string(), r#"["ten"]"#);
    }

    #[test]
    fn element_errors_carry_their_index() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let primitive = Primitive::Sequence(vec![Primitive::from(1), Primitive::from("two")]);
        let error = walker.from_primitive_as::<Vec<u8>>(&primitive).unwrap_err();
        assert_eq!(error.path().to_string(), "[1]");
    }

    #[test]
    fn paths_and_durations() {
        assert_eq!(
            round_trip(PathBuf::from("assets/icon.png")),
            Primitive::from("assets/icon.png")
        );
        assert_eq!(
            round_trip(Duration::new(90, 5_000_000)),
            Primitive::from("90.005000000s")
        );

        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let parse = |text: &str| walker.from_primitive_as::<Duration>(&Primitive::from(text));
        assert_eq!(parse("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse("0.25s").unwrap(), Duration::from_millis(250));
        assert!(parse("-1s").is_err());
        assert!(parse("1.s").is_err());
        assert!(parse("1.5").is_err());
    }
}
