use alloc::boxed::Box;
use core::any::Any;

use crate::error::SerialError;
use crate::info::{DeclaredType, FieldInfo, RecordInfo, RecordShape};
use crate::record::FieldValues;
use crate::value::{Mapping, Primitive};
use crate::walk::Walker;

impl Walker<'_> {
    pub(super) fn record_to_primitive(
        &self,
        record: &dyn Any,
        ty: &DeclaredType,
        shape: &RecordShape,
    ) -> Result<Primitive, SerialError> {
        let info = shape
            .info()
            .map_err(|e| SerialError::configuration(ty.type_path(), e))?;
        log::trace!("serializing `{}`", info.type_path());

        let mut mapping = Mapping::with_capacity(info.len());
        for field in info.included() {
            let primitive = shape
                .field(record, field.name())
                .ok_or_else(SerialError::field_access)
                .and_then(|value| self.field_to_primitive(field, value))
                .map_err(|e| e.within(info.type_path(), field.name()))?;
            mapping.insert(field.key(), primitive);
        }
        Ok(Primitive::Mapping(mapping))
    }

    pub(super) fn record_from_primitive(
        &self,
        primitive: &Primitive,
        ty: &DeclaredType,
        shape: &RecordShape,
    ) -> Result<Box<dyn Any>, SerialError> {
        let info = shape
            .info()
            .map_err(|e| SerialError::configuration(ty.type_path(), e))?;
        log::trace!("deserializing `{}`", info.type_path());

        let values = self.resolve_fields(primitive, info)?;
        shape
            .construct(values)
            .map_err(|e| SerialError::construct(info.type_path(), e))
    }

    fn field_to_primitive(&self, field: &FieldInfo, value: &dyn Any) -> Result<Primitive, SerialError> {
        let ty = field.declared_type();
        match field.converter() {
            Some(converter) => converter
                .to_primitive(value, self)
                .map_err(|e| e.with_value_type(ty.type_path())),
            None => self.to_primitive(value, ty),
        }
    }

    fn field_from_primitive(
        &self,
        field: &FieldInfo,
        primitive: &Primitive,
    ) -> Result<Box<dyn Any>, SerialError> {
        let ty = field.declared_type();
        match field.converter() {
            Some(converter) => converter
                .from_primitive(primitive, self)
                .map_err(|e| e.with_value_type(ty.type_path())),
            None => self.from_primitive(primitive, ty),
        }
    }

    /// Resolves every included field of `info` from `primitive`.
    ///
    /// Absent keys fall back to the field default. Excluded fields are
    /// neither read nor resolved.
    fn resolve_fields(&self, primitive: &Primitive, info: &RecordInfo) -> Result<FieldValues, SerialError> {
        let mapping = primitive
            .as_mapping()
            .ok_or_else(|| SerialError::mismatch("mapping", primitive).in_record(info.type_path()))?;

        for key in mapping.keys() {
            if info.field_by_key(key).is_some_and(FieldInfo::is_included) {
                continue;
            }
            if self.options().deny_unknown_keys {
                return Err(SerialError::unknown_key(info.type_path(), key));
            }
            log::debug!("ignoring unknown key `{key}` of `{}`", info.type_path());
        }

        let mut values = FieldValues::with_capacity(info.len());
        for field in info.included() {
            let value = match mapping.get(field.key()) {
                Some(primitive) => self.field_from_primitive(field, primitive),
                None => field
                    .default()
                    .produce()
                    .ok_or_else(|| SerialError::missing_field(field.key())),
            }
            .map_err(|e| e.within(info.type_path(), field.name()))?;
            values.insert(field.name(), value);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use crate::derive::{Enumeration, Record};
    use crate::error::{ConstructError, ErrorKind, SerialError};
    use crate::registry::ConverterRegistry;
    use crate::value::{Mapping, Primitive};
    use crate::walk::{WalkOptions, Walker};

    fn mapping<const N: usize>(entries: [(&str, Primitive); N]) -> Primitive {
        Primitive::Mapping(entries.into_iter().collect())
    }

    #[derive(Record, Debug, PartialEq)]
    struct Inner {
        x: i32,
    }

    #[derive(Record, Debug, PartialEq)]
    struct Outer {
        inner: Inner,
    }

    #[test]
    fn nested_record_becomes_nested_mapping() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let outer = Outer {
            inner: Inner { x: 1 },
        };

        let primitive = walker.serialize(&outer).unwrap();
        assert_eq!(primitive, mapping([("inner", mapping([("x", Primitive::from(1))]))]));
        assert_eq!(walker.deserialize::<Outer>(&primitive).unwrap(), outer);
    }

    #[derive(Record, Debug, PartialEq)]
    struct Order {
        #[serial(key = "ID")]
        id: u64,
        customer: Option<String>,
        #[serial(default_with = Vec::new)]
        lines: Vec<Line>,
        #[serial(skip, default)]
        cached_total: u32,
    }

    #[derive(Record, Debug, PartialEq, Clone)]
    struct Line {
        sku: String,
        quantity: u16,
        #[serial(default = 1.0)]
        factor: f64,
    }

    #[test]
    fn output_follows_declaration_order() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let order = Order {
            id: 7,
            customer: None,
            lines: vec![Line {
                sku: "A-1".into(),
                quantity: 2,
                factor: 0.5,
            }],
            cached_total: 99,
        };

        let primitive = walker.serialize(&order).unwrap();
        let keys: Vec<_> = primitive.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, ["ID", "customer", "lines"]);
        assert_eq!(primitive.get("customer"), Some(&Primitive::Null));

        let back = walker.deserialize::<Order>(&primitive).unwrap();
        assert_eq!(back, Order { cached_total: 0, ..order });
    }

    #[test]
    fn absent_keys_use_defaults() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);

        let order = walker
            .deserialize::<Order>(&mapping([("ID", Primitive::from(1)), ("customer", Primitive::from("ann"))]))
            .unwrap();
        assert!(order.lines.is_empty());
        assert_eq!(order.customer.as_deref(), Some("ann"));

        let line = walker
            .deserialize::<Line>(&mapping([("sku", Primitive::from("B")), ("quantity", Primitive::from(3))]))
            .unwrap();
        assert_eq!(line.factor, 1.0);
    }

    #[test]
    fn missing_required_field() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);

        let error = walker
            .deserialize::<Order>(&mapping([("customer", Primitive::Null)]))
            .unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::MissingField { key } if key == "ID"));
        assert_eq!(error.field(), Some("id"));
        assert!(error.record().unwrap().ends_with("Order"));
    }

    #[test]
    fn excluded_field_ignores_input() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);

        let input = mapping([
            ("ID", Primitive::from(1)),
            ("customer", Primitive::Null),
            ("cached_total", Primitive::from(500)),
        ]);
        assert_eq!(walker.deserialize::<Order>(&input).unwrap().cached_total, 0);

        let strict = Walker::with_options(&registry, WalkOptions::default().deny_unknown_keys());
        let error = strict.deserialize::<Order>(&input).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::UnknownKey { key } if key == "cached_total"));
    }

    #[test]
    fn nested_errors_carry_the_field_path() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);

        let line = |quantity: Primitive| mapping([("sku", Primitive::from("s")), ("quantity", quantity)]);
        let input = mapping([
            ("ID", Primitive::from(1)),
            ("customer", Primitive::Null),
            (
                "lines",
                Primitive::Sequence(vec![line(Primitive::from(1)), line(Primitive::from(-4))]),
            ),
        ]);

        let error = walker.deserialize::<Order>(&input).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Conversion { type_path: "u16", .. }));
        assert_eq!(error.path().to_string(), "lines[1].quantity");
        assert_eq!(error.field(), Some("quantity"));
        assert!(error.record().unwrap().ends_with("Line"));
    }

    #[test]
    fn shape_mismatch() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);

        let error = walker.deserialize::<Inner>(&Primitive::from("x")).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::TypeMismatch { .. }));

        let error = walker
            .deserialize::<Inner>(&mapping([("x", Primitive::from("one"))]))
            .unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::TypeMismatch { .. }));
        assert_eq!(error.field(), Some("x"));
    }

    static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    fn count_construction(_: &Wide) -> Result<(), String> {
        CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    #[derive(Record, Debug)]
    #[serial(validate = count_construction)]
    struct Wide {
        a: u8,
        b: u8,
        c: u8,
        d: u8,
        e: u8,
    }

    #[test]
    fn failing_field_constructs_nothing() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let input = |c: Primitive| {
            mapping([
                ("a", Primitive::from(1)),
                ("b", Primitive::from(2)),
                ("c", c),
                ("d", Primitive::from(4)),
                ("e", Primitive::from(5)),
            ])
        };

        let before = CONSTRUCTED.load(Ordering::SeqCst);
        let error = walker.deserialize::<Wide>(&input(Primitive::from(256))).unwrap_err();
        assert_eq!(error.field(), Some("c"));
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), before);

        let wide = walker.deserialize::<Wide>(&input(Primitive::from(3))).unwrap();
        assert_eq!((wide.a, wide.c, wide.e), (1, 3, 5));
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), before + 1);
    }

    fn ordered(range: &Range) -> Result<(), String> {
        if range.low <= range.high {
            Ok(())
        } else {
            Err(format!("{} is above {}", range.low, range.high))
        }
    }

    #[derive(Record, Debug, PartialEq)]
    #[serial(validate = ordered)]
    struct Range {
        low: i64,
        high: i64,
    }

    #[test]
    fn construction_runs_validation() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);

        let error = walker
            .deserialize::<Range>(&mapping([("low", Primitive::from(5)), ("high", Primitive::from(1))]))
            .unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::Construct(ConstructError::Rejected("5 is above 1".into()))
        );
    }

    #[derive(Record, Debug, PartialEq)]
    struct Triple {
        values: (u8, i16, f32),
    }

    #[test]
    fn tuple_field() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let triple = Triple { values: (1, 2, 3.0) };

        let primitive = walker.serialize(&triple).unwrap();
        assert_eq!(primitive.to_string(), r#"{"values": [1, 2, 3]}"#);
        assert_eq!(walker.deserialize::<Triple>(&primitive).unwrap(), triple);

        let short = mapping([("values", Primitive::Sequence(vec![Primitive::from(1)]))]);
        assert!(walker.deserialize::<Triple>(&short).is_err());
    }

    #[derive(Enumeration, Debug, PartialEq, Clone, Copy)]
    enum Level {
        Low = 1,
        High = 10,
    }

    #[derive(Enumeration, Debug, PartialEq, Clone, Copy)]
    #[serial(by_name)]
    enum Color {
        Red,
        #[serial(rename = "dark-green")]
        Green,
    }

    #[derive(Record, Debug, PartialEq)]
    struct Style {
        level: Level,
        color: Color,
        palette: BTreeMap<String, Color>,
    }

    #[test]
    fn enumerations_by_value_and_name() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let style = Style {
            level: Level::High,
            color: Color::Green,
            palette: BTreeMap::from([("accent".to_owned(), Color::Red)]),
        };

        let primitive = walker.serialize(&style).unwrap();
        assert_eq!(
            primitive.to_string(),
            r#"{"level": 10, "color": "dark-green", "palette": {"accent": "Red"}}"#
        );
        assert_eq!(walker.deserialize::<Style>(&primitive).unwrap(), style);

        let mut bad = primitive.as_mapping().unwrap().clone();
        bad.insert("level", Primitive::from(3));
        let error = walker.deserialize::<Style>(&Primitive::Mapping(bad)).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Conversion { .. }));
        assert_eq!(error.field(), Some("level"));
    }

    mod celsius {
        use crate::error::SerialError;
        use crate::value::Primitive;

        pub fn to_primitive(value: &f64) -> Result<Primitive, SerialError> {
            Ok(Primitive::from(format!("{value}C")))
        }

        pub fn from_primitive(primitive: &Primitive) -> Result<f64, SerialError> {
            primitive
                .as_str()
                .and_then(|text| text.strip_suffix('C'))
                .and_then(|text| text.parse().ok())
                .ok_or_else(|| SerialError::conversion("expected a temperature like `21.5C`"))
        }
    }

    #[derive(Record, Debug, PartialEq)]
    struct Reading {
        #[serial(with = celsius)]
        temperature: f64,
        samples: Vec<Option<u8>>,
    }

    #[test]
    fn field_converter_overrides_registry() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let reading = Reading {
            temperature: 21.5,
            samples: vec![Some(1), None],
        };

        let primitive = walker.serialize(&reading).unwrap();
        assert_eq!(primitive.to_string(), r#"{"temperature": "21.5C", "samples": [1, null]}"#);
        assert_eq!(walker.deserialize::<Reading>(&primitive).unwrap(), reading);

        let error = walker
            .deserialize::<Reading>(&mapping([
                ("temperature", Primitive::from(21.5)),
                ("samples", Primitive::Sequence(vec![])),
            ]))
            .unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Conversion { type_path: "f64", .. }));
    }

    #[test]
    fn registered_converter_overrides_builtin() {
        let mut registry = ConverterRegistry::new();
        registry.register_type::<i32>(
            |value| Ok(Primitive::from(value.to_string())),
            |primitive| {
                let text = primitive
                    .as_str()
                    .ok_or_else(|| SerialError::mismatch("string", primitive))?;
                text.parse().map_err(SerialError::conversion)
            },
        );
        let walker = Walker::new(&registry);

        let primitive = walker.serialize(&Inner { x: 12 }).unwrap();
        assert_eq!(primitive, mapping([("x", Primitive::from("12"))]));
        assert_eq!(walker.deserialize::<Inner>(&primitive).unwrap(), Inner { x: 12 });
    }

    #[derive(Record, Debug, PartialEq)]
    struct Page<T> {
        items: Vec<T>,
        #[serial(default)]
        cursor: Option<String>,
    }

    #[test]
    fn generic_record() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);

        let page = Page {
            items: vec![Inner { x: 1 }, Inner { x: 2 }],
            cursor: Some("next".into()),
        };
        let primitive = walker.serialize(&page).unwrap();
        assert_eq!(walker.deserialize::<Page<Inner>>(&primitive).unwrap(), page);

        let numbers = walker
            .deserialize::<Page<u8>>(&mapping([("items", Primitive::Sequence(vec![Primitive::from(9)]))]))
            .unwrap();
        assert_eq!(numbers, Page { items: vec![9], cursor: None });
    }

    #[test]
    fn walk_output_feeds_an_encoder() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let outer = Outer {
            inner: Inner { x: 1 },
        };

        let json = serde_json::to_string(&walker.serialize(&outer).unwrap()).unwrap();
        assert_eq!(json, r#"{"inner":{"x":1}}"#);

        let decoded: Primitive = serde_json::from_str(&json).unwrap();
        assert_eq!(walker.deserialize::<Outer>(&decoded).unwrap(), outer);
        let _: Mapping = serde_json::from_str(&json).unwrap();
    }
}
