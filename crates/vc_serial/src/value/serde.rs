//! Bridges [`Primitive`] to `serde`, so any serde format can encode the
//! primitive representation.

use core::fmt;

use serde_core::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Unexpected, Visitor};
use serde_core::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::value::{Mapping, Number, Primitive};

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Number::Int(v) => serializer.serialize_i64(v),
            Number::UInt(v) => serializer.serialize_u64(v),
            Number::Float(v) => serializer.serialize_f64(v),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Primitive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Primitive::Null => serializer.serialize_unit(),
            Primitive::Bool(v) => serializer.serialize_bool(*v),
            Primitive::Number(v) => v.serialize(serializer),
            Primitive::String(v) => serializer.serialize_str(v),
            Primitive::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Primitive::Mapping(mapping) => mapping.serialize(serializer),
        }
    }
}

struct PrimitiveVisitor;

impl<'de> Visitor<'de> for PrimitiveVisitor {
    type Value = Primitive;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a primitive value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Primitive, E> {
        Ok(Primitive::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Primitive, E> {
        Ok(Primitive::Number(Number::Int(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Primitive, E> {
        Ok(Primitive::Number(Number::UInt(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Primitive, E> {
        Ok(Primitive::Number(Number::Float(v)))
    }

    fn visit_char<E: de::Error>(self, v: char) -> Result<Primitive, E> {
        Ok(Primitive::String(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Primitive, E> {
        Ok(Primitive::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Primitive, E> {
        Ok(Primitive::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Primitive, E> {
        Ok(Primitive::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Primitive, E> {
        Ok(Primitive::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Primitive, D::Error> {
        Primitive::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Primitive, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Primitive>()? {
            items.push(item);
        }
        Ok(Primitive::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Primitive, A::Error> {
        let mut mapping = Mapping::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Primitive>()? {
            mapping.insert(key, value);
        }
        Ok(Primitive::Mapping(mapping))
    }
}

impl<'de> Deserialize<'de> for Primitive {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PrimitiveVisitor)
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Primitive::deserialize(deserializer)? {
            Primitive::Mapping(mapping) => Ok(mapping),
            other => Err(de::Error::invalid_type(
                Unexpected::Other(other.kind().as_str()),
                &"a mapping",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::value::{Number, Primitive};

    #[test]
    fn json_round_trip_keeps_order() {
        let text = r#"{"name":"box","size":[1,2.5,-3],"tags":null,"ok":true}"#;
        let value: Primitive = serde_json::from_str(text).unwrap();

        let mapping = value.as_mapping().unwrap();
        assert_eq!(mapping.keys().collect::<Vec<_>>(), ["name", "size", "tags", "ok"]);
        assert_eq!(
            value.get("size"),
            Some(&Primitive::Sequence(vec![
                Primitive::Number(Number::UInt(1)),
                Primitive::Number(Number::Float(2.5)),
                Primitive::Number(Number::Int(-3)),
            ]))
        );

        assert_eq!(serde_json::to_string(&value).unwrap(), text);
    }

    #[test]
    fn ron_round_trip() {
        let value = Primitive::Sequence(vec![
            Primitive::from("a"),
            Primitive::Null,
            Primitive::from(false),
        ]);
        let text = ron::to_string(&value).unwrap();
        let back: Primitive = ron::from_str(&text).unwrap();
        assert_eq!(back, value);
    }
}
