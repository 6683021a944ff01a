//! Untyped data model for payloads whose shape is not contractually stable.
//!
//! Records and app views drift across API surfaces and service versions, so
//! rather than committing to a schema the client decodes them into [`Data`]
//! and reads fields by path.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use smol_str::SmolStr;

/// A generic tree-structured value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Data {
    /// JSON `null`, or an absent value
    #[default]
    Null,
    /// Boolean
    Boolean(bool),
    /// Integer that fits in an i64
    Integer(i64),
    /// Any other number
    Float(f64),
    /// String
    String(SmolStr),
    /// Sequence
    Array(Array),
    /// Mapping with string keys
    Object(Object),
}

/// A sequence of [`Data`] values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array(pub Vec<Data>);

/// A string-keyed mapping of [`Data`] values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object(pub BTreeMap<SmolStr, Data>);

impl Data {
    /// Look up a key if this is an object.
    pub fn get(&self, key: &str) -> Option<&Data> {
        match self {
            Data::Object(obj) => obj.0.get(key),
            _ => None,
        }
    }

    /// Walk a key path through nested objects.
    ///
    /// Returns `None` as soon as a step is missing or lands on a non-object.
    pub fn get_path(&self, path: &[&str]) -> Option<&Data> {
        path.iter().try_fold(self, |data, key| data.get(key))
    }

    /// String value at a key path, if present and a string.
    pub fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.get_path(path).and_then(Data::as_str)
    }

    /// Array elements at a key path, if present and an array.
    pub fn array_at(&self, path: &[&str]) -> Option<&[Data]> {
        self.get_path(path).and_then(Data::as_array)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Data::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Data::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Data::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Data]> {
        match self {
            Data::Array(arr) => Some(&arr.0),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<SmolStr, Data>> {
        match self {
            Data::Object(obj) => Some(&obj.0),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Data::Null)
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Data::Null => "null",
            Data::Boolean(_) => "boolean",
            Data::Integer(_) => "integer",
            Data::Float(_) => "float",
            Data::String(_) => "string",
            Data::Array(_) => "array",
            Data::Object(_) => "object",
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Null => f.write_str("null"),
            Data::Boolean(b) => write!(f, "{b}"),
            Data::Integer(i) => write!(f, "{i}"),
            Data::Float(n) => write!(f, "{n}"),
            Data::String(s) => write!(f, "{s:?}"),
            Data::Array(arr) => {
                f.write_str("[")?;
                for (i, item) in arr.0.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Data::Object(obj) => {
                f.write_str("{")?;
                for (i, (key, value)) in obj.0.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key:?}:{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl<'de> Deserialize<'de> for Data {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DataVisitor)
    }
}

struct DataVisitor;

impl<'de> Visitor<'de> for DataVisitor {
    type Value = Data;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any valid JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Data, E> {
        Ok(Data::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Data, E> {
        Ok(Data::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Data, E> {
        Ok(i64::try_from(v)
            .map(Data::Integer)
            .unwrap_or(Data::Float(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Data, E> {
        Ok(Data::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Data, E> {
        Ok(Data::String(SmolStr::new(v)))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Data, E> {
        Ok(Data::String(SmolStr::from(v)))
    }

    fn visit_none<E: de::Error>(self) -> Result<Data, E> {
        Ok(Data::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Data, E> {
        Ok(Data::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Data, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Data, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Data::Array(Array(items)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Data, A::Error> {
        let mut obj = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<SmolStr, Data>()? {
            obj.insert(key, value);
        }
        Ok(Data::Object(Object(obj)))
    }
}
