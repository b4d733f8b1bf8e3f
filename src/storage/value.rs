//! Owned property values and the name-keyed property maps exchanged with the merge engine.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Property map keyed by property name. Iteration order is by key.
pub type PropertyMap = BTreeMap<String, PropValueOwned>;

/// Property value with owned data.
///
/// There is no null variant: a property is either present with a value or absent.
/// Equality is exact and type-aware, so `Int(1)` never equals `Float(1.0)` and
/// `Str("123")` never equals `Int(123)`. Floats use IEEE comparison; `NaN` equals nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum PropValueOwned {
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// Owned string.
    Str(String),
    /// Owned byte vector.
    Bytes(Vec<u8>),
    /// Date value represented as days since the Unix epoch.
    Date(i64),
    /// DateTime value represented as milliseconds since the Unix epoch.
    DateTime(i64),
    /// Homogeneous array of scalar values.
    List(Vec<PropValueOwned>),
}

/// Discriminant of a [`PropValueOwned`], used for homogeneity checks and index keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TypeTag {
    /// Boolean.
    Bool = 1,
    /// Integer.
    Int = 2,
    /// Float.
    Float = 3,
    /// String.
    String = 4,
    /// Bytes.
    Bytes = 5,
    /// Date.
    Date = 6,
    /// DateTime.
    DateTime = 7,
    /// List.
    List = 8,
}

/// Rejected property value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid value for property '{key}': {reason}")]
pub struct ValueError {
    /// Property key carrying the bad value.
    pub key: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

impl PropValueOwned {
    /// Returns the type tag of this value.
    pub fn tag(&self) -> TypeTag {
        match self {
            PropValueOwned::Bool(_) => TypeTag::Bool,
            PropValueOwned::Int(_) => TypeTag::Int,
            PropValueOwned::Float(_) => TypeTag::Float,
            PropValueOwned::Str(_) => TypeTag::String,
            PropValueOwned::Bytes(_) => TypeTag::Bytes,
            PropValueOwned::Date(_) => TypeTag::Date,
            PropValueOwned::DateTime(_) => TypeTag::DateTime,
            PropValueOwned::List(_) => TypeTag::List,
        }
    }

    /// Checks that list values are flat and hold a single element type.
    pub fn check_shape(&self) -> std::result::Result<(), &'static str> {
        let PropValueOwned::List(items) = self else {
            return Ok(());
        };
        let mut first: Option<TypeTag> = None;
        for item in items {
            let tag = item.tag();
            if tag == TypeTag::List {
                return Err("nested arrays are not supported");
            }
            match first {
                None => first = Some(tag),
                Some(expected) if expected != tag => {
                    return Err("array elements must all have the same type");
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Encodes the value into an index key. Equal values share a key; numeric keys sort in
    /// value order.
    ///
    /// The leading tag byte keeps values of different types apart, so index lookups never
    /// coerce across types.
    pub fn index_key(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        self.write_key(&mut out);
        out
    }

    fn write_key(&self, out: &mut Vec<u8>) {
        out.push(self.tag() as u8);
        match self {
            PropValueOwned::Bool(v) => out.push(u8::from(*v)),
            PropValueOwned::Int(v) | PropValueOwned::Date(v) | PropValueOwned::DateTime(v) => {
                out.extend_from_slice(&encode_i64_key(*v))
            }
            PropValueOwned::Float(v) => out.extend_from_slice(&encode_f64_key(*v)),
            PropValueOwned::Str(s) => encode_bytes_key(s.as_bytes(), out),
            PropValueOwned::Bytes(b) => encode_bytes_key(b, out),
            PropValueOwned::List(items) => {
                out.extend_from_slice(&(items.len() as u32).to_be_bytes());
                for item in items {
                    item.write_key(out);
                }
            }
        }
    }
}

fn encode_i64_key(value: i64) -> [u8; 8] {
    ((value as u64) ^ 0x8000_0000_0000_0000).to_be_bytes()
}

fn encode_f64_key(value: f64) -> [u8; 8] {
    // -0.0 == 0.0 under IEEE equality, so both must share a key.
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits();
    let ordered = if bits & 0x8000_0000_0000_0000 != 0 {
        !bits
    } else {
        bits ^ 0x8000_0000_0000_0000
    };
    ordered.to_be_bytes()
}

fn encode_bytes_key(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

/// Returns true when `props` holds, for every key of `identity`, an equal value.
///
/// An empty identity is satisfied by every property map.
pub fn identity_matches(props: &PropertyMap, identity: &PropertyMap) -> bool {
    identity
        .iter()
        .all(|(key, wanted)| props.get(key).is_some_and(|have| have == wanted))
}

/// Returns `base` overlaid with `overlay`; keys present in both take the overlay's value.
pub fn overlay(base: &PropertyMap, overlay: &PropertyMap) -> PropertyMap {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

impl fmt::Display for PropValueOwned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValueOwned::Bool(v) => write!(f, "{v}"),
            PropValueOwned::Int(v) => write!(f, "{v}"),
            PropValueOwned::Float(v) => write!(f, "{v}"),
            PropValueOwned::Str(v) => write!(f, "{v:?}"),
            PropValueOwned::Bytes(v) => write!(f, "bytes(len={})", v.len()),
            PropValueOwned::Date(v) => write!(f, "date({v})"),
            PropValueOwned::DateTime(v) => write!(f, "datetime({v})"),
            PropValueOwned::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for PropValueOwned {
    fn from(value: &str) -> Self {
        PropValueOwned::Str(value.to_owned())
    }
}

impl From<String> for PropValueOwned {
    fn from(value: String) -> Self {
        PropValueOwned::Str(value)
    }
}

impl From<bool> for PropValueOwned {
    fn from(value: bool) -> Self {
        PropValueOwned::Bool(value)
    }
}

impl From<i64> for PropValueOwned {
    fn from(value: i64) -> Self {
        PropValueOwned::Int(value)
    }
}

impl From<f64> for PropValueOwned {
    fn from(value: f64) -> Self {
        PropValueOwned::Float(value)
    }
}

impl From<Vec<u8>> for PropValueOwned {
    fn from(value: Vec<u8>) -> Self {
        PropValueOwned::Bytes(value)
    }
}

macro_rules! impl_list_from {
    ($($elem:ty),+) => {
        $(
            impl From<Vec<$elem>> for PropValueOwned {
                fn from(value: Vec<$elem>) -> Self {
                    PropValueOwned::List(value.into_iter().map(PropValueOwned::from).collect())
                }
            }
        )+
    };
}

impl_list_from!(&str, String, bool, i64, f64);

/// Converts a JSON scalar or array into a property value.
pub fn value_from_json(key: &str, value: &serde_json::Value) -> Result<PropValueOwned, ValueError> {
    use serde_json::Value;
    let err = |reason| ValueError {
        key: key.to_owned(),
        reason,
    };
    let converted = match value {
        Value::Null => return Err(err("null is not a storable property value")),
        Value::Bool(v) => PropValueOwned::Bool(*v),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                PropValueOwned::Int(i)
            } else if let Some(f) = n.as_f64() {
                PropValueOwned::Float(f)
            } else {
                return Err(err("number out of range"));
            }
        }
        Value::String(s) => PropValueOwned::Str(s.clone()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                if item.is_array() {
                    return Err(err("nested arrays are not supported"));
                }
                out.push(value_from_json(key, item)?);
            }
            PropValueOwned::List(out)
        }
        Value::Object(_) => return Err(err("maps are not storable property values")),
    };
    converted.check_shape().map_err(err)?;
    Ok(converted)
}

/// Converts a JSON object into a property map. JSON `null` means "no map supplied".
pub fn props_from_json(value: &serde_json::Value) -> Result<Option<PropertyMap>, ValueError> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => {
            let mut props = PropertyMap::new();
            for (key, value) in map {
                props.insert(key.clone(), value_from_json(key, value)?);
            }
            Ok(Some(props))
        }
        _ => Err(ValueError {
            key: String::new(),
            reason: "property map must be a JSON object or null",
        }),
    }
}

/// Builds a [`PropertyMap`] from `key => value` pairs.
#[macro_export]
macro_rules! props {
    () => { $crate::storage::PropertyMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::storage::PropertyMap::new();
        $( map.insert(::std::string::String::from($key), $crate::storage::PropValueOwned::from($value)); )+
        map
    }};
}
