//! Scalar values carried as query arguments and row cells.

use crate::error::{QuarryError, QuarryResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use uuid::Uuid;

/// A database value passed to or read from an executor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
}

impl Value {
    /// Serialize any value into a JSON cell.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> QuarryResult<Self> {
        Ok(Value::Json(serde_json::to_value(value)?))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, used in mapping errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::Json(_) => "json",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v:?}"),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Date(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )*
    };
}

value_from! {
    bool => |v| Value::Bool(v),
    i8 => |v| Value::Int(v.into()),
    i16 => |v| Value::Int(v.into()),
    i32 => |v| Value::Int(v.into()),
    i64 => |v| Value::Int(v),
    u8 => |v| Value::UInt(v.into()),
    u16 => |v| Value::UInt(v.into()),
    u32 => |v| Value::UInt(v.into()),
    u64 => |v| Value::UInt(v),
    f32 => |v| Value::Float(v.into()),
    f64 => |v| Value::Float(v),
    String => |v| Value::Text(v),
    &str => |v| Value::Text(v.to_owned()),
    &String => |v| Value::Text(v.clone()),
    Vec<u8> => |v| Value::Bytes(v),
    &[u8] => |v| Value::Bytes(v.to_vec()),
    NaiveDate => |v| Value::Date(v),
    NaiveDateTime => |v| Value::DateTime(v),
    DateTime<Utc> => |v| Value::Timestamp(v),
    Uuid => |v| Value::Uuid(v),
    serde_json::Value => |v| Value::Json(v),
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One bound slot produced by a build.
///
/// `Named` slots are placeholders whose value is supplied later by a binder.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Value(Value),
    Named(String),
}

impl Param {
    /// A slot resolved later by name.
    pub fn named(name: impl Into<String>) -> Self {
        Param::Named(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Param::Named(name) => Some(name),
            Param::Value(_) => None,
        }
    }

    /// Resolve into a driver value; unresolved names are an error.
    pub fn into_value(self) -> QuarryResult<Value> {
        match self {
            Param::Value(v) => Ok(v),
            Param::Named(name) => Err(QuarryError::RawNamedArg { name }),
        }
    }
}

impl From<Value> for Param {
    fn from(v: Value) -> Self {
        Param::Value(v)
    }
}

macro_rules! param_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Param {
                fn from(v: $ty) -> Self {
                    Param::Value(v.into())
                }
            }

            impl From<Option<$ty>> for Param {
                fn from(v: Option<$ty>) -> Self {
                    Param::Value(v.into())
                }
            }
        )*
    };
}

param_from!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    &str,
    &String,
    Vec<u8>,
    &[u8],
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
    Uuid,
    serde_json::Value,
);

/// Convert every param into a driver value.
pub fn resolve_params(params: Vec<Param>) -> QuarryResult<Vec<Value>> {
    params.into_iter().map(Param::into_value).collect()
}

/// Typed extraction from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, String>;
}

fn mismatch<T>(want: &str, got: &Value) -> Result<T, String> {
    Err(format!("cannot read {} as {want}", got.kind()))
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, String> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            Value::UInt(v) => Ok(v != 0),
            other => mismatch("bool", &other),
        }
    }
}

macro_rules! int_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, String> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(v).map_err(|e| e.to_string()),
                        Value::UInt(v) => <$ty>::try_from(v).map_err(|e| e.to_string()),
                        Value::Bool(v) => Ok(<$ty>::from(v)),
                        other => mismatch(stringify!($ty), &other),
                    }
                }
            }
        )*
    };
}

int_from_value!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            Value::UInt(v) => Ok(v as f64),
            other => mismatch("f64", &other),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, String> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Bytes(v) => String::from_utf8(v).map_err(|e| e.to_string()),
            Value::Uuid(v) => Ok(v.to_string()),
            other => mismatch("String", &other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::Text(v) => Ok(v.into_bytes()),
            other => mismatch("bytes", &other),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            Value::Text(v) => v.parse().map_err(|e: chrono::ParseError| e.to_string()),
            other => mismatch("date", &other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Timestamp(v) => Ok(v.naive_utc()),
            Value::Text(v) => v.parse().map_err(|e: chrono::ParseError| e.to_string()),
            other => mismatch("datetime", &other),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(v) => Ok(v),
            Value::DateTime(v) => Ok(v.and_utc()),
            Value::Text(v) => v.parse().map_err(|e: chrono::ParseError| e.to_string()),
            other => mismatch("timestamp", &other),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Uuid(v) => Ok(v),
            Value::Text(v) => Uuid::parse_str(&v).map_err(|e| e.to_string()),
            Value::Bytes(v) => Uuid::from_slice(&v).map_err(|e| e.to_string()),
            other => mismatch("uuid", &other),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Json(v) => Ok(v),
            Value::Text(v) => serde_json::from_str(&v).map_err(|e| e.to_string()),
            Value::Null => Ok(serde_json::Value::Null),
            other => mismatch("json", &other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Decode a JSON cell into any deserializable type.
pub fn from_json<T: DeserializeOwned>(value: Value) -> Result<T, String> {
    let json = serde_json::Value::from_value(value)?;
    serde_json::from_value(json).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Param::from(Some("x")), Param::Value(Value::Text("x".into())));
    }

    #[test]
    fn named_param_refuses_to_resolve() {
        let err = Param::named("id").into_value().unwrap_err();
        assert_eq!(err.to_string(), "raw named arg \"id\" used without rebinding");
    }

    #[test]
    fn ints_convert_across_widths() {
        assert_eq!(i32::from_value(Value::Int(7)), Ok(7));
        assert_eq!(u8::from_value(Value::Int(-1)).is_err(), true);
        assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
    }

    #[test]
    fn json_round_trips_through_serde() {
        #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
        struct Tag {
            name: String,
        }

        let v = Value::json(&Tag { name: "a".into() }).unwrap();
        let back: Tag = from_json(v).unwrap();
        assert_eq!(back, Tag { name: "a".into() });
    }
}
