//! Positional log arguments
//!
//! Every value handed to a log call is a [`LogValue`]. The explicit `Error`
//! variant is what the event pipeline scans for when promoting an error to the
//! dedicated error field.

use serde::Serialize;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Shared, thread-safe error carried by a [`LogValue::Error`]
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// A single positional argument of a log call
#[derive(Debug, Clone)]
pub enum LogValue {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Null,
    /// An error value; the first one in a call is promoted to the error field
    Error(SharedError),
    /// Any serializable value, already converted to JSON
    Json(serde_json::Value),
}

impl LogValue {
    /// Wrap an error so it can be promoted by the event pipeline
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        LogValue::Error(Arc::new(err))
    }

    /// Serialize any value into a JSON field value.
    ///
    /// Serialization failures degrade to the error text rather than failing
    /// the log call.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => LogValue::Json(v),
            Err(e) => LogValue::Str(format!("!ERROR: {}", e)),
        }
    }

    /// Render any `Display` value as a string field value
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        LogValue::Str(value.to_string())
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, LogValue::Error(_))
    }

    /// Convert a value in key position into a field name.
    ///
    /// Non-textual keys are rendered with their display form rather than
    /// dropping the pair.
    pub fn into_key(self) -> String {
        match self {
            LogValue::Str(s) => s,
            other => other.to_string(),
        }
    }

    /// Convert to serde_json::Value for JSON serialization
    ///
    /// Errors render as their display text; the encoder applies its own error
    /// marshaling where one is configured.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            LogValue::Str(s) => serde_json::Value::String(s.clone()),
            LogValue::Int(i) => serde_json::Value::Number((*i).into()),
            LogValue::Uint(u) => serde_json::Value::Number((*u).into()),
            LogValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            LogValue::Bool(b) => serde_json::Value::Bool(*b),
            LogValue::Null => serde_json::Value::Null,
            LogValue::Error(e) => serde_json::Value::String(e.to_string()),
            LogValue::Json(v) => v.clone(),
        }
    }
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Str(s) => write!(f, "{}", s),
            LogValue::Int(i) => write!(f, "{}", i),
            LogValue::Uint(u) => write!(f, "{}", u),
            LogValue::Float(fl) => write!(f, "{}", fl),
            LogValue::Bool(b) => write!(f, "{}", b),
            LogValue::Null => write!(f, "null"),
            LogValue::Error(e) => write!(f, "{}", e),
            LogValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::Str(s)
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::Str(s.to_string())
    }
}

impl From<&String> for LogValue {
    fn from(s: &String) -> Self {
        LogValue::Str(s.clone())
    }
}

impl From<Cow<'_, str>> for LogValue {
    fn from(s: Cow<'_, str>) -> Self {
        LogValue::Str(s.into_owned())
    }
}

impl From<char> for LogValue {
    fn from(c: char) -> Self {
        LogValue::Str(c.to_string())
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for LogValue {
            fn from(i: $t) -> Self {
                LogValue::Int(i64::from(i))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for LogValue {
            fn from(u: $t) -> Self {
                LogValue::Uint(u64::from(u))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<isize> for LogValue {
    fn from(i: isize) -> Self {
        i64::try_from(i).map_or_else(|_| LogValue::Str(i.to_string()), LogValue::Int)
    }
}

impl From<usize> for LogValue {
    fn from(u: usize) -> Self {
        u64::try_from(u).map_or_else(|_| LogValue::Str(u.to_string()), LogValue::Uint)
    }
}

impl From<f32> for LogValue {
    fn from(f: f32) -> Self {
        LogValue::Float(f64::from(f))
    }
}

impl From<f64> for LogValue {
    fn from(f: f64) -> Self {
        LogValue::Float(f)
    }
}

impl From<bool> for LogValue {
    fn from(b: bool) -> Self {
        LogValue::Bool(b)
    }
}

impl From<()> for LogValue {
    fn from(_: ()) -> Self {
        LogValue::Null
    }
}

impl<T: Into<LogValue>> From<Option<T>> for LogValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(LogValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for LogValue {
    fn from(v: serde_json::Value) -> Self {
        LogValue::Json(v)
    }
}

impl From<SharedError> for LogValue {
    fn from(e: SharedError) -> Self {
        LogValue::Error(e)
    }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for LogValue {
    fn from(e: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        LogValue::Error(Arc::from(e))
    }
}

impl From<std::io::Error> for LogValue {
    fn from(e: std::io::Error) -> Self {
        LogValue::error(e)
    }
}

impl From<std::fmt::Error> for LogValue {
    fn from(e: std::fmt::Error) -> Self {
        LogValue::error(e)
    }
}

impl From<super::error::LoggerError> for LogValue {
    fn from(e: super::error::LoggerError) -> Self {
        LogValue::error(e)
    }
}
