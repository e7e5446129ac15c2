//! Record construction from positional log arguments

use super::log_level::LogLevel;
use super::value::{LogValue, SharedError};

/// The fully resolved payload of one log call.
///
/// Built from the positional arguments by [`Record::from_values`]:
///
/// 1. the first error value (left to right) is removed and kept in `error`;
/// 2. an even number of remaining values is read as key/value pairs;
/// 3. an odd number makes the first value the message (or, when it is not
///    textual, a field named after the message key) and the rest pairs.
///
/// ```
/// use rust_leveled_logger::core::{LogLevel, Record};
/// use rust_leveled_logger::args;
///
/// let record = Record::from_values(LogLevel::Info, args!["foo", "bar", "baz"], "msg");
/// assert_eq!(record.message.as_deref(), Some("foo"));
/// assert_eq!(record.fields.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    pub level: LogLevel,
    pub message: Option<String>,
    pub fields: Vec<(String, LogValue)>,
    pub error: Option<SharedError>,
}

impl Record {
    pub fn from_values(level: LogLevel, mut values: Vec<LogValue>, message_key: &str) -> Self {
        let error = match values.iter().position(LogValue::is_error) {
            Some(idx) => match values.remove(idx) {
                LogValue::Error(err) => Some(err),
                _ => None,
            },
            None => None,
        };

        let mut record = Self {
            level,
            message: None,
            fields: Vec::with_capacity(values.len() / 2 + 1),
            error,
        };

        let mut iter = values.into_iter();
        if iter.len() % 2 == 1 {
            match iter.next() {
                Some(LogValue::Str(message)) => record.message = Some(message),
                Some(other) => record.fields.push((message_key.to_string(), other)),
                None => {}
            }
        }

        record.fields.extend(pairs(iter));
        record
    }
}

/// Read values as alternating key/value pairs.
///
/// A dangling key gets the value `"[MISSING]"`.
pub(crate) fn pairs<I>(values: I) -> impl Iterator<Item = (String, LogValue)>
where
    I: IntoIterator<Item = LogValue>,
{
    let mut iter = values.into_iter();
    std::iter::from_fn(move || {
        let key = iter.next()?;
        let value = iter
            .next()
            .unwrap_or_else(|| LogValue::Str("[MISSING]".to_string()));
        Some((key.into_key(), value))
    })
}
