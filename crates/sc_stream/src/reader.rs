use std::collections::VecDeque;

use serde_json::Value;

use crate::{JsonToken, StreamError};

// -----------------------------------------------------------------------------
// JsonReader

/// A pull cursor over a JSON-shaped token stream.
///
/// The `next_*` methods consume one scalar. Numeric and text reads are
/// lenient: a numeric string is accepted where a number is expected,
/// and a number or boolean is accepted where text is expected.
pub trait JsonReader {
    /// Returns the kind of the next token without consuming it.
    fn peek(&mut self) -> Result<JsonToken, StreamError>;

    fn begin_object(&mut self) -> Result<(), StreamError>;

    fn end_object(&mut self) -> Result<(), StreamError>;

    fn begin_array(&mut self) -> Result<(), StreamError>;

    fn end_array(&mut self) -> Result<(), StreamError>;

    /// Returns `true` if the current object or array has another element.
    fn has_next(&mut self) -> Result<bool, StreamError> {
        Ok(!self.peek()?.is_end())
    }

    fn next_name(&mut self) -> Result<String, StreamError>;

    fn next_null(&mut self) -> Result<(), StreamError>;

    fn next_bool(&mut self) -> Result<bool, StreamError>;

    fn next_i64(&mut self) -> Result<i64, StreamError>;

    fn next_f64(&mut self) -> Result<f64, StreamError>;

    fn next_string(&mut self) -> Result<String, StreamError>;

    /// Skips the next value, including nested containers.
    ///
    /// If the next token is a name, the name and its value are skipped.
    fn skip_value(&mut self) -> Result<(), StreamError>;
}

// -----------------------------------------------------------------------------
// TreeReader

enum Frame {
    Object {
        entries: VecDeque<(String, Value)>,
        // value of the name most recently returned by `next_name`
        value: Option<Value>,
    },
    Array(VecDeque<Value>),
}

/// A [`JsonReader`] over an in-memory `serde_json::Value`.
///
/// # Examples
///
/// ```
/// use sc_stream::{JsonReader, JsonToken, TreeReader};
///
/// let mut reader = TreeReader::from_str(r#"{"id": 7, "tags": ["a"]}"#).unwrap();
///
/// reader.begin_object().unwrap();
/// assert_eq!(reader.next_name().unwrap(), "id");
/// assert_eq!(reader.next_i64().unwrap(), 7);
/// assert_eq!(reader.next_name().unwrap(), "tags");
/// reader.skip_value().unwrap();
/// assert!(!reader.has_next().unwrap());
/// reader.end_object().unwrap();
///
/// assert_eq!(reader.peek().unwrap(), JsonToken::EndDocument);
/// ```
pub struct TreeReader {
    root: Option<Value>,
    stack: Vec<Frame>,
}

impl TreeReader {
    /// Creates a reader positioned before `value`.
    #[inline]
    pub fn new(value: Value) -> Self {
        Self {
            root: Some(value),
            stack: Vec::new(),
        }
    }

    /// Parses `input` and creates a reader over it.
    #[allow(clippy::should_implement_trait, reason = "fallible constructor, not `FromStr`")]
    pub fn from_str(input: &str) -> Result<Self, StreamError> {
        serde_json::from_str(input)
            .map(Self::new)
            .map_err(|e| StreamError::Syntax(e.to_string()))
    }

    fn current(&self) -> JsonToken {
        match self.stack.last() {
            None => self.root.as_ref().map_or(JsonToken::EndDocument, JsonToken::of),
            Some(Frame::Object { value: Some(v), .. }) => JsonToken::of(v),
            Some(Frame::Object { entries, .. }) if entries.is_empty() => JsonToken::EndObject,
            Some(Frame::Object { .. }) => JsonToken::Name,
            Some(Frame::Array(items)) => items.front().map_or(JsonToken::EndArray, JsonToken::of),
        }
    }

    // Removes the next value. The caller has checked its token.
    fn take(&mut self) -> Value {
        let taken = match self.stack.last_mut() {
            None => self.root.take(),
            Some(Frame::Object { value, .. }) => value.take(),
            Some(Frame::Array(items)) => items.pop_front(),
        };
        taken.unwrap_or(Value::Null)
    }

    fn expect(&mut self, expected: JsonToken, name: &'static str) -> Result<Value, StreamError> {
        let found = self.current();
        if found != expected {
            return Err(StreamError::unexpected(name, found));
        }
        Ok(self.take())
    }

    fn take_scalar(&mut self, name: &'static str) -> Result<Value, StreamError> {
        match self.current() {
            JsonToken::String | JsonToken::Number | JsonToken::Bool => Ok(self.take()),
            found => Err(StreamError::unexpected(name, found)),
        }
    }
}

impl JsonReader for TreeReader {
    #[inline]
    fn peek(&mut self) -> Result<JsonToken, StreamError> {
        Ok(self.current())
    }

    fn begin_object(&mut self) -> Result<(), StreamError> {
        let Value::Object(map) = self.expect(JsonToken::BeginObject, "BEGIN_OBJECT")? else {
            unreachable!("token checked by `expect`");
        };
        self.stack.push(Frame::Object {
            entries: map.into_iter().collect(),
            value: None,
        });
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), StreamError> {
        match self.current() {
            JsonToken::EndObject => {
                self.stack.pop();
                Ok(())
            }
            found => Err(StreamError::unexpected("END_OBJECT", found)),
        }
    }

    fn begin_array(&mut self) -> Result<(), StreamError> {
        let Value::Array(items) = self.expect(JsonToken::BeginArray, "BEGIN_ARRAY")? else {
            unreachable!("token checked by `expect`");
        };
        self.stack.push(Frame::Array(items.into()));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), StreamError> {
        match self.current() {
            JsonToken::EndArray => {
                self.stack.pop();
                Ok(())
            }
            found => Err(StreamError::unexpected("END_ARRAY", found)),
        }
    }

    fn next_name(&mut self) -> Result<String, StreamError> {
        let found = self.current();
        match self.stack.last_mut() {
            Some(Frame::Object { entries, value }) if found == JsonToken::Name => {
                let (name, next) = entries.pop_front().unwrap_or((String::new(), Value::Null));
                *value = Some(next);
                Ok(name)
            }
            _ => Err(StreamError::unexpected("NAME", found)),
        }
    }

    fn next_null(&mut self) -> Result<(), StreamError> {
        self.expect(JsonToken::Null, "NULL").map(drop)
    }

    fn next_bool(&mut self) -> Result<bool, StreamError> {
        match self.expect(JsonToken::Bool, "BOOLEAN")? {
            Value::Bool(b) => Ok(b),
            _ => unreachable!("token checked by `expect`"),
        }
    }

    fn next_i64(&mut self) -> Result<i64, StreamError> {
        match self.take_scalar("NUMBER")? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|&f| is_integral(f)).map(|f| f as i64))
                .ok_or_else(|| StreamError::NumberOutOfRange(n.to_string())),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| StreamError::NumberOutOfRange(s)),
            _ => Err(StreamError::unexpected("NUMBER", JsonToken::Bool)),
        }
    }

    fn next_f64(&mut self) -> Result<f64, StreamError> {
        match self.take_scalar("NUMBER")? {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| StreamError::NumberOutOfRange(n.to_string())),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| StreamError::NumberOutOfRange(s)),
            _ => Err(StreamError::unexpected("NUMBER", JsonToken::Bool)),
        }
    }

    fn next_string(&mut self) -> Result<String, StreamError> {
        match self.take_scalar("STRING")? {
            Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    fn skip_value(&mut self) -> Result<(), StreamError> {
        match self.current() {
            JsonToken::Name => {
                self.next_name()?;
                self.take();
                Ok(())
            }
            found if found.is_end() => Err(StreamError::unexpected("a value", found)),
            _ => {
                self.take();
                Ok(())
            }
        }
    }
}

// 2^63, the first float above the i64 range
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// `f` is a whole number that fits an `i64`.
fn is_integral(f: f64) -> bool {
    f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{JsonReader, TreeReader};
    use crate::{JsonToken, StreamError};

    #[test]
    fn repeated_names_follow_stream_order() {
        let mut reader = TreeReader::from_str(r#"{"b": 1, "a": 2, "c": null}"#).unwrap();
        reader.begin_object().unwrap();
        let mut names = Vec::new();
        while reader.has_next().unwrap() {
            names.push(reader.next_name().unwrap());
            reader.skip_value().unwrap();
        }
        reader.end_object().unwrap();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn numbers_are_read_leniently() {
        let mut reader = TreeReader::from_str(r#"["12", 3.0, 4.5, true]"#).unwrap();
        reader.begin_array().unwrap();
        assert_eq!(reader.next_i64().unwrap(), 12);
        assert_eq!(reader.next_i64().unwrap(), 3);
        assert!(matches!(reader.next_i64(), Err(StreamError::NumberOutOfRange(_))));
        assert_eq!(reader.next_string().unwrap(), "true");
        reader.end_array().unwrap();
    }

    #[test]
    fn integers_beyond_i64_are_rejected() {
        let mut reader = TreeReader::from_str("[18446744073709551615, 1e300, -1e300, -9223372036854775808]").unwrap();
        reader.begin_array().unwrap();
        assert!(matches!(reader.next_i64(), Err(StreamError::NumberOutOfRange(_))));
        assert!(matches!(reader.next_i64(), Err(StreamError::NumberOutOfRange(_))));
        assert!(matches!(reader.next_i64(), Err(StreamError::NumberOutOfRange(_))));
        assert_eq!(reader.next_i64().unwrap(), i64::MIN);
        reader.end_array().unwrap();
    }

    #[test]
    fn unexpected_token_is_reported() {
        let mut reader = TreeReader::from_str("[1]").unwrap();
        let err = reader.begin_object().unwrap_err();
        assert_eq!(
            err,
            StreamError::UnexpectedToken {
                expected: "BEGIN_OBJECT",
                found: JsonToken::BeginArray,
            }
        );
    }

    #[test]
    fn skip_nested_container() {
        let mut reader = TreeReader::from_str(r#"[{"a": [1, 2]}, 5]"#).unwrap();
        reader.begin_array().unwrap();
        reader.skip_value().unwrap();
        assert_eq!(reader.peek().unwrap(), JsonToken::Number);
        assert_eq!(reader.next_i64().unwrap(), 5);
        reader.end_array().unwrap();
    }
}
