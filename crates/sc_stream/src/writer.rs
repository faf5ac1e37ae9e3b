use serde_json::{Map, Number, Value};

use crate::StreamError;

// -----------------------------------------------------------------------------
// JsonWriter

/// A push cursor producing a JSON-shaped token stream.
pub trait JsonWriter {
    fn begin_object(&mut self) -> Result<(), StreamError>;

    fn end_object(&mut self) -> Result<(), StreamError>;

    fn begin_array(&mut self) -> Result<(), StreamError>;

    fn end_array(&mut self) -> Result<(), StreamError>;

    /// Writes the name of the next object member.
    fn name(&mut self, name: &str) -> Result<(), StreamError>;

    fn null_value(&mut self) -> Result<(), StreamError>;

    fn bool_value(&mut self, value: bool) -> Result<(), StreamError>;

    fn i64_value(&mut self, value: i64) -> Result<(), StreamError>;

    fn f64_value(&mut self, value: f64) -> Result<(), StreamError>;

    fn string_value(&mut self, value: &str) -> Result<(), StreamError>;
}

// -----------------------------------------------------------------------------
// TreeWriter

enum Open {
    Object(Map<String, Value>, Option<String>),
    Array(Vec<Value>),
}

/// A [`JsonWriter`] building an in-memory `serde_json::Value`.
///
/// # Examples
///
/// ```
/// use sc_stream::{JsonWriter, TreeWriter};
///
/// let mut writer = TreeWriter::new();
/// writer.begin_object().unwrap();
/// writer.name("id").unwrap();
/// writer.i64_value(7).unwrap();
/// writer.end_object().unwrap();
///
/// assert_eq!(writer.into_string().unwrap(), r#"{"id":7}"#);
/// ```
#[derive(Default)]
pub struct TreeWriter {
    root: Option<Value>,
    stack: Vec<Open>,
}

impl TreeWriter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, value: Value) -> Result<(), StreamError> {
        match self.stack.last_mut() {
            None if self.root.is_none() => {
                self.root = Some(value);
                Ok(())
            }
            None => Err(StreamError::InvalidState("document already complete")),
            Some(Open::Object(map, name)) => match name.take() {
                Some(name) => {
                    map.insert(name, value);
                    Ok(())
                }
                None => Err(StreamError::InvalidState("object value without a name")),
            },
            Some(Open::Array(items)) => {
                items.push(value);
                Ok(())
            }
        }
    }

    /// Returns the written document.
    pub fn finish(self) -> Result<Value, StreamError> {
        if !self.stack.is_empty() {
            return Err(StreamError::InvalidState("unclosed container"));
        }
        self.root
            .ok_or(StreamError::InvalidState("nothing was written"))
    }

    /// Returns the written document as compact JSON text.
    pub fn into_string(self) -> Result<String, StreamError> {
        self.finish().map(|value| value.to_string())
    }
}

impl JsonWriter for TreeWriter {
    fn begin_object(&mut self) -> Result<(), StreamError> {
        self.stack.push(Open::Object(Map::new(), None));
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), StreamError> {
        match self.stack.pop() {
            Some(Open::Object(map, None)) => self.push(Value::Object(map)),
            Some(Open::Object(_, Some(_))) => Err(StreamError::InvalidState("dangling name")),
            _ => Err(StreamError::InvalidState("no open object")),
        }
    }

    fn begin_array(&mut self) -> Result<(), StreamError> {
        self.stack.push(Open::Array(Vec::new()));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), StreamError> {
        match self.stack.pop() {
            Some(Open::Array(items)) => self.push(Value::Array(items)),
            _ => Err(StreamError::InvalidState("no open array")),
        }
    }

    fn name(&mut self, name: &str) -> Result<(), StreamError> {
        match self.stack.last_mut() {
            Some(Open::Object(_, pending @ None)) => {
                *pending = Some(name.to_string());
                Ok(())
            }
            _ => Err(StreamError::InvalidState("name outside of an object")),
        }
    }

    #[inline]
    fn null_value(&mut self) -> Result<(), StreamError> {
        self.push(Value::Null)
    }

    #[inline]
    fn bool_value(&mut self, value: bool) -> Result<(), StreamError> {
        self.push(Value::Bool(value))
    }

    #[inline]
    fn i64_value(&mut self, value: i64) -> Result<(), StreamError> {
        self.push(Value::Number(value.into()))
    }

    fn f64_value(&mut self, value: f64) -> Result<(), StreamError> {
        let number = Number::from_f64(value).ok_or(StreamError::NonFinite(value))?;
        self.push(Value::Number(number))
    }

    #[inline]
    fn string_value(&mut self, value: &str) -> Result<(), StreamError> {
        self.push(Value::String(value.to_string()))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{JsonWriter, TreeWriter};
    use crate::StreamError;

    #[test]
    fn member_order_is_kept() {
        let mut writer = TreeWriter::new();
        writer.begin_object().unwrap();
        for (name, value) in [("z", 1), ("a", 2), ("m", 3)] {
            writer.name(name).unwrap();
            writer.i64_value(value).unwrap();
        }
        writer.name("list").unwrap();
        writer.begin_array().unwrap();
        writer.null_value().unwrap();
        writer.string_value("x").unwrap();
        writer.end_array().unwrap();
        writer.end_object().unwrap();

        assert_eq!(
            writer.into_string().unwrap(),
            r#"{"z":1,"a":2,"m":3,"list":[null,"x"]}"#
        );
    }

    #[test]
    fn value_without_name_is_rejected() {
        let mut writer = TreeWriter::new();
        writer.begin_object().unwrap();
        assert!(matches!(writer.i64_value(1), Err(StreamError::InvalidState(_))));
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let mut writer = TreeWriter::new();
        assert!(matches!(writer.f64_value(f64::NAN), Err(StreamError::NonFinite(_))));
    }
}
