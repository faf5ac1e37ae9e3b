use sc_stream::{JsonReader, JsonToken, JsonWriter, StreamError};

use crate::{Codec, CodecError, Value, WeakRegistry};

// -----------------------------------------------------------------------------
// DynamicCodec

/// The codec of the unknown object.
///
/// Reads any JSON value: objects become [`Value::Map`] with string keys,
/// arrays become [`Value::List`], integral numbers become [`Value::Int`].
/// Writes any [`Value`], handing modeled objects to the codec of their own
/// type.
pub struct DynamicCodec {
    registry: WeakRegistry,
}

// Integral floats up to this magnitude are exact in an `f64`.
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

impl DynamicCodec {
    #[inline]
    pub fn new(registry: WeakRegistry) -> Self {
        Self { registry }
    }
}

impl Codec for DynamicCodec {
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError> {
        Ok(match reader.peek()? {
            JsonToken::Null => {
                reader.next_null()?;
                Value::Null
            }
            JsonToken::Bool => Value::Bool(reader.next_bool()?),
            JsonToken::String => Value::Str(reader.next_string()?),
            JsonToken::Number => match reader.next_f64()? {
                n if n.fract() == 0.0 && n.abs() <= MAX_EXACT => Value::Int(n as i64),
                n => Value::Float(n),
            },
            JsonToken::BeginArray => {
                let mut items = Vec::new();
                reader.begin_array()?;
                while reader.has_next()? {
                    items.push(self.read(reader)?);
                }
                reader.end_array()?;
                Value::List(items)
            }
            JsonToken::BeginObject => {
                let mut entries = Vec::new();
                reader.begin_object()?;
                while reader.has_next()? {
                    let name = reader.next_name()?;
                    entries.push((Value::Str(name), self.read(reader)?));
                }
                reader.end_object()?;
                Value::Map(entries)
            }
            found => {
                return Err(StreamError::UnexpectedToken {
                    expected: "a value",
                    found,
                }
                .into());
            }
        })
    }

    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Null => writer.null_value()?,
            Value::Bool(b) => writer.bool_value(*b)?,
            Value::Int(n) | Value::Date(n) => writer.i64_value(*n)?,
            Value::Float(f) => writer.f64_value(*f)?,
            Value::Char(c) => writer.string_value(c.encode_utf8(&mut [0; 4]))?,
            Value::Str(s) => writer.string_value(s)?,
            Value::Array(items) | Value::List(items) => {
                writer.begin_array()?;
                for item in items {
                    self.write(writer, item)?;
                }
                writer.end_array()?;
            }
            Value::Map(entries) => {
                writer.begin_object()?;
                for (key, value) in entries {
                    writer.name(&self.write_key(key)?)?;
                    self.write(writer, value)?;
                }
                writer.end_object()?;
            }
            Value::Object(obj) => {
                let registry = self.registry.upgrade().ok_or(CodecError::RegistryDropped)?;
                registry.codec(obj.ty())?.write(writer, value)?;
            }
        }
        Ok(())
    }

    #[inline]
    fn read_key(&self, name: &str) -> Result<Value, CodecError> {
        Ok(Value::Str(name.to_owned()))
    }

    fn write_key(&self, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(n) | Value::Date(n) => Ok(n.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Char(c) => Ok(c.to_string()),
            other => Err(CodecError::UnsupportedMapKey(other.kind().to_owned())),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use sc_codegen::RuntimeType;
    use sc_stream::{TreeReader, TreeWriter};

    use crate::{CodecError, CodecRegistry, DynamicObject, Value};

    #[test]
    fn reads_any_json() {
        let registry = CodecRegistry::builder().build();
        let codec = registry.codec(&RuntimeType::Object).unwrap();
        let value = codec
            .read(&mut TreeReader::from_str(r#"{"a": [1, 2.5, "x"], "b": null, "c": true}"#).unwrap())
            .unwrap();
        assert_eq!(
            value,
            Value::Map(vec![
                (
                    Value::from("a"),
                    Value::List(vec![Value::Int(1), Value::Float(2.5), Value::from("x")])
                ),
                (Value::from("b"), Value::Null),
                (Value::from("c"), Value::Bool(true)),
            ])
        );

        let mut writer = TreeWriter::new();
        codec.write(&mut writer, &value).unwrap();
        assert_eq!(writer.into_string().unwrap(), r#"{"a":[1,2.5,"x"],"b":null,"c":true}"#);
    }

    #[test]
    fn unmodeled_objects_have_no_codec() {
        let registry = CodecRegistry::builder().build();
        let codec = registry.codec(&RuntimeType::Object).unwrap();
        let obj = DynamicObject::new(RuntimeType::named("demo::Unknown"), ["x"]);

        let err = codec.write(&mut TreeWriter::new(), &Value::Object(obj)).unwrap_err();
        assert_eq!(err, CodecError::NoCodec(RuntimeType::named("demo::Unknown")));
    }
}
