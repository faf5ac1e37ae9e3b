use std::sync::Arc;

use sc_model::TypePath;
use sc_stream::{JsonReader, JsonToken, JsonWriter};

use crate::{Codec, CodecError, Value};

// -----------------------------------------------------------------------------
// ArrayCodec

/// A native array, encoded as a JSON array.
pub struct ArrayCodec {
    elem: Arc<dyn Codec>,
    elem_type: String,
}

impl ArrayCodec {
    /// `elem_type` names the element type in diagnostics.
    #[inline]
    pub fn new(elem: Arc<dyn Codec>, elem_type: impl Into<String>) -> Self {
        Self {
            elem,
            elem_type: elem_type.into(),
        }
    }
}

impl Codec for ArrayCodec {
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError> {
        read_sequence(&*self.elem, reader).map(|items| items.map_or(Value::Null, Value::Array))
    }

    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Null => Ok(writer.null_value()?),
            Value::Array(items) => write_sequence(&*self.elem, writer, items),
            other => Err(CodecError::mismatch(format!("[{}]", self.elem_type), other.kind())),
        }
    }
}

// -----------------------------------------------------------------------------
// ListCodec

/// A list container, encoded as a JSON array.
pub struct ListCodec {
    shape: TypePath,
    elem: Arc<dyn Codec>,
}

impl ListCodec {
    #[inline]
    pub fn new(shape: TypePath, elem: Arc<dyn Codec>) -> Self {
        Self { shape, elem }
    }
}

impl Codec for ListCodec {
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError> {
        read_sequence(&*self.elem, reader).map(|items| items.map_or(Value::Null, Value::List))
    }

    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Null => Ok(writer.null_value()?),
            // a native array is accepted where a list is expected
            Value::List(items) | Value::Array(items) => write_sequence(&*self.elem, writer, items),
            other => Err(CodecError::mismatch(self.shape.to_string(), other.kind())),
        }
    }
}

fn read_sequence(elem: &dyn Codec, reader: &mut dyn JsonReader) -> Result<Option<Vec<Value>>, CodecError> {
    if reader.peek()? == JsonToken::Null {
        reader.next_null()?;
        return Ok(None);
    }
    let mut items = Vec::new();
    reader.begin_array()?;
    while reader.has_next()? {
        items.push(elem.read(reader)?);
    }
    reader.end_array()?;
    Ok(Some(items))
}

fn write_sequence(elem: &dyn Codec, writer: &mut dyn JsonWriter, items: &[Value]) -> Result<(), CodecError> {
    writer.begin_array()?;
    for item in items {
        elem.write(writer, item)?;
    }
    Ok(writer.end_array()?)
}

// -----------------------------------------------------------------------------
// MapCodec

/// A map container, encoded as a JSON object.
///
/// Keys go through the key codec's [`Codec::read_key`] and
/// [`Codec::write_key`]. A repeated key keeps its first position and its
/// last value.
pub struct MapCodec {
    shape: TypePath,
    key: Arc<dyn Codec>,
    value: Arc<dyn Codec>,
}

impl MapCodec {
    #[inline]
    pub fn new(shape: TypePath, key: Arc<dyn Codec>, value: Arc<dyn Codec>) -> Self {
        Self { shape, key, value }
    }
}

impl Codec for MapCodec {
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError> {
        if reader.peek()? == JsonToken::Null {
            reader.next_null()?;
            return Ok(Value::Null);
        }
        let mut entries: Vec<(Value, Value)> = Vec::new();
        reader.begin_object()?;
        while reader.has_next()? {
            let key = self.key.read_key(&reader.next_name()?)?;
            let value = self.value.read(reader)?;
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, slot)) => *slot = value,
                None => entries.push((key, value)),
            }
        }
        reader.end_object()?;
        Ok(Value::Map(entries))
    }

    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError> {
        let entries = match value {
            Value::Null => return Ok(writer.null_value()?),
            Value::Map(entries) => entries,
            other => return Err(CodecError::mismatch(self.shape.to_string(), other.kind())),
        };
        writer.begin_object()?;
        for (key, value) in entries {
            writer.name(&self.key.write_key(key)?)?;
            self.value.write(writer, value)?;
        }
        Ok(writer.end_object()?)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ArrayCodec, ListCodec, MapCodec};
    use crate::{Codec, LeafCodec, Value};
    use sc_model::{LeafKind, TypePath};
    use sc_stream::{TreeReader, TreeWriter};

    fn leaf(kind: LeafKind) -> Arc<dyn Codec> {
        Arc::new(LeafCodec(kind))
    }

    fn round_trip(codec: &dyn Codec, input: &str) -> (Value, String) {
        let value = codec.read(&mut TreeReader::from_str(input).unwrap()).unwrap();
        let mut writer = TreeWriter::new();
        codec.write(&mut writer, &value).unwrap();
        (value, writer.into_string().unwrap())
    }

    #[test]
    fn nested_lists_keep_null_elements() {
        let inner = Arc::new(ListCodec::new(TypePath::new("std::vec::Vec"), leaf(LeafKind::I32)));
        let outer = ArrayCodec::new(inner, "std::vec::Vec<Option<i32>>");
        let (value, text) = round_trip(&outer, "[[1, null], null, []]");
        assert_eq!(
            value,
            Value::Array(vec![
                Value::List(vec![Value::Int(1), Value::Null]),
                Value::Null,
                Value::List(vec![]),
            ])
        );
        assert_eq!(text, "[[1,null],null,[]]");
    }

    #[test]
    fn map_keys_are_converted() {
        let codec = MapCodec::new(
            TypePath::new("std::collections::BTreeMap"),
            leaf(LeafKind::I32),
            leaf(LeafKind::String),
        );
        let (value, text) = round_trip(&codec, r#"{"2": "b", "1": "a"}"#);
        assert_eq!(
            value,
            Value::Map(vec![
                (Value::Int(2), Value::from("b")),
                (Value::Int(1), Value::from("a")),
            ])
        );
        assert_eq!(text, r#"{"2":"b","1":"a"}"#);
    }

    #[test]
    fn object_keys_are_unsupported() {
        let codec = MapCodec::new(
            TypePath::new("std::collections::HashMap"),
            Arc::new(ListCodec::new(TypePath::new("std::vec::Vec"), leaf(LeafKind::I32))),
            leaf(LeafKind::I32),
        );
        let err = codec.read(&mut TreeReader::from_str(r#"{"k": 1}"#).unwrap()).unwrap_err();
        assert!(matches!(err, crate::CodecError::UnsupportedMapKey(_)));
    }
}
