use std::sync::Arc;

use sc_codegen::{BuiltinCodec, BuiltinRegistry, ContainerShape, RuntimeType};
use sc_model::LeafKind;
use sc_stream::{JsonReader, JsonToken, JsonWriter, StreamError};

use crate::{ArrayCodec, Codec, CodecError, CodecFactory, CodecRegistry};
use crate::{DynamicCodec, ListCodec, MapCodec, Value};

// -----------------------------------------------------------------------------
// LeafCodec

/// The codec of a leaf type, shared by its primitive and boxed forms.
///
/// A null token decodes to [`Value::Null`]. Integer reads are range
/// checked against the leaf's width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafCodec(pub LeafKind);

fn int_range(kind: LeafKind) -> (i64, i64) {
    match kind {
        LeafKind::I8 => (i8::MIN.into(), i8::MAX.into()),
        LeafKind::I16 => (i16::MIN.into(), i16::MAX.into()),
        LeafKind::I32 => (i32::MIN.into(), i32::MAX.into()),
        _ => (i64::MIN, i64::MAX),
    }
}

impl LeafCodec {
    fn check_int(self, n: i64) -> Result<i64, CodecError> {
        let (min, max) = int_range(self.0);
        if n < min || n > max {
            return Err(StreamError::NumberOutOfRange(format!("{n} as {}", self.0)).into());
        }
        Ok(n)
    }

    fn parse_char(self, text: &str) -> Result<char, CodecError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(CodecError::mismatch("char", format!("{text:?}"))),
        }
    }

    fn parse_int(self, text: &str) -> Result<i64, CodecError> {
        let n = text
            .trim()
            .parse()
            .map_err(|_| StreamError::NumberOutOfRange(text.to_owned()))?;
        self.check_int(n)
    }
}

impl Codec for LeafCodec {
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError> {
        if reader.peek()? == JsonToken::Null {
            reader.next_null()?;
            return Ok(Value::Null);
        }
        Ok(match self.0 {
            LeafKind::Bool => Value::Bool(reader.next_bool()?),
            LeafKind::I8 | LeafKind::I16 | LeafKind::I32 | LeafKind::I64 => {
                Value::Int(self.check_int(reader.next_i64()?)?)
            }
            LeafKind::F32 => Value::Float(f64::from(reader.next_f64()? as f32)),
            LeafKind::F64 => Value::Float(reader.next_f64()?),
            LeafKind::Char => Value::Char(self.parse_char(&reader.next_string()?)?),
            LeafKind::String => Value::Str(reader.next_string()?),
            LeafKind::Date => Value::Date(reader.next_i64()?),
        })
    }

    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError> {
        let kind = self.0;
        match value {
            Value::Null => writer.null_value()?,
            Value::Bool(b) if kind == LeafKind::Bool => writer.bool_value(*b)?,
            Value::Int(n) if kind.is_integer() => writer.i64_value(self.check_int(*n)?)?,
            Value::Int(n) if kind.is_float() => writer.f64_value(*n as f64)?,
            Value::Float(f) if kind.is_float() => writer.f64_value(*f)?,
            Value::Char(c) if kind == LeafKind::Char => writer.string_value(c.encode_utf8(&mut [0; 4]))?,
            Value::Str(s) if kind == LeafKind::String => writer.string_value(s)?,
            Value::Date(ms) | Value::Int(ms) if kind == LeafKind::Date => writer.i64_value(*ms)?,
            other => return Err(CodecError::mismatch(kind.name(), other.kind())),
        }
        Ok(())
    }

    fn read_key(&self, name: &str) -> Result<Value, CodecError> {
        Ok(match self.0 {
            LeafKind::Bool => match name {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(CodecError::mismatch("bool", format!("{name:?}"))),
            },
            LeafKind::I8 | LeafKind::I16 | LeafKind::I32 | LeafKind::I64 => Value::Int(self.parse_int(name)?),
            LeafKind::F32 | LeafKind::F64 => Value::Float(
                name.trim()
                    .parse()
                    .map_err(|_| StreamError::NumberOutOfRange(name.to_owned()))?,
            ),
            LeafKind::Char => Value::Char(self.parse_char(name)?),
            LeafKind::String => Value::Str(name.to_owned()),
            LeafKind::Date => Value::Date(self.parse_int(name)?),
        })
    }

    fn write_key(&self, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(n) | Value::Date(n) => Ok(n.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Char(c) => Ok(c.to_string()),
            Value::Str(s) => Ok(s.clone()),
            other => Err(CodecError::UnsupportedMapKey(other.kind().to_owned())),
        }
    }
}

// -----------------------------------------------------------------------------
// PrimitiveArrayCodec

/// The codec of a native array of primitives. Elements are never null.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimitiveArrayCodec(pub LeafKind);

impl Codec for PrimitiveArrayCodec {
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError> {
        if reader.peek()? == JsonToken::Null {
            reader.next_null()?;
            return Ok(Value::Null);
        }
        let leaf = LeafCodec(self.0);
        let mut items = Vec::new();
        reader.begin_array()?;
        while reader.has_next()? {
            match leaf.read(reader)? {
                Value::Null => return Err(CodecError::mismatch(self.0.name(), "null")),
                item => items.push(item),
            }
        }
        reader.end_array()?;
        Ok(Value::Array(items))
    }

    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError> {
        let items = match value {
            Value::Null => return Ok(writer.null_value()?),
            Value::Array(items) => items,
            other => return Err(CodecError::mismatch(format!("[{}]", self.0), other.kind())),
        };
        let leaf = LeafCodec(self.0);
        writer.begin_array()?;
        for item in items {
            if item.is_null() {
                return Err(CodecError::mismatch(self.0.name(), "null"));
            }
            leaf.write(writer, item)?;
        }
        Ok(writer.end_array()?)
    }
}

// -----------------------------------------------------------------------------
// Builtin singletons

/// The codec behind a [`BuiltinCodec`].
pub(crate) fn builtin_codec(builtin: BuiltinCodec) -> Arc<dyn Codec> {
    match builtin {
        BuiltinCodec::Leaf(kind) => Arc::new(LeafCodec(kind)),
        BuiltinCodec::PrimitiveArray(kind) => Arc::new(PrimitiveArrayCodec(kind)),
    }
}

/// Serves leaves, arrays, containers and the unknown object.
pub(crate) struct BuiltinFactory;

impl CodecFactory for BuiltinFactory {
    fn create(&self, registry: &CodecRegistry, ty: &RuntimeType) -> Result<Option<Arc<dyn Codec>>, CodecError> {
        let codec: Arc<dyn Codec> = match ty {
            RuntimeType::Leaf(kind) => Arc::new(LeafCodec(*kind)),
            RuntimeType::Array(elem) => Arc::new(ArrayCodec::new(registry.codec(elem)?, elem.to_string())),
            RuntimeType::Object => Arc::new(DynamicCodec::new(registry.downgrade())),
            RuntimeType::Parameterized { base, args } => {
                let Some(shape) = BuiltinRegistry::get().container_shape(base) else {
                    return Ok(None);
                };
                // a raw or malformed use reads any value
                let arg = |index: usize| match args.get(index) {
                    Some(arg) if args.len() == shape.arity() => registry.codec(arg),
                    _ => registry.codec(&RuntimeType::Object),
                };
                match shape {
                    ContainerShape::List => Arc::new(ListCodec::new(base.clone(), arg(0)?)),
                    ContainerShape::Map => Arc::new(MapCodec::new(base.clone(), arg(0)?, arg(1)?)),
                }
            }
        };
        Ok(Some(codec))
    }
}

// -----------------------------------------------------------------------------
// Tests
