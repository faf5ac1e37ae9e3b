use std::sync::Arc;

use sc_codegen::RuntimeType;
use sc_stream::{JsonReader, JsonToken, JsonWriter};

use crate::{CodecError, CodecRegistry, Value};

// -----------------------------------------------------------------------------
// Codec

/// The paired encode and decode procedures of one type.
///
/// Codecs are shared between threads and never keep the cursor they are
/// handed past a single call.
pub trait Codec: Send + Sync {
    /// Decodes the next value of `reader`.
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError>;

    /// Encodes `value` to `writer`.
    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError>;

    /// Decodes a map key from its member name.
    fn read_key(&self, name: &str) -> Result<Value, CodecError> {
        Err(CodecError::UnsupportedMapKey(name.to_owned()))
    }

    /// Encodes `value` as a member name.
    fn write_key(&self, value: &Value) -> Result<String, CodecError> {
        Err(CodecError::UnsupportedMapKey(value.kind().to_owned()))
    }
}

// -----------------------------------------------------------------------------
// CodecFactory

/// Creates codecs on request of a [`CodecRegistry`].
pub trait CodecFactory: Send + Sync {
    /// Returns `None` if this factory does not serve `ty`.
    ///
    /// Codecs of nested types should be requested from `registry`, which
    /// handles caching and recursion.
    fn create(&self, registry: &CodecRegistry, ty: &RuntimeType) -> Result<Option<Arc<dyn Codec>>, CodecError>;
}

// -----------------------------------------------------------------------------
// NullSafe

/// Handles null on behalf of the wrapped codec.
///
/// A null token decodes to [`Value::Null`] and a null value encodes as a
/// null token, neither reaches the inner codec.
pub struct NullSafe(Arc<dyn Codec>);

impl NullSafe {
    #[inline]
    pub fn wrap(inner: Arc<dyn Codec>) -> Arc<dyn Codec> {
        Arc::new(Self(inner))
    }
}

impl Codec for NullSafe {
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError> {
        if reader.peek()? == JsonToken::Null {
            reader.next_null()?;
            return Ok(Value::Null);
        }
        self.0.read(reader)
    }

    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError> {
        if value.is_null() {
            return Ok(writer.null_value()?);
        }
        self.0.write(writer, value)
    }

    #[inline]
    fn read_key(&self, name: &str) -> Result<Value, CodecError> {
        self.0.read_key(name)
    }

    #[inline]
    fn write_key(&self, value: &Value) -> Result<String, CodecError> {
        self.0.write_key(value)
    }
}

// -----------------------------------------------------------------------------
// Serializer / Deserializer

/// The encode half of a user override.
pub trait Serializer: Send + Sync {
    /// Encodes a non-null `value`.
    fn serialize(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError>;
}

/// The decode half of a user override.
pub trait Deserializer: Send + Sync {
    /// Decodes the next non-null value of `reader`.
    fn deserialize(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError>;
}

/// A user serializer and/or deserializer, backed by the derived codec for
/// the direction left out.
///
/// Null never reaches the user halves.
pub struct SplitCodec {
    serializer: Option<Arc<dyn Serializer>>,
    deserializer: Option<Arc<dyn Deserializer>>,
    delegate: Arc<dyn Codec>,
}

impl SplitCodec {
    pub fn new(
        serializer: Option<Arc<dyn Serializer>>,
        deserializer: Option<Arc<dyn Deserializer>>,
        delegate: Arc<dyn Codec>,
    ) -> Self {
        Self {
            serializer,
            deserializer,
            delegate,
        }
    }
}

impl Codec for SplitCodec {
    fn read(&self, reader: &mut dyn JsonReader) -> Result<Value, CodecError> {
        let Some(deserializer) = &self.deserializer else {
            return self.delegate.read(reader);
        };
        if reader.peek()? == JsonToken::Null {
            reader.next_null()?;
            return Ok(Value::Null);
        }
        deserializer.deserialize(reader)
    }

    fn write(&self, writer: &mut dyn JsonWriter, value: &Value) -> Result<(), CodecError> {
        let Some(serializer) = &self.serializer else {
            return self.delegate.write(writer, value);
        };
        if value.is_null() {
            return Ok(writer.null_value()?);
        }
        serializer.serialize(writer, value)
    }

    #[inline]
    fn read_key(&self, name: &str) -> Result<Value, CodecError> {
        self.delegate.read_key(name)
    }

    #[inline]
    fn write_key(&self, value: &Value) -> Result<String, CodecError> {
        self.delegate.write_key(value)
    }
}
