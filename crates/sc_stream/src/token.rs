use core::fmt;

use serde_json::Value;

// -----------------------------------------------------------------------------
// JsonToken

/// The kind of the next item in a [`JsonReader`](crate::JsonReader).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JsonToken {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Name,
    String,
    Number,
    Bool,
    Null,
    EndDocument,
}

impl JsonToken {
    /// The token that starts `value`.
    pub(crate) fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::BeginArray,
            Value::Object(_) => Self::BeginObject,
        }
    }

    /// Returns `true` for the tokens that close a container or the document.
    #[inline]
    pub const fn is_end(self) -> bool {
        matches!(self, Self::EndObject | Self::EndArray | Self::EndDocument)
    }
}

impl fmt::Display for JsonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeginObject => "BEGIN_OBJECT",
            Self::EndObject => "END_OBJECT",
            Self::BeginArray => "BEGIN_ARRAY",
            Self::EndArray => "END_ARRAY",
            Self::Name => "NAME",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Bool => "BOOLEAN",
            Self::Null => "NULL",
            Self::EndDocument => "END_DOCUMENT",
        })
    }
}
