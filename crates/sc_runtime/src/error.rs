use sc_codegen::RuntimeType;
use sc_model::TypePath;
use sc_stream::StreamError;
use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// A failure while encoding or decoding one value.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CodecError {
    #[error("required field `{field}` of `{ty}` is null")]
    RequiredFieldNull { ty: TypePath, field: String },

    #[error("required fields {fields:?} of `{ty}` are null")]
    RequiredFieldsNull { ty: TypePath, fields: Vec<String> },

    #[error("no codec available for `{0}`")]
    NoCodec(RuntimeType),

    #[error("expected {expected} but found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("`{0}` cannot be used as a map key")]
    UnsupportedMapKey(String),

    #[error("override `{0}` is not registered")]
    MissingOverride(TypePath),

    #[error("the codec registry has been dropped")]
    RegistryDropped,

    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl CodecError {
    #[cold]
    #[inline(never)]
    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
