use sc_model::TypePath;
use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// A fatal generation error.
///
/// Each error aborts codec generation for the offending type only, and is
/// reported once.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GenError {
    #[error("no type model found for root `{0}`")]
    MissingTypeModel(TypePath),

    #[error("codec name `{name}` is derived by both `{first}` and `{second}`")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("unsupported override `{codec}` on field `{field}` of `{ty}`: {reason}")]
    UnsupportedOverrideSignature {
        ty: TypePath,
        field: String,
        codec: TypePath,
        reason: String,
    },

    #[error("wire name `{name}` is used by more than one field of `{ty}`")]
    DuplicateWireName { ty: TypePath, name: String },

    #[error("field `{field}` of `{ty}` uses type variable `{var}` which `{ty}` does not declare")]
    UnboundTypeVariable {
        ty: TypePath,
        field: String,
        var: String,
    },

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl GenError {
    /// The declarations this error prevents from being generated.
    pub fn offending_types(&self) -> Vec<&str> {
        match self {
            Self::MissingTypeModel(ty)
            | Self::UnsupportedOverrideSignature { ty, .. }
            | Self::DuplicateWireName { ty, .. }
            | Self::UnboundTypeVariable { ty, .. } => vec![ty.type_path()],
            Self::NameCollision { first, second, .. } => vec![first.as_str(), second.as_str()],
            Self::InvalidOptions(_) => Vec::new(),
        }
    }
}
