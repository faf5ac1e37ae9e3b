use thiserror::Error;

use crate::{LeafKind, TypePath};

// -----------------------------------------------------------------------------
// Error

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("type `{0}` is declared more than once")]
    DuplicateDeclaration(TypePath),

    #[error("`{kind}` has no primitive form, used by field `{field}` of `{ty}`")]
    NoPrimitiveForm {
        ty: TypePath,
        field: String,
        kind: LeafKind,
    },

    #[error("invalid type path `{0}`")]
    InvalidPath(String),

    #[error("invalid model document: {0}")]
    Document(String),
}
