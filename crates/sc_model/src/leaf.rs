use core::fmt;

use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// LeafKind

/// The well-known leaf types of the data model.
///
/// Every leaf has a nullable (boxed) form, see [`TypeExpr::Boxed`].
/// Only some leaves have a primitive, non-nullable form,
/// see [`LeafKind::has_primitive_form`].
///
/// [`TypeExpr::Boxed`]: crate::TypeExpr::Boxed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Char,
    String,
    /// Milliseconds since the unix epoch.
    Date,
}

impl LeafKind {
    /// All leaf kinds, in declaration order.
    pub const ALL: [LeafKind; 10] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::F32,
        Self::F64,
        Self::Char,
        Self::String,
        Self::Date,
    ];

    /// Returns `true` if the leaf can be used as a non-nullable primitive.
    #[inline]
    pub const fn has_primitive_form(self) -> bool {
        !matches!(self, Self::String | Self::Date)
    }

    /// Returns `true` for the integer family.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Returns `true` for the float family.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// The canonical spelling used in type expressions.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "String",
            Self::Date => "Date",
        }
    }

    /// The name fragment used when deriving codec names.
    pub const fn fragment(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::I8 => "I8",
            Self::I16 => "I16",
            Self::I32 => "I32",
            Self::I64 => "I64",
            Self::F32 => "F32",
            Self::F64 => "F64",
            Self::Char => "Char",
            Self::String => "String",
            Self::Date => "Date",
        }
    }
}

impl fmt::Display for LeafKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
