use serde::{Deserialize, Serialize};

use crate::{TypeExpr, TypePath};

// -----------------------------------------------------------------------------
// MemberAccess

/// How generated code reaches a field of the owning value.
///
/// Only affects printed code; executed codecs address fields by slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberAccess {
    /// `object.name`
    #[default]
    Direct,
    /// `object.getter()` / `object.setter(value)`
    Methods { getter: String, setter: String },
}

// -----------------------------------------------------------------------------
// Override codec reference

/// What an override reference instantiates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    /// A codec, built from its constructor arguments.
    Codec,
    /// A codec factory, built without arguments and asked for the field type.
    Factory,
    /// Encodes only; decoding goes through the derived codec.
    Serializer,
    /// Decodes only; encoding goes through the derived codec.
    Deserializer,
    /// One instance for both directions.
    SerializerDeserializer,
}

impl OverrideKind {
    /// Returns `true` for the kinds that replace one or both directions of
    /// the derived codec instead of the whole codec.
    #[inline]
    pub const fn is_split(self) -> bool {
        matches!(self, Self::Serializer | Self::Deserializer | Self::SerializerDeserializer)
    }
}

/// One parameter of an override's constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtorParam {
    /// A handle to the runtime codec registry.
    Registry,
    /// A factory instance of the given type, built without arguments.
    Factory(TypePath),
    /// A pre-built codec for the given type.
    Codec(TypeExpr),
    /// Anything else, carried verbatim for diagnostics.
    Other(String),
}

/// A user supplied codec that replaces the derived one for a single field.
///
/// `ctor` is the parameter list of the first accessible constructor,
/// `None` if the type has none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRef {
    pub path: TypePath,
    pub kind: OverrideKind,
    pub ctor: Option<Vec<CtorParam>>,
    #[serde(default)]
    pub null_safe: bool,
}

impl OverrideRef {
    /// An override codec with the given constructor parameters.
    pub fn codec(path: impl Into<TypePath>, params: impl IntoIterator<Item = CtorParam>) -> Self {
        Self {
            path: path.into(),
            kind: OverrideKind::Codec,
            ctor: Some(params.into_iter().collect()),
            null_safe: false,
        }
    }

    /// An override factory with a no-argument constructor.
    pub fn factory(path: impl Into<TypePath>) -> Self {
        Self {
            path: path.into(),
            kind: OverrideKind::Factory,
            ctor: Some(Vec::new()),
            null_safe: false,
        }
    }

    /// An override of one or both directions, with a no-argument constructor.
    pub fn split(path: impl Into<TypePath>, kind: OverrideKind) -> Self {
        Self {
            path: path.into(),
            kind,
            ctor: Some(Vec::new()),
            null_safe: false,
        }
    }

    /// Marks the override as null-safe.
    #[inline]
    pub fn null_safe(mut self) -> Self {
        self.null_safe = true;
        self
    }
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// One serializable property of a declared type.
///
/// # Examples
///
/// ```
/// use sc_model::{FieldDescriptor, LeafKind, TypeExpr};
///
/// let field = FieldDescriptor::new("user_name", TypeExpr::string())
///     .wire("name")
///     .alias("userName")
///     .required();
///
/// assert_eq!(field.wire_names().collect::<Vec<_>>(), ["name", "userName"]);
/// assert!(field.required);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Member name in the owning type.
    pub name: String,
    /// Primary wire name.
    pub wire_name: String,
    /// Alternate wire names accepted on read.
    #[serde(default)]
    pub aliases: Vec<String>,
    pub ty: TypeExpr,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "override")]
    pub override_codec: Option<OverrideRef>,
    #[serde(default)]
    pub access: MemberAccess,
}

impl FieldDescriptor {
    /// Creates a field whose wire name equals its member name.
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        let name = name.into();
        Self {
            wire_name: name.clone(),
            name,
            aliases: Vec::new(),
            ty,
            required: false,
            override_codec: None,
            access: MemberAccess::Direct,
        }
    }

    /// Sets the primary wire name.
    #[inline]
    pub fn wire(mut self, name: impl Into<String>) -> Self {
        self.wire_name = name.into();
        self
    }

    /// Adds an alternate wire name.
    #[inline]
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.aliases.push(name.into());
        self
    }

    /// Marks the field as required.
    #[inline]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[inline]
    pub fn with_override(mut self, codec: OverrideRef) -> Self {
        self.override_codec = Some(codec);
        self
    }

    #[inline]
    pub fn with_accessors(mut self, getter: impl Into<String>, setter: impl Into<String>) -> Self {
        self.access = MemberAccess::Methods {
            getter: getter.into(),
            setter: setter.into(),
        };
        self
    }

    /// The primary wire name followed by every alias.
    pub fn wire_names(&self) -> impl Iterator<Item = &str> {
        core::iter::once(self.wire_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}
