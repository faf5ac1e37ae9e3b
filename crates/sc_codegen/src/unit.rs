use core::fmt;

use sc_model::{LeafKind, MemberAccess, OverrideKind, TypeExpr, TypePath};

use crate::{BuiltinCodec, ReadOp, Specialization, TypeDescriptor, WriteOp};

// -----------------------------------------------------------------------------
// Adapters

/// Index of an adapter field inside its [`CodecUnit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdapterId(pub usize);

impl fmt::Display for AdapterId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adapter_{}", self.0)
    }
}

/// The codec a field reads and writes its value with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Accessor {
    Builtin(BuiltinCodec),
    Field(AdapterId),
}

/// Creates the backing storage of a native array.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayInstantiator {
    /// Canonical form of the element type.
    pub elem_type: String,
}

/// How an adapter is built when its unit is constructed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AdapterExpr {
    Builtin(BuiltinCodec),
    /// An adapter field built earlier in the same unit.
    Field(AdapterId),
    Array {
        elem: Box<AdapterExpr>,
        instantiator: ArrayInstantiator,
    },
    List {
        shape_path: TypePath,
        elem: Box<AdapterExpr>,
    },
    Map {
        shape_path: TypePath,
        key: Box<AdapterExpr>,
        value: Box<AdapterExpr>,
    },
    /// Asks the registry for the codec of a type, resolved with the
    /// unit's constructor arguments.
    Lookup(TypeDescriptor),
    /// Instantiates a user supplied codec, factory, serializer or
    /// deserializer.
    Override {
        codec: TypePath,
        kind: OverrideKind,
        args: Vec<OverrideArg>,
        target: TypeDescriptor,
        null_safe: bool,
    },
}

impl From<Accessor> for AdapterExpr {
    #[inline]
    fn from(accessor: Accessor) -> Self {
        match accessor {
            Accessor::Builtin(builtin) => Self::Builtin(builtin),
            Accessor::Field(id) => Self::Field(id),
        }
    }
}

/// A constructor argument of an override.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OverrideArg {
    /// The registry the unit is constructed with.
    Registry,
    /// A fresh instance of the given factory.
    Factory(TypePath),
    /// The derived codec of the field type. Split overrides carry it as
    /// their only argument, for the direction they leave out.
    Codec(AdapterExpr),
}

/// The reason an adapter field exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AdapterKey {
    /// Shared by every field of this exact type.
    Type(TypeExpr),
    /// Owned by the named field.
    Override(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterField {
    pub id: AdapterId,
    pub key: AdapterKey,
    pub expr: AdapterExpr,
}

// -----------------------------------------------------------------------------
// FieldBinding

/// A field descriptor bound to its resolved accessor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldBinding {
    /// Position in declaration order.
    pub slot: usize,
    pub name: String,
    pub wire_name: String,
    pub aliases: Vec<String>,
    pub ty: TypeExpr,
    pub required: bool,
    pub access: MemberAccess,
    pub accessor: Accessor,
}

impl FieldBinding {
    /// The leaf of a primitive field, which can never be absent.
    #[inline]
    pub fn primitive(&self) -> Option<LeafKind> {
        match self.ty {
            TypeExpr::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    /// Every name the field is read under: the wire name, then the aliases.
    pub fn read_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(1 + self.aliases.len());
        names.push(self.wire_name.clone());
        names.extend(self.aliases.iter().cloned());
        names
    }
}

// -----------------------------------------------------------------------------
// CodecUnit

/// The synthesized codec of one declaration.
///
/// Generic declarations produce one unit over their own type parameters;
/// the type arguments of a use site are supplied at construction, see
/// [`DispatchTable::lookup`](crate::DispatchTable::lookup).
#[derive(Clone, Debug)]
pub struct CodecUnit {
    pub name: String,
    pub spec: Specialization,
    pub type_params: Vec<String>,
    pub adapters: Vec<AdapterField>,
    pub fields: Vec<FieldBinding>,
    pub read: Vec<ReadOp>,
    pub write: Vec<WriteOp>,
}

impl CodecUnit {
    #[inline]
    pub fn path(&self) -> &TypePath {
        self.spec.path()
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    #[inline]
    pub fn adapter(&self, id: AdapterId) -> Option<&AdapterField> {
        self.adapters.get(id.0)
    }

    /// The binding of the field named `name`.
    pub fn field(&self, name: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|field| field.name == name)
    }
}
