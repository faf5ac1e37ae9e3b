use std::sync::Arc;

use sc_codegen::RuntimeType;

// -----------------------------------------------------------------------------
// Value

pub(crate) const NULL: &Value = &Value::Null;

/// A decoded value.
///
/// Native arrays and list containers are kept apart so that a value
/// re-encodes through the codec it was decoded with.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    /// Milliseconds since the unix epoch.
    Date(i64),
    Array(Vec<Value>),
    List(Vec<Value>),
    /// Entries in stream order.
    Map(Vec<(Value, Value)>),
    Object(DynamicObject),
}

impl Value {
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// A short name of the variant, for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Date(_) => "date",
            Self::Array(_) => "array",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) | Self::Date(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&DynamicObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut DynamicObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<DynamicObject> for Value {
    #[inline]
    fn from(value: DynamicObject) -> Self {
        Self::Object(value)
    }
}

// -----------------------------------------------------------------------------
// DynamicObject

/// An instance of a modeled type: one value per declared field.
///
/// # Examples
///
/// ```
/// use sc_codegen::RuntimeType;
/// use sc_runtime::{DynamicObject, Value};
///
/// let mut user = DynamicObject::new(RuntimeType::named("demo::User"), ["id", "name"]);
/// assert!(user.set("name", "ada"));
/// assert!(!user.set("email", "-"));
///
/// assert_eq!(user.get("id"), Some(&Value::Null));
/// assert_eq!(user.get("name").and_then(Value::as_str), Some("ada"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicObject {
    ty: RuntimeType,
    names: Arc<[String]>,
    fields: Vec<Value>,
}

impl DynamicObject {
    /// An object with every field null.
    pub fn new<S: Into<String>>(ty: RuntimeType, names: impl IntoIterator<Item = S>) -> Self {
        let names: Arc<[String]> = names.into_iter().map(Into::into).collect();
        let fields = vec![Value::Null; names.len()];
        Self { ty, names, fields }
    }

    pub(crate) fn from_parts(ty: RuntimeType, names: Arc<[String]>, fields: Vec<Value>) -> Self {
        Self { ty, names, fields }
    }

    /// The type the object was created for.
    #[inline]
    pub fn ty(&self) -> &RuntimeType {
        &self.ty
    }

    /// Field names in declaration order.
    #[inline]
    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let slot = self.names.iter().position(|n| n == name)?;
        self.fields.get(slot)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let slot = self.names.iter().position(|n| n == name)?;
        self.fields.get_mut(slot)
    }

    /// Sets the field `name`, returns `false` if there is no such field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> bool {
        match self.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Builder form of [`DynamicObject::set`].
    #[inline]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    #[inline]
    pub fn slot(&self, slot: usize) -> &Value {
        self.fields.get(slot).unwrap_or(NULL)
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, slot: usize) -> Option<&mut Value> {
        self.fields.get_mut(slot)
    }
}
