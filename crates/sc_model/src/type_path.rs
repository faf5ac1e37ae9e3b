use core::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

// -----------------------------------------------------------------------------
// TypePath

/// The fully qualified name of a declared type, without generics.
///
/// Segments are separated by `::` and the path never starts with `::`.
///
/// # Examples
///
/// ```
/// use sc_model::TypePath;
///
/// let path = TypePath::new("my_app::graph::Node");
///
/// assert_eq!(path.type_path(), "my_app::graph::Node");
/// assert_eq!(path.type_ident(), "Node");
/// assert_eq!(path.module_path(), Some("my_app::graph"));
///
/// let root = TypePath::new("Node");
/// assert_eq!(root.module_path(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypePath {
    path: String,
    // byte offset of the ident inside `path`
    ident_start: usize,
}

impl TypePath {
    /// Creates a new [`TypePath`].
    ///
    /// # Panics
    ///
    /// Panics if the path is empty or contains an empty segment,
    /// use [`TypePath::parse`] for untrusted input.
    pub fn new(path: impl Into<String>) -> Self {
        match Self::parse(path) {
            Ok(path) => path,
            Err(e) => panic!("{e}"),
        }
    }

    /// Parses a `::` separated path.
    pub fn parse(path: impl Into<String>) -> Result<Self, ModelError> {
        let path: String = path.into();
        let path = path.trim_start_matches("::").to_string();
        if path.is_empty() || path.split("::").any(|s| s.is_empty() || s.contains(' ')) {
            return Err(ModelError::InvalidPath(path));
        }
        let ident_start = path.rfind("::").map_or(0, |i| i + 2);
        Ok(Self { path, ident_start })
    }

    /// Returns the fully qualified path.
    #[inline]
    pub fn type_path(&self) -> &str {
        &self.path
    }

    /// Returns the last path segment.
    #[inline]
    pub fn type_ident(&self) -> &str {
        &self.path[self.ident_start..]
    }

    /// Returns the module part of the path, if any.
    #[inline]
    pub fn module_path(&self) -> Option<&str> {
        if self.ident_start == 0 {
            None
        } else {
            Some(&self.path[..self.ident_start - 2])
        }
    }

    /// Returns an iterator over all segments, module first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split("::")
    }
}

impl fmt::Display for TypePath {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl TryFrom<String> for TypePath {
    type Error = ModelError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TypePath> for String {
    #[inline]
    fn from(value: TypePath) -> Self {
        value.path
    }
}

impl From<&str> for TypePath {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypePath;

    #[test]
    fn leading_colons_are_removed() {
        let path = TypePath::new("::alloc::string::String");
        assert_eq!(path.type_path(), "alloc::string::String");
        assert_eq!(path.module_path(), Some("alloc::string"));
        assert_eq!(path.segments().count(), 3);
    }

    #[test]
    fn rejects_empty_segment() {
        assert!(TypePath::parse("a::::B").is_err());
        assert!(TypePath::parse("").is_err());
    }
}
