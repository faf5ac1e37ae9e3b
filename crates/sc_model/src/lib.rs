//! The type model consumed by codec generation.
//!
//! A type discovery front end describes every data-model type it knows about
//! through this crate, and hands the result to the resolver behind the
//! [`TypeSource`] trait.
//!
//! ## Menu
//!
//! - [`TypePath`]: A fully qualified type name, e.g. `my_app::model::Node`.
//!     - [`type_path`](TypePath::type_path): Full name, unique per declaration.
//!     - [`type_ident`](TypePath::type_ident): The last segment, may be duplicated.
//!     - [`module_path`](TypePath::module_path): Optional module prefix.
//!
//! - [`LeafKind`]: The well-known leaf types (booleans, integers, floats, text, dates).
//!
//! - [`TypeExpr`]: A declared field type expression. One of
//!     - `Primitive`: a non-nullable leaf (`i32`).
//!     - `Boxed`: a nullable leaf (`Option<i32>`, `String`).
//!     - `Array`: a native array (`[T]`).
//!     - `Declared`: a named type with type arguments (`Box<T>`).
//!     - `Var`: a type variable introduced by the enclosing declaration.
//!
//! - [`FieldDescriptor`]: One serializable property, with its wire names, requiredness,
//!   optional [`OverrideRef`] and [`MemberAccess`].
//!
//! - [`TypeDecl`]: A declared type, either concrete (instantiable) or abstract.
//!
//! - [`TypeModel`]: The in-memory front end, implements [`TypeSource`].

// -----------------------------------------------------------------------------
// Modules

mod decl;
mod error;
mod field;
mod leaf;
mod model;
mod type_expr;
mod type_path;

// -----------------------------------------------------------------------------
// Exports

pub use decl::{DeclKind, TypeDecl};
pub use error::ModelError;
pub use field::{CtorParam, FieldDescriptor, MemberAccess, OverrideKind, OverrideRef};
pub use leaf::LeafKind;
pub use model::{TypeModel, TypeSource};
pub use type_expr::TypeExpr;
pub use type_path::TypePath;
