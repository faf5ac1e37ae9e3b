//! Executes synthesized codec units.
//!
//! A [`CodecRegistry`] hands out one [`Codec`] per [`RuntimeType`]. It asks
//! its factories in order: the builtin factory for leaves, arrays,
//! containers and the unknown object, then the generated factory backed by
//! a [`DispatchTable`], then any user factory. Constructed codecs are cached
//! and shared.
//!
//! Decoded data is a dynamic [`Value`]; a modeled type decodes to a
//! [`DynamicObject`] holding one value per declared field.
//!
//! [`RuntimeType`]: sc_codegen::RuntimeType
//! [`DispatchTable`]: sc_codegen::DispatchTable

// -----------------------------------------------------------------------------
// Modules

mod builtin;
mod codec;
mod container;
mod dynamic;
mod error;
mod registry;
mod unit;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use builtin::{LeafCodec, PrimitiveArrayCodec};
pub use codec::{Codec, CodecFactory, Deserializer, NullSafe, Serializer, SplitCodec};
pub use container::{ArrayCodec, ListCodec, MapCodec};
pub use dynamic::DynamicCodec;
pub use error::CodecError;
pub use registry::{CodecRegistry, OverrideValue, RegistryBuilder, WeakRegistry};
pub use unit::UnitCodec;
pub use value::{DynamicObject, Value};
