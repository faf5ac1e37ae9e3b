#![doc = include_str!("../README.md")]

use log::debug;
use sc_codegen::{GenError, GenOptions, RuntimeType};
use sc_model::TypeSource;
use sc_runtime::{CodecError, CodecRegistry, RegistryBuilder, Value};
use sc_stream::{TreeReader, TreeWriter};

// -----------------------------------------------------------------------------
// Exports

pub use sc_codegen as codegen;
pub use sc_model as model;
pub use sc_runtime as runtime;
pub use sc_stream as stream;
pub use sc_utils as utils;

// -----------------------------------------------------------------------------
// Entry points

/// Generates the codecs of `source` and returns a registry builder serving
/// them, ready for overrides and user factories.
///
/// Fails with every generation error if any type could not be generated.
pub fn prepare(source: &dyn TypeSource, options: &GenOptions) -> Result<RegistryBuilder, Vec<GenError>> {
    let generated = codegen::generate(source, options).into_result()?;
    debug!("generated {} codec units", generated.units.len());
    Ok(CodecRegistry::builder().generated(generated))
}

/// Decodes `input` as a value of `ty`.
pub fn from_json(registry: &CodecRegistry, ty: &RuntimeType, input: &str) -> Result<Value, CodecError> {
    let mut reader = TreeReader::from_str(input)?;
    registry.codec(ty)?.read(&mut reader)
}

/// Encodes `value` as `ty`.
pub fn to_json(registry: &CodecRegistry, ty: &RuntimeType, value: &Value) -> Result<String, CodecError> {
    let mut writer = TreeWriter::new();
    registry.codec(ty)?.write(&mut writer, value)?;
    Ok(writer.into_string()?)
}

// -----------------------------------------------------------------------------
// Tests
