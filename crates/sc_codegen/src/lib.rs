//! Ahead-of-time codec derivation.
//!
//! The pipeline runs once over an immutable [`TypeSource`]:
//!
//! 1. [`resolve`]: discovers every specialization reachable from the roots.
//! 2. [`CodecNames::assign`]: gives every specialization a collision-free name.
//! 3. [`Synthesizer`]: turns each concrete declaration into a [`CodecUnit`],
//!    an instruction tree of adapter fields plus a read and a write procedure.
//! 4. [`DispatchTable::build`]: maps a requested runtime type to the unit
//!    that serves it, threading generic type arguments.
//!
//! [`generate`] chains the four steps. The [`BuiltinRegistry`] is the leaf
//! table consulted by synthesis, and [`Printer`] renders the result as source
//! text.
//!
//! Nothing here executes a codec. See `sc_runtime` for that.
//!
//! [`TypeSource`]: sc_model::TypeSource

// -----------------------------------------------------------------------------
// Modules

mod builtin;
mod descriptor;
mod dispatch;
mod error;
mod naming;
mod options;
mod pipeline;
mod printer;
mod procedure;
mod resolver;
mod synth;
mod unit;

// -----------------------------------------------------------------------------
// Exports

pub use builtin::{BuiltinCodec, BuiltinRegistry, ContainerShape};
pub use descriptor::{RuntimeType, TypeDescriptor};
pub use dispatch::{DispatchEntry, DispatchTable, Instantiation};
pub use error::GenError;
pub use naming::CodecNames;
pub use options::GenOptions;
pub use pipeline::{GenReport, Generated, generate};
pub use printer::Printer;
pub use procedure::{MemberArm, ReadOp, WriteOp};
pub use resolver::{GraphNode, Specialization, TypeGraph, resolve};
pub use synth::Synthesizer;
pub use unit::{Accessor, AdapterExpr, AdapterField, AdapterId, AdapterKey};
pub use unit::{ArrayInstantiator, CodecUnit, FieldBinding, OverrideArg};
