//! The streaming cursor consumed by codecs.
//!
//! Codecs only see the [`JsonReader`] and [`JsonWriter`] traits. They never
//! keep a cursor past a single read or write call.
//!
//! [`TreeReader`] and [`TreeWriter`] implement the traits over a
//! `serde_json::Value` tree. Object keys keep their textual order, so field
//! order on write is preserved and repeated names on read are seen in
//! stream order.

// -----------------------------------------------------------------------------
// Modules

mod error;
mod reader;
mod token;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use error::StreamError;
pub use reader::{JsonReader, TreeReader};
pub use token::JsonToken;
pub use writer::{JsonWriter, TreeWriter};
