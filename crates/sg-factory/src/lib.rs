//! sg-factory - Fixture factory for Seedgraph
//!
//! Builds values of a record type, fills zero fields with synthesized
//! data, wires foreign keys to associated values and inserts everything
//! through a [`sg_db::Database`] in dependency order.

pub mod batch;
pub mod builder;
pub mod collect;
pub mod error;
pub mod synth;
pub mod wiring;

pub use batch::{RecordBatch, TypedBatch};
pub use builder::{Builder, Factory, ListBuilder};
pub use error::{FactoryError, FactoryResult};
pub use synth::{NonZeroSynthesizer, Synthesizer};
