//! Storage module for persisting campaign data
//!
//! This module handles everything that touches the filesystem:
//! - The append-only CSV result sink and its URL deduplication set
//! - The durable checkpoint record used for resumption
//! - Loading the modifier term list

mod checkpoint;
pub mod csv;
mod modifiers;
mod sink;
mod traits;

pub use checkpoint::{CheckpointLabels, CheckpointRecord, CheckpointStore};
pub use modifiers::{load_modifiers, parse_modifiers};
pub use sink::CsvSink;
pub use traits::{
    CheckpointError, CheckpointResult, ResultSink, SinkError, SinkResult,
};
