//! Event ingestion.
//!
//! Components:
//! - `bus`: the subscriber end of the session bus (a channel; the
//!   transport feeding it is host wiring).
//! - `ingestor`: the single-consumer loop driving the pipeline.

pub mod bus;
pub mod ingestor;

pub use bus::{BusEvent, BusSubscriber};
pub use ingestor::SessionIngestor;
