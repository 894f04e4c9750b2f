//! Error types shared across the engine.
//!
//! One enum per concern (configuration, normalization, storage), composed
//! into `EngineError` for the ingestion loop.

pub mod types;
