//! Wire-format records and the Record Normalizer.
//!
//! Components:
//! - `types`: serde models for the JSON payloads published on the bus.
//! - `normalizer`: payload decoding (UTF-8 with Latin-1 fallback) and
//!   conversion into domain `Session` entities.

pub mod normalizer;
pub mod types;
