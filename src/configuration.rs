//! Engine configuration.
//!
//! Components:
//! - `config`: the TOML-backed configuration file.
//! - `client`: the synchronous `GET_CONFIG_ITEM` lookup abstraction used
//!   by the classification gate, with an in-process implementation.

pub mod client;
pub mod config;
