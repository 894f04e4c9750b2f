//! Storage subsystem
//!
//! Components:
//! - `entities`: SeaORM entity models for the SQLite session store.
//! - `repository`: the transactional `Repository` used by the engine;
//!   explicit insert/query/delete operations with per-step transactions
//!   and explicit cascade to session-owned rows.

pub mod entities;
pub mod repository;

pub use repository::Repository;
