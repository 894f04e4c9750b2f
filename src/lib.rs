pub mod configuration;
pub mod correlation;
pub mod error_handling;
pub mod ingest;
pub mod record;
pub mod session;
pub mod storage;

pub use ingest::{BusEvent, BusSubscriber, SessionIngestor};
pub use storage::Repository;
