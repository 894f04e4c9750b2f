//! Domain entities for reported sessions.
//!
//! A `Session` covers both variants (honeypot-observed and bait-observed)
//! with `SessionKind` as the discriminator, plus its owned
//! `Authentication` attempts and `TranscriptEntry` log.

pub mod types;

pub use types::{
    Authentication, Classification, Session, SessionKind, TranscriptEntry,
};
