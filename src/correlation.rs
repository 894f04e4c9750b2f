//! Correlation pipeline pieces.
//!
//! Components:
//! - `gate`: source-specific policy applied before persistence.
//! - `correlator`: the windowed credential-match scan.
//! - `merger`: consolidation of a matched honeypot/bait pair.

pub mod correlator;
pub mod gate;
pub mod merger;
