use crate::error_handling::types::StorageError;
use crate::session::types::{Session, SessionKind};
use crate::storage::Repository;

/// Identifiers of a consolidated pair after a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub surviving_id: String,
    pub removed_id: String,
}

/// Consolidates a matched pair regardless of ingestion order.
///
/// The bait session always survives and is reclassified; the honeypot
/// session is always the deleted, non-authoritative copy — whether it is
/// the just-ingested subject or the previously stored match.
pub async fn merge(
    repository: &Repository,
    subject: &Session,
    matched: &Session,
) -> Result<MergeOutcome, StorageError> {
    let (honeypot_session, bait_session) = match subject.kind {
        SessionKind::Honeypot => (subject, matched),
        SessionKind::Bait => (matched, subject),
    };
    repository
        .merge_sessions(&honeypot_session.id, &bait_session.id)
        .await?;
    Ok(MergeOutcome {
        surviving_id: bait_session.id.clone(),
        removed_id: honeypot_session.id.clone(),
    })
}
