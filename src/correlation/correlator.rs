use log::debug;

use crate::session::types::Session;

/// Picks the subject's match among pre-filtered candidates, or `None`.
///
/// Candidates are expected to already satisfy the structural filters
/// (same protocol and honeypot, opposite kind, inside the correlation
/// window, different id — see `Repository::find_candidates`). A candidate
/// qualifies when any of its authentication attempts exactly equals any
/// of the subject's by (username, password, success).
///
/// Tie-break: when several candidates qualify, the *last* one in
/// enumeration order wins. This mirrors the reference implementation's
/// observable behavior and is kept deliberately; do not change it to
/// first-match without revisiting the product decision.
pub fn find_match<'a>(subject: &Session, candidates: &'a [Session]) -> Option<&'a Session> {
    let mut matched = None;
    for candidate in candidates {
        debug_assert_ne!(candidate.id, subject.id);
        let qualifies = subject.authentications.iter().any(|subject_auth| {
            candidate
                .authentications
                .iter()
                .any(|candidate_auth| candidate_auth.credentials_match(subject_auth))
        });
        if qualifies {
            debug!(
                "session {} has a credential match with session {}",
                subject.id, candidate.id
            );
            matched = Some(candidate);
        }
    }
    matched
}
