use log::debug;

use crate::configuration::client::{ConfigClient, IGNORE_FAILED_BAIT_SESSION};
use crate::error_handling::types::ConfigError;
use crate::session::types::{Session, SessionKind};

/// Source-specific policy applied before a record becomes persistent.
///
/// Honeypot records always pass. Bait records are checked against the
/// platform's `ignore_failed_bait_session` flag: when it is enabled and
/// the bait client never completed its scripted interaction, the record
/// is dropped silently. This is the only policy branch before
/// persistence, and the config lookup happens here, outside any storage
/// transaction.
pub fn should_persist<C: ConfigClient>(
    session: &Session,
    config: &C,
) -> Result<bool, ConfigError> {
    if session.kind != SessionKind::Bait {
        return Ok(true);
    }
    let ignore_failed = config.get_bool(IGNORE_FAILED_BAIT_SESSION)?;
    if session.did_complete == Some(false) && ignore_failed {
        debug!("ignoring failed bait session {}", session.id);
        return Ok(false);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::client::StaticConfigClient;
    use crate::configuration::config::Config;
    use crate::session::types::{parse_timestamp, Classification};

    fn bait_session(did_complete: bool) -> Session {
        let at = parse_timestamp("2014-05-01T10:00:00.000000").unwrap();
        Session {
            id: "b-1".into(),
            kind: SessionKind::Bait,
            protocol: "ssh".into(),
            source_ip: "10.0.0.9".into(),
            source_port: 50000,
            destination_ip: "10.0.0.5".into(),
            destination_port: 22,
            timestamp: at,
            received: at,
            honeypot_id: "hp-1".into(),
            client_id: Some("client-1".into()),
            classification: Classification::Pending,
            did_connect: Some(true),
            did_login: Some(did_complete),
            did_complete: Some(did_complete),
            authentications: Vec::new(),
            transcript: Vec::new(),
            session_data: None,
        }
    }

    fn client(ignore_failed: bool) -> StaticConfigClient {
        StaticConfigClient::from_config(&Config {
            ignore_failed_bait_session: ignore_failed,
            ..Config::default()
        })
    }

    #[test]
    fn incomplete_bait_is_dropped_when_configured() {
        assert!(!should_persist(&bait_session(false), &client(true)).unwrap());
        assert!(should_persist(&bait_session(false), &client(false)).unwrap());
        assert!(should_persist(&bait_session(true), &client(true)).unwrap());
    }

    #[test]
    fn honeypot_records_pass_unconditionally() {
        let mut session = bait_session(false);
        session.kind = SessionKind::Honeypot;
        session.client_id = None;
        // No config lookup happens for honeypot records at all.
        let empty = StaticConfigClient::new(Default::default());
        assert!(should_persist(&session, &empty).unwrap());
    }
}
