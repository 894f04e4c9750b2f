use std::borrow::Cow;

use chrono::NaiveDateTime;
use log::debug;

use crate::error_handling::types::NormalizeError;
use crate::record::types::{LoginRecord, SessionRecord, TranscriptRecord};
use crate::session::types::{
    parse_timestamp, Authentication, Classification, Session, SessionKind, TranscriptEntry,
};

/// Decodes a raw payload as UTF-8, falling back to Latin-1 (ISO-8859-1).
///
/// Latin-1 maps every byte onto the code point of the same value, so the
/// fallback cannot fail; a payload that is garbage in both encodings
/// surfaces as a JSON parse error instead.
pub fn decode_payload(raw: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("payload is not valid UTF-8, decoding as Latin-1");
            Cow::Owned(raw.iter().map(|&b| b as char).collect())
        }
    }
}

/// Parses a raw payload into a pending `Session` entity of the given kind.
pub fn normalize(
    kind: SessionKind,
    payload: &[u8],
    received: NaiveDateTime,
) -> Result<Session, NormalizeError> {
    let text = decode_payload(payload);
    let record: SessionRecord = serde_json::from_str(&text)?;
    build_session(kind, record, received)
}

fn build_session(
    kind: SessionKind,
    record: SessionRecord,
    received: NaiveDateTime,
) -> Result<Session, NormalizeError> {
    let honeypot_id = record
        .honeypot_id
        .ok_or_else(|| NormalizeError::MissingHoneypot(record.id.clone()))?;
    let timestamp = parse_event_timestamp(&record.timestamp)?;

    let authentications = record
        .login_attempts
        .into_iter()
        .map(extract_authentication)
        .collect::<Result<Vec<_>, _>>()?;

    let mut session = Session {
        id: record.id,
        kind,
        protocol: record.protocol,
        source_ip: record.source_ip,
        source_port: record.source_port,
        destination_ip: record.destination_ip,
        destination_port: record.destination_port,
        timestamp,
        received,
        honeypot_id,
        client_id: None,
        classification: Classification::Pending,
        did_connect: None,
        did_login: None,
        did_complete: None,
        authentications,
        transcript: Vec::new(),
        session_data: None,
    };

    match kind {
        SessionKind::Honeypot => {
            let transcript = record
                .transcript
                .ok_or(NormalizeError::MissingField("transcript"))?;
            session.transcript = transcript
                .into_iter()
                .map(extract_transcript_entry)
                .collect::<Result<Vec<_>, _>>()?;
            session.session_data = record.session_data.map(|v| v.to_string());
        }
        SessionKind::Bait => {
            session.client_id = Some(
                record
                    .client_id
                    .ok_or(NormalizeError::MissingField("client_id"))?,
            );
            session.did_connect =
                Some(record.did_connect.ok_or(NormalizeError::MissingField("did_connect"))?);
            session.did_login =
                Some(record.did_login.ok_or(NormalizeError::MissingField("did_login"))?);
            session.did_complete =
                Some(record.did_complete.ok_or(NormalizeError::MissingField("did_complete"))?);
        }
    }

    Ok(session)
}

fn extract_authentication(login: LoginRecord) -> Result<Authentication, NormalizeError> {
    Ok(Authentication {
        timestamp: parse_event_timestamp(&login.timestamp)?,
        id: login.id,
        username: login.username,
        password: login.password,
        successful: login.successful,
    })
}

fn extract_transcript_entry(entry: TranscriptRecord) -> Result<TranscriptEntry, NormalizeError> {
    Ok(TranscriptEntry {
        timestamp: parse_event_timestamp(&entry.timestamp)?,
        direction: entry.direction,
        data: entry.data,
    })
}

fn parse_event_timestamp(raw: &str) -> Result<NaiveDateTime, NormalizeError> {
    parse_timestamp(raw).map_err(|e| NormalizeError::Timestamp(format!("{}: {}", raw, e)))
}
