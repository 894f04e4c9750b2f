use chrono::NaiveDateTime;

/// Wire and storage timestamp layout. Fixed-width fraction so that
/// lexicographic comparison of stored strings equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Accepts any fraction width on input; the reporting sides send six digits.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_PARSE_FORMAT)
}

/// Which side of the platform reported a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Recorded by a decoy service observing unsolicited interaction.
    Honeypot,
    /// Recorded by an instrumented client that deliberately leaks credentials.
    Bait,
}

impl SessionKind {
    pub const TOPIC_HONEYPOT: &'static str = "session_honeypot";
    pub const TOPIC_CLIENT: &'static str = "session_client";

    /// Maps a bus topic tag onto a session kind. Unknown tags yield `None`
    /// and are dropped by the ingestion loop.
    pub fn from_topic(topic: &str) -> Option<Self> {
        match topic {
            Self::TOPIC_HONEYPOT => Some(SessionKind::Honeypot),
            Self::TOPIC_CLIENT => Some(SessionKind::Bait),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Honeypot => "honeypot",
            SessionKind::Bait => "bait",
        }
    }

    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "honeypot" => Some(SessionKind::Honeypot),
            "bait" => Some(SessionKind::Bait),
            _ => None,
        }
    }
}

/// Resolution state of a session.
///
/// An unmatched honeypot session gets one of three attacker labels,
/// depending on what its credentials say about the intrusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Newly ingested, correlation pass not yet run.
    Pending,
    /// Confirmed match with a bait record; expected traffic.
    BaitSession,
    /// Unmatched honeypot session reusing credentials a bait client
    /// leaked at some point, however long ago.
    CredentialsReuse,
    /// Unmatched honeypot session with no login attempts at all.
    Probe,
    /// Unmatched honeypot session guessing credentials the platform
    /// never transmitted.
    Bruteforce,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Pending => "pending",
            Classification::BaitSession => "bait_session",
            Classification::CredentialsReuse => "credentials_reuse",
            Classification::Probe => "probe",
            Classification::Bruteforce => "bruteforce",
        }
    }

    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Classification::Pending),
            "bait_session" => Some(Classification::BaitSession),
            "credentials_reuse" => Some(Classification::CredentialsReuse),
            "probe" => Some(Classification::Probe),
            "bruteforce" => Some(Classification::Bruteforce),
            _ => None,
        }
    }
}

/// A single login attempt observed within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication {
    pub id: String,
    pub username: String,
    pub password: String,
    pub successful: bool,
    pub timestamp: NaiveDateTime,
}

impl Authentication {
    /// Match equality for correlation: exact (username, password, success)
    /// tuple, case-sensitive, no normalization.
    pub fn credentials_match(&self, other: &Authentication) -> bool {
        self.username == other.username
            && self.password == other.password
            && self.successful == other.successful
    }
}

/// One raw interaction log entry. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub timestamp: NaiveDateTime,
    pub direction: String,
    pub data: String,
}

/// A normalized session record from either side of the platform.
///
/// Both kinds share one struct; `kind` is the discriminator. Bait-only
/// fields are `None` on honeypot sessions and vice versa for the
/// transcript/content, which a bait session only acquires through a merge.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub kind: SessionKind,
    pub protocol: String,
    pub source_ip: String,
    pub source_port: u16,
    pub destination_ip: String,
    pub destination_port: u16,
    /// When the reported activity occurred.
    pub timestamp: NaiveDateTime,
    /// When the engine ingested the record.
    pub received: NaiveDateTime,
    pub honeypot_id: String,
    pub client_id: Option<String>,
    pub classification: Classification,
    pub did_connect: Option<bool>,
    pub did_login: Option<bool>,
    pub did_complete: Option<bool>,
    pub authentications: Vec<Authentication>,
    pub transcript: Vec<TranscriptEntry>,
    pub session_data: Option<String>,
}
