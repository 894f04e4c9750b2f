use serde::Deserialize;

/// Raw session payload as published on the bus.
///
/// Both session kinds share one JSON shape; kind-specific fields are
/// optional here and validated by the normalizer according to the topic
/// the payload arrived on.
#[derive(Debug, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub timestamp: String,
    pub protocol: String,
    pub source_ip: String,
    pub source_port: u16,
    pub destination_ip: String,
    pub destination_port: u16,
    /// Required for every record; `None` (absent or JSON null) is an
    /// upstream contract violation.
    pub honeypot_id: Option<String>,
    pub login_attempts: Vec<LoginRecord>,
    // Honeypot-kind fields
    pub transcript: Option<Vec<TranscriptRecord>>,
    #[serde(default)]
    pub session_data: Option<serde_json::Value>,
    // Bait-kind fields
    pub client_id: Option<String>,
    pub did_connect: Option<bool>,
    pub did_login: Option<bool>,
    pub did_complete: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRecord {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub successful: bool,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptRecord {
    pub timestamp: String,
    pub direction: String,
    pub data: String,
}
