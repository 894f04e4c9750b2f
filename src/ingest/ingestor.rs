use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::configuration::client::ConfigClient;
use crate::correlation::{correlator, gate, merger};
use crate::error_handling::types::{EngineError, StorageError};
use crate::ingest::bus::{BusEvent, BusPoll, BusSubscriber};
use crate::record::normalizer;
use crate::session::types::{Classification, Session, SessionKind};
use crate::storage::Repository;

/// Bounded bus poll, so the loop stays responsive to channel shutdown.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Why an event was dropped without persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    UnknownTopic,
    IncompleteBait,
}

/// Terminal action of one ingestion pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Dropped(DropReason),
    Persisted { id: String },
    Merged { surviving_id: String, removed_id: String },
}

/// The cooperative single-consumer driver of the correlation pipeline.
///
/// Pulls one event at a time off the bus and runs it through
/// normalize → gate → persist → correlate → merge-or-classify before
/// touching the next one; no two events are ever in flight concurrently.
/// All collaborators are owned handles passed at construction.
pub struct SessionIngestor<C: ConfigClient> {
    bus: BusSubscriber,
    config: C,
    repository: Repository,
    window: chrono::Duration,
}

impl<C: ConfigClient> SessionIngestor<C> {
    pub fn new(
        bus: BusSubscriber,
        config: C,
        repository: Repository,
        window_secs: i64,
    ) -> Self {
        Self {
            bus,
            config,
            repository,
            window: chrono::Duration::seconds(window_secs),
        }
    }

    /// Runs until the bus closes. Per-event failures are logged and the
    /// loop moves on; they never halt ingestion.
    pub async fn run(mut self) {
        info!("session ingestion loop started");
        loop {
            match self.bus.poll(POLL_TIMEOUT).await {
                BusPoll::Idle => continue,
                BusPoll::Closed => break,
                BusPoll::Event(event) => {
                    let topic = event.topic.clone();
                    if let Err(e) = self.process_event(event).await {
                        error!("failed to process '{}' event: {}", topic, e);
                    }
                }
            }
        }
        info!("session bus closed, ingestion loop stopping");
    }

    /// Processes a single event to its terminal action.
    pub async fn process_event(&self, event: BusEvent) -> Result<Outcome, EngineError> {
        let Some(kind) = SessionKind::from_topic(&event.topic) else {
            warn!("unknown session topic: {}", event.topic);
            return Ok(Outcome::Dropped(DropReason::UnknownTopic));
        };

        let received = Utc::now().naive_utc();
        let session = normalizer::normalize(kind, &event.payload, received)?;
        debug!("persisting {} session {}", kind.as_str(), session.id);

        if !gate::should_persist(&session, &self.config)? {
            return Ok(Outcome::Dropped(DropReason::IncompleteBait));
        }

        if !self.repository.honeypot_exists(&session.honeypot_id).await? {
            return Err(StorageError::MissingRecord(session.honeypot_id.clone()).into());
        }
        self.repository.insert_session(&session).await?;

        let candidates = self
            .repository
            .find_candidates(&session, self.window)
            .await?;
        match correlator::find_match(&session, &candidates) {
            Some(matched) => {
                let merged = merger::merge(&self.repository, &session, matched).await?;
                Ok(Outcome::Merged {
                    surviving_id: merged.surviving_id,
                    removed_id: merged.removed_id,
                })
            }
            None => {
                if session.kind == SessionKind::Honeypot {
                    let classification = self.classify_unmatched(&session).await?;
                    debug!(
                        "no bait origin for honeypot session {}, classifying as {}",
                        session.id,
                        classification.as_str()
                    );
                    self.repository
                        .classify_session(&session.id, classification)
                        .await?;
                }
                Ok(Outcome::Persisted { id: session.id })
            }
        }
    }

    /// Attacker taxonomy for a honeypot session with no bait counterpart:
    /// no login attempts means a probe; credentials a bait client leaked
    /// at any point mean deliberate reuse; anything else is guessing.
    async fn classify_unmatched(&self, session: &Session) -> Result<Classification, EngineError> {
        if session.authentications.is_empty() {
            return Ok(Classification::Probe);
        }
        if self
            .repository
            .bait_credentials_leaked(&session.authentications)
            .await?
        {
            return Ok(Classification::CredentialsReuse);
        }
        Ok(Classification::Bruteforce)
    }
}
