//! SeaORM entity models for the session store.
//!
//! Tables:
//! - `honeypots` / `clients` — identity rows created elsewhere in the
//!   platform; the engine only resolves them and bumps client activity
//! - `sessions` — both session variants, discriminated by `kind`
//! - `authentications` — login attempts owned by a session
//! - `transcripts` — raw interaction log entries owned by a session
//!
//! Timestamps are stored as fixed-width `%Y-%m-%dT%H:%M:%S%.6f` strings so
//! SQL comparisons order chronologically.

/// Honeypots table entity models.
pub mod honeypots {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "honeypots")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Clients table entity models.
pub mod clients {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "clients")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        /// Last time a bait record from this client was persisted.
        pub last_activity: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Sessions table entity models.
pub mod sessions {
    use sea_orm::entity::prelude::*;

    /// One row per session of either kind. Bait-only columns are NULL on
    /// honeypot rows; `session_data` is NULL on bait rows until a merge.
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "sessions")]
    pub struct Model {
        /// Identifier supplied by the reporting side, unique across kinds
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        /// Discriminator: "honeypot" or "bait"
        pub kind: String,
        pub protocol: String,
        pub source_ip: String,
        pub source_port: i32,
        pub destination_ip: String,
        pub destination_port: i32,
        /// When the reported activity occurred
        pub timestamp: String,
        /// When the engine ingested the record
        pub received: String,
        pub honeypot_id: String,
        pub client_id: Option<String>,
        pub classification: String,
        pub did_connect: Option<bool>,
        pub did_login: Option<bool>,
        pub did_complete: Option<bool>,
        pub session_data: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::honeypots::Entity",
            from = "Column::HoneypotId",
            to = "super::honeypots::Column::Id"
        )]
        Honeypot,
        #[sea_orm(
            belongs_to = "super::clients::Entity",
            from = "Column::ClientId",
            to = "super::clients::Column::Id"
        )]
        Client,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Authentications table entity models.
pub mod authentications {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "authentications")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        /// Foreign key to `sessions.id`
        pub session_id: String,
        pub username: String,
        pub password: String,
        pub successful: bool,
        pub timestamp: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::sessions::Entity",
            from = "Column::SessionId",
            to = "super::sessions::Column::Id"
        )]
        Session,
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Transcripts table entity models.
pub mod transcripts {
    use sea_orm::entity::prelude::*;

    /// Ordered raw interaction entries. Rows are re-parented onto the
    /// surviving bait session during a merge.
    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "transcripts")]
    pub struct Model {
        /// Auto-increment row id, preserves recording order
        #[sea_orm(primary_key)]
        pub id: i32,
        /// Foreign key to `sessions.id`
        pub session_id: String,
        pub timestamp: String,
        pub direction: String,
        pub data: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::sessions::Entity",
            from = "Column::SessionId",
            to = "super::sessions::Column::Id"
        )]
        Session,
    }

    impl ActiveModelBehavior for ActiveModel {}
}
