//! SQLite card store
//!
//! One `cards` table, one row per saved card. Data fields are stored as
//! plain columns so records stay readable with the sqlite3 shell.
//! `created_at` is microseconds since the epoch; listing orders by it and
//! breaks ties by rowid.

use std::path::Path;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{record_id, CardStore, StoreError};
use crate::card::{CardRecord, Gradient, NewCard, SocialCardData, TemplateId};

const SCHEMA_VERSION: i32 = 1;

const SELECT_COLUMNS: &str = "id, user_id, template_id, created_at, name, title, website, \
     portfolio, email, linkedin, github, twitter, about, interests, tech_skills, \
     published_works, latest_work_links, phone, photo_url, gradient";

pub struct SqliteCardStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteCardStore {
    /// Open (or create) the database and apply the schema
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.execute_batch(
                r#"
                PRAGMA journal_mode=WAL;
                PRAGMA synchronous=NORMAL;
                PRAGMA busy_timeout=5000;
                "#,
            )
        });
        let pool = Pool::builder().max_size(4).build(manager)?;

        let conn = pool.get()?;
        Self::init_schema(&conn)?;
        tracing::debug!(path = %db_path.display(), "Card store opened");

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT
            );
            "#,
        )?;

        let current_version: i32 = conn.query_row(
            "SELECT COALESCE(
                (SELECT CAST(value AS INTEGER) FROM metadata WHERE key = 'schema_version'),
                0
            )",
            [],
            |row| row.get(0),
        )?;

        if current_version < 1 {
            Self::apply_schema_v1(conn)?;
        }

        Ok(())
    }

    fn apply_schema_v1(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cards (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                template_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,

                name TEXT NOT NULL DEFAULT '',
                title TEXT NOT NULL DEFAULT '',
                website TEXT NOT NULL DEFAULT '',
                portfolio TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                linkedin TEXT NOT NULL DEFAULT '',
                github TEXT NOT NULL DEFAULT '',
                twitter TEXT NOT NULL DEFAULT '',
                about TEXT NOT NULL DEFAULT '',
                interests TEXT NOT NULL DEFAULT '',
                tech_skills TEXT NOT NULL DEFAULT '',
                published_works TEXT NOT NULL DEFAULT '',
                latest_work_links TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                photo_url TEXT NOT NULL DEFAULT '',
                gradient TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_cards_user_created ON cards(user_id, created_at);
            "#,
        )?;

        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;

        tracing::info!(version = SCHEMA_VERSION, "Applied card store schema");
        Ok(())
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<CardRecord> {
        let template: String = row.get(2)?;
        let micros: i64 = row.get(3)?;
        let gradient: Option<String> = row.get(19)?;

        Ok(CardRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            template_id: TemplateId::parse(&template),
            created_at: DateTime::<Utc>::from_timestamp_micros(micros).unwrap_or_default(),
            data: SocialCardData {
                name: row.get(4)?,
                title: row.get(5)?,
                website: row.get(6)?,
                portfolio: row.get(7)?,
                email: row.get(8)?,
                linkedin: row.get(9)?,
                github: row.get(10)?,
                twitter: row.get(11)?,
                about: row.get(12)?,
                interests: row.get(13)?,
                tech_skills: row.get(14)?,
                published_works: row.get(15)?,
                latest_work_links: row.get(16)?,
                phone: row.get(17)?,
                photo_url: row.get(18)?,
                gradient: gradient.as_deref().and_then(Gradient::parse),
            },
        })
    }
}

impl CardStore for SqliteCardStore {
    fn insert(&self, card: NewCard) -> Result<CardRecord, StoreError> {
        let conn = self.conn()?;
        let id = record_id(&card);
        let created_at = Utc::now();
        let d = &card.data;

        let result = conn.execute(
            r#"
            INSERT INTO cards (
                id, user_id, template_id, created_at, name, title, website, portfolio,
                email, linkedin, github, twitter, about, interests, tech_skills,
                published_works, latest_work_links, phone, photo_url, gradient
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18, ?19, ?20)
            "#,
            params![
                id,
                card.user_id,
                card.template.as_str(),
                created_at.timestamp_micros(),
                d.name,
                d.title,
                d.website,
                d.portfolio,
                d.email,
                d.linkedin,
                d.github,
                d.twitter,
                d.about,
                d.interests,
                d.tech_skills,
                d.published_works,
                d.latest_work_links,
                d.phone,
                d.photo_url,
                d.gradient.map(|g| g.as_str()),
            ],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(StoreError::Duplicate(id));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(card_id = %id, user_id = %card.user_id, "Card inserted");

        Ok(CardRecord {
            id,
            user_id: card.user_id,
            template_id: card.template,
            // Round-trip precision matches what a later read returns
            created_at: DateTime::<Utc>::from_timestamp_micros(created_at.timestamp_micros())
                .unwrap_or(created_at),
            data: card.data,
        })
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<CardRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM cards WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![user_id], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn get(&self, id: &str) -> Result<Option<CardRecord>, StoreError> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {} FROM cards WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn delete(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM cards WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(removed > 0)
    }
}
