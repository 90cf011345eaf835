//! SQLite-backed book store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension};

use super::{
    dedup_links, normalize_title, BookFilter, BookRecord, BookStore, BookUpsert, PurchaseLink,
    ReconcileEvent, SortOrder, StoreError,
};
use crate::classifier::{AgeBand, Category};

const SELECT_COLUMNS: &str = "id, title, favorites, comments, age_band, category, \
     thumbnail_url, purchase_links, created_at, updated_at";

/// SQLite-backed book store.
pub struct SqliteBookStore {
    conn: Mutex<Connection>,
}

impl SqliteBookStore {
    /// Create a new SQLite book store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite book store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- One row per normalized title
            CREATE TABLE IF NOT EXISTS books (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                title_key TEXT NOT NULL UNIQUE,
                favorites INTEGER NOT NULL DEFAULT 1,
                comments TEXT NOT NULL DEFAULT '[]',
                age_band TEXT NOT NULL,
                category TEXT NOT NULL,
                thumbnail_url TEXT,
                purchase_links TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_books_category ON books(category);
            CREATE INDEX IF NOT EXISTS idx_books_favorites ON books(favorites DESC);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Database(format!("connection lock poisoned: {}", e)))
    }

    fn timestamp(dt: DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn parse_category(raw: &str) -> rusqlite::Result<Category> {
        Category::parse(raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                Type::Text,
                Box::new(StoreError::Serialization(format!(
                    "unknown category '{}'",
                    raw
                ))),
            )
        })
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<BookRecord> {
        let comments_json: String = row.get(3)?;
        let age_band: String = row.get(4)?;
        let category: String = row.get(5)?;
        let links_json: String = row.get(7)?;
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;

        // Rows are only written by this store; unreadable JSON degrades to empty.
        let comments: Vec<String> = serde_json::from_str(&comments_json).unwrap_or_default();
        let purchase_links: Vec<PurchaseLink> =
            serde_json::from_str(&links_json).unwrap_or_default();

        Ok(BookRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            favorites: row.get(2)?,
            comments,
            age_band: AgeBand::new(age_band),
            category: Self::parse_category(&category)?,
            thumbnail_url: row.get(6)?,
            purchase_links,
            created_at: Self::parse_timestamp(&created_at),
            updated_at: Self::parse_timestamp(&updated_at),
        })
    }

    fn get_by_key(conn: &Connection, key: &str) -> Result<Option<BookRecord>, StoreError> {
        let record = conn
            .query_row(
                &format!("SELECT {} FROM books WHERE title_key = ?", SELECT_COLUMNS),
                params![key],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Add one favorite (and optionally a comment) to an existing row.
    fn bump(&self, title: &str, comment: Option<&str>) -> Result<ReconcileEvent, StoreError> {
        let key = normalize_title(title);
        let now = Self::timestamp(Utc::now());
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let changed = match comment {
            Some(comment) => tx.execute(
                r#"UPDATE books
                   SET favorites = favorites + 1,
                       comments = json_insert(comments, '$[#]', ?),
                       updated_at = ?
                   WHERE title_key = ?"#,
                params![comment, now, key],
            )?,
            None => tx.execute(
                r#"UPDATE books
                   SET favorites = favorites + 1, updated_at = ?
                   WHERE title_key = ?"#,
                params![now, key],
            )?,
        };
        if changed == 0 {
            return Err(StoreError::NotFound(title.trim().to_string()));
        }

        let record = Self::get_by_key(&tx, &key)?
            .ok_or_else(|| StoreError::NotFound(title.trim().to_string()))?;
        tx.commit()?;
        Ok(ReconcileEvent::Merged(record))
    }
}

impl BookStore for SqliteBookStore {
    fn upsert(&self, upsert: BookUpsert) -> Result<ReconcileEvent, StoreError> {
        let fresh = BookRecord::from_upsert(&upsert);
        let key = fresh.key();
        let comments_json = serde_json::to_string(&fresh.comments)?;
        let links_json = serde_json::to_string(&dedup_links(fresh.purchase_links.clone()))?;
        let now = Self::timestamp(fresh.created_at);

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let existed: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM books WHERE title_key = ?)",
            params![key],
            |row| row.get(0),
        )?;

        // First write wins for everything except favorites and comments.
        tx.execute(
            r#"INSERT INTO books (id, title, title_key, favorites, comments, age_band,
                                 category, thumbnail_url, purchase_links, created_at, updated_at)
               VALUES (?, ?, ?, 1, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(title_key) DO UPDATE SET
                   favorites = books.favorites + 1,
                   comments = json_insert(
                       books.comments, '$[#]', json_extract(excluded.comments, '$[0]')
                   ),
                   updated_at = excluded.updated_at"#,
            params![
                fresh.id,
                fresh.title,
                key,
                comments_json,
                fresh.age_band.as_str(),
                fresh.category.as_str(),
                fresh.thumbnail_url,
                links_json,
                now,
                now,
            ],
        )?;

        let record = Self::get_by_key(&tx, &key)?
            .ok_or_else(|| StoreError::Database(format!("upserted row '{}' missing", key)))?;
        tx.commit()?;

        Ok(if existed {
            ReconcileEvent::Merged(record)
        } else {
            ReconcileEvent::Created(record)
        })
    }

    fn like(&self, title: &str) -> Result<ReconcileEvent, StoreError> {
        self.bump(title, None)
    }

    fn add_reason(&self, title: &str, comment: &str) -> Result<ReconcileEvent, StoreError> {
        self.bump(title, Some(comment))
    }

    fn get(&self, title: &str) -> Result<Option<BookRecord>, StoreError> {
        let conn = self.lock()?;
        Self::get_by_key(&conn, &normalize_title(title))
    }

    fn list(&self, filter: &BookFilter) -> Result<Vec<BookRecord>, StoreError> {
        let conn = self.lock()?;

        let order = match filter.sort {
            SortOrder::Recent => "seq DESC",
            SortOrder::Popular => "favorites DESC, seq DESC",
        };
        let (where_clause, category) = match filter.category {
            Some(c) => ("WHERE category = ?1", Some(c.as_str())),
            None => ("", None),
        };
        let sql = format!(
            "SELECT {} FROM books {} ORDER BY {}",
            SELECT_COLUMNS, where_clause, order
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = match category {
            Some(c) => stmt.query_map(params![c], Self::row_to_record)?,
            None => stmt.query_map([], Self::row_to_record)?,
        };

        let mut records = Vec::new();
        for row in rows {
            let record = row?;
            if filter.matches(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn count(&self) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count)
    }

    fn ping(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let sampled: i64 = conn.query_row(
            "SELECT COUNT(*) FROM (SELECT 1 FROM books LIMIT 1)",
            [],
            |row| row.get(0),
        )?;
        Ok(sampled as usize)
    }
}
