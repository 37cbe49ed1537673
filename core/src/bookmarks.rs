//! Bookmarks and last-read page, persisted in SQLite

use crate::display::{clamp_page, is_valid_page};
use crate::error::MushafError;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Oldest bookmarks beyond this count are dropped
pub const MAX_BOOKMARKS: usize = 50;

const LAST_PAGE_KEY: &str = "last_page";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub page: u32,
    pub chapter: Option<String>,
    pub division: Option<String>,
    pub created_at: String,
}

fn row_to_bookmark(row: &Row) -> rusqlite::Result<Bookmark> {
    Ok(Bookmark {
        page: row.get(0)?,
        chapter: row.get(1)?,
        division: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub struct BookmarkStore {
    db_path: PathBuf,
}

impl BookmarkStore {
    /// Open (creating if missing) the settings database at `db_path`
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, MushafError> {
        let db_path = db_path.into();

        // Parent directory may not exist on first startup
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| MushafError::Other(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Each call opens a new connection
    fn connection(&self) -> Result<Connection, MushafError> {
        Ok(Connection::open(&self.db_path)?)
    }

    fn init_schema(&self) -> Result<(), MushafError> {
        let conn = self.connection()?;
        conn.execute_batch(
            r#"
            -- Bookmarks (one per page, newest first, capped)
            CREATE TABLE IF NOT EXISTS bookmarks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                page INTEGER NOT NULL UNIQUE,
                chapter TEXT,
                division TEXT,
                created_at TEXT NOT NULL
            );

            -- App settings (key-value store)
            CREATE TABLE IF NOT EXISTS app_settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Bookmark `page`, moving an existing bookmark for it to the front.
    pub fn save_bookmark(
        &self,
        page: u32,
        chapter: Option<&str>,
        division: Option<&str>,
    ) -> Result<Bookmark, MushafError> {
        if !is_valid_page(page) {
            return Err(MushafError::InvalidPage(page));
        }

        let conn = self.connection()?;
        let now = chrono::Utc::now().to_rfc3339();

        // REPLACE deletes the old row, so the new one gets a fresh (higher) id
        conn.execute(
            "INSERT OR REPLACE INTO bookmarks (page, chapter, division, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![page, chapter, division, now],
        )?;

        conn.execute(
            "DELETE FROM bookmarks WHERE id NOT IN (
                SELECT id FROM bookmarks ORDER BY id DESC LIMIT ?1
            )",
            [MAX_BOOKMARKS as i64],
        )?;

        tracing::debug!(page, "bookmark saved");

        Ok(Bookmark {
            page,
            chapter: chapter.map(str::to_string),
            division: division.map(str::to_string),
            created_at: now,
        })
    }

    /// All bookmarks, newest first
    pub fn list_bookmarks(&self) -> Result<Vec<Bookmark>, MushafError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT page, chapter, division, created_at FROM bookmarks ORDER BY id DESC",
        )?;

        let bookmarks = stmt
            .query_map([], row_to_bookmark)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(bookmarks)
    }

    /// Returns whether a bookmark existed for `page`
    pub fn remove_bookmark(&self, page: u32) -> Result<bool, MushafError> {
        let conn = self.connection()?;
        let removed = conn.execute("DELETE FROM bookmarks WHERE page = ?1", [page])?;
        Ok(removed > 0)
    }

    pub fn clear_bookmarks(&self) -> Result<(), MushafError> {
        let conn = self.connection()?;
        conn.execute("DELETE FROM bookmarks", [])?;
        Ok(())
    }

    /// Last viewed page, clamped into the valid range; 1 when never set
    pub fn last_page(&self) -> Result<u32, MushafError> {
        let stored = self.get_setting(LAST_PAGE_KEY)?;
        Ok(stored
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(clamp_page)
            .unwrap_or(1))
    }

    pub fn set_last_page(&self, page: u32) -> Result<(), MushafError> {
        if !is_valid_page(page) {
            return Err(MushafError::InvalidPage(page));
        }
        self.set_setting(LAST_PAGE_KEY, &page.to_string())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>, MushafError> {
        let conn = self.connection()?;
        let value = conn
            .query_row("SELECT value FROM app_settings WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), MushafError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO app_settings (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }
}
