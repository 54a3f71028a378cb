//! Record store access.
//!
//! `MovieStore` is the narrow contract the sync needs: list everything, look
//! up titles by substring, and save a record. `SqliteStore` implements it on
//! a Django-style `movie_movie` table.

use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::StoreError;
use crate::models::MovieRecord;

/// Table written by the web app that owns the movie records.
pub const DEFAULT_TABLE: &str = "movie_movie";

pub trait MovieStore {
    /// All records in ascending id order.
    fn all_movies(&self) -> Result<Vec<MovieRecord>, StoreError>;

    /// Records whose title contains `needle`, ignoring ASCII case.
    fn titles_containing(&self, needle: &str) -> Result<Vec<MovieRecord>, StoreError>;

    /// Persist the record's current `image` value.
    fn save(&self, movie: &MovieRecord) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
    table: String,
}

impl SqliteStore {
    pub fn open(path: &Path, table: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, table)
    }

    pub fn from_connection(conn: Connection, table: &str) -> Result<Self, StoreError> {
        validate_table_name(table)?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Access to the connection for schema setup in tests and tools.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Table names are spliced into SQL, so only plain identifiers are allowed.
fn validate_table_name(table: &str) -> Result<(), StoreError> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidTable(table.to_string()))
    }
}

/// Escape LIKE wildcards so the needle is matched literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn read_movie(row: &rusqlite::Row<'_>) -> rusqlite::Result<MovieRecord> {
    let image: Option<String> = row.get(2)?;
    Ok(MovieRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        image: image.unwrap_or_default(),
    })
}

impl MovieStore for SqliteStore {
    fn all_movies(&self) -> Result<Vec<MovieRecord>, StoreError> {
        let sql = format!("SELECT id, title, image FROM {} ORDER BY id", self.table);
        let mut stmt = self.conn.prepare(&sql)?;
        let movies = stmt
            .query_map([], read_movie)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(movies)
    }

    fn titles_containing(&self, needle: &str) -> Result<Vec<MovieRecord>, StoreError> {
        let sql = format!(
            "SELECT id, title, image FROM {} WHERE title LIKE ?1 ESCAPE '\\' ORDER BY id",
            self.table
        );
        let pattern = format!("%{}%", escape_like(needle));
        let mut stmt = self.conn.prepare(&sql)?;
        let movies = stmt
            .query_map([pattern], read_movie)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(movies)
    }

    fn save(&self, movie: &MovieRecord) -> Result<(), StoreError> {
        let sql = format!("UPDATE {} SET image = ?1 WHERE id = ?2", self.table);
        let changed = self.conn.execute(&sql, params![movie.image, movie.id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(movie.id));
        }
        Ok(())
    }
}

// ============================================================================
// TEST SUPPORT
// ============================================================================

/// In-memory store with the given titles inserted in order (ids 1..=n).
#[cfg(test)]
pub(crate) fn memory_store(titles: &[&str]) -> SqliteStore {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE movie_movie (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            image TEXT
        );",
    )
    .unwrap();
    for title in titles {
        conn.execute("INSERT INTO movie_movie (title) VALUES (?1)", [title])
            .unwrap();
    }
    SqliteStore::from_connection(conn, DEFAULT_TABLE).unwrap()
}
