//! SQLite-backed key-value table behind the shared `Repository`.
//!
//! Every collection is one row of `documents`: the key names the entity kind
//! and `body` holds the whole JSON array.

use common::store::KeyValueStore;
use common::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        store.connect()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).map_err(storage_error)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                key TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(storage_error)?;
        Ok(conn)
    }
}

fn storage_error(err: rusqlite::Error) -> Error {
    Error::Storage(err.to_string())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT body FROM documents WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(storage_error)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO documents (key, body, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![key, value],
        )
        .map_err(storage_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::canvas::Point;
    use common::model::certificate::ElementName;
    use common::model::template::CertificateTemplate;
    use common::store::Repository;
    use std::sync::Arc;

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("academy.sqlite");

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("courses").unwrap(), None);
        store.put("courses", "[]").unwrap();
        store.put("courses", "[1]").unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get("courses").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn templates_round_trip_through_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(Arc::new(
            SqliteStore::open(dir.path().join("academy.sqlite")).unwrap(),
        ));
        let mut template = CertificateTemplate::new("Shiatsu", "");
        template.set_element_position(ElementName::Title, Point::new(12.0, 34.5));
        repo.upsert(template.clone()).unwrap();

        let loaded: CertificateTemplate = repo.find(template.id()).unwrap();
        assert_eq!(loaded, template);
    }
}
