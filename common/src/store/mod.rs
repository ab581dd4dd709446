//! Whole-collection persistence behind an injectable key-value interface.
//!
//! Every entity kind lives as one JSON array under its own key. Reads and
//! writes always move the complete collection; there are no partial updates,
//! indices or migrations. Forward compatibility comes from the models' own
//! default-filling deserializers.

mod memory;

pub use memory::MemoryStore;

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Minimal storage backend: one opaque string per key.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, `None` if nothing was ever written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// An element of a persisted collection.
pub trait Document: Serialize + DeserializeOwned + Clone {
    /// Storage key holding the whole collection.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Result of a recovering load: the collection plus a user-facing warning
/// when the stored blob could not be read.
#[derive(Debug, Clone)]
pub struct Loaded<D> {
    pub items: Vec<D>,
    pub warning: Option<String>,
}

/// Typed access to collections in a `KeyValueStore`.
///
/// Read-modify-write operations are serialized within one process so
/// concurrent requests do not drop each other's changes. Across processes the
/// store stays last-writer-wins at collection granularity.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl Repository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Strict read of a whole collection. A malformed blob is an error.
    pub fn list<D: Document>(&self) -> Result<Vec<D>> {
        match self.store.get(D::COLLECTION)? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| Error::Malformed {
                key: D::COLLECTION.to_string(),
                source,
            }),
        }
    }

    /// Recovering read: a malformed blob degrades to an empty collection and a
    /// warning the caller is expected to surface.
    pub fn load<D: Document>(&self) -> Result<Loaded<D>> {
        match self.list() {
            Ok(items) => Ok(Loaded {
                items,
                warning: None,
            }),
            Err(err @ Error::Malformed { .. }) => Ok(Loaded {
                items: Vec::new(),
                warning: Some(format!("Stored data could not be read and was ignored ({err}).")),
            }),
            Err(err) => Err(err),
        }
    }

    pub fn find<D: Document>(&self, id: &str) -> Result<D> {
        self.list::<D>()?
            .into_iter()
            .find(|doc| doc.id() == id)
            .ok_or_else(|| Error::not_found(D::COLLECTION, id))
    }

    /// Replaces the whole collection.
    pub fn put_all<D: Document>(&self, items: &[D]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.store.put(D::COLLECTION, &raw)
    }

    /// Inserts `doc`, or replaces the element with the same id in place.
    pub fn upsert<D: Document>(&self, doc: D) -> Result<D> {
        let _guard = self.lock()?;
        let mut items = self.list::<D>()?;
        match items.iter_mut().find(|existing| existing.id() == doc.id()) {
            Some(existing) => *existing = doc.clone(),
            None => items.push(doc.clone()),
        }
        self.put_all(&items)?;
        Ok(doc)
    }

    /// Insert-or-replace where the new element is derived from the stored one.
    /// `prepare` sees the current element `id` (if any) and returns what to
    /// write; both happen under the write lock. Nothing is written when
    /// `prepare` fails. `prepare` may read through this repository but must
    /// not write through it.
    pub fn save_with<D, F>(&self, id: &str, prepare: F) -> Result<D>
    where
        D: Document,
        F: FnOnce(Option<&D>) -> Result<D>,
    {
        let _guard = self.lock()?;
        let mut items = self.list::<D>()?;
        let position = items.iter().position(|existing| existing.id() == id);
        let doc = prepare(position.map(|index| &items[index]))?;
        match position {
            Some(index) if doc.id() == id => items[index] = doc.clone(),
            _ => match items.iter_mut().find(|existing| existing.id() == doc.id()) {
                Some(existing) => *existing = doc.clone(),
                None => items.push(doc.clone()),
            },
        }
        self.put_all(&items)?;
        Ok(doc)
    }

    /// Loads the element `id`, lets `edit` change it and writes the collection
    /// back. Nothing is written when `edit` fails.
    pub fn update<D, F>(&self, id: &str, edit: F) -> Result<D>
    where
        D: Document,
        F: FnOnce(&mut D) -> Result<()>,
    {
        let _guard = self.lock()?;
        let mut items = self.list::<D>()?;
        let doc = items
            .iter_mut()
            .find(|doc| doc.id() == id)
            .ok_or_else(|| Error::not_found(D::COLLECTION, id))?;
        edit(doc)?;
        let updated = doc.clone();
        self.put_all(&items)?;
        Ok(updated)
    }

    /// Read-modify-write over two collections at once, used when one change
    /// has to land in both (an approval that also takes a batch seat).
    pub fn update_pair<A, B, F>(&self, a_id: &str, b_id: &str, edit: F) -> Result<(A, B)>
    where
        A: Document,
        B: Document,
        F: FnOnce(&mut A, &mut B) -> Result<()>,
    {
        let _guard = self.lock()?;
        let mut first = self.list::<A>()?;
        let mut second = self.list::<B>()?;
        let a = first
            .iter_mut()
            .find(|doc| doc.id() == a_id)
            .ok_or_else(|| Error::not_found(A::COLLECTION, a_id))?;
        let b = second
            .iter_mut()
            .find(|doc| doc.id() == b_id)
            .ok_or_else(|| Error::not_found(B::COLLECTION, b_id))?;
        edit(a, b)?;
        let result = (a.clone(), b.clone());
        self.put_all(&first)?;
        self.put_all(&second)?;
        Ok(result)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::Storage("write lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::canvas::Point;
    use crate::model::certificate::ElementName;
    use crate::model::template::CertificateTemplate;
    use pretty_assertions::assert_eq;

    fn repository() -> (Arc<MemoryStore>, Repository) {
        let store = Arc::new(MemoryStore::default());
        (store.clone(), Repository::new(store))
    }

    #[test]
    fn empty_store_lists_nothing() {
        let (_, repo) = repository();
        assert!(repo.list::<CertificateTemplate>().unwrap().is_empty());
    }

    #[test]
    fn save_and_reload_round_trips() {
        let (_, repo) = repository();
        let mut template = CertificateTemplate::new("Hot stone", "Advanced");
        template.set_element_position(ElementName::CourseName, Point::new(300.0, 250.5));
        repo.upsert(template.clone()).unwrap();

        let reloaded: CertificateTemplate = repo.find(template.id()).unwrap();
        assert_eq!(reloaded, template);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let (_, repo) = repository();
        let first = CertificateTemplate::new("A", "");
        let second = CertificateTemplate::new("B", "");
        repo.upsert(first.clone()).unwrap();
        repo.upsert(second.clone()).unwrap();

        let mut renamed = first.clone();
        renamed.rename("A2");
        repo.upsert(renamed).unwrap();

        let names: Vec<String> = repo
            .list::<CertificateTemplate>()
            .unwrap()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["A2", "B"]);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let (_, repo) = repository();
        let err = repo.find::<CertificateTemplate>("nope").unwrap_err();
        assert!(err.is_not_found());
        let err = repo
            .update::<CertificateTemplate, _>("nope", |_| Ok(()))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn malformed_blob_recovers_to_empty_with_warning() {
        let (store, repo) = repository();
        store.put(CertificateTemplate::COLLECTION, "{not json").unwrap();

        assert!(matches!(
            repo.list::<CertificateTemplate>(),
            Err(Error::Malformed { .. })
        ));
        let loaded = repo.load::<CertificateTemplate>().unwrap();
        assert!(loaded.items.is_empty());
        assert!(loaded.warning.is_some());
    }

    #[test]
    fn save_with_sees_the_stored_element() {
        let (_, repo) = repository();
        let template = CertificateTemplate::new("A", "");
        repo.upsert(template.clone()).unwrap();

        let mut seen = None;
        let saved = repo
            .save_with::<CertificateTemplate, _>(template.id(), |stored| {
                seen = stored.map(|t| t.name().to_string());
                let mut next = template.clone();
                next.rename("A2");
                Ok(next)
            })
            .unwrap();
        assert_eq!(seen.as_deref(), Some("A"));
        assert_eq!(saved.name(), "A2");
        assert_eq!(repo.list::<CertificateTemplate>().unwrap().len(), 1);

        let fresh = CertificateTemplate::new("B", "");
        repo.save_with::<CertificateTemplate, _>(fresh.id(), |stored| {
            assert!(stored.is_none());
            Ok(fresh.clone())
        })
        .unwrap();
        assert_eq!(repo.list::<CertificateTemplate>().unwrap().len(), 2);

        let err = repo
            .save_with::<CertificateTemplate, _>(fresh.id(), |_| {
                Err(Error::InvalidTransition("no".into()))
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
    }

    #[test]
    fn failed_edits_write_nothing() {
        let (store, repo) = repository();
        let template = CertificateTemplate::new("A", "");
        repo.upsert(template.clone()).unwrap();
        let before = store.get(CertificateTemplate::COLLECTION).unwrap();

        let result = repo.update::<CertificateTemplate, _>(template.id(), |t| {
            t.rename("changed");
            Err(Error::InvalidTransition("no".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.get(CertificateTemplate::COLLECTION).unwrap(), before);
    }
}
