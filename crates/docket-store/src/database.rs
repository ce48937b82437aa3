use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::collection::Collection;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::file;
use crate::locks::LockTable;
use crate::names::validate_collection_name;

const EXTENSION: &str = "json";

/// Collection registry over a data directory.
///
/// Each materialized collection is one `<name>.json` file directly inside
/// the data directory. The registry never caches collection contents; it
/// only resolves names to files and creates or removes those files.
///
/// Cloning a `Database` shares its lock table, so clones coordinate with
/// each other. Two independently opened databases over the same directory
/// do not.
#[derive(Clone, Debug)]
pub struct Database {
    config: StoreConfig,
    locks: Arc<LockTable>,
}

impl Database {
    /// Open a database, creating the data directory if it does not exist.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(&config.data_dir)?;
        debug!(data_dir = %config.data_dir.display(), "database opened");
        Ok(Self {
            config,
            locks: Arc::new(LockTable::new()),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The data directory.
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Storage location for a collection name. Does not check existence.
    pub fn location(&self, name: &str) -> StoreResult<PathBuf> {
        validate_collection_name(name)?;
        Ok(self.config.data_dir.join(format!("{name}.{EXTENSION}")))
    }

    /// Names of all materialized collections, sorted.
    pub fn list(&self) -> StoreResult<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.config.data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) || !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_collection_name(stem).is_ok() {
                names.insert(stem.to_string());
            }
        }
        Ok(names)
    }

    /// Returns `true` if `name` is a materialized collection.
    ///
    /// Invalid names are never materialized.
    pub fn exists(&self, name: &str) -> bool {
        self.location(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Create an empty collection. Fails with `AlreadyExists` if present.
    pub fn materialize(&self, name: &str) -> StoreResult<()> {
        let path = self.location(name)?;
        let lock = self.locks.get(name)?;
        let _guard = lock
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        file::create_new(&path, name)?;
        info!(collection = name, "collection materialized");
        Ok(())
    }

    /// Remove a collection and all of its documents. Fails with `NotFound`
    /// if absent.
    pub fn destroy(&self, name: &str) -> StoreResult<()> {
        let path = self.location(name)?;
        let lock = self.locks.get(name)?;
        let _guard = lock
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(collection = name, "collection destroyed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open a handle on an existing collection. Fails with `NotFound` if the
    /// collection has not been materialized.
    pub fn collection(&self, name: &str) -> StoreResult<Collection> {
        let path = self.location(name)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(Collection::new(name.to_string(), path, self.locks.get(name)?))
    }

    /// Open a collection, materializing it first if needed.
    pub fn ensure(&self, name: &str) -> StoreResult<Collection> {
        match self.materialize(name) {
            Ok(()) | Err(StoreError::AlreadyExists(_)) => self.collection(name),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(StoreConfig::new(dir.path())).unwrap();
        (dir, db)
    }

    #[test]
    fn open_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let db = Database::open(StoreConfig::new(&nested)).unwrap();
        assert!(nested.is_dir());
        assert_eq!(db.data_dir(), nested.as_path());
    }

    #[test]
    fn materialize_and_list() {
        let (_dir, db) = temp_db();
        assert!(db.list().unwrap().is_empty());
        db.materialize("people").unwrap();
        db.materialize("audit").unwrap();
        let names: Vec<_> = db.list().unwrap().into_iter().collect();
        assert_eq!(names, vec!["audit", "people"]);
        assert!(db.exists("people"));
        assert!(!db.exists("ghost"));
    }

    #[test]
    fn materialize_twice_fails() {
        let (_dir, db) = temp_db();
        db.materialize("people").unwrap();
        assert!(matches!(db.materialize("people"), Err(StoreError::AlreadyExists(_))));
    }

    #[test]
    fn destroy_removes_collection() {
        let (_dir, db) = temp_db();
        db.materialize("people").unwrap();
        db.destroy("people").unwrap();
        assert!(!db.exists("people"));
        assert!(matches!(db.destroy("people"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn collection_requires_materialization() {
        let (_dir, db) = temp_db();
        assert!(matches!(db.collection("ghost"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let (_dir, db) = temp_db();
        assert!(matches!(db.materialize("../x"), Err(StoreError::InvalidName { .. })));
        assert!(matches!(db.collection("a/b"), Err(StoreError::InvalidName { .. })));
        assert!(!db.exists("../x"));
    }

    #[test]
    fn list_ignores_foreign_files() {
        let (dir, db) = temp_db();
        db.materialize("people").unwrap();
        fs::write(dir.path().join("notes.txt"), b"hi").unwrap();
        fs::write(dir.path().join(".hidden.json"), b"{}").unwrap();
        fs::write(dir.path().join(".tmpA1b2C3"), b"{\"documents\": {}}").unwrap();
        fs::create_dir(dir.path().join("sub.json")).unwrap();
        let names: Vec<_> = db.list().unwrap().into_iter().collect();
        assert_eq!(names, vec!["people"]);
    }

    #[test]
    fn hand_made_empty_file_is_a_collection() {
        let (dir, db) = temp_db();
        fs::write(dir.path().join("legacy.json"), b"").unwrap();
        assert!(db.exists("legacy"));
        assert!(db.collection("legacy").unwrap().is_empty().unwrap());
    }

    #[test]
    fn ensure_is_idempotent() {
        let (_dir, db) = temp_db();
        db.ensure("users").unwrap();
        db.ensure("users").unwrap();
        assert_eq!(db.list().unwrap().len(), 1);
    }

    #[test]
    fn concurrent_materialize_has_one_winner() {
        use std::thread;

        let (_dir, db) = temp_db();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                thread::spawn(move || db.materialize("people").is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .filter(|ok| *ok)
            .count();
        assert_eq!(winners, 1);
    }
}
