//! In-memory directory backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use super::record::{qualify, Record, Value};
use super::{DirectoryError, DirectoryService, Session};

#[derive(Debug, Clone)]
struct DirectoryData {
    schema: String,
    id_field: String,
    entries: BTreeMap<String, Record>,
}

type Store = Arc<RwLock<HashMap<String, DirectoryData>>>;

/// In-memory implementation of [`DirectoryService`].
///
/// Useful for development, testing, and embedding without a real directory.
/// Writes are applied immediately and journaled per session, so
/// [`Session::rollback`] undoes everything the session did since its last
/// commit. Clones share the same storage.
///
/// # Example
/// ```
/// use computed_groups_core::directory::{DirectoryService, InMemoryDirectoryService};
///
/// let directories = InMemoryDirectoryService::new()
///     .with_directory("userDirectory", "user", "username")
///     .with_directory("computedGroup", "group", "groupName");
///
/// let session = directories.open("computedGroup").unwrap();
/// assert_eq!(session.schema(), "group");
/// assert!(directories.open("unknown").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectoryService {
    store: Store,
}

impl InMemoryDirectoryService {
    /// Creates a service with no directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a directory (builder pattern).
    pub fn with_directory(
        self,
        name: impl Into<String>,
        schema: impl Into<String>,
        id_field: impl Into<String>,
    ) -> Self {
        self.add_directory(name, schema, id_field);
        self
    }

    /// Registers a directory. An existing directory of that name is kept.
    pub fn add_directory(
        &self,
        name: impl Into<String>,
        schema: impl Into<String>,
        id_field: impl Into<String>,
    ) {
        // setup-time only, recover from poisoning
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store.entry(name.into()).or_insert_with(|| DirectoryData {
            schema: schema.into(),
            id_field: id_field.into(),
            entries: BTreeMap::new(),
        });
    }

    /// Returns the number of entries in a directory, if it exists.
    pub fn entry_count(&self, directory: &str) -> Option<usize> {
        let store = self.store.read().ok()?;
        store.get(directory).map(|d| d.entries.len())
    }
}

impl DirectoryService for InMemoryDirectoryService {
    fn open(&self, directory: &str) -> Result<Box<dyn Session>, DirectoryError> {
        let store = self.store.read().map_err(poisoned)?;
        let data = store
            .get(directory)
            .ok_or_else(|| DirectoryError::NotFound(format!("directory '{}'", directory)))?;

        Ok(Box::new(InMemorySession {
            store: Arc::clone(&self.store),
            directory: directory.to_string(),
            schema: data.schema.clone(),
            id_field: data.id_field.clone(),
            journal: Vec::new(),
            closed: false,
        }))
    }
}

/// Undo step recorded for every write.
#[derive(Debug)]
enum Undo {
    /// The entry did not exist before.
    Remove(String),
    /// The entry existed with this content before.
    Restore(Record),
}

#[derive(Debug)]
struct InMemorySession {
    store: Store,
    directory: String,
    schema: String,
    id_field: String,
    journal: Vec<Undo>,
    closed: bool,
}

impl InMemorySession {
    fn ensure_open(&self) -> Result<(), DirectoryError> {
        if self.closed {
            Err(DirectoryError::Closed(self.directory.clone()))
        } else {
            Ok(())
        }
    }

    fn read<T>(&self, f: impl FnOnce(&DirectoryData) -> T) -> Result<T, DirectoryError> {
        self.ensure_open()?;
        let store = self.store.read().map_err(poisoned)?;
        let data = store
            .get(&self.directory)
            .ok_or_else(|| DirectoryError::NotFound(format!("directory '{}'", self.directory)))?;
        Ok(f(data))
    }

    fn write<T>(
        &mut self,
        f: impl FnOnce(&mut DirectoryData) -> Result<(T, Undo), DirectoryError>,
    ) -> Result<T, DirectoryError> {
        self.ensure_open()?;
        let (result, undo) = {
            let mut store = self.store.write().map_err(poisoned)?;
            let data = store.get_mut(&self.directory).ok_or_else(|| {
                DirectoryError::NotFound(format!("directory '{}'", self.directory))
            })?;
            f(data)?
        };
        self.journal.push(undo);
        Ok(result)
    }

    fn qualified_id_field(&self) -> String {
        qualify(&self.schema, &self.id_field)
    }
}

impl Session for InMemorySession {
    fn directory(&self) -> &str {
        &self.directory
    }

    fn schema(&self) -> &str {
        &self.schema
    }

    fn id_field(&self) -> &str {
        &self.id_field
    }

    fn create_entry(&mut self, fields: BTreeMap<String, Value>) -> Result<Record, DirectoryError> {
        let id_key = self.qualified_id_field();
        let schema = self.schema.clone();

        let mut record = Record::default();
        for (name, value) in fields {
            if name.contains('.') {
                record.set(name, value);
            } else {
                record.set_property(&schema, &name, value);
            }
        }

        let id = match record.get(&id_key) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => {
                return Err(DirectoryError::InvalidEntry(format!(
                    "missing '{}' in {}",
                    self.id_field, self.directory
                )))
            }
        };

        let mut entry = Record::new(id.clone());
        for (name, value) in record.fields() {
            entry.set(name.clone(), value.clone());
        }

        let directory = self.directory.clone();
        self.write(move |data| {
            if data.entries.contains_key(&id) {
                return Err(DirectoryError::Conflict(format!("'{}' in {}", id, directory)));
            }
            data.entries.insert(id.clone(), entry.clone());
            Ok((entry, Undo::Remove(id)))
        })
    }

    fn get_entry(&self, id: &str) -> Result<Option<Record>, DirectoryError> {
        self.read(|data| data.entries.get(id).cloned())
    }

    fn get_entries(&self) -> Result<Vec<Record>, DirectoryError> {
        self.read(|data| data.entries.values().cloned().collect())
    }

    fn update_entry(&mut self, record: Record) -> Result<(), DirectoryError> {
        let directory = self.directory.clone();
        self.write(move |data| {
            let id = record.id().to_string();
            match data.entries.insert(id.clone(), record) {
                Some(previous) => Ok(((), Undo::Restore(previous))),
                None => {
                    data.entries.remove(&id);
                    Err(DirectoryError::NotFound(format!("'{}' in {}", id, directory)))
                }
            }
        })
    }

    fn delete_entry(&mut self, id: &str) -> Result<(), DirectoryError> {
        let directory = self.directory.clone();
        self.write(move |data| match data.entries.remove(id) {
            Some(previous) => Ok(((), Undo::Restore(previous))),
            None => Err(DirectoryError::NotFound(format!("'{}' in {}", id, directory))),
        })
    }

    fn commit(&mut self) -> Result<(), DirectoryError> {
        self.ensure_open()?;
        self.journal.clear();
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DirectoryError> {
        self.ensure_open()?;
        if self.journal.is_empty() {
            return Ok(());
        }

        let mut store = self.store.write().map_err(poisoned)?;
        let data = store
            .get_mut(&self.directory)
            .ok_or_else(|| DirectoryError::NotFound(format!("directory '{}'", self.directory)))?;

        while let Some(undo) = self.journal.pop() {
            match undo {
                Undo::Remove(id) => {
                    data.entries.remove(&id);
                }
                Undo::Restore(record) => {
                    data.entries.insert(record.id().to_string(), record);
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), DirectoryError> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }
}

fn poisoned<E>(_: E) -> DirectoryError {
    DirectoryError::Storage("directory lock poisoned".to_string())
}
