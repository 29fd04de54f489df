use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::modality::Modality;

/// Key-value persistence boundary.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flat JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, values })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// Read-through wrapper that never fails.
///
/// Store errors are logged and swallowed; values written during the session
/// are kept in memory so they still apply when the backing store is broken.
pub struct Preferences {
    store: Box<dyn KeyValueStore>,
    session: HashMap<String, String>,
}

impl Preferences {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            session: HashMap::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Opens a [`JsonFileStore`], falling back to memory if it cannot be read.
    pub fn open_file(path: &Path) -> Self {
        match JsonFileStore::open(path) {
            Ok(store) => {
                log::info!("Using preferences file {}", path.display());
                Self::new(Box::new(store))
            }
            Err(err) => {
                log::warn!(
                    "{}: preferences unavailable ({err}); using in-memory defaults",
                    path.display()
                );
                Self::in_memory()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let stored = match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Preference read `{key}` failed: {err}");
                None
            }
        };

        stored
            .filter(|value| !value.is_empty())
            .or_else(|| self.session.get(key).cloned())
    }

    pub fn get_or(&self, key: &str, fallback: &str) -> String {
        self.get(key).unwrap_or_else(|| fallback.to_string())
    }

    /// Parsed finite number, or `fallback`.
    pub fn get_f64(&self, key: &str, fallback: f64) -> f64 {
        self.get(key)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(fallback)
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        if let Err(err) = self.store.set(key, &value) {
            log::warn!("Preference write `{key}` failed: {err}");
        }
        self.session.insert(key.to_string(), value);
    }
}

/// `wl_<field>_<MODALITY>`, e.g. `wl_preset_CT`.
pub fn wl_key(field: &str, modality: Modality) -> String {
    format!("wl_{field}_{modality}")
}
