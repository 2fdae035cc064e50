//! Profile persistence
//!
//! The engine never touches storage. A [`KeyValueStore`] holds the serialized
//! profile under a fixed key; [`load_profile`] rehydrates it with defaults and
//! [`save_profile`] writes it back.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, StorageError};
use crate::models::UserProfile;

/// Key the profile is stored under
pub const USER_DATA_KEY: &str = "user-data";

/// Minimal string key/value contract
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        JsonFileStore {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            }
            .into());
        }

        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                path,
                source,
            }
            .into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let write_failed = |source| StorageError::WriteFailed {
            key: key.to_string(),
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_failed)?;
        fs::write(&path, value).map_err(write_failed)?;

        debug!(key, path = %path.display(), bytes = value.len(), "Stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::RemoveFailed {
                key: key.to_string(),
                path,
                source,
            }
            .into()),
        }
    }
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Rehydrate the profile stored under `key`.
///
/// A missing key yields the default profile, and so does a payload that is
/// not a JSON object. Fields absent from the payload take their defaults;
/// mistyped fields degrade one at a time.
pub fn load_profile<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<UserProfile> {
    let Some(raw) = store.get(key)? else {
        debug!(key, "No stored profile, using defaults");
        return Ok(UserProfile::default());
    };

    match serde_json::from_str::<UserProfile>(&raw) {
        Ok(profile) => Ok(profile),
        Err(e) => {
            warn!(key, error = %e, "Stored profile is unreadable, using defaults");
            Ok(UserProfile::default())
        }
    }
}

/// Serialize and store the profile under `key`
pub fn save_profile<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    profile: &UserProfile,
) -> Result<()> {
    let json = serde_json::to_string_pretty(profile)?;
    store.set(key, &json)?;
    info!(key, "Profile saved");
    Ok(())
}
