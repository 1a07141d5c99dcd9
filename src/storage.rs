//! Key/value string store persisted as one JSON document, mirroring the
//! browser's local storage. Every write rewrites the whole document.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const STORE_FILE: &str = "local_storage.json";

pub const KEY_NEWS: &str = "dosfronteras_news";
pub const KEY_EVENTS: &str = "dosfronteras_events";
pub const KEY_FEATURED_VIDEO: &str = "dosfronteras_featured_video";
pub const KEY_LATEST_EPISODE: &str = "dosfronteras_latest_episode";
pub const KEY_CART: &str = "dosfronteras_cart";
pub const KEY_HEADLINES: &str = "dosfronteras_headlines";
pub const KEY_HEADLINES_UPDATED: &str = "dosfronteras_headlines_last_update";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored value for {key} is not valid json: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    items: BTreeMap<String, String>,
}

impl LocalStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens `<dir>/local_storage.json`. A missing or corrupt file starts
    /// empty; the next write replaces it.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(STORE_FILE);
        let items = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<BTreeMap<String, String>>(&raw).unwrap_or_else(|err| {
                warn!("ignoring corrupt store {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!("store {} unreadable: {err}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            items,
        }
    }

    /// Opens the store under `dir`, or an in-memory one when no directory
    /// could be resolved.
    pub fn open_or_memory(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Self::open(dir),
            None => {
                warn!("no data directory; changes will not be saved");
                Self::in_memory()
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.into());
        self.flush()
    }

    pub fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.get_item(key) else {
            return Ok(None);
        };
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            })
    }

    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, raw)
    }

    /// Applies many writes with a single flush.
    pub fn set_many(&mut self, entries: Vec<(&str, Option<String>)>) -> Result<(), StorageError> {
        for (key, value) in entries {
            match value {
                Some(value) => {
                    self.items.insert(key.to_string(), value);
                }
                None => {
                    self.items.remove(key);
                }
            }
        }
        self.flush()
    }

    fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.items).map_err(|source| StorageError::Encode {
            key: STORE_FILE.to_string(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}
