use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use uuid::Uuid;

pub const DEVICE_ID_KEY: &str = "deviceId";
const STORE_TMP_EXTENSION: &str = "json.tmp";

/// Small string key-value file kept in the data directory.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read(&path)
                .with_context(|| format!("reading local storage {}", path.display()))?;
            match serde_json::from_slice(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(?err, path = %path.display(), "local storage unreadable, starting fresh");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        let json =
            serde_json::to_vec_pretty(&self.entries).context("serialising local storage")?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let tmp_path = self.path.with_extension(STORE_TMP_EXTENSION);
        fs::write(&tmp_path, &json)
            .with_context(|| format!("writing temporary local storage {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("persisting local storage {}", self.path.display()))?;
        Ok(())
    }
}

/// Returns the stored device id, generating and saving one on first use.
pub fn get_or_create_device_id(storage: &mut LocalStorage) -> Result<String> {
    if let Some(id) = storage.get(DEVICE_ID_KEY) {
        if !id.trim().is_empty() {
            return Ok(id.to_string());
        }
    }
    let id = Uuid::new_v4().to_string();
    storage.set(DEVICE_ID_KEY, &id)?;
    tracing::info!(device_id = %id, "generated device id");
    Ok(id)
}
