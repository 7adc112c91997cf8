//! Per-device field storage.
//!
//! Fields written with `persist = true` survive a restart; the JSON store
//! writes them to disk on every persisted update. Transient fields live only
//! in memory.

use crate::error::{AdapterError, Result};
use log::{error, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Bool(_) => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Key-value fields scoped per device.
pub trait FieldStore: Send + Sync {
    fn get_field(&self, device_id: &str, key: &str) -> Option<FieldValue>;

    /// Write all `fields` as one update. Readers see either none or all of them.
    fn set_fields(
        &self,
        device_id: &str,
        fields: &[(&str, FieldValue)],
        persist: bool,
    ) -> Result<()>;

    fn set_field(&self, device_id: &str, key: &str, value: FieldValue, persist: bool) -> Result<()> {
        self.set_fields(device_id, &[(key, value)], persist)
    }
}

type DeviceFields = HashMap<String, HashMap<String, FieldValue>>;

fn insert_fields(map: &mut DeviceFields, device_id: &str, fields: &[(&str, FieldValue)]) {
    let entry = map.entry(device_id.to_string()).or_default();
    for (key, value) in fields {
        entry.insert((*key).to_string(), value.clone());
    }
}

/// Volatile store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryFieldStore {
    fields: RwLock<DeviceFields>,
}

impl MemoryFieldStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldStore for MemoryFieldStore {
    fn get_field(&self, device_id: &str, key: &str) -> Option<FieldValue> {
        self.fields.read().get(device_id)?.get(key).cloned()
    }

    fn set_fields(
        &self,
        device_id: &str,
        fields: &[(&str, FieldValue)],
        _persist: bool,
    ) -> Result<()> {
        insert_fields(&mut self.fields.write(), device_id, fields);
        Ok(())
    }
}

/// On-disk layout of persisted fields.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PersistedFields {
    pub devices: BTreeMap<String, BTreeMap<String, FieldValue>>,
}

impl PersistedFields {
    /// Load from file. A missing file is a first run; a corrupt file is
    /// logged and treated as empty.
    pub fn load(path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<PersistedFields>(&bytes) {
                Ok(state) => {
                    info!(
                        "Loaded persisted fields for {} device(s) from {:?}",
                        state.devices.len(),
                        path
                    );
                    state
                }
                Err(e) => {
                    warn!("Failed to parse field store {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No persisted fields found at {:?} (first run)", path);
                Self::default()
            }
            Err(e) => {
                error!("Failed to read field store {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save to file via a temporary sibling and rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Store backed by a JSON file.
pub struct JsonFieldStore {
    path: PathBuf,
    persisted: RwLock<PersistedFields>,
    transient: RwLock<DeviceFields>,
}

impl JsonFieldStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let persisted = PersistedFields::load(&path);
        Self {
            path,
            persisted: RwLock::new(persisted),
            transient: RwLock::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FieldStore for JsonFieldStore {
    fn get_field(&self, device_id: &str, key: &str) -> Option<FieldValue> {
        if let Some(value) = self
            .transient
            .read()
            .get(device_id)
            .and_then(|fields| fields.get(key))
        {
            return Some(value.clone());
        }
        self.persisted
            .read()
            .devices
            .get(device_id)?
            .get(key)
            .cloned()
    }

    fn set_fields(
        &self,
        device_id: &str,
        fields: &[(&str, FieldValue)],
        persist: bool,
    ) -> Result<()> {
        if !persist {
            insert_fields(&mut self.transient.write(), device_id, fields);
            return Ok(());
        }

        // Drop transient copies so the persisted value is visible
        if let Some(transient) = self.transient.write().get_mut(device_id) {
            for (key, _) in fields {
                transient.remove(*key);
            }
        }

        let mut state = self.persisted.write();
        let mut next = state.clone();
        let entry = next.devices.entry(device_id.to_string()).or_default();
        for (key, value) in fields {
            entry.insert((*key).to_string(), value.clone());
        }
        next.save(&self.path).map_err(|e| {
            AdapterError::FieldStore(format!("failed to persist fields for {device_id}: {e}"))
        })?;
        *state = next;
        Ok(())
    }
}
