use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde_json::Value;

use super::settings::{HeaderPreset, Settings};
use crate::document::is_vault_relative;

pub const SETTINGS_DIR: &str = ".apinote";
pub const SETTINGS_FILE: &str = "settings.json";

/// Durable key/value storage for the settings document.
pub trait SettingsPort {
    fn load(&self) -> Result<Option<Value>>;
    fn save(&self, value: &Value) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFilePort {
    path: PathBuf,
}

impl JsonFilePort {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_vault(vault_root: &Path) -> Self {
        Self::new(vault_root.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsPort for JsonFilePort {
    fn load(&self) -> Result<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("reading settings {}", self.path.display()))?;
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("parsing settings {}", self.path.display()))?;
        Ok(Some(value))
    }

    fn save(&self, value: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating settings directory {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(value)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("writing settings {}", self.path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPort {
    value: RefCell<Option<Value>>,
}

impl MemoryPort {
    pub fn new(initial: Option<Value>) -> Self {
        Self {
            value: RefCell::new(initial),
        }
    }

    pub fn snapshot(&self) -> Option<Value> {
        self.value.borrow().clone()
    }
}

impl SettingsPort for MemoryPort {
    fn load(&self) -> Result<Option<Value>> {
        Ok(self.snapshot())
    }

    fn save(&self, value: &Value) -> Result<()> {
        *self.value.borrow_mut() = Some(value.clone());
        Ok(())
    }
}

/// Settings loaded once and written back through the port on every change.
pub struct SettingsStore<P: SettingsPort> {
    settings: Settings,
    port: P,
}

impl<P: SettingsPort> SettingsStore<P> {
    pub fn load(port: P) -> Result<Self> {
        let settings = match port.load()? {
            Some(persisted) => merge_with_defaults(persisted)?,
            None => Settings::default(),
        };
        tracing::debug!(path = %settings.default_path, "settings loaded");
        Ok(Self { settings, port })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn update<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Settings),
    {
        change(&mut self.settings);
        self.flush()
    }

    /// Stores the trimmed folder. Empty paths and paths leaving the vault are
    /// refused and leave the settings untouched.
    pub fn set_default_path(&mut self, path: &str) -> Result<()> {
        let path = path.trim();
        if !is_vault_relative(path) {
            bail!("Save path must be a folder inside the vault: {path:?}");
        }
        let path = path.to_string();
        self.update(|settings| settings.default_path = path)
    }

    pub fn set_save_responses(&mut self, enabled: bool) -> Result<()> {
        self.update(|settings| settings.save_responses = enabled)
    }

    pub fn set_preset(&mut self, name: impl Into<String>, preset: HeaderPreset) -> Result<()> {
        let name = name.into();
        self.update(|settings| {
            settings.default_headers.insert(name, preset);
        })
    }

    pub fn remove_preset(&mut self, name: &str) -> Result<()> {
        if !self.settings.default_headers.contains_key(name) {
            bail!("Unknown header preset: {name}");
        }
        self.update(|settings| {
            settings.default_headers.shift_remove(name);
        })
    }

    fn flush(&self) -> Result<()> {
        let value = serde_json::to_value(&self.settings)?;
        self.port.save(&value).context("saving settings")?;
        tracing::debug!("settings saved");
        Ok(())
    }
}

/// Shallow merge: every top-level key present in `persisted` replaces the
/// default wholesale.
fn merge_with_defaults(persisted: Value) -> Result<Settings> {
    let Value::Object(overrides) = persisted else {
        bail!("settings must be a JSON object");
    };
    let Value::Object(mut merged) = serde_json::to_value(Settings::default())? else {
        bail!("default settings did not serialize to an object");
    };
    for (key, value) in overrides {
        merged.insert(key, value);
    }
    serde_json::from_value(Value::Object(merged)).context("parsing settings")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn load_without_persisted_data_uses_defaults() -> Result<()> {
        let store = SettingsStore::load(MemoryPort::default())?;
        assert_eq!(store.settings(), &Settings::default());
        assert!(store.port().snapshot().is_none());
        Ok(())
    }

    #[test]
    fn persisted_values_override_defaults() -> Result<()> {
        let port = MemoryPort::new(Some(json!({ "defaultPath": "Requests/Saved" })));
        let store = SettingsStore::load(port)?;

        assert_eq!(store.settings().default_path, "Requests/Saved");
        assert!(store.settings().save_responses);
        assert_eq!(store.settings().default_headers.len(), 3);
        Ok(())
    }

    #[test]
    fn persisted_presets_replace_default_presets() -> Result<()> {
        let port = MemoryPort::new(Some(json!({
            "defaultHeaders": { "Plain": { "Accept": "text/plain" } }
        })));
        let store = SettingsStore::load(port)?;
        assert_eq!(store.settings().preset_names(), vec!["Plain"]);
        Ok(())
    }

    #[test]
    fn unusable_save_paths_are_refused() -> Result<()> {
        let mut store = SettingsStore::load(MemoryPort::default())?;

        assert!(store.set_default_path("").is_err());
        assert!(store.set_default_path("/var/notes").is_err());
        assert!(store.set_default_path("../outside").is_err());
        assert!(store.port().snapshot().is_none());

        store.set_default_path("  Notes/HTTP ")?;
        assert_eq!(store.settings().default_path, "Notes/HTTP");
        Ok(())
    }

    #[test]
    fn non_object_settings_are_rejected() {
        let port = MemoryPort::new(Some(json!(["not", "settings"])));
        assert!(SettingsStore::load(port).is_err());
    }

    #[test]
    fn every_mutation_is_flushed() -> Result<()> {
        let mut store = SettingsStore::load(MemoryPort::default())?;

        store.set_default_path("Vault/API")?;
        assert_eq!(store.port().snapshot().unwrap()["defaultPath"], "Vault/API");

        store.set_save_responses(false)?;
        assert_eq!(store.port().snapshot().unwrap()["saveResponses"], false);

        store.set_preset(
            "Auth",
            HeaderPreset::from([("Authorization".to_string(), "Bearer x".to_string())]),
        )?;
        assert_eq!(
            store.port().snapshot().unwrap()["defaultHeaders"]["Auth"]["Authorization"],
            "Bearer x"
        );

        store.remove_preset("XML")?;
        assert!(store.port().snapshot().unwrap()["defaultHeaders"]
            .get("XML")
            .is_none());
        assert!(store.remove_preset("XML").is_err());
        Ok(())
    }

    #[test]
    fn json_file_port_round_trips_through_disk() -> Result<()> {
        let temp = tempdir()?;
        let port = JsonFilePort::in_vault(temp.path());
        assert!(port.load()?.is_none());

        let mut store = SettingsStore::load(port.clone())?;
        store.set_default_path("Saved")?;
        assert!(temp.path().join(".apinote/settings.json").exists());

        let reloaded = SettingsStore::load(port)?;
        assert_eq!(reloaded.settings().default_path, "Saved");
        Ok(())
    }

    #[test]
    fn json_file_port_reports_invalid_json() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("settings.json");
        std::fs::write(&path, "{ not json")?;

        let err = JsonFilePort::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("parsing settings"));
        Ok(())
    }
}
