mod settings;
mod store;

pub use settings::{default_presets, HeaderPreset, Settings, DEFAULT_SAVE_PATH};
pub use store::{JsonFilePort, MemoryPort, SettingsPort, SettingsStore, SETTINGS_DIR, SETTINGS_FILE};
