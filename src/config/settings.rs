use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_SAVE_PATH: &str = "API Requests";

/// Header name to value, in the order the headers are applied.
pub type HeaderPreset = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "defaultPath")]
    pub default_path: String,
    #[serde(rename = "saveResponses")]
    pub save_responses: bool,
    #[serde(rename = "defaultHeaders")]
    pub default_headers: IndexMap<String, HeaderPreset>,
    #[serde(flatten)]
    pub extras: HashMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_path: DEFAULT_SAVE_PATH.to_string(),
            save_responses: true,
            default_headers: default_presets(),
            extras: HashMap::new(),
        }
    }
}

impl Settings {
    pub fn preset(&self, name: &str) -> Option<&HeaderPreset> {
        self.default_headers.get(name)
    }

    pub fn preset_names(&self) -> Vec<String> {
        self.default_headers.keys().cloned().collect()
    }
}

fn preset(entries: &[(&str, &str)]) -> HeaderPreset {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub fn default_presets() -> IndexMap<String, HeaderPreset> {
    IndexMap::from([
        (
            "JSON".to_string(),
            preset(&[
                ("Content-Type", "application/json"),
                ("Accept", "application/json"),
            ]),
        ),
        (
            "XML".to_string(),
            preset(&[
                ("Content-Type", "application/xml"),
                ("Accept", "application/xml"),
            ]),
        ),
        (
            "Form".to_string(),
            preset(&[("Content-Type", "application/x-www-form-urlencoded")]),
        ),
    ])
}
