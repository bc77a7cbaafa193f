use serde_json::{Map, Value};

use crate::config::HeaderPreset;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRow {
    pub key: String,
    pub value: String,
}

impl HeaderRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    fn entry(&self) -> Option<(&str, &str)> {
        let key = self.key.trim();
        let value = self.value.trim();
        if key.is_empty() || value.is_empty() {
            None
        } else {
            Some((key, value))
        }
    }
}

/// Ordered header rows as typed into the editor.
///
/// Rows are kept verbatim, including half-filled ones. The canonical view
/// only carries rows whose trimmed key and value are both non-empty; when a
/// key repeats, the later value wins and the first position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRows {
    rows: Vec<HeaderRow>,
}

impl HeaderRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[HeaderRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> usize {
        self.rows.push(HeaderRow::new(key, value));
        self.rows.len() - 1
    }

    pub fn push_empty(&mut self) -> usize {
        self.push(String::new(), String::new())
    }

    /// Returns `false` when `index` is out of range.
    pub fn set_key(&mut self, index: usize, key: impl Into<String>) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.key = key.into();
                true
            }
            None => false,
        }
    }

    pub fn set_value(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<HeaderRow> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    /// Replaces the value of every row carrying `key`, or appends a new row.
    pub fn upsert(&mut self, key: &str, value: &str) {
        let mut found = false;
        for row in self.rows.iter_mut().filter(|row| row.key.trim() == key) {
            row.value = value.to_string();
            found = true;
        }
        if !found {
            self.push(key, value);
        }
    }

    pub fn apply_preset(&mut self, preset: &HeaderPreset) {
        for (key, value) in preset {
            self.upsert(key, value);
        }
    }

    pub fn replace_all<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.rows = entries
            .into_iter()
            .map(|(key, value)| HeaderRow::new(key, value))
            .collect();
    }

    pub fn canonical(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in self.rows.iter().filter_map(HeaderRow::entry) {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        map
    }

    pub fn canonical_text(&self) -> String {
        // A map of strings always serializes.
        serde_json::to_string_pretty(&self.canonical()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Reads a raw header object back into rows. Returns `None` when the text
/// is not a JSON object of scalar values.
pub fn rows_from_text(text: &str) -> Option<HeaderRows> {
    if text.trim().is_empty() {
        return Some(HeaderRows::new());
    }
    let Value::Object(map) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };
    let entries = map
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(_) | Value::Bool(_) => Some((key, value.to_string())),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    let mut rows = HeaderRows::new();
    rows.replace_all(entries);
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn json_preset() -> HeaderPreset {
        HeaderPreset::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ])
    }

    #[test]
    fn canonical_drops_incomplete_rows() {
        let mut rows = HeaderRows::new();
        rows.push("Accept", "text/plain");
        rows.push("", "orphan-value");
        rows.push("X-Empty", "   ");
        rows.push_empty();

        let canonical = rows.canonical();
        assert_eq!(canonical.len(), 1);
        assert_eq!(canonical["Accept"], "text/plain");
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn canonical_tracks_edits_and_removals() {
        let mut rows = HeaderRows::new();
        let first = rows.push_empty();
        assert!(rows.set_key(first, " X-Trace "));
        assert!(rows.canonical().is_empty());
        assert!(rows.set_value(first, "abc"));
        assert_eq!(rows.canonical()["X-Trace"], "abc");

        let second = rows.push("Authorization", "Bearer t");
        assert_eq!(rows.canonical().len(), 2);
        assert!(rows.remove(second).is_some());
        assert!(rows.remove(5).is_none());
        assert!(!rows.set_key(9, "nope"));

        let keys: Vec<_> = rows.canonical().keys().cloned().collect();
        assert_eq!(keys, vec!["X-Trace".to_string()]);
    }

    #[test]
    fn later_duplicate_overrides_earlier_value() {
        let mut rows = HeaderRows::new();
        rows.push("Accept", "text/plain");
        rows.push("X-Other", "1");
        rows.push("Accept", "application/json");

        let canonical = rows.canonical();
        let keys: Vec<_> = canonical.keys().cloned().collect();
        assert_eq!(keys, vec!["Accept".to_string(), "X-Other".to_string()]);
        assert_eq!(canonical["Accept"], "application/json");
    }

    #[test]
    fn preset_overrides_existing_keys() {
        let mut rows = HeaderRows::new();
        rows.push("Accept", "text/html");
        rows.push("X-Keep", "yes");

        rows.apply_preset(&json_preset());

        let canonical = rows.canonical();
        assert_eq!(canonical["Accept"], "application/json");
        assert_eq!(canonical["Content-Type"], "application/json");
        assert_eq!(canonical["X-Keep"], "yes");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn preset_rows_are_appended_in_preset_order() {
        let mut rows = HeaderRows::new();
        rows.apply_preset(&json_preset());

        let keys: Vec<_> = rows.rows().iter().map(|row| row.key.as_str()).collect();
        assert_eq!(keys, vec!["Content-Type", "Accept"]);
    }

    #[test]
    fn replace_all_discards_previous_rows() {
        let mut rows = HeaderRows::new();
        rows.push("Accept", "text/html");
        rows.push_empty();

        rows.replace_all([("X-Trace", "1"), ("X-Span", "2")]);

        assert_eq!(
            rows.rows(),
            &[HeaderRow::new("X-Trace", "1"), HeaderRow::new("X-Span", "2")]
        );
        rows.replace_all(Vec::<(String, String)>::new());
        assert!(rows.is_empty());
    }

    #[test]
    fn applying_preset_twice_is_idempotent() {
        let mut rows = HeaderRows::new();
        rows.push("X-Keep", "yes");

        rows.apply_preset(&json_preset());
        let once = rows.canonical();
        rows.apply_preset(&json_preset());

        assert_eq!(rows.canonical(), once);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn canonical_text_is_pretty_json() {
        let mut rows = HeaderRows::new();
        rows.push("Accept", "application/json");
        assert_eq!(
            rows.canonical_text(),
            "{\n  \"Accept\": \"application/json\"\n}"
        );
        assert_eq!(HeaderRows::new().canonical_text(), "{}");
    }

    #[test]
    fn rows_from_text_reads_objects_only() {
        let rows = rows_from_text(r#"{"Accept":"application/json","X-Retry":3}"#).unwrap();
        assert_eq!(rows.canonical()["X-Retry"], "3");
        assert!(rows_from_text("").unwrap().is_empty());
        assert!(rows_from_text("[1,2]").is_none());
        assert!(rows_from_text(r#"{"nested":{"a":1}}"#).is_none());
        assert!(rows_from_text("{not json").is_none());
    }
}
