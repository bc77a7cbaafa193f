use std::path::{Path, PathBuf};

use chrono::Utc;
use reqwest::Client;

use crate::{
    config::Settings,
    document::{format_bytes, render_document, write_document},
    editor::{rows_from_text, HeaderRows},
    error::{ApiTesterError, ApiTesterResult},
    executor::{execute_draft, ExecutionResult, HttpMethod, RequestDraft, SaveConfig},
};

/// State behind the request form: the inputs, the raw header text kept in
/// sync with the rows, and the single last-result slot.
#[derive(Debug, Clone)]
pub struct RequestPanel {
    pub url: String,
    pub method: HttpMethod,
    pub name: Option<String>,
    pub body_text: String,
    pub save_config: SaveConfig,
    headers: HeaderRows,
    headers_text: String,
    response_view: String,
    statistics: Vec<String>,
    last_result: Option<ExecutionResult>,
}

impl Default for RequestPanel {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl RequestPanel {
    pub fn new(settings: &Settings) -> Self {
        let mut headers = HeaderRows::new();
        headers.push_empty();
        let headers_text = headers.canonical_text();
        Self {
            url: String::new(),
            method: HttpMethod::default(),
            name: None,
            body_text: String::new(),
            save_config: SaveConfig {
                save_response: settings.save_responses,
                ..SaveConfig::default()
            },
            headers,
            headers_text,
            response_view: String::new(),
            statistics: Vec::new(),
            last_result: None,
        }
    }

    pub fn header_rows(&self) -> &HeaderRows {
        &self.headers
    }

    pub fn headers_text(&self) -> &str {
        &self.headers_text
    }

    pub fn add_header_row(&mut self) -> usize {
        let index = self.headers.push_empty();
        self.sync_headers();
        index
    }

    pub fn set_header_key(&mut self, index: usize, key: &str) -> bool {
        let changed = self.headers.set_key(index, key);
        self.sync_headers();
        changed
    }

    pub fn set_header_value(&mut self, index: usize, value: &str) -> bool {
        let changed = self.headers.set_value(index, value);
        self.sync_headers();
        changed
    }

    pub fn remove_header_row(&mut self, index: usize) -> bool {
        let removed = self.headers.remove(index).is_some();
        self.sync_headers();
        removed
    }

    /// Edits the header text directly. Text that reads as a header object
    /// replaces the rows and is rewritten in canonical form; anything else is
    /// kept as typed and rejected on submit.
    pub fn set_headers_text(&mut self, text: &str) {
        match rows_from_text(text) {
            Some(rows) => {
                self.headers = rows;
                self.sync_headers();
            }
            None => self.headers_text = text.to_string(),
        }
    }

    pub fn apply_preset(&mut self, name: &str, settings: &Settings) -> ApiTesterResult<()> {
        let preset = settings
            .preset(name)
            .ok_or_else(|| ApiTesterError::UnknownPreset(name.to_string()))?;
        self.headers.apply_preset(preset);
        self.sync_headers();
        Ok(())
    }

    fn sync_headers(&mut self) {
        self.headers_text = self.headers.canonical_text();
    }

    pub fn draft(&self) -> RequestDraft {
        RequestDraft {
            name: self.name.clone(),
            url: self.url.clone(),
            method: self.method,
            headers_text: self.headers_text.clone(),
            body_text: self.body_text.clone(),
        }
    }

    pub async fn submit(&mut self, client: &Client) -> ApiTesterResult<&ExecutionResult> {
        match execute_draft(client, &self.draft()).await {
            Ok(result) => {
                self.response_view = serde_json::to_string_pretty(&result.response.data)
                    .unwrap_or_else(|_| result.response.data.to_string());
                self.statistics = statistics_lines(&result);
                let stored: &ExecutionResult = self.last_result.insert(result);
                Ok(stored)
            }
            Err(err) => {
                self.response_view = format!("Error: {err}");
                self.statistics.clear();
                self.last_result = None;
                Err(err)
            }
        }
    }

    pub fn response_view(&self) -> &str {
        &self.response_view
    }

    pub fn statistics(&self) -> &[String] {
        &self.statistics
    }

    pub fn last_result(&self) -> Option<&ExecutionResult> {
        self.last_result.as_ref()
    }

    pub fn can_save(&self) -> bool {
        self.last_result.is_some()
    }

    pub async fn save(&self, vault_root: &Path, settings: &Settings) -> ApiTesterResult<PathBuf> {
        let result = self
            .last_result
            .as_ref()
            .ok_or(ApiTesterError::MissingResult)?;
        let document = render_document(result, &self.save_config);
        write_document(
            vault_root,
            &settings.default_path,
            &result.request.name,
            Utc::now(),
            &document,
        )
        .await
    }
}

pub fn statistics_lines(result: &ExecutionResult) -> Vec<String> {
    vec![
        format!("Response Time: {}ms", result.response_time_ms),
        format!("Status Code: {}", result.response.status),
        format!(
            "Response Size: {}",
            format_bytes(result.response_size_bytes)
        ),
    ]
}
