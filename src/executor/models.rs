use std::{fmt, str::FromStr};

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(format!("unsupported HTTP method {other}")),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Raw form input, before any parsing.
#[derive(Debug, Clone, Default)]
pub struct RequestDraft {
    pub name: Option<String>,
    pub url: String,
    pub method: HttpMethod,
    pub headers_text: String,
    pub body_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub name: String,
    pub url: Url,
    pub method: HttpMethod,
    pub headers: Map<String, Value>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRecord {
    pub status: u16,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub request: RequestSpec,
    pub response: ResponseRecord,
    pub response_time_ms: u64,
    pub response_size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveConfig {
    pub save_headers: bool,
    pub save_body: bool,
    pub save_response: bool,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            save_headers: true,
            save_body: true,
            save_response: true,
        }
    }
}

/// Last path segment of `url`, or `"request"` when it is empty.
pub fn derive_request_name(url: &Url) -> String {
    url.path()
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("request")
        .to_string()
}
