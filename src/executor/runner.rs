use std::time::Instant;

use reqwest::Client;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{ApiTesterError, ApiTesterResult, InputField};

use super::models::{
    derive_request_name, ExecutionResult, RequestDraft, RequestSpec, ResponseRecord,
};

impl RequestDraft {
    /// Validates the raw form input. Nothing touches the network here.
    pub fn parse(&self) -> ApiTesterResult<RequestSpec> {
        let url = parse_url(&self.url)?;
        let headers = parse_headers(&self.headers_text)?;
        let body = parse_body(&self.body_text)?;

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| derive_request_name(&url));

        Ok(RequestSpec {
            name,
            url,
            method: self.method,
            headers,
            body,
        })
    }
}

fn parse_url(raw: &str) -> ApiTesterResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiTesterError::parse(InputField::Url, "a URL is required"));
    }
    Url::parse(trimmed).map_err(|err| ApiTesterError::parse(InputField::Url, err))
}

fn parse_headers(text: &str) -> ApiTesterResult<Map<String, Value>> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value =
        serde_json::from_str(text).map_err(|err| ApiTesterError::parse(InputField::Headers, err))?;
    let Value::Object(map) = value else {
        return Err(ApiTesterError::parse(
            InputField::Headers,
            "expected a JSON object",
        ));
    };
    if let Some((key, _)) = map
        .iter()
        .find(|(_, value)| matches!(value, Value::Array(_) | Value::Object(_)))
    {
        return Err(ApiTesterError::parse(
            InputField::Headers,
            format!("header {key} must be a plain value"),
        ));
    }
    Ok(map)
}

fn parse_body(text: &str) -> ApiTesterResult<Option<Value>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(text) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(err) => Err(ApiTesterError::parse(InputField::Body, err)),
    }
}

fn header_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub async fn execute_draft(client: &Client, draft: &RequestDraft) -> ApiTesterResult<ExecutionResult> {
    let spec = draft.parse()?;
    execute_request(client, spec).await
}

pub async fn execute_request(client: &Client, spec: RequestSpec) -> ApiTesterResult<ExecutionResult> {
    let mut request_builder = client.request(spec.method.into(), spec.url.clone());

    for (name, value) in &spec.headers {
        request_builder = request_builder.header(name.as_str(), header_value(value));
    }

    if let Some(body) = &spec.body {
        let payload = serde_json::to_string(body)
            .map_err(|err| ApiTesterError::parse(InputField::Body, err))?;
        request_builder = request_builder.body(payload);
    }

    tracing::debug!(method = %spec.method, url = %spec.url, "sending request");

    let start = Instant::now();
    let response = request_builder.send().await.map_err(|err| {
        tracing::warn!(url = %spec.url, error = %err, "request failed");
        ApiTesterError::from(err)
    })?;
    let status = response.status().as_u16();
    let bytes = response.bytes().await?;
    let data: Value = serde_json::from_slice(&bytes).map_err(|err| {
        ApiTesterError::Transport(format!("response is not valid JSON: {err}"))
    })?;
    let response_time_ms = start.elapsed().as_millis() as u64;

    let encoded = serde_json::to_string(&data)
        .map_err(|err| ApiTesterError::Transport(err.to_string()))?;
    let response_size_bytes = encoded.len() as u64;

    tracing::info!(
        method = %spec.method,
        url = %spec.url,
        status,
        elapsed_ms = response_time_ms,
        "request completed"
    );

    Ok(ExecutionResult {
        request: spec,
        response: ResponseRecord { status, data },
        response_time_ms,
        response_size_bytes,
    })
}
