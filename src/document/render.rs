use chrono::{DateTime, Local};
use serde::Serialize;

use crate::executor::{ExecutionResult, SaveConfig};

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Renders the Markdown note for `result`, stamped with the current time.
pub fn render_document(result: &ExecutionResult, config: &SaveConfig) -> String {
    render_document_at(result, config, Local::now())
}

pub fn render_document_at(
    result: &ExecutionResult,
    config: &SaveConfig,
    timestamp: DateTime<Local>,
) -> String {
    let request = &result.request;
    let mut content = format!(
        "## API Request: {}\n\n### Basic Information\n- URL: {}\n- Method: {}\n- Timestamp: {}\n",
        request.name,
        request.url,
        request.method,
        timestamp.format("%Y-%m-%d %H:%M:%S")
    );

    if config.save_headers {
        content.push_str("\n### Request Headers\n");
        content.push_str(&json_block(&request.headers));
    }

    if config.save_body {
        if let Some(body) = &request.body {
            content.push_str("\n### Request Body\n");
            content.push_str(&json_block(body));
        }
    }

    if config.save_response {
        content.push_str("\n### Response\n");
        content.push_str(&json_block(&result.response));
        content.push_str(&format!(
            "\n\n### Statistics\n- Status Code: {}\n- Response Time: {}ms\n- Response Size: {}",
            result.response.status,
            result.response_time_ms,
            format_bytes(result.response_size_bytes)
        ));
    }

    content
}

fn json_block<T: Serialize>(value: &T) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    format!("```json\n{pretty}\n```")
}

/// Binary-prefixed size with up to two decimals, e.g. `1.5KB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }
    let mut exponent = 0;
    while exponent < UNITS.len() - 1 && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }
    let scaled = bytes as f64 / 1024u64.pow(exponent as u32) as f64;

    let fixed = format!("{scaled:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}", trimmed, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{HttpMethod, RequestSpec, ResponseRecord};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map, Value};
    use url::Url;

    fn sample_result() -> ExecutionResult {
        let mut headers = Map::new();
        headers.insert(
            "Content-Type".to_string(),
            Value::String("application/json".to_string()),
        );
        ExecutionResult {
            request: RequestSpec {
                name: "users".to_string(),
                url: Url::parse("https://api.example.com/v1/users").unwrap(),
                method: HttpMethod::Post,
                headers,
                body: Some(json!({"name": "ada"})),
            },
            response: ResponseRecord {
                status: 201,
                data: json!({"id": 7}),
            },
            response_time_ms: 87,
            response_size_bytes: 8,
        }
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn format_bytes_uses_binary_prefixes() {
        assert_eq!(format_bytes(0), "0B");
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(1024), "1KB");
        assert_eq!(format_bytes(1536), "1.5KB");
        assert_eq!(format_bytes(1_048_576), "1MB");
        assert_eq!(format_bytes(1_073_741_824), "1GB");
        assert_eq!(format_bytes(1_234_567), "1.18MB");
    }

    #[test]
    fn format_bytes_caps_at_gigabytes() {
        assert_eq!(format_bytes(2 * 1024u64.pow(4)), "2048GB");
    }

    #[test]
    fn render_includes_every_section_by_default() {
        let rendered = render_document_at(&sample_result(), &SaveConfig::default(), fixed_time());

        let expected = "## API Request: users

### Basic Information
- URL: https://api.example.com/v1/users
- Method: POST
- Timestamp: 2024-01-02 03:04:05

### Request Headers
```json
{
  \"Content-Type\": \"application/json\"
}
```
### Request Body
```json
{
  \"name\": \"ada\"
}
```
### Response
```json
{
  \"status\": 201,
  \"data\": {
    \"id\": 7
  }
}
```

### Statistics
- Status Code: 201
- Response Time: 87ms
- Response Size: 8B";

        assert_eq!(rendered, expected);
    }

    #[test]
    fn render_with_nothing_selected_has_no_json_blocks() {
        let config = SaveConfig {
            save_headers: false,
            save_body: false,
            save_response: false,
        };
        let rendered = render_document_at(&sample_result(), &config, fixed_time());

        assert!(rendered.starts_with("## API Request: users\n"));
        assert!(rendered.contains("### Basic Information"));
        assert!(!rendered.contains("```"));
        assert!(!rendered.contains("### Statistics"));
    }

    #[test]
    fn render_skips_body_section_without_body() {
        let mut result = sample_result();
        result.request.body = None;
        let rendered = render_document_at(&result, &SaveConfig::default(), fixed_time());

        assert!(!rendered.contains("### Request Body"));
        assert!(rendered.contains("### Request Headers"));
        assert!(rendered.contains("- Status Code: 201"));
    }

    #[test]
    fn render_document_stamps_current_time() {
        let rendered = render_document(&sample_result(), &SaveConfig::default());
        let year = Local::now().format("%Y").to_string();
        assert!(rendered.contains(&format!("- Timestamp: {year}")));
    }
}
