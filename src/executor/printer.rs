use colored::{Color, Colorize};

use crate::document::format_bytes;

use super::models::ExecutionResult;

pub fn print_execution_result(result: &ExecutionResult) {
    println!("{}", render_execution_result(result));
}

fn render_execution_result(result: &ExecutionResult) -> String {
    let status = result.response.status;
    let status_color = if status >= 400 {
        Color::Red
    } else if status >= 300 {
        Color::Yellow
    } else {
        Color::Green
    };

    let mut lines = vec![
        format!(
            "{} {}",
            result.request.method.as_str().bold(),
            result.request.url.as_str().cyan()
        ),
        format!(
            "{} {} {}",
            "Status:".bold(),
            status.to_string().color(status_color),
            format!("({} ms)", result.response_time_ms).dimmed()
        ),
        format!(
            "{} {}",
            "Size:".bold(),
            format_bytes(result.response_size_bytes).dimmed()
        ),
    ];

    lines.push("Response".bold().to_string());
    lines.push(
        serde_json::to_string_pretty(&result.response.data)
            .unwrap_or_else(|_| result.response.data.to_string()),
    );
    lines.join("\n")
}
