use std::{
    fmt,
    io::{self, Write},
};

use anyhow::{anyhow, Result};
use inquire::{Confirm, InquireError, Select, Text};

use crate::{
    config::SettingsPort,
    executor::HttpMethod,
    panel::RequestPanel,
    plugin::ApiTester,
    shell::{CommandSpec, Workspace},
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");

pub async fn run_interactive<P: SettingsPort>(mut plugin: ApiTester<P>) -> Result<()> {
    let mut workspace = Workspace::new();
    plugin.on_load(&mut workspace);
    let mut ui = InquireUi;
    run_interactive_with_ui(&mut plugin, &mut workspace, &mut ui).await
}

pub(crate) async fn run_interactive_with_ui<P: SettingsPort>(
    plugin: &mut ApiTester<P>,
    workspace: &mut Workspace,
    ui: &mut dyn InteractiveUi,
) -> Result<()> {
    ui.print(&format!("apinote v{} (built {})", VERSION, BUILD_TIMESTAMP));

    loop {
        let mut menu_items: Vec<MenuItem> = workspace
            .commands()
            .iter()
            .cloned()
            .map(MenuItem::Command)
            .collect();
        menu_items.push(MenuItem::Settings);
        menu_items.push(MenuItem::Quit);

        let labels: Vec<String> = menu_items.iter().map(|item| item.to_string()).collect();
        let Some(index) = ui.select("apinote", &labels, 0)? else {
            break;
        };
        let choice = menu_items
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow!("invalid menu selection"))?;

        match choice {
            MenuItem::Command(command) => {
                if let Err(err) = plugin.run_command(workspace, &command) {
                    ui.print(&format!("Error: {err}"));
                    continue;
                }
                run_panel(plugin, ui).await?;
            }
            MenuItem::Settings => run_settings(plugin, ui)?,
            MenuItem::Quit => break,
        }
    }

    Ok(())
}

#[derive(Clone)]
enum MenuItem {
    Command(CommandSpec),
    Settings,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Command(command) => write!(f, "{}", command.name),
            MenuItem::Settings => write!(f, "⚙ Settings"),
            MenuItem::Quit => write!(f, "Quit"),
        }
    }
}

#[derive(Clone, Copy)]
enum PanelItem {
    Url,
    Method,
    Name,
    AddHeader,
    EditHeader,
    RemoveHeader,
    ApplyPreset,
    RawHeaders,
    Body,
    ToggleSaveHeaders,
    ToggleSaveBody,
    ToggleSaveResponse,
    Send,
    Save,
    Back,
}

const PANEL_ITEMS: [PanelItem; 15] = [
    PanelItem::Url,
    PanelItem::Method,
    PanelItem::Name,
    PanelItem::AddHeader,
    PanelItem::EditHeader,
    PanelItem::RemoveHeader,
    PanelItem::ApplyPreset,
    PanelItem::RawHeaders,
    PanelItem::Body,
    PanelItem::ToggleSaveHeaders,
    PanelItem::ToggleSaveBody,
    PanelItem::ToggleSaveResponse,
    PanelItem::Send,
    PanelItem::Save,
    PanelItem::Back,
];

fn panel_label(item: PanelItem, panel: &RequestPanel) -> String {
    match item {
        PanelItem::Url => format!("URL: {}", display_or(&panel.url, "<required>")),
        PanelItem::Method => format!("Method: {}", panel.method),
        PanelItem::Name => format!(
            "Name: {}",
            panel.name.as_deref().unwrap_or("<from URL>")
        ),
        PanelItem::AddHeader => "+ Add header".to_string(),
        PanelItem::EditHeader => format!("Edit header ({} rows)", panel.header_rows().len()),
        PanelItem::RemoveHeader => "× Remove header".to_string(),
        PanelItem::ApplyPreset => "Apply default headers".to_string(),
        PanelItem::RawHeaders => "Edit headers as JSON".to_string(),
        PanelItem::Body => format!(
            "Request body ({})",
            if panel.body_text.trim().is_empty() {
                "empty".to_string()
            } else {
                format!("{} chars", panel.body_text.len())
            }
        ),
        PanelItem::ToggleSaveHeaders => checkbox("Save Headers", panel.save_config.save_headers),
        PanelItem::ToggleSaveBody => checkbox("Save Body", panel.save_config.save_body),
        PanelItem::ToggleSaveResponse => {
            checkbox("Save Response", panel.save_config.save_response)
        }
        PanelItem::Send => "➤ Send Request".to_string(),
        PanelItem::Save => {
            if panel.can_save() {
                "Save Request".to_string()
            } else {
                "Save Request (disabled)".to_string()
            }
        }
        PanelItem::Back => "← Back".to_string(),
    }
}

fn checkbox(label: &str, checked: bool) -> String {
    format!("[{}] {}", if checked { "x" } else { " " }, label)
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

async fn run_panel<P: SettingsPort>(
    plugin: &mut ApiTester<P>,
    ui: &mut dyn InteractiveUi,
) -> Result<()> {
    let mut cursor = 0;
    loop {
        let labels: Vec<String> = {
            let panel = plugin
                .panel()
                .ok_or_else(|| anyhow!("panel is not open"))?;
            PANEL_ITEMS
                .iter()
                .map(|item| panel_label(*item, panel))
                .collect()
        };
        let Some(selected) = ui.select("API Tester", &labels, cursor)? else {
            return Ok(());
        };
        cursor = selected;
        let item = *PANEL_ITEMS
            .get(cursor)
            .ok_or_else(|| anyhow!("invalid menu selection"))?;

        match item {
            PanelItem::Send => {
                if let Err(err) = plugin.submit().await {
                    tracing::debug!(error = %err, "request did not complete");
                }
                let panel = plugin
                    .panel()
                    .ok_or_else(|| anyhow!("panel is not open"))?;
                ui.print(panel.response_view());
                for line in panel.statistics() {
                    ui.print(line);
                }
            }
            PanelItem::Save => {
                let ready = plugin.panel().map(RequestPanel::can_save).unwrap_or(false);
                if !ready {
                    ui.print("Send a request before saving.");
                    continue;
                }
                match plugin.save().await {
                    Ok(path) => ui.print(&format!(
                        "Request saved successfully: {}",
                        path.strip_prefix(plugin.vault_root())
                            .unwrap_or(&path)
                            .display()
                    )),
                    Err(err) => ui.print(&format!("Failed to save request: {err}")),
                }
            }
            PanelItem::ApplyPreset => {
                let names = plugin.settings().settings().preset_names();
                if names.is_empty() {
                    ui.print("No default headers configured.");
                    continue;
                }
                let Some(index) = ui.select("Default headers", &names, 0)? else {
                    continue;
                };
                let name = names
                    .get(index)
                    .ok_or_else(|| anyhow!("invalid preset selection"))?;
                let settings = plugin.settings().settings().clone();
                if let Some(panel) = plugin.panel_mut() {
                    if let Err(err) = panel.apply_preset(name, &settings) {
                        ui.print(&format!("Error: {err}"));
                    }
                }
            }
            PanelItem::Back => return Ok(()),
            other => {
                let panel = plugin
                    .panel_mut()
                    .ok_or_else(|| anyhow!("panel is not open"))?;
                edit_panel(other, panel, ui)?;
            }
        }
    }
}

fn edit_panel(item: PanelItem, panel: &mut RequestPanel, ui: &mut dyn InteractiveUi) -> Result<()> {
    match item {
        PanelItem::Url => {
            if let Some(url) = ui.input("URL", Some(&panel.url))? {
                panel.url = url.trim().to_string();
            }
        }
        PanelItem::Method => {
            let labels: Vec<String> = HttpMethod::ALL.iter().map(|m| m.to_string()).collect();
            let start = HttpMethod::ALL
                .iter()
                .position(|method| *method == panel.method)
                .unwrap_or(0);
            let Some(index) = ui.select("Method", &labels, start)? else {
                return Ok(());
            };
            panel.method = *HttpMethod::ALL
                .get(index)
                .ok_or_else(|| anyhow!("invalid method selection"))?;
        }
        PanelItem::Name => {
            if let Some(name) = ui.input("Name (empty to derive from URL)", panel.name.as_deref())? {
                let trimmed = name.trim();
                panel.name = (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
        }
        PanelItem::AddHeader => {
            let index = panel.add_header_row();
            edit_header_row(panel, index, ui)?;
        }
        PanelItem::EditHeader => {
            if let Some(index) = select_header_row(panel, ui, "Edit header")? {
                edit_header_row(panel, index, ui)?;
            }
        }
        PanelItem::RemoveHeader => {
            if let Some(index) = select_header_row(panel, ui, "Remove header")? {
                panel.remove_header_row(index);
            }
        }
        PanelItem::RawHeaders => {
            ui.print("Headers as a JSON object. Finish with an empty line.");
            ui.print(panel.headers_text());
            if let Some(text) = ui.read_multiline("headers>")? {
                panel.set_headers_text(&text);
            }
        }
        PanelItem::Body => {
            ui.print("Request body in JSON format. Finish with an empty line.");
            match ui.read_multiline("body>")? {
                Some(text) => panel.body_text = text,
                None => {
                    if !panel.body_text.is_empty()
                        && ui.confirm("Clear the request body?", false)?
                    {
                        panel.body_text.clear();
                    }
                }
            }
        }
        PanelItem::ToggleSaveHeaders => {
            panel.save_config.save_headers = !panel.save_config.save_headers
        }
        PanelItem::ToggleSaveBody => panel.save_config.save_body = !panel.save_config.save_body,
        PanelItem::ToggleSaveResponse => {
            panel.save_config.save_response = !panel.save_config.save_response
        }
        PanelItem::Send | PanelItem::Save | PanelItem::ApplyPreset | PanelItem::Back => {}
    }
    Ok(())
}

fn select_header_row(
    panel: &RequestPanel,
    ui: &mut dyn InteractiveUi,
    prompt: &str,
) -> Result<Option<usize>> {
    let rows = panel.header_rows().rows();
    if rows.is_empty() {
        ui.print("No header rows.");
        return Ok(None);
    }
    let labels: Vec<String> = rows
        .iter()
        .map(|row| {
            format!(
                "{}: {}",
                display_or(&row.key, "<key>"),
                display_or(&row.value, "<value>")
            )
        })
        .collect();
    ui.select(prompt, &labels, 0)
}

fn edit_header_row(panel: &mut RequestPanel, index: usize, ui: &mut dyn InteractiveUi) -> Result<()> {
    let (key, value) = match panel.header_rows().rows().get(index) {
        Some(row) => (row.key.clone(), row.value.clone()),
        None => return Ok(()),
    };
    if let Some(key) = ui.input("Header Key", Some(&key))? {
        panel.set_header_key(index, &key);
    }
    if let Some(value) = ui.input("Header Value", Some(&value))? {
        panel.set_header_value(index, &value);
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum SettingsItem {
    SavePath,
    SaveResponses,
    Back,
}

fn run_settings<P: SettingsPort>(plugin: &mut ApiTester<P>, ui: &mut dyn InteractiveUi) -> Result<()> {
    let items = [
        SettingsItem::SavePath,
        SettingsItem::SaveResponses,
        SettingsItem::Back,
    ];
    loop {
        let settings = plugin.settings().settings();
        let labels: Vec<String> = items
            .iter()
            .map(|item| match item {
                SettingsItem::SavePath => format!("Default Save Path: {}", settings.default_path),
                SettingsItem::SaveResponses => checkbox("Save Responses", settings.save_responses),
                SettingsItem::Back => "← Back".to_string(),
            })
            .collect();
        let Some(index) = ui.select("API Tester Settings", &labels, 0)? else {
            return Ok(());
        };
        let item = *items
            .get(index)
            .ok_or_else(|| anyhow!("invalid menu selection"))?;

        let outcome = match item {
            SettingsItem::SavePath => {
                let current = plugin.settings().settings().default_path.clone();
                match ui.input("Default Save Path", Some(&current))? {
                    Some(path) => plugin.settings_mut().set_default_path(path.trim()),
                    None => Ok(()),
                }
            }
            SettingsItem::SaveResponses => {
                let enabled = !plugin.settings().settings().save_responses;
                plugin.settings_mut().set_save_responses(enabled)
            }
            SettingsItem::Back => return Ok(()),
        };
        if let Err(err) = outcome {
            ui.print(&format!("Error: {err:?}"));
        }
    }
}

pub(crate) trait InteractiveUi {
    fn print(&mut self, message: &str);
    /// Returns `None` when the prompt is dismissed.
    fn select(&mut self, prompt: &str, items: &[String], start: usize) -> Result<Option<usize>>;
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<Option<String>>;
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;
    fn read_multiline(&mut self, prompt: &str) -> Result<Option<String>>;
}

struct InquireUi;

impl InteractiveUi for InquireUi {
    fn print(&mut self, message: &str) {
        println!("{}", message);
    }

    fn select(&mut self, prompt: &str, items: &[String], start: usize) -> Result<Option<usize>> {
        let choice = Select::new(prompt, items.to_vec())
            .with_page_size(15)
            .with_starting_cursor(start.min(items.len().saturating_sub(1)))
            .raw_prompt();
        match choice {
            Ok(choice) => Ok(Some(choice.index)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        let mut builder = Text::new(prompt);
        if let Some(value) = default.filter(|value| !value.is_empty()) {
            builder = builder.with_default(value);
        }
        match builder.prompt() {
            Ok(value) => Ok(Some(value)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(other) => Err(other.into()),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        match Confirm::new(prompt).with_default(default).prompt() {
            Ok(value) => Ok(value),
            Err(other) => Err(other.into()),
        }
    }

    fn read_multiline(&mut self, prompt: &str) -> Result<Option<String>> {
        read_multiline_from_stdin(prompt)
    }
}

/// Reads lines until an empty one. Returns `None` when nothing was entered.
fn read_multiline_from_stdin(prompt: &str) -> Result<Option<String>> {
    let stdin = io::stdin();
    let mut lines = Vec::new();

    loop {
        print!("{} ", prompt);
        io::stdout().flush()?;

        let mut buffer = String::new();
        let bytes = stdin.read_line(&mut buffer)?;
        if bytes == 0 {
            // EOF
            break;
        }

        let trimmed = buffer.trim_end_matches(['\n', '\r']);
        if trimmed.is_empty() {
            break;
        }
        lines.push(trimmed.to_string());
    }

    if lines.is_empty() {
        Ok(None)
    } else {
        Ok(Some(lines.join("\n")))
    }
}
