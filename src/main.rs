use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use apinote::config::{JsonFilePort, SettingsStore};
use apinote::executor::{print_execution_result, HttpMethod};
use apinote::interactive::run_interactive;
use apinote::panel::RequestPanel;
use apinote::plugin::ApiTester;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "apinote",
    version,
    about = "Send HTTP requests and keep them as Markdown notes",
    disable_help_subcommand = true
)]
struct Cli {
    /// Folder that saved requests are written under
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    /// Settings file (defaults to <VAULT>/.apinote/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one request and print the response
    Send(SendArgs),
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Args, Debug)]
struct SendArgs {
    /// Absolute request URL
    #[arg(value_name = "URL")]
    url: String,

    /// HTTP method (GET, POST, PUT, DELETE)
    #[arg(short = 'X', long, default_value = "GET")]
    method: HttpMethod,

    /// Request header, repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,

    /// Merge a default header preset, repeatable
    #[arg(long = "preset", value_name = "PRESET")]
    presets: Vec<String>,

    /// JSON request body
    #[arg(short = 'd', long)]
    data: Option<String>,

    /// Name used for the saved document
    #[arg(long)]
    name: Option<String>,

    /// Save the exchange as a Markdown document
    #[arg(long)]
    save: bool,

    #[arg(long)]
    no_save_headers: bool,

    #[arg(long)]
    no_save_body: bool,

    #[arg(long)]
    no_save_response: bool,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the current settings
    Show,
    /// Change the folder documents are saved to
    SetPath {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Toggle whether responses are saved by default
    SaveResponses {
        #[arg(value_name = "ENABLED", action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir()?;
    let vault = cli
        .vault
        .as_ref()
        .map(|p| resolve_relative(&cwd, p))
        .unwrap_or_else(|| cwd.clone());
    let port = match &cli.settings {
        Some(path) => JsonFilePort::new(resolve_relative(&cwd, path)),
        None => JsonFilePort::in_vault(&vault),
    };
    let store = SettingsStore::load(port).context("loading settings")?;

    match cli.command {
        Some(Commands::Send(args)) => send(args, store, &vault).await,
        Some(Commands::Settings { action }) => {
            handle_settings(action.unwrap_or(SettingsAction::Show), store)
        }
        None => run_interactive(ApiTester::new(store, vault)).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "apinote=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

async fn send(args: SendArgs, store: SettingsStore<JsonFilePort>, vault: &Path) -> Result<()> {
    let settings = store.settings();
    let mut panel = RequestPanel::new(settings);
    panel.url = args.url;
    panel.method = args.method;
    panel.name = args.name;
    panel.body_text = args.data.unwrap_or_default();

    for preset in &args.presets {
        panel.apply_preset(preset, settings)?;
    }
    for raw in &args.headers {
        let (key, value) = parse_header_arg(raw)?;
        let index = panel.add_header_row();
        panel.set_header_key(index, key);
        panel.set_header_value(index, value);
    }

    panel.save_config.save_headers = !args.no_save_headers;
    panel.save_config.save_body = !args.no_save_body;
    if args.no_save_response {
        panel.save_config.save_response = false;
    }

    let client = reqwest::Client::new();
    let result = panel.submit(&client).await?;
    print_execution_result(result);

    if args.save {
        let path = panel.save(vault, settings).await?;
        println!("Saved request to {}", path.display());
    }
    Ok(())
}

fn handle_settings(action: SettingsAction, mut store: SettingsStore<JsonFilePort>) -> Result<()> {
    match action {
        SettingsAction::Show => {}
        SettingsAction::SetPath { path } => store.set_default_path(&path)?,
        SettingsAction::SaveResponses { enabled } => store.set_save_responses(enabled)?,
    }
    println!("{}", serde_json::to_string_pretty(store.settings())?);
    println!("# {}", store.port().path().display());
    Ok(())
}

fn parse_header_arg(raw: &str) -> Result<(&str, &str)> {
    let Some((key, value)) = raw.split_once(':') else {
        bail!("Header must look like 'Name: value': {raw}");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Header name missing in {raw}");
    }
    Ok((key, value.trim()))
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
