use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use reqwest::Client;

use crate::{
    config::{SettingsPort, SettingsStore},
    panel::RequestPanel,
    shell::{CommandAction, CommandSpec, LeafId, Shell},
};

pub const VIEW_TYPE_API_TESTER: &str = "api-tester-view";
pub const OPEN_COMMAND_ID: &str = "open-api-tester";

/// The API tester as installed into a shell: its settings, HTTP client, and
/// at most one request panel.
pub struct ApiTester<P: SettingsPort> {
    settings: SettingsStore<P>,
    client: Client,
    vault_root: PathBuf,
    panel: Option<RequestPanel>,
    leaf: Option<LeafId>,
}

impl<P: SettingsPort> ApiTester<P> {
    pub fn new(settings: SettingsStore<P>, vault_root: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            client: Client::new(),
            vault_root: vault_root.into(),
            panel: None,
            leaf: None,
        }
    }

    pub fn on_load(&self, shell: &mut dyn Shell) {
        shell.register_panel(VIEW_TYPE_API_TESTER, "API Tester");
        shell.register_command(CommandSpec {
            id: OPEN_COMMAND_ID,
            name: "Open API Tester",
            action: CommandAction::RevealPanel(VIEW_TYPE_API_TESTER),
        });
    }

    pub fn run_command(&mut self, shell: &mut dyn Shell, command: &CommandSpec) -> Result<LeafId> {
        match command.action {
            CommandAction::RevealPanel(VIEW_TYPE_API_TESTER) => self.activate_view(shell),
            CommandAction::RevealPanel(other) => shell.reveal_panel(other),
        }
    }

    pub fn activate_view(&mut self, shell: &mut dyn Shell) -> Result<LeafId> {
        let leaf = shell.reveal_panel(VIEW_TYPE_API_TESTER)?;
        if self.panel.is_none() || self.leaf != Some(leaf) {
            self.panel = Some(RequestPanel::new(self.settings.settings()));
        }
        self.leaf = Some(leaf);
        Ok(leaf)
    }

    pub fn panel(&self) -> Option<&RequestPanel> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut RequestPanel> {
        self.panel.as_mut()
    }

    pub fn settings(&self) -> &SettingsStore<P> {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore<P> {
        &mut self.settings
    }

    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    pub async fn submit(&mut self) -> Result<()> {
        let panel = self.panel.as_mut().ok_or_else(|| anyhow!("panel is not open"))?;
        panel.submit(&self.client).await?;
        Ok(())
    }

    pub async fn save(&self) -> Result<PathBuf> {
        let panel = self.panel.as_ref().ok_or_else(|| anyhow!("panel is not open"))?;
        let path = panel.save(&self.vault_root, self.settings.settings()).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryPort;
    use crate::shell::Workspace;

    fn tester() -> Result<ApiTester<MemoryPort>> {
        Ok(ApiTester::new(
            SettingsStore::load(MemoryPort::default())?,
            std::env::temp_dir(),
        ))
    }

    #[test]
    fn on_load_registers_panel_and_command() -> Result<()> {
        let plugin = tester()?;
        let mut workspace = Workspace::new();
        plugin.on_load(&mut workspace);

        assert_eq!(
            workspace.display_text(VIEW_TYPE_API_TESTER),
            Some("API Tester")
        );
        assert_eq!(
            workspace.command(OPEN_COMMAND_ID).map(|c| c.name),
            Some("Open API Tester")
        );
        Ok(())
    }

    #[test]
    fn open_command_reuses_the_panel() -> Result<()> {
        let mut plugin = tester()?;
        let mut workspace = Workspace::new();
        plugin.on_load(&mut workspace);
        let command = workspace
            .command(OPEN_COMMAND_ID)
            .cloned()
            .expect("command registered");

        let first = plugin.run_command(&mut workspace, &command)?;
        plugin.panel_mut().unwrap().url = "https://example.com/kept".to_string();
        let second = plugin.run_command(&mut workspace, &command)?;

        assert_eq!(first, second);
        assert_eq!(workspace.leaves_of_type(VIEW_TYPE_API_TESTER).len(), 1);
        assert_eq!(plugin.panel().unwrap().url, "https://example.com/kept");
        Ok(())
    }

    #[tokio::test]
    async fn submit_requires_open_panel() -> Result<()> {
        let mut plugin = tester()?;
        assert!(plugin.submit().await.is_err());
        assert!(plugin.save().await.is_err());
        Ok(())
    }
}
