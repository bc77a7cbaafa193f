//! Minimal host shell: panels that can be revealed and commands that can be
//! invoked by id.

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    RevealPanel(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub action: CommandAction,
}

pub trait Shell {
    fn register_panel(&mut self, view_type: &'static str, display_text: &'static str);
    /// Focuses the open leaf for `view_type`, opening one if none exists.
    fn reveal_panel(&mut self, view_type: &str) -> Result<LeafId>;
    fn register_command(&mut self, command: CommandSpec);
}

#[derive(Debug, Clone)]
struct PanelType {
    view_type: &'static str,
    display_text: &'static str,
}

#[derive(Debug, Clone)]
struct Leaf {
    id: LeafId,
    view_type: &'static str,
}

#[derive(Debug, Default)]
pub struct Workspace {
    panel_types: Vec<PanelType>,
    leaves: Vec<Leaf>,
    commands: Vec<CommandSpec>,
    active: Option<LeafId>,
    next_leaf: usize,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn command(&self, id: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|command| command.id == id)
    }

    pub fn leaves_of_type(&self, view_type: &str) -> Vec<LeafId> {
        self.leaves
            .iter()
            .filter(|leaf| leaf.view_type == view_type)
            .map(|leaf| leaf.id)
            .collect()
    }

    pub fn active_leaf(&self) -> Option<LeafId> {
        self.active
    }

    pub fn display_text(&self, view_type: &str) -> Option<&'static str> {
        self.panel_types
            .iter()
            .find(|panel| panel.view_type == view_type)
            .map(|panel| panel.display_text)
    }
}

impl Shell for Workspace {
    fn register_panel(&mut self, view_type: &'static str, display_text: &'static str) {
        if self.display_text(view_type).is_none() {
            self.panel_types.push(PanelType {
                view_type,
                display_text,
            });
        }
    }

    fn reveal_panel(&mut self, view_type: &str) -> Result<LeafId> {
        let Some(registered) = self
            .panel_types
            .iter()
            .find(|panel| panel.view_type == view_type)
            .map(|panel| panel.view_type)
        else {
            bail!("No panel registered for {view_type}");
        };

        let id = match self.leaves_of_type(view_type).first() {
            Some(existing) => *existing,
            None => {
                let id = LeafId(self.next_leaf);
                self.next_leaf += 1;
                self.leaves.push(Leaf {
                    id,
                    view_type: registered,
                });
                tracing::debug!(view_type, "opened panel");
                id
            }
        };
        self.active = Some(id);
        Ok(id)
    }

    fn register_command(&mut self, command: CommandSpec) {
        self.commands.retain(|existing| existing.id != command.id);
        self.commands.push(command);
    }
}
