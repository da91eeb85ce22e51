//! Command loading from declarative JSON documents.
//!
//! Documents named `config.json` are discovered recursively under the
//! commands directory. Each document holds a list of command records; a
//! malformed document is logged and skipped without aborting the load.
//! Dependencies are linked in a single pass once every document has been
//! read.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::scripts::{ScriptParams, ScriptRegistry};

use super::model::{Command, CommandId, Variant};
use super::registry::{AliasIndex, CommandRegistry};

/// The `action` field of a command record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Voice,
    Script,
    ChatBackend,
}

impl From<Action> for Variant {
    fn from(action: Action) -> Self {
        match action {
            Action::Voice => Variant::Voice,
            Action::Script => Variant::Script,
            Action::ChatBackend => Variant::ChatBackend,
        }
    }
}

/// One command record as written in a document.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRecord {
    pub name: String,
    pub action: Action,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub responses: Vec<String>,
    #[serde(default)]
    pub depends_on: Option<String>,
    #[serde(default)]
    pub params: ScriptParams,
}

/// A whole configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandDocument {
    pub commands: Vec<CommandRecord>,
}

/// Turns declarative command documents into a fully linked registry.
pub struct Loader<'a> {
    scripts: &'a ScriptRegistry,
}

impl<'a> Loader<'a> {
    pub fn new(scripts: &'a ScriptRegistry) -> Self {
        Self { scripts }
    }

    /// Load every document under `dir` and produce the linked registry and
    /// its alias index.
    ///
    /// Documents are processed in sorted path order, so repeated loads of
    /// the same tree produce identical registries.
    pub fn load_dir(&self, dir: &Path) -> Result<(CommandRegistry, AliasIndex)> {
        let pattern = dir.join("**").join("config.json");
        let pattern = pattern
            .to_str()
            .context("commands directory path is not valid UTF-8")?;

        let mut paths: Vec<_> = glob::glob(pattern)
            .context("invalid command document pattern")?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(?e, "unreadable path during command discovery");
                    None
                }
            })
            .collect();
        paths.sort();

        let mut registry = CommandRegistry::new();
        let mut pending = Vec::new();

        for path in paths {
            info!(path = %path.display(), "reading command document");
            let contents = match std::fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    error!(path = %path.display(), ?e, "failed to read command document");
                    continue;
                }
            };
            match serde_json::from_str::<CommandDocument>(&contents) {
                Ok(document) => self.add_document(document, &mut registry, &mut pending),
                Err(e) => {
                    error!(path = %path.display(), %e, "failed to parse command document");
                }
            }
        }

        registry.link_dependencies(&pending);
        let aliases = registry.alias_index();
        info!(
            commands = registry.len(),
            aliases = aliases.len(),
            "command registry loaded"
        );

        Ok((registry, aliases))
    }

    /// Add one parsed document's records to the registry.
    pub fn add_document(
        &self,
        document: CommandDocument,
        registry: &mut CommandRegistry,
        pending: &mut Vec<(CommandId, String)>,
    ) {
        for record in document.commands {
            if record.name.is_empty() {
                error!("command record with empty name skipped");
                continue;
            }

            let depends_on = record.depends_on.clone();
            let command = self.build_command(record);
            let id = registry.insert(command);

            // A replaced definition's dependency must not leak onto the
            // replacement.
            pending.retain(|(pid, _)| *pid != id);
            if let Some(target) = depends_on.filter(|t| !t.is_empty()) {
                pending.push((id, target));
            }
        }
    }

    /// Factory keyed by the record's action tag.
    fn build_command(&self, record: CommandRecord) -> Command {
        let variant = Variant::from(record.action);

        // Script identifiers come from the command's own name, never from
        // document content.
        let script = match variant {
            Variant::Script => {
                if self.scripts.contains(&record.name) {
                    Some(record.name.clone())
                } else {
                    // A dependent command borrows its target's script; only
                    // a standalone script command without one is a problem.
                    if record.depends_on.is_none() {
                        error!(command = %record.name, "no registered script for command");
                    }
                    None
                }
            }
            _ => None,
        };

        if variant == Variant::Voice && record.responses.is_empty() {
            warn!(command = %record.name, "voice command has no responses");
        }

        Command {
            name: record.name,
            variant,
            aliases: record.aliases,
            responses: record.responses,
            script,
            depends_on: None,
            params: record.params,
        }
    }
}
