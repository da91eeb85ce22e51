//! Command registry: arena storage, name lookup, dependency linking.
//!
//! Commands live in an index-addressed arena and are immutable once the
//! single link pass has run. Dependencies resolve to `CommandId` indices,
//! never to live references.

use std::collections::HashMap;

use tracing::{error, warn};

use super::model::{Command, CommandId};

/// Flattened, ordered `(command_name, alias)` pairs across the registry.
///
/// Rebuilt once per load and read-only afterwards. Iteration order is the
/// registry's insertion order, which keeps recognition tie-breaks stable.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    entries: Vec<(String, String)>,
}

impl AliasIndex {
    /// Iterate `(command_name, alias)` pairs in build order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The finalized `name -> Command` mapping, backed by an arena.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    by_name: HashMap<String, CommandId>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a command.
    ///
    /// A name collision replaces the earlier definition in place (last
    /// write wins) so that stale aliases cannot linger; the collision is
    /// logged.
    pub fn insert(&mut self, command: Command) -> CommandId {
        if let Some(&id) = self.by_name.get(&command.name) {
            warn!(command = %command.name, "duplicate command name, replacing earlier definition");
            self.commands[id.0] = command;
            return id;
        }

        let id = CommandId(self.commands.len());
        self.by_name.insert(command.name.clone(), id);
        self.commands.push(command);
        id
    }

    pub fn get(&self, id: CommandId) -> Option<&Command> {
        self.commands.get(id.0)
    }

    /// Look up a command by its exact name.
    pub fn find(&self, name: &str) -> Option<&Command> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    pub fn find_id(&self, name: &str) -> Option<CommandId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    /// Single link pass run after all documents have loaded.
    ///
    /// Names that do not resolve are logged and the dependency stays
    /// unset; the command itself remains usable.
    pub fn link_dependencies(&mut self, pending: &[(CommandId, String)]) {
        for (id, target) in pending {
            match self.by_name.get(target).copied() {
                Some(target_id) => {
                    self.commands[id.0].depends_on = Some(target_id);
                }
                None => {
                    error!(
                        command = %self.commands[id.0].name,
                        depends_on = %target,
                        "dependency does not exist"
                    );
                }
            }
        }
    }

    /// Build the derived alias index in registry order.
    pub fn alias_index(&self) -> AliasIndex {
        let entries = self
            .commands
            .iter()
            .flat_map(|c| {
                c.aliases
                    .iter()
                    .map(move |a| (c.name.clone(), a.clone()))
            })
            .collect();
        AliasIndex { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::model::Variant;
    use crate::scripts::ScriptParams;

    fn command(name: &str, aliases: &[&str]) -> Command {
        Command {
            name: name.to_string(),
            variant: Variant::Voice,
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            responses: vec!["ok".to_string()],
            script: None,
            depends_on: None,
            params: ScriptParams::new(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let mut registry = CommandRegistry::new();
        let id = registry.insert(command("greet", &["hello"]));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).unwrap().name, "greet");
        assert_eq!(registry.find("greet").unwrap().name, "greet");
        assert!(registry.find("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let mut registry = CommandRegistry::new();
        let first = registry.insert(command("greet", &["hello"]));
        let second = registry.insert(command("greet", &["good morning"]));

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.find("greet").unwrap().aliases,
            vec!["good morning".to_string()]
        );

        // The replaced definition's aliases are gone from the index too.
        let index = registry.alias_index();
        let aliases: Vec<_> = index.iter().map(|(_, a)| a.to_string()).collect();
        assert_eq!(aliases, vec!["good morning".to_string()]);
    }

    #[test]
    fn test_link_resolves_existing_dependency() {
        let mut registry = CommandRegistry::new();
        let target = registry.insert(command("target", &[]));
        let dependent = registry.insert(command("dependent", &[]));

        registry.link_dependencies(&[(dependent, "target".to_string())]);

        assert_eq!(registry.get(dependent).unwrap().depends_on, Some(target));
    }

    #[test]
    fn test_link_missing_dependency_stays_unset() {
        let mut registry = CommandRegistry::new();
        let dependent = registry.insert(command("dependent", &[]));

        registry.link_dependencies(&[(dependent, "ghost".to_string())]);

        // Command still present and usable, dependency inert.
        assert!(registry.find("dependent").is_some());
        assert_eq!(registry.get(dependent).unwrap().depends_on, None);
    }

    #[test]
    fn test_alias_index_preserves_insertion_order() {
        let mut registry = CommandRegistry::new();
        registry.insert(command("weather", &["weather", "forecast"]));
        registry.insert(command("time", &["what time"]));

        let index = registry.alias_index();
        let pairs: Vec<_> = index
            .iter()
            .map(|(n, a)| (n.to_string(), a.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("weather".to_string(), "weather".to_string()),
                ("weather".to_string(), "forecast".to_string()),
                ("time".to_string(), "what time".to_string()),
            ]
        );
    }
}
