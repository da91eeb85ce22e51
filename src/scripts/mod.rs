//! Script capability registry
//!
//! Script commands resolve to named callables compiled into the binary.
//! Identifiers are validated when the command documents load; nothing is
//! ever imported from disk at runtime.

mod builtin;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

/// Keyword parameters handed to a script, taken verbatim from the
/// command document's `params` map.
pub type ScriptParams = serde_json::Map<String, serde_json::Value>;

/// A unit of executable command logic.
///
/// `args` are the residual tokens extracted from the utterance, `params`
/// the owning command's configured parameters. Returning `Ok(None)` is a
/// legitimate outcome for side-effect-only scripts.
pub trait Script: Send + Sync {
    fn run(&self, args: &[String], params: &ScriptParams) -> Result<Option<String>>;
}

/// Registry of named scripts.
///
/// Commands reference scripts by identifier; the loader checks the
/// identifier exists here before a command is allowed to carry it.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: HashMap<String, Arc<dyn Script>>,
}

impl ScriptRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in scripts.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("current_time", Arc::new(builtin::CurrentTime));
        registry.register("open_browser", Arc::new(builtin::OpenBrowser));
        registry
    }

    /// Register a script under the given identifier.
    pub fn register(&mut self, name: impl Into<String>, script: Arc<dyn Script>) {
        let name = name.into();
        debug!(script = %name, "script registered");
        self.scripts.insert(name, script);
    }

    /// Check whether an identifier names a registered script.
    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// Look up a script by identifier.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Script>> {
        self.scripts.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Script for Echo {
        fn run(&self, args: &[String], _params: &ScriptParams) -> Result<Option<String>> {
            Ok(Some(args.join(" ")))
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ScriptRegistry::new();
        registry.register("echo", Arc::new(Echo));

        assert!(registry.contains("echo"));
        assert!(!registry.contains("missing"));

        let script = registry.get("echo").unwrap();
        let args = vec!["hello".to_string(), "there".to_string()];
        let result = script.run(&args, &ScriptParams::new()).unwrap();
        assert_eq!(result, Some("hello there".to_string()));
    }

    #[test]
    fn test_builtins_present() {
        let registry = ScriptRegistry::with_builtins();
        assert!(registry.contains("current_time"));
        assert!(registry.contains("open_browser"));
    }
}
