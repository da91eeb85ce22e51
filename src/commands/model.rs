//! Command model: typed entities and the polymorphic execute contract.
//!
//! A command carries exactly one execution variant, fixed at creation.
//! Executions return `Ok(None)` when there is nothing to speak; that is a
//! legitimate outcome, not an error. Script failures are contained here,
//! chat backend failures propagate to the caller.

use anyhow::Result;
use rand::seq::SliceRandom;
use tracing::{debug, error, warn};

use crate::chat::ChatBackend;
use crate::scripts::{ScriptParams, ScriptRegistry};

use super::registry::CommandRegistry;

/// Index of a command in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(pub(crate) usize);

/// Execution strategy of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Speaks a canned response chosen at random.
    Voice,
    /// Runs a named script from the script registry.
    Script,
    /// Forwards the utterance to the chat backend.
    ChatBackend,
}

/// A named, user-configured unit of voice-triggered behavior.
#[derive(Debug, Clone)]
pub struct Command {
    pub name: String,
    pub variant: Variant,
    /// Phrases that identify this command in spoken text.
    pub aliases: Vec<String>,
    /// Canned responses, used by the Voice variant only.
    pub responses: Vec<String>,
    /// Script identifier, derived from the command's own name at load time
    /// and validated against the script registry.
    pub script: Option<String>,
    /// Resolved during the registry's link phase; stays `None` when the
    /// referenced command does not exist.
    pub depends_on: Option<CommandId>,
    /// Keyword parameters handed to the script at execution time.
    pub params: ScriptParams,
}

/// Collaborators available to a command at execution time.
pub struct ExecContext<'a> {
    pub registry: &'a CommandRegistry,
    pub scripts: &'a ScriptRegistry,
    pub chat: &'a dyn ChatBackend,
}

impl Command {
    /// Execute the command with the residual utterance tokens.
    pub fn execute(&self, args: &[String], ctx: &ExecContext<'_>) -> Result<Option<String>> {
        match self.variant {
            Variant::Voice => Ok(self.pick_response()),
            Variant::Script => Ok(self.run_script(args, ctx)),
            Variant::ChatBackend => {
                let prompt = args.join(" ");
                debug!(command = %self.name, %prompt, "forwarding prompt to chat backend");
                let completion = ctx.chat.complete(&prompt)?;
                Ok(Some(completion))
            }
        }
    }

    /// The script identifier this command executes: the dependency target's
    /// identifier when linked, otherwise the command's own.
    pub fn script_ref<'a>(&'a self, registry: &'a CommandRegistry) -> Option<&'a str> {
        if let Some(dep) = self.depends_on {
            if let Some(target) = registry.get(dep) {
                return target.script.as_deref();
            }
        }
        self.script.as_deref()
    }

    fn pick_response(&self) -> Option<String> {
        let response = self.responses.choose(&mut rand::thread_rng());
        if response.is_none() {
            // Flagged at load time as well; an empty set is a
            // configuration error, not a reason to panic here.
            warn!(command = %self.name, "voice command has no responses configured");
        }
        response.cloned()
    }

    fn run_script(&self, args: &[String], ctx: &ExecContext<'_>) -> Option<String> {
        let Some(name) = self.script_ref(ctx.registry) else {
            error!(command = %self.name, "command has no script to execute");
            return None;
        };
        let Some(script) = ctx.scripts.get(name) else {
            error!(command = %self.name, script = %name, "script not found in registry");
            return None;
        };
        match script.run(args, &self.params) {
            Ok(result) => result,
            Err(e) => {
                error!(command = %self.name, script = %name, error = ?e, "error executing script");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatError;
    use crate::scripts::Script;
    use std::sync::Arc;

    struct FakeChat {
        reply: Option<String>,
    }

    impl ChatBackend for FakeChat {
        fn complete(&self, prompt: &str) -> Result<String, ChatError> {
            match &self.reply {
                Some(reply) => Ok(format!("{reply}: {prompt}")),
                None => Err(ChatError::EmptyResponse),
            }
        }
    }

    struct FailingScript;

    impl Script for FailingScript {
        fn run(&self, _args: &[String], _params: &ScriptParams) -> Result<Option<String>> {
            anyhow::bail!("boom")
        }
    }

    struct ParamsEcho;

    impl Script for ParamsEcho {
        fn run(&self, args: &[String], params: &ScriptParams) -> Result<Option<String>> {
            let suffix = params.get("suffix").and_then(|v| v.as_str()).unwrap_or("");
            Ok(Some(format!("{}{}", args.join(" "), suffix)))
        }
    }

    fn command(name: &str, variant: Variant) -> Command {
        Command {
            name: name.to_string(),
            variant,
            aliases: vec![],
            responses: vec![],
            script: None,
            depends_on: None,
            params: ScriptParams::new(),
        }
    }

    fn ctx<'a>(
        registry: &'a CommandRegistry,
        scripts: &'a ScriptRegistry,
        chat: &'a dyn ChatBackend,
    ) -> ExecContext<'a> {
        ExecContext {
            registry,
            scripts,
            chat,
        }
    }

    #[test]
    fn test_voice_single_response_is_deterministic() {
        let registry = CommandRegistry::new();
        let scripts = ScriptRegistry::new();
        let chat = FakeChat { reply: None };

        let mut cmd = command("greet", Variant::Voice);
        cmd.responses = vec!["hello there".to_string()];

        for _ in 0..10 {
            let result = cmd.execute(&[], &ctx(&registry, &scripts, &chat)).unwrap();
            assert_eq!(result, Some("hello there".to_string()));
        }
    }

    #[test]
    fn test_voice_draws_from_responses() {
        let registry = CommandRegistry::new();
        let scripts = ScriptRegistry::new();
        let chat = FakeChat { reply: None };

        let mut cmd = command("greet", Variant::Voice);
        cmd.responses = vec!["hi".to_string(), "hey".to_string(), "hello".to_string()];

        for _ in 0..20 {
            let result = cmd
                .execute(&[], &ctx(&registry, &scripts, &chat))
                .unwrap()
                .unwrap();
            assert!(cmd.responses.contains(&result));
        }
    }

    #[test]
    fn test_voice_empty_responses_yields_nothing() {
        let registry = CommandRegistry::new();
        let scripts = ScriptRegistry::new();
        let chat = FakeChat { reply: None };

        let cmd = command("greet", Variant::Voice);
        let result = cmd.execute(&[], &ctx(&registry, &scripts, &chat)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_script_failure_is_contained() {
        let registry = CommandRegistry::new();
        let mut scripts = ScriptRegistry::new();
        scripts.register("broken", Arc::new(FailingScript));
        let chat = FakeChat { reply: None };

        let mut cmd = command("broken", Variant::Script);
        cmd.script = Some("broken".to_string());

        let result = cmd.execute(&[], &ctx(&registry, &scripts, &chat)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_script_missing_from_registry_yields_nothing() {
        let registry = CommandRegistry::new();
        let scripts = ScriptRegistry::new();
        let chat = FakeChat { reply: None };

        let mut cmd = command("ghost", Variant::Script);
        cmd.script = Some("ghost".to_string());

        let result = cmd.execute(&[], &ctx(&registry, &scripts, &chat)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_script_receives_args_and_params() {
        let registry = CommandRegistry::new();
        let mut scripts = ScriptRegistry::new();
        scripts.register("echo", Arc::new(ParamsEcho));
        let chat = FakeChat { reply: None };

        let mut cmd = command("echo", Variant::Script);
        cmd.script = Some("echo".to_string());
        cmd.params
            .insert("suffix".to_string(), serde_json::json!("!"));

        let args = vec!["in".to_string(), "paris".to_string()];
        let result = cmd.execute(&args, &ctx(&registry, &scripts, &chat)).unwrap();
        assert_eq!(result, Some("in paris!".to_string()));
    }

    #[test]
    fn test_dependency_script_is_preferred() {
        let mut registry = CommandRegistry::new();
        let mut scripts = ScriptRegistry::new();
        scripts.register("target", Arc::new(ParamsEcho));
        let chat = FakeChat { reply: None };

        let mut target = command("target", Variant::Script);
        target.script = Some("target".to_string());
        let target_id = registry.insert(target);

        let mut dependent = command("dependent", Variant::Script);
        dependent.script = Some("own-script".to_string());
        dependent.depends_on = Some(target_id);

        assert_eq!(dependent.script_ref(&registry), Some("target"));

        let args = vec!["hi".to_string()];
        let result = dependent
            .execute(&args, &ctx(&registry, &scripts, &chat))
            .unwrap();
        assert_eq!(result, Some("hi".to_string()));
    }

    #[test]
    fn test_chat_failure_propagates() {
        let registry = CommandRegistry::new();
        let scripts = ScriptRegistry::new();
        let chat = FakeChat { reply: None };

        let cmd = command("chat", Variant::ChatBackend);
        let args = vec!["hello".to_string()];
        let result = cmd.execute(&args, &ctx(&registry, &scripts, &chat));
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_joins_arguments_into_prompt() {
        let registry = CommandRegistry::new();
        let scripts = ScriptRegistry::new();
        let chat = FakeChat {
            reply: Some("echo".to_string()),
        };

        let cmd = command("chat", Variant::ChatBackend);
        let args = vec!["what".to_string(), "time".to_string(), "is".to_string()];
        let result = cmd.execute(&args, &ctx(&registry, &scripts, &chat)).unwrap();
        assert_eq!(result, Some("echo: what time is".to_string()));
    }
}
