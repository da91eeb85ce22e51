//! Command dispatch: registry lookup, fallback, execution, speech relay.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::chat::ChatBackend;
use crate::scripts::ScriptRegistry;
use crate::speech::SpeechOutput;

use super::model::ExecContext;
use super::registry::CommandRegistry;

/// What a dispatch produced, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The command produced text and it was spoken.
    Spoken,
    /// The command ran (or was missing) and there is nothing to speak.
    NoAction,
}

/// Executes recognized commands and relays textual results to the
/// speech-output collaborator.
///
/// Holds no mutable state of its own; the registry is immutable after
/// load, so a dispatcher can be reused across utterances.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    scripts: Arc<ScriptRegistry>,
    chat: Arc<dyn ChatBackend>,
    speech: Arc<dyn SpeechOutput>,
    default_command: String,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        scripts: Arc<ScriptRegistry>,
        chat: Arc<dyn ChatBackend>,
        speech: Arc<dyn SpeechOutput>,
        default_command: String,
    ) -> Self {
        Self {
            registry,
            scripts,
            chat,
            speech,
            default_command,
        }
    }

    /// Execute the named command, falling back to the default chat command
    /// when the name is not registered.
    ///
    /// Chat backend failures propagate; everything else resolves to
    /// `NoAction` at worst.
    pub fn dispatch(&self, name: &str, arguments: &[String]) -> Result<DispatchOutcome> {
        let command = match self.registry.find(name) {
            Some(command) => command,
            None => {
                warn!(
                    command = %name,
                    fallback = %self.default_command,
                    "command not registered, using default"
                );
                match self.registry.find(&self.default_command) {
                    Some(command) => command,
                    None => {
                        error!(
                            fallback = %self.default_command,
                            "default command not registered, nothing to do"
                        );
                        return Ok(DispatchOutcome::NoAction);
                    }
                }
            }
        };

        let ctx = ExecContext {
            registry: &self.registry,
            scripts: &self.scripts,
            chat: self.chat.as_ref(),
        };

        match command.execute(arguments, &ctx)? {
            Some(text) if !text.is_empty() => {
                info!(command = %command.name, "speaking response");
                self.speech.speak(&text)?;
                Ok(DispatchOutcome::Spoken)
            }
            _ => {
                debug!(command = %command.name, "command produced no response");
                Ok(DispatchOutcome::NoAction)
            }
        }
    }
}
