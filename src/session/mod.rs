//! Session loop: transcripts in, recognition and dispatch out
//!
//! Thin glue between the external recognizer and the command pipeline.
//! Utterances are handled one at a time, to completion, on the task that
//! received them; a failed or missed command never ends the session.

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::commands::{AliasIndex, DispatchOutcome, Dispatcher, Recognizer};

pub struct Session {
    recognizer: Recognizer,
    aliases: AliasIndex,
    dispatcher: Dispatcher,
}

impl Session {
    pub fn new(recognizer: Recognizer, aliases: AliasIndex, dispatcher: Dispatcher) -> Self {
        Self {
            recognizer,
            aliases,
            dispatcher,
        }
    }

    /// Process utterances until the transcript channel closes.
    pub async fn run(&self, mut transcript_rx: mpsc::Receiver<String>) {
        info!("session loop started");

        while let Some(utterance) = transcript_rx.recv().await {
            self.handle_utterance(&utterance);
        }

        info!("session loop stopped");
    }

    /// Recognize and dispatch a single utterance.
    pub fn handle_utterance(&self, utterance: &str) {
        let text = self.recognizer.clean(utterance);
        let recognition = self.recognizer.detect(&text, &self.aliases);

        if !recognition.is_recognized() {
            warn!(%utterance, "command not recognized");
            return;
        }

        info!(
            command = %recognition.command,
            score = recognition.score,
            "command recognized"
        );

        match self
            .dispatcher
            .dispatch(&recognition.command, &recognition.arguments)
        {
            Ok(DispatchOutcome::Spoken) => {}
            Ok(DispatchOutcome::NoAction) => {
                info!(command = %recognition.command, "no action taken");
            }
            // No retry policy: a failed chat request is logged and dropped.
            Err(e) => {
                error!(command = %recognition.command, error = ?e, "command execution failed");
            }
        }
    }
}
