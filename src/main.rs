//! vesper-daemon: Background daemon for a voice-controlled command dispatcher
//!
//! Turns recognized speech text into command executions:
//! - Declarative command documents loaded into an immutable registry
//! - Fuzzy alias recognition with a confidence threshold
//! - Voice, script, and chat-backend execution variants
//! - Speech output through an injected synthesizer handle
//!
//! Audio capture and speech-to-text decoding live in external
//! collaborators; a stdin transcript source stands in for them during
//! development.

mod chat;
mod commands;
mod config;
mod lifecycle;
mod scripts;
mod session;
mod speech;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::chat::OpenAiClient;
use crate::commands::{Dispatcher, Loader, Recognizer};
use crate::config::Config;
use crate::scripts::ScriptRegistry;
use crate::session::Session;
use crate::speech::{ConsoleSpeech, SpeechOutput, SubprocessSpeech};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "vesper-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    info!(
        ?config.commands_dir,
        threshold = config.recognition_threshold,
        "configuration loaded"
    );

    // Build the script registry and load the command documents. The
    // registry is immutable from here on.
    let scripts = Arc::new(ScriptRegistry::with_builtins());
    let loader = Loader::new(&scripts);
    let (registry, aliases) = loader.load_dir(&config.commands_dir)?;
    let registry = Arc::new(registry);

    // Collaborators are constructed once and handed in explicitly.
    let chat = Arc::new(OpenAiClient::new(config.chat.clone()));
    let speech: Arc<dyn SpeechOutput> = match &config.speech_program {
        Some(program) => Arc::new(SubprocessSpeech::new(program)),
        None => Arc::new(ConsoleSpeech),
    };

    let recognizer = Recognizer::new(config.recognition_threshold)
        .with_strippable(config.wake_aliases.clone(), config.filler_words.clone());
    let dispatcher = Dispatcher::new(
        Arc::clone(&registry),
        Arc::clone(&scripts),
        chat,
        speech,
        config.default_command.clone(),
    );
    let session = Session::new(recognizer, aliases, dispatcher);

    // Transcript source -> session loop
    let (transcript_tx, transcript_rx) = mpsc::channel(32);
    let transcripts = speech::stdin_transcripts(transcript_tx);

    info!("daemon initialized, entering session loop");

    tokio::select! {
        // Run the session loop (processes one utterance at a time)
        _ = session.run(transcript_rx) => {
            info!("session loop exited");
        }

        // Wait for shutdown signal
        result = lifecycle::wait_for_shutdown() => {
            if let Err(e) = result {
                error!(?e, "signal handler error");
            }
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");
    transcripts.abort();

    info!("vesper-daemon stopped");

    Ok(())
}
