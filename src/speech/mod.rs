//! Speech collaborators
//!
//! The core only knows two contracts: utterance strings come in, and
//! `speak` turns a textual result into audio. Synthesis and recognition
//! internals live outside the daemon; a stdin transcript source stands in
//! for the recognizer during development.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Speech-output collaborator: blocks until playback completes.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str) -> Result<()>;
}

/// Logs the text instead of synthesizing it.
///
/// Used when no synthesizer program is configured.
pub struct ConsoleSpeech;

impl SpeechOutput for ConsoleSpeech {
    fn speak(&self, text: &str) -> Result<()> {
        info!(%text, "speak");
        Ok(())
    }
}

/// Shells out to a synthesizer program (`say`, `espeak`, ...) with the
/// text as its argument.
pub struct SubprocessSpeech {
    program: PathBuf,
}

impl SubprocessSpeech {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_owned(),
        }
    }
}

impl SpeechOutput for SubprocessSpeech {
    fn speak(&self, text: &str) -> Result<()> {
        let status = std::process::Command::new(&self.program)
            .arg(text)
            .status()
            .with_context(|| format!("failed to run synthesizer {}", self.program.display()))?;

        if !status.success() {
            bail!("synthesizer exited with {status}");
        }
        Ok(())
    }
}

/// Feed stdin lines into the session channel.
///
/// Development stand-in for the external streaming recognizer; empty lines
/// are dropped, and the task ends when stdin closes or the receiver is
/// gone.
pub fn stdin_transcripts(tx: mpsc::Sender<String>) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(?e, "error reading transcript line");
                    break;
                }
            }
        }
        info!("transcript source closed");
    })
}
