//! Configuration loading and management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Daemon configuration, read from the environment with defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory searched recursively for command documents.
    pub commands_dir: PathBuf,

    /// Minimum similarity score a match must strictly exceed.
    pub recognition_threshold: u32,

    /// Assistant-name tokens stripped before recognition (default empty).
    pub wake_aliases: Vec<String>,

    /// Filler tokens stripped before recognition (default empty).
    pub filler_words: Vec<String>,

    /// Registry name of the catch-all chat command.
    pub default_command: String,

    /// Synthesizer program for speech output; results are logged when
    /// unset.
    pub speech_program: Option<PathBuf>,

    pub chat: ChatConfig,
}

/// Chat backend settings.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Client-side request timeout, so a slow backend cannot stall the
    /// session loop indefinitely.
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from environment and defaults.
    pub fn load() -> Result<Self> {
        let commands_dir = PathBuf::from(env_or("VESPER_COMMANDS_DIR", "commands"));

        let recognition_threshold = match std::env::var("VESPER_RECOGNITION_THRESHOLD") {
            Ok(value) => value
                .parse()
                .context("VESPER_RECOGNITION_THRESHOLD must be an integer")?,
            Err(_) => 75,
        };

        let timeout_secs = match std::env::var("VESPER_CHAT_TIMEOUT_SECS") {
            Ok(value) => value
                .parse()
                .context("VESPER_CHAT_TIMEOUT_SECS must be an integer")?,
            Err(_) => 30,
        };

        let chat = ChatConfig {
            base_url: env_or("VESPER_CHAT_BASE_URL", "https://api.openai.com/v1"),
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: env_or("VESPER_CHAT_MODEL", "gpt-4o-mini"),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            commands_dir,
            recognition_threshold,
            wake_aliases: env_list("VESPER_WAKE_ALIASES"),
            filler_words: env_list("VESPER_FILLER_WORDS"),
            default_command: env_or("VESPER_DEFAULT_COMMAND", "chat"),
            speech_program: std::env::var("VESPER_SPEECH_PROGRAM")
                .ok()
                .map(PathBuf::from),
            chat,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Comma-separated list; unset or empty means an empty list.
fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
