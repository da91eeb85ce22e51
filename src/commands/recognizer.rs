//! Alias recognition over free-form transcript text.
//!
//! Every `(command, alias)` pair is scored with a partial ratio; the first
//! pair to reach the strictly highest score wins, and the match is accepted
//! only when that score clears the configured threshold.

use tracing::debug;

use super::registry::AliasIndex;

/// Outcome of matching an utterance against the alias index.
///
/// An unrecognized utterance carries an empty command name, an empty
/// argument list, and a zero score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recognition {
    pub command: String,
    /// Similarity score of the accepted match, 0..=100.
    pub score: u32,
    /// Residual tokens after removing the matched alias.
    pub arguments: Vec<String>,
}

impl Recognition {
    pub fn is_recognized(&self) -> bool {
        !self.command.is_empty()
    }
}

/// Maps recognized speech text to the best-matching command.
///
/// Pure over its inputs: no registry mutation, no state between calls
/// beyond the configured threshold and strip lists.
#[derive(Debug, Clone)]
pub struct Recognizer {
    threshold: u32,
    wake_aliases: Vec<String>,
    filler_words: Vec<String>,
}

impl Recognizer {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            wake_aliases: Vec::new(),
            filler_words: Vec::new(),
        }
    }

    /// Configure the wake-alias and filler-word strip lists.
    pub fn with_strippable(mut self, wake_aliases: Vec<String>, filler_words: Vec<String>) -> Self {
        self.wake_aliases = wake_aliases;
        self.filler_words = filler_words;
        self
    }

    /// Strip configured wake aliases and filler words from the raw text.
    ///
    /// Both lists default to empty, making this a pass-through.
    pub fn clean(&self, input: &str) -> String {
        let mut text = input.to_string();
        for token in self.wake_aliases.iter().chain(&self.filler_words) {
            text = text.replace(token.as_str(), "").trim().to_string();
        }
        text
    }

    /// Find the best-matching command for the utterance.
    ///
    /// Only a strictly higher score displaces the current best, so ties
    /// keep the first pair in alias-index order. A best score at or below
    /// the threshold yields an unrecognized result.
    pub fn detect(&self, input: &str, aliases: &AliasIndex) -> Recognition {
        let mut best_score = 0;
        let mut best: Option<(&str, &str)> = None;

        for (name, alias) in aliases.iter() {
            let score = partial_ratio(input, alias);
            if score > best_score {
                best_score = score;
                best = Some((name, alias));
            }
        }

        let Some((name, alias)) = best else {
            return Recognition::default();
        };

        if best_score <= self.threshold {
            debug!(
                closest = %name,
                score = best_score,
                threshold = self.threshold,
                "no command above threshold"
            );
            return Recognition::default();
        }

        let remainder = input.replacen(alias, "", 1);
        let arguments = remainder
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Recognition {
            command: name.to_string(),
            score: best_score,
            arguments,
        }
    }
}

/// Approximate substring similarity in 0..=100.
///
/// Best normalized Levenshtein similarity between the shorter string and
/// any equal-length character window of the longer one, so extra words and
/// minor transcription noise on either side do not sink the score.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    if short.is_empty() {
        return if long.is_empty() { 100 } else { 0 };
    }

    let short_str: String = short.iter().collect();
    let mut best = 0.0f64;
    for window in long.windows(short.len()) {
        let window_str: String = window.iter().collect();
        let score = strsim::normalized_levenshtein(&short_str, &window_str);
        if score > best {
            best = score;
        }
        if best >= 1.0 {
            break;
        }
    }

    (best * 100.0).round() as u32
}
