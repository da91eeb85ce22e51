//! Built-in scripts compiled into the daemon.

use anyhow::{Context, Result};
use chrono::Timelike;
use tracing::info;

use super::{Script, ScriptParams};

/// Speaks the current wall-clock time.
pub struct CurrentTime;

impl Script for CurrentTime {
    fn run(&self, _args: &[String], _params: &ScriptParams) -> Result<Option<String>> {
        let now = chrono::Local::now();
        Ok(Some(format!("{} {:02}", now.hour(), now.minute())))
    }
}

/// Opens a browser with an optional `url` parameter.
///
/// The browser program comes from the `browser` parameter or the
/// `VESPER_BROWSER` environment variable. Pure side effect, no spoken
/// result.
pub struct OpenBrowser;

impl Script for OpenBrowser {
    fn run(&self, _args: &[String], params: &ScriptParams) -> Result<Option<String>> {
        let browser = params
            .get("browser")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| std::env::var("VESPER_BROWSER").ok())
            .context("no browser configured")?;

        let url = params
            .get("url")
            .and_then(|v| v.as_str())
            .unwrap_or("https://www.google.com");

        info!(%browser, %url, "opening browser");
        std::process::Command::new(&browser)
            .arg(url)
            .spawn()
            .with_context(|| format!("failed to launch browser {browser}"))?;

        Ok(None)
    }
}
