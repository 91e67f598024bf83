//! Runs the browser with redirection attached.

use std::process::Stdio;

use anyhow::Context;
use browserlog_console_log::{Browser, BrowserLogRedirect, LaunchOptions, RedirectConfig};

use crate::cli::Cli;

/// Launches the browser and waits for it to exit or for Ctrl-C.
///
/// Returns the browser's exit code.
pub async fn run(cli: Cli, config: RedirectConfig) -> anyhow::Result<i32> {
    let redirect = BrowserLogRedirect::new(config);
    let browser = Browser::new(cli.browser_name, cli.family);
    let launched = redirect.launch(&browser, LaunchOptions::new(cli.args));

    let mut child = tokio::process::Command::new(&cli.executable)
        .args(&launched.options.args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to start {}", cli.executable.display()))?;
    tracing::info!(
        executable = %cli.executable.display(),
        pid = ?child.id(),
        port = ?launched.session.as_ref().map(|s| s.port()),
        "browser started"
    );

    let code = tokio::select! {
        status = child.wait() => {
            let status = status.context("failed to wait for browser")?;
            tracing::info!(%status, "browser exited");
            status.code().unwrap_or(1)
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, stopping browser");
            child.kill().await.context("failed to stop browser")?;
            130
        }
    };

    if let Some(session) = launched.session {
        session.abort();
    }
    Ok(code)
}
