//! Configuration loading.
//!
//! Values come from an optional TOML file, then the environment
//! (`REDIRECT_BROWSER_LOG`, `BROWSER_CONNECT_TIMEOUT`, `DEBUG`), then the
//! command line.

use std::path::Path;

use anyhow::Context;
use browserlog_console_log::RedirectConfig;

use crate::cli::Cli;

/// Reads `path` if given, otherwise starts from defaults.
pub fn load_file(path: Option<&Path>) -> anyhow::Result<RedirectConfig> {
    let Some(path) = path else {
        return Ok(RedirectConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: RedirectConfig =
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "configuration file loaded");
    Ok(config)
}

/// Resolves the final configuration for this run.
pub fn resolve<F>(cli: &Cli, lookup: F) -> anyhow::Result<RedirectConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = load_file(cli.config.as_deref())?;
    config.apply_overrides(lookup)?;

    if cli.enable {
        config.enabled = true;
    }
    if !cli.events.is_empty() {
        config.events_to_log = cli.events.clone();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use browserlog_protocol::EventName;
    use clap::Parser;

    fn cli(extra: &[&str]) -> Cli {
        let mut argv = vec!["browserlog"];
        argv.extend_from_slice(extra);
        argv.push("chrome");
        Cli::try_parse_from(argv).unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_file() {
        let config = resolve(&cli(&[]), no_env).unwrap();
        assert_eq!(config, RedirectConfig::default());
    }

    #[test]
    fn file_then_env_then_cli() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("browserlog.toml");
        std::fs::write(
            &path,
            r#"
enabled = "true"
connect_timeout_ms = 2000
events_to_log = ["error", "warn"]
"#,
        )
        .unwrap();
        let path = path.to_string_lossy().into_owned();

        let config = resolve(&cli(&["--config", path.as_str()]), no_env).unwrap();
        assert!(config.enabled);
        assert_eq!(config.connect_timeout_ms, 2000);
        assert_eq!(config.events_to_log, vec![EventName::Error, EventName::Warn]);

        let env = |key: &str| match key {
            "REDIRECT_BROWSER_LOG" => Some("false".to_string()),
            "BROWSER_CONNECT_TIMEOUT" => Some("700".to_string()),
            _ => None,
        };
        let config = resolve(&cli(&["--config", path.as_str()]), env).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.connect_timeout_ms, 700);

        let config = resolve(&cli(&["--config", path.as_str(), "--enable", "--events", "log"]), env).unwrap();
        assert!(config.enabled);
        assert_eq!(config.events_to_log, vec![EventName::Log]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/browserlog.toml")),
            ..cli(&[])
        };
        assert!(resolve(&cli, no_env).is_err());
    }

    #[test]
    fn invalid_env_timeout_is_an_error() {
        let env = |key: &str| (key == "BROWSER_CONNECT_TIMEOUT").then(|| "later".to_string());
        assert!(resolve(&cli(&[]), env).is_err());
    }
}
