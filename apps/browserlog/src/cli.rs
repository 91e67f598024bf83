//! Command-line arguments.

use std::path::PathBuf;

use browserlog_protocol::EventName;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "browserlog")]
#[command(version, about = "Launch a Chromium browser and print its console output", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Browser name used for the Chromium check
    #[arg(long, default_value = "chrome")]
    pub browser_name: String,

    /// Browser family used for the Chromium check
    #[arg(long, default_value = "chromium")]
    pub family: String,

    /// Turn redirection on regardless of REDIRECT_BROWSER_LOG
    #[arg(long)]
    pub enable: bool,

    /// Events that get a default printer, comma separated
    #[arg(long, value_delimiter = ',')]
    pub events: Vec<EventName>,

    /// Browser executable
    #[arg(required = true)]
    pub executable: PathBuf,

    /// Arguments passed to the browser
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
