use std::path::PathBuf;

use clap::Parser;

/// Watch web pages for new endpoints referenced by their scripts.
#[derive(Debug, Parser)]
#[command(name = "endpoints-monitor")]
#[command(version)]
pub struct Cli {
    /// URL to monitor (repeatable)
    #[arg(short = 'u', long = "url")]
    pub urls: Vec<String>,

    /// Headers to include in requests (e.g. 'User-Agent: Mozilla/5.0 ; CSRF-Token: TOKEN')
    #[arg(short = 'H', long, default_value = "")]
    pub headers: String,

    /// Cookies to include in requests (e.g. 'cookie1=aaaa; cookie2=bbbb')
    #[arg(short, long, default_value = "")]
    pub cookies: String,

    /// Output directory for endpoint state and reports [default: endpoints-output/]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Discord webhook URL to notify about new endpoints
    #[arg(short = 'w', long)]
    pub discord_webhook: Option<String>,

    /// Ignore images, stylesheets and JSON files
    #[arg(long)]
    pub filter_assets: bool,

    /// Append new endpoints to an HTML report per host
    #[arg(long)]
    pub html_report: bool,

    /// Repeat the run every N seconds until interrupted
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// RON file with targets and defaults; command line values win
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
