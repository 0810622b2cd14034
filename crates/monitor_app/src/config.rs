//! Run configuration: command line merged over an optional RON file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use monitor_core::{Target, TargetError};
use monitor_engine::{FetchSettings, RequestOptions, RequestOptionsError};
use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;

pub const DEFAULT_OUTPUT_DIR: &str = "endpoints-output/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("no target url given; use --url or list targets in the config file")]
    NoTargets,
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Request(#[from] RequestOptionsError),
    #[error("interval must be at least one second")]
    ZeroInterval,
}

/// Shape of the `--config` file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    targets: Vec<String>,
    headers: String,
    cookies: String,
    output: Option<PathBuf>,
    discord_webhook: Option<String>,
    filter_assets: bool,
    html_report: bool,
    interval_secs: Option<u64>,
    fetch: FileFetchConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FileFetchConfig {
    connect_timeout_secs: u64,
    request_timeout_secs: u64,
    redirect_limit: usize,
    max_bytes: u64,
    allowed_content_types: Vec<String>,
    script_concurrency: usize,
}

impl Default for FileFetchConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            redirect_limit: fetch.redirect_limit,
            max_bytes: fetch.max_bytes,
            allowed_content_types: fetch.allowed_content_types,
            script_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub targets: Vec<Target>,
    pub request: RequestOptions,
    pub output_dir: PathBuf,
    pub discord_webhook: Option<String>,
    pub filter_common_assets: bool,
    pub html_report: bool,
    pub interval: Option<Duration>,
    pub fetch: FetchSettings,
    pub script_concurrency: usize,
}

impl Config {
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => load_file(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    fn merge(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let mut raw_targets = file.targets;
        raw_targets.extend(cli.urls.iter().cloned());
        let mut targets: Vec<Target> = Vec::with_capacity(raw_targets.len());
        for raw in &raw_targets {
            let target = Target::parse(raw)?;
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let headers = prefer_non_empty(&cli.headers, &file.headers);
        let cookies = prefer_non_empty(&cli.cookies, &file.cookies);
        let request = RequestOptions::parse(headers, cookies)?;

        let interval = match cli.interval.or(file.interval_secs) {
            Some(0) => return Err(ConfigError::ZeroInterval),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let fetch = FetchSettings {
            connect_timeout: Duration::from_secs(file.fetch.connect_timeout_secs),
            request_timeout: Duration::from_secs(file.fetch.request_timeout_secs),
            redirect_limit: file.fetch.redirect_limit,
            max_bytes: file.fetch.max_bytes,
            allowed_content_types: file.fetch.allowed_content_types,
        };

        Ok(Self {
            targets,
            request,
            output_dir: cli
                .output
                .clone()
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            discord_webhook: cli
                .discord_webhook
                .clone()
                .or(file.discord_webhook)
                .filter(|url| !url.trim().is_empty()),
            filter_common_assets: cli.filter_assets || file.filter_assets,
            html_report: cli.html_report || file.html_report,
            interval,
            fetch,
            script_concurrency: file.fetch.script_concurrency.max(1),
        })
    }
}

fn prefer_non_empty<'a>(cli: &'a str, file: &'a str) -> &'a str {
    if cli.trim().is_empty() {
        file
    } else {
        cli
    }
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file(&content).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

fn parse_file(content: &str) -> Result<FileConfig, String> {
    ron::from_str(content).map_err(|err| err.to_string())
}
