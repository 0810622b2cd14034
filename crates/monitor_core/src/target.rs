use std::fmt;

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("target url {0} has no hostname")]
    MissingHost(String),
}

/// Filesystem-safe identifier for a monitored hostname.
///
/// Dots and any other character outside `[A-Za-z0-9_-]` become `-`, so
/// `api.example.com` is stored as `api-example-com`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey(String);

impl TargetKey {
    pub fn from_hostname(hostname: &str) -> Self {
        let key = hostname
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A page to monitor together with the hostname its state is keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: String,
    hostname: String,
    key: TargetKey,
}

impl Target {
    /// Parses a page url. A single trailing `/` is removed from the url first.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let trimmed = raw.trim();
        let url = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let parsed = Url::parse(url).map_err(|err| TargetError::InvalidUrl {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        let hostname = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| TargetError::MissingHost(url.to_string()))?
            .to_string();
        let key = TargetKey::from_hostname(&hostname);
        Ok(Self {
            url: url.to_string(),
            hostname,
            key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn key(&self) -> &TargetKey {
        &self.key
    }
}
