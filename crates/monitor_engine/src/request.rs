use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestOptionsError {
    #[error("malformed header entry {0:?}, expected `Name: value`")]
    MalformedHeader(String),
    #[error("malformed cookie entry {0:?}, expected `name=value`")]
    MalformedCookie(String),
    #[error("invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },
}

/// Extra headers and cookies sent with every page and script request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
}

impl RequestOptions {
    /// Parses `"Name: value ; Other: value"` and `"a=1; b=2"` strings.
    /// Empty strings give no entries.
    pub fn parse(headers: &str, cookies: &str) -> Result<Self, RequestOptionsError> {
        Ok(Self {
            headers: parse_headers(headers)?,
            cookies: parse_cookies(cookies)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.cookies.is_empty()
    }

    pub(crate) fn header_map(&self) -> Result<HeaderMap, RequestOptionsError> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                RequestOptionsError::InvalidHeader {
                    name: name.clone(),
                    message: err.to_string(),
                }
            })?;
            map.append(header_name, header_value(name, value)?);
        }
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            map.insert(COOKIE, header_value("Cookie", &cookie)?);
        }
        Ok(map)
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, RequestOptionsError> {
    HeaderValue::from_str(value).map_err(|err| RequestOptionsError::InvalidHeader {
        name: name.to_string(),
        message: err.to_string(),
    })
}

fn parse_headers(raw: &str) -> Result<Vec<(String, String)>, RequestOptionsError> {
    split_entries(raw)
        .map(|entry| match entry.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(RequestOptionsError::MalformedHeader(entry.to_string())),
        })
        .collect()
}

fn parse_cookies(raw: &str) -> Result<Vec<(String, String)>, RequestOptionsError> {
    split_entries(raw)
        .map(|entry| match entry.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(RequestOptionsError::MalformedCookie(entry.to_string())),
        })
        .collect()
}

fn split_entries(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|entry| !entry.is_empty())
}
