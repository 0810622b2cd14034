use scraper::{Html, Selector};
use url::Url;

const DEFAULT_MAX_SCRIPTS: usize = 500;

/// Finds `<script src>` references in a page and resolves them to absolute urls.
pub struct ScriptDiscovery {
    max_scripts: usize,
}

impl ScriptDiscovery {
    pub fn new() -> Self {
        Self::with_max_scripts(DEFAULT_MAX_SCRIPTS)
    }

    pub fn with_max_scripts(max_scripts: usize) -> Self {
        Self { max_scripts }
    }

    /// Script urls in document order, without duplicates.
    ///
    /// References that cannot be resolved against `page_url` are skipped, as are
    /// `data:` and `javascript:` sources.
    pub fn discover(&self, html: &str, page_url: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse("script[src]") else {
            return Vec::new();
        };
        let base = Url::parse(page_url).ok();
        let document = Html::parse_document(html);

        let mut scripts: Vec<String> = Vec::new();
        for element in document.select(&selector) {
            if scripts.len() >= self.max_scripts {
                break;
            }
            let Some(src) = element.value().attr("src") else {
                continue;
            };
            let Some(url) = resolve_script_url(src, base.as_ref()) else {
                continue;
            };
            let url = String::from(url);
            if !scripts.contains(&url) {
                scripts.push(url);
            }
        }
        scripts
    }
}

impl Default for ScriptDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_script_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("data:") || lower.starts_with("javascript:") {
        return None;
    }
    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(_) => base?.join(trimmed).ok()?,
    };
    matches!(url.scheme(), "http" | "https").then_some(url)
}
