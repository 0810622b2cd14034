use std::path::{Path, PathBuf};

use monitor_core::TargetKey;

use crate::persist::AtomicFileWriter;
use crate::report::{NewEndpoints, ReportError, Reporter};

pub const REPORT_DIR_NAME: &str = "reports";
const DOCUMENT_END: &str = "</body>\n</html>\n";

/// Appends one `<section>` per run to `<output-dir>/reports/<key>.html`.
///
/// Earlier sections are never rewritten; the whole file is replaced
/// atomically with the previous content plus the new block.
#[derive(Debug, Clone)]
pub struct HtmlReport {
    writer: AtomicFileWriter,
}

impl HtmlReport {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            writer: AtomicFileWriter::new(output_dir.join(REPORT_DIR_NAME)),
        }
    }

    pub fn report_path(&self, key: &TargetKey) -> PathBuf {
        self.writer.path_of(&report_filename(key))
    }

    fn append(&self, new: NewEndpoints<'_>) -> Result<PathBuf, ReportError> {
        let filename = report_filename(new.target.key());
        let existing = self.writer.read(&filename).map_err(|err| ReportError::Read {
            path: self.writer.path_of(&filename).display().to_string(),
            message: err.to_string(),
        })?;

        let mut document = match existing {
            Some(content) => match content.strip_suffix(DOCUMENT_END) {
                Some(body) => body.to_string(),
                None => content,
            },
            None => document_start(new.target.hostname()),
        };
        document.push_str(&render_section(new));
        document.push_str(DOCUMENT_END);

        Ok(self.writer.write(&filename, &document)?)
    }
}

#[async_trait::async_trait]
impl Reporter for HtmlReport {
    fn name(&self) -> &'static str {
        "html-report"
    }

    async fn report(&self, new: NewEndpoints<'_>) -> Result<(), ReportError> {
        self.append(new).map(|_| ())
    }
}

fn report_filename(key: &TargetKey) -> String {
    format!("{key}.html")
}

fn document_start(hostname: &str) -> String {
    let host = escape_html(hostname);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Endpoints - {host}</title>\n</head>\n<body>\n<h1>New endpoints for {host}</h1>\n"
    )
}

fn render_section(new: NewEndpoints<'_>) -> String {
    let mut section = format!(
        "<section>\n<h2>{} - {} new</h2>\n<ul>\n",
        escape_html(new.observed_utc),
        new.endpoints.len()
    );
    for endpoint in new.endpoints.iter() {
        section.push_str("<li><code>");
        section.push_str(&escape_html(endpoint));
        section.push_str("</code></li>\n");
    }
    section.push_str("</ul>\n</section>\n");
    section
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
