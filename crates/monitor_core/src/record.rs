use crate::EndpointSet;

/// Parses a stored state record: one endpoint per line, blank lines ignored.
pub fn parse_record(content: &str) -> EndpointSet {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Renders `endpoints` as a state record, each entry followed by `\n`.
pub fn render_record(endpoints: &EndpointSet) -> String {
    let mut out = String::new();
    for endpoint in endpoints.iter() {
        out.push_str(endpoint);
        out.push('\n');
    }
    out
}
