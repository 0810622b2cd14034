//! Monitor engine: fetching, script discovery, state persistence and reporting.
mod decode;
mod fetch;
mod html_report;
mod monitor;
mod persist;
mod report;
mod request;
mod scripts;
mod state;
mod types;
mod webhook;

pub use decode::{decode_text, DecodedText};
pub use fetch::{FetchSettings, Fetcher, NullProgressSink, ProgressSink, ReqwestFetcher};
pub use html_report::{HtmlReport, REPORT_DIR_NAME};
pub use monitor::{Clock, Monitor, MonitorSettings, RunError};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use report::{NewEndpoints, ReportError, Reporter};
pub use request::{RequestOptions, RequestOptionsError};
pub use scripts::ScriptDiscovery;
pub use state::{StateStore, STATE_DIR_NAME};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput, MonitorEvent, RunSummary};
pub use webhook::{discord_payload, DiscordWebhook};
