use std::path::PathBuf;
use std::sync::Arc;

use futures_util::{stream, StreamExt};
use monitor_core::{diff, extract, EndpointSet, Target};
use monitor_logging::{monitor_debug, monitor_error, monitor_info, monitor_warn};

use crate::decode::{decode_text, DecodedText};
use crate::fetch::{Fetcher, ProgressSink};
use crate::persist::{ensure_output_dir, PersistError};
use crate::report::{NewEndpoints, Reporter};
use crate::scripts::ScriptDiscovery;
use crate::state::StateStore;
use crate::{FetchError, MonitorEvent, RunSummary};

pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct MonitorSettings {
    pub output_dir: PathBuf,
    pub filter_common_assets: bool,
    /// Upper bound on script downloads in flight for one target.
    pub script_concurrency: usize,
    /// Produces the RFC 3339 timestamp handed to reporters.
    pub clock: Clock,
}

impl MonitorSettings {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            filter_common_assets: false,
            script_concurrency: 4,
            clock: Arc::new(|| chrono::Utc::now().to_rfc3339()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to fetch page {url}: {source}")]
    Page {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("failed to persist state for {hostname}: {source}")]
    Persist {
        hostname: String,
        #[source]
        source: PersistError,
    },
}

/// Runs the fetch, extract, diff, report, persist cycle for targets.
pub struct Monitor {
    fetcher: Arc<dyn Fetcher>,
    store: StateStore,
    discovery: ScriptDiscovery,
    reporters: Vec<Box<dyn Reporter>>,
    settings: MonitorSettings,
}

impl Monitor {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: MonitorSettings) -> Self {
        Self {
            fetcher,
            store: StateStore::new(&settings.output_dir),
            discovery: ScriptDiscovery::new(),
            reporters: Vec::new(),
            settings,
        }
    }

    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Creates the output directory. Called once before the first run.
    pub fn prepare(&self) -> Result<(), PersistError> {
        ensure_output_dir(&self.settings.output_dir)
    }

    /// One run for one target.
    ///
    /// Stored state is read before anything is fetched and the diff is
    /// computed once, so reporters and the persisted record agree. A failed
    /// page fetch aborts the run without touching state; failed scripts are
    /// skipped. Only a failed write is returned as a persistence error.
    pub async fn run_target(
        &self,
        target: &Target,
        sink: &dyn ProgressSink,
    ) -> Result<RunSummary, RunError> {
        let old = self.store.load(target.key());

        let page = self
            .fetcher
            .fetch(target.url(), sink)
            .await
            .map_err(|source| RunError::Page {
                url: target.url().to_string(),
                source,
            })?;
        let html = decode_logged(target.url(), &page.bytes, page.metadata.content_type.as_deref());

        let scripts = self.discovery.discover(&html.text, &page.metadata.final_url);
        monitor_info!("{}: {} scripts referenced", target.hostname(), scripts.len());
        sink.emit(MonitorEvent::ScriptsDiscovered {
            target: target.hostname().to_string(),
            count: scripts.len(),
        });

        let scanned: Vec<Option<EndpointSet>> = stream::iter(scripts.iter())
            .map(|url| self.scan_script(url, sink))
            .buffer_unordered(self.settings.script_concurrency.max(1))
            .collect()
            .await;
        let scripts_failed = scanned.iter().filter(|s| s.is_none()).count();
        let fresh: EndpointSet = scanned.into_iter().flatten().flatten().collect();

        let newly = diff(&old, &fresh);
        if !newly.is_empty() {
            self.notify(target, &newly).await;
        }

        let stored = self
            .store
            .persist(target.key(), &old, &fresh)
            .map_err(|source| RunError::Persist {
                hostname: target.hostname().to_string(),
                source,
            })?;

        let summary = RunSummary {
            hostname: target.hostname().to_string(),
            scripts_found: scripts.len(),
            scripts_failed,
            extracted: fresh.len(),
            new_endpoints: newly.len(),
            stored_endpoints: stored.len(),
        };
        monitor_info!(
            "{}: {} extracted, {} new, {} stored",
            summary.hostname,
            summary.extracted,
            summary.new_endpoints,
            summary.stored_endpoints
        );
        sink.emit(MonitorEvent::TargetCompleted(summary.clone()));
        Ok(summary)
    }

    /// Runs every target in order. Each target's read-diff-write completes
    /// before the next one starts.
    pub async fn run_all(
        &self,
        targets: &[Target],
        sink: &dyn ProgressSink,
    ) -> Vec<Result<RunSummary, RunError>> {
        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            let result = self.run_target(target, sink).await;
            if let Err(err) = &result {
                monitor_error!("{}: run aborted: {}", target.hostname(), err);
            }
            results.push(result);
        }
        results
    }

    async fn scan_script(&self, url: &str, sink: &dyn ProgressSink) -> Option<EndpointSet> {
        let reason = match self.fetcher.fetch(url, sink).await {
            Ok(output) => {
                let decoded =
                    decode_logged(url, &output.bytes, output.metadata.content_type.as_deref());
                let endpoints = extract(&decoded.text, self.settings.filter_common_assets);
                monitor_debug!("{}: {} endpoints", url, endpoints.len());
                sink.emit(MonitorEvent::ScriptScanned {
                    url: url.to_string(),
                    endpoints: endpoints.len(),
                });
                return Some(endpoints);
            }
            Err(err) => err.to_string(),
        };
        monitor_warn!("Skipping script {}: {}", url, reason);
        sink.emit(MonitorEvent::ScriptFailed {
            url: url.to_string(),
            reason,
        });
        None
    }

    async fn notify(&self, target: &Target, newly: &EndpointSet) {
        let observed_utc = (self.settings.clock)();
        let new = NewEndpoints {
            target,
            endpoints: newly,
            observed_utc: &observed_utc,
        };
        for reporter in &self.reporters {
            if let Err(err) = reporter.report(new).await {
                monitor_warn!(
                    "{}: {} failed: {}",
                    target.hostname(),
                    reporter.name(),
                    err
                );
            }
        }
    }
}

fn decode_logged(url: &str, bytes: &[u8], content_type: Option<&str>) -> DecodedText {
    let decoded = decode_text(bytes, content_type);
    if decoded.lossy {
        monitor_warn!(
            "{}: malformed {} bytes replaced while decoding",
            url,
            decoded.encoding_label
        );
    }
    decoded
}
