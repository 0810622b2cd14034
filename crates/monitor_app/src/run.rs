use std::sync::Arc;

use anyhow::{bail, Context};
use monitor_engine::{
    DiscordWebhook, HtmlReport, Monitor, MonitorEvent, MonitorSettings, ProgressSink,
    ReqwestFetcher,
};
use monitor_logging::{monitor_debug, monitor_info, monitor_trace};

use crate::config::Config;

/// Prints a line per finished target and forwards the rest to the log.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, event: MonitorEvent) {
        match event {
            MonitorEvent::Downloading { url, bytes } => {
                monitor_trace!("{}: {} bytes", url, bytes);
            }
            MonitorEvent::ScriptsDiscovered { target, count } => {
                monitor_debug!("{}: {} scripts", target, count);
            }
            MonitorEvent::ScriptScanned { url, endpoints } => {
                monitor_debug!("{}: {} endpoints", url, endpoints);
            }
            MonitorEvent::ScriptFailed { url, reason } => {
                monitor_debug!("{} failed: {}", url, reason);
            }
            MonitorEvent::TargetCompleted(summary) => {
                println!(
                    "{}: {} new endpoints ({} known, {}/{} scripts scanned)",
                    summary.hostname,
                    summary.new_endpoints,
                    summary.stored_endpoints,
                    summary.scripts_found - summary.scripts_failed,
                    summary.scripts_found
                );
            }
        }
    }
}

pub fn build_monitor(config: &Config) -> anyhow::Result<Monitor> {
    let fetcher = ReqwestFetcher::with_request_options(config.fetch.clone(), &config.request)
        .context("invalid request headers")?;

    let mut settings = MonitorSettings::default_with_output(config.output_dir.clone());
    settings.filter_common_assets = config.filter_common_assets;
    settings.script_concurrency = config.script_concurrency;

    let mut monitor = Monitor::new(Arc::new(fetcher), settings);
    if let Some(url) = &config.discord_webhook {
        let webhook = DiscordWebhook::new(url.clone()).context("cannot build webhook client")?;
        monitor = monitor.with_reporter(Box::new(webhook));
    }
    if config.html_report {
        monitor = monitor.with_reporter(Box::new(HtmlReport::new(&config.output_dir)));
    }
    monitor
        .prepare()
        .with_context(|| format!("cannot use output directory {:?}", config.output_dir))?;
    Ok(monitor)
}

/// Runs every target once, or forever on `config.interval` until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let monitor = build_monitor(&config)?;
    let sink = ConsoleSink;

    loop {
        let results = monitor.run_all(&config.targets, &sink).await;
        let failed = results.iter().filter(|result| result.is_err()).count();

        let Some(interval) = config.interval else {
            if failed > 0 {
                bail!("{failed} of {} targets failed", config.targets.len());
            }
            return Ok(());
        };

        monitor_info!("Next run in {}s", interval.as_secs());
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                monitor_info!("Interrupted, stopping");
                return Ok(());
            }
        }
    }
}
