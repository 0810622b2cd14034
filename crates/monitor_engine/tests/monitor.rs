use std::fs;
use std::sync::{Arc, Mutex};

use monitor_core::{EndpointSet, Target};
use monitor_engine::{
    DiscordWebhook, FetchSettings, HtmlReport, Monitor, MonitorEvent, MonitorSettings,
    NullProgressSink, ProgressSink, ReqwestFetcher, RunError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<html><head>
    <script src="/static/main.js"></script>
    <script src="/static/missing.js"></script>
</head><body></body></html>"#;

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<MonitorEvent>>,
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: MonitorEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn set(items: &[&str]) -> EndpointSet {
    items.iter().copied().collect()
}

fn settings(output: &TempDir) -> MonitorSettings {
    MonitorSettings {
        clock: Arc::new(|| "2024-01-01T00:00:00Z".to_string()),
        ..MonitorSettings::default_with_output(output.path().to_path_buf())
    }
}

fn monitor(output: &TempDir) -> Monitor {
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    Monitor::new(fetcher, settings(output))
}

async fn serve(server: &MockServer, script: &str) {
    serve_script(server, script.as_bytes().to_vec(), "application/javascript").await;
}

async fn serve_script(server: &MockServer, script: Vec<u8>, content_type: &str) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE, "text/html; charset=utf-8"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/static/main.js"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(script, content_type))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/static/missing.js"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn second_run_reports_only_new_endpoints() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let monitor = monitor(&output);
    let target = Target::parse(&format!("{}/", server.uri())).unwrap();

    serve(&server, r#"load("/a/b.js"); get('/a/c');"#).await;
    let first = monitor.run_target(&target, &NullProgressSink).await.unwrap();
    assert_eq!(first.scripts_found, 2);
    assert_eq!(first.scripts_failed, 1);
    assert_eq!(first.new_endpoints, 2);
    assert_eq!(first.stored_endpoints, 2);
    assert_eq!(monitor.store().load(target.key()), set(&["/a/b.js", "/a/c"]));

    serve(&server, r#"get('/a/c'); post("/a/d");"#).await;
    let second = monitor.run_target(&target, &NullProgressSink).await.unwrap();
    assert_eq!(second.extracted, 2);
    assert_eq!(second.new_endpoints, 1);
    assert_eq!(second.stored_endpoints, 3);
    assert_eq!(
        monitor.store().load(target.key()),
        set(&["/a/b.js", "/a/c", "/a/d"])
    );
}

#[tokio::test]
async fn scripts_are_scanned_whatever_their_content_type() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let monitor = monitor(&output);
    let target = Target::parse(&server.uri()).unwrap();

    for content_type in ["application/octet-stream", "text/x-javascript", "application/json"] {
        serve_script(&server, br#"get("/api/v1/users");"#.to_vec(), content_type).await;
        let summary = monitor.run_target(&target, &NullProgressSink).await.unwrap();
        assert_eq!(summary.scripts_failed, 1, "{content_type}");
        assert_eq!(summary.extracted, 1, "{content_type}");
    }
    assert_eq!(monitor.store().load(target.key()), set(&["/api/v1/users"]));
}

#[tokio::test]
async fn malformed_bytes_do_not_drop_a_script() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let monitor = monitor(&output);
    let target = Target::parse(&server.uri()).unwrap();

    serve_script(
        &server,
        b"get(\"/api/v1/users\"); // caf\xE9".to_vec(),
        "application/javascript; charset=utf-8",
    )
    .await;
    let summary = monitor.run_target(&target, &NullProgressSink).await.unwrap();
    assert_eq!(summary.scripts_failed, 1);
    assert_eq!(summary.extracted, 1);
    assert_eq!(monitor.store().load(target.key()), set(&["/api/v1/users"]));
}

#[tokio::test]
async fn unchanged_scripts_produce_no_new_endpoints() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let monitor = monitor(&output);
    let target = Target::parse(&server.uri()).unwrap();

    serve(&server, r#"get("/api/v1/items");"#).await;
    monitor.run_target(&target, &NullProgressSink).await.unwrap();
    let again = monitor.run_target(&target, &NullProgressSink).await.unwrap();
    assert_eq!(again.new_endpoints, 0);
    assert_eq!(again.stored_endpoints, 1);
}

#[tokio::test]
async fn reporters_receive_the_diff() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let target = Target::parse(&server.uri()).unwrap();
    let hostname = target.hostname().to_string();

    serve(&server, r#"get("/api/v1/items"); get("/api/v1/orders");"#).await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(json!({
            "content": "",
            "embeds": [{
                "title": format!("New Endpoints Found - {hostname}"),
                "description": "2 new endpoints found",
            }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = DiscordWebhook::new(format!("{}/hook", server.uri())).unwrap();
    let monitor = monitor(&output)
        .with_reporter(Box::new(webhook))
        .with_reporter(Box::new(HtmlReport::new(output.path())));

    monitor.run_target(&target, &NullProgressSink).await.unwrap();
    // Nothing new: neither reporter is invoked again.
    monitor.run_target(&target, &NullProgressSink).await.unwrap();

    let report = HtmlReport::new(output.path()).report_path(target.key());
    let html = fs::read_to_string(report).unwrap();
    assert_eq!(html.matches("<section>").count(), 1);
    assert!(html.contains("<li><code>/api/v1/items</code></li>"));
    assert!(html.contains("2024-01-01T00:00:00Z - 2 new"));
}

#[tokio::test]
async fn failed_webhook_does_not_block_persistence() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let target = Target::parse(&server.uri()).unwrap();

    serve(&server, r#"get("/api/v1/items");"#).await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let webhook = DiscordWebhook::new(format!("{}/hook", server.uri())).unwrap();
    let monitor = monitor(&output).with_reporter(Box::new(webhook));
    let summary = monitor.run_target(&target, &NullProgressSink).await.unwrap();
    assert_eq!(summary.new_endpoints, 1);
    assert_eq!(monitor.store().load(target.key()), set(&["/api/v1/items"]));
}

#[tokio::test]
async fn page_failure_aborts_without_touching_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let monitor = monitor(&output);
    let target = Target::parse(&server.uri()).unwrap();

    let err = monitor
        .run_target(&target, &NullProgressSink)
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::Page { .. }));
    assert!(!monitor.store().record_path(target.key()).exists());
}

#[tokio::test]
async fn persistence_failure_is_fatal_for_the_target() {
    let server = MockServer::start().await;
    serve(&server, r#"get("/api/v1/items");"#).await;

    let output = TempDir::new().unwrap();
    fs::write(output.path().join("blocked"), "file").unwrap();
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let monitor = Monitor::new(
        fetcher,
        MonitorSettings::default_with_output(output.path().join("blocked")),
    );
    let target = Target::parse(&server.uri()).unwrap();

    let err = monitor
        .run_target(&target, &NullProgressSink)
        .await
        .unwrap_err();
    assert!(matches!(err, RunError::Persist { .. }));
}

#[tokio::test]
async fn filter_mode_drops_common_assets() {
    let server = MockServer::start().await;
    serve(
        &server,
        r#"a("/api/v1/users.json"); b("/api/v1/report.xml"); c("/img/logo.png");"#,
    )
    .await;

    let output = TempDir::new().unwrap();
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let monitor = Monitor::new(
        fetcher,
        MonitorSettings {
            filter_common_assets: true,
            ..settings(&output)
        },
    );
    let target = Target::parse(&server.uri()).unwrap();

    monitor.run_target(&target, &NullProgressSink).await.unwrap();
    assert_eq!(
        monitor.store().load(target.key()),
        set(&["/api/v1/report.xml"])
    );
}

#[tokio::test]
async fn run_all_emits_events_per_target() {
    let server = MockServer::start().await;
    serve(&server, r#"get("/api/v1/items");"#).await;

    let output = TempDir::new().unwrap();
    let monitor = monitor(&output);
    let targets = vec![Target::parse(&server.uri()).unwrap()];
    let sink = RecordingSink::default();

    let results = monitor.run_all(&targets, &sink).await;
    assert_eq!(results.len(), 1);
    assert!(results[0].is_ok());

    let events = sink.events.lock().unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, MonitorEvent::ScriptsDiscovered { count: 2, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, MonitorEvent::ScriptFailed { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, MonitorEvent::TargetCompleted(s) if s.new_endpoints == 1)));
}

#[tokio::test]
async fn run_all_continues_after_a_failed_target() {
    let server = MockServer::start().await;
    serve(&server, r#"get("/api/v1/items");"#).await;

    let output = TempDir::new().unwrap();
    let monitor = monitor(&output);
    let targets = vec![
        Target::parse("http://127.0.0.1:9/unreachable").unwrap(),
        Target::parse(&server.uri()).unwrap(),
    ];

    let results = monitor.run_all(&targets, &NullProgressSink).await;
    assert!(matches!(results[0], Err(RunError::Page { .. })));
    assert_eq!(results[1].as_ref().unwrap().new_endpoints, 1);
}
