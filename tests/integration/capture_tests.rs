//! Integration tests for the capture workflow
//!
//! These tests run the full workflow through the real SPN2 client against a
//! wiremock server, with a manual clock so every wait completes instantly.

use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wayback_archiver::config::parse_config;
use wayback_archiver::output::ReportCollector;
use wayback_archiver::workflow::ManualClock;
use wayback_archiver::{
    CaptureState, CaptureUrl, Config, Coordinator, Credentials, Spn2Client, WorkflowResult,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Hands out `job-1`, `job-2`, ... one per submission
struct SequentialJobIds {
    next: AtomicUsize,
}

impl SequentialJobIds {
    fn new() -> Self {
        Self {
            next: AtomicUsize::new(1),
        }
    }
}

impl Respond for SequentialJobIds {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        ResponseTemplate::new(200).set_body_string(format!(r#"{{"job_id":"job-{}"}}"#, n))
    }
}

/// Reports `error` with `code` for every job except `success_job`
struct FailUntil {
    code: &'static str,
    success_job: &'static str,
}

impl Respond for FailUntil {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body = String::from_utf8_lossy(&request.body);
        let job_id = body.trim_start_matches("job_ids=").to_string();
        let record = if job_id == self.success_job {
            format!(
                r#"[{{"job_id":"{}","status":"success","timestamp":"20250115120000"}}]"#,
                job_id
            )
        } else {
            format!(
                r#"[{{"job_id":"{}","status":"error","status_ext":"{}"}}]"#,
                job_id, self.code
            )
        };
        ResponseTemplate::new(200).set_body_string(record)
    }
}

/// Creates a configuration pointed at the mock server
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.service.save_endpoint = format!("{}/save", server.uri());
    config.service.status_endpoint = format!("{}/save/status", server.uri());
    config
}

struct TestRun {
    clock: Arc<ManualClock>,
    collector: Arc<ReportCollector>,
    coordinator: Coordinator,
}

fn create_test_run(config: &Config) -> TestRun {
    let client = Spn2Client::new(&config.service, &Credentials::new("access", "secret"))
        .expect("Failed to build client");
    let clock = Arc::new(ManualClock::starting_at(
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
    ));
    let collector = Arc::new(ReportCollector::new());
    let coordinator = Coordinator::new(Arc::new(client), config)
        .with_clock(clock.clone())
        .with_output(collector.clone());

    TestRun {
        clock,
        collector,
        coordinator,
    }
}

fn url(s: &str) -> CaptureUrl {
    CaptureUrl::parse(s).unwrap()
}

async fn mount_submissions(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(SequentialJobIds::new())
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_single_url_archived() {
    let server = MockServer::start().await;
    mount_submissions(&server).await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"job_id":"job-1","status":"success","timestamp":"20250115120000"}]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let run = create_test_run(&config);

    let result = run
        .coordinator
        .run(vec![url("https://example.com/page")])
        .await;

    assert_eq!(result, WorkflowResult::new(1, 1, 0));
    let records = run.collector.records();
    assert_eq!(
        records[0].archive_url.as_deref(),
        Some("https://web.archive.org/web/20250115120000/https://example.com/page")
    );
}

#[tokio::test]
async fn test_not_found_fails_after_one_poll() {
    let server = MockServer::start().await;
    mount_submissions(&server).await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{
                "job_id": "job-1",
                "status": "error",
                "status_ext": "error:not-found",
                "message": "not found"
            }]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let run = create_test_run(&config);

    let result = run
        .coordinator
        .run(vec![url("https://example.com/missing")])
        .await;

    assert_eq!(result, WorkflowResult::new(1, 0, 1));
    let records = run.collector.records();
    assert_eq!(records[0].state, CaptureState::RemoteError);
    assert_eq!(records[0].detail_code.as_deref(), Some("error:not-found"));
}

#[tokio::test]
async fn test_service_unavailable_three_times_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(SequentialJobIds::new())
        .expect(4)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(FailUntil {
            code: "error:service-unavailable",
            success_job: "job-4",
        })
        .expect(4)
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let run = create_test_run(&config);

    let result = run
        .coordinator
        .run(vec![url("https://busy.example.com/")])
        .await;

    assert_eq!(result, WorkflowResult::new(1, 1, 0));
    let records = run.collector.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].transient_retries, 3);
    assert_eq!(records[0].job_id.as_ref().map(|id| id.as_str()), Some("job-4"));
}

#[tokio::test]
async fn test_pending_forever_times_out() {
    let server = MockServer::start().await;
    mount_submissions(&server).await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"[{"job_id":"job-1","status":"pending"}]"#),
        )
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let run = create_test_run(&config);

    let result = run
        .coordinator
        .run(vec![url("https://slow.example.com/")])
        .await;

    assert_eq!(result, WorkflowResult::new(1, 0, 1));
    let records = run.collector.records();
    assert_eq!(records[0].state, CaptureState::TimedOut);
    assert_eq!(records[0].reason.as_deref(), Some("timed out"));
    assert!(run.clock.total_slept() > Duration::from_secs(2 * 60 * 60));
}

#[tokio::test]
async fn test_status_endpoint_down_fails_pending_jobs() {
    let server = MockServer::start().await;
    mount_submissions(&server).await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let run = create_test_run(&config);

    let result = run
        .coordinator
        .run(vec![
            url("https://a.example.com/"),
            url("https://b.example.com/"),
        ])
        .await;

    assert_eq!(result, WorkflowResult::new(2, 0, 2));
    assert!(run
        .collector
        .records()
        .iter()
        .all(|record| record.state == CaptureState::PollFailed));
}

#[tokio::test]
async fn test_submission_rejected_every_time() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let run = create_test_run(&config);

    let result = run
        .coordinator
        .run(vec![url("https://example.com/")])
        .await;

    assert_eq!(result, WorkflowResult::new(1, 0, 1));
    assert_eq!(
        run.collector.records()[0].state,
        CaptureState::SubmissionFailed
    );
    assert_eq!(run.clock.sleeps(), vec![Duration::from_secs(15); 3]);
}

#[tokio::test]
async fn test_config_file_drives_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .and(body_string_contains("capture_screenshot=1"))
        .and(body_string_contains("if_not_archived_within=3d"))
        .respond_with(SequentialJobIds::new())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"job_id":"job-1","status":"success","timestamp":"20250101000000"}]"#,
        ))
        .mount(&server)
        .await;

    let toml = format!(
        r#"
[workflow]
rate-limit-wait-secs = 2
poll-courtesy-delay-ms = 500

[service]
save-endpoint = "{uri}/save"
status-endpoint = "{uri}/save/status"
playback-prefix = "https://archive.example.org/web/"

[capture-params]
capture_screenshot = 1
if_not_archived_within = "3d"
"#,
        uri = server.uri()
    );
    let config = parse_config(&toml).expect("Failed to parse config");
    let run = create_test_run(&config);

    let result = run
        .coordinator
        .run(vec![url("https://example.com/")])
        .await;

    assert_eq!(result, WorkflowResult::new(1, 1, 0));
    assert_eq!(
        run.collector.records()[0].archive_url.as_deref(),
        Some("https://archive.example.org/web/20250101000000/https://example.com/")
    );
    assert_eq!(
        run.clock.sleeps(),
        vec![Duration::from_secs(2), Duration::from_millis(500)]
    );
}

#[tokio::test]
async fn test_mixed_batch_accounts_for_every_url() {
    let server = MockServer::start().await;
    mount_submissions(&server).await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[
                {"job_id":"job-1","status":"success","timestamp":"20250115120000"},
                {"job_id":"job-2","status":"error","status_ext":"error:blocked"},
                {"job_id":"job-3","status":"success","timestamp":"20250115120005"}
            ]"#,
        ))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.workflow.rate_limit_wait_secs = 0;
    let run = create_test_run(&config);

    let result = run
        .coordinator
        .run(vec![
            url("https://one.example.com/"),
            url("https://two.example.com/"),
            url("https://three.example.com/"),
        ])
        .await;

    assert_eq!(result, WorkflowResult::new(3, 2, 1));
    assert!(result.is_complete());

    let summary = run.collector.summary();
    assert_eq!(summary.archived, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.by_state.get(&CaptureState::RemoteError), Some(&1));
}
