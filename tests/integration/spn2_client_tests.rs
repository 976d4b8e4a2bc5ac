//! Integration tests for the SPN2 client
//!
//! These tests use wiremock to stand in for the Save Page Now service and
//! check the wire contract: form bodies, headers and response decoding.

use wayback_archiver::client::{CaptureParamValue, CaptureStatus, ClientError};
use wayback_archiver::config::ServiceConfig;
use wayback_archiver::{CaptureClient, CaptureParams, CaptureUrl, Credentials, JobId, Spn2Client};
use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a client pointed at the mock server
fn create_test_client(server: &MockServer) -> Spn2Client {
    let service = ServiceConfig {
        save_endpoint: format!("{}/save", server.uri()),
        status_endpoint: format!("{}/save/status", server.uri()),
        ..ServiceConfig::default()
    };
    Spn2Client::new(&service, &Credentials::new("test-access", "test-secret"))
        .expect("Failed to build client")
}

fn page() -> CaptureUrl {
    CaptureUrl::parse("https://example.com/page").unwrap()
}

#[tokio::test]
async fn test_submit_sends_form_and_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .and(header("authorization", "LOW test-access:test-secret"))
        .and(header("accept", "application/json"))
        .and(body_string("url=https%3A%2F%2Fexample.com%2Fpage"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"url":"https://example.com/page","job_id":"spn2-1234"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let job_id = client.submit(&page(), &CaptureParams::new()).await.unwrap();

    assert_eq!(job_id, Some(JobId::new("spn2-1234")));
}

#[tokio::test]
async fn test_submit_forwards_capture_params() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .and(body_string_contains("capture_outlinks=1"))
        .and(body_string_contains("js_behavior_timeout=25"))
        .and(body_string_contains("capture_cookie=name%3Dvalue"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"job_id":"spn2-params"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut params = CaptureParams::new();
    params.insert("capture_outlinks".to_string(), CaptureParamValue::Int(1));
    params.insert("js_behavior_timeout".to_string(), CaptureParamValue::Int(25));
    params.insert("capture_cookie".to_string(), "name=value".into());

    let client = create_test_client(&server);
    let job_id = client.submit(&page(), &params).await.unwrap();

    assert_eq!(job_id, Some(JobId::new("spn2-params")));
}

#[tokio::test]
async fn test_submit_without_job_id_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "message": "You have already reached the limit of active sessions.",
                "status": "error"
            }"#,
        ))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let job_id = client.submit(&page(), &CaptureParams::new()).await.unwrap();

    assert!(job_id.is_none());
}

#[tokio::test]
async fn test_submit_error_status_keeps_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try again later"))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client
        .submit(&page(), &CaptureParams::new())
        .await
        .unwrap_err();

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "try again later");
        }
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_garbage_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client
        .submit(&page(), &CaptureParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_poll_batch_joins_job_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .and(header("authorization", "LOW test-access:test-secret"))
        .and(body_string("job_ids=job-1%2Cjob-2%2Cjob-3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[
                {
                    "job_id": "job-1",
                    "status": "success",
                    "timestamp": "20250115120000",
                    "original_url": "https://a.example.com/"
                },
                {
                    "job_id": "job-2",
                    "status": "error",
                    "status_ext": "error:not-found",
                    "message": "Page not found"
                },
                {"job_id":"job-3","status":"pending"}
            ]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let records = client
        .poll_batch(&[JobId::new("job-1"), JobId::new("job-2"), JobId::new("job-3")])
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].status, CaptureStatus::Success);
    assert_eq!(records[0].timestamp.as_deref(), Some("20250115120000"));
    assert_eq!(records[1].status, CaptureStatus::Error);
    assert_eq!(records[1].status_ext.as_deref(), Some("error:not-found"));
    assert_eq!(records[1].message.as_deref(), Some("Page not found"));
    assert_eq!(records[2].status, CaptureStatus::Pending);
}

#[tokio::test]
async fn test_poll_batch_single_object_and_unknown_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"job_id":"job-1","status":"queued"}"#),
        )
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let records = client.poll_batch(&[JobId::new("job-1")]).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, CaptureStatus::Unknown);
}

#[tokio::test]
async fn test_poll_batch_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/save/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let err = client.poll_batch(&[JobId::new("job-1")]).await.unwrap_err();

    assert!(matches!(err, ClientError::Status { status: 500, .. }));
}
