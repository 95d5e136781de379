use std::net::TcpListener;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pda_api::client::HttpPagerDuty;
use pda_api::retry::RetryPolicy;
use pda_api::PagerDutyApi;
use pda_core::error::{codes, AppError};

fn no_sleep(_: Duration) {}

fn must_not_sleep(d: Duration) {
    panic!("unexpected retry after {d:?}");
}

/// `ureq` blocks, so the call runs off the runtime threads that drive the mock server.
async fn call(
    client: HttpPagerDuty,
    op: fn(&HttpPagerDuty) -> Result<Value, AppError>,
) -> Result<Value, AppError> {
    tokio::task::spawn_blocking(move || op(&client))
        .await
        .expect("blocking call")
}

#[tokio::test(flavor = "multi_thread")]
async fn sends_pagerduty_headers_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/incidents"))
        .and(query_param("user_ids[]", "PUSER1"))
        .and(query_param("limit", "50"))
        .and(query_param("statuses[]", "triggered"))
        .and(query_param("statuses[]", "acknowledged"))
        .and(header("Accept", "application/vnd.pagerduty+json;version=2"))
        .and(header("Authorization", "Token token=tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"incidents": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpPagerDuty::new(&server.uri(), "tok123", "PUSER1").with_sleeper(must_not_sleep);
    let reply = call(client, |c| c.fetch_incidents()).await.expect("incidents");
    assert_eq!(reply, json!({"incidents": []}));
}

#[tokio::test(flavor = "multi_thread")]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oncalls"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/oncalls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"oncalls": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpPagerDuty::new(&server.uri(), "tok", "PUSER1").with_sleeper(no_sleep);
    let reply = call(client, |c| c.fetch_oncalls()).await.expect("oncalls");
    assert_eq!(reply, json!({"oncalls": []}));
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_retries_surface_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/incidents"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = HttpPagerDuty::new(&server.uri(), "tok", "PUSER1")
        .with_retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        })
        .with_sleeper(no_sleep);
    let err = call(client, |c| c.fetch_incidents()).await.unwrap_err();
    assert_eq!(err.code, codes::PD_SERVER_ERROR);
    assert_eq!(err.message, "503: A 5xx server error occurred, please retry the request.");
    assert!(err.details.as_deref().unwrap_or_default().starts_with("attempts=3"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oncalls"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "nope"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpPagerDuty::new(&server.uri(), "bad", "PUSER1").with_sleeper(must_not_sleep);
    let err = call(client, |c| c.fetch_oncalls()).await.unwrap_err();
    assert_eq!(err.code, codes::PD_UNAUTHORIZED);
    assert!(!err.retryable);
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_success_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/incidents"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = HttpPagerDuty::new(&server.uri(), "tok", "PUSER1");
    let err = call(client, |c| c.fetch_incidents()).await.unwrap_err();
    assert_eq!(err.code, codes::PD_DECODE_FAILED);
}

#[test]
fn unreachable_host_is_not_retried() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().unwrap()
    };
    let client = HttpPagerDuty::new(&format!("http://{addr}"), "tok", "PUSER1")
        .with_sleeper(must_not_sleep);
    let err = client.fetch_incidents().unwrap_err();
    assert_eq!(err.code, codes::PD_UNREACHABLE);
    assert!(!err.retryable);
    assert!(err.details.as_deref().unwrap_or_default().starts_with("attempts=1"));
}
