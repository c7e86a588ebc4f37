use super::*;
use crate::testing::{FakeDebugger, FakeTarget, Outbound, Request, default_reply};
use std::time::Instant;

fn page() -> Vec<FakeTarget> {
    vec![FakeTarget::page("P1", "https://example.com/feed")]
}

fn options(server: &FakeDebugger) -> ClientOptions {
    ClientOptions::new(server.port()).with_timeout(Duration::from_millis(500))
}

fn expression(request: &Request) -> &str {
    request.params["expression"].as_str().unwrap_or_default()
}

fn scripted(request: &Request) -> Vec<Outbound> {
    if request.method != "Runtime.evaluate" {
        return default_reply(request);
    }
    match expression(request) {
        "slow" => vec![
            Outbound::Pause(Duration::from_millis(200)),
            Outbound::evaluated(json!("slow")),
        ],
        "fast" => vec![Outbound::evaluated(json!("fast"))],
        "hang" => vec![],
        "boom" => vec![Outbound::thrown("Error: boom")],
        "denied" => vec![Outbound::Error {
            code: -32000,
            message: "Execution context was destroyed".to_string(),
        }],
        "bye" => vec![Outbound::Pause(Duration::from_millis(50)), Outbound::Close],
        other => vec![Outbound::evaluated(json!(other.len()))],
    }
}

#[test]
fn test_options_default() {
    let options = ClientOptions::default();
    assert_eq!(options.host, "127.0.0.1");
    assert_eq!(options.port, 9222);
    assert_eq!(options.timeout, Duration::from_secs(30));
    assert!(!options.remote);
}

#[test]
fn test_local_ws_url() {
    let options = ClientOptions::new(9333);
    assert_eq!(
        options.local_ws_url("ABC"),
        "ws://127.0.0.1:9333/devtools/page/ABC"
    );
}

#[tokio::test]
async fn test_connect_and_evaluate() {
    let server = FakeDebugger::with_responder(page(), scripted).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();

    assert!(client.is_connected());
    assert_eq!(client.target_id(), "P1");

    let value = client.evaluate("abcd", true).await.unwrap();
    assert_eq!(value, json!(4));

    let sent = server.requests_for("Runtime.evaluate");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].params["awaitPromise"], json!(true));
    assert_eq!(sent[0].params["returnByValue"], json!(true));
}

#[tokio::test]
async fn test_connect_via_advertised_url() {
    let server = FakeDebugger::start(page()).await.unwrap();
    let mut opts = options(&server);
    opts.remote = true;

    let client = CdpClient::connect(&opts, "P1").await.unwrap();
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_connect_unknown_target() {
    let server = FakeDebugger::start(page()).await.unwrap();
    let err = CdpClient::connect(&options(&server), "missing").await.err().unwrap();
    assert!(matches!(err, CdpError::TargetNotFound(id) if id == "missing"));
}

#[tokio::test]
async fn test_connect_refused_upgrade() {
    let server = FakeDebugger::start(page()).await.unwrap();
    server.refuse("P1");
    let err = CdpClient::connect(&options(&server), "P1").await.err().unwrap();
    assert!(err.is_connection(), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn test_responses_complete_independently() {
    let server = FakeDebugger::with_responder(page(), scripted).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();
    let finished = Mutex::new(Vec::new());

    let (slow, fast) = tokio::join!(
        async {
            let value = client.evaluate("slow", true).await;
            finished.lock().push("slow");
            value
        },
        async {
            let value = client.evaluate("fast", true).await;
            finished.lock().push("fast");
            value
        }
    );

    assert_eq!(slow.unwrap(), json!("slow"));
    assert_eq!(fast.unwrap(), json!("fast"));
    assert_eq!(*finished.lock(), vec!["fast", "slow"]);
}

#[tokio::test]
async fn test_timeout_keeps_connection() {
    let server = FakeDebugger::with_responder(page(), scripted).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();

    let err = client.evaluate("hang", true).await.unwrap_err();
    assert!(err.is_timeout());
    assert!(client.is_connected());

    let value = client.evaluate("fast", true).await.unwrap();
    assert_eq!(value, json!("fast"));
}

#[tokio::test]
async fn test_timeout_does_not_disturb_other_call() {
    let server = FakeDebugger::with_responder(page(), scripted).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();

    let (hung, slow) = tokio::join!(
        client.evaluate_with_timeout("hang", true, Duration::from_millis(100)),
        client.evaluate("slow", true)
    );
    assert!(hung.unwrap_err().is_timeout());
    assert_eq!(slow.unwrap(), json!("slow"));
}

#[tokio::test]
async fn test_evaluation_exception() {
    let server = FakeDebugger::with_responder(page(), scripted).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();

    let err = client.evaluate("boom", true).await.unwrap_err();
    match err {
        CdpError::Evaluation(message) => assert_eq!(message, "Error: boom"),
        other => panic!("expected Evaluation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_protocol_error() {
    let server = FakeDebugger::with_responder(page(), scripted).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();

    let err = client.evaluate("denied", true).await.unwrap_err();
    assert!(matches!(err, CdpError::Protocol { code: -32000, .. }));
}

#[tokio::test]
async fn test_navigate_rejects_non_http_schemes() {
    let server = FakeDebugger::start(page()).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();

    for url in ["javascript:alert(1)", "file:///etc/passwd", "not a url"] {
        let err = client.navigate(url).await.unwrap_err();
        assert!(matches!(err, CdpError::InvalidUrl { .. }), "{} -> {:?}", url, err);
    }
    assert!(server.requests_for("Page.navigate").is_empty());
}

#[tokio::test]
async fn test_navigate_and_wait_for_load() {
    let server = FakeDebugger::start(page()).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();

    let load = client.event_waiter("Page.loadEventFired");
    assert_eq!(load.event(), "Page.loadEventFired");
    let frame = client.navigate("https://example.com/next").await.unwrap();
    assert_eq!(frame, "main");
    let params = load.wait().await.unwrap();
    assert_eq!(params["timestamp"], json!(1.0));

    let navigations = server.requests_for("Page.navigate");
    assert_eq!(navigations.len(), 1);
    assert_eq!(navigations[0].params["url"], json!("https://example.com/next"));
}

#[tokio::test]
async fn test_wait_for_event_times_out() {
    let server = FakeDebugger::start(page()).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();

    let err = client.wait_for_event("Page.frameStoppedLoading").await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_disconnect_is_idempotent_and_fails_fast() {
    let server = FakeDebugger::start(page()).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();

    client.disconnect().await;
    client.disconnect().await;
    assert!(!client.is_connected());

    let started = Instant::now();
    let err = client.send("Page.enable", None).await.unwrap_err();
    assert!(matches!(err, CdpError::NotConnected));
    let err = client.wait_for_event("Page.loadEventFired").await.unwrap_err();
    assert!(matches!(err, CdpError::NotConnected));
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn test_remote_close_fails_pending_call() {
    let server = FakeDebugger::with_responder(page(), scripted).await.unwrap();
    let client = CdpClient::connect(&options(&server), "P1").await.unwrap();

    let (closed, hung) = tokio::join!(
        client.evaluate("bye", true),
        client.evaluate("hang", true)
    );
    assert!(matches!(closed.unwrap_err(), CdpError::SessionClosed));
    assert!(matches!(hung.unwrap_err(), CdpError::SessionClosed));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!client.is_connected());
}
