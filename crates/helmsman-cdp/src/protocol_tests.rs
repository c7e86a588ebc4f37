use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 7,
        method: "Page.navigate",
        params: Some(serde_json::json!({"url": "https://example.com"})),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("\"id\":7"));
    assert!(json.contains("Page.navigate"));
    assert!(json.contains("example.com"));
}

#[test]
fn test_cdp_request_omits_empty_params() {
    let req = CdpRequest {
        id: 1,
        method: "Page.enable",
        params: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("params"));
}

#[test]
fn test_response_and_event_frames() {
    let resp: CdpMessage = serde_json::from_str(r#"{"id": 1, "result": {"frameId": "abc"}}"#).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.method.is_none());

    let event: CdpMessage =
        serde_json::from_str(r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}}"#)
            .unwrap();
    assert!(event.id.is_none());
    assert_eq!(event.method.as_deref(), Some("Page.loadEventFired"));
}

#[test]
fn test_target_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "Test",
        "url": "https://example.com",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
    }"#;
    let target: Target = serde_json::from_str(json).unwrap();
    assert_eq!(target.id, "page123");
    assert_eq!(target.target_type, "page");
    assert!(target.is_page());
    assert_eq!(
        target.web_socket_debugger_url.as_deref(),
        Some("ws://localhost:9222/devtools/page/page123")
    );
}

#[test]
fn test_target_missing_fields_default() {
    let target: Target = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
    assert_eq!(target.id, "x");
    assert!(target.url.is_empty());
    assert!(!target.is_page());
}

#[test]
fn test_exception_message_prefers_description() {
    let details: ExceptionDetails = serde_json::from_value(serde_json::json!({
        "text": "Uncaught",
        "exception": {"type": "object", "description": "Error: boom"}
    }))
    .unwrap();
    assert_eq!(details.message(), "Error: boom");

    let bare: ExceptionDetails = serde_json::from_value(serde_json::json!({"text": "Uncaught"})).unwrap();
    assert_eq!(bare.message(), "Uncaught");
}
