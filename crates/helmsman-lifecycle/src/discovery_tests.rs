use super::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn live_endpoint() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "A1", "type": "page", "url": "https://www.example.com/"}
        ])))
        .mount(&server)
        .await;
    server
}

fn dead_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[test]
fn test_scan_range_follows_launcher_port() {
    let discovery = ProbePortDiscovery::default().with_scan_span(3);
    assert_eq!(discovery.ports_for(9000), vec![9001, 9002, 9003]);
}

#[test]
fn test_scan_range_at_top_of_port_space() {
    let discovery = ProbePortDiscovery::default();
    assert!(discovery.ports_for(u16::MAX).is_empty());
    assert_eq!(discovery.ports_for(u16::MAX - 1), vec![u16::MAX]);
}

#[test]
fn test_candidates_override_scan() {
    let discovery = ProbePortDiscovery::default().with_candidates(vec![9400, 9222]);
    assert_eq!(discovery.ports_for(9000), vec![9400, 9222]);
}

#[tokio::test]
async fn test_first_live_candidate_wins() {
    let server = live_endpoint().await;
    let live = server.address().port();
    let discovery = ProbePortDiscovery::default().with_candidates(vec![dead_port(), live]);

    assert_eq!(discovery.discover_instance_port(1).await, Some(live));
}

#[tokio::test]
async fn test_scan_finds_port_above_launcher() {
    let server = live_endpoint().await;
    let live = server.address().port();
    let discovery = ProbePortDiscovery::default().with_scan_span(1);

    assert_eq!(discovery.discover_instance_port(live - 1).await, Some(live));
}

#[tokio::test]
async fn test_no_live_port() {
    let discovery = ProbePortDiscovery::default().with_candidates(vec![dead_port()]);
    assert_eq!(discovery.discover_instance_port(1).await, None);
}
