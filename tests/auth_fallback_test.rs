use anyhow::Result;
use async_trait::async_trait;
use httpmock::prelude::*;
use ocpi_cli::core::{OcpiRequest, Transport, TransportOutcome};
use ocpi_cli::{
    Endpoint, HttpTransport, InterfaceRole, ModuleId, OcpiClient, OcpiError, RoutingParties,
    Session,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_test::{assert_err, assert_ok};

const TOKEN: &str = "ebf3b399-779f-4497-9b9d-ac6ad3cc44d2";
const ENCODED: &str = "Token ZWJmM2IzOTktNzc5Zi00NDk3LTliOWQtYWM2YWQzY2M0NGQy";
const PLAIN: &str = "Token ebf3b399-779f-4497-9b9d-ac6ad3cc44d2";

/// 計算實際送出的呼叫次數
struct CountingTransport {
    inner: HttpTransport,
    calls: AtomicUsize,
}

impl CountingTransport {
    fn new() -> Self {
        Self {
            inner: HttpTransport::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for CountingTransport {
    async fn invoke(&self, request: &OcpiRequest, authorization: &str) -> TransportOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.invoke(request, authorization).await
    }
}

fn session(version: &str, sessions_url: String) -> Session {
    Session {
        token: TOKEN.to_string(),
        version: version.to_string(),
        party_id: "NLABC".to_string(),
        endpoints: vec![Endpoint {
            identifier: "sessions".to_string(),
            url: sessions_url,
            role: Some(InterfaceRole::Sender),
        }],
    }
}

fn page(items: serde_json::Value) -> serde_json::Value {
    json!({
        "data": items,
        "status_code": 1000,
        "timestamp": "2024-03-01T12:00:00Z"
    })
}

#[tokio::test]
async fn test_2_2_encoded_rejected_then_plain_accepted() -> Result<()> {
    for version in ["2.2", "2.2.1"] {
        let server = MockServer::start();
        let encoded = server.mock(|when, then| {
            when.method(GET).path("/sessions").header("Authorization", ENCODED);
            then.status(401).body("Unknown token");
        });
        let plain = server.mock(|when, then| {
            when.method(GET).path("/sessions").header("Authorization", PLAIN);
            then.status(200).json_body(page(json!([{"id": "S1"}])));
        });

        let client = OcpiClient::new(session(version, server.url("/sessions")));
        let mut stream = client.stream(ModuleId::Sessions, RoutingParties::default());
        let batch = stream.pull(10).await?.expect("one page");

        assert_eq!(batch.items, vec![json!({"id": "S1"})]);
        encoded.assert_hits(1);
        plain.assert_hits(1);
    }
    Ok(())
}

#[tokio::test]
async fn test_2_1_1_plain_rejected_then_encoded_accepted() -> Result<()> {
    let server = MockServer::start();
    let plain = server.mock(|when, then| {
        when.method(GET).path("/sessions").header("Authorization", PLAIN);
        then.status(403).body("Forbidden");
    });
    let encoded = server.mock(|when, then| {
        when.method(GET).path("/sessions").header("Authorization", ENCODED);
        then.status(200).json_body(page(json!([])));
    });

    let client = OcpiClient::new(session("2.1.1", server.url("/sessions")));
    let mut stream = client.stream(ModuleId::Sessions, RoutingParties::default());
    let batch = stream.pull(10).await?.expect("one page");

    assert!(batch.items.is_empty());
    assert!(batch.last);
    plain.assert_hits(1);
    encoded.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_both_encodings_rejected_reports_second_failure() -> Result<()> {
    let server = MockServer::start();
    let encoded = server.mock(|when, then| {
        when.method(GET).path("/sessions").header("Authorization", ENCODED);
        then.status(401).body("first");
    });
    let plain = server.mock(|when, then| {
        when.method(GET).path("/sessions").header("Authorization", PLAIN);
        then.status(401).body("second");
    });

    let client = OcpiClient::new(session("2.2", server.url("/sessions")));
    let mut stream = client.stream(ModuleId::Sessions, RoutingParties::default());
    let err = stream.pull(10).await.unwrap_err();

    assert!(matches!(err, OcpiError::Http { status: 401, ref body } if body == "second"));
    encoded.assert_hits(1);
    plain.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_server_error_is_never_retried() -> Result<()> {
    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(GET).path("/sessions");
        then.status(500).body("boom");
    });

    let client = OcpiClient::with_transport(
        session("2.2.1", server.url("/sessions")),
        CountingTransport::new(),
    );
    let mut stream = client.stream(ModuleId::Sessions, RoutingParties::default());
    let err = stream.pull(10).await.unwrap_err();

    assert!(matches!(err, OcpiError::Http { status: 500, .. }));
    failing.assert_hits(1);
    assert_eq!(client.transport().calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_connection_failure_is_never_retried() {
    // 沒有服務監聽的埠
    let client = OcpiClient::with_transport(
        session("2.2", "http://127.0.0.1:1/sessions".to_string()),
        CountingTransport::new(),
    );
    let mut stream = client.stream(ModuleId::Sessions, RoutingParties::default());

    let err = assert_err!(stream.pull(10).await);
    assert!(matches!(err, OcpiError::Connection(_)));
    assert_eq!(client.transport().calls(), 1);
}

#[tokio::test]
async fn test_invalid_party_makes_no_network_call() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.method(GET).path("/sessions");
        then.status(200).json_body(page(json!([])));
    });

    let client = OcpiClient::new(session("2.2", server.url("/sessions")));
    for party in ["nlabc", "N1ABC"] {
        let routing = RoutingParties::new(Some(party.to_string()), None);
        let mut stream = client.stream(ModuleId::Sessions, routing);
        let err = assert_err!(stream.pull(10).await);
        assert!(matches!(err, OcpiError::InvalidRoutingParty { .. }));
    }

    any.assert_hits(0);
}

#[tokio::test]
async fn test_routing_and_tracing_headers_are_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/sessions")
            .header("OCPI-from-country-code", "NL")
            .header("OCPI-from-party-id", "ABC")
            .header("OCPI-to-country-code", "DE")
            .header("OCPI-to-party-id", "XYZ")
            .header_exists("X-Request-ID")
            .header_exists("X-Correlation-ID");
        then.status(200).json_body(page(json!([{"id": "S1"}])));
    });

    let client = OcpiClient::new(session("2.2.1", server.url("/sessions")));
    let routing = RoutingParties::new(Some("NLABC".to_string()), Some("DEXYZ".to_string()));
    let mut stream = client.stream(ModuleId::Sessions, routing);

    assert_ok!(stream.pull(10).await);
    mock.assert();
}

type TracingIds = Arc<Mutex<Vec<(String, String)>>>;

async fn read_request_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn header_value(head: &str, name: &str) -> String {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

/// 記錄每個請求的追蹤 id；第一個請求回 401，之後回 200
async fn spawn_recording_platform() -> Result<(String, TracingIds)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/sessions", listener.local_addr()?);
    let seen: TracingIds = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&seen);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let head = read_request_head(&mut socket).await;
            let is_first = {
                let mut seen = recorded.lock().unwrap();
                seen.push((
                    header_value(&head, "X-Request-ID"),
                    header_value(&head, "X-Correlation-ID"),
                ));
                seen.len() == 1
            };

            let response = if is_first {
                "HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n".to_string()
            } else {
                let body = page(json!([{"id": "S1"}])).to_string();
                format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                )
            };
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    Ok((url, seen))
}

#[tokio::test]
async fn test_retry_sends_fresh_tracing_ids() -> Result<()> {
    let (url, seen) = spawn_recording_platform().await?;

    let client = OcpiClient::new(session("2.2", url));
    let mut stream = client.stream(ModuleId::Sessions, RoutingParties::default());
    let batch = stream.pull(10).await?.expect("one page");
    assert_eq!(batch.items, vec![json!({"id": "S1"})]);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);

    let ids: Vec<&String> = seen.iter().flat_map(|(request, correlation)| [request, correlation]).collect();
    for id in &ids {
        assert!(uuid::Uuid::parse_str(id).is_ok(), "not a uuid: {:?}", id);
    }
    let distinct: HashSet<&String> = ids.iter().copied().collect();
    assert_eq!(distinct.len(), 4);
    Ok(())
}
