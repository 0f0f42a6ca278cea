//! Exercises `StepdClient` and the poller against a canned HTTP server.
//!
//! Each test binds a throwaway listener on localhost and answers requests
//! from a fixed list of responses.

use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use stepd_status::{
    Config, HealthSignal, PollOutcome, PollerConfig, PollerError, Protocol, StatusPoller,
    StepdClient,
};

/// Serve `responses` in order, one per connection, and report each raw request.
async fn serve(responses: Vec<(u16, String)>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for (code, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = stream.read(&mut buf).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());

            let response = format!(
                "HTTP/1.1 {code} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });

    (format!("http://{addr}/api"), rx)
}

fn config_for(base_url: String) -> Config {
    Config {
        base_url,
        request_timeout_ms: 2000,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_fetch_status_parses_running_payload() {
    let body = json!({"status": "Running...", "updating": false, "running": true}).to_string();
    let (base_url, mut requests) = serve(vec![(200, body)]).await;
    let client = StepdClient::new(&Config {
        api_key: Some("secret".to_string()),
        ..config_for(base_url)
    })
    .unwrap();

    let report = client.fetch_status().await.unwrap();
    assert_eq!(report.status, "Running...");
    assert!(!report.updating);
    assert_eq!(report.signal, HealthSignal::Running(true));

    let request = requests.recv().await.unwrap();
    assert!(request.starts_with("GET /api/plugin/stepd HTTP/1.1"), "{request}");
    assert!(request.to_ascii_lowercase().contains("x-api-key: secret"));
}

#[tokio::test]
async fn test_fetch_status_accepts_success_field() {
    let body = json!({
        "status": "Updating...",
        "updating": true,
        "success": false,
        "settings": {"port": "/dev/ttyUSB0"}
    })
    .to_string();
    let (base_url, _requests) = serve(vec![(200, body)]).await;
    let client = StepdClient::new(&config_for(base_url)).unwrap();

    let report = client.fetch_status().await.unwrap();
    assert_eq!(report.signal, HealthSignal::Success(false));
    assert_eq!(report.settings, Some(json!({"port": "/dev/ttyUSB0"})));
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let (base_url, _requests) = serve(vec![(503, "{}".to_string())]).await;
    let client = StepdClient::new(&config_for(base_url)).unwrap();

    match client.fetch_status().await {
        Err(PollerError::Status { path, status }) => {
            assert_eq!(path, "/plugin/stepd");
            assert_eq!(status.as_u16(), 503);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_body_is_malformed() {
    let (base_url, _requests) = serve(vec![(200, "<html>oops</html>".to_string())]).await;
    let client = StepdClient::new(&config_for(base_url)).unwrap();

    let err = client.fetch_status().await.unwrap_err();
    assert!(matches!(err, PollerError::Malformed(_)), "{err:?}");
}

#[tokio::test]
async fn test_pinned_protocol_rejects_other_version() {
    let body = json!({"status": "Running...", "updating": false, "running": true}).to_string();
    let (base_url, _requests) = serve(vec![(200, body)]).await;
    let client = StepdClient::new(&Config {
        protocol: Protocol::Success,
        ..config_for(base_url)
    })
    .unwrap();

    let err = client.fetch_status().await.unwrap_err();
    assert!(matches!(err, PollerError::Malformed(_)), "{err:?}");
}

#[tokio::test]
async fn test_poller_keeps_state_when_server_goes_away() {
    let body = json!({"status": "Running...", "updating": false, "running": true}).to_string();
    let (base_url, _requests) = serve(vec![(200, body)]).await;
    let config = config_for(base_url);
    let client = StepdClient::new(&config).unwrap();
    let poller = StatusPoller::new(Arc::new(client), PollerConfig::from(&config));

    assert!(matches!(poller.poll().await, PollOutcome::Applied));
    assert_eq!(poller.status(), "Running...");
    assert!(!poller.failed());

    // The canned server only answers once; the next request cannot connect.
    let outcome = poller.poll().await;
    assert!(
        matches!(
            outcome,
            PollOutcome::Stale(PollerError::Http(_) | PollerError::Timeout(_))
        ),
        "{outcome:?}"
    );
    assert_eq!(poller.status(), "Running...");
    assert!(!poller.failed());
    assert!(!poller.is_polling());
}
