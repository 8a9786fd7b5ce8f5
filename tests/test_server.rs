//! End-to-end tests over loopback sockets

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use porthole::dispatch::{Dispatcher, FsAssets, RouteTable, StaticCredentials};
use porthole::http::parser::parse_http_response;
use porthole::http::response::{LOGIN_SUCCESS_BODY, NOT_FOUND_BODY, Response, StatusCode};
use porthole::server::{Server, ServerOptions, ServerState};

const PAGE: &[u8] = b"<html><body>test page</body></html>";

fn asset_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("porthole-server-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(dir.join("html")).unwrap();
    std::fs::write(dir.join("html").join("test.html"), PAGE).unwrap();
    dir
}

async fn start(name: &str) -> (Arc<Server>, JoinHandle<anyhow::Result<()>>) {
    let dispatcher = Dispatcher::new(
        RouteTable::site_default(),
        Arc::new(FsAssets::new(asset_dir(name))),
        Arc::new(StaticCredentials::default()),
    );
    let mut options = ServerOptions::new("127.0.0.1:0");
    options.poll_timeout = Duration::from_millis(20);

    let server = Server::bind(options, dispatcher).await.unwrap();
    let runner = tokio::spawn({
        let server = Arc::clone(&server);
        async move { server.run().await }
    });
    (server, runner)
}

async fn exchange(server: &Server, raw: &[u8]) -> Response {
    let mut client = TcpStream::connect(server.local_addr()).await.unwrap();
    client.write_all(raw).await.unwrap();

    let mut buf = Vec::new();
    timeout(Duration::from_secs(5), client.read_to_end(&mut buf))
        .await
        .expect("server should close the connection after responding")
        .unwrap();

    let (response, _) = parse_http_response(&buf).unwrap();
    response
}

async fn wait_for_connections(server: &Server, count: usize) {
    timeout(Duration::from_secs(5), async {
        while server.active_connections() != count {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("connections should be registered");
}

async fn stop_and_join(server: &Server, runner: JoinHandle<anyhow::Result<()>>) {
    server.stop();
    timeout(Duration::from_secs(5), runner)
        .await
        .expect("accept loop should exit")
        .unwrap()
        .unwrap();
    timeout(Duration::from_secs(5), server.shutdown())
        .await
        .expect("shutdown should join every worker");
}

#[tokio::test]
async fn test_get_page_end_to_end() {
    let (server, runner) = start("get").await;

    let response = exchange(&server, b"GET /test.html HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

    assert_eq!(response.status(), StatusCode::Ok);
    assert_eq!(response.version(), "HTTP/1.1");
    assert_eq!(response.header("Content-Type"), Some("text/html"));
    assert_eq!(response.body(), PAGE);

    stop_and_join(&server, runner).await;
    assert_eq!(server.state(), ServerState::Stopped);
}

#[tokio::test]
async fn test_unknown_path_end_to_end() {
    let (server, runner) = start("missing").await;

    let response = exchange(&server, b"GET /nowhere HTTP/1.0\r\n\r\n").await;

    assert_eq!(response.status(), StatusCode::NotFound);
    assert_eq!(response.version(), "HTTP/1.0");
    assert_eq!(response.body(), NOT_FOUND_BODY.as_bytes());

    stop_and_join(&server, runner).await;
}

#[tokio::test]
async fn test_login_end_to_end() {
    let (server, runner) = start("login").await;

    let body = "login=username&pass=password";
    let raw = format!(
        "POST /dopost HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let response = exchange(&server, raw.as_bytes()).await;
    assert_eq!(response.status(), StatusCode::Ok);
    assert_eq!(response.body(), LOGIN_SUCCESS_BODY.as_bytes());

    let body = "login=username&pass=nope";
    let raw = format!(
        "POST /dopost HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let response = exchange(&server, raw.as_bytes()).await;
    assert_eq!(response.status(), StatusCode::Forbidden);

    stop_and_join(&server, runner).await;
}

#[tokio::test]
async fn test_malformed_request_gets_bad_request() {
    let (server, runner) = start("malformed").await;

    let response = exchange(&server, b"nonsense\r\n\r\n").await;

    assert_eq!(response.status(), StatusCode::BadRequest);

    stop_and_join(&server, runner).await;
}

#[tokio::test]
async fn test_connection_released_after_exchange() {
    let (server, runner) = start("release").await;

    exchange(&server, b"GET / HTTP/1.1\r\n\r\n").await;
    wait_for_connections(&server, 0).await;

    let lines = server.drain_output();
    assert!(lines.iter().any(|l| l.starts_with("[INFO] Received request from")));
    assert!(lines.iter().any(|l| l.starts_with("[INFO] GET / HTTP/1.1 from")));
    assert!(lines.iter().any(|l| l.starts_with("[INFO] Sent response to")));
    assert!(lines.iter().any(|l| l.starts_with("[INFO] Released client")));
    assert!(server.drain_output().is_empty());

    stop_and_join(&server, runner).await;
}

#[tokio::test]
async fn test_shutdown_without_connections() {
    let (server, runner) = start("idle").await;
    sleep(Duration::from_millis(20)).await;
    assert!(server.is_running());

    stop_and_join(&server, runner).await;

    assert_eq!(server.state(), ServerState::Stopped);
    assert_eq!(server.active_connections(), 0);
    let lines = server.drain_output();
    assert!(lines.contains(&"[INFO] Stopping the server...".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("[INFO] Released the server."));
}

#[tokio::test]
async fn test_shutdown_cancels_idle_connections() {
    let (server, runner) = start("cancel").await;

    let mut clients = Vec::new();
    for _ in 0..4 {
        clients.push(TcpStream::connect(server.local_addr()).await.unwrap());
    }
    wait_for_connections(&server, 4).await;

    stop_and_join(&server, runner).await;

    assert_eq!(server.active_connections(), 0);
    assert_eq!(server.state(), ServerState::Stopped);

    // Every idle client sees its socket closed without a response
    for mut client in clients {
        let mut buf = Vec::new();
        let read = timeout(Duration::from_secs(5), client.read_to_end(&mut buf))
            .await
            .unwrap();
        if read.is_ok() {
            assert!(buf.is_empty());
        }
    }
}

#[tokio::test]
async fn test_stop_before_run() {
    let dispatcher = Dispatcher::new(
        RouteTable::site_default(),
        Arc::new(FsAssets::new(asset_dir("early"))),
        Arc::new(StaticCredentials::default()),
    );
    let server = Server::bind(ServerOptions::new("127.0.0.1:0"), dispatcher)
        .await
        .unwrap();
    assert_eq!(server.state(), ServerState::Created);

    server.stop();
    assert_eq!(server.state(), ServerState::Stopping);

    // The accept loop refuses to start once stopped
    timeout(Duration::from_secs(1), server.run())
        .await
        .unwrap()
        .unwrap();

    server.shutdown().await;
    assert_eq!(server.state(), ServerState::Stopped);

    // A second stop is a no-op
    server.stop();
    assert_eq!(server.state(), ServerState::Stopped);
}

#[tokio::test]
async fn test_output_message_writes_lines() {
    let (server, runner) = start("output").await;
    stop_and_join(&server, runner).await;

    let mut out = Vec::new();
    assert!(server.output_message(&mut out).unwrap());
    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().all(|l| l.starts_with("[INFO] ") || l.starts_with("[ERR] ")));
    assert!(text.ends_with("[INFO] Released the server.\n"));

    let mut out = Vec::new();
    assert!(!server.output_message(&mut out).unwrap());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_shutdown_while_client_keeps_sending() {
    let (server, runner) = start("trickle").await;

    let mut client = TcpStream::connect(server.local_addr()).await.unwrap();
    client.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();
    wait_for_connections(&server, 1).await;

    let trickle = tokio::spawn(async move {
        loop {
            if client.write_all(b"X").await.is_err() {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
    });
    sleep(Duration::from_millis(60)).await;

    stop_and_join(&server, runner).await;

    assert_eq!(server.active_connections(), 0);
    assert_eq!(server.state(), ServerState::Stopped);
    trickle.abort();
}

#[tokio::test]
async fn test_id_exhaustion_rejects_and_reuses() {
    let (server, runner) = start("exhaust").await;

    let mut clients = Vec::new();
    for _ in 0..255 {
        clients.push(TcpStream::connect(server.local_addr()).await.unwrap());
    }
    wait_for_connections(&server, 255).await;

    // Every id is taken: the next client is closed without a response
    let mut rejected = TcpStream::connect(server.local_addr()).await.unwrap();
    let mut buf = Vec::new();
    let read = timeout(Duration::from_secs(5), rejected.read_to_end(&mut buf))
        .await
        .expect("rejected client should be closed");
    if read.is_ok() {
        assert!(buf.is_empty());
    }
    assert_eq!(server.active_connections(), 255);

    timeout(Duration::from_secs(5), async {
        let expected = "[ERR] Server Wait For Client failed: no free client id";
        while !server.drain_output().iter().any(|l| l == expected) {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("exhaustion should be reported");

    // Releasing one connection frees its id for the next client
    drop(clients.pop());
    wait_for_connections(&server, 254).await;

    clients.push(TcpStream::connect(server.local_addr()).await.unwrap());
    wait_for_connections(&server, 255).await;
    assert!(!server.drain_output().iter().any(|l| l.starts_with("[ERR]")));

    stop_and_join(&server, runner).await;
    assert_eq!(server.active_connections(), 0);
}
