//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use artist_search::SearchConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a programmable mock catalog on an ephemeral port.
///
/// `f` receives the request target (path and query) and returns the status
/// code and body to send back.
pub async fn start_mock_catalog<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let target = match read_request_target(&mut socket).await {
                            Some(t) => t,
                            None => return,
                        };
                        let (status, body) = f(target).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read the request head and return the target of the request line.
async fn read_request_target(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let request_line = head.lines().next()?;
    request_line.split_whitespace().nth(1).map(str::to_string)
}

/// Config pointing at a mock catalog.
pub fn config_for(addr: SocketAddr) -> SearchConfig {
    let mut config = SearchConfig::default();
    config.api.base_url = format!("http://{}", addr);
    config.timeouts.request_ms = 2000;
    config
}

/// Canned artist search payload.
pub fn artist_page(id: u64, name: &str) -> String {
    serde_json::json!({
        "data": [{"id": id, "name": name, "type": "artist"}],
        "total": 1
    })
    .to_string()
}

/// Canned top tracks payload.
pub fn tracks_page(artist: &str, titles: &[&str]) -> String {
    let data: Vec<_> = titles
        .iter()
        .map(|title| {
            serde_json::json!({
                "title": title,
                "preview": format!("https://audio.test/{}.mp3", title),
                "artist": {"name": artist},
                "album": {"cover_medium": format!("https://img.test/{}.jpg", title)}
            })
        })
        .collect();
    serde_json::json!({"data": data, "total": titles.len()}).to_string()
}
