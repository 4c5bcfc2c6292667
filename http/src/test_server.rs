//! Minimal HTTP/1.1 server for client tests
//!
//! Routes:
//! - `/hello`: 200 with `hello world`
//! - `/fail`: 500
//! - `/unavailable`: 503
//! - `/redirect`: 302 to `/hello`
//! - `/loop`: 302 to `/loop`
//! - `/hang`: never answers

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub(crate) struct TestServer {
    addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub(crate) async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(stream));
            }
        });
        Self { addr, handle }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Address nothing listens on
pub(crate) async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn handle_connection(mut stream: TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&head);
    let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();

    let response = match path.as_str() {
        "/hello" => response("200 OK", &[], "hello world"),
        "/fail" => response("500 Internal Server Error", &[], "boom"),
        "/unavailable" => response("503 Service Unavailable", &[], ""),
        "/redirect" => response("302 Found", &["Location: /hello"], ""),
        "/loop" => response("302 Found", &["Location: /loop"], ""),
        "/hang" => {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            return;
        }
        _ => response("404 Not Found", &[], ""),
    };

    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn response(status: &str, headers: &[&str], body: &str) -> String {
    let mut out = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for header in headers {
        out.push_str(header);
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    out.push_str(body);
    out
}
