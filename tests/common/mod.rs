//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use url_loader::config::LoaderConfig;
use url_loader::service::{Listener, LoaderServer};

/// A programmable mock origin server.
///
/// Bind first so tests know the address, then install the per-request
/// handler; each request gets (status, headers, body) from the handler.
pub struct MockOrigin {
    listener: TcpListener,
    addr: SocketAddr,
}

impl MockOrigin {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        Self { listener, addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn serve<F, Fut>(self, handler: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = (u16, Vec<(String, String)>, String)> + Send + 'static,
    {
        let handler = Arc::new(handler);
        tokio::spawn(async move {
            loop {
                match self.listener.accept().await {
                    Ok((mut socket, _)) => {
                        let handler = handler.clone();
                        tokio::spawn(async move {
                            read_request_head(&mut socket).await;
                            let (status, headers, body) = handler().await;
                            let mut response = format!(
                                "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                                status,
                                status_text(status),
                                body.len()
                            );
                            for (name, value) in headers {
                                response.push_str(&format!("{}: {}\r\n", name, value));
                            }
                            response.push_str("\r\n");
                            response.push_str(&body);
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });
    }
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => break,
        }
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Start a loader service on an ephemeral port; returns its address.
pub async fn start_loader_service(mut config: LoaderConfig) -> SocketAddr {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = LoaderServer::new(&config);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

/// One caller connection to the loader service.
pub struct ServiceClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl ServiceClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    /// Send one call and wait for its single reply line.
    pub async fn call(&mut self, payload: serde_json::Value) -> serde_json::Value {
        let mut line = serde_json::to_string(&payload).unwrap();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();

        let mut reply = String::new();
        self.reader.read_line(&mut reply).await.unwrap();
        serde_json::from_str(&reply).unwrap()
    }
}
