//! Scripted HTTP stub server for exercising the API client
//!
//! Binds a local listener and answers each incoming request with the next
//! response from a script, counting requests as they arrive. Responses are
//! written as raw HTTP/1.1 with `Connection: close`, so every request from
//! the client opens a fresh connection and the hit counter equals the number
//! of requests made.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One scripted response
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    /// A 200 response with a JSON body
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A response with an arbitrary status
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Binds the stub listener, returning it with its base URL
///
/// Two-phase setup so response bodies can embed the server's own address
/// (pagination next-links) before serving starts.
pub async fn bind_stub() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub server");
    let addr = listener.local_addr().expect("stub server has no address");
    (listener, format!("http://{addr}"))
}

/// Serves the scripted responses, one per request, in order
///
/// The last response repeats if more requests arrive than were scripted.
/// Returns the request counter.
pub fn serve_scripted(listener: TcpListener, responses: Vec<StubResponse>) -> Arc<AtomicUsize> {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let Some(response) = responses.get(n).or_else(|| responses.last()) else {
                break;
            };

            // Drain the request head; GET requests carry no body.
            let mut buf = [0u8; 4096];
            let mut head: Vec<u8> = Vec::new();
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(read) => {
                        head.extend_from_slice(&buf[..read]);
                        if head.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }

            let reply = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.status,
                reason(response.status),
                response.body.len(),
                response.body
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    hits
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        420 => "Enhance Your Calm",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Status",
    }
}
