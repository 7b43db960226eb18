//! Local HTTP/1.1 server answering canned JSON, for exercising
//! `ApiClient` over a real socket.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

type Routes = Arc<Mutex<HashMap<String, (u16, String)>>>;

pub struct StubServer {
    addr: SocketAddr,
    routes: Routes,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Routes = Arc::default();
        let requests: Arc<Mutex<Vec<String>>> = Arc::default();

        let (accept_routes, accept_requests) = (routes.clone(), requests.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, accept_routes.clone(), accept_requests.clone()));
            }
        });

        Self {
            addr,
            routes,
            requests,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Answer `method path` (query ignored) with `status` and `body`.
    pub fn route(&self, method: &str, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), (status, body.to_string()));
    }

    /// Request lines seen so far, as `METHOD /path?query`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests for `method path`, any query.
    pub fn hits(&self, method: &str, path: &str) -> usize {
        let route = format!("{method} {path}");
        self.requests()
            .iter()
            .filter(|request| request.split('?').next() == Some(route.as_str()))
            .count()
    }
}

async fn serve(stream: TcpStream, routes: Routes, requests: Arc<Mutex<Vec<String>>>) {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);

    loop {
        let mut request_line = String::new();
        match reader.read_line(&mut request_line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }

        let mut content_length = 0;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).await.unwrap_or(0) == 0 {
                return;
            }
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }
        let mut body = vec![0; content_length];
        if reader.read_exact(&mut body).await.is_err() {
            return;
        }

        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let target = parts.next().unwrap_or_default().to_string();
        let path = target.split('?').next().unwrap_or_default();
        let (status, answer) = routes
            .lock()
            .unwrap()
            .get(&format!("{method} {path}"))
            .cloned()
            .unwrap_or((404, String::new()));
        requests.lock().unwrap().push(format!("{method} {target}"));

        let response = format!(
            "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{answer}",
            reason(status),
            answer.len()
        );
        if write.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        _ => "Status",
    }
}
