//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;

use egress_hub::executor::PathExecutor;
use egress_hub::{HubRequest, HubResponse};

/// Start a programmable mock server on an ephemeral port. The closure
/// receives the raw request head and returns `(status, body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
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
                        let head = read_head(&mut socket).await;
                        let (status, body) = f(head).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a mock server that always answers `200` with `body`.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { (200, body.to_string()) }).await
}

/// An address with nothing listening on it.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Scripted behaviour for one executor call.
#[derive(Debug, Clone)]
pub enum Step {
    /// Succeed after the given latency.
    Ok(Duration),
    /// Fail with the given error.
    Fail(&'static str),
}

/// Executor driven by per-path scripts. Once a path's script runs out its
/// fallback step repeats; paths without either fail.
#[derive(Default)]
pub struct ScriptedExecutor {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    fallback: Mutex<HashMap<String, Step>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, path: &str, steps: impl IntoIterator<Item = Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(path.to_string(), steps.into_iter().collect());
        self
    }

    pub fn always(self, path: &str, step: Step) -> Self {
        self.fallback.lock().unwrap().insert(path.to_string(), step);
        self
    }

    /// Paths called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    /// Start times of the calls made to `path`.
    pub fn call_times(&self, path: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, t)| *t)
            .collect()
    }

    fn next_step(&self, path: &str) -> Step {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), Instant::now()));
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(|s| s.pop_front());
        scripted
            .or_else(|| self.fallback.lock().unwrap().get(path).cloned())
            .unwrap_or(Step::Fail("unscripted"))
    }
}

impl PathExecutor for ScriptedExecutor {
    fn execute(
        &self,
        path: &str,
        _request: &HubRequest,
    ) -> impl Future<Output = HubResponse> + Send {
        let step = self.next_step(path);
        let path = path.to_string();
        async move {
            match step {
                Step::Ok(latency) => {
                    tokio::time::sleep(latency).await;
                    HubResponse::from_status(path, 200, Default::default(), "ok".into(), latency)
                }
                Step::Fail(error) => HubResponse::transport_failure(path, error, Duration::ZERO),
            }
        }
    }
}

/// Shared handle so tests can inspect the executor after handing it to a hub.
pub struct Shared(pub Arc<ScriptedExecutor>);

impl PathExecutor for Shared {
    fn execute(
        &self,
        path: &str,
        request: &HubRequest,
    ) -> impl Future<Output = HubResponse> + Send {
        self.0.execute(path, request)
    }
}
