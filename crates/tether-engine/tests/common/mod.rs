#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tether_cdp::TargetDirectory;
use tether_engine::{CdpRemote, TetherConfig};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// How the fake editor answers one request.
pub enum Reply {
    Result(Value),
    Error(i64, String),
    /// Never answer.
    Silent,
}

pub type Responder = Arc<dyn Fn(&str, &Value) -> Reply + Send + Sync>;

/// Discovery endpoint plus control channel of a pretend editor.
pub struct FakeEditor {
    pub http: MockServer,
    pub ws_addr: SocketAddr,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    connections: Arc<AtomicUsize>,
    close_frames: Arc<AtomicUsize>,
}

impl FakeEditor {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
    {
        Self::start_titled("MyProject - Antigravity", responder).await
    }

    pub async fn start_titled<F>(title: &str, responder: F) -> Self
    where
        F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_addr = listener.local_addr().unwrap();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let close_frames = Arc::new(AtomicUsize::new(0));
        let responder: Responder = Arc::new(responder);

        {
            let requests = Arc::clone(&requests);
            let connections = Arc::clone(&connections);
            let close_frames = Arc::clone(&close_frames);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(serve_connection(
                        stream,
                        Arc::clone(&responder),
                        Arc::clone(&requests),
                        Arc::clone(&close_frames),
                    ));
                }
            });
        }

        let http = MockServer::start().await;
        let targets = json!([
            {
                "id": "LP",
                "type": "page",
                "title": "Antigravity - Launchpad",
                "url": "app://launchpad",
                "webSocketDebuggerUrl": format!("ws://{}/devtools/page/LP", ws_addr)
            },
            {
                "id": "WB",
                "type": "page",
                "title": title,
                "url": "vscode-file://vscode-app/workbench.html",
                "webSocketDebuggerUrl": format!("ws://{}/devtools/page/WB", ws_addr)
            }
        ]);
        Mock::given(method("GET"))
            .and(path("/json/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(targets))
            .mount(&http)
            .await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Browser": "Chrome/132.0.6834.210",
                "Protocol-Version": "1.3",
                "User-Agent": "Mozilla/5.0 Antigravity/1.0"
            })))
            .mount(&http)
            .await;

        Self {
            http,
            ws_addr,
            requests,
            connections,
            close_frames,
        }
    }

    pub fn remote(&self) -> CdpRemote {
        self.remote_with(TetherConfig::default())
    }

    pub fn remote_with(&self, config: TetherConfig) -> CdpRemote {
        let directory = TargetDirectory::with_base_url(self.http.uri(), Duration::from_secs(2)).unwrap();
        CdpRemote::new(directory, config)
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests().into_iter().map(|(m, _)| m).collect()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Wait until `expected` close frames arrived, then return the final count.
    pub async fn close_frames_after(&self, expected: usize) -> usize {
        for _ in 0..100 {
            if self.close_frames.load(Ordering::SeqCst) >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        // Give a duplicate close a chance to show up.
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.close_frames.load(Ordering::SeqCst)
    }
}

async fn serve_connection(
    stream: TcpStream,
    responder: Responder,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    close_frames: Arc<AtomicUsize>,
) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };
    while let Some(Ok(msg)) = ws.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => {
                close_frames.fetch_add(1, Ordering::SeqCst);
                break;
            }
            _ => continue,
        };
        let request: Value = serde_json::from_str(&text).unwrap();
        let id = request["id"].clone();
        let method = request["method"].as_str().unwrap_or_default().to_string();
        let params = request["params"].clone();
        requests.lock().unwrap().push((method.clone(), params.clone()));

        let frame = match responder(&method, &params) {
            Reply::Result(result) => json!({"id": id, "result": result}),
            Reply::Error(code, message) => json!({"id": id, "error": {"code": code, "message": message}}),
            Reply::Silent => continue,
        };
        if ws.send(Message::Text(frame.to_string())).await.is_err() {
            break;
        }
    }
}

/// Wrap a snippet's return value the way `Runtime.evaluate` reports it.
pub fn evaluated(value: Value) -> Reply {
    Reply::Result(json!({"result": {"type": "object", "value": value}}))
}

/// Whether an evaluate request runs the given snippet.
pub fn runs(params: &Value, snippet: &str) -> bool {
    params["expression"]
        .as_str()
        .is_some_and(|expr| expr.contains(snippet.trim()))
}
