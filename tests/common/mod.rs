use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Response, StatusCode, Uri, header};
use tokio::sync::oneshot;

/// Canned answer for one request.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
    pub location: Option<String>,
}

#[allow(dead_code)]
impl Reply {
    pub fn json(value: serde_json::Value) -> Self {
        Self::status_json(200, value)
    }

    pub fn status_json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            body: value.to_string(),
            content_type: "application/json",
            location: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: "text/plain",
            location: None,
        }
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            status: 302,
            body: String::new(),
            content_type: "text/html",
            location: Some(to.to_string()),
        }
    }
}

/// A request the stub saw.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
}

#[allow(dead_code)]
impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Default)]
struct Script {
    /// Replies per `(method, path)`; the last one repeats.
    replies: HashMap<(String, String), VecDeque<Reply>>,
    seen: Vec<Recorded>,
}

/// In-process HTTP server answering from a script. Stops on drop.
pub struct StubServer {
    pub base_url: String,
    script: Arc<Mutex<Script>>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

#[allow(dead_code)]
impl StubServer {
    /// Queues `reply` for `method path`.
    pub fn on(&self, method: &str, path: &str, reply: Reply) -> &Self {
        let mut script = self.script.lock().unwrap();
        script
            .replies
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.script.lock().unwrap().seen.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

async fn answer(
    State(script): State<Arc<Mutex<Script>>>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response<Body> {
    let reply = {
        let mut script = script.lock().unwrap();
        script.seen.push(Recorded {
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            body,
        });
        let key = (method.to_string(), uri.path().to_string());
        script.replies.get_mut(&key).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        })
    };
    let reply = reply.unwrap_or_else(|| {
        Reply::status_json(404, serde_json::json!({ "message": "no stub for this route" }))
    });

    let mut builder = Response::builder()
        .status(StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        .header(header::CONTENT_TYPE, reply.content_type);
    if let Some(to) = &reply.location {
        builder = builder.header(header::LOCATION, to);
    }
    builder.body(Body::from(reply.body)).unwrap()
}

pub fn spawn_stub() -> Result<StubServer> {
    let script = Arc::new(Mutex::new(Script::default()));
    let (addr_tx, addr_rx) = std::sync::mpsc::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().fallback(answer).with_state(script.clone());
    let thread = thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("build runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind stub");
            let addr = listener.local_addr().expect("stub addr");
            let _ = addr_tx.send(addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve stub");
        });
    });

    let addr = addr_rx.recv().context("stub server did not start")?;
    Ok(StubServer {
        base_url: format!("http://{}", addr),
        script,
        shutdown: Some(shutdown_tx),
        thread: Some(thread),
    })
}

/// A base URL nothing listens on.
#[allow(dead_code)]
pub fn dead_base_url() -> Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").context("bind probe")?;
    let addr = listener.local_addr().context("probe addr")?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

/// Worksheet JSON in the shape `GET /rest/worksheets/<uuid>` returns.
#[allow(dead_code)]
pub fn worksheet_json(uuid: &str, blocks: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "uuid": uuid,
        "name": "home",
        "title": "Home",
        "revision": 7,
        "edit_permission": true,
        "blocks": blocks,
    })
}
