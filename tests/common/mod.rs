#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// What the fake backend answers on one endpoint.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(StatusCode),
    /// 200 with a body that is not valid JSON.
    Garbage,
    /// Holds the answer until `path` is requested after this request. Gives
    /// up with 504 after `HOLD_TIMEOUT`.
    After { path: &'static str, reply: Box<Reply> },
}

pub const HOLD_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Debug)]
struct Inner {
    replies: HashMap<&'static str, Reply>,
    requests: Vec<Request>,
}

/// In-process stand-in for the bot's metrics backend.
#[derive(Debug, Clone)]
pub struct FakeBackend {
    inner: Arc<Mutex<Inner>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let replies = HashMap::from([
            ("/metrics", Reply::Json(sample_metrics())),
            ("/comments", Reply::Json(sample_comments())),
            ("/recent-activity", Reply::Json(json!([{ "id": 1 }]))),
            ("/platform-stats", Reply::Json(json!({ "total": 4 }))),
        ]);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                replies,
                requests: Vec::new(),
            })),
        }
    }

    pub fn set_reply(&self, path: &'static str, reply: Reply) {
        self.inner.lock().unwrap().replies.insert(path, reply);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }

    /// Serves the fake on an ephemeral port of the current runtime and
    /// returns its base URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/metrics", get(metrics))
            .route("/comments", get(comments))
            .route("/recent-activity", get(recent_activity))
            .route("/platform-stats", get(platform_stats))
            .with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn answer(&self, path: &'static str, query: HashMap<String, String>) -> Response {
        let (seen, reply) = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(Request {
                path: path.to_string(),
                query,
            });
            (inner.requests.len(), inner.replies.get(path).cloned())
        };

        let mut reply = reply;
        while let Some(Reply::After { path: awaited, reply: then }) = reply {
            if !self.requested_since(awaited, seen).await {
                return (StatusCode::GATEWAY_TIMEOUT, "held too long").into_response();
            }
            reply = Some(*then);
        }

        match reply {
            Some(Reply::Json(value)) => Json(value).into_response(),
            Some(Reply::Status(status)) => (status, "backend failure").into_response(),
            Some(Reply::Garbage) => (StatusCode::OK, "{not json").into_response(),
            Some(Reply::After { .. }) | None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn requested_since(&self, path: &str, seen: usize) -> bool {
        let deadline = Instant::now() + HOLD_TIMEOUT;
        loop {
            let found = self.inner.lock().unwrap().requests[seen..]
                .iter()
                .any(|request| request.path == path);
            if found {
                return true;
            }
            if Instant::now() > deadline {
                return false;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn metrics(
    State(fake): State<FakeBackend>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.answer("/metrics", query).await
}

async fn comments(
    State(fake): State<FakeBackend>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.answer("/comments", query).await
}

async fn recent_activity(
    State(fake): State<FakeBackend>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.answer("/recent-activity", query).await
}

async fn platform_stats(
    State(fake): State<FakeBackend>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.answer("/platform-stats", query).await
}

pub fn sample_metrics() -> Value {
    json!({
        "reddit": { "comment_posted": 3, "comment_failed": 1 }
    })
}

pub fn sample_comments() -> Value {
    json!([
        {
            "id": 1,
            "platform": "reddit",
            "subreddit": "rust",
            "post_title": "How do lifetimes work?",
            "comment_text": "Think of them as scopes the compiler checks.",
            "action_type": "comment_posted",
            "timestamp": "2024-01-05T10:00:00.123456",
            "success": true,
            "error": null
        },
        {
            "id": 2,
            "platform": "reddit",
            "subreddit": "programming",
            "post_title": null,
            "comment_text": null,
            "action_type": "comment_generated",
            "timestamp": "2024-01-04T08:30:00",
            "success": false,
            "error": "rate limited"
        }
    ])
}

/// A base URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
