#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::TcpListener as StdTcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static START: Once = Once::new();
static _GUARD: Lazy<Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> =
    Lazy::new(|| Mutex::new(None));

/// Initialize test environment: dotenv and tracing (stderr + file).
/// Idempotent: safe to call multiple times.
pub fn init() {
    START.call_once(|| {
        let _ = dotenvy::dotenv();
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .expect("env filter");

        // Daily rotating log file separate from app runtime logs
        let file_appender = rolling::daily("logs", "tests.log");
        let (file_nb, guard) = tracing_appender::non_blocking(file_appender);
        *_GUARD.lock().unwrap() = Some(guard); // retain guard for lifetime

        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_test_writer();

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_writer(file_nb);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();

        tracing::info!(target = "test_init", "Test tracing initialized (stderr + rotating file)");
    });
}

/// モックサーバーの応答
#[derive(Debug, Clone)]
pub enum Reply {
    Success(&'static str),
    Failure(Option<&'static str>),
    Status(u16),
    Garbage,
    /// 200 でそのまま返すJSON本文
    Json(&'static str),
    Delayed(Duration, Box<Reply>),
}

impl Reply {
    fn split_delay(self) -> (Duration, Reply) {
        match self {
            Reply::Delayed(d, inner) => {
                let (rest, reply) = inner.split_delay();
                (d + rest, reply)
            }
            other => (Duration::ZERO, other),
        }
    }
}

#[derive(Clone, Default)]
struct MockState {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    hits: Arc<Mutex<Vec<Value>>>,
    root_hits: Arc<AtomicUsize>,
}

impl MockState {
    /// 先頭から順に使い、最後の1つは使い回す
    fn next_reply(&self) -> Reply {
        let mut q = self.replies.lock().unwrap();
        if q.len() > 1 {
            q.pop_front().unwrap()
        } else {
            q.front().cloned().unwrap_or(Reply::Status(500))
        }
    }
}

/// アファメーションAPIのモック
pub struct MockBackend {
    pub base_url: String,
    hits: Arc<Mutex<Vec<Value>>>,
    root_hits: Arc<AtomicUsize>,
}

impl MockBackend {
    /// 生成エンドポイントが受け取ったJSONボディ
    pub fn hits(&self) -> Vec<Value> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }

    /// `GET /` を受けた回数
    pub fn root_hit_count(&self) -> usize {
        self.root_hits.load(Ordering::SeqCst)
    }
}

/// 別スレッドの専用ランタイムでモックを起動する。プロセス終了まで生きる。
pub fn spawn_backend(replies: Vec<Reply>) -> MockBackend {
    let state = MockState {
        replies: Arc::new(Mutex::new(replies.into())),
        hits: Arc::default(),
        root_hits: Arc::default(),
    };
    let hits = Arc::clone(&state.hits);
    let root_hits = Arc::clone(&state.root_hits);

    let router = Router::new()
        .route("/", get(health))
        .route("/api/generate-affirmation", post(generate))
        .route("/api/affirmations", get(history))
        .with_state(state);

    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind random port");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("mock runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, router).await.expect("mock server");
        });
    });

    MockBackend { base_url: format!("http://{addr}"), hits, root_hits }
}

/// 何も待ち受けていないURL
pub fn dead_url() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

async fn health(State(state): State<MockState>) -> Json<Value> {
    state.root_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "status": "healthy",
        "message": "AI Wellness Affirmation API is running",
        "version": "mock",
        "ai_enabled": false
    }))
}

async fn generate(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.hits.lock().unwrap().push(body.clone());
    let (delay, reply) = state.next_reply().split_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let id = state.hits.lock().unwrap().len();
    match reply {
        Reply::Success(text) => Json(json!({
            "success": true,
            "affirmation": text,
            "mood": body["mood"],
            "id": id,
            "ai_generated": false
        }))
        .into_response(),
        Reply::Failure(error) => Json(json!({"success": false, "error": error})).into_response(),
        Reply::Status(code) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({"error": "mock failure"})),
        )
            .into_response(),
        Reply::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
        Reply::Json(body) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Reply::Delayed(..) => unreachable!(),
    }
}

async fn history(State(state): State<MockState>) -> Json<Value> {
    let hits = state.hits.lock().unwrap().clone();
    let records: Vec<Value> = hits
        .iter()
        .enumerate()
        .map(|(i, body)| {
            json!({
                "id": i + 1,
                "mood": body["mood"],
                "situation": body["situation"],
                "affirmation": format!("stored #{}", i + 1),
                "timestamp": "2026-10-19T09:00:00",
                "ai_generated": false
            })
        })
        .collect();
    Json(json!({"success": true, "count": records.len(), "affirmations": records}))
}

/// ステータス行だけ返して本文の途中で切断するサーバー（1接続のみ）
pub fn spawn_truncated_status(code: u16) -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind random port");
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            read_request(&mut stream);
            let head = format!("HTTP/1.1 {code} Oops\r\nContent-Length: 100\r\n\r\npartial");
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.flush();
            // ここで drop して接続を閉じる
        }
    });
    format!("http://{addr}")
}

/// ヘッダーと Content-Length 分の本文を読み切る（未読のまま閉じるとRSTになるため）
fn read_request(stream: &mut std::net::TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let Ok(n) = stream.read(&mut buf) else { return };
        if n == 0 {
            return;
        }
        data.extend_from_slice(&buf[..n]);
        let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else { continue };
        let head = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if data.len() >= end + 4 + body_len {
            return;
        }
    }
}

/// 条件が満たされるまで `step` を回す（最大 `timeout`）
pub fn spin_until(timeout: Duration, mut step: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if step() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    step()
}
