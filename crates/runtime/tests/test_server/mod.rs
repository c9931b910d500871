//! In-process stand-in for the remote orchestration service.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct Recorded {
	pub starts: Vec<Value>,
	pub kills: Vec<Value>,
	pub fail_start: bool,
	pub fail_kill: bool,
}

pub struct TestServer {
	addr: SocketAddr,
	state: Arc<Mutex<Recorded>>,
	handle: JoinHandle<()>,
}

impl TestServer {
	pub async fn start() -> Self {
		let state = Arc::new(Mutex::new(Recorded::default()));
		let app = Router::new()
			.route("/sync_gateway/start", post(start))
			.route("/sync_gateway/kill", post(kill))
			.with_state(Arc::clone(&state));

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let handle = tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});

		Self { addr, state, handle }
	}

	pub fn url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn state(&self) -> &Arc<Mutex<Recorded>> {
		&self.state
	}

	pub fn shutdown(self) {
		self.handle.abort();
	}
}

async fn start(State(state): State<Arc<Mutex<Recorded>>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
	let mut state = state.lock();
	if state.fail_start {
		return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "no free slot"})));
	}
	state.starts.push(body.clone());
	let handle = format!("sg-{}", state.starts.len());
	(StatusCode::OK, Json(json!({"handle": handle, "config": body["config"]})))
}

async fn kill(State(state): State<Arc<Mutex<Recorded>>>, Json(body): Json<Value>) -> StatusCode {
	let mut state = state.lock();
	if state.fail_kill {
		return StatusCode::NOT_FOUND;
	}
	state.kills.push(body);
	StatusCode::OK
}
