//! In-process stand-in for a Sync Gateway.
//!
//! Serves canned answers for a single database `db` with one user `alice`
//! and records every request it sees.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

pub const TOKEN: &str = "c5af80a0";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
	pub method: Method,
	pub path: String,
	pub query: Option<String>,
	pub cookie: Option<String>,
	pub authorization: Option<String>,
	pub content_type: Option<String>,
	pub body: Bytes,
}

impl RecordedRequest {
	pub fn json(&self) -> Value {
		serde_json::from_slice(&self.body).unwrap_or(Value::Null)
	}

	/// Decoded value of query parameter `name`.
	pub fn param(&self, name: &str) -> Option<String> {
		let query = self.query.as_deref()?;
		url::form_urlencoded::parse(query.as_bytes())
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.into_owned())
	}
}

#[derive(Default)]
pub struct Recorded {
	pub requests: Vec<RecordedRequest>,
}

impl Recorded {
	pub fn last(&self) -> RecordedRequest {
		self.requests.last().cloned().expect("no request recorded")
	}

	pub fn find(&self, method: Method, path: &str) -> Option<RecordedRequest> {
		self.requests.iter().rev().find(|r| r.method == method && r.path == path).cloned()
	}
}

pub struct TestServer {
	addr: SocketAddr,
	state: Arc<Mutex<Recorded>>,
	handle: JoinHandle<()>,
}

impl TestServer {
	pub async fn start() -> Self {
		let state = Arc::new(Mutex::new(Recorded::default()));
		let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let handle = tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});

		Self { addr, state, handle }
	}

	pub fn port(&self) -> u16 {
		self.addr.port()
	}

	pub fn state(&self) -> &Arc<Mutex<Recorded>> {
		&self.state
	}

	pub fn shutdown(self) {
		self.handle.abort();
	}
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
	headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn json_response(status: StatusCode, body: Value) -> Response {
	(status, [(header::CONTENT_TYPE, "application/json")], body.to_string()).into_response()
}

fn authorized(request: &RecordedRequest) -> bool {
	request.cookie.as_deref() == Some(format!("SyncGatewaySession={TOKEN}").as_str())
}

async fn handle(State(state): State<Arc<Mutex<Recorded>>>, request: Request) -> Response {
	let (parts, body) = request.into_parts();
	let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
	let recorded = RecordedRequest {
		method: parts.method.clone(),
		path: parts.uri.path().to_string(),
		query: parts.uri.query().map(str::to_string),
		cookie: header_value(&parts.headers, header::COOKIE),
		authorization: header_value(&parts.headers, header::AUTHORIZATION),
		content_type: header_value(&parts.headers, header::CONTENT_TYPE),
		body,
	};
	state.lock().requests.push(recorded.clone());
	respond(&recorded)
}

fn respond(request: &RecordedRequest) -> Response {
	let query = request.query.as_deref().unwrap_or("");
	match (request.method.clone(), request.path.as_str()) {
		(Method::GET, "/") => json_response(
			StatusCode::OK,
			json!({
				"couchdb": "Welcome",
				"vendor": {"name": "Couchbase Sync Gateway", "version": "3.1"},
				"version": "Couchbase Sync Gateway/3.1.0(1;abc) CE",
				"ADMIN": request.authorization.is_some()
			}),
		),
		(Method::GET, "/_config") => json_response(StatusCode::OK, json!({"interface": ":4984", "logging": {"console": {"log_level": "info"}}})),
		(Method::GET, "/_logging") => json_response(StatusCode::OK, json!({"HTTP": true, "CRUD": false})),
		(Method::PUT, "/_logging") | (Method::POST, "/_logging") => StatusCode::OK.into_response(),
		(Method::GET, "/_expvar") => json_response(StatusCode::OK, json!({"cmdline": ["sync_gateway"], "syncgateway": {"global": {"resource_utilization": {}}}})),
		(Method::POST, "/db/_session") => {
			let body = request.json();
			if body.get("password").is_none() {
				// admin-created session for a named user
				return json_response(
					StatusCode::OK,
					json!({"cookie_name": "SyncGatewaySession", "expires": "2026-10-20T10:00:00Z", "session_id": "admin-made"}),
				);
			}
			if body["name"] != "alice" || body["password"] != "letmein" {
				return json_response(StatusCode::UNAUTHORIZED, json!({"error": "Unauthorized", "reason": "Invalid login"}));
			}
			let cookie = format!("SyncGatewaySession={TOKEN}; Path=/db; HttpOnly");
			(
				StatusCode::OK,
				[(header::SET_COOKIE, cookie), (header::CONTENT_TYPE, "application/json".to_string())],
				json!({"authentication_handlers": ["default", "cookie"], "ok": true, "userCtx": {"channels": {"!": 1}, "name": "alice"}}).to_string(),
			)
				.into_response()
		}
		(Method::DELETE, "/db/_session") => json_response(StatusCode::OK, json!({})),
		(Method::GET, "/db/_session/admin-made") => json_response(
			StatusCode::OK,
			json!({"authentication_handlers": ["default", "cookie"], "ok": true, "userCtx": {"channels": {"!": 1}, "name": "alice"}}),
		),
		(Method::DELETE, "/db/_session/admin-made") => json_response(StatusCode::OK, json!({})),
		(Method::POST, "/db/") => json_response(StatusCode::CREATED, json!({"id": "generated", "rev": "1-gen", "ok": true})),
		(Method::GET, "/db/_all_docs") | (Method::POST, "/db/_all_docs") => json_response(
			StatusCode::OK,
			json!({"rows": [{"id": "a", "key": "a", "value": {"rev": "1-a"}}], "total_rows": 1}),
		),
		(Method::GET, "/db/doc1") if request.param("open_revs").is_some() => json_response(
			StatusCode::OK,
			json!([{"ok": {"_id": "doc1", "_rev": "2-b", "n": 2}}, {"missing": "3-x"}]),
		),
		(Method::DELETE, "/db/doc1") => json_response(StatusCode::OK, json!({"id": "doc1", "rev": "3-del", "ok": true})),
		(Method::PUT, "/db/_local/checkpoint") => json_response(StatusCode::CREATED, json!({"id": "_local/checkpoint", "rev": "0-1", "ok": true})),
		(Method::DELETE, "/db/_local/checkpoint") => json_response(StatusCode::OK, json!({})),
		(Method::GET, "/db/") => {
			if authorized(request) {
				json_response(StatusCode::OK, json!({"db_name": "db", "update_seq": 5, "state": "Online"}))
			} else {
				json_response(StatusCode::UNAUTHORIZED, json!({"error": "Unauthorized", "reason": "Login required"}))
			}
		}
		(Method::PUT, "/db/doc1") => {
			if query.contains("rev=1-stale") {
				json_response(StatusCode::CONFLICT, json!({"error": "conflict", "reason": "Document revision conflict"}))
			} else {
				json_response(StatusCode::CREATED, json!({"id": "doc1", "rev": "2-new", "ok": true}))
			}
		}
		(Method::GET, "/db/a%2Fb") => json_response(StatusCode::OK, json!({"_id": "a/b", "_rev": "1-x", "kind": "slashed"})),
		(Method::POST, "/db/_bulk_docs") => json_response(
			StatusCode::CREATED,
			json!([
				{"id": "a", "rev": "1-a"},
				{"id": "b", "error": "conflict", "reason": "Document exists", "status": 409}
			]),
		),
		(Method::POST, "/db/_bulk_get") => (
			StatusCode::OK,
			[(header::CONTENT_TYPE, "multipart/mixed; boundary=frontier")],
			"--frontier\r\nContent-Type: application/json\r\n\r\n{\"_id\":\"a\"}\r\n--frontier--\r\n",
		)
			.into_response(),
		(Method::POST, "/db/_changes") => changes(request),
		(Method::GET, "/db/doc1/photo.jpg") => (StatusCode::OK, [(header::CONTENT_TYPE, "image/jpeg")], vec![0xffu8, 0xd8, 0xff, 0xe0, 1, 2, 3, 4]).into_response(),
		(Method::PUT, "/db/doc1/photo.jpg") => json_response(StatusCode::CREATED, json!({"id": "doc1", "rev": "3-att", "ok": true})),
		(Method::GET, "/db/_oidc") => (StatusCode::FOUND, [(header::LOCATION, "https://idp.example/auth?client_id=sg")]).into_response(),
		(Method::GET, "/db/_oidc_challenge") => (
			StatusCode::UNAUTHORIZED,
			[(header::WWW_AUTHENTICATE, r#"Bearer login_url="https://idp.example/auth""#)],
		)
			.into_response(),
		(Method::GET, "/db/_oidc_callback") => json_response(
			StatusCode::OK,
			json!({"id_token": "id-1", "refresh_token": "refresh-1", "session_id": "oidc-session", "name": "google_alice"}),
		),
		(Method::GET, "/db/_oidc_refresh") => json_response(
			StatusCode::OK,
			json!({"id_token": "id-2", "session_id": "oidc-session-2", "name": "google_alice", "expires_in": 3600}),
		),
		(Method::DELETE, "/db/_user/alice/_session") => json_response(StatusCode::OK, json!({})),
		(Method::DELETE, "/db/_user/alice/_session/admin-made") => json_response(StatusCode::OK, json!({})),
		_ => json_response(StatusCode::NOT_FOUND, json!({"error": "not_found", "reason": "missing"})),
	}
}

fn changes(request: &RecordedRequest) -> Response {
	let body = request.json();
	match body["feed"].as_str() {
		Some("normal") => json_response(
			StatusCode::OK,
			json!({
				"results": [
					{"seq": 1, "id": "doc1", "changes": [{"rev": "1-a"}]},
					{"seq": 2, "id": "doc2", "changes": [{"rev": "1-b"}]}
				],
				"last_seq": 2
			}),
		),
		Some("continuous") => {
			let chunks = [
				"\n".to_string(),
				"{\"seq\":3,\"id\":\"doc3\",\"changes\":[{\"rev\":\"1-c\"}]}\n".to_string(),
				"\n{\"seq\":4,\"id\":\"doc4\",".to_string(),
				"\"changes\":[{\"rev\":\"1-d\"}]}\n".to_string(),
			];
			let stream = futures_util::stream::unfold(0usize, move |i| {
				let chunks = chunks.clone();
				async move {
					if i >= chunks.len() {
						return None;
					}
					if i > 0 {
						tokio::time::sleep(Duration::from_millis(20)).await;
					}
					Some((Ok::<_, std::io::Error>(Bytes::from(chunks[i].clone())), i + 1))
				}
			});
			(StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], Body::from_stream(stream)).into_response()
		}
		_ => json_response(
			StatusCode::OK,
			json!({"results": [{"seq": 3, "id": "doc3", "changes": [{"rev": "1-c"}]}], "last_seq": 3}),
		),
	}
}
