//! Orchestrator client for a remote test-server process.
//!
//! Wire format:
//!
//! * `POST {base}/sync_gateway/start` with `{"path": .., "config": ..}`,
//!   answered by `{"handle": .., "config": ..}`
//! * `POST {base}/sync_gateway/kill` with `{"handle": ..}`

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Result, RuntimeError};
use crate::orchestrator::{InstanceHandle, Orchestrator, StartRequest};

const START_PATH: &str = "sync_gateway/start";
const KILL_PATH: &str = "sync_gateway/kill";

#[derive(Debug, Deserialize)]
struct StartReply {
	handle: String,
	#[serde(default)]
	config: Option<String>,
}

#[derive(Debug, Serialize)]
struct KillBody<'a> {
	handle: &'a str,
}

/// [`Orchestrator`] backed by an HTTP test server.
#[derive(Debug, Clone)]
pub struct HttpOrchestrator {
	base: Url,
	client: reqwest::Client,
}

impl HttpOrchestrator {
	/// Creates an orchestrator for `base_url` with a default HTTP client.
	///
	/// Idle connections are not pooled: a kill issued while a lease is dropped
	/// may run on a different runtime than the start call.
	pub fn new(base_url: &str) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(120))
			.pool_max_idle_per_host(0)
			.build()?;
		Self::with_client(base_url, client)
	}

	/// Creates an orchestrator that sends requests through `client`.
	pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
		let mut base = Url::parse(base_url)?;
		if !base.path().ends_with('/') {
			let path = format!("{}/", base.path());
			base.set_path(&path);
		}
		Ok(Self { base, client })
	}

	pub fn base_url(&self) -> &Url {
		&self.base
	}

	async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
		let url = self.base.join(path)?;
		debug!(target = "sgw.orchestrator", %url, "orchestrator request");
		let response = self.client.post(url).json(body).send().await?;
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}
		let body = response.text().await.unwrap_or_default();
		Err(RuntimeError::Status { status: status.as_u16(), body })
	}
}

#[async_trait]
impl Orchestrator for HttpOrchestrator {
	async fn start(&self, request: &StartRequest) -> Result<InstanceHandle> {
		let response = self.post(START_PATH, request).await.map_err(|e| RuntimeError::Start {
			path: request.path.clone(),
			message: e.to_string(),
		})?;
		let reply: StartReply = response.json().await.map_err(|e| RuntimeError::Start {
			path: request.path.clone(),
			message: format!("malformed start reply: {e}"),
		})?;

		debug!(target = "sgw.orchestrator", path = %request.path, handle = %reply.handle, "instance started");
		Ok(InstanceHandle::new(reply.handle).with_config(reply.config))
	}

	async fn kill(&self, handle: &InstanceHandle) -> Result<()> {
		self.post(KILL_PATH, &KillBody { handle: &handle.id })
			.await
			.map_err(|e| RuntimeError::Kill {
				handle: handle.id.clone(),
				message: e.to_string(),
			})?;
		debug!(target = "sgw.orchestrator", %handle, "instance killed");
		Ok(())
	}
}
