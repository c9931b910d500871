//! The start/kill seam between the client facade and whatever runs gateways.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Request to bring up one gateway instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
	/// Instance slot identifier (for example a test-suite path).
	pub path: String,
	/// Gateway configuration text; the orchestrator default applies when unset.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub config: Option<String>,
}

impl StartRequest {
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			config: None,
		}
	}

	pub fn with_config(mut self, config: impl Into<String>) -> Self {
		self.config = Some(config.into());
		self
	}
}

/// Opaque reference to a started instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceHandle {
	pub id: String,
	/// Configuration the instance actually runs with, when the orchestrator echoes it.
	#[serde(default)]
	pub config: Option<String>,
}

impl InstanceHandle {
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into(), config: None }
	}

	pub fn with_config(mut self, config: Option<String>) -> Self {
		self.config = config;
		self
	}
}

impl fmt::Display for InstanceHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.id)
	}
}

/// Collaborator that starts and kills gateway processes.
///
/// Implementations must not retry internally; the caller decides what a
/// failure means.
#[async_trait]
pub trait Orchestrator: Send + Sync {
	/// Starts an instance and returns its handle once the start call completes.
	async fn start(&self, request: &StartRequest) -> Result<InstanceHandle>;

	/// Kills a previously started instance.
	async fn kill(&self, handle: &InstanceHandle) -> Result<()>;
}
