//! Session bodies for `{db}/_session` on both interfaces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Credentials posted to the public `{db}/_session` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCredentials {
	pub name: String,
	pub password: String,
}

impl SessionCredentials {
	pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			password: password.into(),
		}
	}
}

/// Session description returned by `GET|POST {db}/_session`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionResponse {
	#[serde(rename = "authentication_handlers", default)]
	pub auth_handlers: Vec<String>,
	#[serde(default)]
	pub ok: bool,
	#[serde(rename = "userCtx", default)]
	pub user_ctx: Option<UserContext>,
}

/// Authenticated user as seen by the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
	#[serde(default)]
	pub channels: BTreeMap<String, u64>,
	#[serde(default)]
	pub name: Option<String>,
}

/// Admin-side session creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSessionRequest {
	pub name: String,
	/// Lifetime in seconds; the gateway default applies when unset.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ttl: Option<u64>,
}

impl AdminSessionRequest {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), ttl: None }
	}

	pub fn with_ttl(mut self, ttl: u64) -> Self {
		self.ttl = Some(ttl);
		self
	}
}

/// Admin-side session creation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreateSessionResponse {
	pub cookie_name: String,
	/// RFC 3339 expiry timestamp.
	pub expires: String,
	pub session_id: String,
}
