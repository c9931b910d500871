//! OpenID Connect callback and refresh bodies.

use serde::{Deserialize, Serialize};

/// `GET {db}/_oidc_callback` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcCallbackResponse {
	pub id_token: String,
	#[serde(default)]
	pub refresh_token: Option<String>,
	pub session_id: String,
	pub name: String,
	#[serde(default)]
	pub access_token: Option<String>,
	#[serde(default)]
	pub token_type: Option<String>,
	#[serde(default)]
	pub expires_in: Option<i64>,
}

/// `GET {db}/_oidc_refresh` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcRefreshResponse {
	pub id_token: String,
	pub session_id: String,
	pub name: String,
	#[serde(default)]
	pub access_token: Option<String>,
	#[serde(default)]
	pub token_type: Option<String>,
	#[serde(default)]
	pub expires_in: Option<i64>,
}
