//! Server root (`GET /`) response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Welcome document served at the root of either interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfoResponse {
	#[serde(rename = "couchdb", default)]
	pub welcome_message: Option<String>,
	#[serde(default)]
	pub vendor: Option<VendorInfo>,
	#[serde(default)]
	pub version: Option<String>,
	/// Only reported on the admin interface.
	#[serde(rename = "ADMIN", default)]
	pub admin: bool,
}

/// Vendor block of the welcome document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorInfo {
	pub name: String,
	/// Older gateways report a number, newer ones a string.
	#[serde(default)]
	pub version: Option<Value>,
}
