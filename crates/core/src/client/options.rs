use std::time::Duration;

use reqwest::redirect::Policy;

/// Settings for the HTTP clients of a client pair.
///
/// There is no overall request timeout by default: long-poll change feeds
/// and attachment downloads are expected to outlive any sensible value.
#[derive(Debug, Clone)]
pub struct ClientOptions {
	pub timeout: Option<Duration>,
	pub connect_timeout: Duration,
	pub user_agent: String,
	/// Accept self-signed certificates of TLS-enabled test gateways.
	pub accept_invalid_certs: bool,
}

impl Default for ClientOptions {
	fn default() -> Self {
		Self {
			timeout: None,
			connect_timeout: Duration::from_secs(10),
			user_agent: concat!("sgw-rs/", env!("CARGO_PKG_VERSION")).to_string(),
			accept_invalid_certs: false,
		}
	}
}

impl ClientOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}

	pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();
		self
	}

	pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
		self.accept_invalid_certs = accept;
		self
	}

	/// Builds a client that never follows redirects.
	///
	/// OIDC endpoints answer with redirects that callers assert on directly.
	pub fn build_http_client(&self) -> reqwest::Result<reqwest::Client> {
		let mut builder = reqwest::Client::builder()
			.redirect(Policy::none())
			.connect_timeout(self.connect_timeout)
			.user_agent(self.user_agent.clone())
			.danger_accept_invalid_certs(self.accept_invalid_certs);
		if let Some(timeout) = self.timeout {
			builder = builder.timeout(timeout);
		}
		builder.build()
	}
}
