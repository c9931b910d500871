//! Session cookie and authorization header shared by a client pair.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::RwLock;

/// Name of the cookie carrying a gateway session token.
pub const SESSION_COOKIE_NAME: &str = "SyncGatewaySession";

/// Formats `token` as a `Cookie` header value.
pub fn session_cookie(token: &str) -> String {
	format!("{SESSION_COOKIE_NAME}={token}")
}

/// Token part of a stored cookie: the last `=`-separated segment.
pub fn token_from_cookie(cookie: &str) -> &str {
	cookie.rsplit('=').next().unwrap_or(cookie)
}

/// Extracts the session token from a `Set-Cookie` header value.
///
/// Returns `None` when the header sets some other cookie.
pub fn token_from_set_cookie(header: &str) -> Option<String> {
	let pair = header.split(';').next()?.trim();
	let (name, value) = pair.split_once('=')?;
	if name.trim() != SESSION_COOKIE_NAME || value.is_empty() {
		return None;
	}
	Some(value.to_string())
}

/// `Authorization` header value for HTTP basic auth.
pub fn basic_authorization(name: &str, password: &str) -> String {
	format!("Basic {}", STANDARD.encode(format!("{name}:{password}")))
}

/// Credentials attached to every request a client pair sends.
///
/// Values are read when a request is built, so a change applies from the
/// next request on and never to one already in flight.
#[derive(Debug, Default)]
pub struct SessionState {
	cookie: RwLock<Option<String>>,
	authorization: RwLock<Option<String>>,
}

impl SessionState {
	pub fn new() -> Self {
		Self::default()
	}

	/// Current session token, if any.
	pub fn session(&self) -> Option<String> {
		self.cookie.read().as_deref().map(|cookie| token_from_cookie(cookie).to_string())
	}

	pub fn set_session(&self, token: &str) {
		*self.cookie.write() = Some(session_cookie(token));
	}

	pub fn clear_session(&self) {
		*self.cookie.write() = None;
	}

	/// Full `Cookie` header value.
	pub fn cookie(&self) -> Option<String> {
		self.cookie.read().clone()
	}

	pub fn authorization(&self) -> Option<String> {
		self.authorization.read().clone()
	}

	pub fn set_authorization(&self, value: Option<String>) {
		*self.authorization.write() = value;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn set_then_get_round_trips_token() {
		let state = SessionState::new();
		assert_eq!(state.session(), None);

		state.set_session("abc123");
		assert_eq!(state.session().as_deref(), Some("abc123"));
		assert_eq!(state.cookie().as_deref(), Some("SyncGatewaySession=abc123"));
		// reads do not disturb the stored value
		assert_eq!(state.session().as_deref(), Some("abc123"));

		state.clear_session();
		assert_eq!(state.session(), None);
		assert_eq!(state.cookie(), None);
	}

	#[test]
	fn authorization_is_independent_of_cookie() {
		let state = SessionState::new();
		state.set_authorization(Some("Basic dXNlcjpwYXNz".to_string()));
		state.set_session("t");
		state.clear_session();
		assert_eq!(state.authorization().as_deref(), Some("Basic dXNlcjpwYXNz"));
		state.set_authorization(None);
		assert_eq!(state.authorization(), None);
	}

	#[test]
	fn basic_authorization_encodes_credentials() {
		assert_eq!(basic_authorization("user", "pass"), "Basic dXNlcjpwYXNz");
	}

	#[test]
	fn token_is_last_cookie_segment() {
		assert_eq!(token_from_cookie("SyncGatewaySession=xyz"), "xyz");
		assert_eq!(token_from_cookie("bare"), "bare");
	}

	#[test]
	fn set_cookie_header_yields_session_token() {
		let header = "SyncGatewaySession=c5af80a039db4ed9d2b6865576b6999935282689; Path=/db; Expires=Wed, 21 Oct 2026 07:28:00 GMT";
		assert_eq!(
			token_from_set_cookie(header).as_deref(),
			Some("c5af80a039db4ed9d2b6865576b6999935282689")
		);
		assert_eq!(token_from_set_cookie("other=1; Path=/"), None);
		assert_eq!(token_from_set_cookie("SyncGatewaySession=; Max-Age=0"), None);
	}
}
