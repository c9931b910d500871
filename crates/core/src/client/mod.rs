//! REST clients for the public and admin interfaces.
//!
//! Both clients of a [`ClientPair`] share one [`SessionState`], so a session
//! created through either one authorizes the next request on both. The
//! operations themselves live on the [`PublicApi`] and [`AdminApi`] traits,
//! whose default methods run over a shared [`RestClient`].

mod admin;
mod options;
mod public;
mod stream;

use std::fmt;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, COOKIE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub use admin::AdminApi;
pub use options::ClientOptions;
pub use public::{AllDocsQuery, BulkGetOptions, CreatedSession, GetDocumentOptions, PublicApi};
pub use stream::ByteStream;

use crate::endpoint::{EndpointConfig, Interface};
use crate::error::{Error, Result};
use crate::session::SessionState;

/// HTTP plumbing bound to one gateway interface.
#[derive(Clone)]
pub struct RestClient {
	interface: Interface,
	base: Url,
	http: reqwest::Client,
	session: Arc<SessionState>,
}

impl RestClient {
	pub fn new(interface: Interface, base: Url, http: reqwest::Client, session: Arc<SessionState>) -> Result<Self> {
		if base.cannot_be_a_base() {
			return Err(Error::ClientBind {
				interface,
				url: base.to_string(),
				reason: "URL cannot be a base".to_string(),
			});
		}
		Ok(Self {
			interface,
			base,
			http,
			session,
		})
	}

	pub fn interface(&self) -> Interface {
		self.interface
	}

	pub fn base_url(&self) -> &Url {
		&self.base
	}

	pub fn session(&self) -> &Arc<SessionState> {
		&self.session
	}

	/// Joins `segments` onto the base URL, percent-encoding each one.
	///
	/// An empty final segment produces a trailing slash (`{db}/`).
	pub fn url(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|_| Error::ClientBind {
				interface: self.interface,
				url: self.base.to_string(),
				reason: "URL cannot be a base".to_string(),
			})?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	/// Starts a request carrying the current session cookie and authorization.
	pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
		self.request_with_cookie(method, url, self.session.cookie())
	}

	/// Starts a request with an explicit `Cookie` header instead of the shared one.
	pub fn request_with_cookie(&self, method: Method, url: Url, cookie: Option<String>) -> RequestBuilder {
		let mut builder = self.http.request(method, url);
		if let Some(cookie) = cookie {
			builder = builder.header(COOKIE, cookie);
		}
		if let Some(authorization) = self.session.authorization() {
			builder = builder.header(AUTHORIZATION, authorization);
		}
		builder
	}

	/// Sends without looking at the status.
	pub async fn send_raw(&self, builder: RequestBuilder) -> Result<Response> {
		let request = builder.build()?;
		debug!(target = "sgw.client", interface = %self.interface, method = %request.method(), url = %request.url(), "request");
		let response = self.http.execute(request).await?;
		debug!(target = "sgw.client", interface = %self.interface, status = %response.status(), "response");
		Ok(response)
	}

	/// Sends and turns a non-success status into [`Error::Status`].
	pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
		let request = builder.build()?;
		let method = request.method().to_string();
		let url = request.url().to_string();
		debug!(target = "sgw.client", interface = %self.interface, %method, %url, "request");

		let response = self.http.execute(request).await?;
		let status = response.status();
		if status.is_success() {
			debug!(target = "sgw.client", interface = %self.interface, %status, "response");
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		debug!(target = "sgw.client", interface = %self.interface, %status, %body, "request rejected");
		Err(Error::Status { method, url, status, body })
	}

	pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
		let response = self.send(builder).await?;
		let body = response.bytes().await?;
		Ok(serde_json::from_slice(&body)?)
	}

	pub async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
		self.send(builder).await?;
		Ok(())
	}
}

impl fmt::Debug for RestClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RestClient")
			.field("interface", &self.interface)
			.field("base", &self.base.as_str())
			.finish_non_exhaustive()
	}
}

/// Client for the public interface.
#[derive(Debug, Clone)]
pub struct PublicClient {
	rest: RestClient,
}

impl PublicClient {
	pub fn new(rest: RestClient) -> Self {
		Self { rest }
	}
}

impl PublicApi for PublicClient {
	fn rest(&self) -> &RestClient {
		&self.rest
	}
}

/// Client for the admin interface; also offers every public operation.
#[derive(Debug, Clone)]
pub struct AdminClient {
	rest: RestClient,
}

impl AdminClient {
	pub fn new(rest: RestClient) -> Self {
		Self { rest }
	}
}

impl PublicApi for AdminClient {
	fn rest(&self) -> &RestClient {
		&self.rest
	}
}

impl AdminApi for AdminClient {}

/// Public and admin clients for one gateway.
#[derive(Debug, Clone)]
pub struct ClientPair {
	pub public: PublicClient,
	pub admin: AdminClient,
}

impl ClientPair {
	/// Binds both clients. Either failing to bind is a construction error.
	pub fn bind(endpoints: &EndpointConfig, options: &ClientOptions, session: Arc<SessionState>) -> Result<Self> {
		let public = bind_one(endpoints, Interface::Public, options, session.clone())?;
		let admin = bind_one(endpoints, Interface::Admin, options, session)?;
		Ok(Self {
			public: PublicClient::new(public),
			admin: AdminClient::new(admin),
		})
	}
}

fn bind_one(endpoints: &EndpointConfig, interface: Interface, options: &ClientOptions, session: Arc<SessionState>) -> Result<RestClient> {
	let bind_error = |url: String, reason: String| Error::ClientBind { interface, url, reason };

	let base = endpoints
		.url_for(interface)
		.map_err(|e| bind_error(format!("{}:{}", endpoints.host(), endpoints.port(interface)), e.to_string()))?;
	let http = options.build_http_client().map_err(|e| bind_error(base.to_string(), e.to_string()))?;
	debug!(target = "sgw.client", %interface, url = %base, "client bound");
	RestClient::new(interface, base, http, session)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::endpoint::Scheme;
	use crate::session::session_cookie;

	fn rest(base: &str) -> RestClient {
		RestClient::new(Interface::Public, Url::parse(base).unwrap(), reqwest::Client::new(), Arc::new(SessionState::new())).unwrap()
	}

	#[test]
	fn segments_are_encoded_individually() {
		let client = rest("http://localhost:4984/");
		assert_eq!(client.url(&["db", "a/b c"]).unwrap().as_str(), "http://localhost:4984/db/a%2Fb%20c");
		assert_eq!(client.url(&["db", ""]).unwrap().as_str(), "http://localhost:4984/db/");
		assert_eq!(client.url(&[]).unwrap().as_str(), "http://localhost:4984/");
	}

	#[test]
	fn cannot_be_a_base_url_fails_to_bind() {
		let err = RestClient::new(
			Interface::Admin,
			Url::parse("mailto:gateway@example.com").unwrap(),
			reqwest::Client::new(),
			Arc::new(SessionState::new()),
		)
		.unwrap_err();
		assert!(matches!(err, Error::ClientBind { interface: Interface::Admin, .. }));
		assert!(err.is_construction());
	}

	#[test]
	fn requests_pick_up_session_changes() {
		let client = rest("http://localhost:4984/");
		let url = client.url(&["db", ""]).unwrap();

		let request = client.request(Method::GET, url.clone()).build().unwrap();
		assert!(request.headers().get(COOKIE).is_none());

		client.session().set_session("abc123");
		client.session().set_authorization(Some("Basic Zm9vOmJhcg==".to_string()));
		let request = client.request(Method::GET, url).build().unwrap();
		assert_eq!(request.headers().get(COOKIE).unwrap(), "SyncGatewaySession=abc123");
		assert_eq!(request.headers().get(AUTHORIZATION).unwrap(), "Basic Zm9vOmJhcg==");
	}

	#[test]
	fn explicit_cookie_replaces_shared_one() {
		let client = rest("http://localhost:4984/");
		client.session().set_session("shared");
		let url = client.url(&["db", "_session"]).unwrap();
		let request = client.request_with_cookie(Method::DELETE, url, Some(session_cookie("other"))).build().unwrap();
		let cookies: Vec<_> = request.headers().get_all(COOKIE).iter().collect();
		assert_eq!(cookies, vec!["SyncGatewaySession=other"]);
	}

	#[test]
	fn pair_binds_both_interfaces_with_shared_session() {
		let endpoints = EndpointConfig::new(Scheme::Http, "localhost", 4984, 4985).unwrap();
		let session = Arc::new(SessionState::new());
		let pair = ClientPair::bind(&endpoints, &ClientOptions::default(), session.clone()).unwrap();

		assert_eq!(pair.public.rest().base_url().as_str(), "http://localhost:4984/");
		assert_eq!(pair.admin.rest().base_url().as_str(), "http://localhost:4985/");
		session.set_session("t");
		assert_eq!(pair.public.rest().session().session().as_deref(), Some("t"));
		assert_eq!(pair.admin.rest().session().session().as_deref(), Some("t"));
	}

	#[test]
	fn unparsable_host_fails_to_bind() {
		let endpoints = EndpointConfig::new(Scheme::Http, "bad host", 4984, 4985).unwrap();
		let err = ClientPair::bind(&endpoints, &ClientOptions::default(), Arc::new(SessionState::new())).unwrap_err();
		assert!(matches!(err, Error::ClientBind { interface: Interface::Public, .. }));
	}
}
