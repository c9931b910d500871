//! Operations available on both interfaces.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, SET_COOKIE};
use reqwest::{Body, Method, Response};
use serde::Serialize;
use sgw_protocol::{
	AllDocsResponse, BulkDocsRequest, BulkDocsResponseItem, BulkGetRequest, ChangesFeedMode, ChangesFeedResponse, ChangesRequest, DbResponse,
	DocumentResponse, OidcCallbackResponse, OidcRefreshResponse, OpenRevision, PutResponse, ServerInfoResponse, SessionCredentials, SessionResponse,
};
use tracing::debug;

use super::{ByteStream, RestClient};
use crate::error::Result;
use crate::session::{session_cookie, token_from_set_cookie};

/// Query of `{db}/_all_docs`. Flags are only sent when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllDocsQuery {
	pub access: bool,
	pub channels: bool,
	pub include_docs: bool,
	pub revs: bool,
	pub update_seq: bool,
	pub limit: Option<u64>,
	pub keys: Option<Vec<String>>,
	pub startkey: Option<String>,
	pub endkey: Option<String>,
}

impl AllDocsQuery {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn include_docs(mut self) -> Self {
		self.include_docs = true;
		self
	}

	pub fn with_channels(mut self) -> Self {
		self.channels = true;
		self
	}

	pub fn with_limit(mut self, limit: u64) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn with_keys<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.keys = Some(keys.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_range(mut self, startkey: impl Into<String>, endkey: impl Into<String>) -> Self {
		self.startkey = Some(startkey.into());
		self.endkey = Some(endkey.into());
		self
	}

	fn to_query(&self) -> Result<Vec<(&'static str, String)>> {
		let mut query = flags([
			("access", self.access),
			("channels", self.channels),
			("include_docs", self.include_docs),
			("revs", self.revs),
			("update_seq", self.update_seq),
		]);
		if let Some(limit) = self.limit {
			query.push(("limit", limit.to_string()));
		}
		if let Some(keys) = &self.keys {
			query.push(("keys", serde_json::to_string(keys)?));
		}
		if let Some(startkey) = &self.startkey {
			query.push(("startkey", startkey.clone()));
		}
		if let Some(endkey) = &self.endkey {
			query.push(("endkey", endkey.clone()));
		}
		Ok(query)
	}
}

/// Query of `GET {db}/{doc}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetDocumentOptions {
	pub attachments: bool,
	pub atts_since: Option<Vec<String>>,
	pub revs: bool,
	pub show_exp: bool,
}

impl GetDocumentOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_attachments(mut self) -> Self {
		self.attachments = true;
		self
	}

	pub fn with_revs(mut self) -> Self {
		self.revs = true;
		self
	}

	pub fn with_expiry(mut self) -> Self {
		self.show_exp = true;
		self
	}

	pub fn with_atts_since<I, S>(mut self, revs: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.atts_since = Some(revs.into_iter().map(Into::into).collect());
		self
	}

	fn to_query(&self) -> Result<Vec<(&'static str, String)>> {
		let mut query = flags([("attachments", self.attachments), ("revs", self.revs), ("show_exp", self.show_exp)]);
		if let Some(atts_since) = &self.atts_since {
			query.push(("atts_since", serde_json::to_string(atts_since)?));
		}
		Ok(query)
	}
}

/// Query of `POST {db}/_bulk_get`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkGetOptions {
	pub revs: bool,
	pub revs_limit: Option<u32>,
	pub attachments: bool,
}

impl BulkGetOptions {
	fn to_query(&self) -> Vec<(&'static str, String)> {
		let mut query = flags([("revs", self.revs), ("attachments", self.attachments)]);
		if let Some(limit) = self.revs_limit {
			query.push(("revs_limit", limit.to_string()));
		}
		query
	}
}

/// Outcome of [`PublicApi::post_session`].
#[derive(Debug, Clone)]
pub struct CreatedSession {
	pub session: SessionResponse,
	/// Token from the `SyncGatewaySession` cookie the gateway set, if any.
	pub token: Option<String>,
}

fn flags<const N: usize>(flags: [(&'static str, bool); N]) -> Vec<(&'static str, String)> {
	flags.into_iter().filter(|(_, set)| *set).map(|(name, _)| (name, "true".to_string())).collect()
}

fn oidc_query(offline: bool, provider: Option<&str>) -> Vec<(&'static str, String)> {
	let mut query = flags([("offline", offline)]);
	if let Some(provider) = provider {
		query.push(("provider", provider.to_string()));
	}
	query
}

/// REST operations of the public interface.
///
/// Authorization comes from the client's shared session state. Non-success
/// statuses are returned as [`crate::Error::Status`] with the gateway's body,
/// except for the operations documented as returning the raw response.
#[async_trait]
pub trait PublicApi: Send + Sync {
	fn rest(&self) -> &RestClient;

	/// `GET /`
	async fn server_info(&self) -> Result<ServerInfoResponse> {
		let rest = self.rest();
		rest.send_json(rest.request(Method::GET, rest.url(&[])?)).await
	}

	/// `GET {db}/`
	async fn get_db(&self, db: &str) -> Result<DbResponse> {
		let rest = self.rest();
		rest.send_json(rest.request(Method::GET, rest.url(&[db, ""])?)).await
	}

	/// `GET {db}/_all_docs`
	async fn all_docs(&self, db: &str, query: &AllDocsQuery) -> Result<AllDocsResponse> {
		let rest = self.rest();
		let builder = rest.request(Method::GET, rest.url(&[db, "_all_docs"])?).query(&query.to_query()?);
		rest.send_json(builder).await
	}

	/// `POST {db}/_all_docs`, typically with a `{"keys": [..]}` body.
	async fn post_all_docs<B>(&self, db: &str, body: &B, query: &AllDocsQuery) -> Result<AllDocsResponse>
	where
		B: Serialize + Sync + ?Sized,
	{
		let rest = self.rest();
		let builder = rest.request(Method::POST, rest.url(&[db, "_all_docs"])?).query(&query.to_query()?).json(body);
		rest.send_json(builder).await
	}

	/// `POST {db}/_bulk_docs`
	///
	/// A batch where some items failed still succeeds; each item reports its
	/// own outcome.
	async fn bulk_docs(&self, db: &str, request: &BulkDocsRequest) -> Result<Vec<BulkDocsResponseItem>> {
		let rest = self.rest();
		let items: Vec<BulkDocsResponseItem> = rest.send_json(rest.request(Method::POST, rest.url(&[db, "_bulk_docs"])?).json(request)).await?;
		let failed = items.iter().filter(|item| !item.is_ok()).count();
		debug!(target = "sgw.client", db, total = items.len(), failed, "bulk docs stored");
		Ok(items)
	}

	/// `POST {db}/_bulk_get`. Returns the raw multipart response.
	async fn bulk_get(&self, db: &str, request: &BulkGetRequest, options: &BulkGetOptions) -> Result<Response> {
		let rest = self.rest();
		let builder = rest.request(Method::POST, rest.url(&[db, "_bulk_get"])?).query(&options.to_query()).json(request);
		rest.send_raw(builder).await
	}

	/// `POST {db}/_changes` as a normal (one-shot) feed.
	async fn changes(&self, db: &str, request: ChangesRequest) -> Result<ChangesFeedResponse> {
		let rest = self.rest();
		let request = request.with_feed(ChangesFeedMode::Normal);
		rest.send_json(rest.request(Method::POST, rest.url(&[db, "_changes"])?).json(&request)).await
	}

	/// `POST {db}/_changes` as a long-poll or continuous feed.
	///
	/// A request asking for a normal feed is sent as long-poll. The body is
	/// handed back unread.
	async fn changes_stream(&self, db: &str, request: ChangesRequest) -> Result<ByteStream> {
		let rest = self.rest();
		let request = match request.feed {
			ChangesFeedMode::Normal => request.with_feed(ChangesFeedMode::Longpoll),
			_ => request,
		};
		let response = rest.send(rest.request(Method::POST, rest.url(&[db, "_changes"])?).json(&request)).await?;
		Ok(ByteStream::new(response))
	}

	/// `POST {db}/` creating a document with a server-assigned ID.
	async fn post_document<B>(&self, db: &str, body: &B) -> Result<PutResponse>
	where
		B: Serialize + Sync + ?Sized,
	{
		let rest = self.rest();
		rest.send_json(rest.request(Method::POST, rest.url(&[db, ""])?).json(body)).await
	}

	/// `GET {db}/{doc}`
	async fn get_document(&self, db: &str, doc: &str, options: &GetDocumentOptions) -> Result<DocumentResponse> {
		let rest = self.rest();
		let builder = rest
			.request(Method::GET, rest.url(&[db, doc])?)
			.header(ACCEPT, "application/json")
			.query(&options.to_query()?);
		rest.send_json(builder).await
	}

	/// `GET {db}/{doc}?open_revs=[..]`; pass `["all"]` for every leaf.
	async fn get_open_revs(&self, db: &str, doc: &str, revs: &[&str]) -> Result<Vec<OpenRevision>> {
		let rest = self.rest();
		let open_revs = if revs == ["all"] { "all".to_string() } else { serde_json::to_string(revs)? };
		let builder = rest
			.request(Method::GET, rest.url(&[db, doc])?)
			.header(ACCEPT, "application/json")
			.query(&[("open_revs", open_revs)]);
		rest.send_json(builder).await
	}

	/// `PUT {db}/{doc}`
	///
	/// `rev` is the revision being replaced; a stale one is rejected by the
	/// gateway with 409. `new_edits: false` stores the revisions in the body
	/// as-is.
	async fn put_document<B>(&self, db: &str, doc: &str, body: &B, rev: Option<&str>, new_edits: bool) -> Result<PutResponse>
	where
		B: Serialize + Sync + ?Sized,
	{
		let rest = self.rest();
		let mut query = Vec::new();
		if let Some(rev) = rev {
			query.push(("rev", rev.to_string()));
		}
		if !new_edits {
			query.push(("new_edits", "false".to_string()));
		}
		let builder = rest.request(Method::PUT, rest.url(&[db, doc])?).query(&query).json(body);
		rest.send_json(builder).await
	}

	/// `DELETE {db}/{doc}?rev=..`
	async fn delete_document(&self, db: &str, doc: &str, rev: &str) -> Result<PutResponse> {
		let rest = self.rest();
		let builder = rest.request(Method::DELETE, rest.url(&[db, doc])?).query(&[("rev", rev)]);
		rest.send_json(builder).await
	}

	/// `GET {db}/_local/{id}`
	async fn get_local_document(&self, db: &str, id: &str) -> Result<DocumentResponse> {
		let rest = self.rest();
		rest.send_json(rest.request(Method::GET, rest.url(&[db, "_local", id])?)).await
	}

	/// `PUT {db}/_local/{id}`
	async fn put_local_document<B>(&self, db: &str, id: &str, body: &B) -> Result<PutResponse>
	where
		B: Serialize + Sync + ?Sized,
	{
		let rest = self.rest();
		rest.send_json(rest.request(Method::PUT, rest.url(&[db, "_local", id])?).json(body)).await
	}

	/// `DELETE {db}/_local/{id}`
	async fn delete_local_document(&self, db: &str, id: &str, rev: Option<&str>, batch: Option<&str>) -> Result<()> {
		let rest = self.rest();
		let mut query = Vec::new();
		if let Some(rev) = rev {
			query.push(("rev", rev));
		}
		if let Some(batch) = batch {
			query.push(("batch", batch));
		}
		rest.send_empty(rest.request(Method::DELETE, rest.url(&[db, "_local", id])?).query(&query)).await
	}

	/// `GET {db}/{doc}/{attachment}`; the content is streamed.
	async fn get_attachment(&self, db: &str, doc: &str, attachment: &str, rev: Option<&str>) -> Result<ByteStream> {
		let rest = self.rest();
		let mut builder = rest.request(Method::GET, rest.url(&[db, doc, attachment])?);
		if let Some(rev) = rev {
			builder = builder.query(&[("rev", rev)]);
		}
		Ok(ByteStream::new(rest.send(builder).await?))
	}

	/// `PUT {db}/{doc}/{attachment}`
	///
	/// `body` may be a buffer or a stream (`reqwest::Body::wrap_stream`).
	async fn put_attachment<T>(&self, db: &str, doc: &str, attachment: &str, rev: Option<&str>, body: T, content_type: Option<&str>) -> Result<PutResponse>
	where
		T: Into<Body> + Send,
	{
		let rest = self.rest();
		let mut builder = rest.request(Method::PUT, rest.url(&[db, doc, attachment])?);
		if let Some(rev) = rev {
			builder = builder.query(&[("rev", rev)]);
		}
		if let Some(content_type) = content_type {
			builder = builder.header(CONTENT_TYPE, content_type);
		}
		rest.send_json(builder.body(body)).await
	}

	/// `POST {db}/_session`
	///
	/// The token is returned, not stored; see [`crate::SyncGateway::login`].
	async fn post_session(&self, db: &str, credentials: &SessionCredentials) -> Result<CreatedSession> {
		let rest = self.rest();
		let response = rest.send(rest.request(Method::POST, rest.url(&[db, "_session"])?).json(credentials)).await?;
		let token = response
			.headers()
			.get_all(SET_COOKIE)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.find_map(token_from_set_cookie);
		let body = response.bytes().await?;
		let session = serde_json::from_slice(&body)?;
		Ok(CreatedSession { session, token })
	}

	/// `DELETE {db}/_session`, logging out `token` rather than the shared session.
	async fn delete_session(&self, db: &str, token: &str) -> Result<()> {
		let rest = self.rest();
		let builder = rest.request_with_cookie(Method::DELETE, rest.url(&[db, "_session"])?, Some(session_cookie(token)));
		rest.send_empty(builder).await
	}

	/// `GET {db}/_oidc`. Returns the raw response; redirects are not followed.
	async fn oidc(&self, db: &str, offline: bool, provider: Option<&str>) -> Result<Response> {
		let rest = self.rest();
		rest.send_raw(rest.request(Method::GET, rest.url(&[db, "_oidc"])?).query(&oidc_query(offline, provider))).await
	}

	/// `GET {db}/_oidc_challenge`. Returns the raw response.
	async fn oidc_challenge(&self, db: &str, offline: bool, provider: Option<&str>) -> Result<Response> {
		let rest = self.rest();
		rest.send_raw(rest.request(Method::GET, rest.url(&[db, "_oidc_challenge"])?).query(&oidc_query(offline, provider))).await
	}

	/// `GET {db}/_oidc_callback?code=..`
	async fn oidc_callback(&self, db: &str, code: &str, provider: Option<&str>) -> Result<OidcCallbackResponse> {
		let rest = self.rest();
		let mut query = vec![("code", code)];
		if let Some(provider) = provider {
			query.push(("provider", provider));
		}
		rest.send_json(rest.request(Method::GET, rest.url(&[db, "_oidc_callback"])?).query(&query)).await
	}

	/// `GET {db}/_oidc_refresh?refresh_token=..`
	async fn oidc_refresh(&self, db: &str, refresh_token: &str, provider: Option<&str>) -> Result<OidcRefreshResponse> {
		let rest = self.rest();
		let mut query = vec![("refresh_token", refresh_token)];
		if let Some(provider) = provider {
			query.push(("provider", provider));
		}
		rest.send_json(rest.request(Method::GET, rest.url(&[db, "_oidc_refresh"])?).query(&query)).await
	}
}
