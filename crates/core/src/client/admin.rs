//! Operations only the admin interface serves.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use sgw_protocol::{AdminCreateSessionResponse, AdminSessionRequest, SessionResponse};

use super::PublicApi;
use crate::error::Result;

/// Admin REST operations. Every admin client is also a [`PublicApi`].
#[async_trait]
pub trait AdminApi: PublicApi {
	/// `GET /_config`
	async fn config(&self) -> Result<Map<String, Value>> {
		let rest = self.rest();
		rest.send_json(rest.request(Method::GET, rest.url(&["_config"])?)).await
	}

	/// `GET /_expvar`
	async fn expvar(&self) -> Result<Map<String, Value>> {
		let rest = self.rest();
		rest.send_json(rest.request(Method::GET, rest.url(&["_expvar"])?)).await
	}

	/// `GET /_logging`: enabled state per log key.
	async fn logging(&self) -> Result<BTreeMap<String, bool>> {
		let rest = self.rest();
		rest.send_json(rest.request(Method::GET, rest.url(&["_logging"])?)).await
	}

	/// `PUT /_logging`: replaces the enabled log keys.
	async fn put_logging(&self, keys: &BTreeMap<String, bool>, level: u32) -> Result<()> {
		let rest = self.rest();
		let builder = rest.request(Method::PUT, rest.url(&["_logging"])?).query(&[("level", level)]).json(keys);
		rest.send_empty(builder).await
	}

	/// `POST /_logging`: updates the given log keys only.
	async fn post_logging(&self, keys: &BTreeMap<String, bool>, level: u32) -> Result<()> {
		let rest = self.rest();
		let builder = rest.request(Method::POST, rest.url(&["_logging"])?).query(&[("level", level)]).json(keys);
		rest.send_empty(builder).await
	}

	/// `POST {db}/_session` on behalf of a user, without their password.
	async fn admin_create_session(&self, db: &str, request: &AdminSessionRequest) -> Result<AdminCreateSessionResponse> {
		let rest = self.rest();
		rest.send_json(rest.request(Method::POST, rest.url(&[db, "_session"])?).json(request)).await
	}

	/// `GET {db}/_session/{id}`
	async fn get_session(&self, db: &str, session_id: &str) -> Result<SessionResponse> {
		let rest = self.rest();
		rest.send_json(rest.request(Method::GET, rest.url(&[db, "_session", session_id])?)).await
	}

	/// `DELETE {db}/_session/{id}`
	async fn delete_session_by_id(&self, db: &str, session_id: &str) -> Result<()> {
		let rest = self.rest();
		rest.send_empty(rest.request(Method::DELETE, rest.url(&[db, "_session", session_id])?)).await
	}

	/// `DELETE {db}/_user/{name}/_session`: every session of `name`.
	async fn delete_user_sessions(&self, db: &str, name: &str) -> Result<()> {
		let rest = self.rest();
		rest.send_empty(rest.request(Method::DELETE, rest.url(&[db, "_user", name, "_session"])?)).await
	}

	/// `DELETE {db}/_user/{name}/_session/{id}`
	async fn delete_user_session(&self, db: &str, name: &str, session_id: &str) -> Result<()> {
		let rest = self.rest();
		rest.send_empty(rest.request(Method::DELETE, rest.url(&[db, "_user", name, "_session", session_id])?)).await
	}
}
