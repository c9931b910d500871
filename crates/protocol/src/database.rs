//! Database-level bodies: `{db}/`, `{db}/_changes`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sequence identifier as reported by the gateway.
///
/// Plain feeds report integers; feeds with backfill or channel removal
/// report compound strings such as `"12:3"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sequence {
	Number(u64),
	Text(String),
}

impl Sequence {
	/// Returns the numeric value when the sequence is a plain integer.
	pub fn as_u64(&self) -> Option<u64> {
		match self {
			Sequence::Number(n) => Some(*n),
			Sequence::Text(s) => s.parse().ok(),
		}
	}
}

impl fmt::Display for Sequence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Sequence::Number(n) => write!(f, "{n}"),
			Sequence::Text(s) => f.write_str(s),
		}
	}
}

/// `GET {db}/` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbResponse {
	pub db_name: String,
	#[serde(default)]
	pub committed_update_seq: Option<Sequence>,
	#[serde(default)]
	pub disk_format_version: Option<i64>,
	#[serde(default)]
	pub purge_seq: Option<Sequence>,
	#[serde(default)]
	pub instance_start_time: Option<Value>,
	#[serde(default)]
	pub state: Option<String>,
	#[serde(default)]
	pub update_seq: Option<Sequence>,
	#[serde(default)]
	pub compact_running: bool,
}

/// `POST {db}/_changes` response for `feed=normal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangesFeedResponse {
	#[serde(default)]
	pub results: Vec<ChangesFeedEntry>,
	pub last_seq: Sequence,
}

/// One row of a changes feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangesFeedEntry {
	pub seq: Sequence,
	pub id: String,
	#[serde(default)]
	pub doc: Option<Map<String, Value>>,
	#[serde(default)]
	pub changes: Vec<Change>,
	#[serde(default)]
	pub deleted: bool,
	#[serde(default)]
	pub removed: Option<Vec<String>>,
}

/// Revision reference inside a changes row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
	pub rev: String,
}

/// `feed` parameter of `{db}/_changes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangesFeedMode {
	#[default]
	Normal,
	Longpoll,
	Continuous,
}

/// Body of `POST {db}/_changes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangesRequest {
	#[serde(default)]
	pub feed: ChangesFeedMode,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub since: Option<Sequence>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit: Option<u64>,
	/// Long-poll/continuous wait in milliseconds.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timeout: Option<u64>,
	/// Interval of blank keep-alive lines in milliseconds.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub heartbeat: Option<u64>,
	#[serde(skip_serializing_if = "std::ops::Not::not", default)]
	pub include_docs: bool,
	#[serde(skip_serializing_if = "std::ops::Not::not", default)]
	pub active_only: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub style: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub filter: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub channels: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub doc_ids: Option<Vec<String>>,
}

impl ChangesRequest {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_feed(mut self, feed: ChangesFeedMode) -> Self {
		self.feed = feed;
		self
	}

	pub fn with_since(mut self, since: impl Into<Sequence>) -> Self {
		self.since = Some(since.into());
		self
	}

	pub fn with_limit(mut self, limit: u64) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn with_timeout(mut self, millis: u64) -> Self {
		self.timeout = Some(millis);
		self
	}

	pub fn with_heartbeat(mut self, millis: u64) -> Self {
		self.heartbeat = Some(millis);
		self
	}

	pub fn with_docs(mut self) -> Self {
		self.include_docs = true;
		self
	}

	/// Restricts the feed to `channels`, using the `sync_gateway/bychannel` filter.
	pub fn with_channels<I, S>(mut self, channels: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let joined = channels.into_iter().map(|c| c.as_ref().to_string()).collect::<Vec<_>>().join(",");
		self.filter = Some("sync_gateway/bychannel".to_string());
		self.channels = Some(joined);
		self
	}

	pub fn with_doc_ids<I, S>(mut self, ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.filter = Some("_doc_ids".to_string());
		self.doc_ids = Some(ids.into_iter().map(Into::into).collect());
		self
	}
}

impl From<u64> for Sequence {
	fn from(value: u64) -> Self {
		Sequence::Number(value)
	}
}

impl From<String> for Sequence {
	fn from(value: String) -> Self {
		Sequence::Text(value)
	}
}

impl From<&str> for Sequence {
	fn from(value: &str) -> Self {
		Sequence::Text(value.to_string())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn changes_feed_accepts_numeric_and_compound_sequences() {
		let feed: ChangesFeedResponse = serde_json::from_value(json!({
			"results": [
				{"seq": 1, "id": "_user/alice", "changes": []},
				{"seq": "3:2", "id": "doc1", "changes": [{"rev": "1-abc"}]},
				{"seq": 4, "id": "doc2", "deleted": true, "changes": [{"rev": "2-def"}]}
			],
			"last_seq": "4"
		}))
		.unwrap();

		assert_eq!(feed.results.len(), 3);
		assert_eq!(feed.results[0].seq, Sequence::Number(1));
		assert_eq!(feed.results[1].seq.as_u64(), None);
		assert_eq!(feed.results[1].changes[0].rev, "1-abc");
		assert!(feed.results[2].deleted);
		assert_eq!(feed.last_seq.as_u64(), Some(4));
		assert_eq!(feed.last_seq.to_string(), "4");
	}

	#[test]
	fn db_response_tolerates_missing_fields() {
		let db: DbResponse = serde_json::from_value(json!({
			"db_name": "db",
			"update_seq": 12,
			"state": "Online"
		}))
		.unwrap();

		assert_eq!(db.db_name, "db");
		assert_eq!(db.update_seq, Some(Sequence::Number(12)));
		assert_eq!(db.state.as_deref(), Some("Online"));
		assert!(!db.compact_running);
	}

	#[test]
	fn changes_request_omits_unset_options() {
		let body = serde_json::to_value(ChangesRequest::new().with_feed(ChangesFeedMode::Longpoll).with_since(7).with_channels(["a", "b"])).unwrap();
		assert_eq!(
			body,
			json!({
				"feed": "longpoll",
				"since": 7,
				"filter": "sync_gateway/bychannel",
				"channels": "a,b"
			})
		);
	}
}
