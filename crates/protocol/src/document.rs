//! Document, attachment and bulk-operation bodies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of a document or attachment write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PutResponse {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub rev: Option<String>,
	#[serde(default)]
	pub ok: bool,
}

/// A document as returned by `GET {db}/{doc}` or `GET {db}/_local/{id}`.
///
/// Underscore-prefixed metadata is split out; every other top-level property
/// lands in [`DocumentResponse::properties`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentResponse {
	#[serde(rename = "_id", default)]
	pub id: Option<String>,
	#[serde(rename = "_rev", default)]
	pub rev: Option<String>,
	#[serde(rename = "_deleted", default, skip_serializing_if = "std::ops::Not::not")]
	pub deleted: bool,
	#[serde(rename = "_revisions", default, skip_serializing_if = "Option::is_none")]
	pub revisions: Option<Revisions>,
	#[serde(rename = "_attachments", default, skip_serializing_if = "BTreeMap::is_empty")]
	pub attachments: BTreeMap<String, AttachmentEntry>,
	#[serde(flatten)]
	pub properties: Map<String, Value>,
}

impl DocumentResponse {
	/// Returns a user property by name.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.properties.get(key)
	}
}

/// Revision history requested with `revs=true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revisions {
	pub start: u64,
	pub ids: Vec<String>,
}

/// Attachment metadata (or inline data) inside `_attachments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentEntry {
	#[serde(default)]
	pub content_type: Option<String>,
	#[serde(default)]
	pub digest: Option<String>,
	#[serde(default)]
	pub length: Option<u64>,
	#[serde(default)]
	pub revpos: Option<u64>,
	#[serde(default)]
	pub stub: bool,
	/// Base64 body, present when fetched with `attachments=true`.
	#[serde(rename = "data", default)]
	pub base64_data: Option<String>,
}

/// `GET|POST {db}/_all_docs` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllDocsResponse {
	#[serde(default)]
	pub offset: Option<Value>,
	#[serde(default)]
	pub rows: Vec<AllDocsRow>,
	#[serde(default)]
	pub total_rows: u64,
	#[serde(default)]
	pub update_seq: Option<Value>,
}

/// One row of `_all_docs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllDocsRow {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub key: Value,
	#[serde(default)]
	pub value: Value,
	#[serde(default)]
	pub doc: Option<DocumentResponse>,
	#[serde(default)]
	pub error: Option<String>,
}

/// Request body for `POST {db}/_bulk_docs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkDocsRequest {
	pub docs: Vec<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub new_edits: Option<bool>,
}

impl BulkDocsRequest {
	pub fn new(docs: Vec<Value>) -> Self {
		Self { docs, new_edits: None }
	}

	/// Submits revisions as-is (replication style) instead of minting new ones.
	pub fn with_new_edits(mut self, new_edits: bool) -> Self {
		self.new_edits = Some(new_edits);
		self
	}
}

/// Per-document outcome of `_bulk_docs`.
///
/// The batch is not atomic: every item succeeds or fails on its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkDocsResponseItem {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub rev: Option<String>,
	#[serde(default)]
	pub error: Option<String>,
	#[serde(default)]
	pub reason: Option<String>,
	#[serde(default)]
	pub status: Option<u16>,
}

impl BulkDocsResponseItem {
	pub fn is_ok(&self) -> bool {
		self.error.is_none()
	}
}

/// One document reference inside a `_bulk_get` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkGetItem {
	pub id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rev: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub atts_since: Option<Vec<String>>,
}

impl BulkGetItem {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			rev: None,
			atts_since: None,
		}
	}

	pub fn with_rev(mut self, rev: impl Into<String>) -> Self {
		self.rev = Some(rev.into());
		self
	}
}

/// Request body for `POST {db}/_bulk_get`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkGetRequest {
	pub docs: Vec<BulkGetItem>,
}

/// One element of a `GET {db}/{doc}?open_revs=..` response.
///
/// Exactly one of the two fields is set: the revision body, or the revision
/// ID the gateway does not have.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRevision {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ok: Option<DocumentResponse>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub missing: Option<String>,
}
