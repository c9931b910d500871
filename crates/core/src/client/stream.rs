//! Caller-owned streaming response bodies.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::Result;

type Chunks = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Body of a streamed response, read incrementally.
///
/// Dropping the stream closes the underlying connection, which is also how a
/// pending long-poll is cancelled.
pub struct ByteStream {
	status: StatusCode,
	content_type: Option<String>,
	content_length: Option<u64>,
	chunks: Chunks,
	pending: BytesMut,
}

impl ByteStream {
	pub(crate) fn new(response: reqwest::Response) -> Self {
		let content_type = response
			.headers()
			.get(reqwest::header::CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.map(str::to_string);
		Self {
			status: response.status(),
			content_type,
			content_length: response.content_length(),
			chunks: Box::pin(response.bytes_stream()),
			pending: BytesMut::new(),
		}
	}

	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn content_type(&self) -> Option<&str> {
		self.content_type.as_deref()
	}

	pub fn content_length(&self) -> Option<u64> {
		self.content_length
	}

	/// Next chunk of the body as it arrives, `None` at end of body.
	pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
		if !self.pending.is_empty() {
			return Ok(Some(self.pending.split().freeze()));
		}
		Ok(self.chunks.next().await.transpose()?)
	}

	/// Next non-blank line of the body, without its terminator.
	///
	/// Blank lines are heartbeats on continuous feeds and are skipped. A
	/// trailing line without a newline is returned once the body ends.
	pub async fn next_line(&mut self) -> Result<Option<String>> {
		loop {
			if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
				let line = self.pending.split_to(pos + 1);
				let text = String::from_utf8_lossy(&line);
				let text = text.trim();
				if text.is_empty() {
					continue;
				}
				return Ok(Some(text.to_string()));
			}

			match self.chunks.next().await.transpose()? {
				Some(chunk) => self.pending.extend_from_slice(&chunk),
				None => {
					let rest = self.pending.split();
					let text = String::from_utf8_lossy(&rest);
					let text = text.trim();
					return Ok((!text.is_empty()).then(|| text.to_string()));
				}
			}
		}
	}

	/// Buffers the remainder of the body.
	pub async fn read_to_end(mut self) -> Result<Bytes> {
		let mut body = self.pending.split();
		while let Some(chunk) = self.chunks.next().await.transpose()? {
			body.extend_from_slice(&chunk);
		}
		Ok(body.freeze())
	}

	/// Buffers the remainder of the body and decodes it as JSON.
	pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
		let body = self.read_to_end().await?;
		Ok(serde_json::from_slice(&body)?)
	}
}

impl Stream for ByteStream {
	type Item = Result<Bytes>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		if !self.pending.is_empty() {
			let chunk = self.pending.split().freeze();
			return Poll::Ready(Some(Ok(chunk)));
		}
		self.chunks.poll_next_unpin(cx).map(|item| item.map(|chunk| chunk.map_err(Into::into)))
	}
}

impl fmt::Debug for ByteStream {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ByteStream")
			.field("status", &self.status)
			.field("content_type", &self.content_type)
			.field("content_length", &self.content_length)
			.field("buffered", &self.pending.len())
			.finish_non_exhaustive()
	}
}
