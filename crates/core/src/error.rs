use reqwest::StatusCode;
use thiserror::Error;

use crate::endpoint::Interface;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// A configured interface port could not be turned into a TCP port.
	#[error("invalid {interface} port: {value:?}")]
	InvalidPort { interface: Interface, value: String },

	/// A client could not be bound to its base URL.
	#[error("cannot bind {interface} client to {url}: {reason}")]
	ClientBind { interface: Interface, url: String, reason: String },

	#[error("unsupported URL scheme: {0}")]
	UnsupportedScheme(String),

	/// The gateway answered with a non-success status.
	#[error("{method} {url} returned {status}: {body}")]
	Status {
		method: String,
		url: String,
		status: StatusCode,
		body: String,
	},

	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("invalid URL: {0}")]
	Url(#[from] url::ParseError),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Runtime(#[from] sgw_runtime::RuntimeError),
}

impl Error {
	/// HTTP status for [`Error::Status`] failures.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Error::Status { status, .. } => Some(*status),
			Error::Http(e) => e.status(),
			_ => None,
		}
	}

	/// Whether this error means a facade could not be constructed.
	pub fn is_construction(&self) -> bool {
		matches!(
			self,
			Error::InvalidPort { .. } | Error::ClientBind { .. } | Error::UnsupportedScheme(_) | Error::Url(_) | Error::Runtime(_)
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_is_exposed_for_rejected_requests() {
		let err = Error::Status {
			method: "PUT".into(),
			url: "http://localhost:4984/db/doc".into(),
			status: StatusCode::CONFLICT,
			body: r#"{"error":"conflict","reason":"Document revision conflict"}"#.into(),
		};
		assert_eq!(err.status(), Some(StatusCode::CONFLICT));
		assert!(!err.is_construction());
		assert!(err.to_string().contains("409"));
		assert!(err.to_string().contains("Document revision conflict"));
	}

	#[test]
	fn invalid_port_is_a_construction_error() {
		let err = Error::InvalidPort {
			interface: Interface::Admin,
			value: ":abc".into(),
		};
		assert!(err.is_construction());
		assert_eq!(err.to_string(), "invalid admin port: \":abc\"");
	}
}
