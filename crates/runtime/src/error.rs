use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Failures reported by an orchestration collaborator.
#[derive(Debug, Error)]
pub enum RuntimeError {
	#[error("failed to start gateway at {path}: {message}")]
	Start { path: String, message: String },

	#[error("failed to kill gateway instance {handle}: {message}")]
	Kill { handle: String, message: String },

	#[error("orchestrator returned status {status}: {body}")]
	Status { status: u16, body: String },

	#[error("invalid orchestrator URL: {0}")]
	Url(#[from] url::ParseError),

	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}
