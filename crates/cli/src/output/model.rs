use serde::{Deserialize, Serialize};

/// The result envelope every command prints.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
}

impl<T: Serialize> CommandResult<T> {
	pub fn success(command: &str, data: T) -> Self {
		Self {
			ok: true,
			command: command.to_string(),
			data: Some(data),
			error: None,
			duration_ms: None,
		}
	}

	pub fn failure(command: &str, error: CommandError) -> Self {
		Self {
			ok: false,
			command: command.to_string(),
			data: None,
			error: Some(error),
			duration_ms: None,
		}
	}

	pub fn with_duration(mut self, duration_ms: u64) -> Self {
		self.duration_ms = Some(duration_ms);
		self
	}
}

/// Error information for failed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	InvalidInput,
	InvalidConfig,
	UnsupportedScheme,
	RequestFailed,
	OrchestratorFailed,
	IoError,
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::InvalidConfig => write!(f, "INVALID_CONFIG"),
			ErrorCode::UnsupportedScheme => write!(f, "UNSUPPORTED_SCHEME"),
			ErrorCode::RequestFailed => write!(f, "REQUEST_FAILED"),
			ErrorCode::OrchestratorFailed => write!(f, "ORCHESTRATOR_FAILED"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

/// Endpoints of a resolved or launched gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointsData {
	pub scheme: String,
	pub host: String,
	pub public_port: u16,
	pub admin_port: u16,
	pub public_url: String,
	pub admin_url: String,
}

impl EndpointsData {
	pub fn from_config(endpoints: &sgw::EndpointConfig) -> anyhow::Result<Self> {
		Ok(Self {
			scheme: endpoints.scheme().to_string(),
			host: endpoints.host().to_string(),
			public_port: endpoints.public_port(),
			admin_port: endpoints.admin_port(),
			public_url: endpoints.public_url()?.to_string(),
			admin_url: endpoints.admin_url()?.to_string(),
		})
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationUrlData {
	pub url: String,
}

/// Output of `up`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchData {
	pub handle: String,
	#[serde(flatten)]
	pub endpoints: EndpointsData,
	pub released: bool,
}
