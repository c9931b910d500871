//! Endpoint resolution from gateway configuration text.
//!
//! The configuration handed to (or echoed back by) the orchestrator is not
//! guaranteed to be well-formed JSON, so it is never parsed. Instead a few
//! well-known keys are scraped with [`extract_key`]:
//!
//! | Key              | Meaning                          |
//! |------------------|----------------------------------|
//! | `interface`      | public listener, `[host]:port`   |
//! | `adminInterface` | admin listener, `[host]:port`    |
//! | `SSLCert`        | TLS certificate path             |
//! | `SSLKey`         | TLS private key path             |
//!
//! Resolution itself never fails. A port value that is present but cannot be
//! parsed becomes [`ResolvedPort::Invalid`], and [`EndpointResolution::validate`]
//! turns that into a construction error.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

/// Public listener port used when neither configuration nor caller names one.
pub const DEFAULT_PUBLIC_PORT: u16 = 4984;
/// Admin listener port used when neither configuration nor caller names one.
pub const DEFAULT_ADMIN_PORT: u16 = 4985;
pub const DEFAULT_HOST: &str = "localhost";

const SSL_CERT_KEY: &str = "SSLCert";
const SSL_KEY_KEY: &str = "SSLKey";

/// Patterns for the keys [`resolve`] looks up, compiled once.
static KNOWN_KEY_PATTERNS: LazyLock<[(&str, Regex); 4]> = LazyLock::new(|| {
	[Interface::Public.config_key(), Interface::Admin.config_key(), SSL_CERT_KEY, SSL_KEY_KEY]
		.map(|key| (key, Regex::new(&key_pattern(key)).expect("known key pattern should compile")))
});

/// The two privilege tiers of the REST surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
	Public,
	Admin,
}

impl Interface {
	/// Configuration key holding this interface's listen address.
	pub fn config_key(self) -> &'static str {
		match self {
			Interface::Public => "interface",
			Interface::Admin => "adminInterface",
		}
	}

	pub fn default_port(self) -> u16 {
		match self {
			Interface::Public => DEFAULT_PUBLIC_PORT,
			Interface::Admin => DEFAULT_ADMIN_PORT,
		}
	}
}

impl fmt::Display for Interface {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Interface::Public => write!(f, "public"),
			Interface::Admin => write!(f, "admin"),
		}
	}
}

/// Transport security of a gateway's listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
	#[default]
	Http,
	Https,
}

impl Scheme {
	pub fn from_secure(secure: bool) -> Self {
		if secure { Scheme::Https } else { Scheme::Http }
	}

	/// Maps a URL scheme onto a gateway scheme; anything but `http`/`https` is `None`.
	pub fn from_url_scheme(scheme: &str) -> Option<Self> {
		match scheme {
			"http" => Some(Scheme::Http),
			"https" => Some(Scheme::Https),
			_ => None,
		}
	}

	pub fn is_secure(self) -> bool {
		self == Scheme::Https
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Scheme::Http => "http",
			Scheme::Https => "https",
		}
	}

	/// Scheme of the streaming replication endpoint.
	pub fn replication_scheme(self) -> &'static str {
		match self {
			Scheme::Http => "blip",
			Scheme::Https => "blips",
		}
	}
}

impl fmt::Display for Scheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Port after resolution, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPort {
	Port(u16),
	/// The configuration named a port that is not a usable TCP port.
	Invalid(String),
}

impl ResolvedPort {
	pub fn port(&self) -> Option<u16> {
		match self {
			ResolvedPort::Port(port) => Some(*port),
			ResolvedPort::Invalid(_) => None,
		}
	}
}

/// Output of [`resolve`]; may still carry invalid ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolution {
	pub scheme: Scheme,
	pub host: String,
	pub public_port: ResolvedPort,
	pub admin_port: ResolvedPort,
}

impl EndpointResolution {
	/// Rejects invalid ports, producing a usable [`EndpointConfig`].
	pub fn validate(self) -> Result<EndpointConfig> {
		let public_port = require_port(Interface::Public, self.public_port)?;
		let admin_port = require_port(Interface::Admin, self.admin_port)?;
		EndpointConfig::new(self.scheme, self.host, public_port, admin_port)
	}
}

fn require_port(interface: Interface, port: ResolvedPort) -> Result<u16> {
	match port {
		ResolvedPort::Port(port) => Ok(port),
		ResolvedPort::Invalid(value) => Err(Error::InvalidPort { interface, value }),
	}
}

/// Where a gateway's two interfaces listen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
	scheme: Scheme,
	host: String,
	public_port: u16,
	admin_port: u16,
}

impl EndpointConfig {
	pub fn new(scheme: Scheme, host: impl Into<String>, public_port: u16, admin_port: u16) -> Result<Self> {
		for (interface, port) in [(Interface::Public, public_port), (Interface::Admin, admin_port)] {
			if port == 0 {
				return Err(Error::InvalidPort {
					interface,
					value: port.to_string(),
				});
			}
		}
		Ok(Self {
			scheme,
			host: host.into(),
			public_port,
			admin_port,
		})
	}

	/// Takes scheme and host from `url`, ignoring its port and path.
	pub fn from_url(url: &Url, public_port: u16, admin_port: u16) -> Result<Self> {
		let scheme = Scheme::from_url_scheme(url.scheme()).ok_or_else(|| Error::UnsupportedScheme(url.scheme().to_string()))?;
		let host = url.host_str().ok_or(Error::Url(url::ParseError::EmptyHost))?;
		Self::new(scheme, host, public_port, admin_port)
	}

	pub fn scheme(&self) -> Scheme {
		self.scheme
	}

	pub fn host(&self) -> &str {
		&self.host
	}

	pub fn public_port(&self) -> u16 {
		self.public_port
	}

	pub fn admin_port(&self) -> u16 {
		self.admin_port
	}

	pub fn port(&self, interface: Interface) -> u16 {
		match interface {
			Interface::Public => self.public_port,
			Interface::Admin => self.admin_port,
		}
	}

	/// Base URL of `interface`, `{scheme}://{host}:{port}/`.
	pub fn url_for(&self, interface: Interface) -> std::result::Result<Url, url::ParseError> {
		let host = if self.host.contains(':') && !self.host.starts_with('[') {
			format!("[{}]", self.host)
		} else {
			self.host.clone()
		};
		Url::parse(&format!("{}://{}:{}/", self.scheme, host, self.port(interface)))
	}

	pub fn public_url(&self) -> std::result::Result<Url, url::ParseError> {
		self.url_for(Interface::Public)
	}

	pub fn admin_url(&self) -> std::result::Result<Url, url::ParseError> {
		self.url_for(Interface::Admin)
	}
}

/// Best-effort key extraction from unstructured configuration text.
///
/// Finds the first `"<key>" : "<value>"` occurrence and returns `value`.
/// Keys match case-sensitively; whitespace around the colon is tolerated.
/// Non-string values (`null`, numbers, objects) never match.
pub fn extract_key(text: &str, key: &str) -> Option<String> {
	match KNOWN_KEY_PATTERNS.iter().find(|(known, _)| *known == key) {
		Some((_, re)) => capture_value(re, text),
		None => capture_value(&Regex::new(&key_pattern(key)).ok()?, text),
	}
}

fn key_pattern(key: &str) -> String {
	format!(r#""{}"\s*:\s*"([^"]*)""#, regex::escape(key))
}

fn capture_value(re: &Regex, text: &str) -> Option<String> {
	re.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

/// Parses the port out of an interface value such as `0.0.0.0:4984` or `:4984`.
pub fn parse_port(value: &str) -> ResolvedPort {
	let token = value.rsplit(':').next().unwrap_or(value).trim();
	match token.parse::<u16>() {
		Ok(port) if port != 0 => ResolvedPort::Port(port),
		_ => ResolvedPort::Invalid(value.to_string()),
	}
}

/// `https` iff both a TLS certificate and key are configured.
pub fn resolve_scheme(config_text: Option<&str>) -> Scheme {
	let Some(text) = config_text else {
		return Scheme::Http;
	};
	let secure = extract_key(text, SSL_CERT_KEY).is_some() && extract_key(text, SSL_KEY_KEY).is_some();
	Scheme::from_secure(secure)
}

fn resolve_port(config_text: Option<&str>, interface: Interface, fallback: Option<u16>) -> ResolvedPort {
	match config_text.and_then(|text| extract_key(text, interface.config_key())) {
		Some(value) => parse_port(&value),
		None => ResolvedPort::Port(fallback.unwrap_or_else(|| interface.default_port())),
	}
}

/// Derives scheme and ports for a gateway on `host`.
///
/// Ports come from the configuration when its key is present; otherwise from
/// the caller-supplied fallback, otherwise from the built-in defaults.
pub fn resolve(config_text: Option<&str>, public_port: Option<u16>, admin_port: Option<u16>, host: &str) -> EndpointResolution {
	EndpointResolution {
		scheme: resolve_scheme(config_text),
		host: host.to_string(),
		public_port: resolve_port(config_text, Interface::Public, public_port),
		admin_port: resolve_port(config_text, Interface::Admin, admin_port),
	}
}
