//! Replication endpoint URLs.

use url::Url;

use crate::endpoint::Scheme;
use crate::error::{Error, Result};

/// Turns a gateway base URL into the streaming replication URL for `db`.
///
/// Host and effective port are kept, `http` becomes `blip`, `https` becomes
/// `blips`, and the path is replaced by the database name. Other schemes are
/// rejected.
pub fn replication_url(base: &Url, db: &str) -> Result<Url> {
	let scheme = Scheme::from_url_scheme(base.scheme()).ok_or_else(|| Error::UnsupportedScheme(base.scheme().to_string()))?;
	let host = match base.host() {
		Some(url::Host::Ipv6(addr)) => format!("[{addr}]"),
		Some(host) => host.to_string(),
		None => return Err(Error::Url(url::ParseError::EmptyHost)),
	};
	let port = base.port_or_known_default().ok_or(Error::Url(url::ParseError::InvalidPort))?;

	let mut url = Url::parse(&format!("{}://{}:{}/", scheme.replication_scheme(), host, port))?;
	url.path_segments_mut()
		.map_err(|_| Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
		.clear()
		.push(db);
	Ok(url)
}
