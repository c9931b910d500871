use std::time::Duration;

use sgw::prelude::*;
use sgw::protocol::ServerInfoResponse;
use sgw::{ClientOptions, EndpointConfig, SyncGateway};
use tracing::info;
use url::Url;

pub async fn execute(url: &str, public_port: u16, admin_port: u16, admin: bool, insecure: bool) -> anyhow::Result<ServerInfoResponse> {
	let base = Url::parse(url)?;
	let endpoints = EndpointConfig::from_url(&base, public_port, admin_port)?;
	let options = ClientOptions::default().with_timeout(Duration::from_secs(30)).accept_invalid_certs(insecure);
	let gateway = SyncGateway::connect(endpoints, &options)?;

	let info = if admin {
		gateway.admin().server_info().await?
	} else {
		gateway.public().server_info().await?
	};
	info!(target = "sgw.cli", version = info.version.as_deref().unwrap_or("unknown"), admin, "server info received");
	Ok(info)
}
