use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::output::EndpointsData;

pub fn execute(config: &Path, host: &str, public_port: Option<u16>, admin_port: Option<u16>) -> anyhow::Result<EndpointsData> {
	let text = std::fs::read_to_string(config).with_context(|| format!("reading {}", config.display()))?;
	let resolution = sgw::resolve(Some(&text), public_port, admin_port, host);
	info!(target = "sgw.cli", config = %config.display(), ?resolution, "config resolved");
	let endpoints = resolution.validate()?;
	EndpointsData::from_config(&endpoints)
}
