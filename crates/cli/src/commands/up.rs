use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use sgw::prelude::*;
use sgw::{HttpOrchestrator, LaunchOptions, Orchestrator, SyncGateway};
use tracing::{info, warn};

use crate::output::{CommandResult, EndpointsData, LaunchData, OutputFormat, print_result};

pub struct UpArgs {
	pub orchestrator: String,
	pub path: String,
	pub config: Option<PathBuf>,
	pub host: String,
	pub no_wait: bool,
}

/// Launches a gateway and releases it again.
///
/// Unless `no_wait` is set, an `up.ready` envelope is printed as soon as the
/// gateway answers, and the instance is held until Ctrl-C.
pub async fn execute(args: UpArgs, format: OutputFormat) -> anyhow::Result<LaunchData> {
	let orchestrator: Arc<dyn Orchestrator> = Arc::new(HttpOrchestrator::new(&args.orchestrator).map_err(sgw::Error::from)?);

	let mut options = LaunchOptions::new(args.path).with_host(args.host);
	if let Some(path) = &args.config {
		let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
		options = options.with_config(text);
	}

	let gateway = SyncGateway::launch(orchestrator, options).await?;
	let handle = gateway.instance().map(|handle| handle.id).unwrap_or_default();
	let endpoints = EndpointsData::from_config(gateway.endpoints())?;

	if !args.no_wait {
		match gateway.public().server_info().await {
			Ok(server) => info!(target = "sgw.cli", %handle, version = server.version.as_deref().unwrap_or("unknown"), "gateway answering"),
			Err(e) => warn!(target = "sgw.cli", %handle, error = %e, "gateway not answering yet"),
		}
		let ready = LaunchData {
			handle: handle.clone(),
			endpoints: endpoints.clone(),
			released: false,
		};
		print_result(&CommandResult::success("up.ready", ready), format);

		if let Err(e) = tokio::signal::ctrl_c().await {
			warn!(target = "sgw.cli", error = %e, "cannot listen for Ctrl-C; releasing now");
		}
	}

	gateway.shutdown().await;
	Ok(LaunchData {
		handle,
		endpoints,
		released: true,
	})
}
