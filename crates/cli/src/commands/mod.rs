mod info;
mod replication;
mod resolve;
mod up;

use std::time::Instant;

use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::cli::{Cli, Commands};
use crate::output::{CommandError, CommandResult, ErrorCode, OutputFormat, print_result};

/// Runs the selected command and prints its envelope. Returns whether it succeeded.
pub async fn dispatch(cli: Cli) -> bool {
	let format = cli.format;
	let started = Instant::now();
	match cli.command {
		Commands::Resolve {
			config,
			host,
			public_port,
			admin_port,
		} => emit("resolve", started, resolve::execute(&config, &host, public_port, admin_port), format),
		Commands::ReplicationUrl { url, db } => emit("replication-url", started, replication::execute(&url, &db), format),
		Commands::Info {
			url,
			public_port,
			admin_port,
			admin,
			insecure,
		} => emit(
			"info",
			started,
			info::execute(&url, public_port, admin_port, admin, insecure).await,
			format,
		),
		Commands::Up {
			orchestrator,
			path,
			config,
			host,
			no_wait,
		} => {
			let args = up::UpArgs {
				orchestrator,
				path,
				config,
				host,
				no_wait,
			};
			emit("up", started, up::execute(args, format).await, format)
		}
	}
}

fn emit<T: Serialize>(command: &str, started: Instant, result: anyhow::Result<T>, format: OutputFormat) -> bool {
	let duration_ms = started.elapsed().as_millis() as u64;
	match result {
		Ok(data) => {
			print_result(&CommandResult::success(command, data).with_duration(duration_ms), format);
			true
		}
		Err(err) => {
			error!(target = "sgw.cli", command, error = %format!("{err:#}"), "command failed");
			let failure: CommandResult<()> = CommandResult::failure(command, describe(&err)).with_duration(duration_ms);
			print_result(&failure, format);
			false
		}
	}
}

fn describe(err: &anyhow::Error) -> CommandError {
	let message = format!("{err:#}");
	if let Some(e) = err.downcast_ref::<sgw::Error>() {
		let (code, details) = match e {
			sgw::Error::InvalidPort { interface, value } => (ErrorCode::InvalidConfig, Some(json!({"interface": interface.to_string(), "value": value}))),
			sgw::Error::ClientBind { url, .. } => (ErrorCode::InvalidConfig, Some(json!({"url": url}))),
			sgw::Error::UnsupportedScheme(scheme) => (ErrorCode::UnsupportedScheme, Some(json!({"scheme": scheme}))),
			sgw::Error::Url(_) => (ErrorCode::InvalidInput, None),
			sgw::Error::Runtime(_) => (ErrorCode::OrchestratorFailed, None),
			sgw::Error::Status { status, body, .. } => (ErrorCode::RequestFailed, Some(json!({"status": status.as_u16(), "body": body}))),
			sgw::Error::Http(_) | sgw::Error::Json(_) => (ErrorCode::RequestFailed, None),
		};
		return CommandError { code, message, details };
	}

	let code = if err.downcast_ref::<std::io::Error>().is_some() {
		ErrorCode::IoError
	} else if err.downcast_ref::<url::ParseError>().is_some() {
		ErrorCode::InvalidInput
	} else {
		ErrorCode::InternalError
	};
	CommandError { code, message, details: None }
}
