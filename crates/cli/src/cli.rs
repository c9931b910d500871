use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "sgw")]
#[command(about = "Sync Gateway test-environment helper")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short, long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Derive scheme, host and ports from a gateway config file
	Resolve {
		/// Gateway configuration file
		config: PathBuf,
		#[arg(long, default_value = "localhost")]
		host: String,
		/// Public port when the config has no `interface`
		#[arg(long)]
		public_port: Option<u16>,
		/// Admin port when the config has no `adminInterface`
		#[arg(long)]
		admin_port: Option<u16>,
	},

	/// Translate a gateway URL into the replication URL for a database
	#[command(alias = "repl")]
	ReplicationUrl { url: String, db: String },

	/// Query server info from a running gateway
	Info {
		/// Base URL of the gateway; its port is ignored
		url: String,
		#[arg(long, default_value_t = sgw::DEFAULT_PUBLIC_PORT)]
		public_port: u16,
		#[arg(long, default_value_t = sgw::DEFAULT_ADMIN_PORT)]
		admin_port: u16,
		/// Ask the admin interface instead of the public one
		#[arg(long)]
		admin: bool,
		/// Accept self-signed certificates
		#[arg(long, short = 'k')]
		insecure: bool,
	},

	/// Start a gateway through an orchestration service
	Up {
		/// Base URL of the orchestration service
		#[arg(long, short)]
		orchestrator: String,
		/// Instance path handed to the orchestrator
		#[arg(long, default_value = "sgw-cli")]
		path: String,
		/// Gateway configuration file
		#[arg(long, short)]
		config: Option<PathBuf>,
		#[arg(long, default_value = "localhost")]
		host: String,
		/// Release the instance right after reporting it instead of waiting for Ctrl-C
		#[arg(long)]
		no_wait: bool,
	},
}
