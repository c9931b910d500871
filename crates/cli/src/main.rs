use clap::Parser;
use sgw_cli::{cli::Cli, commands, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if !commands::dispatch(cli).await {
		std::process::exit(1);
	}
}
