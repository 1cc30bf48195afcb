//! Main entry point for the oracle updater.
//!
//! Fetches signed oracle updates from a relay and submits them to a consumer
//! contract in a single transaction. The transaction hash is the only thing
//! written to stdout; logs go to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use updater_config::Config;

mod commands;

use commands::TargetArgs;

/// Command-line arguments for the oracle updater.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "ORACLE_UPDATER_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Fetch the latest updates and submit them on-chain
	Submit {
		#[command(flatten)]
		target: TargetArgs,

		/// Print the hash as soon as the transaction is sent
		#[arg(long)]
		no_wait: bool,
	},
	/// Fetch the latest updates and print a summary without submitting
	Fetch {
		#[command(flatten)]
		target: TargetArgs,
	},
	/// List configured network targets
	Networks,
	/// Print the address of the signing account
	Address,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.updater.id);

	match args.command {
		Command::Submit { target, no_wait } => commands::submit(config, &target, no_wait).await?,
		Command::Fetch { target } => commands::fetch(config, &target).await?,
		Command::Networks => print!("{}", commands::format_networks(&config)),
		Command::Address => commands::address(&config).await?,
	}

	Ok(())
}
