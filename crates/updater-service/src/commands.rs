//! Subcommand handlers.

use std::fmt::Write;
use updater_account::create_account;
use updater_config::Config;
use updater_core::{FetchedUpdates, SubmissionError, SubmissionOutcome, UpdaterBuilder};
use updater_types::{truncate_id, Address, FeedId, ReportOutcome};

/// Network target selection shared by `submit` and `fetch`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TargetArgs {
	/// Chain id of the target (defaults to submission.network)
	#[arg(long)]
	pub network: Option<u64>,

	/// Feed to update (defaults to the contract's aggregatorId())
	#[arg(long)]
	pub feed_id: Option<FeedId>,

	/// Consumer contract (defaults to the network's feed_contract)
	#[arg(long)]
	pub contract: Option<Address>,
}

impl TargetArgs {
	fn apply(&self, builder: UpdaterBuilder) -> UpdaterBuilder {
		builder
			.with_network(self.network)
			.with_feed_id(self.feed_id.clone())
			.with_contract(self.contract)
	}
}

pub async fn submit(
	config: Config,
	target: &TargetArgs,
	no_wait: bool,
) -> Result<(), SubmissionError> {
	let updater = target
		.apply(UpdaterBuilder::new(config))
		.skip_confirmation(no_wait)
		.build()?;

	let outcome = updater.submitter.submit(&updater.request).await?;
	match &outcome.receipt {
		Some(receipt) => tracing::info!(
			network = %updater.network_name,
			block = receipt.block_number,
			updates = outcome.update_count,
			"Update confirmed"
		),
		None => tracing::info!(
			network = %updater.network_name,
			updates = outcome.update_count,
			"Update sent"
		),
	}

	print!("{}", format_outcome(&outcome));
	Ok(())
}

pub async fn fetch(config: Config, target: &TargetArgs) -> Result<(), SubmissionError> {
	let updater = target
		.apply(UpdaterBuilder::new(config))
		.build_read_only()?;

	let request = &updater.request;
	let fetched = updater
		.submitter
		.fetch(request.chain_id, request.contract, request.feed_id.as_ref())
		.await?;

	print!("{}", format_batch(&fetched));
	Ok(())
}

pub async fn address(config: &Config) -> Result<(), SubmissionError> {
	let account = create_account(&config.account.primary, &config.account.implementations)?;
	println!("{}", account.get_address().await?);
	Ok(())
}

/// Renders a fetched batch as one header line plus one line per report.
pub fn format_batch(fetched: &FetchedUpdates) -> String {
	let mut out = String::new();
	let _ = writeln!(
		out,
		"feed {}: {} updates, {} reports",
		fetched.feed_id,
		fetched.batch.len(),
		fetched.batch.results.len()
	);

	for report in &fetched.batch.results {
		let oracle = truncate_id(&report.oracle_pubkey);
		match report.outcome() {
			ReportOutcome::Success(value) => {
				let _ = writeln!(out, "  {} ok {}", oracle, value);
			},
			ReportOutcome::Failure(error) => {
				let _ = writeln!(
					out,
					"  {} failed: {} ({} recent successes)",
					oracle,
					error,
					report.fallbacks().len()
				);
			},
		}
	}

	out
}

/// Renders the transaction hash of a submission as a single line.
///
/// Block and update count go to the log so stdout carries only the hash.
pub fn format_outcome(outcome: &SubmissionOutcome) -> String {
	format!("{}\n", outcome.tx_hash)
}

/// Lists network targets, marking the default one with `*`.
pub fn format_networks(config: &Config) -> String {
	let mut out = String::new();
	for (chain_id, network) in &config.networks {
		let marker = if *chain_id == config.submission.network {
			'*'
		} else {
			' '
		};
		let contract = network
			.feed_contract
			.map(|c| c.to_string())
			.unwrap_or_else(|| "-".to_string());
		let _ = writeln!(
			out,
			"{} {:>8} {:<20} rpc={} relay={} contract={}",
			marker,
			chain_id,
			network.display_name(*chain_id),
			network.rpc_url,
			network.relay_url,
			contract
		);
	}
	out
}
