//! Builder wiring the submitter from configuration.
//!
//! Picks the network target, applies command-line overrides on top of the
//! `[submission]` table and constructs the relay client, the signing account
//! and the consumer contract client for that target.

use crate::submitter::{OracleUpdateSubmitter, SubmissionRequest};
use crate::SubmissionError;
use alloy_network::EthereumWallet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use updater_account::{create_account, AccountError, AccountService};
use updater_config::Config;
use updater_delivery::{implementations::evm::alloy::AlloyFeedContract, DeliveryError};
use updater_relay::{implementations::crossbar::CrossbarRelay, RelayError};
use updater_types::{Address, ConfirmationPolicy, FeedId, NetworkConfig};

/// Errors that can occur while assembling the updater.
#[derive(Debug, Error)]
pub enum BuilderError {
	/// A configured value could not be used.
	#[error("Configuration error: {0}")]
	Config(String),
	/// Nothing configures a component the updater needs, such as the contract.
	#[error("Missing required component: {0}")]
	MissingComponent(String),
	#[error(transparent)]
	Account(#[from] AccountError),
	#[error(transparent)]
	Relay(#[from] RelayError),
	#[error(transparent)]
	Delivery(#[from] DeliveryError),
}

impl From<BuilderError> for SubmissionError {
	fn from(err: BuilderError) -> Self {
		match err {
			BuilderError::Account(e) => e.into(),
			BuilderError::Relay(e) => e.into(),
			BuilderError::Delivery(e) => e.into(),
			other => SubmissionError::Config(other.to_string()),
		}
	}
}

/// A fully wired updater for one network target.
pub struct Updater {
	pub submitter: OracleUpdateSubmitter,
	/// Parameters resolved from configuration and CLI overrides.
	pub request: SubmissionRequest,
	/// Signing account; absent for read-only updaters.
	pub account: Option<AccountService>,
	/// Display name of the selected network.
	pub network_name: String,
}

/// Builder for constructing an [`Updater`] from configuration.
pub struct UpdaterBuilder {
	config: Config,
	network: Option<u64>,
	feed_id: Option<FeedId>,
	contract: Option<Address>,
	skip_confirmation: bool,
}

impl UpdaterBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			network: None,
			feed_id: None,
			contract: None,
			skip_confirmation: false,
		}
	}

	/// Selects a network other than `submission.network`.
	pub fn with_network(mut self, chain_id: Option<u64>) -> Self {
		self.network = chain_id.or(self.network);
		self
	}

	/// Overrides `submission.feed_id`.
	pub fn with_feed_id(mut self, feed_id: Option<FeedId>) -> Self {
		self.feed_id = feed_id.or(self.feed_id);
		self
	}

	/// Overrides the network's `feed_contract`.
	pub fn with_contract(mut self, contract: Option<Address>) -> Self {
		self.contract = contract.or(self.contract);
		self
	}

	/// Returns right after sending instead of waiting for confirmation.
	pub fn skip_confirmation(mut self, skip: bool) -> Self {
		self.skip_confirmation = skip;
		self
	}

	/// Chain id of the selected network.
	pub fn chain_id(&self) -> u64 {
		self.network.unwrap_or(self.config.submission.network)
	}

	fn network_config(&self) -> Result<&NetworkConfig, BuilderError> {
		self.config
			.network(self.chain_id())
			.map_err(|e| BuilderError::Config(e.to_string()))
	}

	/// Resolves the submission parameters without touching the network.
	pub fn request(&self) -> Result<SubmissionRequest, BuilderError> {
		let chain_id = self.chain_id();
		let network = self.network_config()?;

		let contract = self
			.contract
			.or(network.feed_contract)
			.ok_or_else(|| {
				BuilderError::MissingComponent(format!(
					"No feed contract for network {}; set networks.{}.feed_contract or pass --contract",
					network.display_name(chain_id),
					chain_id
				))
			})?;

		let value = self
			.config
			.submission
			.value()
			.map_err(|e| BuilderError::Config(e.to_string()))?;

		let policy = if self.skip_confirmation {
			ConfirmationPolicy::Skip
		} else {
			self.config.submission.confirmation_policy()
		};

		Ok(SubmissionRequest {
			chain_id,
			contract,
			feed_id: self
				.feed_id
				.clone()
				.or_else(|| self.config.submission.feed_id.clone()),
			value,
			policy,
		})
	}

	/// Builds an updater that signs with the primary account.
	pub fn build(self) -> Result<Updater, BuilderError> {
		let account = create_account(
			&self.config.account.primary,
			&self.config.account.implementations,
		)?;
		let wallet = account.wallet();
		self.assemble(Some(wallet), Some(account))
	}

	/// Builds an updater that can resolve and fetch but not submit.
	pub fn build_read_only(self) -> Result<Updater, BuilderError> {
		self.assemble(None, None)
	}

	fn assemble(
		self,
		wallet: Option<EthereumWallet>,
		account: Option<AccountService>,
	) -> Result<Updater, BuilderError> {
		let request = self.request()?;
		let network = self.network_config()?;
		let network_name = network.display_name(request.chain_id);

		let relay = CrossbarRelay::new(
			&network.relay_url,
			Duration::from_secs(self.config.submission.relay_timeout_seconds),
		)?;
		let contract = AlloyFeedContract::new(network, wallet)?;

		tracing::info!(
			updater_id = %self.config.updater.id,
			network = %network_name,
			chain_id = request.chain_id,
			contract = %request.contract,
			relay = %network.relay_url,
			"Updater ready"
		);

		Ok(Updater {
			submitter: OracleUpdateSubmitter::new(Arc::new(relay), Arc::new(contract)),
			request,
			account,
			network_name,
		})
	}
}
