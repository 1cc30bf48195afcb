//! Alloy-backed access to an oracle consumer contract.
//!
//! Reads `aggregatorId()` with `eth_call`, sends `getFeedData(bytes[])` through a
//! wallet-filled provider and polls for receipts until the requested
//! confirmation depth is reached.

use crate::{DeliveryError, FeedContractInterface};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::{sol, SolCall};
use alloy_transport::{RpcError, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use updater_types::{NetworkConfig, TransactionHash, TransactionReceipt};

sol! {
	interface IFeedConsumer {
		function aggregatorId() external view returns (bytes32);
		function getFeedData(bytes[] calldata updates) external payable;
	}
}

/// Default delay between receipt polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Calldata for `getFeedData(updates)`.
pub fn encode_get_feed_data(updates: Vec<Bytes>) -> Vec<u8> {
	IFeedConsumer::getFeedDataCall { updates }.abi_encode()
}

/// Calldata for `aggregatorId()`.
pub fn encode_aggregator_id() -> Vec<u8> {
	IFeedConsumer::aggregatorIdCall {}.abi_encode()
}

/// Splits RPC failures into node rejections and transport problems.
fn classify(context: &str, error: TransportError) -> DeliveryError {
	match error {
		RpcError::ErrorResp(payload) => {
			DeliveryError::ContractCall(format!("{}: {}", context, payload))
		},
		other => DeliveryError::Network(format!("{}: {}", context, other)),
	}
}

/// Consumer contract client for a single EVM network.
pub struct AlloyFeedContract {
	/// HTTP provider, wallet-filled when the client may send transactions.
	provider: DynProvider,
	/// Delay between receipt polls while waiting for confirmation.
	poll_interval: Duration,
}

impl AlloyFeedContract {
	/// Connects to the network's RPC endpoint.
	///
	/// Without a wallet the client can only read; `submit_updates` will be
	/// rejected by the node.
	pub fn new(
		network: &NetworkConfig,
		wallet: Option<EthereumWallet>,
	) -> Result<Self, DeliveryError> {
		let url = network.rpc_url.parse().map_err(|e| {
			DeliveryError::Network(format!("Invalid RPC URL '{}': {}", network.rpc_url, e))
		})?;

		let provider = match wallet {
			Some(wallet) => ProviderBuilder::new()
				.wallet(wallet)
				.connect_http(url)
				.erased(),
			None => ProviderBuilder::new().connect_http(url).erased(),
		};

		Ok(Self::from_provider(provider))
	}

	/// Wraps an already configured provider.
	pub fn from_provider(provider: DynProvider) -> Self {
		Self {
			provider,
			poll_interval: DEFAULT_POLL_INTERVAL,
		}
	}

	/// Overrides the delay between receipt polls.
	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}
}

#[async_trait]
impl FeedContractInterface for AlloyFeedContract {
	/// Reads `aggregatorId()` with `eth_call` and returns its first word.
	async fn aggregator_id(&self, contract: Address) -> Result<B256, DeliveryError> {
		let request = TransactionRequest::default()
			.to(contract)
			.input(encode_aggregator_id().into());

		let result = self
			.provider
			.call(request)
			.await
			.map_err(|e| classify("aggregatorId() call failed", e))?;

		// bytes32 is returned as a single word
		if result.len() < 32 {
			return Err(DeliveryError::ContractCall(format!(
				"aggregatorId() returned {} bytes, expected 32",
				result.len()
			)));
		}

		Ok(B256::from_slice(&result[..32]))
	}

	/// Sends `getFeedData(updates)` to `contract` carrying `value` wei.
	async fn submit_updates(
		&self,
		contract: Address,
		updates: Vec<Bytes>,
		value: U256,
	) -> Result<TransactionHash, DeliveryError> {
		let update_count = updates.len();
		let request = TransactionRequest::default()
			.to(contract)
			.value(value)
			.input(encode_get_feed_data(updates).into());

		// The provider's wallet fills nonce, gas and chain id before signing
		let pending_tx = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| classify("Failed to send getFeedData transaction", e))?;

		let tx_hash = TransactionHash(*pending_tx.tx_hash());
		tracing::info!(
			tx_hash = %tx_hash,
			contract = %contract,
			updates = update_count,
			"Submitted oracle updates"
		);

		Ok(tx_hash)
	}

	/// Waits for `confirmations` confirmations of `hash`.
	///
	/// The whole poll, RPC round trips included, is bounded by `timeout`.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
		timeout: Duration,
	) -> Result<TransactionReceipt, DeliveryError> {
		tracing::info!(
			"Waiting for {} confirmations (timeout: {}s)",
			confirmations,
			timeout.as_secs()
		);

		tokio::time::timeout(timeout, self.poll_until_confirmed(hash, confirmations))
			.await
			.map_err(|_| DeliveryError::ConfirmationTimeout {
				confirmations,
				seconds: timeout.as_secs(),
			})?
	}
}

impl AlloyFeedContract {
	/// Polls receipts and the chain head until `hash` is deep enough.
	///
	/// Runs without a deadline of its own; callers bound it.
	async fn poll_until_confirmed(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
	) -> Result<TransactionReceipt, DeliveryError> {
		loop {
			let receipt = match self.provider.get_transaction_receipt(hash.0).await {
				Ok(Some(receipt)) => receipt,
				Ok(None) => {
					// Not mined yet
					tokio::time::sleep(self.poll_interval).await;
					continue;
				},
				Err(e) => {
					return Err(DeliveryError::Network(format!(
						"Failed to get receipt: {}",
						e
					)));
				},
			};

			if !receipt.status() {
				return Err(DeliveryError::Reverted(*hash));
			}

			let current_block = self.provider.get_block_number().await.map_err(|e| {
				DeliveryError::Network(format!("Failed to get block number: {}", e))
			})?;

			// The inclusion block counts as the first confirmation
			let tx_block = receipt.block_number.unwrap_or(current_block);
			let current_confirmations = current_block.saturating_sub(tx_block) + 1;

			if current_confirmations >= confirmations {
				tracing::info!(tx_hash = %hash, block = tx_block, "Transaction confirmed");
				return Ok(TransactionReceipt {
					hash: TransactionHash(receipt.transaction_hash),
					block_number: tx_block,
					success: true,
				});
			}

			tracing::debug!(
				"Waiting for {} more confirmations...",
				confirmations.saturating_sub(current_confirmations)
			);

			tokio::time::sleep(self.poll_interval).await;
		}
	}
}
