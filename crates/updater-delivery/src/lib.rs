//! Transaction delivery module for the oracle updater.
//!
//! Wraps the consumer contract that accepts oracle updates: reading its feed
//! identifier, sending the signed update transaction and following it until it
//! is confirmed.

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use updater_types::{TransactionHash, TransactionReceipt};

pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// The RPC endpoint could not be reached or returned an unusable answer.
	#[error("Network error: {0}")]
	Network(String),
	/// The node rejected the call (revert, insufficient funds, bad arguments).
	#[error("Contract call failed: {0}")]
	ContractCall(String),
	/// The transaction was mined but reverted.
	#[error("Transaction {0} reverted")]
	Reverted(TransactionHash),
	/// The transaction did not reach the required confirmations in time.
	#[error("Timeout waiting for {confirmations} confirmations after {seconds} seconds")]
	ConfirmationTimeout { confirmations: u64, seconds: u64 },
}

/// Interface to a deployed oracle consumer contract.
///
/// The contract exposes `aggregatorId() view returns (bytes32)` and
/// `getFeedData(bytes[] updates) payable`.
#[async_trait]
pub trait FeedContractInterface: Send + Sync {
	/// Reads the feed identifier the contract consumes.
	async fn aggregator_id(&self, contract: Address) -> Result<B256, DeliveryError>;

	/// Sends `getFeedData(updates)` with `value` attached and returns the
	/// pending transaction hash.
	async fn submit_updates(
		&self,
		contract: Address,
		updates: Vec<Bytes>,
		value: U256,
	) -> Result<TransactionHash, DeliveryError>;

	/// Blocks until `hash` has `confirmations` confirmations or `timeout` elapses.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
		confirmations: u64,
		timeout: Duration,
	) -> Result<TransactionReceipt, DeliveryError>;
}
