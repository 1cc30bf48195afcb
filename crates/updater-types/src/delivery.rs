//! Transaction delivery types.
//!
//! Handles returned to the caller once an update transaction has been sent,
//! and the receipt data gathered when waiting for inclusion.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Blockchain transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub B256);

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0.as_slice()))
	}
}

/// Transaction receipt containing execution details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

/// Confirmation policy applied after an update transaction is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationPolicy {
	/// Return the pending hash without polling the chain.
	Skip,
	/// Block until the receipt has `confirmations` confirmations or the
	/// timeout elapses.
	Wait {
		confirmations: u64,
		timeout_seconds: u64,
	},
}
