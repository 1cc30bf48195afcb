//! Core workflow of the oracle updater.
//!
//! Resolves which feed a consumer contract tracks, pulls the latest signed
//! updates for it from the relay and forwards them on-chain in one
//! `getFeedData` transaction. Every step awaits the previous one and no error
//! is retried.

use thiserror::Error;
use updater_account::AccountError;
use updater_config::ConfigError;
use updater_delivery::DeliveryError;
use updater_relay::RelayError;

pub mod builder;
pub mod submitter;

pub use builder::{BuilderError, Updater, UpdaterBuilder};
pub use submitter::{FetchedUpdates, OracleUpdateSubmitter, SubmissionOutcome, SubmissionRequest};

/// Errors surfaced by the fetch-and-submit workflow.
#[derive(Debug, Error)]
pub enum SubmissionError {
	/// The relay or the RPC endpoint could not be reached, or refused the request.
	#[error("Network error: {0}")]
	Network(String),
	/// The relay response or one of its update blobs could not be decoded.
	#[error("Deserialization error: {0}")]
	Deserialization(String),
	/// The signing key is missing or invalid.
	#[error("Key error: {0}")]
	Key(String),
	/// The contract call failed or the transaction reverted.
	#[error("Contract call failed: {0}")]
	ContractCall(String),
	/// The transaction was sent but not confirmed within the configured bound.
	#[error("Timed out waiting for {confirmations} confirmations after {seconds} seconds")]
	ConfirmationTimeout { confirmations: u64, seconds: u64 },
	/// The configuration could not be loaded or names an unknown target.
	#[error("Configuration error: {0}")]
	Config(String),
}

impl From<RelayError> for SubmissionError {
	fn from(err: RelayError) -> Self {
		match err {
			RelayError::Network(msg) => SubmissionError::Network(msg),
			status @ RelayError::Status { .. } => SubmissionError::Network(status.to_string()),
			RelayError::Deserialization(msg) => SubmissionError::Deserialization(msg),
		}
	}
}

impl From<DeliveryError> for SubmissionError {
	fn from(err: DeliveryError) -> Self {
		match err {
			DeliveryError::Network(msg) => SubmissionError::Network(msg),
			DeliveryError::ContractCall(msg) => SubmissionError::ContractCall(msg),
			reverted @ DeliveryError::Reverted(_) => {
				SubmissionError::ContractCall(reverted.to_string())
			},
			DeliveryError::ConfirmationTimeout {
				confirmations,
				seconds,
			} => SubmissionError::ConfirmationTimeout {
				confirmations,
				seconds,
			},
		}
	}
}

impl From<AccountError> for SubmissionError {
	fn from(err: AccountError) -> Self {
		SubmissionError::Key(err.to_string())
	}
}

impl From<ConfigError> for SubmissionError {
	fn from(err: ConfigError) -> Self {
		SubmissionError::Config(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use updater_types::{TransactionHash, B256};

	#[test]
	fn test_relay_errors_map_to_taxonomy() {
		assert!(matches!(
			SubmissionError::from(RelayError::Status {
				status: 502,
				body: "bad gateway".into()
			}),
			SubmissionError::Network(ref m) if m.contains("502")
		));
		assert!(matches!(
			SubmissionError::from(RelayError::Deserialization("missing field".into())),
			SubmissionError::Deserialization(_)
		));
	}

	#[test]
	fn test_reverted_receipt_is_contract_call_failure() {
		let err = SubmissionError::from(DeliveryError::Reverted(TransactionHash(B256::ZERO)));
		assert!(matches!(err, SubmissionError::ContractCall(ref m) if m.contains("reverted")));
	}

	#[test]
	fn test_account_errors_are_key_errors() {
		let err = SubmissionError::from(AccountError::InvalidKey("bad hex".into()));
		assert!(matches!(err, SubmissionError::Key(_)));
	}
}
