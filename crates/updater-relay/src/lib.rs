//! Relay client module for the oracle updater.
//!
//! The relay aggregates signed oracle observations and serves them as encoded
//! update blobs ready to be forwarded to an on-chain consumer.

use async_trait::async_trait;
use thiserror::Error;
use updater_types::{FeedId, OracleUpdateBatch};

pub mod implementations {
	pub mod crossbar;
}

/// Errors that can occur while fetching updates from the relay.
#[derive(Debug, Error)]
pub enum RelayError {
	/// The relay could not be reached or the request timed out.
	#[error("Network error: {0}")]
	Network(String),
	/// The relay answered with a non-success status code.
	#[error("Relay returned HTTP {status}: {body}")]
	Status { status: u16, body: String },
	/// The response body is not a valid update batch.
	#[error("Malformed relay response: {0}")]
	Deserialization(String),
}

/// Interface for sources of encoded oracle updates.
#[async_trait]
pub trait RelayInterface: Send + Sync {
	/// Fetches the latest encoded updates for `feed_id` on the EVM chain `chain_id`.
	async fn fetch_updates(
		&self,
		chain_id: u64,
		feed_id: &FeedId,
	) -> Result<OracleUpdateBatch, RelayError>;
}
