//! Fetch-and-submit workflow.

use crate::SubmissionError;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use updater_delivery::FeedContractInterface;
use updater_relay::RelayInterface;
use updater_types::{
	decode_hex_blob, truncate_id, Address, Bytes, ConfirmationPolicy, FeedId, OracleUpdateBatch,
	TransactionHash, TransactionReceipt, U256,
};

/// Parameters of a single update submission.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
	/// Chain the relay builds updates for.
	pub chain_id: u64,
	/// Consumer contract receiving `getFeedData`.
	pub contract: Address,
	/// Feed to update; read from the contract's `aggregatorId()` when absent.
	pub feed_id: Option<FeedId>,
	/// Native value attached to the call.
	pub value: U256,
	/// Whether and how long to wait for the transaction to be mined.
	pub policy: ConfirmationPolicy,
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
	/// Feed the updates were fetched for.
	pub feed_id: FeedId,
	/// Hash of the `getFeedData` transaction.
	pub tx_hash: TransactionHash,
	/// Present only when the request waited for confirmation.
	pub receipt: Option<TransactionReceipt>,
	/// Number of update blobs carried by the transaction.
	pub update_count: usize,
}

/// Updates fetched from the relay for a resolved feed.
#[derive(Debug, Clone)]
pub struct FetchedUpdates {
	/// Explicit feed id, or the one read from `aggregatorId()`.
	pub feed_id: FeedId,
	/// Relay response as served.
	pub batch: OracleUpdateBatch,
}

/// Decodes the relay's hex blobs, keeping their order.
pub fn decode_updates(batch: &OracleUpdateBatch) -> Result<Vec<Bytes>, SubmissionError> {
	batch
		.encoded
		.iter()
		.enumerate()
		.map(|(index, blob)| {
			decode_hex_blob(blob).map_err(|e| {
				SubmissionError::Deserialization(format!(
					"encoded[{}] is not valid hex: {}",
					index, e
				))
			})
		})
		.collect()
}

/// Moves signed oracle updates from the relay to a consumer contract.
pub struct OracleUpdateSubmitter {
	relay: Arc<dyn RelayInterface>,
	contract: Arc<dyn FeedContractInterface>,
}

impl OracleUpdateSubmitter {
	pub fn new(relay: Arc<dyn RelayInterface>, contract: Arc<dyn FeedContractInterface>) -> Self {
		Self { relay, contract }
	}

	/// Returns `explicit` when given, otherwise reads `aggregatorId()` once.
	pub async fn resolve_feed_id(
		&self,
		contract: Address,
		explicit: Option<&FeedId>,
	) -> Result<FeedId, SubmissionError> {
		if let Some(feed_id) = explicit {
			return Ok(feed_id.clone());
		}

		let feed_id = FeedId::from(self.contract.aggregator_id(contract).await?);
		tracing::info!(
			feed_id = %truncate_id(feed_id.as_str()),
			contract = %contract,
			"Resolved feed id from aggregatorId()"
		);
		Ok(feed_id)
	}

	/// Resolves the feed and fetches its current updates without submitting.
	pub async fn fetch(
		&self,
		chain_id: u64,
		contract: Address,
		explicit: Option<&FeedId>,
	) -> Result<FetchedUpdates, SubmissionError> {
		let feed_id = self.resolve_feed_id(contract, explicit).await?;
		let batch = self.relay.fetch_updates(chain_id, &feed_id).await?;
		Ok(FetchedUpdates { feed_id, batch })
	}

	/// Runs the full workflow: resolve, fetch, decode, submit and optionally wait.
	#[instrument(skip_all, fields(chain_id = request.chain_id, contract = %request.contract))]
	pub async fn submit(
		&self,
		request: &SubmissionRequest,
	) -> Result<SubmissionOutcome, SubmissionError> {
		let FetchedUpdates { feed_id, batch } = self
			.fetch(request.chain_id, request.contract, request.feed_id.as_ref())
			.await?;

		// Nothing reaches the chain unless every blob decodes
		let updates = decode_updates(&batch)?;
		if updates.is_empty() {
			tracing::warn!(
				feed_id = %truncate_id(feed_id.as_str()),
				"Relay returned no updates, submitting an empty batch"
			);
		}
		let update_count = updates.len();

		let tx_hash = self
			.contract
			.submit_updates(request.contract, updates, request.value)
			.await?;

		let receipt = match request.policy {
			ConfirmationPolicy::Skip => None,
			ConfirmationPolicy::Wait {
				confirmations,
				timeout_seconds,
			} => Some(
				self.contract
					.wait_for_confirmation(
						&tx_hash,
						confirmations,
						Duration::from_secs(timeout_seconds),
					)
					.await?,
			),
		};

		Ok(SubmissionOutcome {
			feed_id,
			tx_hash,
			receipt,
			update_count,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use std::sync::Mutex;
	use updater_delivery::DeliveryError;
	use updater_relay::RelayError;
	use updater_types::B256;

	const FEED: &str = "0x4cd1cad962425681af07b9254b7d804de3ca3446fbfd1371bb258d2c75059812";

	/// Relay serving a fixed response body and recording every request.
	struct RecordingRelay {
		body: String,
		requests: Mutex<Vec<(u64, String)>>,
	}

	impl RecordingRelay {
		fn new(body: &str) -> Self {
			Self {
				body: body.to_string(),
				requests: Mutex::new(Vec::new()),
			}
		}
	}

	#[async_trait]
	impl RelayInterface for RecordingRelay {
		async fn fetch_updates(
			&self,
			chain_id: u64,
			feed_id: &FeedId,
		) -> Result<OracleUpdateBatch, RelayError> {
			self.requests
				.lock()
				.unwrap()
				.push((chain_id, feed_id.to_string()));
			serde_json::from_str(&self.body).map_err(|e| RelayError::Deserialization(e.to_string()))
		}
	}

	#[derive(Clone, Copy)]
	enum WaitBehavior {
		Confirm,
		Timeout,
	}

	/// Consumer contract recording reads, submissions and confirmation waits.
	struct RecordingContract {
		aggregator_id: B256,
		wait: WaitBehavior,
		aggregator_calls: Mutex<u32>,
		submissions: Mutex<Vec<(Address, Vec<Bytes>, U256)>>,
		waits: Mutex<Vec<(TransactionHash, u64, Duration)>>,
	}

	impl RecordingContract {
		fn new(wait: WaitBehavior) -> Self {
			Self {
				aggregator_id: FEED.parse::<B256>().unwrap(),
				wait,
				aggregator_calls: Mutex::new(0),
				submissions: Mutex::new(Vec::new()),
				waits: Mutex::new(Vec::new()),
			}
		}
	}

	const TX_HASH: TransactionHash = TransactionHash(B256::repeat_byte(0x42));

	#[async_trait]
	impl FeedContractInterface for RecordingContract {
		async fn aggregator_id(&self, _contract: Address) -> Result<B256, DeliveryError> {
			*self.aggregator_calls.lock().unwrap() += 1;
			Ok(self.aggregator_id)
		}

		async fn submit_updates(
			&self,
			contract: Address,
			updates: Vec<Bytes>,
			value: U256,
		) -> Result<TransactionHash, DeliveryError> {
			self.submissions
				.lock()
				.unwrap()
				.push((contract, updates, value));
			Ok(TX_HASH)
		}

		async fn wait_for_confirmation(
			&self,
			hash: &TransactionHash,
			confirmations: u64,
			timeout: Duration,
		) -> Result<TransactionReceipt, DeliveryError> {
			self.waits
				.lock()
				.unwrap()
				.push((*hash, confirmations, timeout));
			match self.wait {
				WaitBehavior::Confirm => Ok(TransactionReceipt {
					hash: *hash,
					block_number: 7,
					success: true,
				}),
				WaitBehavior::Timeout => Err(DeliveryError::ConfirmationTimeout {
					confirmations,
					seconds: timeout.as_secs(),
				}),
			}
		}
	}

	fn contract_address() -> Address {
		"0x4ED8171dB9eC85ee785e34AFBeFcAB539dbE2790".parse().unwrap()
	}

	fn request(feed_id: Option<FeedId>, policy: ConfirmationPolicy) -> SubmissionRequest {
		SubmissionRequest {
			chain_id: 421614,
			contract: contract_address(),
			feed_id,
			value: U256::ZERO,
			policy,
		}
	}

	fn setup(
		body: &str,
		wait: WaitBehavior,
	) -> (
		Arc<RecordingRelay>,
		Arc<RecordingContract>,
		OracleUpdateSubmitter,
	) {
		let relay = Arc::new(RecordingRelay::new(body));
		let contract = Arc::new(RecordingContract::new(wait));
		let submitter = OracleUpdateSubmitter::new(relay.clone(), contract.clone());
		(relay, contract, submitter)
	}

	#[tokio::test]
	async fn test_single_update_end_to_end() {
		let (relay, contract, submitter) =
			setup(r#"{"encoded": ["0xdead"], "results": []}"#, WaitBehavior::Confirm);

		let outcome = submitter
			.submit(&request(None, ConfirmationPolicy::Skip))
			.await
			.unwrap();

		assert_eq!(outcome.tx_hash, TX_HASH);
		assert_eq!(outcome.update_count, 1);
		assert_eq!(relay.requests.lock().unwrap().len(), 1);

		let submissions = contract.submissions.lock().unwrap();
		assert_eq!(submissions.len(), 1);
		assert_eq!(submissions[0].0, contract_address());
		assert_eq!(submissions[0].1, vec![Bytes::from(vec![0xde, 0xad])]);
	}

	#[tokio::test]
	async fn test_irregular_reports_do_not_block_submission() {
		let (_, contract, submitter) = setup(
			r#"{
				"encoded": ["0xdead"],
				"results": [
					{ "failure_error": null, "success_value": 64213.5, "timestamp": "1727000000" },
					{ "recovery_id": "not a number" },
					42
				]
			}"#,
			WaitBehavior::Confirm,
		);

		let outcome = submitter
			.submit(&request(None, ConfirmationPolicy::Skip))
			.await
			.unwrap();

		assert_eq!(outcome.update_count, 1);
		let submissions = contract.submissions.lock().unwrap();
		assert_eq!(submissions[0].1, vec![Bytes::from(vec![0xde, 0xad])]);
	}

	#[tokio::test]
	async fn test_updates_forwarded_in_relay_order() {
		let (_, contract, submitter) = setup(
			r#"{"encoded": ["0x03", "0x0102", "0x", "0xff"], "results": []}"#,
			WaitBehavior::Confirm,
		);

		submitter
			.submit(&request(None, ConfirmationPolicy::Skip))
			.await
			.unwrap();

		let submissions = contract.submissions.lock().unwrap();
		assert_eq!(
			submissions[0].1,
			vec![
				Bytes::from(vec![0x03]),
				Bytes::from(vec![0x01, 0x02]),
				Bytes::new(),
				Bytes::from(vec![0xff]),
			]
		);
	}

	#[tokio::test]
	async fn test_aggregator_id_used_verbatim_in_relay_path() {
		let (relay, contract, submitter) =
			setup(r#"{"encoded": ["0xdead"]}"#, WaitBehavior::Confirm);

		let outcome = submitter
			.submit(&request(None, ConfirmationPolicy::Skip))
			.await
			.unwrap();

		assert_eq!(*contract.aggregator_calls.lock().unwrap(), 1);
		assert_eq!(
			relay.requests.lock().unwrap().as_slice(),
			&[(421614, FEED.to_string())]
		);
		assert_eq!(outcome.feed_id.as_str(), FEED);
	}

	#[tokio::test]
	async fn test_explicit_feed_id_skips_aggregator_id() {
		let (relay, contract, submitter) =
			setup(r#"{"encoded": ["0xdead"]}"#, WaitBehavior::Confirm);
		let explicit: FeedId = format!("0x{}", "ab".repeat(32)).parse().unwrap();

		submitter
			.submit(&request(Some(explicit.clone()), ConfirmationPolicy::Skip))
			.await
			.unwrap();

		assert_eq!(*contract.aggregator_calls.lock().unwrap(), 0);
		assert_eq!(relay.requests.lock().unwrap()[0].1, explicit.to_string());
	}

	#[tokio::test]
	async fn test_missing_encoded_fails_before_contract_call() {
		let (_, contract, submitter) = setup(r#"{"results": []}"#, WaitBehavior::Confirm);

		let err = submitter
			.submit(&request(None, ConfirmationPolicy::Skip))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::Deserialization(_)));
		assert!(contract.submissions.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_invalid_json_fails_before_contract_call() {
		let (_, contract, submitter) = setup("not json", WaitBehavior::Confirm);

		let err = submitter
			.submit(&request(None, ConfirmationPolicy::Skip))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::Deserialization(_)));
		assert!(contract.submissions.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_non_hex_blob_fails_before_contract_call() {
		let (_, contract, submitter) =
			setup(r#"{"encoded": ["0xdead", "zz"]}"#, WaitBehavior::Confirm);

		let err = submitter
			.submit(&request(None, ConfirmationPolicy::Skip))
			.await
			.unwrap_err();

		assert!(matches!(err, SubmissionError::Deserialization(ref m) if m.contains("encoded[1]")));
		assert!(contract.submissions.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_skip_policy_does_not_poll() {
		let (_, contract, submitter) = setup(r#"{"encoded": ["0xdead"]}"#, WaitBehavior::Timeout);

		let outcome = submitter
			.submit(&request(None, ConfirmationPolicy::Skip))
			.await
			.unwrap();

		assert!(outcome.receipt.is_none());
		assert!(contract.waits.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_wait_policy_returns_receipt() {
		let (_, contract, submitter) = setup(r#"{"encoded": ["0xdead"]}"#, WaitBehavior::Confirm);
		let policy = ConfirmationPolicy::Wait {
			confirmations: 3,
			timeout_seconds: 90,
		};

		let outcome = submitter.submit(&request(None, policy)).await.unwrap();

		let receipt = outcome.receipt.unwrap();
		assert_eq!(receipt.hash, TX_HASH);
		assert_eq!(receipt.block_number, 7);
		assert_eq!(
			contract.waits.lock().unwrap().as_slice(),
			&[(TX_HASH, 3, Duration::from_secs(90))]
		);
	}

	#[tokio::test]
	async fn test_wait_timeout_propagates() {
		let (_, _, submitter) = setup(r#"{"encoded": ["0xdead"]}"#, WaitBehavior::Timeout);
		let policy = ConfirmationPolicy::Wait {
			confirmations: 1,
			timeout_seconds: 5,
		};

		let err = submitter.submit(&request(None, policy)).await.unwrap_err();

		assert!(matches!(
			err,
			SubmissionError::ConfirmationTimeout {
				confirmations: 1,
				seconds: 5
			}
		));
	}

	#[tokio::test]
	async fn test_value_attached_to_call() {
		let (_, contract, submitter) = setup(r#"{"encoded": ["0xdead"]}"#, WaitBehavior::Confirm);
		let mut req = request(None, ConfirmationPolicy::Skip);
		req.value = U256::from(1_000u64);

		submitter.submit(&req).await.unwrap();

		assert_eq!(
			contract.submissions.lock().unwrap()[0].2,
			U256::from(1_000u64)
		);
	}

	#[tokio::test]
	async fn test_fetch_does_not_submit() {
		let (_, contract, submitter) = setup(
			r#"{"encoded": ["0xdead"], "results": [{"oracle_pubkey": "abc", "success_value": "42"}]}"#,
			WaitBehavior::Confirm,
		);

		let fetched = submitter
			.fetch(421614, contract_address(), None)
			.await
			.unwrap();

		assert_eq!(fetched.batch.len(), 1);
		assert_eq!(fetched.batch.results.len(), 1);
		assert!(contract.submissions.lock().unwrap().is_empty());
	}
}
