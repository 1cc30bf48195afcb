//! Crossbar relay client.
//!
//! Fetches encoded EVM updates from `GET {base_url}/updates/evm/{chain_id}/{feed_id}`.
//! The response body is parsed as-is; nothing beyond its shape is checked.

use crate::{RelayError, RelayInterface};
use async_trait::async_trait;
use std::time::Duration;
use updater_types::{truncate_id, FeedId, OracleUpdateBatch};

/// Longest slice of an error body kept in [`RelayError::Status`].
const MAX_ERROR_BODY: usize = 256;

/// HTTP client for a Crossbar relay instance.
pub struct CrossbarRelay {
	client: reqwest::Client,
	base_url: String,
}

impl CrossbarRelay {
	/// Creates a client for the relay at `base_url` with a per-request timeout.
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RelayError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| RelayError::Network(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}

	/// URL serving the updates for `feed_id` on `chain_id`.
	pub fn updates_url(&self, chain_id: u64, feed_id: &FeedId) -> String {
		format!("{}/updates/evm/{}/{}", self.base_url, chain_id, feed_id)
	}
}

#[async_trait]
impl RelayInterface for CrossbarRelay {
	async fn fetch_updates(
		&self,
		chain_id: u64,
		feed_id: &FeedId,
	) -> Result<OracleUpdateBatch, RelayError> {
		let url = self.updates_url(chain_id, feed_id);
		tracing::debug!(%url, "Fetching oracle updates");

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| RelayError::Network(format!("GET {} failed: {}", url, e)))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| RelayError::Network(format!("Failed to read relay response: {}", e)))?;

		if !status.is_success() {
			return Err(RelayError::Status {
				status: status.as_u16(),
				body: body.chars().take(MAX_ERROR_BODY).collect(),
			});
		}

		let batch: OracleUpdateBatch =
			serde_json::from_str(&body).map_err(|e| RelayError::Deserialization(e.to_string()))?;

		tracing::info!(
			feed_id = %truncate_id(feed_id.as_str()),
			chain_id,
			updates = batch.len(),
			reports = batch.results.len(),
			"Fetched oracle updates"
		);

		Ok(batch)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{extract::Path, http::StatusCode, routing::get, Router};

	const FEED: &str = "0x4cd1cad962425681af07b9254b7d804de3ca3446fbfd1371bb258d2c75059812";

	async fn updates(Path((chain_id, feed_id)): Path<(u64, String)>) -> (StatusCode, String) {
		match (chain_id, feed_id.as_str()) {
			(421614, FEED) => (
				StatusCode::OK,
				r#"{"encoded": ["0xdead", "0xbeef"], "results": []}"#.to_string(),
			),
			(421614, _) => (StatusCode::OK, r#"{"results": []}"#.to_string()),
			(1115, _) => (StatusCode::OK, "<html>not json</html>".to_string()),
			_ => (StatusCode::NOT_FOUND, "unknown chain".to_string()),
		}
	}

	async fn spawn_relay() -> String {
		let app = Router::new().route("/updates/evm/{chain_id}/{feed_id}", get(updates));
		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});
		format!("http://{}/", addr)
	}

	fn feed() -> FeedId {
		FEED.parse().unwrap()
	}

	fn relay(base_url: &str) -> CrossbarRelay {
		CrossbarRelay::new(base_url, Duration::from_secs(5)).unwrap()
	}

	#[test]
	fn test_updates_url() {
		let relay = relay("https://crossbar.switchboard.xyz/");
		assert_eq!(
			relay.updates_url(421614, &feed()),
			format!("https://crossbar.switchboard.xyz/updates/evm/421614/{}", FEED)
		);
	}

	#[tokio::test]
	async fn test_fetch_updates_preserves_order() {
		let base_url = spawn_relay().await;
		let batch = relay(&base_url).fetch_updates(421614, &feed()).await.unwrap();
		assert_eq!(batch.encoded, vec!["0xdead".to_string(), "0xbeef".to_string()]);
		assert!(batch.results.is_empty());
	}

	#[tokio::test]
	async fn test_missing_encoded_is_deserialization_error() {
		let base_url = spawn_relay().await;
		let other: FeedId = format!("0x{}", "11".repeat(32)).parse().unwrap();
		let err = relay(&base_url)
			.fetch_updates(421614, &other)
			.await
			.unwrap_err();
		assert!(matches!(err, RelayError::Deserialization(ref m) if m.contains("encoded")));
	}

	#[tokio::test]
	async fn test_invalid_json_is_deserialization_error() {
		let base_url = spawn_relay().await;
		let err = relay(&base_url).fetch_updates(1115, &feed()).await.unwrap_err();
		assert!(matches!(err, RelayError::Deserialization(_)));
	}

	#[tokio::test]
	async fn test_non_success_status() {
		let base_url = spawn_relay().await;
		let err = relay(&base_url).fetch_updates(1, &feed()).await.unwrap_err();
		match err {
			RelayError::Status { status, body } => {
				assert_eq!(status, 404);
				assert_eq!(body, "unknown chain");
			},
			other => panic!("unexpected error: {}", other),
		}
	}

	#[tokio::test]
	async fn test_unreachable_relay_is_network_error() {
		let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
		let addr = listener.local_addr().unwrap();
		drop(listener);

		let err = relay(&format!("http://{}", addr))
			.fetch_updates(421614, &feed())
			.await
			.unwrap_err();
		assert!(matches!(err, RelayError::Network(_)));
	}
}
