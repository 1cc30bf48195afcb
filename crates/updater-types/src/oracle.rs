//! Relay response types for signed oracle updates.
//!
//! The relay serves ready-to-submit update blobs alongside the per-oracle
//! observations they were built from. Only the blobs are forwarded on-chain;
//! the reports are kept for display and diagnostics.

use crate::utils::{with_0x_prefix, without_0x_prefix};
use alloy_primitives::B256;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Envelope returned by `GET /updates/evm/{chain_id}/{feed_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleUpdateBatch {
	/// Encoded update blobs in the order the contract expects them.
	pub encoded: Vec<String>,
	/// Per-oracle observations backing the blobs. Informational only.
	///
	/// Entries that do not parse are dropped so they can never block the blobs.
	#[serde(default, deserialize_with = "deserialize_reports")]
	pub results: Vec<OracleReport>,
}

impl OracleUpdateBatch {
	/// Number of update blobs in the batch.
	pub fn len(&self) -> usize {
		self.encoded.len()
	}

	/// Returns true if the relay returned no update blobs.
	pub fn is_empty(&self) -> bool {
		self.encoded.is_empty()
	}
}

/// A signed observation reported by a single oracle.
///
/// Every field is optional on the wire; the relay omits fields it has no value
/// for and the submission path never reads them. Nulls read as the default and
/// scalars are accepted either as JSON numbers or as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleReport {
	#[serde(deserialize_with = "lenient_string")]
	pub oracle_pubkey: String,
	#[serde(deserialize_with = "lenient_string")]
	pub queue_pubkey: String,
	#[serde(deserialize_with = "lenient_string")]
	pub oracle_signing_pubkey: String,
	#[serde(deserialize_with = "lenient_string")]
	pub feed_hash: String,
	#[serde(deserialize_with = "lenient_string")]
	pub recent_hash: String,
	/// Empty when the oracle resolved a value.
	#[serde(deserialize_with = "lenient_string")]
	pub failure_error: String,
	#[serde(deserialize_with = "lenient_string")]
	pub success_value: String,
	#[serde(deserialize_with = "lenient_string")]
	pub msg: String,
	#[serde(deserialize_with = "lenient_string")]
	pub signature: String,
	#[serde(deserialize_with = "lenient_number")]
	pub recovery_id: u8,
	/// Prior successful reports, only populated when this report failed.
	#[serde(deserialize_with = "deserialize_reports")]
	pub recent_successes_if_failed: Vec<OracleReport>,
	#[serde(deserialize_with = "lenient_number")]
	pub timestamp: u64,
	#[serde(deserialize_with = "lenient_number")]
	pub result: f64,
}

/// Outcome carried by an [`OracleReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome<'a> {
	/// The oracle resolved a value.
	Success(&'a str),
	/// The oracle failed with the given error description.
	Failure(&'a str),
}

impl OracleReport {
	/// Resolves the mutually exclusive success/failure fields.
	///
	/// A non-empty `failure_error` wins; the relay sends an empty string for
	/// whichever side does not apply.
	pub fn outcome(&self) -> ReportOutcome<'_> {
		if self.failure_error.is_empty() {
			ReportOutcome::Success(&self.success_value)
		} else {
			ReportOutcome::Failure(&self.failure_error)
		}
	}

	/// Fallback reports attached to a failed observation.
	pub fn fallbacks(&self) -> &[OracleReport] {
		match self.outcome() {
			ReportOutcome::Failure(_) => &self.recent_successes_if_failed,
			ReportOutcome::Success(_) => &[],
		}
	}
}

fn deserialize_reports<'de, D>(deserializer: D) -> Result<Vec<OracleReport>, D::Error>
where
	D: Deserializer<'de>,
{
	let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
	Ok(entries
		.into_iter()
		.filter_map(|entry| serde_json::from_value(entry).ok())
		.collect())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::Null => String::new(),
		Value::String(s) => s,
		other => other.to_string(),
	})
}

fn lenient_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: FromStr + Default,
	T::Err: fmt::Display,
{
	let text = match Value::deserialize(deserializer)? {
		Value::Null => return Ok(T::default()),
		Value::Number(n) => n.to_string(),
		Value::String(s) if s.trim().is_empty() => return Ok(T::default()),
		Value::String(s) => s.trim().to_string(),
		other => return Err(D::Error::custom(format!("expected a number, got {}", other))),
	};
	text.parse().map_err(D::Error::custom)
}

/// Errors produced when parsing a feed identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedIdError {
	#[error("feed id must be 32 bytes of hex, got {0} hex characters")]
	InvalidLength(usize),
	#[error("feed id contains non-hex characters")]
	InvalidHex,
}

/// Identifier of a relay feed, rendered exactly as it appears in the URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeedId(String);

impl FeedId {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<B256> for FeedId {
	fn from(value: B256) -> Self {
		Self(format!("0x{}", hex::encode(value.as_slice())))
	}
}

impl FromStr for FeedId {
	type Err = FeedIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let digits = without_0x_prefix(s.trim());
		if digits.len() != 64 {
			return Err(FeedIdError::InvalidLength(digits.len()));
		}
		if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
			return Err(FeedIdError::InvalidHex);
		}
		Ok(Self(with_0x_prefix(digits)))
	}
}

impl TryFrom<String> for FeedId {
	type Error = FeedIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<FeedId> for String {
	fn from(value: FeedId) -> Self {
		value.0
	}
}

impl fmt::Display for FeedId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
