//! Configuration module for the oracle updater.
//!
//! Configuration is read from a TOML file. String values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`, and a file may pull
//! in other files with `include = ["networks.toml"]` as long as every top-level
//! section is defined exactly once across all of them.

mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use updater_types::{
	networks::deserialize_networks, ConfirmationPolicy, FeedId, NetworkConfig, NetworksConfig,
	U256,
};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration for the oracle updater.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this updater instance.
	pub updater: UpdaterConfig,
	/// How and where updates are submitted.
	pub submission: SubmissionConfig,
	/// Recognized network targets keyed by chain id.
	#[serde(deserialize_with = "deserialize_networks")]
	pub networks: NetworksConfig,
	/// Credential sources used to sign update transactions.
	pub account: AccountConfig,
}

/// Configuration specific to the updater instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdaterConfig {
	/// Identifier reported in logs.
	pub id: String,
}

/// Submission settings for the fetch-and-submit workflow.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionConfig {
	/// Chain id of the network target used when none is given on the command line.
	pub network: u64,
	/// Feed to update. When absent the consumer contract's `aggregatorId()` is used.
	#[serde(default)]
	pub feed_id: Option<FeedId>,
	/// Native value in wei attached to the `getFeedData` call, as a decimal string.
	#[serde(default = "default_value_wei")]
	pub value_wei: String,
	/// Whether to block until the update transaction is confirmed.
	#[serde(default = "default_wait_for_confirmation")]
	pub wait_for_confirmation: bool,
	/// Confirmations required before the update counts as final.
	#[serde(default = "default_min_confirmations")]
	pub min_confirmations: u64,
	/// Upper bound on the confirmation wait.
	#[serde(default = "default_confirmation_timeout")]
	pub confirmation_timeout_seconds: u64,
	/// Timeout applied to relay HTTP requests.
	#[serde(default = "default_relay_timeout")]
	pub relay_timeout_seconds: u64,
}

fn default_value_wei() -> String {
	"0".to_string()
}

fn default_wait_for_confirmation() -> bool {
	true
}

fn default_min_confirmations() -> u64 {
	1
}

fn default_confirmation_timeout() -> u64 {
	120
}

fn default_relay_timeout() -> u64 {
	30
}

impl SubmissionConfig {
	/// Parses `value_wei` into a U256.
	pub fn value(&self) -> Result<U256, ConfigError> {
		U256::from_str_radix(self.value_wei.trim(), 10).map_err(|e| {
			ConfigError::Validation(format!(
				"submission.value_wei '{}' is not a decimal amount: {}",
				self.value_wei, e
			))
		})
	}

	/// Confirmation policy derived from the wait settings.
	pub fn confirmation_policy(&self) -> ConfirmationPolicy {
		if self.wait_for_confirmation {
			ConfirmationPolicy::Wait {
				confirmations: self.min_confirmations,
				timeout_seconds: self.confirmation_timeout_seconds,
			}
		} else {
			ConfirmationPolicy::Skip
		}
	}
}

/// Configuration for credential sources.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Which implementation signs update transactions.
	pub primary: String,
	/// Map of account implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Replaces `${VAR}` and `${VAR:-default}` with values from the environment.
///
/// Input is capped at 1MB to bound regex work.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

fn validate_http_url(field: &str, url: &str) -> Result<(), ConfigError> {
	if url.starts_with("http://") || url.starts_with("https://") {
		Ok(())
	} else {
		Err(ConfigError::Validation(format!(
			"{} must be an http(s) URL, got '{}'",
			field, url
		)))
	}
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = path
			.parent()
			.filter(|p| !p.as_os_str().is_empty())
			.unwrap_or_else(|| Path::new("."));
		let file_name = path.file_name().ok_or_else(|| {
			ConfigError::Validation(format!("Invalid path: {}", path.display()))
		})?;

		let mut loader = loader::ConfigLoader::new(base_dir);
		loader.load_config(file_name).await
	}

	/// Parses already env-resolved TOML and validates it.
	pub(crate) fn from_resolved_str(resolved: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(resolved)?;
		config.validate()?;
		Ok(config)
	}

	/// Returns the network target for `chain_id`.
	pub fn network(&self, chain_id: u64) -> Result<&NetworkConfig, ConfigError> {
		self.networks.get(&chain_id).ok_or_else(|| {
			ConfigError::Validation(format!(
				"Network {} is not configured (known: {})",
				chain_id,
				self.networks
					.keys()
					.map(|id| id.to_string())
					.collect::<Vec<_>>()
					.join(", ")
			))
		})
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.updater.id.trim().is_empty() {
			return Err(ConfigError::Validation("Updater ID cannot be empty".into()));
		}

		// Networks
		if self.networks.is_empty() {
			return Err(ConfigError::Validation(
				"At least one network must be configured".into(),
			));
		}
		for (chain_id, network) in &self.networks {
			validate_http_url(&format!("networks.{}.rpc_url", chain_id), &network.rpc_url)?;
			validate_http_url(
				&format!("networks.{}.relay_url", chain_id),
				&network.relay_url,
			)?;
		}
		self.network(self.submission.network)?;

		// Submission
		self.submission.value()?;
		if self.submission.min_confirmations == 0 {
			return Err(ConfigError::Validation(
				"min_confirmations must be at least 1".into(),
			));
		}
		if self.submission.min_confirmations > 100 {
			return Err(ConfigError::Validation(
				"min_confirmations cannot exceed 100".into(),
			));
		}
		if self.submission.confirmation_timeout_seconds == 0
			|| self.submission.confirmation_timeout_seconds > 3600
		{
			return Err(ConfigError::Validation(
				"confirmation_timeout_seconds must be between 1 and 3600".into(),
			));
		}
		if self.submission.relay_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"relay_timeout_seconds must be greater than 0".into(),
			));
		}

		// Account
		if self.account.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one account implementation must be configured".into(),
			));
		}
		if !self
			.account
			.implementations
			.contains_key(&self.account.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary account '{}' not found in implementations",
				self.account.primary
			)));
		}

		Ok(())
	}
}

/// Parses and validates a TOML string, resolving environment variables first.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		Self::from_resolved_str(&resolved)
	}
}
