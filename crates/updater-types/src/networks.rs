//! Network target configuration types.
//!
//! Each target pairs a chain with the RPC endpoint used to reach it, the relay
//! serving updates for it and, optionally, the consumer contract deployed there.

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Hosted Crossbar relay used when a network does not override it.
pub const DEFAULT_RELAY_URL: &str = "https://crossbar.switchboard.xyz";

/// Configuration for a single blockchain network.
///
/// # Fields
///
/// * `name` - Human readable label used in logs and listings
/// * `rpc_url` - The HTTP(S) JSON-RPC endpoint for blockchain interaction
/// * `relay_url` - Base URL of the relay serving encoded updates
/// * `feed_contract` - Consumer contract exposing `getFeedData`/`aggregatorId`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
	#[serde(default)]
	pub name: Option<String>,
	pub rpc_url: String,
	#[serde(default = "default_relay_url")]
	pub relay_url: String,
	#[serde(default)]
	pub feed_contract: Option<Address>,
}

fn default_relay_url() -> String {
	DEFAULT_RELAY_URL.to_string()
}

impl NetworkConfig {
	/// Returns the configured name, or the chain id when none is set.
	pub fn display_name(&self, chain_id: u64) -> String {
		self.name
			.clone()
			.unwrap_or_else(|| format!("chain-{}", chain_id))
	}
}

/// Networks configuration mapping chain IDs to their configurations.
///
/// Ordered by chain id so listings are stable.
pub type NetworksConfig = BTreeMap<u64, NetworkConfig>;

/// Deserializes the `[networks.<chain_id>]` tables.
///
/// TOML table keys are always strings, so chain ids are parsed here.
pub fn deserialize_networks<'de, D>(deserializer: D) -> Result<NetworksConfig, D::Error>
where
	D: Deserializer<'de>,
{
	let string_map: BTreeMap<String, NetworkConfig> = BTreeMap::deserialize(deserializer)?;
	let mut result = BTreeMap::new();

	for (key, value) in string_map {
		let chain_id = key
			.parse::<u64>()
			.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", key, e)))?;
		result.insert(chain_id, value);
	}

	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Deserialize)]
	struct Wrapper {
		#[serde(deserialize_with = "deserialize_networks")]
		networks: NetworksConfig,
	}

	#[test]
	fn test_networks_keyed_by_chain_id() {
		let wrapper: Wrapper = toml::from_str(
			r#"
[networks.421614]
name = "arbitrum-sepolia"
rpc_url = "https://sepolia-rollup.arbitrum.io/rpc"
feed_contract = "0x4ED8171dB9eC85ee785e34AFBeFcAB539dbE2790"

[networks.1115]
rpc_url = "https://rpc.test.btcs.network"
relay_url = "http://localhost:8080"
"#,
		)
		.unwrap();

		let arbitrum = &wrapper.networks[&421614];
		assert_eq!(arbitrum.relay_url, DEFAULT_RELAY_URL);
		assert!(arbitrum.feed_contract.is_some());
		assert_eq!(arbitrum.display_name(421614), "arbitrum-sepolia");

		let core = &wrapper.networks[&1115];
		assert_eq!(core.relay_url, "http://localhost:8080");
		assert_eq!(core.display_name(1115), "chain-1115");

		let ids: Vec<u64> = wrapper.networks.keys().copied().collect();
		assert_eq!(ids, vec![1115, 421614]);
	}

	#[test]
	fn test_non_numeric_chain_id_rejected() {
		let result = toml::from_str::<Wrapper>(
			r#"
[networks.mainnet]
rpc_url = "http://localhost:8545"
"#,
		);
		assert!(result.is_err());
	}
}
