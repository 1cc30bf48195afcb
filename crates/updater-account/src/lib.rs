//! Account management for the oracle updater.
//!
//! An account is a credential source that can produce the signer used for
//! update transactions. Sources differ only in where the key material lives
//! (a key file, an environment variable, inline configuration); the workflow
//! only ever sees the resulting wallet.

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use updater_types::ImplementationRegistry;

pub mod implementations {
	pub mod env;
	pub mod file;
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// The key material could not be read from its source.
	#[error("Key unavailable: {0}")]
	Unavailable(String),
	/// The key material is not a valid secp256k1 key or mnemonic.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The account table is missing, unknown or fails its schema.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

/// Interface implemented by every credential source.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Address derived from the key material.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Wallet that signs transactions on behalf of this account.
	fn wallet(&self) -> EthereumWallet;
}

/// Factory signature every account implementation provides.
pub type AccountFactory = fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>;

/// Registry trait for account implementations.
pub trait AccountRegistry: ImplementationRegistry<Factory = AccountFactory> {}

/// Get all registered account implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, AccountFactory)> {
	use implementations::{env, file, local};

	vec![
		(local::Registry::NAME, local::Registry::factory()),
		(file::Registry::NAME, file::Registry::factory()),
		(env::Registry::NAME, env::Registry::factory()),
	]
}

/// Builds the account named `primary` from its configuration table.
pub fn create_account(
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
) -> Result<AccountService, AccountError> {
	let config = implementations.get(primary).ok_or_else(|| {
		AccountError::InvalidConfig(format!("Account '{}' is not configured", primary))
	})?;

	let factory = get_all_implementations()
		.into_iter()
		.find_map(|(name, factory)| (name == primary).then_some(factory))
		.ok_or_else(|| {
			AccountError::InvalidConfig(format!("Unknown account implementation '{}'", primary))
		})?;

	let implementation = factory(config)?;
	tracing::info!(component = "account", implementation = %primary, "Loaded");
	Ok(AccountService::new(implementation))
}

/// Service wrapping the active credential source.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	pub async fn get_address(&self) -> Result<Address, AccountError> {
		self.implementation.address().await
	}

	/// Wallet handed to the delivery layer for transaction signing.
	pub fn wallet(&self) -> EthereumWallet {
		self.implementation.wallet()
	}
}
