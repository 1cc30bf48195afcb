//! Inline key credential source, plus the key account shared by every source.
//!
//! Key material is either a hex-encoded secp256k1 private key (with or without
//! `0x`) or a BIP-39 mnemonic, from which the first account of the default
//! derivation path is used.

use crate::{AccountError, AccountFactory, AccountInterface, AccountRegistry};
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_signer_local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use async_trait::async_trait;
use updater_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString, ValidationError,
};

/// Where an account's key material came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
	Inline,
	File(std::path::PathBuf),
	Env(String),
}

impl std::fmt::Display for KeySource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			KeySource::Inline => f.write_str("inline configuration"),
			KeySource::File(path) => write!(f, "file {}", path.display()),
			KeySource::Env(variable) => write!(f, "environment variable {}", variable),
		}
	}
}

/// Account backed by a key held in process memory.
pub struct KeyAccount {
	signer: PrivateKeySigner,
}

impl KeyAccount {
	/// Parses key material loaded from `source`.
	pub fn from_secret(secret: &SecretString, source: KeySource) -> Result<Self, AccountError> {
		if secret.is_empty() {
			return Err(AccountError::InvalidKey(format!(
				"no key material in {}",
				source
			)));
		}

		let signer = secret.with_exposed(parse_key_material).map_err(|e| {
			AccountError::InvalidKey(format!("key from {} is invalid: {}", source, e))
		})?;

		tracing::debug!(address = %signer.address(), source = %source, "Parsed signing key");
		Ok(Self { signer })
	}
}

fn parse_key_material(material: &str) -> Result<PrivateKeySigner, String> {
	if material.split_whitespace().count() >= 12 {
		return MnemonicBuilder::<English>::default()
			.phrase(material)
			.index(0)
			.and_then(|builder| builder.build())
			.map_err(|_| "mnemonic could not be derived".to_string());
	}

	// Never echo the parse error: it can contain fragments of the key.
	material
		.parse::<PrivateKeySigner>()
		.map_err(|_| "expected a 32-byte hex private key or a mnemonic".to_string())
}

#[async_trait]
impl AccountInterface for KeyAccount {
	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address())
	}

	fn wallet(&self) -> EthereumWallet {
		EthereumWallet::from(self.signer.clone())
	}
}

/// Configuration schema for the inline key source.
pub struct LocalAccountSchema;

impl ConfigSchema for LocalAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![Field::new("private_key", FieldType::String)], vec![]);
		schema.validate(config)
	}
}

/// Creates an account from `private_key` in the implementation table.
///
/// Intended for local development chains; combine with `${VAR}` substitution
/// to keep the key out of the file itself.
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	LocalAccountSchema
		.validate(config)
		.map_err(|e| AccountError::InvalidConfig(e.to_string()))?;

	let raw = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.ok_or_else(|| AccountError::InvalidConfig("private_key is required".into()))?;

	let secret = SecretString::from_credential_text(raw);
	Ok(Box::new(KeyAccount::from_secret(&secret, KeySource::Inline)?))
}

/// Registry for the inline key source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}
