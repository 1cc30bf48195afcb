//! Environment variable credential source.

use super::local::{KeyAccount, KeySource};
use crate::{AccountError, AccountFactory, AccountInterface, AccountRegistry};
use updater_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString, ValidationError,
};

const DEFAULT_VARIABLE: &str = "ORACLE_UPDATER_PRIVATE_KEY";

/// Configuration schema for the environment variable source.
pub struct EnvAccountSchema;

impl ConfigSchema for EnvAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![Field::new("variable", FieldType::String)]);
		schema.validate(config)
	}
}

/// Creates an account from the key stored in `variable`
/// (default `ORACLE_UPDATER_PRIVATE_KEY`).
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	EnvAccountSchema
		.validate(config)
		.map_err(|e| AccountError::InvalidConfig(e.to_string()))?;

	let variable = config
		.get("variable")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_VARIABLE)
		.to_string();

	let raw = std::env::var(&variable).map_err(|e| {
		AccountError::Unavailable(format!("environment variable {}: {}", variable, e))
	})?;

	let secret = SecretString::from_credential_text(&raw);
	Ok(Box::new(KeyAccount::from_secret(
		&secret,
		KeySource::Env(variable),
	)?))
}

/// Registry for the environment variable source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "env";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}
