//! Key file credential source.
//!
//! Reads a plain-text file holding a private key or mnemonic, such as the
//! `.secret` file kept next to the configuration. The file is read once when
//! the account is created.

use super::local::{KeyAccount, KeySource};
use crate::{AccountError, AccountFactory, AccountInterface, AccountRegistry};
use std::path::PathBuf;
use updater_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString, ValidationError,
};

const DEFAULT_KEY_FILE: &str = ".secret";

/// Configuration schema for the key file source.
pub struct FileAccountSchema;

impl ConfigSchema for FileAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new("path", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(path) if path.trim().is_empty() => Err("path cannot be empty".into()),
					_ => Ok(()),
				}
			})],
		);
		schema.validate(config)
	}
}

/// Creates an account from the key file at `path` (default `.secret`).
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	FileAccountSchema
		.validate(config)
		.map_err(|e| AccountError::InvalidConfig(e.to_string()))?;

	let path = PathBuf::from(
		config
			.get("path")
			.and_then(|v| v.as_str())
			.unwrap_or(DEFAULT_KEY_FILE),
	);

	let contents = std::fs::read_to_string(&path).map_err(|e| {
		AccountError::Unavailable(format!("cannot read key file {}: {}", path.display(), e))
	})?;

	let secret = SecretString::from_credential_text(&contents);
	Ok(Box::new(KeyAccount::from_secret(
		&secret,
		KeySource::File(path),
	)?))
}

/// Registry for the key file source.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::Address;
	use std::fs;
	use tempfile::TempDir;

	fn config_for(path: &std::path::Path) -> toml::Value {
		toml::from_str(&format!("path = {:?}", path.display().to_string())).unwrap()
	}

	#[tokio::test]
	async fn test_reads_key_file_with_trailing_newline() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join(".secret");
		fs::write(
			&path,
			"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80\n",
		)
		.unwrap();

		let account = create_account(&config_for(&path)).unwrap();
		assert_eq!(
			account.address().await.unwrap(),
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
				.parse::<Address>()
				.unwrap()
		);
	}

	#[test]
	fn test_missing_file_is_unavailable() {
		let dir = TempDir::new().unwrap();
		let err = create_account(&config_for(&dir.path().join("absent")))
			.err()
			.unwrap();
		assert!(matches!(err, AccountError::Unavailable(_)));
	}

	#[test]
	fn test_garbage_file_is_invalid_key() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join(".secret");
		fs::write(&path, "hunter2").unwrap();

		let err = create_account(&config_for(&path)).err().unwrap();
		assert!(matches!(err, AccountError::InvalidKey(_)));
		assert!(!err.to_string().contains("hunter2"));
	}

	#[test]
	fn test_empty_path_rejected() {
		let config: toml::Value = toml::from_str("path = \"\"").unwrap();
		let err = create_account(&config).err().unwrap();
		assert!(matches!(err, AccountError::InvalidConfig(_)));
	}
}
