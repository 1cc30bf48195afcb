//! Zeroizing wrapper for private key material.
//!
//! Keys loaded from files, environment variables or inline configuration are
//! held in a `SecretString` so they are wiped on drop and never show up in
//! logs or debug output.

use std::fmt;
use zeroize::Zeroizing;

const REDACTED: &str = "***REDACTED***";

/// A string that zeroes its memory on drop and redacts itself when printed.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Builds a secret from raw credential text such as the contents of a
	/// `.secret` file, dropping surrounding whitespace and newlines.
	pub fn from_credential_text(raw: &str) -> Self {
		Self::new(raw.trim().to_string())
	}

	/// Exposes the secret to a closure for processing.
	///
	/// Keeps the exposed borrow scoped to the closure so it cannot outlive
	/// the parsing step that needs it.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(&self.0)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({})", REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for SecretString {}
