//! Common types module for the oracle updater.
//!
//! This module defines the data types shared by every updater crate: the relay
//! response envelope, network targets, transaction handles, secret material and
//! the TOML validation framework used by pluggable implementations.

/// Transaction handle and receipt types for blockchain interactions.
pub mod delivery;
/// Network target configuration types.
pub mod networks;
/// Relay response types for signed oracle updates.
pub mod oracle;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Zeroizing wrapper for private key material.
pub mod secret_string;
/// Hex formatting helpers.
pub mod utils;
/// Configuration validation types for implementation-specific TOML tables.
pub mod validation;

pub use delivery::*;
pub use networks::{NetworkConfig, NetworksConfig, DEFAULT_RELAY_URL};
pub use oracle::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use utils::{decode_hex_blob, truncate_id, with_0x_prefix, without_0x_prefix};
pub use validation::*;

pub use alloy_primitives::{Address, Bytes, B256, U256};
