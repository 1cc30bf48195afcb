//! Hex formatting helpers.

use alloy_primitives::Bytes;

/// Truncates an identifier for log output, keeping the first 10 characters.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(10) {
		Some((end, _)) => format!("{}..", &id[..end]),
		None => id.to_string(),
	}
}

/// Adds "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.to_lowercase().starts_with("0x") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes a leading "0x" or "0X" if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Decodes one encoded update blob as served on the EVM relay route.
///
/// The blob content is opaque; only the hex transport encoding is checked.
pub fn decode_hex_blob(blob: &str) -> Result<Bytes, hex::FromHexError> {
	hex::decode(without_0x_prefix(blob)).map(Bytes::from)
}
