//! A thin wrapper around `Vec<u8>` for opaque tile payloads.

use std::fmt::Debug;

/// Opaque tile content. The core never decodes or re-encodes payloads; a
/// `Blob` only moves bytes between a tile source and the table.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}

	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<Vec<u8>> for Blob {
	fn from(value: Vec<u8>) -> Blob {
		Blob(value)
	}
}

impl From<&[u8]> for Blob {
	fn from(value: &[u8]) -> Blob {
		Blob(value.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(value: &str) -> Blob {
		Blob(value.as_bytes().to_vec())
	}
}

impl From<String> for Blob {
	fn from(value: String) -> Blob {
		Blob(value.into_bytes())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Blob({} bytes)", self.0.len())
	}
}
