//! Typed error kinds shared across the workspace.
//!
//! All fallible functions return [`anyhow::Result`], but errors that carry a
//! contract meaning are created as [`TilequetError`] variants so callers can
//! downcast on the kind:
//!
//! ```rust
//! use tilequet_core::{CellId, TilequetError};
//!
//! let err = CellId::new(0).decode().unwrap_err();
//! assert!(matches!(
//! 	err.downcast_ref::<TilequetError>(),
//! 	Some(TilequetError::Domain(_))
//! ));
//! ```

use thiserror::Error;

/// Error kinds with contract meaning.
#[derive(Debug, Error)]
pub enum TilequetError {
	/// A coordinate or cell id outside the valid space. Always fatal to the
	/// operation in progress, never silently clamped.
	#[error("domain error: {0}")]
	Domain(String),

	/// A tile source failed mid-stream. Aborts the writer run; no partial
	/// table is committed.
	#[error("source error: {0}")]
	Source(String),

	/// A table lacks required columns or types.
	#[error("schema error: {0}")]
	Schema(String),

	/// The metadata record is missing, malformed, or incomplete.
	#[error("metadata error: {0}")]
	Metadata(String),

	/// An unrecognized tiling scheme. Always a hard rejection, so that a
	/// future scheme is never mis-decoded as the current one.
	#[error("unrecognized tiling scheme: {0}")]
	Scheme(String),
}

impl TilequetError {
	pub fn domain(msg: impl Into<String>) -> anyhow::Error {
		TilequetError::Domain(msg.into()).into()
	}

	pub fn source(msg: impl Into<String>) -> anyhow::Error {
		TilequetError::Source(msg.into()).into()
	}

	pub fn schema(msg: impl Into<String>) -> anyhow::Error {
		TilequetError::Schema(msg.into()).into()
	}

	pub fn metadata(msg: impl Into<String>) -> anyhow::Error {
		TilequetError::Metadata(msg.into()).into()
	}

	pub fn scheme(msg: impl Into<String>) -> anyhow::Error {
		TilequetError::Scheme(msg.into()).into()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wraps_into_anyhow() {
		let err = TilequetError::scheme("h3");
		assert_eq!(err.to_string(), "unrecognized tiling scheme: h3");
		assert!(matches!(
			err.downcast_ref::<TilequetError>(),
			Some(TilequetError::Scheme(_))
		));
	}
}
