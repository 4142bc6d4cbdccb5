//! The named tiling scheme producing cell ids.
//!
//! Exactly one scheme is defined: quadbin. The identifier is stored in the
//! table metadata so that readers can refuse tables produced under a future
//! scheme instead of mis-decoding their ids.

use crate::TilequetError;
use anyhow::Result;
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TilingScheme {
	#[default]
	Quadbin,
}

impl TilingScheme {
	pub const fn as_str(&self) -> &'static str {
		match self {
			TilingScheme::Quadbin => "quadbin",
		}
	}

	/// Resolves a scheme identifier. Unrecognized identifiers are a scheme
	/// error, never a fallback to the default.
	pub fn try_from_str(value: &str) -> Result<Self> {
		match value {
			"quadbin" => Ok(TilingScheme::Quadbin),
			_ => Err(TilequetError::scheme(value)),
		}
	}
}

impl Display for TilingScheme {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_quadbin_is_recognized() {
		assert_eq!(TilingScheme::try_from_str("quadbin").unwrap(), TilingScheme::Quadbin);

		let err = TilingScheme::try_from_str("h3").unwrap_err();
		assert!(matches!(
			err.downcast_ref::<TilequetError>(),
			Some(TilequetError::Scheme(_))
		));
		// case-sensitive on purpose: the identifier is a wire value
		assert!(TilingScheme::try_from_str("Quadbin").is_err());
	}
}
