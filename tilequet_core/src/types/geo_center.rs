//! A geographic center point, serialized as `[longitude, latitude, zoom]`.

use anyhow::{Result, ensure};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Debug};

/// A center point: `f64` longitude, `f64` latitude and `u8` default zoom.
#[derive(Clone, Copy, PartialEq)]
pub struct GeoCenter(pub f64, pub f64, pub u8);

impl GeoCenter {
	pub fn check(&self) -> Result<()> {
		ensure!(-180.0 <= self.0 && self.0 <= 180.0, "center longitude must be in [-180, 180]");
		ensure!(-90.0 <= self.1 && self.1 <= 90.0, "center latitude must be in [-90, 90]");
		ensure!(self.2 <= 26, "center zoom must be <= 26");
		Ok(())
	}
}

impl Debug for GeoCenter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}, {} ({})", self.0, self.1, self.2)
	}
}

impl TryFrom<Vec<f64>> for GeoCenter {
	type Error = anyhow::Error;

	fn try_from(input: Vec<f64>) -> Result<Self> {
		ensure!(
			input.len() == 3,
			"center must have 3 elements: [longitude, latitude, zoom]"
		);
		let center = GeoCenter(input[0], input[1], input[2] as u8);
		center.check()?;
		Ok(center)
	}
}

impl Serialize for GeoCenter {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		(self.0, self.1, self.2).serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for GeoCenter {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let values = <Vec<f64>>::deserialize(deserializer)?;
		GeoCenter::try_from(values).map_err(serde::de::Error::custom)
	}
}
