//! A geographic bounding box in WGS84, serialized as `[west, south, east, north]`.

use anyhow::{Result, ensure};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Debug};

static MAX_MERCATOR_LAT: f64 = 85.051129;

/// A rectangular area on the map: minimum and maximum longitude (x) and
/// latitude (y).
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	/// Creates a new `GeoBBox` from `west, south, east, north`.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		let bbox = GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		};
		bbox.check()?;
		Ok(bbox)
	}

	/// The full Web Mercator extent, used when a tile set reports no bounds.
	pub fn web_mercator() -> GeoBBox {
		GeoBBox {
			x_min: -180.0,
			y_min: -MAX_MERCATOR_LAT,
			x_max: 180.0,
			y_max: MAX_MERCATOR_LAT,
		}
	}

	/// Grows this bounding box to also cover `other`.
	pub fn extend(&mut self, other: &GeoBBox) {
		self.x_min = self.x_min.min(other.x_min);
		self.y_min = self.y_min.min(other.y_min);
		self.x_max = self.x_max.max(other.x_max);
		self.y_max = self.y_max.max(other.y_max);
	}

	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	pub fn as_vec(&self) -> Vec<f64> {
		self.as_array().to_vec()
	}

	fn check(&self) -> Result<()> {
		ensure!(self.x_min >= -180.0, "bounds[0] (west) must be >= -180");
		ensure!(self.y_min >= -90.0, "bounds[1] (south) must be >= -90");
		ensure!(self.x_max <= 180.0, "bounds[2] (east) must be <= 180");
		ensure!(self.y_max <= 90.0, "bounds[3] (north) must be <= 90");
		ensure!(self.x_min <= self.x_max, "bounds: west must be <= east");
		ensure!(self.y_min <= self.y_max, "bounds: south must be <= north");
		Ok(())
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"[{}, {}, {}, {}]",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

impl TryFrom<Vec<f64>> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(input: Vec<f64>) -> Result<Self> {
		ensure!(
			input.len() == 4,
			"bounds must have 4 elements: [west, south, east, north]"
		);
		GeoBBox::new(input[0], input[1], input[2], input[3])
	}
}

impl Serialize for GeoBBox {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		self.as_array().serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for GeoBBox {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let values = <[f64; 4]>::deserialize(deserializer)?;
		GeoBBox::new(values[0], values[1], values[2], values[3]).map_err(serde::de::Error::custom)
	}
}
