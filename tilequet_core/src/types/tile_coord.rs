//! This module defines [`TileCoord`], a tile address in the XYZ web map
//! tiling pyramid, and its conversion to geographic coordinates.

use super::{GeoBBox, MAX_ZOOM};
use crate::TilequetError;
use anyhow::Result;
use std::{
	f64::consts::PI,
	fmt::{self, Debug},
};

/// A tile coordinate: zoom `level` plus `x`/`y` column and row.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
	pub level: u8,
	pub x: u32,
	pub y: u32,
}

impl TileCoord {
	/// Creates a new coordinate, rejecting values outside the tiling pyramid.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		if level > MAX_ZOOM {
			return Err(TilequetError::domain(format!(
				"zoom level {level} exceeds the maximum of {MAX_ZOOM}"
			)));
		}
		let n = 1u64 << level;
		if u64::from(x) >= n || u64::from(y) >= n {
			return Err(TilequetError::domain(format!(
				"tile x/y ({x}, {y}) outside zoom level {level} bounds (0..{n})"
			)));
		}
		Ok(TileCoord { level, x, y })
	}

	pub fn is_valid(&self) -> bool {
		self.level <= MAX_ZOOM && u64::from(self.x) < (1u64 << self.level) && u64::from(self.y) < (1u64 << self.level)
	}

	/// The geographic footprint of this tile in WGS84.
	pub fn as_geo_bbox(&self) -> GeoBBox {
		let size = 2.0f64.powi(i32::from(self.level));

		let lng = |x: f64| (x / size - 0.5) * 360.0;
		let lat = |y: f64| ((PI * (1.0 - 2.0 * y / size)).exp().atan() / PI - 0.25) * 360.0;

		// y grows southwards, so y+1 is the southern edge
		GeoBBox {
			x_min: lng(f64::from(self.x)),
			y_min: lat(f64::from(self.y + 1)),
			x_max: lng(f64::from(self.x + 1)),
			y_max: lat(f64::from(self.y)),
		}
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}
