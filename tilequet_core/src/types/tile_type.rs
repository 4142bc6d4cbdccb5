//! Broad classification of a tile set's contents.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileType {
	Vector,
	Raster,
	#[serde(rename = "3d")]
	ThreeD,
}

impl TileType {
	pub fn as_str(&self) -> &str {
		match self {
			TileType::Vector => "vector",
			TileType::Raster => "raster",
			TileType::ThreeD => "3d",
		}
	}

	pub fn try_from_str(value: &str) -> Result<Self> {
		Ok(match value.to_lowercase().trim() {
			"vector" => TileType::Vector,
			"raster" => TileType::Raster,
			"3d" => TileType::ThreeD,
			_ => bail!("unknown tile type: '{value}', expected 'vector', 'raster' or '3d'"),
		})
	}
}

impl Display for TileType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
