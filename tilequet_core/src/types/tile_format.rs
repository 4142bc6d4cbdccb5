//! This module defines the `TileFormat` enum, representing the content
//! formats a tile payload can carry, and a magic-byte sniffer for sources
//! that do not report their format up front.

use super::TileType;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Content format of a tile payload.
///
/// The payload itself is always treated as opaque bytes; the format is pure
/// metadata passed through to the table.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileFormat {
	#[serde(alias = "mvt")]
	PBF,
	PNG,
	#[serde(alias = "jpg")]
	JPEG,
	WEBP,
	GLTF,
	GLB,
	B3DM,
	PNTS,
}

impl TileFormat {
	pub fn as_str(&self) -> &str {
		match self {
			TileFormat::PBF => "pbf",
			TileFormat::PNG => "png",
			TileFormat::JPEG => "jpeg",
			TileFormat::WEBP => "webp",
			TileFormat::GLTF => "gltf",
			TileFormat::GLB => "glb",
			TileFormat::B3DM => "b3dm",
			TileFormat::PNTS => "pnts",
		}
	}

	pub fn try_from_str(value: &str) -> Result<Self> {
		Ok(match value.to_lowercase().trim() {
			"pbf" | "mvt" => TileFormat::PBF,
			"png" => TileFormat::PNG,
			"jpeg" | "jpg" => TileFormat::JPEG,
			"webp" => TileFormat::WEBP,
			"gltf" => TileFormat::GLTF,
			"glb" => TileFormat::GLB,
			"b3dm" => TileFormat::B3DM,
			"pnts" => TileFormat::PNTS,
			_ => bail!("unknown tile format: '{value}'"),
		})
	}

	/// The tile type this format implies.
	pub fn tile_type(&self) -> TileType {
		match self {
			TileFormat::PBF => TileType::Vector,
			TileFormat::PNG | TileFormat::JPEG | TileFormat::WEBP => TileType::Raster,
			TileFormat::GLTF | TileFormat::GLB | TileFormat::B3DM | TileFormat::PNTS => TileType::ThreeD,
		}
	}

	/// Guesses the format from leading magic bytes.
	///
	/// Gzip payloads are assumed to be compressed vector tiles, as are raw
	/// protobuf field headers.
	pub fn sniff(data: &[u8]) -> Option<TileFormat> {
		if data.starts_with(b"\x89PNG") {
			Some(TileFormat::PNG)
		} else if data.starts_with(b"\xff\xd8\xff") {
			Some(TileFormat::JPEG)
		} else if data.starts_with(b"RIFF") {
			Some(TileFormat::WEBP)
		} else if data.starts_with(b"\x1f\x8b") {
			Some(TileFormat::PBF)
		} else if data.starts_with(b"glTF") {
			Some(TileFormat::GLB)
		} else if data.starts_with(b"b3dm") {
			Some(TileFormat::B3DM)
		} else if data.starts_with(b"pnts") {
			Some(TileFormat::PNTS)
		} else if matches!(data.first(), Some(0x0A | 0x12 | 0x1A | 0x22)) {
			Some(TileFormat::PBF)
		} else {
			None
		}
	}
}

impl Display for TileFormat {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
