//! The tileset metadata document and its streaming accumulator.
//!
//! Every table carries exactly one metadata record (cell id 0) whose JSON
//! document describes the whole tile set: format identifiers, geographic
//! bounds, zoom range, tile count, the tiling scheme, and optional
//! descriptive and provenance sections. [`MetadataAccumulator`] is the
//! explicit fold the table writer threads through its streaming loop; it is
//! consumed exactly once at finalization.

use crate::TilequetError;
use crate::types::{GeoBBox, GeoCenter, TileCoord, TileFormat, TileType, TilingScheme};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Value of the `file_format` field.
pub const FILE_FORMAT: &str = "tilequet";
/// Value of the `version` field.
pub const FORMAT_VERSION: &str = "0.1.0";
/// Reference frame of the `bounds` field.
pub const BOUNDS_CRS: &str = "EPSG:4326";

/// Top-level keys a metadata document must carry (`file_format` and
/// `version` are checked separately by the validator).
pub const REQUIRED_FIELDS: &[&str] = &[
	"tile_type",
	"tile_format",
	"bounds",
	"bounds_crs",
	"min_zoom",
	"max_zoom",
	"num_tiles",
	"tiling",
];

/// Descriptor of one vector layer, mirroring the TileJSON `vector_layers`
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
	pub id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub minzoom: Option<u8>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub maxzoom: Option<u8>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fields: Option<BTreeMap<String, String>>,
}

/// The `tiling` section. The scheme identifier stays a plain string so that
/// a document written under a future scheme still parses; resolving it via
/// [`TilingScheme::try_from_str`] is the reader's decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tiling {
	pub scheme: String,
}

/// The `processing` provenance section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Processing {
	pub source_format: Option<String>,
	pub created_by: String,
	pub created_at: String,
}

/// Facts a tile source reports about itself before streaming any tiles.
///
/// Tile type and content format are required; everything else may be absent,
/// in which case the writer falls back to facts derived from the observed
/// tiles. Explicitly reported values always win over derived ones.
#[derive(Debug, Clone, Default)]
pub struct SourceFacts {
	pub tile_type: Option<TileType>,
	pub tile_format: Option<TileFormat>,
	pub bounds: Option<GeoBBox>,
	pub center: Option<GeoCenter>,
	pub zoom_range: Option<(u8, u8)>,
	pub name: Option<String>,
	pub description: Option<String>,
	pub attribution: Option<String>,
	pub layers: Option<Vec<LayerInfo>>,
	pub source_format: Option<String>,
}

impl SourceFacts {
	pub fn new(tile_type: TileType, tile_format: TileFormat) -> SourceFacts {
		SourceFacts {
			tile_type: Some(tile_type),
			tile_format: Some(tile_format),
			..Default::default()
		}
	}
}

/// The row-zero metadata document.
///
/// Unrecognized top-level keys survive a parse/serialize round trip through
/// the flattened `extra` map, so documents written by newer tools keep their
/// fields when copied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilesetMetadata {
	pub file_format: String,
	pub version: String,
	pub tile_type: TileType,
	pub tile_format: TileFormat,
	pub bounds: GeoBBox,
	pub bounds_crs: String,
	pub center: Option<GeoCenter>,
	pub min_zoom: u8,
	pub max_zoom: u8,
	pub num_tiles: u64,
	pub tiling: Tiling,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub attribution: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub layers: Option<Vec<LayerInfo>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub processing: Option<Processing>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl TilesetMetadata {
	pub fn to_json_string(&self) -> Result<String> {
		serde_json::to_string(self).context("failed to serialize tileset metadata")
	}

	pub fn from_json_str(text: &str) -> Result<TilesetMetadata> {
		serde_json::from_str(text).map_err(|e| TilequetError::metadata(format!("invalid metadata document: {e}")))
	}

	/// Resolves the declared tiling scheme, rejecting unrecognized ones.
	pub fn tiling_scheme(&self) -> Result<TilingScheme> {
		TilingScheme::try_from_str(&self.tiling.scheme)
	}
}

/// Accumulates facts about a tile stream while the writer consumes it.
///
/// Bounds are only derived (by unioning decoded tile footprints) when the
/// source did not report any, since decoding every id has a cost the common
/// case does not need to pay.
#[derive(Debug)]
pub struct MetadataAccumulator {
	facts: SourceFacts,
	num_tiles: u64,
	zoom_min: Option<u8>,
	zoom_max: Option<u8>,
	observed_bounds: Option<GeoBBox>,
}

impl MetadataAccumulator {
	pub fn new(facts: SourceFacts) -> MetadataAccumulator {
		MetadataAccumulator {
			facts,
			num_tiles: 0,
			zoom_min: None,
			zoom_max: None,
			observed_bounds: None,
		}
	}

	/// Records one streamed tile.
	pub fn record(&mut self, coord: &TileCoord) {
		self.num_tiles += 1;
		self.zoom_min = Some(self.zoom_min.map_or(coord.level, |z| z.min(coord.level)));
		self.zoom_max = Some(self.zoom_max.map_or(coord.level, |z| z.max(coord.level)));

		if self.facts.bounds.is_none() {
			let footprint = coord.as_geo_bbox();
			match &mut self.observed_bounds {
				Some(bounds) => bounds.extend(&footprint),
				None => self.observed_bounds = Some(footprint),
			}
		}
	}

	pub fn num_tiles(&self) -> u64 {
		self.num_tiles
	}

	/// Produces the final metadata document.
	///
	/// Merges the format constants, the source-reported facts and the
	/// accumulated observations. Source-reported values always win; derived
	/// values are a fallback, never an override.
	pub fn finalize(self) -> Result<TilesetMetadata> {
		let facts = self.facts;
		let tile_format = facts
			.tile_format
			.ok_or_else(|| TilequetError::metadata("tile source reported no tile format"))?;
		let tile_type = facts.tile_type.unwrap_or_else(|| tile_format.tile_type());

		let bounds = facts
			.bounds
			.or(self.observed_bounds)
			.unwrap_or_else(GeoBBox::web_mercator);
		let (min_zoom, max_zoom) = facts
			.zoom_range
			.or(self.zoom_min.zip(self.zoom_max))
			.unwrap_or((0, 0));

		let tilejson = build_tilejson(&bounds, facts.center.as_ref(), min_zoom, max_zoom, &facts);

		let mut extra = Map::new();
		extra.insert("tilejson".to_string(), tilejson);

		Ok(TilesetMetadata {
			file_format: FILE_FORMAT.to_string(),
			version: FORMAT_VERSION.to_string(),
			tile_type,
			tile_format,
			bounds,
			bounds_crs: BOUNDS_CRS.to_string(),
			center: facts.center,
			min_zoom,
			max_zoom,
			num_tiles: self.num_tiles,
			tiling: Tiling {
				scheme: TilingScheme::Quadbin.as_str().to_string(),
			},
			name: facts.name,
			description: facts.description,
			attribution: facts.attribution,
			layers: facts.layers,
			processing: Some(Processing {
				source_format: facts.source_format,
				created_by: format!("tilequet {}", env!("CARGO_PKG_VERSION")),
				created_at: OffsetDateTime::now_utc()
					.format(&Rfc3339)
					.context("failed to format creation timestamp")?,
			}),
			extra,
		})
	}
}

/// Builds the embedded TileJSON 3.0.0 object, so downstream tools can
/// reconstruct a standards-compliant document for serving.
fn build_tilejson(
	bounds: &GeoBBox,
	center: Option<&GeoCenter>,
	min_zoom: u8,
	max_zoom: u8,
	facts: &SourceFacts,
) -> Value {
	let mut tilejson = json!({
		"tilejson": "3.0.0",
		"tiles": [],
		"bounds": bounds.as_vec(),
		"minzoom": min_zoom,
		"maxzoom": max_zoom,
	});
	let object = tilejson.as_object_mut().unwrap();
	if let Some(center) = center {
		object.insert("center".to_string(), json!(center));
	}
	if let Some(name) = &facts.name {
		object.insert("name".to_string(), json!(name));
	}
	if let Some(description) = &facts.description {
		object.insert("description".to_string(), json!(description));
	}
	if let Some(attribution) = &facts.attribution {
		object.insert("attribution".to_string(), json!(attribution));
	}
	if let Some(layers) = &facts.layers {
		object.insert("vector_layers".to_string(), json!(layers));
	}
	tilejson
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn facts() -> SourceFacts {
		SourceFacts::new(TileType::Raster, TileFormat::PNG)
	}

	#[test]
	fn zero_tiles_still_produce_a_document() -> Result<()> {
		let metadata = MetadataAccumulator::new(facts()).finalize()?;
		assert_eq!(metadata.file_format, "tilequet");
		assert_eq!(metadata.version, "0.1.0");
		assert_eq!(metadata.num_tiles, 0);
		assert_eq!(metadata.min_zoom, 0);
		assert_eq!(metadata.max_zoom, 0);
		assert_eq!(metadata.bounds, GeoBBox::web_mercator());
		assert_eq!(metadata.tiling.scheme, "quadbin");
		Ok(())
	}

	#[test]
	fn observed_facts_fill_the_gaps() -> Result<()> {
		let mut accumulator = MetadataAccumulator::new(facts());
		accumulator.record(&TileCoord::new(3, 0, 0)?);
		accumulator.record(&TileCoord::new(5, 31, 31)?);
		accumulator.record(&TileCoord::new(7, 100, 100)?);
		let metadata = accumulator.finalize()?;

		assert_eq!(metadata.num_tiles, 3);
		assert_eq!(metadata.min_zoom, 3);
		assert_eq!(metadata.max_zoom, 7);
		// union of the three footprints, not the whole world
		assert!(metadata.bounds.x_min >= -180.0);
		assert!(metadata.bounds != GeoBBox::web_mercator());
		Ok(())
	}

	#[test]
	fn reported_facts_win_over_observed_ones() -> Result<()> {
		let reported = GeoBBox::new(0.0, 0.0, 1.0, 1.0)?;
		let mut source_facts = facts();
		source_facts.bounds = Some(reported);
		source_facts.zoom_range = Some((2, 12));

		let mut accumulator = MetadataAccumulator::new(source_facts);
		// tiles far outside the reported bounds and zoom range
		accumulator.record(&TileCoord::new(4, 0, 0)?);
		accumulator.record(&TileCoord::new(4, 15, 15)?);
		let metadata = accumulator.finalize()?;

		assert_eq!(metadata.bounds, reported);
		assert_eq!(metadata.min_zoom, 2);
		assert_eq!(metadata.max_zoom, 12);
		assert_eq!(metadata.num_tiles, 2);
		Ok(())
	}

	#[test]
	fn document_round_trip_keeps_unknown_keys() -> Result<()> {
		let mut metadata = MetadataAccumulator::new(facts()).finalize()?;
		metadata
			.extra
			.insert("future_field".to_string(), json!({"a": 1}));

		let text = metadata.to_json_string()?;
		let parsed = TilesetMetadata::from_json_str(&text)?;
		assert_eq!(parsed.extra.get("future_field"), Some(&json!({"a": 1})));
		assert_eq!(parsed.tile_format, TileFormat::PNG);
		assert_eq!(parsed.tiling_scheme()?, TilingScheme::Quadbin);
		Ok(())
	}

	#[test]
	fn serialized_document_carries_every_required_field() -> Result<()> {
		let metadata = MetadataAccumulator::new(facts()).finalize()?;
		let value: Value = serde_json::from_str(&metadata.to_json_string()?)?;
		let object = value.as_object().unwrap();
		for field in REQUIRED_FIELDS {
			assert!(object.contains_key(*field), "missing required field '{field}'");
		}
		assert_eq!(object.get("file_format"), Some(&json!("tilequet")));
		// center is always present, null when unknown
		assert_eq!(object.get("center"), Some(&Value::Null));
		Ok(())
	}

	#[test]
	fn unknown_scheme_is_rejected() -> Result<()> {
		let mut metadata = MetadataAccumulator::new(facts()).finalize()?;
		metadata.tiling.scheme = "hexbin".to_string();
		let err = metadata.tiling_scheme().unwrap_err();
		assert!(matches!(
			err.downcast_ref::<TilequetError>(),
			Some(TilequetError::Scheme(_))
		));
		Ok(())
	}

	#[test]
	fn embedded_tilejson_reflects_the_facts() -> Result<()> {
		let mut source_facts = facts();
		source_facts.name = Some("test set".to_string());
		source_facts.center = Some(GeoCenter(1.0, 2.0, 3));
		let metadata = MetadataAccumulator::new(source_facts).finalize()?;

		let tilejson = metadata.extra.get("tilejson").unwrap();
		assert_eq!(tilejson.get("tilejson"), Some(&json!("3.0.0")));
		assert_eq!(tilejson.get("name"), Some(&json!("test set")));
		assert_eq!(tilejson.get("center"), Some(&json!([1.0, 2.0, 3])));
		Ok(())
	}
}
