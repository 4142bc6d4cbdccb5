//! Integration tests for the full conversion pipeline: a tile source is
//! written to a table, read back, validated and partitioned, all through the
//! public API only.

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;
use tilequet_container::*;
use tilequet_core::*;

/// A converter implemented against the public `TileSource` contract, the
/// way an external adapter (mbtiles, wmts, ...) would be.
#[derive(Debug)]
struct VectorSource {
	facts: SourceFacts,
	tiles: Vec<(TileCoord, Vec<u8>)>,
}

impl VectorSource {
	fn new() -> Result<VectorSource> {
		let mut facts = SourceFacts::new(TileType::Vector, TileFormat::PBF);
		facts.bounds = Some(GeoBBox::new(13.0, 52.0, 14.0, 53.0)?);
		facts.center = Some(GeoCenter(13.4, 52.5, 10));
		facts.zoom_range = Some((3, 7));
		facts.name = Some("berlin extract".to_string());
		facts.attribution = Some("© OpenStreetMap contributors".to_string());
		facts.layers = Some(vec![LayerInfo {
			id: "roads".to_string(),
			description: None,
			minzoom: Some(3),
			maxzoom: Some(7),
			fields: None,
		}]);
		facts.source_format = Some("mbtiles".to_string());

		// deliberately unordered tiles at three zoom levels
		let tiles = vec![
			(TileCoord::new(7, 70, 43)?, b"\x1a\x05seven".to_vec()),
			(TileCoord::new(3, 4, 2)?, b"\x1a\x05three".to_vec()),
			(TileCoord::new(5, 17, 10)?, b"\x1a\x05five-a".to_vec()),
			(TileCoord::new(5, 16, 10)?, b"\x1a\x05five-b".to_vec()),
			(TileCoord::new(3, 4, 3)?, b"\x1a\x05three-b".to_vec()),
		];
		Ok(VectorSource { facts, tiles })
	}
}

#[async_trait]
impl TileSource for VectorSource {
	fn source_kind(&self) -> &str {
		"mbtiles"
	}

	fn facts(&self) -> &SourceFacts {
		&self.facts
	}

	async fn tile_stream(&self) -> Result<TileStream<'_>> {
		Ok(TileStream::from_vec(
			self
				.tiles
				.iter()
				.map(|(coord, data)| (*coord, Blob::from(data.clone())))
				.collect(),
		))
	}
}

#[tokio::test]
async fn convert_validate_partition() -> Result<()> {
	let temp = TempDir::new()?;
	let table_path = temp.path().join("berlin.parquet");
	let split_dir = temp.path().join("by_zoom");

	// convert
	let source = VectorSource::new()?;
	let written = TilequetWriter::write_to_path(&source, &table_path, WriterOptions::default()).await?;
	assert_eq!(written.num_tiles, 5);
	assert_eq!(written.tile_type, TileType::Vector);
	// reported facts win over observation
	assert_eq!(written.min_zoom, 3);
	assert_eq!(written.max_zoom, 7);
	assert_eq!(written.bounds, GeoBBox::new(13.0, 52.0, 14.0, 53.0)?);

	// read back
	let reader = TilequetReader::open_path(&table_path)?;
	assert_eq!(reader.num_rows(), 6);
	assert_eq!(reader.tag(TABLE_TAG_SCHEME), Some("quadbin"));
	let document = reader.metadata_document()?;
	assert_eq!(document.name.as_deref(), Some("berlin extract"));
	assert_eq!(document.layers.as_ref().map(Vec::len), Some(1));
	assert_eq!(
		document.processing.as_ref().and_then(|p| p.source_format.as_deref()),
		Some("mbtiles")
	);

	// validate: zoom levels 4 and 6 are declared but empty, which only warns
	let report = validate_path(&table_path);
	assert!(report.is_valid, "errors: {:?}", report.errors);
	assert_eq!(report.stats.row_count, 6);
	assert_eq!(report.warnings.len(), 2);

	// partition
	let outputs = split_by_zoom(&table_path, &split_dir, &WriterOptions::default()).await?;
	assert_eq!(outputs.len(), 3);
	let zooms: Vec<u8> = outputs.iter().map(|(z, _)| *z).collect();
	assert_eq!(zooms, vec![3, 5, 7]);

	let mut partitioned_tiles = 0;
	for (_, path) in &outputs {
		let partition_reader = TilequetReader::open_path(path)?;
		// every partition keeps the full original metadata document
		assert_eq!(partition_reader.metadata_json()?, reader.metadata_json()?);
		assert!(validate_path(path).is_valid);
		partitioned_tiles += partition_reader.num_rows() - 1;
	}
	assert_eq!(partitioned_tiles, 5);

	Ok(())
}

#[tokio::test]
async fn payloads_survive_the_round_trip() -> Result<()> {
	let temp = TempDir::new()?;
	let table_path = temp.path().join("payloads.parquet");

	let source = VectorSource::new()?;
	TilequetWriter::write_to_path(&source, &table_path, WriterOptions::default()).await?;

	let expected_id = CellId::encode(&TileCoord::new(5, 16, 10)?)?.as_u64();
	let reader = TilequetReader::open_path(&table_path)?;
	let row = reader
		.scan()?
		.filter_map(Result::ok)
		.find(|row| row.id == expected_id)
		.expect("tile 5/16/10 missing from table");
	assert_eq!(row.content.as_deref(), Some(b"\x1a\x05five-b".as_slice()));
	assert_eq!(row.metadata, None);
	Ok(())
}
