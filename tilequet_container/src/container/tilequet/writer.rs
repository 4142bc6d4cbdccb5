//! Write a tile stream into a sealed TileQuet table.
//!
//! The writer consumes a [`TileSource`] in one streaming pass, encodes every
//! coordinate into a quadbin cell id, accumulates the metadata facts, sorts
//! all records ascending by id and writes the Parquet file. The file is
//! produced next to the target path and renamed into place only after the
//! Parquet footer was written, so a failed run never leaves a readable
//! partial table behind.

use super::{TABLE_TAG_SCHEME, TABLE_TAG_VERSION, table_schema};
use crate::TileSource;
use anyhow::{Context, Result, ensure};
use arrow::array::{ArrayRef, BinaryArray, StringArray, UInt64Array};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::{KeyValue, SortingColumn};
use std::{
	fs::{File, remove_file, rename},
	path::{Path, PathBuf},
	sync::Arc,
};
use tilequet_core::{CellId, MetadataAccumulator, TilequetError, TilesetMetadata, TilingScheme, metadata};

/// One table record ready for storage: cell id plus optional payload.
pub(crate) type StoredRow = (u64, Option<Vec<u8>>);

/// Tuning options for the emitted Parquet file.
///
/// Neither field affects correctness: the row group size trades scan
/// granularity against footer size, and compression is usually left off
/// because tile payloads are already compressed.
#[derive(Debug, Clone)]
pub struct WriterOptions {
	/// Rows per Parquet row group.
	pub row_group_size: usize,
	/// Parquet page compression for all three columns.
	pub compression: Compression,
}

impl Default for WriterOptions {
	fn default() -> Self {
		WriterOptions {
			row_group_size: 200,
			compression: Compression::UNCOMPRESSED,
		}
	}
}

impl WriterOptions {
	pub fn new(row_group_size: usize) -> WriterOptions {
		WriterOptions {
			row_group_size,
			..WriterOptions::default()
		}
	}

	/// Options for partitioned outputs, which are usually fetched over the
	/// network: zstd-compressed pages.
	pub fn zstd(row_group_size: usize) -> WriterOptions {
		WriterOptions {
			row_group_size,
			compression: Compression::ZSTD(ZstdLevel::default()),
		}
	}
}

/// Writer producing sealed TileQuet tables.
pub struct TilequetWriter;

impl TilequetWriter {
	/// Streams all tiles of `source` into a sealed table at `path`.
	///
	/// Any error from the source or the codec aborts the whole run; either
	/// the complete table appears at `path` or nothing usable does. An
	/// existing file at `path` is replaced atomically.
	///
	/// Returns the metadata document that was written into row zero.
	pub async fn write_to_path(
		source: &dyn TileSource,
		path: &Path,
		options: WriterOptions,
	) -> Result<TilesetMetadata> {
		ensure!(options.row_group_size > 0, "row group size must be at least 1");

		let mut accumulator = MetadataAccumulator::new(source.facts().clone());
		let mut rows: Vec<StoredRow> = Vec::new();

		let mut stream = source
			.tile_stream()
			.await
			.with_context(|| format!("failed to open tile stream of '{}' source", source.source_kind()))?;
		while let Some(item) = stream.next().await {
			let (coord, blob) = item.context("tile source failed mid-stream")?;
			let id = CellId::encode(&coord)?;
			accumulator.record(&coord);
			rows.push((id.as_u64(), Some(blob.into_vec())));
		}

		log::debug!("sorting {} tiles by cell id", rows.len());
		rows.sort_by_key(|row| row.0);
		if let Some((row, _)) = rows.iter().tuple_windows().find(|(a, b)| a.0 == b.0) {
			return Err(TilequetError::source(format!(
				"source produced tile coordinate {:?} twice",
				CellId::new(row.0).decode()?
			)));
		}

		let metadata = accumulator.finalize()?;
		let metadata_json = metadata.to_json_string()?;

		let target = path.to_path_buf();
		tokio::task::spawn_blocking(move || write_table_file(&target, &metadata_json, &rows, &options))
			.await
			.context("table writer task failed")??;

		log::info!("wrote {} tiles to {}", metadata.num_tiles, path.display());
		Ok(metadata)
	}
}

/// Writes one sealed table file: the metadata record followed by the given
/// pre-sorted rows.
///
/// Shared between the writer and the zoom partitioner. The data lands in a
/// `.tmp` sibling first and is renamed over `path` after a clean close.
pub(crate) fn write_table_file(
	path: &Path,
	metadata_json: &str,
	rows: &[StoredRow],
	options: &WriterOptions,
) -> Result<()> {
	let temp = temp_path(path);

	let result = (|| -> Result<()> {
		let properties = WriterProperties::builder()
			.set_max_row_group_size(options.row_group_size)
			.set_compression(options.compression)
			.set_statistics_enabled(EnabledStatistics::Page)
			.set_sorting_columns(Some(vec![SortingColumn::new(0, false, false)]))
			.set_key_value_metadata(Some(vec![
				KeyValue::new(TABLE_TAG_VERSION.to_string(), metadata::FORMAT_VERSION.to_string()),
				KeyValue::new(TABLE_TAG_SCHEME.to_string(), TilingScheme::Quadbin.to_string()),
			]))
			.build();

		let file = File::create(&temp).with_context(|| format!("failed to create '{}'", temp.display()))?;
		let mut writer = ArrowWriter::try_new(file, table_schema(), Some(properties))?;
		writer.write(&build_batch(metadata_json, rows)?)?;
		writer.close()?;
		Ok(())
	})();

	if result.is_err() {
		let _ = remove_file(&temp);
		return result;
	}

	rename(&temp, path).with_context(|| format!("failed to move table into place at '{}'", path.display()))
}

fn temp_path(path: &Path) -> PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push(".tmp");
	PathBuf::from(name)
}

fn build_batch(metadata_json: &str, rows: &[StoredRow]) -> Result<RecordBatch> {
	let ids = UInt64Array::from_iter_values(std::iter::once(0).chain(rows.iter().map(|row| row.0)));

	let mut metadata_column: Vec<Option<&str>> = Vec::with_capacity(rows.len() + 1);
	metadata_column.push(Some(metadata_json));
	metadata_column.resize(rows.len() + 1, None);

	let mut content_column: Vec<Option<&[u8]>> = Vec::with_capacity(rows.len() + 1);
	content_column.push(None);
	content_column.extend(rows.iter().map(|row| row.1.as_deref()));

	RecordBatch::try_new(
		table_schema(),
		vec![
			Arc::new(ids) as ArrayRef,
			Arc::new(StringArray::from(metadata_column)) as ArrayRef,
			Arc::new(BinaryArray::from_opt_vec(content_column)) as ArrayRef,
		],
	)
	.context("failed to assemble table record batch")
}
