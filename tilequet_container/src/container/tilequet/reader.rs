//! Read a sealed TileQuet table back from disk.

use super::{COL_CONTENT, COL_ID, COL_METADATA, schema_problems};
use anyhow::{Context, Result};
use arrow::array::{Array, BinaryArray, StringArray, UInt64Array};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::{
	collections::HashMap,
	fs::File,
	path::{Path, PathBuf},
};
use tilequet_core::{TilequetError, TilesetMetadata};

/// One record of a table, with both nullable columns materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
	pub id: u64,
	pub metadata: Option<String>,
	pub content: Option<Vec<u8>>,
}

/// Reader for sealed TileQuet tables.
///
/// Opening verifies the column layout; every scan re-opens the file, so the
/// table can be traversed multiple times (the partitioner needs one pass,
/// the inspector two).
#[derive(Debug)]
pub struct TilequetReader {
	path: PathBuf,
	column_names: Vec<String>,
	num_rows: u64,
	num_row_groups: usize,
	tags: HashMap<String, String>,
}

impl TilequetReader {
	/// Opens a table, failing with a schema error if the required columns
	/// are missing or mistyped.
	pub fn open_path(path: &Path) -> Result<TilequetReader> {
		let builder = open_builder(path)?;

		let schema = builder.schema();
		let problems = schema_problems(schema);
		if !problems.is_empty() {
			return Err(TilequetError::schema(format!(
				"'{}' is not a tilequet table: {}",
				path.display(),
				problems.join("; ")
			)));
		}

		let file_metadata = builder.metadata().file_metadata();
		let tags = file_metadata
			.key_value_metadata()
			.map(|pairs| {
				pairs
					.iter()
					.filter_map(|kv| kv.value.as_ref().map(|v| (kv.key.clone(), v.clone())))
					.collect()
			})
			.unwrap_or_default();

		Ok(TilequetReader {
			path: path.to_path_buf(),
			column_names: schema.fields().iter().map(|f| f.name().clone()).collect(),
			num_rows: file_metadata.num_rows() as u64,
			num_row_groups: builder.metadata().num_row_groups(),
			tags,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn column_names(&self) -> &[String] {
		&self.column_names
	}

	pub fn num_rows(&self) -> u64 {
		self.num_rows
	}

	pub fn num_row_groups(&self) -> usize {
		self.num_row_groups
	}

	/// Looks up a file-level key/value tag.
	pub fn tag(&self, key: &str) -> Option<&str> {
		self.tags.get(key).map(String::as_str)
	}

	/// Iterates over all rows in storage order.
	pub fn scan(&self) -> Result<impl Iterator<Item = Result<TableRow>> + use<>> {
		let reader = open_builder(&self.path)?.with_batch_size(1024).build()?;
		Ok(reader.flat_map(|batch| match batch {
			Ok(batch) => rows_from_batch(&batch),
			Err(e) => vec![Err(e.into())],
		}))
	}

	/// Returns the raw JSON text of the metadata record.
	pub fn metadata_json(&self) -> Result<String> {
		for row in self.scan()? {
			let row = row?;
			if row.id == 0 {
				return row
					.metadata
					.ok_or_else(|| TilequetError::metadata("metadata record (id = 0) carries no document"));
			}
		}
		Err(TilequetError::metadata(format!(
			"no metadata record (id = 0) found in '{}'",
			self.path.display()
		)))
	}

	/// Parses the metadata record into a typed document.
	pub fn metadata_document(&self) -> Result<TilesetMetadata> {
		TilesetMetadata::from_json_str(&self.metadata_json()?)
	}
}

fn open_builder(path: &Path) -> Result<ParquetRecordBatchReaderBuilder<File>> {
	let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
	ParquetRecordBatchReaderBuilder::try_new(file)
		.with_context(|| format!("failed to read '{}' as a Parquet file", path.display()))
}

fn rows_from_batch(batch: &RecordBatch) -> Vec<Result<TableRow>> {
	let get = |name: &str| batch.schema().index_of(name).map(|i| batch.column(i).clone());
	let (Ok(ids), Ok(metadata), Ok(content)) = (get(COL_ID), get(COL_METADATA), get(COL_CONTENT)) else {
		return vec![Err(TilequetError::schema("table batch misses required columns"))];
	};
	let (Some(ids), Some(metadata), Some(content)) = (
		ids.as_any().downcast_ref::<UInt64Array>(),
		metadata.as_any().downcast_ref::<StringArray>(),
		content.as_any().downcast_ref::<BinaryArray>(),
	) else {
		return vec![Err(TilequetError::schema("table batch has mistyped columns"))];
	};

	(0..batch.num_rows())
		.map(|i| {
			Ok(TableRow {
				id: ids.value(i),
				metadata: metadata.is_valid(i).then(|| metadata.value(i).to_string()),
				content: content.is_valid(i).then(|| content.value(i).to_vec()),
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{MockSource, TilequetWriter, WriterOptions};
	use assert_fs::TempDir;

	#[tokio::test]
	async fn exposes_layout_and_tags() -> Result<()> {
		let temp = TempDir::new()?;
		let path = temp.path().join("tiles.parquet");
		TilequetWriter::write_to_path(&MockSource::new_pyramid(0..=2), &path, WriterOptions::default()).await?;

		let reader = TilequetReader::open_path(&path)?;
		assert_eq!(reader.column_names(), ["id", "metadata", "content"]);
		assert_eq!(reader.num_rows(), 1 + 1 + 4 + 16);
		assert_eq!(reader.tag(super::super::TABLE_TAG_VERSION), Some("0.1.0"));

		let document = reader.metadata_document()?;
		assert_eq!(document.num_tiles, 21);
		Ok(())
	}

	#[tokio::test]
	async fn row_group_size_is_respected() -> Result<()> {
		let temp = TempDir::new()?;
		let path = temp.path().join("tiles.parquet");
		let options = WriterOptions {
			row_group_size: 10,
			..WriterOptions::default()
		};
		TilequetWriter::write_to_path(&MockSource::new_pyramid(3..=3), &path, options).await?;

		let reader = TilequetReader::open_path(&path)?;
		// 65 rows at 10 rows per group
		assert_eq!(reader.num_row_groups(), 7);
		Ok(())
	}

	#[test]
	fn rejects_foreign_parquet_files() -> Result<()> {
		use arrow::array::Int32Array;
		use arrow::datatypes::{DataType, Field, Schema};
		use parquet::arrow::ArrowWriter;
		use std::sync::Arc;

		let temp = TempDir::new()?;
		let path = temp.path().join("foreign.parquet");

		let schema = Arc::new(Schema::new(vec![Field::new("value", DataType::Int32, false)]));
		let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(Int32Array::from(vec![1, 2, 3]))])?;
		let mut writer = ArrowWriter::try_new(std::fs::File::create(&path)?, schema, None)?;
		writer.write(&batch)?;
		writer.close()?;

		let err = TilequetReader::open_path(&path).unwrap_err();
		assert!(matches!(
			err.downcast_ref::<TilequetError>(),
			Some(TilequetError::Schema(_))
		));
		Ok(())
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let err = TilequetReader::open_path(Path::new("/nonexistent/file.parquet")).unwrap_err();
		assert!(err.to_string().contains("failed to open"));
	}
}
