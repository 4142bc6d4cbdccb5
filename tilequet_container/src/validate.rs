//! Validation of sealed TileQuet tables.
//!
//! [`validate_path`] checks a table against the format contract and returns
//! a structured report instead of failing on the first issue, so one pass
//! yields the full diagnosis. Data problems are never raised as errors; only
//! the report's validity flag decides the outcome.
//!
//! ```no_run
//! use tilequet_container::validate_path;
//!
//! let report = validate_path(std::path::Path::new("tiles.parquet"));
//! if !report.is_valid {
//! 	for error in &report.errors {
//! 		eprintln!("✗ {error}");
//! 	}
//! }
//! ```

use crate::container::tilequet::schema_problems;
use crate::{TABLE_TAG_VERSION, TilequetReader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Display};
use std::fs::File;
use std::path::Path;
use tilequet_core::{CellId, MAX_ZOOM, TileType, TilingScheme, metadata};

/// Summary statistics gathered while validating.
#[derive(Debug, Default, Serialize)]
pub struct ValidationStats {
	pub row_count: u64,
	pub file_size: u64,
	pub columns: Vec<String>,
	pub tiles_per_zoom: BTreeMap<u8, u64>,
}

/// Result of validating one table.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
	pub is_valid: bool,
	pub errors: Vec<String>,
	pub warnings: Vec<String>,
	pub metadata: Option<Value>,
	pub stats: ValidationStats,
}

impl Display for ValidationReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(
			f,
			"TileQuet validation: {}",
			if self.is_valid { "VALID" } else { "INVALID" }
		)?;

		if !self.errors.is_empty() {
			writeln!(f, "\nErrors ({}):", self.errors.len())?;
			for error in &self.errors {
				writeln!(f, "  ✗ {error}")?;
			}
		}

		if !self.warnings.is_empty() {
			writeln!(f, "\nWarnings ({}):", self.warnings.len())?;
			for warning in &self.warnings {
				writeln!(f, "  ⚠ {warning}")?;
			}
		}

		writeln!(f, "\nStatistics:")?;
		writeln!(f, "  rows: {}", self.stats.row_count)?;
		writeln!(f, "  file size: {} bytes", self.stats.file_size)?;
		writeln!(f, "  columns: {}", self.stats.columns.join(", "))?;
		for (zoom, count) in &self.stats.tiles_per_zoom {
			writeln!(f, "  zoom {zoom}: {count} tiles")?;
		}
		Ok(())
	}
}

/// Validates the table at `path`.
///
/// Hard failures land in `errors`, advisory findings in `warnings`; the
/// table is valid iff `errors` stays empty. I/O-level unreadability is
/// reported the same way, so this function never panics or returns early
/// with an exception.
pub fn validate_path(path: &Path) -> ValidationReport {
	let mut errors = Vec::new();
	let mut warnings = Vec::new();
	let mut stats = ValidationStats::default();
	let mut metadata_value = None;

	match std::fs::metadata(path) {
		Ok(file_metadata) => stats.file_size = file_metadata.len(),
		Err(e) => {
			errors.push(format!("failed to read Parquet file: {e}"));
			return finish(errors, warnings, metadata_value, stats);
		}
	}

	// check 1: structural well-formedness
	let schema_ok = match File::open(path).map_err(anyhow::Error::from).and_then(|file| {
		ParquetRecordBatchReaderBuilder::try_new(file).map_err(anyhow::Error::from)
	}) {
		Ok(builder) => {
			stats.row_count = builder.metadata().file_metadata().num_rows() as u64;
			stats.columns = builder.schema().fields().iter().map(|f| f.name().clone()).collect();
			let problems = schema_problems(builder.schema());
			let ok = problems.is_empty();
			errors.extend(problems);
			ok
		}
		Err(e) => {
			errors.push(format!("failed to read Parquet file: {e}"));
			false
		}
	};
	if !schema_ok {
		return finish(errors, warnings, metadata_value, stats);
	}

	let reader = match TilequetReader::open_path(path) {
		Ok(reader) => reader,
		Err(e) => {
			errors.push(format!("failed to read Parquet file: {e}"));
			return finish(errors, warnings, metadata_value, stats);
		}
	};

	if reader.tag(TABLE_TAG_VERSION).is_none() {
		warnings.push(format!("file-level '{TABLE_TAG_VERSION}' tag is missing"));
	}

	// single pass over all rows
	let mut metadata_documents: Vec<Option<String>> = Vec::new();
	let mut decode_errors = Vec::new();
	let mut tiles_per_zoom: BTreeMap<u8, u64> = BTreeMap::new();
	let mut seen_ids = HashSet::new();
	let mut sorted = true;
	let mut previous_id = None;

	match reader.scan() {
		Ok(rows) => {
			for (index, row) in rows.enumerate() {
				let row = match row {
					Ok(row) => row,
					Err(e) => {
						errors.push(format!("failed to read row {index}: {e}"));
						break;
					}
				};
				if !seen_ids.insert(row.id) {
					errors.push(format!("duplicate cell id {}", row.id));
				}
				if previous_id.is_some_and(|previous| row.id < previous) {
					sorted = false;
				}
				previous_id = Some(row.id);

				if row.id == 0 {
					metadata_documents.push(row.metadata);
				} else {
					if row.metadata.is_some() {
						errors.push(format!("row with id {} carries a metadata document", row.id));
					}
					match &row.content {
						None => errors.push(format!("tile {} has no content", row.id)),
						Some(content) if content.is_empty() => {
							warnings.push(format!("tile {} has empty content", row.id));
						}
						Some(_) => {}
					}
					match CellId::new(row.id).zoom() {
						Ok(zoom) => *tiles_per_zoom.entry(zoom).or_insert(0) += 1,
						Err(_) => decode_errors.push(format!(
							"cell id {} does not decode under the quadbin scheme",
							row.id
						)),
					}
				}
			}
		}
		Err(e) => errors.push(format!("failed to scan rows: {e}")),
	}

	if !sorted {
		warnings.push("ids are not sorted ascending; range scans cannot prune row groups".to_string());
	}

	// checks 2 and 3: the metadata record and its document
	let mut parsed = None;
	match metadata_documents.len() {
		0 => errors.push("no metadata record (id = 0) found".to_string()),
		n => {
			if n > 1 {
				errors.push(format!("found {n} metadata records (id = 0), expected exactly one"));
			}
			match metadata_documents.into_iter().next().unwrap() {
				None => errors.push("metadata record (id = 0) carries no document".to_string()),
				Some(text) => match serde_json::from_str::<Value>(&text) {
					Ok(value) => parsed = Some(value),
					Err(e) => errors.push(format!("invalid JSON in metadata: {e}")),
				},
			}
		}
	}

	// checks 4 to 6 need a parsed document and a recognized scheme
	if let Some(document) = parsed {
		let scheme_ok = check_document(&document, &mut errors, &mut warnings);
		if scheme_ok {
			errors.extend(decode_errors);
			check_zoom_consistency(&document, &tiles_per_zoom, &mut errors, &mut warnings);
			stats.tiles_per_zoom = tiles_per_zoom;
		}
		metadata_value = Some(document);
	}

	finish(errors, warnings, metadata_value, stats)
}

fn finish(
	errors: Vec<String>,
	warnings: Vec<String>,
	metadata: Option<Value>,
	stats: ValidationStats,
) -> ValidationReport {
	ValidationReport {
		is_valid: errors.is_empty(),
		errors,
		warnings,
		metadata,
		stats,
	}
}

/// Checks the document structure (check 3) and the declared tiling scheme
/// (check 4). Returns whether the scheme is recognized, since id-level
/// checks are meaningless under an unknown scheme.
fn check_document(document: &Value, errors: &mut Vec<String>, warnings: &mut Vec<String>) -> bool {
	let file_format = document.get("file_format").and_then(Value::as_str);
	if file_format != Some(metadata::FILE_FORMAT) {
		errors.push(format!(
			"expected file_format '{}', got {:?}",
			metadata::FILE_FORMAT,
			file_format.unwrap_or("<missing>")
		));
	}

	match document.get("version").and_then(Value::as_str) {
		None => errors.push("missing 'version' in metadata".to_string()),
		Some(version) if version != metadata::FORMAT_VERSION => {
			warnings.push(format!(
				"unknown version '{version}', expected {}",
				metadata::FORMAT_VERSION
			));
		}
		Some(_) => {}
	}

	for field in metadata::REQUIRED_FIELDS {
		if document.get(*field).is_none() {
			errors.push(format!("missing required field '{field}' in metadata"));
		}
	}

	if let Some(tile_type) = document.get("tile_type") {
		match tile_type.as_str() {
			Some(text) => {
				if TileType::try_from_str(text).is_err() {
					errors.push(format!(
						"invalid tile_type '{text}', expected 'vector', 'raster' or '3d'"
					));
				}
			}
			None => errors.push("field 'tile_type' must be a string".to_string()),
		}
	}

	if let Some(tile_format) = document.get("tile_format") {
		if !tile_format.is_string() {
			errors.push("field 'tile_format' must be a string".to_string());
		}
	}

	if let Some(bounds) = document.get("bounds") {
		match bounds.as_array() {
			Some(values) if values.len() == 4 && values.iter().all(Value::is_number) => {}
			_ => errors.push("bounds must have 4 numeric values [west, south, east, north]".to_string()),
		}
	}

	for field in ["min_zoom", "max_zoom", "num_tiles"] {
		if let Some(value) = document.get(field) {
			if !value.is_u64() {
				errors.push(format!("field '{field}' must be a non-negative integer"));
			}
		}
	}

	match document.get("tiling") {
		Some(Value::Object(tiling)) => match tiling.get("scheme").and_then(Value::as_str) {
			Some(scheme) => match TilingScheme::try_from_str(scheme) {
				Ok(_) => true,
				Err(e) => {
					errors.push(format!("{e}"));
					false
				}
			},
			None => {
				errors.push("field 'tiling' must carry a 'scheme' string".to_string());
				false
			}
		},
		Some(_) => {
			errors.push("field 'tiling' must be an object".to_string());
			false
		}
		None => false,
	}
}

/// Check 6: per-zoom tile counts against the declared zoom range. Counts
/// outside the range are impossible and therefore hard errors; empty levels
/// inside the range are only unusual.
fn check_zoom_consistency(
	document: &Value,
	tiles_per_zoom: &BTreeMap<u8, u64>,
	errors: &mut Vec<String>,
	warnings: &mut Vec<String>,
) {
	let zoom = |field: &str| {
		document
			.get(field)
			.and_then(Value::as_u64)
			.filter(|z| *z <= u64::from(MAX_ZOOM))
			.map(|z| z as u8)
	};
	let (Some(min_zoom), Some(max_zoom)) = (zoom("min_zoom"), zoom("max_zoom")) else {
		return;
	};

	for (zoom, count) in tiles_per_zoom {
		if *zoom < min_zoom || *zoom > max_zoom {
			errors.push(format!(
				"found {count} tiles at zoom {zoom}, outside the declared zoom range {min_zoom}-{max_zoom}"
			));
		}
	}
	for zoom in min_zoom..=max_zoom {
		if !tiles_per_zoom.contains_key(&zoom) {
			warnings.push(format!("zoom {zoom}: no tiles found"));
		}
	}

	if let Some(declared) = document.get("num_tiles").and_then(Value::as_u64) {
		let counted: u64 = tiles_per_zoom.values().sum();
		if declared != counted {
			warnings.push(format!(
				"metadata declares {declared} tiles but the table contains {counted}"
			));
		}
	}
}
