//! The TileQuet table container: a Parquet file with three columns.
//!
//! | Column     | Type   | Nullable | Content |
//! |------------|--------|----------|---------|
//! | `id`       | uint64 | no       | quadbin cell id, `0` on the metadata record |
//! | `metadata` | utf8   | yes      | JSON document, non-null only where `id = 0` |
//! | `content`  | binary | yes      | opaque tile payload, null only where `id = 0` |
//!
//! Rows are sorted ascending by `id` and grouped into row groups of a
//! configurable size (default 200), so range scans over the sorted cell ids
//! can prune row groups via their statistics. Two key/value tags at the file
//! level identify the format without parsing any row content.

pub(crate) mod reader;
pub(crate) mod writer;

pub use reader::{TableRow, TilequetReader};
pub use writer::{TilequetWriter, WriterOptions};

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;

pub(crate) const COL_ID: &str = "id";
pub(crate) const COL_METADATA: &str = "metadata";
pub(crate) const COL_CONTENT: &str = "content";

/// File-level tag carrying the format version.
pub const TABLE_TAG_VERSION: &str = "tilequet:version";
/// File-level tag carrying the tiling scheme identifier.
pub const TABLE_TAG_SCHEME: &str = "tilequet:scheme";

pub(crate) fn table_schema() -> SchemaRef {
	Arc::new(Schema::new(vec![
		Field::new(COL_ID, DataType::UInt64, false),
		Field::new(COL_METADATA, DataType::Utf8, true),
		Field::new(COL_CONTENT, DataType::Binary, true),
	]))
}

/// Reports every deviation from the required column layout.
///
/// Returns an empty list for a conforming schema. Used by the reader (which
/// turns problems into a schema error) and the validator (which reports them
/// individually).
pub(crate) fn schema_problems(schema: &Schema) -> Vec<String> {
	let mut problems = Vec::new();
	let mut check = |name: &str, expected: &DataType| match schema.column_with_name(name) {
		None => problems.push(format!("missing required column '{name}'")),
		Some((_, field)) => {
			if field.data_type() != expected {
				problems.push(format!(
					"column '{name}' should be {expected}, got {}",
					field.data_type()
				));
			}
		}
	};
	check(COL_ID, &DataType::UInt64);
	check(COL_METADATA, &DataType::Utf8);
	check(COL_CONTENT, &DataType::Binary);
	problems
}
