//! Split a table into one table per zoom level.
//!
//! Remote clients usually query a single zoom level at a time; serving one
//! file per level lets them fetch only the ranges they need. Every output
//! carries an unmodified copy of the source's metadata record, so each file
//! stays self-describing on its own.

use crate::WriterOptions;
use crate::container::tilequet::writer::{StoredRow, write_table_file};
use crate::{TableRow, TilequetReader};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use tilequet_core::CellId;

/// Partitions the sealed table at `input` by zoom level.
///
/// Streams the source once, routes every non-metadata row into its zoom
/// bucket, and writes one `zoom_<z>.parquet` per zoom level present under
/// `output_dir`. Zoom levels without tiles produce no file. The outputs are
/// written concurrently; each is sealed independently, so an aborted run
/// leaves only complete tables behind.
///
/// Returns the zoom levels written and their file paths, ascending by zoom.
pub async fn split_by_zoom(
	input: &Path,
	output_dir: &Path,
	options: &WriterOptions,
) -> Result<Vec<(u8, PathBuf)>> {
	let reader = TilequetReader::open_path(input)?;
	let metadata_json = reader.metadata_json()?;

	let mut buckets: BTreeMap<u8, Vec<StoredRow>> = BTreeMap::new();
	for row in reader.scan()? {
		let TableRow { id, content, .. } = row?;
		if id == 0 {
			continue;
		}
		let zoom = CellId::new(id).zoom()?;
		buckets.entry(zoom).or_default().push((id, content));
	}

	log::info!(
		"splitting {} into {} zoom levels: {:?}",
		input.display(),
		buckets.len(),
		buckets.keys().collect::<Vec<_>>()
	);

	create_dir_all(output_dir).with_context(|| format!("failed to create '{}'", output_dir.display()))?;

	let mut jobs = Vec::new();
	for (zoom, mut rows) in buckets {
		rows.sort_by_key(|row| row.0);
		let path = output_dir.join(format!("zoom_{zoom}.parquet"));
		let job = tokio::task::spawn_blocking({
			let path = path.clone();
			let metadata_json = metadata_json.clone();
			let options = options.clone();
			move || write_table_file(&path, &metadata_json, &rows, &options)
		});
		jobs.push((zoom, path, job));
	}

	let mut outputs = Vec::new();
	for (zoom, path, job) in jobs {
		job.await.context("zoom partition task failed")??;
		log::debug!("wrote zoom {zoom} partition to {}", path.display());
		outputs.push((zoom, path));
	}
	Ok(outputs)
}
