//! Mock implementation of a tile source for testing.
//!
//! `MockSource` serves an in-memory tile list, so writer, validator and
//! partitioner behavior can be verified without any real container format
//! or I/O. Tiles are yielded in reverse insertion order to exercise the
//! writer's sorting, and a failure point can be injected to test the
//! abort-whole-run semantics.

use crate::{TileSource, TileStream};
use anyhow::Result;
use async_trait::async_trait;
use std::ops::RangeInclusive;
use tilequet_core::{Blob, SourceFacts, TileCoord, TileFormat, TileType, TilequetError};

/// In-memory tile source.
#[derive(Debug)]
pub struct MockSource {
	facts: SourceFacts,
	tiles: Vec<(TileCoord, Vec<u8>)>,
	fail_after: Option<usize>,
}

impl MockSource {
	/// A raster source serving exactly the given tiles.
	pub fn new_raster(tiles: Vec<(TileCoord, Vec<u8>)>) -> MockSource {
		MockSource {
			facts: SourceFacts::new(TileType::Raster, TileFormat::PNG),
			tiles,
			fail_after: None,
		}
	}

	/// A raster source with every tile of the given zoom levels, each
	/// carrying a small unique payload.
	pub fn new_pyramid(levels: RangeInclusive<u8>) -> MockSource {
		let mut tiles = Vec::new();
		for level in levels {
			for y in 0..(1u32 << level) {
				for x in 0..(1u32 << level) {
					tiles.push((
						TileCoord { level, x, y },
						format!("tile {level}/{x}/{y}").into_bytes(),
					));
				}
			}
		}
		MockSource::new_raster(tiles)
	}

	/// A source that reports facts but yields no tiles at all.
	pub fn new_empty() -> MockSource {
		MockSource::new_raster(Vec::new())
	}

	/// Replaces the reported facts.
	pub fn with_facts(mut self, facts: SourceFacts) -> MockSource {
		self.facts = facts;
		self
	}

	/// Makes the stream fail with a source error after `n` tiles.
	pub fn failing_after(mut self, n: usize) -> MockSource {
		self.fail_after = Some(n);
		self
	}
}

#[async_trait]
impl TileSource for MockSource {
	fn source_kind(&self) -> &str {
		"mock"
	}

	fn facts(&self) -> &SourceFacts {
		&self.facts
	}

	async fn tile_stream(&self) -> Result<TileStream<'_>> {
		let fail_after = self.fail_after;
		let items = self
			.tiles
			.iter()
			.rev()
			.cloned()
			.map(|(coord, data)| Ok((coord, Blob::from(data))))
			.enumerate()
			.map(move |(index, item)| {
				if fail_after == Some(index) {
					Err(TilequetError::source("mock source failed on purpose"))
				} else {
					item
				}
			});
		Ok(TileStream::from_try_iter(items))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn pyramid_counts() -> Result<()> {
		let source = MockSource::new_pyramid(0..=2);
		assert_eq!(source.tile_stream().await?.drain_and_count().await?, 21);
		assert_eq!(source.facts().tile_format, Some(TileFormat::PNG));
		Ok(())
	}

	#[tokio::test]
	async fn injected_failure_stops_the_stream() -> Result<()> {
		let source = MockSource::new_pyramid(2..=2).failing_after(3);
		assert!(source.tile_stream().await?.drain_and_count().await.is_err());
		Ok(())
	}
}
