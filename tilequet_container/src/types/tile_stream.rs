//! Asynchronous stream of tiles produced by a [`crate::TileSource`].

use anyhow::Result;
use futures::{Stream, StreamExt, stream::BoxStream};
use tilequet_core::{Blob, TileCoord};

/// A stream of `(TileCoord, Blob)` pairs.
///
/// Items are wrapped in `Result` so a source can fail mid-stream; the
/// consumer decides whether that aborts the run (the table writer does).
/// No traversal order is guaranteed.
pub struct TileStream<'a> {
	inner: BoxStream<'a, Result<(TileCoord, Blob)>>,
}

impl<'a> TileStream<'a> {
	/// Wraps an existing stream.
	pub fn from_stream(stream: impl Stream<Item = Result<(TileCoord, Blob)>> + Send + 'a) -> TileStream<'a> {
		TileStream {
			inner: stream.boxed(),
		}
	}

	/// Creates a stream from already-materialized tiles.
	pub fn from_vec(tiles: Vec<(TileCoord, Blob)>) -> TileStream<'static> {
		TileStream {
			inner: futures::stream::iter(tiles.into_iter().map(Ok)).boxed(),
		}
	}

	/// Creates a stream from a fallible iterator.
	pub fn from_try_iter<I>(iter: I) -> TileStream<'a>
	where
		I: Iterator<Item = Result<(TileCoord, Blob)>> + Send + 'a,
	{
		TileStream {
			inner: futures::stream::iter(iter).boxed(),
		}
	}

	pub async fn next(&mut self) -> Option<Result<(TileCoord, Blob)>> {
		self.inner.next().await
	}

	/// Drains the stream, returning the number of tiles or the first error.
	pub async fn drain_and_count(mut self) -> Result<u64> {
		let mut count = 0;
		while let Some(item) = self.next().await {
			item?;
			count += 1;
		}
		Ok(count)
	}
}
