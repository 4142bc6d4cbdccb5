//! The capability interface any tile converter implements.
//!
//! Concrete adapters (archive readers, embedded-database readers, remote
//! tile services, image pyramids) live outside this crate; the table writer
//! only needs something that yields `(coord, bytes)` tuples plus the facts
//! the source can report about itself.

use crate::TileStream;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use tilequet_core::SourceFacts;

/// A finite, possibly large, ordered-or-unordered sequence of tiles plus
/// source-reported facts.
///
/// The trait is object safe so converters can be selected at runtime via
/// `Box<dyn TileSource>`. Implementations may fail mid-stream; such failures
/// abort the conversion run, which never commits a partial table.
#[async_trait]
pub trait TileSource: Debug + Send + Sync {
	/// Short identifier of the source kind, e.g. `"mbtiles"` or `"wmts"`.
	///
	/// Recorded in the metadata provenance section.
	fn source_kind(&self) -> &str;

	/// Facts the source reports about itself. Tile type and content format
	/// are required; bounds and zoom range may be absent, in which case the
	/// writer infers them from the observed tiles.
	fn facts(&self) -> &SourceFacts;

	/// Streams every tile of the source. The sequence may be empty and its
	/// order carries no meaning; the writer is responsible for the final
	/// ordering.
	async fn tile_stream(&self) -> Result<TileStream<'_>>;

	/// Converts `self` into a boxed trait object for dynamic dispatch.
	fn boxed(self) -> Box<dyn TileSource>
	where
		Self: Sized + 'static,
	{
		Box::new(self)
	}
}
