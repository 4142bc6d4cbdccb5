//! Contains the tile container implementations.
//!
//! The only physical container this crate defines is the TileQuet Parquet
//! table itself; everything that produces tiles for it enters through the
//! [`crate::TileSource`] interface.

#[cfg(any(test, feature = "test"))]
mod mock;
#[cfg(any(test, feature = "test"))]
pub use mock::MockSource;

pub(crate) mod tilequet;
pub use tilequet::{TABLE_TAG_SCHEME, TABLE_TAG_VERSION, TableRow, TilequetReader, TilequetWriter, WriterOptions};
