//! Types shared across the container layer.

mod tile_source;
mod tile_stream;

pub use tile_source::TileSource;
pub use tile_stream::TileStream;
