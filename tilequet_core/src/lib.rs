//! Core types for TileQuet: tile coordinates, the quadbin cell id codec,
//! geographic bounds, and the tileset metadata document.

mod error;
pub mod metadata;
pub mod types;

pub use error::TilequetError;
pub use metadata::{LayerInfo, MetadataAccumulator, Processing, SourceFacts, TilesetMetadata, Tiling};
pub use types::*;
