//! Contains types like tile coordinates, cell ids, bounding boxes and format enums.

mod blob;
mod cell_id;
mod geo_bbox;
mod geo_center;
mod tile_coord;
mod tile_format;
mod tile_type;
mod tiling_scheme;

pub use blob::Blob;
pub use cell_id::{CellId, MAX_ZOOM};
pub use geo_bbox::GeoBBox;
pub use geo_center::GeoCenter;
pub use tile_coord::TileCoord;
pub use tile_format::TileFormat;
pub use tile_type::TileType;
pub use tiling_scheme::TilingScheme;
