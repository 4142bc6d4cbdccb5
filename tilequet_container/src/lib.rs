//! Table container layer for TileQuet: the tile source abstraction, the
//! Parquet table writer and reader, the validator and the zoom partitioner.
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`TileSource`] | capability trait any converter implements |
//! | [`TilequetWriter`] | streams a source into a sealed, sorted table |
//! | [`TilequetReader`] | reads a sealed table back |
//! | [`validate_path`] | structural and semantic checks, reported not thrown |
//! | [`split_by_zoom`] | derives per-zoom tables from an existing one |

mod container;
mod partition;
mod types;
mod validate;

pub use container::*;
pub use partition::split_by_zoom;
pub use types::*;
pub use validate::{ValidationReport, ValidationStats, validate_path};
