//! Common geometry and tiling types shared across the tile resolver crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod tile;

pub use bbox::{BoundingBox, MapPoint};
pub use crs::SpatialReference;
pub use error::{TileError, TileResult};
pub use tile::{Lod, TileCoord, TileInfo, TileRange};
