//! Tianditu layer catalog and tile address resolution.
//!
//! Maps each of the 22 Tianditu layer types to its declared spatial metadata
//! and turns (layer type, level, row, column) into either an online WMTS
//! `GetTile` URL or an offline tile path. Everything here is a pure function
//! of static tables; nothing performs I/O.

pub mod catalog;
pub mod host;
pub mod layer_type;
pub mod resolver;
pub mod wmts;

pub use catalog::{FamilyTables, LayerCatalog, LayerDescriptor, TileSource, ONLINE_HOST};
pub use host::host_root;
pub use layer_type::{Annotation, Content, Datum, LayerType};
pub use resolver::{TileAddress, TileAddressResolver, Unresolved};
pub use wmts::{GetTileRequest, ParsedTileUrl, MATRIX_LEVEL_OFFSET};
