//! Tile address resolution.
//!
//! Turns a layer type and tile coordinate into the address a tiling consumer
//! should fetch. Online layers produce a WMTS `GetTile` URL:
//!
//! ```text
//! {base}?service=wmts&request=gettile&version=1.0.0&layer={name}&format=tiles&tilematrixset={set}&tilecol={col}&tilerow={row}&tilematrix={level+2}
//! ```
//!
//! Offline layers produce a path below their storage root:
//!
//! ```text
//! {base}/metrix{level+2}/row{row}/col{col}{suffix}
//! ```
//!
//! A tile that cannot be addressed is reported as [`Unresolved`]; callers are
//! expected to skip it rather than treat it as a failure.

use crate::catalog::{LayerCatalog, LayerDescriptor, TileSource, ONLINE_HOST};
use crate::layer_type::LayerType;
use crate::wmts::{tile_matrix_for, GetTileRequest};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use tile_common::{TileCoord, TileRange};
use tracing::debug;

/// A fetchable tile address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "address", rename_all = "snake_case")]
pub enum TileAddress {
    /// WMTS query URL on the live service
    Url(String),
    /// Path below an offline storage root
    Path(String),
}

impl TileAddress {
    pub fn as_str(&self) -> &str {
        match self {
            TileAddress::Url(s) | TileAddress::Path(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            TileAddress::Url(s) | TileAddress::Path(s) => s,
        }
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a tile has no address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unresolved {
    /// Requested level is outside the layer's zoom range.
    OutOfRange {
        level: u32,
        min_zoom: u32,
        max_zoom: u32,
    },
    /// An offline layer would have hit the live service.
    OfflinePolicyViolation,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::OutOfRange {
                level,
                min_zoom,
                max_zoom,
            } => write!(f, "level {} outside zoom range {}..={}", level, min_zoom, max_zoom),
            Unresolved::OfflinePolicyViolation => {
                write!(f, "offline layer points at {}", ONLINE_HOST)
            }
        }
    }
}

/// Resolves tile addresses against a [`LayerCatalog`].
///
/// Stateless apart from the catalog; descriptors are rebuilt per call.
#[derive(Debug, Clone)]
pub struct TileAddressResolver {
    catalog: LayerCatalog,
}

impl TileAddressResolver {
    pub fn new(catalog: LayerCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    /// Resolve one tile, keeping the reason when there is no address.
    pub fn resolve(&self, layer_type: LayerType, coord: TileCoord) -> Result<TileAddress, Unresolved> {
        let descriptor = self.catalog.resolve(layer_type);
        let result = Self::address_for(&descriptor, coord);

        if let Err(reason) = &result {
            debug!(
                layer = %layer_type,
                tile = %coord.cache_key(),
                %reason,
                "Tile not resolvable"
            );
        }

        result
    }

    /// Address of a tile, or `None` when it should not be requested.
    pub fn tile_address(&self, layer_type: LayerType, level: u32, row: u32, col: u32) -> Option<String> {
        self.resolve(layer_type, TileCoord::new(level, row, col))
            .ok()
            .map(TileAddress::into_string)
    }

    /// Resolve every tile of a range, in parallel. Output is in the range's
    /// row-major order.
    ///
    /// The result holds one entry per tile, so callers should bound
    /// `range.len()` first.
    pub fn resolve_range(
        &self,
        layer_type: LayerType,
        range: &TileRange,
    ) -> Vec<(TileCoord, Result<TileAddress, Unresolved>)> {
        let descriptor = self.catalog.resolve(layer_type);
        let level = range.level;
        let cols = range.min_col..=range.max_col;

        (range.min_row..=range.max_row)
            .into_par_iter()
            .flat_map_iter(|row| {
                cols.clone()
                    .map(move |col| TileCoord::new(level, row, col))
            })
            .map(|coord| (coord, Self::address_for(&descriptor, coord)))
            .collect()
    }

    /// Format the address of `coord` for an already resolved descriptor.
    ///
    /// The zoom range is checked before anything is formatted.
    pub fn address_for(descriptor: &LayerDescriptor, coord: TileCoord) -> Result<TileAddress, Unresolved> {
        let out_of_range = Unresolved::OutOfRange {
            level: coord.level,
            min_zoom: descriptor.min_zoom,
            max_zoom: descriptor.max_zoom,
        };
        if !descriptor.accepts_level(coord.level) {
            return Err(out_of_range);
        }

        match descriptor.source {
            TileSource::Online { service_layer } => {
                let request =
                    GetTileRequest::for_tile(service_layer, descriptor.tile_matrix_set, &coord)
                        .ok_or(out_of_range)?;
                Ok(TileAddress::Url(request.to_url(&descriptor.base_location)))
            }
            TileSource::Offline { file_suffix } => {
                if descriptor.base_location.contains(ONLINE_HOST) {
                    return Err(Unresolved::OfflinePolicyViolation);
                }
                let tile_matrix = tile_matrix_for(coord.level).ok_or(out_of_range)?;
                Ok(TileAddress::Path(format!(
                    "{}/metrix{}/row{}/col{}{}",
                    descriptor.base_location, tile_matrix, coord.row, coord.col, file_suffix
                )))
            }
        }
    }
}
