//! WMTS `GetTile` key/value encoding as spoken by the Tianditu service.
//!
//! The service expects lowercase keys in a fixed order and a tile matrix
//! identifier two above the logical zoom level.

use serde::Serialize;
use tile_common::{TileCoord, TileError, TileResult};

/// Difference between a logical zoom level and the service's tile matrix id.
pub const MATRIX_LEVEL_OFFSET: u32 = 2;

/// Service tile matrix id for a logical level, or `None` if it would overflow.
pub fn tile_matrix_for(level: u32) -> Option<u32> {
    level.checked_add(MATRIX_LEVEL_OFFSET)
}

/// The only format value the service understands.
pub const TILE_FORMAT: &str = "tiles";

const SERVICE: &str = "wmts";
const REQUEST: &str = "gettile";
const VERSION: &str = "1.0.0";

/// GetTile request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetTileRequest {
    /// Layer code (e.g. "img")
    pub layer: String,

    pub format: String,

    /// TileMatrixSet identifier ("c" or "w")
    pub tile_matrix_set: String,

    /// Service-side tile matrix, already shifted by MATRIX_LEVEL_OFFSET
    pub tile_matrix: u32,

    pub tile_row: u32,

    pub tile_col: u32,
}

impl GetTileRequest {
    /// Build the request for a logical tile coordinate. `None` when the
    /// level has no tile matrix id.
    pub fn for_tile(layer: &str, tile_matrix_set: &str, coord: &TileCoord) -> Option<Self> {
        Some(Self {
            layer: layer.to_string(),
            format: TILE_FORMAT.to_string(),
            tile_matrix_set: tile_matrix_set.to_string(),
            tile_matrix: tile_matrix_for(coord.level)?,
            tile_row: coord.row,
            tile_col: coord.col,
        })
    }

    /// Encode as a query string (without the leading `?`).
    pub fn to_query(&self) -> String {
        format!(
            "service={}&request={}&version={}&layer={}&format={}&tilematrixset={}&tilecol={}&tilerow={}&tilematrix={}",
            SERVICE,
            REQUEST,
            VERSION,
            self.layer,
            self.format,
            self.tile_matrix_set,
            self.tile_col,
            self.tile_row,
            self.tile_matrix
        )
    }

    /// Full tile URL against a service endpoint.
    pub fn to_url(&self, base: &str) -> String {
        format!("{}?{}", base, self.to_query())
    }

    /// Convert back to a logical TileCoord.
    pub fn to_tile_coord(&self) -> TileResult<TileCoord> {
        let level = self
            .tile_matrix
            .checked_sub(MATRIX_LEVEL_OFFSET)
            .ok_or_else(|| TileError::InvalidParameter {
                param: "tilematrix".to_string(),
                message: format!(
                    "tile matrix {} is below the level offset {}",
                    self.tile_matrix, MATRIX_LEVEL_OFFSET
                ),
            })?;

        Ok(TileCoord::new(level, self.tile_row, self.tile_col))
    }
}

/// A tile URL split into its endpoint and request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTileUrl {
    pub base: String,
    pub request: GetTileRequest,
}

impl ParsedTileUrl {
    /// Parse a key/value GetTile URL. Keys are matched case-insensitively.
    pub fn parse(url: &str) -> TileResult<Self> {
        let (base, query) = url
            .split_once('?')
            .ok_or_else(|| TileError::MissingParameter("query string".to_string()))?;

        let mut service = None;
        let mut request = None;
        let mut layer = None;
        let mut format = None;
        let mut tile_matrix_set = None;
        let mut tile_matrix = None;
        let mut tile_row = None;
        let mut tile_col = None;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key.to_ascii_lowercase().as_str() {
                "service" => service = Some(value),
                "request" => request = Some(value),
                "layer" => layer = Some(value),
                "format" => format = Some(value),
                "tilematrixset" => tile_matrix_set = Some(value),
                "tilematrix" => tile_matrix = Some(parse_number("tilematrix", value)?),
                "tilerow" => tile_row = Some(parse_number("tilerow", value)?),
                "tilecol" => tile_col = Some(parse_number("tilecol", value)?),
                _ => {}
            }
        }

        if let Some(service) = service {
            if !service.eq_ignore_ascii_case(SERVICE) {
                return Err(TileError::InvalidParameter {
                    param: "service".to_string(),
                    message: format!("service must be WMTS, got {}", service),
                });
            }
        }

        match request {
            Some(r) if r.eq_ignore_ascii_case(REQUEST) => {}
            Some(r) => {
                return Err(TileError::InvalidParameter {
                    param: "request".to_string(),
                    message: format!("Unknown request: {}", r),
                })
            }
            None => return Err(TileError::MissingParameter("request".to_string())),
        }

        let request = GetTileRequest {
            layer: layer
                .ok_or_else(|| TileError::MissingParameter("layer".to_string()))?
                .to_string(),
            format: format.unwrap_or(TILE_FORMAT).to_string(),
            tile_matrix_set: tile_matrix_set
                .ok_or_else(|| TileError::MissingParameter("tilematrixset".to_string()))?
                .to_string(),
            tile_matrix: tile_matrix
                .ok_or_else(|| TileError::MissingParameter("tilematrix".to_string()))?,
            tile_row: tile_row.ok_or_else(|| TileError::MissingParameter("tilerow".to_string()))?,
            tile_col: tile_col.ok_or_else(|| TileError::MissingParameter("tilecol".to_string()))?,
        };

        Ok(Self {
            base: base.to_string(),
            request,
        })
    }
}

fn parse_number(param: &str, value: &str) -> TileResult<u32> {
    value.parse().map_err(|_| TileError::InvalidParameter {
        param: param.to_string(),
        message: format!("Invalid number: {}", value),
    })
}
