//! Tile coordinates and resolution-based tiling schemes.
//!
//! A tiling scheme here is described the way ArcGIS-style tiled layers
//! declare it: an origin at the top-left corner of the grid, a tile size in
//! pixels, and one resolution (map units per pixel) per level of detail.
//! Rows grow downward from the origin and columns grow to the right.

use crate::{BoundingBox, MapPoint};
use serde::{Deserialize, Serialize};

/// A tile coordinate (level/row/col).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Logical zoom level (index into the level-of-detail list)
    pub level: u32,
    /// Row, counted down from the origin
    pub row: u32,
    /// Column, counted right from the origin
    pub col: u32,
}

impl TileCoord {
    pub fn new(level: u32, row: u32, col: u32) -> Self {
        Self { level, row, col }
    }

    /// Generate a cache key string.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.level, self.row, self.col)
    }
}

/// A single level of detail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lod {
    pub level: u32,
    /// Map units per pixel
    pub resolution: f64,
}

/// Complete tiling scheme for a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileInfo {
    /// Tile width in pixels
    pub width: u32,
    /// Tile height in pixels
    pub height: u32,
    /// Top-left corner of the tile grid
    pub origin: MapPoint,
    /// Area the grid covers; no tile lies outside it
    pub extent: BoundingBox,
    /// Levels of detail, coarsest first
    pub lods: Vec<Lod>,
}

impl TileInfo {
    /// Build a tiling scheme with one level of detail per resolution.
    pub fn new(
        width: u32,
        height: u32,
        origin: MapPoint,
        extent: BoundingBox,
        resolutions: &[f64],
    ) -> Self {
        let lods = resolutions
            .iter()
            .enumerate()
            .map(|(level, &resolution)| Lod {
                level: level as u32,
                resolution,
            })
            .collect();

        Self {
            width,
            height,
            origin,
            extent,
            lods,
        }
    }

    /// Get the level of detail for a zoom level.
    pub fn lod(&self, level: u32) -> Option<&Lod> {
        self.lods.get(level as usize)
    }

    /// Map-space size of one tile at a level, as (width, height).
    pub fn tile_span(&self, level: u32) -> Option<(f64, f64)> {
        self.lod(level).map(|lod| {
            (
                lod.resolution * self.width as f64,
                lod.resolution * self.height as f64,
            )
        })
    }

    /// Get the bounding box for a specific tile.
    pub fn tile_bbox(&self, coord: &TileCoord) -> Option<BoundingBox> {
        let (span_x, span_y) = self.tile_span(coord.level)?;

        let min_x = self.origin.x + coord.col as f64 * span_x;
        let max_y = self.origin.y - coord.row as f64 * span_y;

        Some(BoundingBox::new(min_x, max_y - span_y, min_x + span_x, max_y))
    }

    /// Number of tile columns and rows covering the extent at a level.
    pub fn grid_size(&self, level: u32) -> Option<(u32, u32)> {
        let (span_x, span_y) = self.tile_span(level)?;
        let cols = tile_count((self.extent.max_x - self.origin.x) / span_x)?;
        let rows = tile_count((self.origin.y - self.extent.min_y) / span_y)?;
        Some((cols, rows))
    }

    /// Find which tile contains a given coordinate.
    ///
    /// Returns `None` for levels without a resolution and for points outside
    /// the extent. A point on the extent's right or bottom edge belongs to
    /// the last column or row.
    pub fn tile_at(&self, level: u32, x: f64, y: f64) -> Option<TileCoord> {
        if !self.extent.contains_point(x, y) {
            return None;
        }
        let (span_x, span_y) = self.tile_span(level)?;
        let (cols, rows) = self.grid_size(level)?;

        let col = ((x - self.origin.x) / span_x).floor();
        let row = ((self.origin.y - y) / span_y).floor();

        // Also rejects NaN.
        if !(col >= 0.0 && row >= 0.0) {
            return None;
        }

        Some(TileCoord::new(
            level,
            row.min(f64::from(rows - 1)) as u32,
            col.min(f64::from(cols - 1)) as u32,
        ))
    }

    /// Inclusive span of tiles covering a bounding box at a level.
    ///
    /// `bbox` is clipped to the extent first; a bbox that does not overlap
    /// the extent yields `None`.
    pub fn tile_range(&self, level: u32, bbox: &BoundingBox) -> Option<TileRange> {
        let clipped = bbox.intersection(&self.extent)?;
        let (span_x, span_y) = self.tile_span(level)?;
        let (cols, rows) = self.grid_size(level)?;
        let last_col_index = f64::from(cols - 1);
        let last_row_index = f64::from(rows - 1);

        let first_col = ((clipped.min_x - self.origin.x) / span_x)
            .floor()
            .clamp(0.0, last_col_index);
        let first_row = ((self.origin.y - clipped.max_y) / span_y)
            .floor()
            .clamp(0.0, last_row_index);
        // A max edge sitting exactly on a tile boundary does not pull in the next tile.
        let last_col = (((clipped.max_x - self.origin.x) / span_x).ceil() - 1.0)
            .min(last_col_index)
            .max(first_col);
        let last_row = (((self.origin.y - clipped.min_y) / span_y).ceil() - 1.0)
            .min(last_row_index)
            .max(first_row);

        if !(first_col.is_finite() && first_row.is_finite())
            || !(last_col.is_finite() && last_row.is_finite())
        {
            return None;
        }

        Some(TileRange {
            level,
            min_row: first_row as u32,
            max_row: last_row as u32,
            min_col: first_col as u32,
            max_col: last_col as u32,
        })
    }
}

/// Whole tiles needed to cover `spans` tile widths. Values within float
/// noise of an integer are not rounded up.
fn tile_count(spans: f64) -> Option<u32> {
    if !spans.is_finite() || spans <= 0.0 {
        return None;
    }
    let nearest = spans.round();
    let count = if (spans - nearest).abs() <= 1e-9 * nearest.max(1.0) {
        nearest
    } else {
        spans.ceil()
    };
    if count < 1.0 || count > f64::from(u32::MAX) {
        return None;
    }
    Some(count as u32)
}

/// An inclusive rectangle of tiles at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRange {
    pub level: u32,
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl TileRange {
    /// Number of tiles in the range. Inverted ranges hold none.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let rows = (self.max_row - self.min_row) as usize;
        let cols = (self.max_col - self.min_col) as usize;
        rows.saturating_add(1).saturating_mul(cols.saturating_add(1))
    }

    pub fn is_empty(&self) -> bool {
        self.max_row < self.min_row || self.max_col < self.min_col
    }

    /// Iterate every tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.min_row..=self.max_row).flat_map(move |row| {
            (self.min_col..=self.max_col).map(move |col| TileCoord::new(self.level, row, col))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geographic_info() -> TileInfo {
        // 90 degrees per 256px tile at level 0
        TileInfo::new(
            256,
            256,
            MapPoint::new(-180.0, 90.0),
            BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
            &[0.3515625, 0.17578125, 0.087890625],
        )
    }

    #[test]
    fn test_lods_follow_resolutions() {
        let info = geographic_info();
        assert_eq!(info.lods.len(), 3);
        assert_eq!(info.lods[1].level, 1);
        assert_eq!(info.lods[1].resolution, 0.17578125);
        assert!(info.lod(3).is_none());
    }

    #[test]
    fn test_grid_size() {
        let info = geographic_info();
        assert_eq!(info.grid_size(0), Some((4, 2)));
        assert_eq!(info.grid_size(2), Some((16, 8)));
        assert_eq!(info.grid_size(3), None);
    }

    #[test]
    fn test_grid_size_ignores_float_noise() {
        assert_eq!(tile_count(4.000000000001), Some(4));
        assert_eq!(tile_count(3.99999), Some(4));
        assert_eq!(tile_count(0.0), None);
        assert_eq!(tile_count(f64::INFINITY), None);
    }

    #[test]
    fn test_tile_bbox() {
        let info = geographic_info();
        let bbox = info.tile_bbox(&TileCoord::new(0, 0, 0)).unwrap();
        assert_eq!(bbox, BoundingBox::new(-180.0, 0.0, -90.0, 90.0));

        let bbox = info.tile_bbox(&TileCoord::new(0, 1, 3)).unwrap();
        assert_eq!(bbox, BoundingBox::new(90.0, -90.0, 180.0, 0.0));

        assert!(info.tile_bbox(&TileCoord::new(9, 0, 0)).is_none());
    }

    #[test]
    fn test_tile_at() {
        let info = geographic_info();
        // Beijing
        let coord = info.tile_at(0, 116.4, 39.9).unwrap();
        assert_eq!(coord, TileCoord::new(0, 0, 3));

        let coord = info.tile_at(1, 116.4, 39.9).unwrap();
        assert_eq!(coord, TileCoord::new(1, 1, 6));

        assert!(info.tile_at(0, -181.0, 0.0).is_none());
        assert!(info.tile_at(0, 0.0, 91.0).is_none());
    }

    #[test]
    fn test_tile_at_outside_extent() {
        let info = geographic_info();
        assert!(info.tile_at(0, 1e300, -1e300).is_none());
        assert!(info.tile_at(0, 0.0, -90.5).is_none());
        assert!(info.tile_at(0, f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_tile_at_far_edges() {
        let info = geographic_info();
        assert_eq!(info.tile_at(0, 180.0, -90.0), Some(TileCoord::new(0, 1, 3)));
    }

    #[test]
    fn test_tile_range_full_extent() {
        let info = geographic_info();
        let range = info
            .tile_range(0, &BoundingBox::new(-180.0, -90.0, 180.0, 90.0))
            .unwrap();

        assert_eq!(range.min_row, 0);
        assert_eq!(range.max_row, 1);
        assert_eq!(range.min_col, 0);
        assert_eq!(range.max_col, 3);
        assert_eq!(range.len(), 8);

        let coords: Vec<TileCoord> = range.iter().collect();
        assert_eq!(coords[0], TileCoord::new(0, 0, 0));
        assert_eq!(coords[4], TileCoord::new(0, 1, 0));
    }

    #[test]
    fn test_tile_range_inside_one_tile() {
        let info = geographic_info();
        let range = info
            .tile_range(0, &BoundingBox::new(100.0, 20.0, 120.0, 40.0))
            .unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![TileCoord::new(0, 0, 3)]);
    }

    #[test]
    fn test_tile_range_clipped_to_extent() {
        let info = geographic_info();
        let range = info
            .tile_range(0, &BoundingBox::new(0.0, -1000.0, 10.0, 10.0))
            .unwrap();
        assert_eq!((range.min_row, range.max_row), (0, 1));
        assert_eq!((range.min_col, range.max_col), (2, 2));

        let range = info
            .tile_range(2, &BoundingBox::new(-1e12, -1e12, 1e12, 1e12))
            .unwrap();
        assert_eq!(range.len(), 16 * 8);
    }

    #[test]
    fn test_tile_range_outside_extent() {
        let info = geographic_info();
        assert!(info
            .tile_range(0, &BoundingBox::new(-200.0, 95.0, -190.0, 100.0))
            .is_none());
        assert!(info
            .tile_range(0, &BoundingBox::new(0.0, -1000.0, 10.0, -500.0))
            .is_none());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = TileRange {
            level: 0,
            min_row: 2,
            max_row: 1,
            min_col: 0,
            max_col: 3,
        };
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.iter().count(), 0);

        let single = TileRange {
            level: 0,
            min_row: 1,
            max_row: 1,
            min_col: 3,
            max_col: 3,
        };
        assert!(!single.is_empty());
        assert_eq!(single.len(), 1);
    }
}
