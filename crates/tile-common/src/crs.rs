//! Spatial reference identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A spatial reference identified by its well-known id (wkid).
///
/// The catalog only ever hands out the two references below, but hosts may
/// carry others through, so the wkid stays an open integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpatialReference(pub u32);

impl SpatialReference {
    /// China Geodetic Coordinate System 2000, geographic degrees.
    pub const CGCS2000: SpatialReference = SpatialReference(4490);

    /// ESRI web Mercator (equivalent to EPSG:3857), meters.
    pub const WEB_MERCATOR: SpatialReference = SpatialReference(102100);

    pub fn wkid(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wkid:{}", self.0)
    }
}
