//! Static layer catalog.
//!
//! Every layer type maps to one entry: where its tiles live and how they are
//! named. The numeric tiling tables (extent, origin, resolutions) come from
//! one of two shared families selected by the layer's datum.

use crate::layer_type::{Datum, LayerType};
use serde::Serialize;
use tile_common::{BoundingBox, MapPoint, SpatialReference, TileInfo, TileResult};
use tracing::debug;

/// Host fragment of the live tile service. Offline layers whose base
/// location contains it are refused by the resolver.
pub const ONLINE_HOST: &str = "tianditu.com";

pub const DEFAULT_TILE_SIZE: u32 = 256;
pub const DEFAULT_MIN_ZOOM: u32 = 0;
pub const DEFAULT_MAX_ZOOM: u32 = 16;
pub const DEFAULT_DPI: u32 = 96;

const MERCATOR_MAX_EXTENT: f64 = 20037508.3427892;

static RESOLUTIONS_CGCS2000: [f64; 15] = [
    0.3515625,
    0.17578125,
    0.087890625,
    0.0439453125,
    0.02197265625,
    0.010986328125,
    0.0054931640625,
    0.00274658203125,
    0.001373291015625,
    0.0006866455078125,
    0.00034332275390625,
    0.000171661376953125,
    8.58306884765625E-05,
    4.29153442382813E-05,
    2.14576721191406E-05,
];

static RESOLUTIONS_WEB_MERCATOR: [f64; 17] = [
    39135.83675440267,
    19567.918377201335,
    9783.959188600667,
    4891.979594300334,
    2445.989797150167,
    1222.9948985750834,
    611.4974492875417,
    305.7487246437696,
    152.87436232188531,
    76.43718116094266,
    38.21859058047133,
    19.109295290235693,
    9.554647645117846,
    4.777323822558923,
    2.3886619112794585,
    1.1943309556397292,
    0.597165477819866,
];

/// Scale denominators shared by both families.
static SCALES: [f64; 18] = [
    2.958293554545656E8,
    1.479146777272828E8,
    7.39573388636414E7,
    3.69786694318207E7,
    1.848933471591035E7,
    9244667.357955175,
    4622333.678977588,
    2311166.839488794,
    1155583.419744397,
    577791.7098721985,
    288895.85493609926,
    144447.92746804963,
    72223.96373402482,
    36111.98186701241,
    18055.990933506204,
    9027.995466753102,
    4513.997733376551,
    2256.998866688275,
];

/// Numeric tiling tables shared by every layer on one datum.
#[derive(Debug)]
pub struct FamilyTables {
    pub tile_matrix_set: &'static str,
    pub spatial_reference: SpatialReference,
    pub extent: BoundingBox,
    pub origin: MapPoint,
    pub resolutions: &'static [f64],
}

pub static CGCS2000_FAMILY: FamilyTables = FamilyTables {
    tile_matrix_set: "c",
    spatial_reference: SpatialReference::CGCS2000,
    extent: BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
    origin: MapPoint::new(-180.0, 90.0),
    resolutions: &RESOLUTIONS_CGCS2000,
};

pub static WEB_MERCATOR_FAMILY: FamilyTables = FamilyTables {
    tile_matrix_set: "w",
    spatial_reference: SpatialReference::WEB_MERCATOR,
    extent: BoundingBox::new(
        -MERCATOR_MAX_EXTENT,
        -MERCATOR_MAX_EXTENT,
        MERCATOR_MAX_EXTENT,
        MERCATOR_MAX_EXTENT,
    ),
    origin: MapPoint::new(-MERCATOR_MAX_EXTENT, MERCATOR_MAX_EXTENT),
    resolutions: &RESOLUTIONS_WEB_MERCATOR,
};

impl Datum {
    pub fn family(self) -> &'static FamilyTables {
        match self {
            Datum::Cgcs2000 => &CGCS2000_FAMILY,
            Datum::WebMercator => &WEB_MERCATOR_FAMILY,
        }
    }
}

/// How tiles of a layer are addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileSource {
    /// Served by the WMTS endpoint under this layer code.
    Online { service_layer: &'static str },
    /// Stored as files under the offline root with this extension.
    Offline { file_suffix: &'static str },
}

impl TileSource {
    /// The layer code or file suffix, whichever this source carries.
    pub fn layer_name(&self) -> &'static str {
        match self {
            TileSource::Online { service_layer } => service_layer,
            TileSource::Offline { file_suffix } => file_suffix,
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, TileSource::Offline { .. })
    }
}

impl Default for TileSource {
    fn default() -> Self {
        TileSource::Online { service_layer: "" }
    }
}

/// Immutable spatial metadata for one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerDescriptor {
    /// Service endpoint, or offline storage root
    pub base_location: String,
    pub source: TileSource,
    pub tile_matrix_set: &'static str,
    pub spatial_reference: SpatialReference,
    pub extent: BoundingBox,
    pub origin: MapPoint,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Map units per pixel, coarsest level first
    pub resolutions: &'static [f64],
    pub scales: &'static [f64],
    pub dpi: u32,
    pub min_zoom: u32,
    pub max_zoom: u32,
}

impl Default for LayerDescriptor {
    /// A descriptor with no location, no reference and no levels. Only the
    /// tile size, zoom bounds and dpi keep their usual values.
    fn default() -> Self {
        Self {
            base_location: String::new(),
            source: TileSource::default(),
            tile_matrix_set: "",
            spatial_reference: SpatialReference::default(),
            extent: BoundingBox::default(),
            origin: MapPoint::new(0.0, 0.0),
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
            resolutions: &[],
            scales: &[],
            dpi: DEFAULT_DPI,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl LayerDescriptor {
    fn from_family(base_location: String, source: TileSource, family: &'static FamilyTables) -> Self {
        Self {
            base_location,
            source,
            tile_matrix_set: family.tile_matrix_set,
            spatial_reference: family.spatial_reference,
            extent: family.extent,
            origin: family.origin,
            resolutions: family.resolutions,
            scales: &SCALES,
            ..Self::default()
        }
    }

    /// Narrow or widen the accepted zoom range.
    pub fn with_zoom_range(mut self, min_zoom: u32, max_zoom: u32) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn layer_name(&self) -> &'static str {
        self.source.layer_name()
    }

    pub fn is_offline(&self) -> bool {
        self.source.is_offline()
    }

    pub fn accepts_level(&self, level: u32) -> bool {
        level >= self.min_zoom && level <= self.max_zoom
    }

    /// Tiling scheme with one level of detail per resolution.
    pub fn tile_info(&self) -> TileInfo {
        TileInfo::new(
            self.tile_width,
            self.tile_height,
            self.origin,
            self.extent,
            self.resolutions,
        )
    }
}

/// Where an entry's tiles live before the host root is known.
#[derive(Debug, Clone, Copy)]
enum Location {
    Remote(&'static str),
    /// Path below the host root
    Local(&'static str),
}

struct CatalogEntry {
    location: Location,
    source: TileSource,
}

const fn online(url: &'static str, service_layer: &'static str) -> CatalogEntry {
    CatalogEntry {
        location: Location::Remote(url),
        source: TileSource::Online { service_layer },
    }
}

const fn offline(location: Location, file_suffix: &'static str) -> CatalogEntry {
    CatalogEntry {
        location,
        source: TileSource::Offline { file_suffix },
    }
}

const BASE_SUFFIX: &str = ".jpg";
const ANNOTATION_SUFFIX: &str = ".png";

fn entry(layer_type: LayerType) -> CatalogEntry {
    use LayerType::*;
    match layer_type {
        VectorMercator => online("http://t0.tianditu.com/vec_w/wmts", "vec"),
        VectorAnnotationChineseMercator => online("http://t0.tianditu.com/cva_w/wmts", "cva"),
        VectorAnnotationEnglishMercator => online("http://t0.tianditu.com/eva_w/wmts", "eva"),
        ImageMercator => online("http://t0.tianditu.com/img_w/wmts", "img"),
        ImageAnnotationChineseMercator => online("http://t0.tianditu.com/cia_w/wmts", "cia"),
        ImageAnnotationEnglishMercator => online("http://t0.tianditu.com/eia_w/wmts", "eia"),
        TerrainMercator => online("http://t0.tianditu.com/ter_w/wmts", "ter"),
        TerrainAnnotationChineseMercator => online("http://t0.tianditu.com/cta_w/wmts", "cta"),
        Vector2000 => online("http://t0.tianditu.com/vec_c/wmts", "vec"),
        VectorAnnotationChinese2000 => online("http://t0.tianditu.com/cva_c/wmts", "cva"),
        VectorAnnotationEnglish2000 => online("http://t0.tianditu.com/eva_c/wmts", "eva"),
        Image2000 => online("http://t0.tianditu.com/img_c/wmts", "img"),
        ImageAnnotationChinese2000 => online("http://t0.tianditu.com/cia_c/wmts", "cia"),
        ImageAnnotationEnglish2000 => online("http://t0.tianditu.com/eia_c/wmts", "eia"),
        Terrain2000 => online("http://t0.tianditu.com/ter_c/wmts", "ter"),
        TerrainAnnotationChinese2000 => online("http://t0.tianditu.com/cta_c/wmts", "cta"),
        // Folder names are what deployed servers already have on disk.
        Image2000Offline => offline(Location::Local("Maps/TianDiTu_Img"), BASE_SUFFIX),
        ImageAnnotationChinese2000Offline => offline(
            Location::Local("Maps/TianDiTu_Img_Annotatoin"),
            ANNOTATION_SUFFIX,
        ),
        Vector2000Offline => offline(Location::Local("Maps/TianDiTu_Vec"), BASE_SUFFIX),
        VectorAnnotationChinese2000Offline => offline(
            Location::Local("Maps/TianDiTu_Vec_Annotatoin"),
            ANNOTATION_SUFFIX,
        ),
        Terrain2000Offline => offline(Location::Local("Maps/TianDiTu_Ter"), BASE_SUFFIX),
        // Still bound to the live endpoint, so the offline guard refuses it.
        // Kept that way until an offline terrain label set is published
        // under Maps/TianDiTu_Ter_Annotatoin.
        TerrainAnnotationChinese2000Offline => offline(
            Location::Remote("http://t0.tianditu.com/cta_c/wmts"),
            ANNOTATION_SUFFIX,
        ),
    }
}

/// Resolves layer types to descriptors.
///
/// Holds only the host root used for offline storage; all other data is
/// static, so the catalog is cheap to clone and share across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerCatalog {
    host_root: String,
}

impl LayerCatalog {
    /// Create a catalog whose offline layers live under `host_root`
    /// (e.g. `http://gis.example.com/`).
    pub fn new(host_root: impl Into<String>) -> Self {
        Self {
            host_root: host_root.into(),
        }
    }

    pub fn host_root(&self) -> &str {
        &self.host_root
    }

    /// Build the descriptor for a layer type.
    pub fn resolve(&self, layer_type: LayerType) -> LayerDescriptor {
        let entry = entry(layer_type);
        let base_location = match entry.location {
            Location::Remote(url) => url.to_string(),
            Location::Local(subpath) => {
                format!("{}/{}", self.host_root.trim_end_matches('/'), subpath)
            }
        };

        debug!(
            layer = %layer_type,
            base = %base_location,
            "Built layer descriptor"
        );

        LayerDescriptor::from_family(base_location, entry.source, layer_type.datum().family())
    }

    /// Build the descriptor for an integer layer code.
    ///
    /// Unknown codes are an error rather than an empty descriptor.
    pub fn resolve_code(&self, code: i32) -> TileResult<LayerDescriptor> {
        let layer_type = LayerType::try_from(code)?;
        Ok(self.resolve(layer_type))
    }

    /// Descriptors for every layer type, ordered by code.
    pub fn all(&self) -> Vec<(LayerType, LayerDescriptor)> {
        LayerType::ALL
            .iter()
            .map(|&lt| (lt, self.resolve(lt)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_common::TileError;

    fn catalog() -> LayerCatalog {
        LayerCatalog::new("http://gis.example.com/")
    }

    #[test]
    fn test_family_tables() {
        assert_eq!(CGCS2000_FAMILY.resolutions.len(), 15);
        assert_eq!(WEB_MERCATOR_FAMILY.resolutions.len(), 17);

        // Each level halves the previous resolution.
        for family in [&CGCS2000_FAMILY, &WEB_MERCATOR_FAMILY] {
            for pair in family.resolutions.windows(2) {
                let ratio = pair[0] / pair[1];
                assert!((ratio - 2.0).abs() < 1e-6, "ratio {ratio}");
            }
        }
    }

    #[test]
    fn test_image_2000_descriptor() {
        let d = catalog().resolve(LayerType::Image2000);
        assert_eq!(d.base_location, "http://t0.tianditu.com/img_c/wmts");
        assert_eq!(d.source, TileSource::Online { service_layer: "img" });
        assert_eq!(d.tile_matrix_set, "c");
        assert_eq!(d.spatial_reference.wkid(), 4490);
        assert_eq!(d.extent, BoundingBox::new(-180.0, -90.0, 180.0, 90.0));
        assert_eq!(d.origin, MapPoint::new(-180.0, 90.0));
        assert_eq!((d.tile_width, d.tile_height), (256, 256));
        assert_eq!((d.min_zoom, d.max_zoom), (0, 16));
        assert_eq!(d.dpi, 96);
        assert_eq!(d.scales.len(), 18);
    }

    #[test]
    fn test_mercator_descriptor() {
        let d = catalog().resolve(LayerType::TerrainAnnotationChineseMercator);
        assert_eq!(d.base_location, "http://t0.tianditu.com/cta_w/wmts");
        assert_eq!(d.layer_name(), "cta");
        assert_eq!(d.tile_matrix_set, "w");
        assert_eq!(d.spatial_reference, SpatialReference::WEB_MERCATOR);
        assert_eq!(d.origin.x, -20037508.3427892);
        assert_eq!(d.extent.max_y, 20037508.3427892);
        assert_eq!(d.resolutions.len(), 17);
    }

    #[test]
    fn test_family_tables_are_shared() {
        let cat = catalog();
        let a = cat.resolve(LayerType::Vector2000);
        let b = cat.resolve(LayerType::Terrain2000Offline);
        assert!(std::ptr::eq(a.resolutions, b.resolutions));

        let c = cat.resolve(LayerType::ImageMercator);
        assert!(!std::ptr::eq(a.resolutions, c.resolutions));
    }

    #[test]
    fn test_offline_root() {
        let d = catalog().resolve(LayerType::Vector2000Offline);
        assert_eq!(d.base_location, "http://gis.example.com/Maps/TianDiTu_Vec");
        assert_eq!(d.source, TileSource::Offline { file_suffix: ".jpg" });

        let d = LayerCatalog::new("http://gis.example.com")
            .resolve(LayerType::ImageAnnotationChinese2000Offline);
        assert_eq!(
            d.base_location,
            "http://gis.example.com/Maps/TianDiTu_Img_Annotatoin"
        );
        assert_eq!(d.layer_name(), ".png");
    }

    #[test]
    fn test_resolve_code() {
        let d = catalog().resolve_code(11).unwrap();
        assert_eq!(d.layer_name(), "img");

        let err = catalog().resolve_code(22).unwrap_err();
        assert!(matches!(err, TileError::UnrecognizedLayerType(22)));
    }

    #[test]
    fn test_default_descriptor_is_empty() {
        let d = LayerDescriptor::default();
        assert!(d.base_location.is_empty());
        assert_eq!(d.layer_name(), "");
        assert_eq!(d.spatial_reference.wkid(), 0);
        assert!(d.resolutions.is_empty());
        assert!(d.tile_info().lods.is_empty());
    }

    #[test]
    fn test_tile_info_matches_resolutions() {
        let d = catalog().resolve(LayerType::ImageMercator);
        let info = d.tile_info();
        assert_eq!(info.lods.len(), d.resolutions.len());
        assert_eq!(info.origin, d.origin);
        assert_eq!(info.extent, d.extent);
        assert_eq!(info.grid_size(0), Some((4, 4)));
        assert_eq!(info.lods[16].resolution, 0.597165477819866);
    }

    #[test]
    fn test_with_zoom_range() {
        let d = catalog().resolve(LayerType::Vector2000).with_zoom_range(3, 10);
        assert!(!d.accepts_level(2));
        assert!(d.accepts_level(3));
        assert!(d.accepts_level(10));
        assert!(!d.accepts_level(11));
    }
}
