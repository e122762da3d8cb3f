//! The closed set of Tianditu layer types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tile_common::{TileError, TileResult};

/// Map content of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Vector,
    Image,
    Terrain,
}

/// Label overlay carried by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Annotation {
    /// Base map without labels
    None,
    Chinese,
    English,
}

/// Coordinate system family a layer is tiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Datum {
    /// CGCS2000 geographic grid, tile matrix set "c"
    Cgcs2000,
    /// Web Mercator grid, tile matrix set "w"
    WebMercator,
}

/// A Tianditu layer type.
///
/// Discriminants are the integer codes hosts use to select a layer. Not every
/// combination of content, annotation and datum exists: English labels have
/// no terrain or offline variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
#[repr(i32)]
pub enum LayerType {
    VectorMercator = 0,
    VectorAnnotationChineseMercator = 1,
    VectorAnnotationEnglishMercator = 2,
    ImageMercator = 3,
    ImageAnnotationChineseMercator = 4,
    ImageAnnotationEnglishMercator = 5,
    TerrainMercator = 6,
    TerrainAnnotationChineseMercator = 7,
    Vector2000 = 8,
    VectorAnnotationChinese2000 = 9,
    VectorAnnotationEnglish2000 = 10,
    Image2000 = 11,
    ImageAnnotationChinese2000 = 12,
    ImageAnnotationEnglish2000 = 13,
    Terrain2000 = 14,
    TerrainAnnotationChinese2000 = 15,
    Image2000Offline = 16,
    ImageAnnotationChinese2000Offline = 17,
    Vector2000Offline = 18,
    VectorAnnotationChinese2000Offline = 19,
    Terrain2000Offline = 20,
    TerrainAnnotationChinese2000Offline = 21,
}

impl LayerType {
    /// Every layer type, ordered by code.
    pub const ALL: [LayerType; 22] = [
        LayerType::VectorMercator,
        LayerType::VectorAnnotationChineseMercator,
        LayerType::VectorAnnotationEnglishMercator,
        LayerType::ImageMercator,
        LayerType::ImageAnnotationChineseMercator,
        LayerType::ImageAnnotationEnglishMercator,
        LayerType::TerrainMercator,
        LayerType::TerrainAnnotationChineseMercator,
        LayerType::Vector2000,
        LayerType::VectorAnnotationChinese2000,
        LayerType::VectorAnnotationEnglish2000,
        LayerType::Image2000,
        LayerType::ImageAnnotationChinese2000,
        LayerType::ImageAnnotationEnglish2000,
        LayerType::Terrain2000,
        LayerType::TerrainAnnotationChinese2000,
        LayerType::Image2000Offline,
        LayerType::ImageAnnotationChinese2000Offline,
        LayerType::Vector2000Offline,
        LayerType::VectorAnnotationChinese2000Offline,
        LayerType::Terrain2000Offline,
        LayerType::TerrainAnnotationChinese2000Offline,
    ];

    /// Look up a layer type by its integer code.
    pub fn from_code(code: i32) -> Option<LayerType> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx))
            .copied()
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn content(self) -> Content {
        use LayerType::*;
        match self {
            VectorMercator
            | VectorAnnotationChineseMercator
            | VectorAnnotationEnglishMercator
            | Vector2000
            | VectorAnnotationChinese2000
            | VectorAnnotationEnglish2000
            | Vector2000Offline
            | VectorAnnotationChinese2000Offline => Content::Vector,
            ImageMercator
            | ImageAnnotationChineseMercator
            | ImageAnnotationEnglishMercator
            | Image2000
            | ImageAnnotationChinese2000
            | ImageAnnotationEnglish2000
            | Image2000Offline
            | ImageAnnotationChinese2000Offline => Content::Image,
            TerrainMercator
            | TerrainAnnotationChineseMercator
            | Terrain2000
            | TerrainAnnotationChinese2000
            | Terrain2000Offline
            | TerrainAnnotationChinese2000Offline => Content::Terrain,
        }
    }

    pub fn annotation(self) -> Annotation {
        use LayerType::*;
        match self {
            VectorAnnotationChineseMercator
            | ImageAnnotationChineseMercator
            | TerrainAnnotationChineseMercator
            | VectorAnnotationChinese2000
            | ImageAnnotationChinese2000
            | TerrainAnnotationChinese2000
            | ImageAnnotationChinese2000Offline
            | VectorAnnotationChinese2000Offline
            | TerrainAnnotationChinese2000Offline => Annotation::Chinese,
            VectorAnnotationEnglishMercator
            | ImageAnnotationEnglishMercator
            | VectorAnnotationEnglish2000
            | ImageAnnotationEnglish2000 => Annotation::English,
            _ => Annotation::None,
        }
    }

    /// Mercator variants occupy codes 0-7; everything else, offline
    /// included, is on the national datum grid.
    pub fn datum(self) -> Datum {
        if self.code() < LayerType::Vector2000.code() {
            Datum::WebMercator
        } else {
            Datum::Cgcs2000
        }
    }

    pub fn is_offline(self) -> bool {
        self.code() >= LayerType::Image2000Offline.code()
    }

    /// Stable short name, e.g. `img-c` or `cva-c-offline`.
    pub fn name(self) -> &'static str {
        use LayerType::*;
        match self {
            VectorMercator => "vec-w",
            VectorAnnotationChineseMercator => "cva-w",
            VectorAnnotationEnglishMercator => "eva-w",
            ImageMercator => "img-w",
            ImageAnnotationChineseMercator => "cia-w",
            ImageAnnotationEnglishMercator => "eia-w",
            TerrainMercator => "ter-w",
            TerrainAnnotationChineseMercator => "cta-w",
            Vector2000 => "vec-c",
            VectorAnnotationChinese2000 => "cva-c",
            VectorAnnotationEnglish2000 => "eva-c",
            Image2000 => "img-c",
            ImageAnnotationChinese2000 => "cia-c",
            ImageAnnotationEnglish2000 => "eia-c",
            Terrain2000 => "ter-c",
            TerrainAnnotationChinese2000 => "cta-c",
            Image2000Offline => "img-c-offline",
            ImageAnnotationChinese2000Offline => "cia-c-offline",
            Vector2000Offline => "vec-c-offline",
            VectorAnnotationChinese2000Offline => "cva-c-offline",
            Terrain2000Offline => "ter-c-offline",
            TerrainAnnotationChinese2000Offline => "cta-c-offline",
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<LayerType> for &'static str {
    fn from(layer_type: LayerType) -> Self {
        layer_type.name()
    }
}

impl TryFrom<String> for LayerType {
    type Error = TileError;

    fn try_from(s: String) -> TileResult<Self> {
        s.parse()
    }
}

impl TryFrom<i32> for LayerType {
    type Error = TileError;

    fn try_from(code: i32) -> TileResult<Self> {
        LayerType::from_code(code).ok_or(TileError::UnrecognizedLayerType(code))
    }
}

impl FromStr for LayerType {
    type Err = TileError;

    /// Accepts either the short name (`img-c`) or the integer code (`11`).
    fn from_str(s: &str) -> TileResult<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return LayerType::try_from(code);
        }

        let lowered = s.to_ascii_lowercase();
        LayerType::ALL
            .iter()
            .copied()
            .find(|lt| lt.name() == lowered)
            .ok_or_else(|| TileError::UnknownLayerName(s.to_string()))
    }
}
