//! Rendering command results as text or JSON.

use anyhow::Result;
use serde::Serialize;
use tianditu::{
    Annotation, Content, Datum, LayerDescriptor, LayerType, ParsedTileUrl, TileAddress, Unresolved,
};
use tile_common::{TileCoord, TileInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
pub struct LayerSummary {
    pub code: i32,
    pub name: &'static str,
    pub content: Content,
    pub annotation: Annotation,
    pub datum: Datum,
    pub offline: bool,
}

impl From<LayerType> for LayerSummary {
    fn from(lt: LayerType) -> Self {
        Self {
            code: lt.code(),
            name: lt.name(),
            content: lt.content(),
            annotation: lt.annotation(),
            datum: lt.datum(),
            offline: lt.is_offline(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Description<'a> {
    pub layer: LayerSummary,
    pub descriptor: &'a LayerDescriptor,
    pub tile_info: TileInfo,
}

/// One resolved (or unresolved) tile.
#[derive(Debug, Serialize)]
pub struct TileReport {
    pub layer: &'static str,
    pub tile: TileCoord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<TileAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<Unresolved>,
}

impl TileReport {
    pub fn new(layer: LayerType, tile: TileCoord, result: Result<TileAddress, Unresolved>) -> Self {
        let (address, unresolved) = match result {
            Ok(addr) => (Some(addr), None),
            Err(reason) => (None, Some(reason)),
        };
        Self {
            layer: layer.name(),
            tile,
            address,
            unresolved,
        }
    }
}

pub fn print_layers(format: OutputFormat) -> Result<()> {
    let layers: Vec<LayerSummary> = LayerType::ALL.into_iter().map(LayerSummary::from).collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&layers)?),
        OutputFormat::Text => {
            println!("{:>4}  {:<14} {:<8} {:<8} {:<12} {}", "CODE", "NAME", "CONTENT", "LABELS", "DATUM", "SOURCE");
            for l in &layers {
                println!(
                    "{:>4}  {:<14} {:<8} {:<8} {:<12} {}",
                    l.code,
                    l.name,
                    format!("{:?}", l.content).to_lowercase(),
                    format!("{:?}", l.annotation).to_lowercase(),
                    format!("{:?}", l.datum).to_lowercase(),
                    if l.offline { "offline" } else { "online" }
                );
            }
        }
    }
    Ok(())
}

pub fn print_description(format: OutputFormat, description: &Description<'_>) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(description)?),
        OutputFormat::Text => {
            let d = description.descriptor;
            println!("layer:           {} ({})", description.layer.name, description.layer.code);
            println!("base location:   {}", d.base_location);
            println!("layer name:      {}", d.layer_name());
            println!("tile matrix set: {}", d.tile_matrix_set);
            println!("spatial ref:     {}", d.spatial_reference);
            println!(
                "extent:          {}, {}, {}, {}",
                d.extent.min_x, d.extent.min_y, d.extent.max_x, d.extent.max_y
            );
            println!("origin:          {}, {}", d.origin.x, d.origin.y);
            println!("tile size:       {}x{}", d.tile_width, d.tile_height);
            println!("zoom range:      {}..={}", d.min_zoom, d.max_zoom);
            println!("levels:");
            for lod in &description.tile_info.lods {
                println!("  {:>2}  {}", lod.level, lod.resolution);
            }
        }
    }
    Ok(())
}

pub fn print_tile(format: OutputFormat, report: &TileReport) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        OutputFormat::Text => match (&report.address, &report.unresolved) {
            (Some(addr), _) => println!("{}", addr),
            (None, Some(reason)) => eprintln!("tile {} unavailable: {}", report.tile.cache_key(), reason),
            (None, None) => {}
        },
    }
    Ok(())
}

pub fn print_parsed(format: OutputFormat, parsed: &ParsedTileUrl, tile: Option<TileCoord>) -> Result<()> {
    match format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Decoded<'a> {
                #[serde(flatten)]
                parsed: &'a ParsedTileUrl,
                tile: Option<TileCoord>,
            }
            println!("{}", serde_json::to_string_pretty(&Decoded { parsed, tile })?);
        }
        OutputFormat::Text => {
            let r = &parsed.request;
            println!("base:          {}", parsed.base);
            println!("layer:         {}", r.layer);
            println!("tilematrixset: {}", r.tile_matrix_set);
            println!("tilematrix:    {}", r.tile_matrix);
            println!("tilerow:       {}", r.tile_row);
            println!("tilecol:       {}", r.tile_col);
            if let Some(tile) = tile {
                println!("level:         {}", tile.level);
            }
        }
    }
    Ok(())
}
