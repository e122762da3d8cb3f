//! Tianditu tile address resolver.
//!
//! Resolves layer descriptors and tile addresses from the command line:
//! - Lists the layer catalog
//! - Describes a layer's spatial metadata and levels of detail
//! - Prints the URL or offline path of a tile, a point, or a bbox
//! - Decodes a WMTS tile URL back into its tile coordinate

mod config;
mod output;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use config::{LogFormat, ResolverConfig};
use output::{Description, OutputFormat, TileReport};
use tianditu::{LayerCatalog, LayerType, ParsedTileUrl, TileAddressResolver};
use tile_common::{BoundingBox, TileCoord, TileError};

#[derive(Parser, Debug)]
#[command(name = "tile-resolver")]
#[command(about = "Resolve Tianditu layer metadata and tile addresses")]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, env = "TILE_RESOLVER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Host application URL; offline tiles live under its root
    #[arg(long, global = true)]
    host_base_url: Option<String>,

    /// Log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Largest number of tiles `range` will resolve
    #[arg(long, global = true)]
    max_range_tiles: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every layer type
    List,

    /// Show a layer's descriptor and levels of detail
    Describe {
        /// Layer name (e.g. img-c) or integer code
        #[arg(short, long)]
        layer: LayerType,
    },

    /// Print the address of one tile
    Url {
        #[arg(short, long)]
        layer: LayerType,

        #[arg(short = 'z', long)]
        level: u32,

        #[arg(short, long)]
        row: u32,

        #[arg(short, long)]
        col: u32,
    },

    /// Find the tile containing a map point and print its address
    Locate {
        #[arg(short, long)]
        layer: LayerType,

        #[arg(short = 'z', long)]
        level: u32,

        #[arg(short, long, allow_hyphen_values = true)]
        x: f64,

        #[arg(short, long, allow_hyphen_values = true)]
        y: f64,
    },

    /// Print the address of every tile covering a bbox
    Range {
        #[arg(short, long)]
        layer: LayerType,

        #[arg(short = 'z', long)]
        level: u32,

        /// minx,miny,maxx,maxy in the layer's coordinate system
        #[arg(short, long, allow_hyphen_values = true)]
        bbox: String,
    },

    /// Decode a WMTS GetTile URL
    Decode {
        #[arg(short, long)]
        url: String,
    },
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = ResolverConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.host_base_url {
        config.host_base_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.to_lowercase();
    }
    if let Some(max) = cli.max_range_tiles {
        config.max_range_tiles = max;
    }
    config.validate()?;

    init_tracing(&config)?;
    debug!(?config, "Loaded configuration");

    let catalog = LayerCatalog::new(config.host_root()?);
    let resolver = TileAddressResolver::new(catalog);

    let format = cli.output;
    let result = run(cli.command, format, &config, &resolver);

    if let (Err(err), OutputFormat::Json) = (&result, format) {
        if let Some(tile_err) = err.downcast_ref::<TileError>() {
            println!(
                "{}",
                serde_json::json!({ "error": tile_err.code(), "message": tile_err.to_string() })
            );
        }
    }

    result
}

fn init_tracing(config: &ResolverConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // stderr keeps stdout clean for piping addresses.
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| anyhow!("Failed to initialize tracing: {}", e))
}

fn run(
    command: Commands,
    format: OutputFormat,
    config: &ResolverConfig,
    resolver: &TileAddressResolver,
) -> Result<()> {
    match command {
        Commands::List => output::print_layers(format),

        Commands::Describe { layer } => {
            let descriptor = resolver.catalog().resolve(layer);
            let description = Description {
                layer: layer.into(),
                tile_info: descriptor.tile_info(),
                descriptor: &descriptor,
            };
            output::print_description(format, &description)
        }

        Commands::Url {
            layer,
            level,
            row,
            col,
        } => {
            let tile = TileCoord::new(level, row, col);
            let report = TileReport::new(layer, tile, resolver.resolve(layer, tile));
            output::print_tile(format, &report)
        }

        Commands::Locate { layer, level, x, y } => {
            let descriptor = resolver.catalog().resolve(layer);
            let tile = descriptor.tile_info().tile_at(level, x, y).ok_or_else(|| {
                TileError::InvalidParameter {
                    param: "level/x/y".to_string(),
                    message: format!(
                        "no tile of {} at level {} contains ({}, {})",
                        layer, level, x, y
                    ),
                }
            })?;

            let result = TileAddressResolver::address_for(&descriptor, tile);
            output::print_tile(format, &TileReport::new(layer, tile, result))
        }

        Commands::Range { layer, level, bbox } => {
            let bbox = BoundingBox::parse(&bbox).map_err(TileError::from)?;
            let descriptor = resolver.catalog().resolve(layer);
            let range = descriptor.tile_info().tile_range(level, &bbox).ok_or_else(|| {
                TileError::InvalidBbox(format!(
                    "bbox does not overlap the {} tile grid at level {}",
                    layer, level
                ))
            })?;
            config.check_range(&range)?;

            info!(layer = %layer, level, tiles = range.len(), "Resolving tile range");

            for (tile, result) in resolver.resolve_range(layer, &range) {
                output::print_tile(format, &TileReport::new(layer, tile, result))?;
            }
            Ok(())
        }

        Commands::Decode { url } => {
            let parsed = ParsedTileUrl::parse(&url)?;
            let tile = parsed.request.to_tile_coord().ok();
            output::print_parsed(format, &parsed, tile)
        }
    }
}
