use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use cnc_maps::map::{DecodeOptions, EngineVariant, MapDocument};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "map-info")]
#[command(about = "Decode a Red Alert 2 / Yuri's Revenge map and print a summary")]
struct Args {
    /// Map file (.map, .mpr, .yrm, .mmx, .yro)
    path: PathBuf,

    #[arg(long, value_enum, default_value_t = EngineArg::Auto)]
    engine: EngineArg,

    /// Newline-separated type keys that exist in Red Alert 2
    #[arg(long)]
    allow_list: Option<PathBuf>,

    /// Also list every object with its cell
    #[arg(long)]
    objects: bool,

    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum EngineArg {
    Auto,
    Ra2,
    Yr,
}

impl From<EngineArg> for EngineVariant {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Auto => EngineVariant::Unspecified,
            EngineArg::Ra2 => EngineVariant::Legacy,
            EngineArg::Yr => EngineVariant::Expansion,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut options = DecodeOptions::new().with_engine(args.engine.into());
    if let Some(list) = &args.allow_list {
        let text = std::fs::read_to_string(list)?;
        let names = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with(';'))
            .map(str::to_string);
        options = options.with_legacy_allow_list(names);
    }

    let doc = MapDocument::open(&args.path, &options)?;
    let summary = doc.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("file:       {}", args.path.display());
        if let Some(name) = &summary.name {
            println!("name:       {}", name);
        }
        println!("theater:    {}", summary.theater);
        println!("engine:     {}", summary.engine);
        println!(
            "size:       {}x{} (local {},{} {}x{})",
            summary.full_size.width,
            summary.full_size.height,
            summary.local_size.x,
            summary.local_size.y,
            summary.local_size.width,
            summary.local_size.height,
        );
        println!(
            "tiles:      {} (max tile {})",
            summary.tiles,
            summary.max_tile_num.map_or_else(|| "-".to_string(), |n| n.to_string()),
        );
        let o = &summary.objects;
        println!("structures: {}", o.structures);
        println!("infantry:   {}", o.infantry);
        println!("units:      {}", o.units);
        println!("aircraft:   {}", o.aircraft);
        println!("terrain:    {}", o.terrain);
        println!("smudge:     {}", o.smudge);
        println!("overlays:   {}", o.overlays);
    }

    if args.objects {
        for tile in doc.grid().tiles() {
            for &id in tile.objects() {
                let Some(obj) = doc.object(id) else { continue };
                let owner = obj.owned().map(|o| o.owner.as_str()).unwrap_or("");
                println!(
                    "{:>4},{:<4} {:<9} {:<12} {}",
                    tile.rx,
                    tile.ry,
                    obj.kind(),
                    obj.name().unwrap_or("-"),
                    owner
                );
            }
        }
    }

    Ok(())
}
