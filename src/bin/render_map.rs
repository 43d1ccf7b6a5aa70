//! Headless map renderer: draws one viewport of a seeded world to PNG.
//!
//! Usage: cargo run --release --bin render_map -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   Map config JSON (default: built-in defaults)
//!   --seed <SEED>     Override the world seed
//!   --x <TILES>       Camera center x (default: world center)
//!   --y <TILES>       Camera center y (default: world center)
//!   --zoom <Z>        Pixels per tile (default: config default zoom)
//!   --width <PX>      Image width (default: config screen width)
//!   --height <PX>     Image height (default: config screen height)
//!   --out <PATH>      Output file (default: map.png)
//!   --stats           Print map statistics as JSON after rendering

use std::path::PathBuf;

use hexworld::core::{logging, Error, Result};
use hexworld::map::{MapConfig, MapManager, RenderOutcome};
use hexworld::render::ImageSurface;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => MapConfig::load(&PathBuf::from(path))?,
        None => MapConfig::default(),
    };
    if let Some(seed) = parse_arg::<u32>(&args, "--seed") {
        config.world.seed = seed;
    }
    let center_x = parse_arg::<f32>(&args, "--x").unwrap_or(config.world.width as f32 * 0.5);
    let center_y = parse_arg::<f32>(&args, "--y").unwrap_or(config.world.height as f32 * 0.5);
    let zoom = parse_arg::<f32>(&args, "--zoom").unwrap_or(config.viewport.default_zoom);
    let width = parse_arg::<u32>(&args, "--width").unwrap_or(config.viewport.screen_width);
    let height = parse_arg::<u32>(&args, "--height").unwrap_or(config.viewport.screen_height);
    let out = parse_str_arg(&args, "--out").map_or_else(|| PathBuf::from("map.png"), PathBuf::from);
    let print_stats = args.iter().any(|a| a == "--stats");

    // One frame, so never throttle it
    config.viewport.min_frame_interval_ms = 0;

    println!("=== Hexworld Renderer ===");
    println!("World:  {} x {} tiles, seed {}", config.world.width, config.world.height, config.world.seed);
    println!("Camera: ({}, {}) zoom {}", center_x, center_y, zoom);
    println!("Image:  {} x {} -> {}", width, height, out.display());

    let mut map = MapManager::new(config, ImageSurface::new(width, height))?;
    map.initialize(center_x, center_y).await?;

    let report = match map.move_to(center_x, center_y, zoom).await? {
        RenderOutcome::Drawn(report) => report,
        other => return Err(Error::Runtime(format!("frame not drawn: {:?}", other))),
    };

    println!(
        "Frame:  {} high / {} medium / {} low chunks, {} culled, {} primitives in {:.1}ms",
        report.tiers.high,
        report.tiers.medium,
        report.tiers.low,
        report.tiers.culled,
        report.primitives,
        report.draw_time.as_secs_f64() * 1000.0
    );
    if report.fallback {
        log::warn!("Frame was drawn with the fallback renderer");
    }

    if print_stats {
        println!("{}", serde_json::to_string_pretty(&map.get_stats())?);
    }

    map.surface().save_png(&out)?;
    println!("Saved {}", out.display());
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
