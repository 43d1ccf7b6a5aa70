//! World generator binary: generates a block of chunks in parallel and
//! reports what the terrain looks like.
//!
//! Usage: cargo run --release --bin generate_world -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>      Map config JSON (default: built-in defaults)
//!   --seed <SEED>        Override the world seed
//!   --origin-x <TILES>   Left edge of the block (default: 0)
//!   --origin-y <TILES>   Top edge of the block (default: 0)
//!   --chunks-x <N>       Block width in chunks (default: 10)
//!   --chunks-y <N>       Block height in chunks (default: 5)
//!   --jobs <N>           Parallel chunk builds (default: 4)
//!   --report <PATH>      Also write the histograms as JSON

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde_json::json;

use hexworld::core::{logging, Error, Result};
use hexworld::map::MapConfig;
use hexworld::streaming::{world_to_chunk, Chunk, ChunkCoord};
use hexworld::terrain::{Resource, Terrain, TerrainGenerator};

/// Totals gathered from one generated chunk
#[derive(Default)]
struct Histogram {
    terrain: [usize; Terrain::ALL.len()],
    resources: BTreeMap<Resource, usize>,
    rivers: usize,
    tiles: usize,
}

impl Histogram {
    fn from_chunk(chunk: &Chunk) -> Self {
        let mut hist = Self::default();
        for tile in chunk.tiles() {
            hist.terrain[tile.terrain.index()] += 1;
            if let Some(resource) = tile.resource {
                *hist.resources.entry(resource).or_insert(0) += 1;
            }
            hist.rivers += tile.has_river as usize;
        }
        hist.tiles = chunk.tile_count();
        hist
    }

    fn merge(mut self, other: Self) -> Self {
        for (total, n) in self.terrain.iter_mut().zip(other.terrain) {
            *total += n;
        }
        for (resource, n) in other.resources {
            *self.resources.entry(resource).or_insert(0) += n;
        }
        self.rivers += other.rivers;
        self.tiles += other.tiles;
        self
    }
}

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => MapConfig::load(&PathBuf::from(path))?,
        None => MapConfig::default(),
    };
    if let Some(seed) = parse_arg::<u32>(&args, "--seed") {
        config.world.seed = seed;
    }
    let origin_x = parse_arg::<i32>(&args, "--origin-x").unwrap_or(0);
    let origin_y = parse_arg::<i32>(&args, "--origin-y").unwrap_or(0);
    let chunks_x = parse_arg::<i32>(&args, "--chunks-x").unwrap_or(10);
    let chunks_y = parse_arg::<i32>(&args, "--chunks-y").unwrap_or(5);
    let jobs = parse_arg::<usize>(&args, "--jobs").unwrap_or(4);
    let report_path = parse_str_arg(&args, "--report").map(PathBuf::from);
    config.validate()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .map_err(|e| Error::Runtime(format!("failed to configure thread pool: {}", e)))?;

    let world = config.world.bounds();
    let chunk_size = config.streaming.chunk_size;
    let generator = TerrainGenerator::new(config.world.terrain_params());

    println!("=== Hexworld Generator ===");
    println!("World: {} x {} tiles", world.width, world.height);
    println!("Seed:  {}", config.world.seed);
    println!("Block: {} x {} chunks of {} tiles from ({}, {})", chunks_x, chunks_y, chunk_size, origin_x, origin_y);
    println!("Jobs:  {} parallel", jobs);
    println!();

    let first = world_to_chunk(origin_x, origin_y, chunk_size);
    let coords: Vec<(ChunkCoord, _)> = (first.y..first.y + chunks_y.max(0))
        .flat_map(|cy| (first.x..first.x + chunks_x.max(0)).map(move |cx| ChunkCoord::new(cx, cy)))
        .filter_map(|coord| world.chunk_extent(coord, chunk_size).map(|extent| (coord, extent)))
        .collect();

    let total = coords.len();
    if total == 0 {
        return Err(Error::Config("requested block lies outside the world".into()));
    }

    let start = Instant::now();
    let generated = AtomicUsize::new(0);

    let histogram = coords
        .par_iter()
        .map(|&(coord, extent)| -> Result<Histogram> {
            let chunk = Chunk::generate(coord, extent, &generator)
                .map_err(|e| Error::Runtime(format!("chunk {}: {}", coord, e)))?;

            let done = generated.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 50 == 0 || done == total {
                let elapsed = start.elapsed().as_secs_f64();
                let rate = done as f64 / elapsed;
                let remaining = (total - done) as f64 / rate;
                eprintln!("  [{}/{}] {:.0} chunks/sec, ~{:.0}s remaining", done, total, rate, remaining);
            }
            Ok(Histogram::from_chunk(&chunk))
        })
        .try_reduce(Histogram::default, |a, b| Ok(a.merge(b)))?;

    let elapsed = start.elapsed();
    println!();
    println!(
        "Generated {} chunks ({} tiles) in {:.2}s ({:.0} tiles/sec)",
        total,
        histogram.tiles,
        elapsed.as_secs_f64(),
        histogram.tiles as f64 / elapsed.as_secs_f64()
    );

    println!();
    println!("Terrain:");
    let percent = |n: usize| n as f64 * 100.0 / histogram.tiles.max(1) as f64;
    for terrain in Terrain::ALL {
        let n = histogram.terrain[terrain.index()];
        if n > 0 {
            println!("  {:<16} {:>9} {:>6.2}%", format!("{:?}", terrain), n, percent(n));
        }
    }

    println!();
    println!("Resources:");
    for (resource, n) in &histogram.resources {
        println!("  {:<16} {:>9}", format!("{:?}", resource), n);
    }
    println!("Rivers: {} tiles ({:.2}%)", histogram.rivers, percent(histogram.rivers));

    if let Some(path) = report_path {
        let report = json!({
            "seed": config.world.seed,
            "chunk_size": chunk_size,
            "chunks": total,
            "tiles": histogram.tiles,
            "elapsed_secs": elapsed.as_secs_f64(),
            "terrain": Terrain::ALL
                .iter()
                .map(|t| (format!("{:?}", t), histogram.terrain[t.index()]))
                .collect::<BTreeMap<_, _>>(),
            "resources": histogram
                .resources
                .iter()
                .map(|(r, n)| (format!("{:?}", r), *n))
                .collect::<BTreeMap<_, _>>(),
            "rivers": histogram.rivers,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        println!();
        println!("Report: {}", path.display());
    }
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
