//! Benchmark and determinism validation CLI for the water mask engine.
//!
//! Builds a synthetic checkerboard world in memory, runs batch
//! classification over a lon/lat grid at a list of thread counts, and
//! reports throughput plus tile cache behavior.

mod report;

use std::time::Instant;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use water_mask::raster::memory::MemoryRaster;
use water_mask::{testdata, MaskConfig, WaterMask};

use report::{BenchReport, CacheSummary, RunResult, WorldSummary};

#[derive(Parser)]
#[command(name = "mask-bench")]
#[command(about = "Benchmark and validation tool for the water mask engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct WorldArgs {
    /// Synthetic raster width in pixels
    #[arg(long, default_value = "4096")]
    width: usize,

    /// Synthetic raster height in pixels
    #[arg(long, default_value = "2048")]
    height: usize,

    /// Checkerboard block edge in pixels
    #[arg(long, default_value = "64")]
    block: usize,

    /// Tile edge in pixels
    #[arg(long, default_value = "256")]
    tile_size: usize,

    /// Maximum tiles per worker cache
    #[arg(long, default_value = "4096")]
    cache_tiles: usize,

    /// Query grid step in degrees
    #[arg(long, default_value = "0.5")]
    step: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark batch classification at a list of thread counts
    Bench {
        #[command(flatten)]
        world: WorldArgs,

        /// Thread counts to run (0 = host auto-detection)
        #[arg(short, long, value_delimiter = ',', default_value = "1,2,4,0")]
        threads: Vec<usize>,

        /// Output format: table (default), json
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Verify that results are independent of the thread count
    Verify {
        #[command(flatten)]
        world: WorldArgs,

        /// Thread counts to compare against the single-threaded run
        #[arg(short, long, value_delimiter = ',', default_value = "2,4,8,0")]
        threads: Vec<usize>,
    },
}

/// Lon/lat query grid covering the world, strictly inside the raster.
fn build_query_grid(step: f64) -> (Vec<f64>, Vec<f64>) {
    let mut lons = Vec::new();
    let mut lats = Vec::new();
    let mut lat = -90.0 + step / 2.0;
    while lat < 90.0 {
        let mut lon = -180.0 + step / 2.0;
        while lon < 180.0 {
            lons.push(lon);
            lats.push(lat);
            lon += step;
        }
        lat += step;
    }
    (lons, lats)
}

fn open_world(world: &WorldArgs) -> Result<(WaterMask<MemoryRaster>, std::path::PathBuf)> {
    if world.step <= 0.0 {
        bail!("step must be > 0");
    }

    info!(
        width = world.width,
        height = world.height,
        block = world.block,
        "building synthetic world raster"
    );
    let path = testdata::register_world_checkerboard(world.width, world.height, world.block);

    let config = MaskConfig::default()
        .with_tile_size(world.tile_size)
        .with_max_cache_tiles(world.cache_tiles);
    let mask = WaterMask::<MemoryRaster>::open(&[&path], config)?;
    Ok((mask, path))
}

fn run_bench(world: WorldArgs, threads: Vec<usize>, output: String) -> Result<()> {
    let (mask, path) = open_world(&world)?;
    let (lons, lats) = build_query_grid(world.step);

    let mut report = BenchReport {
        timestamp: Utc::now(),
        world: WorldSummary {
            width: world.width,
            height: world.height,
            block: world.block,
            tile_size: world.tile_size,
            cache_tiles: world.cache_tiles,
        },
        points: lons.len(),
        runs: Vec::new(),
        cache: CacheSummary {
            hits: 0,
            misses: 0,
            evictions: 0,
            entries: 0,
        },
    };

    for &requested in &threads {
        let start = Instant::now();
        let results = mask.classify_batch(&lons, &lats, requested)?;
        let elapsed = start.elapsed();

        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        report.runs.push(RunResult {
            requested_threads: requested,
            elapsed_ms,
            points_per_sec: lons.len() as f64 / elapsed.as_secs_f64(),
            water_points: results.iter().filter(|&&water| water).count(),
        });
        info!(requested, elapsed_ms, "run complete");
    }

    // Untimed sequential pass to observe tile cache behavior.
    let mut caches = mask.cache_set()?;
    for (&lon, &lat) in lons.iter().zip(&lats) {
        mask.classify(lon, lat, &mut caches)?;
    }
    let stats = caches.stats()[0];
    report.cache = CacheSummary {
        hits: stats.hits,
        misses: stats.misses,
        evictions: stats.evictions,
        entries: stats.entries,
    };

    match output.as_str() {
        "json" => println!("{}", report.format_json()?),
        _ => println!("{}", report.format_table()),
    }

    MemoryRaster::unregister(&path);
    Ok(())
}

fn run_verify(world: WorldArgs, threads: Vec<usize>) -> Result<()> {
    let (mask, path) = open_world(&world)?;
    let (lons, lats) = build_query_grid(world.step);

    println!("Classifying {} points single-threaded (reference)", lons.len());
    let reference = mask.classify_batch(&lons, &lats, 1)?;

    for &requested in &threads {
        let results = mask.classify_batch(&lons, &lats, requested)?;
        if results != reference {
            let first_diff = results
                .iter()
                .zip(&reference)
                .position(|(got, want)| got != want);
            bail!(
                "results diverge at threads={} (first difference at index {:?})",
                requested,
                first_diff
            );
        }
        println!("✓ threads={requested}: identical to reference");
    }

    println!("All runs deterministic across thread counts");
    MemoryRaster::unregister(&path);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Bench {
            world,
            threads,
            output,
        } => run_bench(world, threads, output),
        Commands::Verify { world, threads } => run_verify(world, threads),
    }
}
