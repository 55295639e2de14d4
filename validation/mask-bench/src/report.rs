//! Benchmark result reporting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use serde::Serialize;

/// Parameters of the synthetic world used for a run.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSummary {
    pub width: usize,
    pub height: usize,
    pub block: usize,
    pub tile_size: usize,
    pub cache_tiles: usize,
}

/// One benchmark run at a fixed thread count.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Requested thread count (0 = host auto-detection).
    pub requested_threads: usize,
    pub elapsed_ms: f64,
    pub points_per_sec: f64,
    pub water_points: usize,
}

/// Tile cache counters from a sequential pass over the full query grid.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSummary {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

/// Full benchmark report.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub timestamp: DateTime<Utc>,
    pub world: WorldSummary,
    pub points: usize,
    pub runs: Vec<RunResult>,
    pub cache: CacheSummary,
}

impl BenchReport {
    pub fn format_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec![
            "threads",
            "elapsed (ms)",
            "points/s",
            "water points",
        ]);

        for run in &self.runs {
            let threads = if run.requested_threads == 0 {
                "auto".to_string()
            } else {
                run.requested_threads.to_string()
            };
            table.add_row(vec![
                Cell::new(threads),
                Cell::new(format!("{:.1}", run.elapsed_ms)),
                Cell::new(format!("{:.0}", run.points_per_sec)),
                Cell::new(run.water_points),
            ]);
        }

        format!(
            "World: {}x{} px, block {}, tile {}, cache {} tiles\n\
             Points: {}\n\
             {}\n\
             Sequential cache: {} hits, {} misses, {} evictions, {} resident tiles",
            self.world.width,
            self.world.height,
            self.world.block,
            self.world.tile_size,
            self.world.cache_tiles,
            self.points,
            table,
            self.cache.hits,
            self.cache.misses,
            self.cache.evictions,
            self.cache.entries,
        )
    }
}
