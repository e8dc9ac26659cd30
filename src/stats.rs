//! Performance statistics collection for `--stats` output.

use std::time::{Duration, Instant};

/// Collects lookup counters and phase timings.
///
/// Created when `--stats` is passed, threaded as `Option<&mut Stats>`.
/// Nothing is timed or counted when `None`.
pub struct Stats {
    total_start: Instant,
    phases: Vec<(&'static str, Duration)>,
    // Grid interpolation
    pub grid_points: usize,
    // Cross lookup
    pub sweep_rows: u32,
    pub rows_failed: u32,
    pub curve_points: usize,
    // Interpolant fits (cross rows and inversion)
    pub interpolants_built: u32,
    // Inversion
    pub operating_points: usize,
    pub extrapolated_targets: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            total_start: Instant::now(),
            phases: Vec::new(),
            grid_points: 0,
            sweep_rows: 0,
            rows_failed: 0,
            curve_points: 0,
            interpolants_built: 0,
            operating_points: 0,
            extrapolated_targets: 0,
        }
    }

    /// Record a completed phase with its duration.
    pub fn add_phase(&mut self, name: &'static str, duration: Duration) {
        self.phases.push((name, duration));
    }

    pub fn phases(&self) -> &[(&'static str, Duration)] {
        &self.phases
    }

    /// Print the stats table to stderr.
    pub fn display(&self) {
        let total = self.total_start.elapsed();
        eprintln!();
        eprintln!("=== gmid-lookup Stats ===");

        for (name, dur) in &self.phases {
            eprintln!("  {:<24} {:>8.3}s", name, dur.as_secs_f64());
        }

        if self.grid_points > 0 {
            eprintln!("  Grid points:            {}", self.grid_points);
        }

        if self.sweep_rows > 0 {
            eprintln!(
                "  Sweep rows:             {}  failed={}",
                self.sweep_rows, self.rows_failed
            );
            let avg = self.curve_points as f64 / self.sweep_rows as f64;
            eprintln!("    Curve points avg:     {:.1}", avg);
        }

        if self.operating_points > 0 {
            eprintln!("  Operating points:       {}", self.operating_points);
            eprintln!("    Extrapolated targets: {}", self.extrapolated_targets);
        }

        eprintln!("  ─────────────────────────────────");
        eprintln!("  Total:                  {:>8.3}s", total.as_secs_f64());
        eprintln!("  Interpolants built:     {}", self.interpolants_built);
    }
}
