//! Benchmarking and experimentation module.
//!
//! Runs several algorithms over the same randomly generated instances,
//! stage by stage, and compares their profit and running time against the
//! first algorithm of each stage.

use crate::error::Result;
use crate::instance::{DeliveryInstance, GeneratorConfig};
use crate::solver::SolverKind;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

/// Result of running a single algorithm on one generated instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Stage label
    pub stage: String,
    /// Algorithm name
    pub algorithm: String,
    /// Round index within the stage
    pub round: usize,
    /// Seed the instance was generated from
    pub seed: u64,
    pub num_tasks: usize,
    pub capacity: f64,
    /// Number of tasks picked
    pub selected: usize,
    pub profit: f64,
    pub weight: f64,
    pub length: f64,
    /// Computation time in seconds
    pub time: f64,
}

/// Aggregated statistics for one algorithm within one stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub stage: String,
    pub algorithm: String,
    pub rounds: usize,
    pub total_profit: f64,
    pub avg_profit: f64,
    /// Sample standard deviation of profit; zero with fewer than two rounds
    pub std_profit: f64,
    pub best_profit: f64,
    pub worst_profit: f64,
    pub total_time: f64,
    pub avg_time: f64,
    /// Total profit relative to the stage baseline
    pub profit_ratio: Option<f64>,
    /// Baseline total time divided by this algorithm's total time
    pub speedup: Option<f64>,
}

/// One group of rounds sharing an instance size, capacity and algorithm list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub label: String,
    pub task_count: usize,
    pub capacity: f64,
    /// Algorithms to run; the first one is the baseline for ratios
    pub solvers: Vec<SolverKind>,
}

impl StageConfig {
    pub fn new(label: &str, task_count: usize, capacity: f64, solvers: Vec<SolverKind>) -> Self {
        StageConfig {
            label: label.to_string(),
            task_count,
            capacity,
            solvers,
        }
    }

    /// Exact solver against everything, on instances it can still finish.
    pub fn exact_limits() -> Self {
        Self::new("exact", 8, 250.0, SolverKind::all().to_vec())
    }

    /// Subset enumeration against the streaming heuristics.
    pub fn subset_limits() -> Self {
        Self::new(
            "subset-mst",
            16,
            250.0,
            vec![
                SolverKind::SubsetMst,
                SolverKind::StreamingRatio,
                SolverKind::StreamingRatioSpread,
            ],
        )
    }

    /// The two streaming heuristics on large instances.
    pub fn streaming() -> Self {
        Self::new(
            "streaming",
            250,
            2000.0,
            vec![SolverKind::StreamingRatio, SolverKind::StreamingRatioSpread],
        )
    }
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Instances generated per stage
    pub rounds: usize,
    /// Seed of the first round; round `r` uses `seed + r`
    pub seed: u64,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
    pub stages: Vec<StageConfig>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            rounds: 10,
            seed: 0,
            show_progress: true,
            stages: vec![
                StageConfig::exact_limits(),
                StageConfig::subset_limits(),
                StageConfig::streaming(),
            ],
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Run every configured stage
    pub fn run(&mut self) {
        let stages = self.config.stages.clone();
        for stage in &stages {
            self.run_stage(stage);
        }
    }

    /// Run all rounds of a single stage
    pub fn run_stage(&mut self, stage: &StageConfig) {
        log::info!(
            "Running stage '{}': {} rounds, n={}, W={}",
            stage.label,
            self.config.rounds,
            stage.task_count,
            stage.capacity
        );

        let progress = self.progress_bar(stage);
        for round in 0..self.config.rounds {
            let seed = self.config.seed + round as u64;
            let generator = GeneratorConfig {
                count: stage.task_count,
                seed,
                ..Default::default()
            };
            let instance = DeliveryInstance::generate(&generator, stage.capacity);

            for kind in &stage.solvers {
                // Every algorithm starts from a cold distance cache.
                instance.distances.clear();
                self.run_solver(stage, round, seed, &instance, *kind);
            }
            progress.inc(1);
        }
        progress.finish_and_clear();
    }

    fn run_solver(
        &mut self,
        stage: &StageConfig,
        round: usize,
        seed: u64,
        instance: &DeliveryInstance,
        kind: SolverKind,
    ) {
        let solver = kind.build();
        let start = Instant::now();
        let path = solver.solve(instance);
        let time = start.elapsed().as_secs_f64();

        log::debug!(
            "{} round {}: {} -> {}",
            stage.label,
            round,
            solver.name(),
            path
        );

        self.results.push(AlgorithmResult {
            stage: stage.label.clone(),
            algorithm: solver.name().to_string(),
            round,
            seed,
            num_tasks: instance.len(),
            capacity: instance.capacity,
            selected: path.len(),
            profit: path.profit(),
            weight: path.weight(),
            length: path.length(),
            time,
        });
    }

    fn progress_bar(&self, stage: &StageConfig) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(self.config.rounds as u64);
        bar.set_style(
            ProgressStyle::with_template("{prefix:>12} [{bar:40}] {pos}/{len} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_prefix(stage.label.clone());
        bar
    }

    /// Compute statistics per stage and algorithm, in configuration order
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut statistics = Vec::new();

        for stage in &self.config.stages {
            let mut baseline: Option<(f64, f64)> = None;

            for kind in &stage.solvers {
                let results: Vec<&AlgorithmResult> = self
                    .results
                    .iter()
                    .filter(|r| r.stage == stage.label && r.algorithm == kind.name())
                    .collect();
                if results.is_empty() {
                    continue;
                }

                let profits: Vec<f64> = results.iter().map(|r| r.profit).collect();
                let times: Vec<f64> = results.iter().map(|r| r.time).collect();

                let total_profit: f64 = profits.iter().sum();
                let total_time: f64 = times.iter().sum();
                let std_profit = if profits.len() > 1 {
                    profits.iter().std_dev()
                } else {
                    0.0
                };
                let best_profit = profits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let worst_profit = profits.iter().cloned().fold(f64::INFINITY, f64::min);

                let (base_profit, base_time) = *baseline.get_or_insert((total_profit, total_time));
                let profit_ratio = (base_profit != 0.0).then(|| total_profit / base_profit);
                let speedup = (total_time > 0.0).then(|| base_time / total_time);

                statistics.push(AlgorithmStatistics {
                    stage: stage.label.clone(),
                    algorithm: kind.name().to_string(),
                    rounds: results.len(),
                    total_profit,
                    avg_profit: profits.iter().mean(),
                    std_profit,
                    best_profit,
                    worst_profit,
                    total_time,
                    avg_time: times.iter().mean(),
                    profit_ratio,
                    speedup,
                });
            }
        }

        statistics
    }

    /// Export per-round results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("     Delivery Selection Benchmark\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        report.push_str(&format!(
            "Rounds per stage: {}, base seed: {}\n\n",
            self.config.rounds, self.config.seed
        ));

        let stats = self.compute_statistics();

        for stage in &self.config.stages {
            report.push_str(&format!(
                "Stage '{}' (n={}, W={}):\n",
                stage.label, stage.task_count, stage.capacity
            ));
            report.push_str("-".repeat(86).as_str());
            report.push('\n');
            report.push_str(&format!(
                "{:<22} {:>12} {:>10} {:>12} {:>10} {:>8} {:>8}\n",
                "Algorithm", "Total", "Avg", "Std", "Time (s)", "Profit%", "Speedup"
            ));
            report.push_str("-".repeat(86).as_str());
            report.push('\n');

            for stat in stats.iter().filter(|s| s.stage == stage.label) {
                let ratio = stat
                    .profit_ratio
                    .map(|r| format!("{:.1}%", r * 100.0))
                    .unwrap_or_else(|| "-".to_string());
                let speedup = stat
                    .speedup
                    .map(|s| format!("{:.1}x", s))
                    .unwrap_or_else(|| "-".to_string());

                report.push_str(&format!(
                    "{:<22} {:>12.2} {:>10.2} {:>12.2} {:>10.4} {:>8} {:>8}\n",
                    stat.algorithm,
                    stat.total_profit,
                    stat.avg_profit,
                    stat.std_profit,
                    stat.total_time,
                    ratio,
                    speedup
                ));
            }
            report.push('\n');
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }
}
