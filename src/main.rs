//! Delivery selection - Command Line Interface
//!
//! Picks which delivery tasks to carry under a capacity limit and in which
//! order to visit them.

use clap::{Parser, Subcommand, ValueEnum};
use delivery_mkp::benchmark::{Benchmark, BenchmarkConfig, StageConfig};
use delivery_mkp::exact::BruteForceSolver;
use delivery_mkp::heuristics::{
    RatioSpreadConfig, StreamingRatioHeuristic, StreamingRatioSpreadHeuristic, StepRecord,
    SubsetMstHeuristic,
};
use delivery_mkp::instance::{DeliveryInstance, GeneratorConfig};
use delivery_mkp::path::DeliveryPath;
use delivery_mkp::routing;
use delivery_mkp::solver::{DeliverySolver, SolverKind};
use delivery_mkp::visualization::Visualizer;
use delivery_mkp::Result;

use env_logger::Env;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "delivery-mkp")]
#[command(version = "1.0")]
#[command(about = "Select and route delivery tasks under a capacity limit")]
struct Cli {
    /// Log progress at info level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance file or a freshly generated instance
    Solve {
        /// JSON instance file; a random instance is generated when omitted
        #[arg(short, long)]
        instance: Option<PathBuf>,

        /// Number of tasks to generate
        #[arg(short = 'n', long, default_value = "50")]
        count: usize,

        /// Random seed for generation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Capacity; overrides the file's capacity when given
        #[arg(short, long)]
        capacity: Option<f64>,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "ratio-spread")]
        algorithm: Algorithm,

        /// Outlier pruning only runs above this many admitted tasks
        #[arg(long, default_value = "0")]
        prune_floor: usize,

        /// Print the per-step trace of the streaming heuristics
        #[arg(long)]
        trace: bool,

        /// Print a JSON summary instead of the text report
        #[arg(long)]
        json: bool,

        /// Write an SVG picture of the chosen path
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Generate a random instance and save it as JSON
    Generate {
        #[arg(short = 'n', long, default_value = "50")]
        count: usize,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        #[arg(short, long, default_value = "250")]
        capacity: f64,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print statistics about an instance
    Analyze {
        #[arg(short, long)]
        instance: PathBuf,
    },

    /// Compare the algorithms on random instances, stage by stage
    Compare {
        /// Instances generated per stage
        #[arg(short, long, default_value = "10")]
        rounds: usize,

        /// Seed of the first round
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Only run the stage with this label (exact, subset-mst, streaming)
        #[arg(long)]
        stage: Option<String>,

        /// Per-round results CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Per-algorithm statistics CSV
        #[arg(long)]
        stats_output: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Every subset, every ordering (small instances only)
    BruteForce,
    /// Every subset, spanning-tree ordering
    SubsetMst,
    /// Streaming value-density selection
    Ratio,
    /// Streaming value-density selection with outlier pruning
    RatioSpread,
}

impl From<Algorithm> for SolverKind {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::BruteForce => SolverKind::BruteForce,
            Algorithm::SubsetMst => SolverKind::SubsetMst,
            Algorithm::Ratio => SolverKind::StreamingRatio,
            Algorithm::RatioSpread => SolverKind::StreamingRatioSpread,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let outcome = match cli.command {
        Commands::Solve {
            instance,
            count,
            seed,
            capacity,
            algorithm,
            prune_floor,
            trace,
            json,
            svg,
        } => {
            let options = SolveOptions {
                algorithm,
                prune_floor,
                trace,
                json,
                svg,
            };
            load_or_generate(instance.as_deref(), count, seed, capacity)
                .and_then(|inst| solve_instance(&inst, &options))
        }

        Commands::Generate {
            count,
            seed,
            capacity,
            output,
        } => generate_instance(count, seed, capacity, &output),

        Commands::Analyze { instance } => analyze_instance(&instance),

        Commands::Compare {
            rounds,
            seed,
            stage,
            output,
            stats_output,
            no_progress,
        } => compare_algorithms(
            rounds,
            seed,
            stage.as_deref(),
            output.as_deref(),
            stats_output.as_deref(),
            !no_progress,
        ),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct SolveOptions {
    algorithm: Algorithm,
    prune_floor: usize,
    trace: bool,
    json: bool,
    svg: Option<PathBuf>,
}

fn load_or_generate(
    path: Option<&Path>,
    count: usize,
    seed: u64,
    capacity: Option<f64>,
) -> Result<DeliveryInstance> {
    let mut instance = match path {
        Some(path) => {
            log::info!("Loading instance from {:?}", path);
            DeliveryInstance::from_file(path)?
        }
        None => {
            let config = GeneratorConfig {
                count,
                seed,
                ..Default::default()
            };
            DeliveryInstance::generate(&config, capacity.unwrap_or(250.0))
        }
    };

    if let Some(capacity) = capacity {
        instance.capacity = capacity;
        instance.validate()?;
    }
    Ok(instance)
}

fn solve_instance(instance: &DeliveryInstance, options: &SolveOptions) -> Result<()> {
    log::info!(
        "Solving '{}' (n={}, W={}) with {:?}",
        instance.name,
        instance.len(),
        instance.capacity,
        options.algorithm
    );

    let start = Instant::now();
    let (path, steps) = run_algorithm(instance, options);
    let elapsed = start.elapsed().as_secs_f64();
    let name = SolverKind::from(options.algorithm).name();

    if options.json {
        let summary = path.summary(name, elapsed);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("========== Results ==========");
        println!("Algorithm: {}", name);
        println!("Instance: {} ({} tasks, capacity {})", instance.name, instance.len(), instance.capacity);
        print!("{}", path);
        println!("Time: {:.4}s", elapsed);
    }

    if options.trace {
        print_trace(&steps);
    }

    if let Some(svg_path) = &options.svg {
        let viz = Visualizer::new();
        let svg = viz.generate_svg(instance, &path);
        viz.save_svg(&svg, svg_path)?;
        log::info!("Visualization saved to {:?}", svg_path);
    }

    Ok(())
}

fn run_algorithm<'a>(
    instance: &'a DeliveryInstance,
    options: &SolveOptions,
) -> (DeliveryPath<'a>, Vec<StepRecord>) {
    match options.algorithm {
        Algorithm::BruteForce => {
            let result = BruteForceSolver::new().solve_with_stats(instance);
            log::info!(
                "Exact search: {} feasible subsets, {} infeasible, {} orderings",
                result.feasible_subsets,
                result.infeasible_subsets,
                result.permutations
            );
            (result.path, Vec::new())
        }
        Algorithm::SubsetMst => (SubsetMstHeuristic::new().solve(instance), Vec::new()),
        Algorithm::Ratio => {
            let outcome = StreamingRatioHeuristic::new().run(instance);
            (outcome.best, outcome.steps)
        }
        Algorithm::RatioSpread => {
            let config = RatioSpreadConfig {
                prune_floor: options.prune_floor,
            };
            let outcome = StreamingRatioSpreadHeuristic::with_config(config).run(instance);
            (outcome.best, outcome.steps)
        }
    }
}

fn print_trace(steps: &[StepRecord]) {
    if steps.is_empty() {
        println!("\n(no per-step trace for this algorithm)");
        return;
    }
    println!("\n{:>6} {:>8} {:>10} {:>12} {:>12} {:>7}", "Step", "Admitted", "Weight", "Candidate", "Best", "Pruned");
    for step in steps {
        println!(
            "{:>6} {:>8} {:>10.1} {:>12.3} {:>12.3} {:>7}",
            step.processed,
            step.admitted,
            step.admitted_weight,
            step.candidate_profit,
            step.best_profit,
            step.pruned
        );
    }
}

fn generate_instance(count: usize, seed: u64, capacity: f64, output: &Path) -> Result<()> {
    let config = GeneratorConfig {
        count,
        seed,
        ..Default::default()
    };
    let mut instance = DeliveryInstance::generate(&config, capacity);
    instance.validate()?;
    instance.name = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(instance.name);

    instance.save(output)?;
    println!("Saved {} tasks (seed {}) to {:?}", count, seed, output);
    Ok(())
}

fn analyze_instance(path: &Path) -> Result<()> {
    let instance = DeliveryInstance::from_file(path)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let all_tasks = routing::mst_weight(&instance.distances, &instance.tasks);
    println!("Spanning tree over all tasks: {:.3}", all_tasks);

    let quick = StreamingRatioSpreadHeuristic::new().solve(&instance);
    println!("\nQuick estimate (StreamingRatioSpread):");
    println!("  Profit: {:.2} with {} tasks, weight {:.1}", quick.profit(), quick.len(), quick.weight());
    Ok(())
}

fn compare_algorithms(
    rounds: usize,
    seed: u64,
    stage: Option<&str>,
    output: Option<&Path>,
    stats_output: Option<&Path>,
    show_progress: bool,
) -> Result<()> {
    let mut config = BenchmarkConfig {
        rounds,
        seed,
        show_progress,
        ..Default::default()
    };

    if let Some(label) = stage {
        config.stages.retain(|s: &StageConfig| s.label == label);
        if config.stages.is_empty() {
            return Err(delivery_mkp::Error::invalid_input(format!(
                "unknown stage '{}'",
                label
            )));
        }
    }

    let mut benchmark = Benchmark::new(config);
    benchmark.run();

    println!("{}", benchmark.generate_report());

    if let Some(path) = output {
        benchmark.export_to_csv(path)?;
        println!("Results exported to {:?}", path);
    }
    if let Some(path) = stats_output {
        benchmark.export_statistics_csv(path)?;
        println!("Statistics exported to {:?}", path);
    }
    Ok(())
}
