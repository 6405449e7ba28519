use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use interaction_clusters::config::{Config, Mode};
use interaction_clusters::data::{self, InputFormat};
use interaction_clusters::{pipeline, storage};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    InMemory,
    Iterative,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Text,
    Parquet,
}

#[derive(Parser, Debug)]
#[clap(
    name = "interaction-clusters",
    about = "Cluster bipartite interaction data with controlled duplication"
)]
struct Cli {
    /// Path to input interactions
    #[clap(long)]
    input: PathBuf,

    /// Input encoding
    #[clap(long, value_enum, default_value = "text")]
    format: FormatArg,

    /// Parquet column holding side A ids
    #[clap(long, default_value = "a_id")]
    a_column: String,

    /// Parquet column holding side B ids
    #[clap(long, default_value = "b_id")]
    b_column: String,

    /// JSON configuration file; flags below override it
    #[clap(long)]
    config: Option<PathBuf>,

    /// Clustering mode
    #[clap(long, value_enum)]
    mode: Option<ModeArg>,

    /// Label propagation rounds (iterative mode)
    #[clap(long)]
    iterations: Option<usize>,

    /// Duplication threshold ratio in (0, 1]
    #[clap(long)]
    threshold: Option<f64>,

    /// Stop propagation early once labels no longer change
    #[clap(long)]
    stop_when_stable: bool,

    /// Output directory for results
    #[clap(long, default_value = "cluster_results")]
    output_dir: PathBuf,

    /// Directory for per-round snapshot files (default: <output-dir>/snapshots)
    #[clap(long)]
    work_dir: Option<PathBuf>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    /// File configuration with command line overrides applied
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = match mode {
                ModeArg::InMemory => Mode::InMemory,
                ModeArg::Iterative => Mode::Iterative,
            };
        }
        if let Some(iterations) = self.iterations {
            config.num_iterations = iterations;
        }
        if let Some(threshold) = self.threshold {
            config.duplication_threshold_ratio = threshold;
        }
        if self.stop_when_stable {
            config.stop_when_stable = true;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Configuration errors are fatal before any input is read
    let config = args.resolve_config()?;

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting interaction clustering ({:?} mode)", config.mode);
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output_dir.display());

    let format = match args.format {
        FormatArg::Text => InputFormat::Text,
        FormatArg::Parquet => InputFormat::Parquet,
    };

    // 1. Load interactions
    let loaded = data::load_interactions(&args.input, format, &args.a_column, &args.b_column)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let index = loaded.index;

    log::info!(
        "Indexed {} entities and {} distinct interactions (~{} bytes)",
        index.node_count(),
        index.interaction_count(),
        index.memory_usage()
    );

    // 2. Cluster
    let work_dir = args
        .work_dir
        .clone()
        .unwrap_or_else(|| args.output_dir.join("snapshots"));
    let clusters = pipeline::run(&index, &config, &work_dir).context("clustering failed")?;

    log::info!("Found {} clusters", clusters.len());

    // 3. Save results
    storage::save_results(&clusters, &index, &config, &args.output_dir)
        .context("failed to save results")?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}
