//! falsetrips CLI - run the false-trip analysis over a folder of driver trips
//!
//! Usage:
//!   falsetrips-cli run <input> <output> [--json <file>]
//!   falsetrips-cli features <input> --feature <name> [--output <file>]
//!   falsetrips-cli suspicions <input> --feature <name> --output <file>
//!   falsetrips-cli aggregate <files>... --output <file> [--json <file>]
//!
//! `run` does everything in one process. `suspicions` and `aggregate` split
//! the same work into per-feature jobs with intermediate files in between.

use clap::{Args, Parser, Subcommand};
use log::warn;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use falsetrips::{
    AnomalySet, Feature, FalseTripError, Pipeline, PipelineConfig, Result,
    codec::{encode_anomaly_set, encode_feature_record, parse_anomaly_set},
    load_trips,
};

#[derive(Parser)]
#[command(name = "falsetrips-cli")]
#[command(about = "Flag fabricated trips in per-driver GPS logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

/// Per-parameter overrides layered over the configuration file.
#[derive(Args, Default)]
struct ConfigOverrides {
    /// Trip IDs 1..=N reported per driver
    #[arg(long, global = true)]
    trips: Option<u32>,

    /// Velocity below which the vehicle counts as stopped
    #[arg(long, global = true)]
    stop_velocity: Option<f64>,

    /// Minimum seconds of acceleration for an event
    #[arg(long, global = true)]
    min_accel_secs: Option<u32>,

    /// Clustering passes per driver and feature
    #[arg(long, global = true)]
    iterations: Option<u32>,

    /// Summed suspicion weight that makes a trip false
    #[arg(long, global = true)]
    threshold: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all stages and write the final report
    Run {
        /// Folder with one sub-folder of trip files per driver
        input: PathBuf,

        /// Report file to write
        output: PathBuf,

        /// Also write the verdicts as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Print one feature's value for every trip
    Features {
        /// Folder with one sub-folder of trip files per driver
        input: PathBuf,

        /// Feature to extract (acceleration, duration, distance)
        #[arg(short, long)]
        feature: Feature,

        /// Write records here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract one feature and write each driver's weighted anomaly set
    Suspicions {
        /// Folder with one sub-folder of trip files per driver
        input: PathBuf,

        /// Feature to analyze (acceleration, duration, distance)
        #[arg(short, long)]
        feature: Feature,

        /// Anomaly-set file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Combine anomaly-set files into the final report
    Aggregate {
        /// Anomaly-set files written by `suspicions`
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Report file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the verdicts as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Write a synthetic fleet in the input folder layout
    #[cfg(feature = "synthetic")]
    Generate {
        /// Folder to create driver sub-folders in
        output: PathBuf,

        #[arg(long, default_value = "10")]
        drivers: usize,

        #[arg(long, default_value = "200")]
        trips_per_driver: u32,

        /// Foreign-profile trips per driver
        #[arg(long, default_value = "10")]
        injected: u32,

        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let config = build_config(cli.config.as_deref(), &cli.overrides)?;
    if cli.verbose {
        print_config(&config);
    }
    let pipeline = Pipeline::new(config);

    match cli.command {
        Commands::Run {
            input,
            output,
            json,
        } => run_all(&pipeline, &input, &output, json.as_deref()),
        Commands::Features {
            input,
            feature,
            output,
        } => run_features(&pipeline, &input, feature, output.as_deref()),
        Commands::Suspicions {
            input,
            feature,
            output,
        } => run_suspicions(&pipeline, &input, feature, &output),
        Commands::Aggregate {
            files,
            output,
            json,
        } => run_aggregate(&pipeline, &files, &output, json.as_deref()),
        #[cfg(feature = "synthetic")]
        Commands::Generate {
            output,
            drivers,
            trips_per_driver,
            injected,
            seed,
        } => run_generate(&output, drivers, trips_per_driver, injected, seed),
    }
}

/// Defaults, then the config file, then individual flags.
fn build_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(trips) = overrides.trips {
        config.trips_per_driver = trips;
    }
    if let Some(stop_velocity) = overrides.stop_velocity {
        config.stop_velocity = stop_velocity;
    }
    if let Some(min_secs) = overrides.min_accel_secs {
        config.min_acceleration_secs = min_secs;
    }
    if let Some(iterations) = overrides.iterations {
        config.clustering_iterations = iterations;
    }
    if let Some(threshold) = overrides.threshold {
        config.false_weight_threshold = threshold;
    }

    config.validate()?;
    Ok(config)
}

fn print_config(config: &PipelineConfig) {
    println!("\n[Config]");
    println!("  trips_per_driver: {}", config.trips_per_driver);
    println!("  stop_velocity: {}", config.stop_velocity);
    println!("  min_acceleration_secs: {}", config.min_acceleration_secs);
    println!("  clustering_iterations: {}", config.clustering_iterations);
    println!("  false_weight_threshold: {}", config.false_weight_threshold);
    println!(
        "  weights: acceleration={} duration={} distance={}",
        config.weights.acceleration, config.weights.duration, config.weights.distance
    );
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

/// Run every stage in process
fn run_all(pipeline: &Pipeline, input: &Path, output: &Path, json: Option<&Path>) -> Result<()> {
    banner("FALSE TRIP ANALYSIS");

    println!("\n[Step 1] Loading trips from {}...", input.display());
    let trips = load_trips(input)?;
    println!("  Loaded {} trips", trips.len());

    println!("\n[Step 2] Extracting features and clustering...");
    let report = pipeline.run(&trips);

    println!("\n[Step 3] Writing report...");
    report.write_to_path(output)?;
    if let Some(json) = json {
        report.write_json_to_path(json)?;
    }

    println!("\n{}", "-".repeat(60));
    println!(
        "RESULTS: {} drivers, {} of {} trips labelled false",
        report.drivers.len(),
        report.false_count(),
        report.trip_count()
    );
    println!("{}", "-".repeat(60));
    Ok(())
}

/// Dump feature records for inspection
fn run_features(
    pipeline: &Pipeline,
    input: &Path,
    feature: Feature,
    output: Option<&Path>,
) -> Result<()> {
    let trips = load_trips(input)?;
    let features = pipeline.extract_features(feature, &trips);

    let lines: Vec<String> = features
        .iter()
        .flat_map(|(driver_id, records)| {
            records
                .iter()
                .map(move |record| encode_feature_record(driver_id, record))
        })
        .collect();

    match output {
        Some(path) => write_lines(path, &lines),
        None => {
            for line in &lines {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

/// Stages 1 and 2 for one feature, persisted as anomaly-set lines
fn run_suspicions(pipeline: &Pipeline, input: &Path, feature: Feature, output: &Path) -> Result<()> {
    banner(&format!("SUSPICIONS: {}", feature));

    let trips = load_trips(input)?;
    let sets = pipeline.run_feature(feature, &trips);

    let lines: Vec<String> = sets.iter().map(encode_anomaly_set).collect();
    write_lines(output, &lines)?;

    let flagged: usize = sets.iter().map(|s| s.trip_ids.len()).sum();
    println!(
        "  {} drivers, {} suspected trips -> {}",
        sets.len(),
        flagged,
        output.display()
    );
    Ok(())
}

/// Stage 3 over anomaly-set files
fn run_aggregate(
    pipeline: &Pipeline,
    files: &[PathBuf],
    output: &Path,
    json: Option<&Path>,
) -> Result<()> {
    banner("AGGREGATE");

    let mut sets: Vec<AnomalySet> = Vec::new();
    for path in files {
        let contents = fs::read_to_string(path)
            .map_err(|e| FalseTripError::io("reading anomaly sets", path, e))?;

        let mut skipped = 0;
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            match parse_anomaly_set(line) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    warn!("[Aggregate] {}: {}", path.display(), e);
                    skipped += 1;
                }
            }
        }
        println!(
            "  [OK] {} ({} skipped lines)",
            path.display(),
            skipped
        );
    }

    let report = pipeline.aggregate(sets);
    report.write_to_path(output)?;
    if let Some(json) = json {
        report.write_json_to_path(json)?;
    }

    println!(
        "\nRESULTS: {} drivers, {} of {} trips labelled false",
        report.drivers.len(),
        report.false_count(),
        report.trip_count()
    );
    Ok(())
}

#[cfg(feature = "synthetic")]
fn run_generate(
    output: &Path,
    drivers: usize,
    trips_per_driver: u32,
    injected: u32,
    seed: u64,
) -> Result<()> {
    use falsetrips::synthetic::SyntheticFleet;

    let dataset = SyntheticFleet {
        driver_count: drivers,
        trips_per_driver,
        injected_per_driver: injected,
        seed,
    }
    .generate();
    dataset.write_to_dir(output)?;

    println!(
        "Wrote {} trips ({} injected) to {}",
        dataset.trips.len(),
        dataset.injected.len(),
        output.display()
    );
    Ok(())
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let file = File::create(path).map_err(|e| FalseTripError::io("creating output", path, e))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line).map_err(|e| FalseTripError::io("writing output", path, e))?;
    }
    writer
        .flush()
        .map_err(|e| FalseTripError::io("writing output", path, e))
}
