//! Command-line front end: classify a stored point collection into ground
//! and non-ground collections.

use clap::Parser;
use lidar_mcc::config::{load_config, resolve_region, ParamOverrides, RunConfig};
use lidar_mcc::filter::SurfaceOutlierFilter;
use lidar_mcc::store::io::write_json_file;
use lidar_mcc::store::DirectoryStore;
use lidar_mcc::{MccError, MultiscaleClassifier, RunRequest};
use std::path::PathBuf;

/// Multiscale curvature classification of LiDAR returns.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input point collection
    #[arg(short, long)]
    input: String,

    /// Output collection for ground returns
    #[arg(short = 'g', long = "g-output")]
    ground_output: String,

    /// Output collection for non-ground returns
    #[arg(short = 'x', long = "ng-output")]
    nonground_output: String,

    /// Directory holding the `<name>.xyz` collections
    #[arg(short = 'd', long)]
    store_dir: Option<PathBuf>,

    /// Number of scale domains
    #[arg(long)]
    nl: Option<usize>,

    /// Curvature tolerance of the first scale domain
    #[arg(short = 't', long = "tolerance")]
    curvature_tolerance: Option<f64>,

    /// Convergence threshold (percentage / 100)
    #[arg(short = 'j', long = "convergence")]
    convergence_threshold: Option<f64>,

    /// Surface tension
    #[arg(short = 'f', long)]
    tension: Option<f64>,

    /// Spline steps multiplier
    #[arg(short = 's', long)]
    spline_steps: Option<f64>,

    /// Filter negative outliers instead of positive ones
    #[arg(short = 'n', long)]
    negative: bool,

    /// East-west base resolution (estimated from the input when absent)
    #[arg(long)]
    ewres: Option<f64>,

    /// North-south base resolution (estimated from the input when absent)
    #[arg(long)]
    nsres: Option<f64>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the classification report as JSON
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Replace existing output collections
    #[arg(long)]
    overwrite: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors; no summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), MccError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RunConfig::default(),
    };
    let overrides = ParamOverrides {
        scale_domains: args.nl,
        curvature_tolerance: args.curvature_tolerance,
        convergence_threshold: args.convergence_threshold,
        tension: args.tension,
        spline_steps: args.spline_steps,
        negative: args.negative,
    };
    let params = overrides.resolve(&config.params);
    let classifier =
        MultiscaleClassifier::new(params, SurfaceOutlierFilter::new(config.surface.clone()))?;

    let store_dir = args
        .store_dir
        .or(config.store_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut store = DirectoryStore::open(store_dir)?;
    if let Some(region) = resolve_region(args.ewres, args.nsres, config.region) {
        store = store.with_region(region);
    }

    let request = RunRequest::new(args.input, args.ground_output, args.nonground_output)
        .with_overwrite(args.overwrite);
    let report = classifier.run(&mut store, &request)?;

    if !args.quiet {
        report.print_text_summary();
    }
    if let Some(path) = args.report.or(config.report_json) {
        write_json_file(&path, &report)?;
        if !args.quiet {
            println!("\nJSON report written to {}", path.display());
        }
    }
    Ok(())
}
