use clap::Parser;
use lidar_mcc::store::io::{write_json_file, write_xyz};
use lidar_mcc::synthetic::{generate, TerrainOptions};
use lidar_mcc::MccError;
use log::info;
use std::path::PathBuf;

/// Generate a synthetic terrain cloud with trees and buildings.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output XYZ file with all returns
    #[arg(short, long)]
    output: PathBuf,

    /// Also write `ground.xyz`, `objects.xyz` and `options.json` here
    #[arg(long)]
    truth_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 7)]
    seed: u64,

    #[arg(long, default_value_t = 60.0)]
    width: f64,

    #[arg(long, default_value_t = 50.0)]
    height: f64,

    /// Terrain sample spacing (m)
    #[arg(long, default_value_t = 1.0)]
    spacing: f64,

    #[arg(long, default_value_t = 8)]
    trees: usize,

    #[arg(long, default_value_t = 1)]
    buildings: usize,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), MccError> {
    let args = Args::parse();
    let opts = TerrainOptions {
        width: args.width,
        height: args.height,
        spacing: args.spacing,
        trees: args.trees,
        buildings: args.buildings,
        seed: args.seed,
        ..TerrainOptions::default()
    };
    let cloud = generate(&opts);
    info!(
        "generated {} returns: ground={} objects={}",
        cloud.count(),
        cloud.ground.count(),
        cloud.objects.count()
    );

    if let Some(dir) = &args.truth_dir {
        write_xyz(&dir.join("ground.xyz"), &cloud.ground)?;
        write_xyz(&dir.join("objects.xyz"), &cloud.objects)?;
        write_json_file(&dir.join("options.json"), &opts)?;
        println!("Ground truth written to {}", dir.display());
    }
    let all = cloud.into_point_set();
    write_xyz(&args.output, &all)?;
    println!("{} points written to {}", all.count(), args.output.display());
    Ok(())
}
