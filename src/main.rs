//! Command-line front end: load a position dump, answer nearest-vehicle
//! queries from a text file, print results and per-stage timings.

use clap::Parser;
use fleetgrid::{
    Config, DuplicateFilter, FleetError, Location, Nearest, build_index, decode_stream,
    find_nearest, resolve_duplicates,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "fleetgrid", about = "Find the nearest vehicle to each query point", version)]
struct Cli {
    /// Binary vehicle position dump
    db: PathBuf,

    /// Query file: one `<index> <latitude> <longitude>` triple per line
    queries: PathBuf,

    /// Keep one sample per vehicle: none, latest, or oldest
    #[arg(long)]
    filter: Option<DuplicateFilter>,

    /// Grid cell edge length in coordinate units
    #[arg(long)]
    block_size: Option<f32>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> fleetgrid::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Config::from_json(&json).map_err(|e| FleetError::InvalidInput(e.to_string()))?
        }
        None => Config::default(),
    };

    if let Some(filter) = cli.filter {
        config.duplicate_filter = filter;
    }
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }
    config.validate().map_err(FleetError::InvalidInput)?;

    Ok(config)
}

fn run(cli: Cli) -> fleetgrid::Result<()> {
    let config = load_config(&cli)?;
    println!("Using block size of {}", config.block_size);

    let load_start = Instant::now();
    let db_file = File::open(&cli.db)?;
    let (vehicles, report) = decode_stream(db_file, config.chunk_size)?;
    println!(
        "Loaded {} entries. {} duplicates (repeated registration, different location/time).",
        report.vehicles, report.duplicates
    );
    if report.truncated_records > 0 {
        eprintln!(
            "warning: dropped {} truncated trailing record(s) ({} bytes)",
            report.truncated_records, report.truncated_bytes
        );
    }
    println!("Data loaded in: {:.3?}", load_start.elapsed());

    let build_start = Instant::now();
    let vehicles = resolve_duplicates(vehicles, config.duplicate_filter);
    let index = build_index(&vehicles, config.block_size)?;
    println!("Indexed data in: {:.3?}", build_start.elapsed());

    let query_file = BufReader::new(File::open(&cli.queries)?);
    let search_start = Instant::now();
    for (line_number, line) in query_file.lines().enumerate() {
        let line = line?;
        let Some((query_index, location)) = parse_query_line(&line) else {
            if !line.trim().is_empty() {
                log::warn!("skipping malformed query line {}: {line:?}", line_number + 1);
            }
            continue;
        };

        println!(
            "\nSearching ({query_index}) {}, {}",
            location.latitude, location.longitude
        );
        match find_nearest(&index, location) {
            Ok(nearest) => print_nearest(&nearest),
            Err(e @ (FleetError::VehicleNotFound | FleetError::InvalidCoordinate(..))) => {
                println!("{e}")
            }
            Err(e) => return Err(e),
        }
    }

    println!("\nFinished search in: {:.3?}", search_start.elapsed());
    Ok(())
}

/// Parse one `<index> <latitude> <longitude>` query line.
fn parse_query_line(line: &str) -> Option<(i64, Location)> {
    let mut fields = line.split_whitespace();
    let query_index = fields.next()?.parse().ok()?;
    let latitude = fields.next()?.parse().ok()?;
    let longitude = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((query_index, Location::new(latitude, longitude)))
}

fn print_nearest(nearest: &Nearest<'_>) {
    println!("Found:");
    println!("Reg: '{}'", nearest.vehicle.registration);
    for sample in &nearest.vehicle.samples {
        println!(
            "\tID: {}\tlat: {}\tlong: {}\ttime: {}",
            sample.id,
            sample.location.latitude,
            sample.location.longitude,
            sample.recorded_time_utc
        );
    }
}
