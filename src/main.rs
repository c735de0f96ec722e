use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use school_mapper::config::Config;
use school_mapper::constants::{GRADE_FIELD, RATING_FIELD, TUITION_FIELD};
use school_mapper::geo::GeoPoint;
use school_mapper::observability::init_logging;
use school_mapper::pipeline::processing::{format_grade_range, format_tuition, GradeTier};
use school_mapper::pipeline::{EnrichResult, Pipeline, SimplifyResult};

#[derive(Parser)]
#[command(name = "school_mapper")]
#[command(about = "Prepare private school GeoJSON for the map")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a config.toml (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce the full schools file to the display fields
    Simplify,
    /// Join grades, ratings, tuition and type onto the simplified file
    Enrich,
    /// Run simplify and then enrich
    Run,
    /// List schools near a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Search radius in miles
        #[arg(long)]
        radius: Option<f64>,
        /// Maximum number of schools to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// GeoJSON file to search (defaults to the enriched file)
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn print_simplify(result: &SimplifyResult) {
    println!("\n📊 Simplify Results:");
    println!("   Input: {}", result.input_path.display());
    println!("   Output: {}", result.output_path.display());
    println!("   Features: {}", result.outcome.output_features);
    if let Some(size) = &result.size {
        println!("   Original size: {:.2} MB", size.original_mb());
        println!("   Simplified size: {:.2} MB", size.simplified_mb());
        println!(
            "   Reduced by: {:.2} MB ({:.1}%)",
            size.reduction_mb(),
            size.reduction_percent()
        );
    }
}

fn print_enrich(result: &EnrichResult) {
    let stats = &result.outcome.stats;
    println!("\n📊 Enrich Results:");
    println!("   CSV rows: {}", result.outcome.rows_read);
    println!("   Schools in lookup: {}", result.outcome.lookup_records);
    println!("   Skipped rows: {}", result.outcome.skipped_rows);
    println!("   Exact matches: {}", stats.exact_matches);
    println!("   Proximity matches: {}", stats.proximity_matches);
    println!("   Not matched: {}", stats.unmatched);
    println!("   Output file: {}", result.output_path.display());
    if let Some(backup) = &result.backup_path {
        println!("   Backup: {}", backup.display());
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Simplify => {
            println!("🔄 Simplifying school data...");
            let result = Pipeline::simplify(&config)?;
            print_simplify(&result);
        }
        Commands::Enrich => {
            println!("🔨 Enriching school data...");
            let result = Pipeline::enrich(&config)?;
            print_enrich(&result);
        }
        Commands::Run => {
            println!("🚀 Running full pipeline (simplify + enrich)...");

            println!("\n📥 Step 1: Simplifying...");
            let simplified = Pipeline::simplify(&config)?;
            print_simplify(&simplified);

            println!("\n🔨 Step 2: Enriching...");
            let enriched = Pipeline::enrich(&config)?;
            print_enrich(&enriched);

            println!("\n✅ Full pipeline completed successfully!");
        }
        Commands::Nearby {
            lat,
            lon,
            radius,
            limit,
            input,
        } => {
            let reference = GeoPoint::new(lat, lon);
            let hits = Pipeline::nearby(&config, input.as_deref(), &[reference], radius)?;
            let radius = radius.unwrap_or(config.nearby.radius_miles);

            println!("\n📍 {} schools within {} miles of {}, {}", hits.len(), radius, lat, lon);
            for hit in hits.iter().take(limit) {
                let grades = format_grade_range(
                    &hit.feature.property_text("st_grade"),
                    &hit.feature.property_text("end_grade"),
                );
                let tier = GradeTier::from_grade(&hit.feature.property_text(GRADE_FIELD));
                println!(
                    "   {:>6.2} mi  {}  [{}]  {}",
                    hit.distance_miles,
                    hit.feature.name(),
                    grades,
                    tier.as_str()
                );
                let rating = hit.feature.property_text(RATING_FIELD);
                if !rating.is_empty() {
                    println!("             Great Schools Rating: {}", rating);
                }
                println!(
                    "             Tuition: {}",
                    format_tuition(&hit.feature.property_text(TUITION_FIELD))
                );
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let _guard = init_logging();

    let cli = Cli::parse();
    info!("school_mapper starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run failed: {:#}", e);
            println!("❌ Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
