use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use velov_export::config::ExportConfig;
use velov_export::cyclocity::CyclocityClient;
use velov_export::export::{self, DEFAULT_EXPORT_PATH};
use velov_export::merge::{self, DEFAULT_MAP_PATH, MergeOptions};
use velov_export::stations::StationIndex;

/// Default log filter when RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "velov_export=info";

#[derive(Parser)]
#[command(author, version, about = "Export and map your Vélo'v trip history", long_about = None)]
struct Cli {
    /// Defaults to `export`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the trip history and save the raw JSON response
    Export {
        /// File to write the response to (overwritten)
        #[arg(short, long, default_value = DEFAULT_EXPORT_PATH)]
        output: PathBuf,
    },
    /// Convert exported trips to map format and merge them into one file
    Merge {
        /// Exported trip files, merged in order; the first copy of a trip wins
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Vélo'v stations GeoJSON (Métropole de Lyon open data)
        #[arg(long)]
        stations: PathBuf,
        /// Map file to write; an existing one is backed up first
        #[arg(short, long, default_value = DEFAULT_MAP_PATH)]
        output: PathBuf,
        /// Keep the trips already in the map file
        #[arg(long)]
        append: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => run_export(Path::new(DEFAULT_EXPORT_PATH)).await,
        Some(Command::Export { output }) => run_export(&output).await,
        Some(Command::Merge {
            inputs,
            stations,
            output,
            append,
        }) => run_merge(&inputs, &stations, MergeOptions::new(output).with_append(append)),
    }
}

async fn run_export(output: &Path) -> ExitCode {
    let config = match ExportConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let client = match CyclocityClient::new(config.client_config()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create Cyclocity client: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Diagnostics were already printed by the export itself
    match export::run(&client, output, &mut std::io::stdout()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Export failed");
            ExitCode::FAILURE
        }
    }
}

fn run_merge(inputs: &[PathBuf], stations: &Path, options: MergeOptions) -> ExitCode {
    let stations = match StationIndex::load(stations) {
        Ok(stations) => stations,
        Err(e) => {
            eprintln!("Failed to load stations: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("{} stations chargées", stations.len());

    match merge::merge(inputs, &stations, &options) {
        Ok(summary) => {
            if let Some(backup) = &summary.backup {
                println!("Sauvegarde de l'ancien fichier : {}", backup.display());
            }
            if summary.kept > 0 {
                println!("Trajets déjà présents conservés : {}", summary.kept);
            }
            println!("Fusion terminée : {} trajets.", summary.total);
            println!(
                "Trajets convertis : {}, ignorés : {}",
                summary.converted, summary.skipped
            );
            if summary.duplicates > 0 {
                println!("Doublons écartés : {}", summary.duplicates);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Merge failed: {e}");
            ExitCode::FAILURE
        }
    }
}
