//! Feed Indexer
//!
//! Entry point for freshening feeds into OpenSearch and compiling field
//! dictionaries into ingest pipelines.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use feed_indexer::{commands, Dependencies, IndexingError, Settings};

#[derive(Parser)]
#[command(name = "feed-indexer")]
#[command(about = "Ingests CSV, TSV, XML and JSON feeds into OpenSearch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-extract feeds and rebuild the index of every feed whose content changed
    Freshen {
        /// Data source JSON files, updated in place
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },
    /// Republish the pipeline and reload the stored data of a data source
    Ingest {
        /// Data source JSON file, updated in place
        source: PathBuf,
    },
    /// Compile a YAML dictionary and print the resulting pipeline
    Compile {
        /// Dictionary YAML file
        dictionary: PathBuf,

        /// Pipeline name used in the description
        #[arg(long, default_value = "dictionary")]
        name: String,

        /// Print the pipeline JSON instead of a readable listing
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Feed indexer failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), IndexingError> {
    match command {
        Commands::Compile {
            dictionary,
            name,
            json,
        } => {
            let text = tokio::fs::read_to_string(&dictionary).await?;
            let pipeline = commands::compile_dictionary(&name, &text)?;
            println!("{}", commands::render_pipeline(&pipeline, json)?);
            Ok(())
        }
        Commands::Ingest { source } => {
            let settings = Settings::from_env()?;
            let dependencies = Dependencies::new(&settings).await?;
            let outcome = commands::ingest(&dependencies.reingester, &source).await?;
            info!(source = %source.display(), outcome = ?outcome, "Ingest finished");
            Ok(())
        }
        Commands::Freshen { sources } => {
            let settings = Settings::from_env()?;
            let dependencies = Dependencies::new(&settings).await?;

            // One failing source does not stop the others.
            let mut failures = 0usize;
            for source in &sources {
                match commands::freshen(&dependencies.reingester, source).await {
                    Ok(outcome) => {
                        info!(source = %source.display(), outcome = ?outcome, "Freshen finished")
                    }
                    Err(e) => {
                        failures += 1;
                        error!(source = %source.display(), error = %e, "Freshen failed");
                    }
                }
            }

            if failures > 0 {
                return Err(IndexingError::config(format!(
                    "{} of {} data sources failed to freshen",
                    failures,
                    sources.len()
                )));
            }
            Ok(())
        }
    }
}
