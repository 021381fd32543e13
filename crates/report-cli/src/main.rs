//! `report-check` entry point

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use report_cli::commands::{self, BatchEntry, OutputFormat};
use report_cli::config::{CliConfig, LogFormat};
use report_validation::ValidationEngine;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "report-check")]
#[command(about = "Validate investor report page documents")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with schema overrides (overrides the config file)
    #[arg(long)]
    schema_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log format (overrides the config file)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Validate one page document against the schema for its content path
    Validate {
        /// Content path, e.g. dashboard or financial-model
        content_path: String,

        /// JSON document to validate
        file: PathBuf,
    },

    /// Validate several page documents
    Batch {
        /// Entries of the form CONTENT_PATH=FILE
        #[arg(required = true)]
        entries: Vec<BatchEntry>,
    },

    /// List content paths with a dedicated schema
    Schemas,
}

fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = CliConfig::resolve(cli.config.as_deref())?;
    if let Some(dir) = cli.schema_dir {
        config.schema_dir = Some(dir);
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    init_tracing(&config);

    let registry = Arc::new(commands::load_registry(&config)?);
    let engine = ValidationEngine::with_tracing(Arc::clone(&registry));

    let outcome = match cli.command {
        Commands::Validate { content_path, file } => {
            commands::validate_file(&engine, &content_path, &file, cli.format)?
        }
        Commands::Batch { entries } => {
            commands::validate_files(&engine, &entries, config.max_concurrency, cli.format).await?
        }
        Commands::Schemas => commands::list_schemas(&registry, cli.format)?,
    };

    println!("{}", outcome.output);
    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
