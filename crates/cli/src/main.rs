mod catalog_cmd;
mod config;
mod detect_cmd;
mod output;
mod timestamp_cmd;

use clap::{Parser, Subcommand};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "eventscope",
    about = "eventscope CLI - simulate video event detection and browse the results"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a video, run a detection and print the result timeline
    Detect(detect_cmd::DetectArgs),

    /// Convert between `MM:SS` and seconds
    Timestamp {
        /// `MM:SS` timestamp or a number of seconds
        value: String,

        /// Shift the timestamp by this many seconds (fractions are truncated)
        #[arg(long, allow_hyphen_values = true)]
        add: Option<f64>,
    },

    /// List the phrase catalog used for canned detections
    Catalog {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Detect(args) => detect_cmd::run(args).await,
        Commands::Timestamp { value, add } => timestamp_cmd::run(&value, add),
        Commands::Catalog { format } => catalog_cmd::run(format),
        Commands::Config => config::show_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
