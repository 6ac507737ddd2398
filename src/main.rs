//! Intrusion Detection Pipeline - Main Entry Point
//!
//! Classifies traffic records from a CSV file, manual entry, or a
//! synthetic generator, and renders predictions with risk scores and
//! explanations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use intrusion_detection_pipeline::{
    config::AppConfig,
    input::{read_csv, Generator},
    output::{render_summary, render_table, write_csv},
    pipeline::Pipeline,
    types::record::TrafficRecord,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "intrusion-detection-pipeline")]
#[command(version, about = "Network traffic intrusion detection with pre-trained models")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable models in the configured models directory
    Models,

    /// Classify every record of a CSV file
    Predict {
        /// CSV file with columns srcip, dstip, bytes_sent,
        /// bytes_received, dstport, time
        input: PathBuf,

        /// Model to use (defaults to the configured model)
        #[arg(short, long)]
        model: Option<String>,

        /// Write predictions to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify a single manually entered record
    Manual {
        /// Source IP address
        #[arg(long, default_value = "0.0")]
        srcip: String,

        /// Destination IP address
        #[arg(long, default_value = "0.0")]
        dstip: String,

        /// Bytes sent by the source
        #[arg(long, default_value_t = 0)]
        bytes_sent: u64,

        /// Bytes received by the source
        #[arg(long, default_value_t = 0)]
        bytes_received: u64,

        /// Destination port
        #[arg(long, default_value_t = 0)]
        dstport: i64,

        /// Time of day, HH:MM:SS
        #[arg(long, default_value = "00:00:00")]
        time: String,

        /// Model to use (defaults to the configured model)
        #[arg(short, long)]
        model: Option<String>,

        /// Write the prediction to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate one synthetic record and classify it
    Generate {
        /// Seed for reproducible generation
        #[arg(long)]
        seed: Option<u64>,

        /// Model to use (defaults to the configured model)
        #[arg(short, long)]
        model: Option<String>,

        /// Write the prediction to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config);

    let pipeline = Pipeline::new(&config)?;

    match cli.command {
        Commands::Models => {
            for name in pipeline.available_models()? {
                println!("{name}");
            }
            Ok(())
        }

        Commands::Predict {
            input,
            model,
            output,
        } => {
            let records = read_csv(&input)?;
            let model = model.unwrap_or_else(|| config.models.default_model.clone());
            let predictions = pipeline.predict(&model, &records)?;
            report(&predictions, output.as_deref())
        }

        Commands::Manual {
            srcip,
            dstip,
            bytes_sent,
            bytes_received,
            dstport,
            time,
            model,
            output,
        } => {
            let record = TrafficRecord {
                srcip,
                dstip,
                bytes_sent,
                bytes_received,
                dstport,
                time,
            };
            let model = model.unwrap_or_else(|| config.models.default_model.clone());
            let predictions = pipeline.predict_records(&model, vec![record])?;
            report(&predictions, output.as_deref())
        }

        Commands::Generate {
            seed,
            model,
            output,
        } => {
            let mut generator = match seed {
                Some(seed) => Generator::with_seed(seed),
                None => Generator::new(),
            };
            let record = generator.generate();
            // Redisplay the generated values, like a form would.
            if let Some(last) = generator.last() {
                println!("{}", "Generated record:".bold());
                println!("{}", serde_json::to_string_pretty(last)?);
            }

            let model = model.unwrap_or_else(|| config.models.default_model.clone());
            let predictions = pipeline.predict_records(&model, vec![record])?;
            report(&predictions, output.as_deref())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None if std::path::Path::new("config/config.toml").exists() => AppConfig::load(),
        None => Ok(AppConfig::default()),
    }
}

fn init_logging(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.clone()));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn report(
    predictions: &[intrusion_detection_pipeline::Prediction],
    output: Option<&std::path::Path>,
) -> Result<()> {
    println!("{}", render_table(predictions));

    let summary = render_summary(predictions);
    let intrusions = predictions
        .iter()
        .any(|p| p.label == intrusion_detection_pipeline::Label::Intrusion);
    if intrusions {
        println!("{}", summary.red().bold());
    } else {
        println!("{}", summary.green());
    }

    if let Some(path) = output {
        write_csv(path, predictions)?;
        info!(path = %path.display(), "Predictions saved");
    }
    Ok(())
}
