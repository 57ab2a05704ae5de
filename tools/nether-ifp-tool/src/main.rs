//! nether-ifp - IFP animation container tool
//!
//! Inspects, verifies and converts ANP3/ANPK animation packs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use nether_ifp::IfpFormat;
use std::path::PathBuf;

mod commands;
mod manifest;

use manifest::{ConvertJob, DEFAULT_FPS};

#[derive(Parser)]
#[command(name = "nether-ifp")]
#[command(about = "IFP animation container tool")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show format, container name and per-animation counts
    Info {
        /// Input .ifp file
        input: PathBuf,
    },

    /// Dump the whole document as JSON
    Dump {
        /// Input .ifp file
        input: PathBuf,

        /// Output .json file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert between ANP3 and ANPK
    Convert {
        /// Input .ifp file
        input: PathBuf,

        /// Output .ifp file (default: <input>.<format>.ifp)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target format (ANP3 or ANPK)
        #[arg(short, long)]
        format: IfpFormat,

        /// Ticks per second for time conversion (default: 30)
        #[arg(long, default_value_t = DEFAULT_FPS)]
        fps: f32,

        /// Rename the container
        #[arg(long)]
        name: Option<String>,
    },

    /// Check that a file re-encodes to identical bytes
    Verify {
        /// Input .ifp file
        input: PathBuf,
    },

    /// Run the conversions listed in a manifest file
    Batch {
        /// Path to ifp.toml manifest
        #[arg(default_value = "ifp.toml")]
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Info { input } => commands::info(&input)?,

        Commands::Dump { input, output } => commands::dump(&input, output.as_deref())?,

        Commands::Convert {
            input,
            output,
            format,
            fps,
            name,
        } => {
            let output = output.unwrap_or_else(|| commands::default_output(&input, format));
            let summary = commands::convert(&ConvertJob {
                input,
                output,
                format,
                fps,
                name,
            })?;
            tracing::info!(
                "Done! {} animations, {} keyframes",
                summary.animation_count,
                summary.keyframe_count
            );
        }

        Commands::Verify { input } => commands::verify(&input)?,

        Commands::Batch { manifest } => commands::batch(&manifest)?,
    }

    Ok(())
}
