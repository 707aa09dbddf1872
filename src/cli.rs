use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "notifygen")]
#[command(about = "Plans change-notification properties from annotated declarations")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyse a declaration snapshot and print the generation plans
    Analyze {
        /// Snapshot file (JSON)
        snapshot: PathBuf,

        /// Output format (text, json); defaults to the configured format
        #[arg(short, long)]
        format: Option<String>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report diagnostics only
    Check {
        /// Snapshot file (JSON)
        snapshot: PathBuf,

        /// Fail if any diagnostic is reported (useful for CI)
        #[arg(long)]
        strict: bool,
    },

    /// Write a default notifygen.toml
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Analyze { snapshot, format, output } => {
                engine.analyze(&snapshot, format.as_deref(), output).await
            }
            Commands::Check { snapshot, strict } => {
                engine.check(&snapshot, strict).await
            }
            Commands::Init { path, force } => {
                engine.init(path, force).await
            }
        }
    }
}
