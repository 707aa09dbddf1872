// src/core/engine.rs
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::NotifyGenError;
use super::analysis::{analyse_all, AnalysisReport};
use super::configuration::Configuration;
use super::diagnostics::Diagnostics;
use super::snapshot::SymbolSnapshot;

/// How analysis results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = NotifyGenError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(NotifyGenError::OutputFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Main orchestration engine: loads configuration and snapshots, runs the analysis
pub struct Engine {
    config: Config,
    configuration: Configuration,
    /// Problems found while resolving `configuration`, prepended to every report
    config_diagnostics: Diagnostics,
}

impl Engine {
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);

        let mut config_diagnostics = Diagnostics::new();
        let configuration = Configuration::resolve(&config.generation, &mut config_diagnostics);
        if !config_diagnostics.is_empty() {
            warn!("Configuration has {} problem(s)", config_diagnostics.len());
        }

        Ok(Self {
            config,
            configuration,
            config_diagnostics,
        })
    }

    /// Load a snapshot and analyse it on a blocking worker
    pub async fn run(&self, snapshot_path: &Path) -> Result<AnalysisReport> {
        info!("Loading snapshot: {}", snapshot_path.display());
        let snapshot = SymbolSnapshot::load(snapshot_path).await?;
        debug!("Snapshot declares {} type(s)", snapshot.types.len());

        let configuration = self.configuration.clone();
        let config_diagnostics = self.config_diagnostics.clone();
        let report = tokio::task::spawn_blocking(move || {
            analyse_all(&snapshot, &configuration, config_diagnostics)
        })
        .await?;

        debug!("Report fingerprint: {}", report.fingerprint()?);
        Ok(report)
    }

    /// Analyse a snapshot and print or write the plans
    pub async fn analyze(
        &self,
        snapshot_path: &Path,
        format: Option<&str>,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let format = OutputFormat::from_str(format.unwrap_or(self.config.output.format.as_str()))?;
        let report = self.run(snapshot_path).await?;
        let rendered = self.render(&report, format)?;

        match output {
            Some(path) => {
                tokio::fs::write(&path, rendered).await?;
                info!("Wrote {} report to {}", format, path.display());
            }
            None => print!("{}", rendered),
        }

        Ok(())
    }

    /// Print diagnostics only. In strict mode any diagnostic fails the command.
    pub async fn check(&self, snapshot_path: &Path, strict: bool) -> Result<()> {
        let report = self.run(snapshot_path).await?;

        for diagnostic in &report.diagnostics {
            println!("{}", diagnostic);
        }

        if report.diagnostics.is_empty() {
            info!("No diagnostics");
        } else if strict {
            return Err(NotifyGenError::Strict {
                count: report.diagnostics.len(),
            }
            .into());
        }

        Ok(())
    }

    /// Write a default configuration file
    pub async fn init(&self, path: Option<PathBuf>, force: bool) -> Result<()> {
        let target_dir = match path {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let config_path = target_dir.join("notifygen.toml");
        info!("Initializing notifygen in: {}", target_dir.display());

        if config_path.exists() && !force {
            return Err(NotifyGenError::Config(format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            ))
            .into());
        }

        tokio::fs::create_dir_all(&target_dir).await?;
        Config::default().save(&config_path)?;
        info!("Created {}", config_path.display());
        Ok(())
    }

    fn render(&self, report: &AnalysisReport, format: OutputFormat) -> Result<String> {
        let rendered = match format {
            OutputFormat::Text => report.render_text(),
            OutputFormat::Json => {
                let mut json = report.to_json(self.config.output.pretty)?;
                json.push('\n');
                json
            }
        };
        Ok(rendered)
    }
}
