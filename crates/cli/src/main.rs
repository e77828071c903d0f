use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use script_outline::{OutlineConfig, ScriptAnalyzer, ScriptInfo};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::flags::OutputFormat;

mod flags;
mod report;

#[derive(Parser)]
#[command(name = "script-outline")]
#[command(about = "Structural outline of a BeanShell script", long_about = None)]
#[command(version)]
struct Cli {
    /// Script to outline; reads stdin when omitted or "-"
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// TOML file with outline settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report only imports written in the script
    #[arg(long)]
    no_default_imports: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => OutlineConfig::default(),
    };
    if cli.no_default_imports {
        config.include_default_imports = false;
    }
    let analyzer = ScriptAnalyzer::new(config).context("Invalid outline configuration")?;

    let outline = match cli.file.as_deref() {
        Some(path) if path != Path::new("-") => outline_file(&analyzer, path)?,
        _ => analyzer
            .analyze_reader(io::stdin().lock())
            .context("Failed to outline script from stdin")?,
    };

    log::debug!(
        "{} methods, {} variables, rendering as {}",
        outline.method_count(),
        outline.variables.len(),
        cli.format.as_str()
    );

    let rendered = match cli.format {
        OutputFormat::Json => serde_json::to_string_pretty(&outline)?,
        OutputFormat::Tree => report::render_tree(&outline)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn load_config(path: &Path) -> Result<OutlineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config {}", path.display()))
}

fn outline_file(analyzer: &ScriptAnalyzer, path: &Path) -> Result<ScriptInfo> {
    let file =
        fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    log::debug!("outlining {}", path.display());
    analyzer
        .analyze_reader(io::BufReader::new(file))
        .with_context(|| format!("Failed to outline {}", path.display()))
}
