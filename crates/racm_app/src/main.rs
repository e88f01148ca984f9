mod app;
mod commands;
mod effects;
mod logging;
mod render;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Submit a document to the RACM analysis service, watch the job run, then
/// review, correct and export the extracted risk/control matrix.
#[derive(Debug, Parser)]
#[command(name = "racm", version)]
pub struct Args {
    /// Document to analyze (.pdf, .xlsx, .xls or .csv).
    pub file: PathBuf,

    /// Extra free-text instructions forwarded to the analysis.
    #[arg(long)]
    pub prompt: Option<String>,

    /// Base URL of the analysis service.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub api_url: String,

    /// API bearer token.
    #[arg(long, default_value = "")]
    pub token: String,

    /// Status poll interval in milliseconds.
    #[arg(long, default_value_t = 2000)]
    pub poll_interval_ms: u64,

    /// Directory exports are written into.
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Probe /health before submitting.
    #[arg(long)]
    pub check_health: bool,

    /// Where log output goes.
    #[arg(long, value_enum, default_value = "file")]
    pub log: LogArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogArg {
    File,
    Terminal,
    Both,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    app::run(args)
}
