use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "matchscore-server")]
#[command(about = "Match outcome scoring service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "matchscore.yaml")]
    pub config: String,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Deployment root that relative artifact paths are resolved against
    #[arg(long, env = "MATCHSCORE_ROOT")]
    pub root: Option<PathBuf>,

    /// Classifier artifact path
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Feature schema artifact path
    #[arg(long)]
    pub features: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
