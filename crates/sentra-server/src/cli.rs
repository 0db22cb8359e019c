use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "sentra-server")]
#[command(author, version, about = "Sentra sentiment scoring service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Pipeline artifact to load at startup
    #[arg(short, long, env = "SENTRA_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long, env = "SENTRA_LISTEN")]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "SENTRA_PORT")]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
