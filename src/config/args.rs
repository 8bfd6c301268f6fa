//! Command-line argument parsing for geminal calculations

use clap::Parser;

/// Geminal wavefunction solver with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override wavefunction model (apig or ap1rog)
    #[arg(long)]
    pub model: Option<String>,

    /// Override solver algorithm (newton or lm)
    #[arg(long)]
    pub algorithm: Option<String>,

    /// Override maximum solver iterations
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Override residual norm tolerance
    #[arg(long)]
    pub tolerance: Option<f64>,
}
