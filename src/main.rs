//! Geminal Calculation Command-Line Interface
//!
//! This is the main entry point for solving APIG and AP1roG wavefunctions from a YAML
//! configuration.

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use geminals::config::{Args, Config};
use geminals::io::{print_solution, setup_output};
use geminals::{create_solver, GeminalKind};
use std::fs;
use tracing::info;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_output(args.output.as_ref());

    // Load and parse configuration
    info!("Reading configuration from: {}", args.config_file);
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let mut config: Config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    apply_overrides(&mut config, &args)?;
    info!("Configuration loaded:\n{:?}", config);

    run_geminal_calculation(&config)
}

/// Command-line arguments take precedence over the configuration file
fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(model) = args.model.as_deref() {
        info!("Overriding wavefunction model with: {}", model);
        config.wavefunction.model = Some(model.parse::<GeminalKind>()?);
    }
    let solver = config.solver.get_or_insert_with(Default::default);
    if let Some(algorithm) = args.algorithm.as_ref() {
        info!("Overriding solver algorithm with: {}", algorithm);
        solver.algorithm = Some(algorithm.clone());
    }
    if let Some(max_iterations) = args.max_iterations {
        info!("Overriding max_iterations with: {}", max_iterations);
        solver.max_iterations = Some(max_iterations);
    }
    if let Some(tolerance) = args.tolerance {
        info!("Overriding tolerance with: {}", tolerance);
        solver.tolerance = Some(tolerance);
    }
    Ok(())
}

fn run_geminal_calculation(config: &Config) -> Result<()> {
    let mut geminal = config
        .build_geminal()
        .wrap_err("Failed to set up the wavefunction")?;
    let solver = create_solver(&config.solver_algorithm(), config.solver_settings())?;

    let x0 = config
        .initial_params(&geminal, solver.as_ref())
        .wrap_err("Failed to generate the initial guess")?;

    let outcome = geminal.solve(solver.as_ref(), x0)?;

    let mut report = Vec::new();
    print_solution(&mut report, &geminal, &outcome)?;
    info!("\n{}", String::from_utf8_lossy(&report));
    Ok(())
}
