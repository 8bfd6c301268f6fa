//! Output formatting and logging utilities

use crate::solver_impl::SolverOutcome;
use crate::wavefunction_impl::Geminal;
use color_eyre::eyre::Result;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Wall clock time as HH:MM:SS
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let total_seconds = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        write!(
            w,
            "{:02}:{:02}:{:02}",
            (total_seconds / 3600) % 24,
            (total_seconds / 60) % 60,
            total_seconds % 60
        )
    }
}

/// Setup output logging to file or stdout
pub fn setup_output(output_path: Option<&String>) {
    match output_path {
        Some(path) => match File::create(path) {
            Ok(log) => {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false);
                Registry::default().with(file_layer).init();
                info!("Output will be written to: {}", path);
            }
            Err(err) => eprintln!("Could not create output file {}: {}", path, err),
        },
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
            info!("Output will be printed to stdout");
        }
    }
}

/// Print the solver outcome, coefficients and energy components to a writer
pub fn print_solution<W: Write>(
    writer: &mut W,
    geminal: &Geminal,
    outcome: &SolverOutcome,
) -> Result<()> {
    writeln!(writer, "{} wavefunction", geminal.model().kind)?;
    writeln!(
        writer,
        "  Solver: {} after {} iterations (residual norm {:.3e})",
        if outcome.success { "converged" } else { "not converged" },
        outcome.iterations,
        outcome.residual_norm
    )?;
    if !outcome.success {
        writeln!(writer, "  Reason: {}", outcome.message)?;
    }

    writeln!(writer, "Geminal coefficients:")?;
    let coeffs = geminal.coefficient_matrix();
    for (i, row) in coeffs.row_iter().enumerate() {
        let entries: Vec<String> = row.iter().map(|c| format!("{:>12.8}", c)).collect();
        writeln!(writer, "  Pair {}: {}", i + 1, entries.join(" "))?;
    }

    let terms = geminal.energy_terms()?;
    let nuclear = geminal.integrals().nuclear_repulsion();
    writeln!(writer, "Energy components:")?;
    writeln!(writer, "  One-electron: {:.10} au", terms.one_electron)?;
    writeln!(writer, "  Coulomb:      {:.10} au", terms.coulomb)?;
    writeln!(writer, "  Exchange:     {:.10} au", terms.exchange)?;
    writeln!(writer, "  Electronic:   {:.10} au", terms.total())?;
    writeln!(writer, "  Nuclear:      {:.10} au", nuclear)?;
    writeln!(writer, "Total energy: {:.10} au", terms.total() + nuclear)?;
    Ok(())
}
