//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Load and resolve configuration
//! - Hand the run to the [`crate::engine`] and render its report
//!
//! # Architecture
//!
//! The CLI layer is thin. It never touches the workspace or the clone
//! itself; those flow through the engine, which owns cleanup.

pub mod args;

pub use args::Cli;

use std::fs;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::engine::{self, SystemProbe};
use crate::git::GitCliFetcher;
use crate::ui::{output, report};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            err.print().context("Failed to print usage")?;
            return Ok(());
        }
        Err(err) => anyhow::bail!(usage_message(&err)),
    };

    let ctx = engine::Context {
        debug: cli.debug,
        quiet: cli.quiet || cli.report_owns_stdout(),
    };
    let verbosity = ctx.verbosity();

    let loaded = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    match loaded.config.loaded_from() {
        Some(path) => output::debug(format!("config: {}", path.display()), verbosity),
        None => output::debug("config: built-in defaults", verbosity),
    }

    let source = loaded
        .config
        .resolve(&cli.overrides())
        .context("Invalid configuration")?;
    output::debug(format!("resolved: {:?}", source), verbosity);

    let run_report = engine::run_once(source, GitCliFetcher::new(), &SystemProbe, &ctx)?;

    let rendered =
        report::render(&run_report, cli.format).context("Failed to serialize report")?;
    match &cli.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            output::print(format!("Report written to {}", path.display()), verbosity);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// A usage error as one line, without clap's own `error: ` prefix.
fn usage_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}
