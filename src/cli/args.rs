//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Flags
//!
//! Source flags override the config file, which overrides built-in defaults:
//! - `--repo <URL>`: Repository to clone
//! - `--branch <NAME>`: Branch to clone
//! - `--document-path <REL>`: Gate document inside the checkout
//! - `--workspace-root <DIR>`: Where the scratch directory is created
//!
//! Output flags:
//! - `--format text|json`: Report format
//! - `--output <FILE>`: Write the report to a file instead of stdout
//! - `--quiet` / `-q`: Minimal output
//! - `--debug`: Enable debug logging

use clap::Parser;
use std::path::PathBuf;

use crate::core::config::Overrides;
use crate::ui::report::ReportFormat;

/// Fetch the upstream versioned feature gate list and report its contents
#[derive(Parser, Debug)]
#[command(name = "update-feature-gates")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository URL to clone
    #[arg(long, value_name = "URL")]
    pub repo: Option<String>,

    /// Branch to clone
    #[arg(long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Path of the gate document relative to the checkout
    #[arg(long, value_name = "REL")]
    pub document_path: Option<PathBuf>,

    /// Directory under which the temporary workspace is created
    #[arg(long, value_name = "DIR")]
    pub workspace_root: Option<PathBuf>,

    /// Config file to use instead of the default search
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments.
    ///
    /// Help and version requests come back as errors too; see
    /// [`clap::Error::use_stderr`].
    pub fn parse_args() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }

    /// Values given on the command line, for layering over the config file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            repo_url: self.repo.clone(),
            branch: self.branch.clone(),
            document_path: self.document_path.clone(),
            workspace_root: self.workspace_root.clone(),
        }
    }

    /// Whether the report itself goes to stdout as JSON.
    ///
    /// Status lines are suppressed in that case so stdout stays parseable.
    pub fn report_owns_stdout(&self) -> bool {
        self.output.is_none() && self.format == ReportFormat::Json
    }
}
