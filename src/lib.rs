//! Compiler for PPD extension (PPDE) files.
//!
//! A PPDE file extends a printer's native PPD options with mappings to
//! abstract (IPP) attributes, job ticket options, cost rules, constraints,
//! number-up rendering rules and native value injection/substitution.
//! Compiled rules are merged into a [`printer::PrinterOptions`] model and
//! evaluated against a job's option selection.

pub mod cache;
pub mod cli;
pub mod error;
pub mod ppde;
pub mod printer;
pub mod rules;
pub mod settings;

use clap::Parser;

pub use error::{LineError, PpdExtError};
pub use ppde::{compile_file, compile_str, Diagnostic, PpdExtRules};
pub use printer::{CapabilitySet, PrinterOptions};

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    cli::execute(cli::Cli::parse())
}
