//! PPD extension (PPDE) file compiler.
//!
//! A PPDE file is a line-oriented text file that augments a printer's
//! native options: it maps native keywords and choices to abstract
//! attributes, declares job ticket options and their costs, and carries
//! number-up, constraint, extra and substitution rules.
//!
//! # Example
//!
//! ```ignore
//! use ppdext::ppde::compile_file;
//! use ppdext::printer::CapabilitySet;
//! use ppdext::settings::default_settings;
//!
//! let rules = compile_file(path, &default_settings(), &CapabilitySet::new())?;
//! for diag in &rules.diagnostics {
//!     eprintln!("{diag}");
//! }
//! ```

mod compiled;
mod diagnostics;
pub mod directive;
mod lines;
mod reader;

pub use compiled::{CostRuleTables, JobTicketTables, PpdExtRules};
pub use diagnostics::Diagnostic;
pub use lines::{LineReader, LogicalLine};
pub use reader::{compile_file, compile_str, PpdExtReader};
