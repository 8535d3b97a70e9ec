//! Printer-side model: capabilities, the attribute dictionary and the
//! option groups compiled rules are injected into.

mod capabilities;
mod dictionary;
mod merge;
mod options;

pub use capabilities::{load_capabilities, CapabilitySet};
pub use dictionary::{default_dictionary, load_dictionary, AttributeDictionary, UiGroup};
pub use options::{OptionGroup, PrinterChoice, PrinterOption, PrinterOptions};
