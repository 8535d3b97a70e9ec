//! Rule model produced by the PPD extension compiler.
//!
//! # Rule kinds
//!
//! - **Option mappings**: native (driver) keyword/choices to abstract attributes
//! - **Job ticket options**: allowed choices per scope (media, sheet, copy, set)
//! - **Cost rules**: a cost added when all choice conditions hold
//! - **Constraint rules**: two choices that are mutually exclusive
//! - **Number-up rules**: orientation/rotation inputs to rendering parameters
//! - **Extra / Subst rules**: native values injected or substituted
//!
//! # Example
//!
//! ```ignore
//! use ppdext::rules::{calc_custom_cost, Selection};
//!
//! let selection = Selection::from([("media-color".to_string(), "blue".to_string())]);
//! let cost = calc_custom_cost(&compiled.cost_rules.media, &selection);
//! ```

mod eval;
pub mod ipp;
mod number_up;
mod types;

pub use eval::calc_custom_cost;
pub use number_up::{find_number_up_rule, NumberUpQuery, NumberUpRuleBuilder};
pub use types::*;
