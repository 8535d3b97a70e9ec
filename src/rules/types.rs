//! Type definitions for compiled PPD extension rules.
//!
//! All types serialize to JSON so a compiled rule set can be dumped and
//! inspected by an operator.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Current option selection of a print job: abstract attribute -> choice.
pub type Selection = HashMap<String, String>;

// =============================================================================
// OPTION MAPPINGS
// =============================================================================

/// Mapping of one native (driver) option onto an abstract attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionMapping {
    /// Native keyword as written in the PPDE file (e.g. "*MediaType")
    pub native_keyword: String,
    /// Abstract attribute keyword (e.g. "media-type")
    pub abstract_keyword: String,
    /// Abstract default choice
    pub default_choice: Option<String>,
    /// Set together with `default_choice` to the abstract choice; the
    /// native value is `choices[default_choice]`
    pub default_choice_native: Option<String>,
    /// Abstract choice -> native choice, in file order
    pub choices: IndexMap<String, String>,
}

impl OptionMapping {
    pub fn new(native_keyword: &str, abstract_keyword: &str) -> Self {
        Self {
            native_keyword: native_keyword.to_string(),
            abstract_keyword: abstract_keyword.to_string(),
            default_choice: None,
            default_choice_native: None,
            choices: IndexMap::new(),
        }
    }

    /// Native choice mapped onto an abstract choice.
    pub fn native_choice(&self, choice: &str) -> Option<&str> {
        self.choices.get(choice).map(String::as_str)
    }
}

// =============================================================================
// JOB TICKET OPTIONS
// =============================================================================

/// The granularity at which a job ticket option or cost applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobTicketScope {
    Media,
    Sheet,
    Copy,
    Set,
}

impl JobTicketScope {
    pub const ALL: [JobTicketScope; 4] = [
        JobTicketScope::Media,
        JobTicketScope::Sheet,
        JobTicketScope::Copy,
        JobTicketScope::Set,
    ];

    /// Parse the sub-keyword of a `*SPJobTicket` directive (case-sensitive).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "Media" => Some(Self::Media),
            "Sheet" => Some(Self::Sheet),
            "Copy" => Some(Self::Copy),
            "Set" => Some(Self::Set),
            _ => None,
        }
    }
}

impl fmt::Display for JobTicketScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Media => "Media",
            Self::Sheet => "Sheet",
            Self::Copy => "Copy",
            Self::Set => "Set",
        };
        f.write_str(name)
    }
}

/// One allowed choice of a job ticket option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobTicketChoice {
    pub native_value: String,
    /// Optional/advanced capability, distinct from the default
    pub extended: bool,
}

/// An abstract attribute that is only meaningful on a job ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobTicketOption {
    pub keyword: String,
    pub choices: IndexMap<String, JobTicketChoice>,
    pub default_choice: Option<String>,
    pub default_choice_native: Option<String>,
}

impl JobTicketOption {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            choices: IndexMap::new(),
            default_choice: None,
            default_choice_native: None,
        }
    }

    pub fn has_choice(&self, choice: &str) -> bool {
        self.choices.contains_key(choice)
    }
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// A test of one abstract attribute against one choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub attribute: String,
    pub choice: String,
    /// False when the condition was written negated (`attr/!choice`)
    pub must_match: bool,
}

impl Condition {
    pub fn new(attribute: &str, choice: &str, must_match: bool) -> Self {
        Self {
            attribute: attribute.to_string(),
            choice: choice.to_string(),
            must_match,
        }
    }

    /// `(selection[attribute] == choice) == must_match`
    pub fn holds(&self, selection: &Selection) -> bool {
        let selected = selection
            .get(&self.attribute)
            .is_some_and(|value| value == &self.choice);
        selected == self.must_match
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let neg = if self.must_match { "" } else { "!" };
        write!(f, "{}/{}{}", self.attribute, neg, self.choice)
    }
}

// =============================================================================
// RULES
// =============================================================================

/// Cost added to a job when all conditions hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRule {
    pub alias: String,
    pub cost: Decimal,
    pub conditions: Vec<Condition>,
}

/// Two choices that must not be selected together.
///
/// With a negated condition the pair reads "requires": the constraint is
/// violated when the first holds and the second choice is not selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintRule {
    pub alias: String,
    pub conditions: [Condition; 2],
}

impl ConstraintRule {
    /// Attributes whose condition is negated.
    pub fn negated_attributes(&self) -> BTreeSet<&str> {
        self.conditions
            .iter()
            .filter(|c| !c.must_match)
            .map(|c| c.attribute.as_str())
            .collect()
    }
}

/// Rendering parameters for one combination of orientation, rotation and
/// number-up inputs.
///
/// `None` in an input field means "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberUpRule {
    pub alias: String,
    pub landscape_output: bool,
    pub landscape_input_job: Option<bool>,
    pub pdf_rotation: Option<i32>,
    pub pdf_content_rotation: Option<i32>,
    pub user_rotate: Option<i32>,
    pub number_up: Option<String>,
    pub orientation_requested: Option<String>,
    pub number_up_layout: Option<String>,
}

/// The abstract attribute/choice a rule is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainCondition {
    pub attribute: String,
    pub choice: String,
}

/// A native keyword/choice pair sent to the print system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeValue {
    pub keyword: String,
    pub choice: String,
}

/// Native values injected when the main condition and all extra
/// conditions hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtraRule {
    pub alias: String,
    pub main: MainCondition,
    pub conditions: Vec<Condition>,
    pub extra_native: Vec<NativeValue>,
}

/// Replacement of the native value of the main attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstRule {
    pub alias: String,
    pub main: MainCondition,
    pub conditions: Vec<Condition>,
    pub substitute: String,
}
