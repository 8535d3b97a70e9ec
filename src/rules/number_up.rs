//! Number-up rule construction and lookup.
//!
//! A rule is accumulated token by token in a `NumberUpRuleBuilder` and only
//! frozen into a `NumberUpRule` once every token validated.

use serde::Serialize;

use super::ipp::{self, NumberUpAttr, NONE_SENTINEL};
use super::types::NumberUpRule;
use crate::error::LineError;

/// Leading marker on dependent (output) values.
const DEPENDENCY_MARKER: char = '*';

/// Accumulates the fields of one `*SPRule .../number-up:` line.
#[derive(Debug, Default)]
pub struct NumberUpRuleBuilder {
    alias: String,
    landscape_output: bool,
    landscape_input_job: Option<bool>,
    pdf_rotation: Option<i32>,
    pdf_content_rotation: Option<i32>,
    user_rotate: Option<i32>,
    number_up: Option<String>,
    orientation_requested: Option<String>,
    number_up_layout: Option<String>,
}

impl NumberUpRuleBuilder {
    pub fn new(alias: &str) -> Self {
        Self {
            alias: alias.to_string(),
            ..Default::default()
        }
    }

    /// Apply one condition token (`attr/value`, or the bare landscape marker).
    pub fn apply(&mut self, token: &str) -> Result<(), LineError> {
        let token = token.strip_prefix(DEPENDENCY_MARKER).unwrap_or(token);
        let (name, value) = match token.split_once('/') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };

        let attr = NumberUpAttr::from_keyword(name)
            .ok_or_else(|| LineError::reference(format!("unknown number-up attribute [{name}]")))?;

        let required = || {
            value
                .filter(|v| !v.is_empty())
                .ok_or_else(|| LineError::syntax(format!("missing value for [{name}]")))
        };

        match attr {
            NumberUpAttr::Landscape => {
                if value.is_some() {
                    return Err(LineError::syntax(format!("[{name}] takes no value")));
                }
                self.landscape_output = true;
            }
            NumberUpAttr::PdfOrientation => {
                self.landscape_input_job = Some(required()?.eq_ignore_ascii_case("landscape"));
            }
            NumberUpAttr::PdfRotation => self.pdf_rotation = Some(rotation(name, required()?)?),
            NumberUpAttr::PdfContentRotation => {
                self.pdf_content_rotation = Some(rotation(name, required()?)?)
            }
            NumberUpAttr::UserRotate => self.user_rotate = Some(rotation(name, required()?)?),
            NumberUpAttr::NumberUp => {
                let value = required()?;
                if !ipp::is_number_up(value) {
                    return Err(invalid(name, value));
                }
                self.number_up = Some(value.to_string());
            }
            NumberUpAttr::OrientationRequested => {
                self.orientation_requested =
                    optional_keyword(name, required()?, ipp::is_orientation_requested)?;
            }
            NumberUpAttr::NumberUpLayout => {
                self.number_up_layout =
                    optional_keyword(name, required()?, ipp::is_number_up_layout)?;
            }
        }
        Ok(())
    }

    pub fn build(self) -> NumberUpRule {
        NumberUpRule {
            alias: self.alias,
            landscape_output: self.landscape_output,
            landscape_input_job: self.landscape_input_job,
            pdf_rotation: self.pdf_rotation,
            pdf_content_rotation: self.pdf_content_rotation,
            user_rotate: self.user_rotate,
            number_up: self.number_up,
            orientation_requested: self.orientation_requested,
            number_up_layout: self.number_up_layout,
        }
    }
}

fn invalid(name: &str, value: &str) -> LineError {
    LineError::value(format!("[{value}] is not a valid [{name}]"))
}

fn rotation(name: &str, value: &str) -> Result<i32, LineError> {
    ipp::parse_pdf_rotation(value).ok_or_else(|| invalid(name, value))
}

fn optional_keyword(
    name: &str,
    value: &str,
    check: fn(&str) -> bool,
) -> Result<Option<String>, LineError> {
    if value == NONE_SENTINEL {
        Ok(None)
    } else if check(value) {
        Ok(Some(value.to_string()))
    } else {
        Err(invalid(name, value))
    }
}

/// The independent inputs of a job for which a number-up rule is looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberUpQuery {
    pub landscape_input_job: bool,
    pub pdf_content_rotation: i32,
    pub user_rotate: i32,
    pub number_up: String,
    pub orientation_requested: Option<String>,
}

impl NumberUpRule {
    /// True when every constrained input of the rule equals the query.
    pub fn matches(&self, query: &NumberUpQuery) -> bool {
        fn accepts<T: PartialEq>(rule: &Option<T>, value: &T) -> bool {
            rule.as_ref().map_or(true, |r| r == value)
        }

        accepts(&self.landscape_input_job, &query.landscape_input_job)
            && accepts(&self.pdf_content_rotation, &query.pdf_content_rotation)
            && accepts(&self.user_rotate, &query.user_rotate)
            && accepts(&self.number_up, &query.number_up)
            && match (&self.orientation_requested, &query.orientation_requested) {
                (None, _) => true,
                (Some(rule), Some(value)) => rule == value,
                (Some(_), None) => false,
            }
    }
}

/// First rule in file order matching the query.
pub fn find_number_up_rule<'a>(
    rules: &'a [NumberUpRule],
    query: &NumberUpQuery,
) -> Option<&'a NumberUpRule> {
    rules.iter().find(|rule| rule.matches(query))
}
