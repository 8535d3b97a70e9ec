//! The tables produced by one compile of a PPDE file.

use indexmap::IndexMap;
use serde::Serialize;

use super::diagnostics::Diagnostic;
use crate::rules::{
    ConstraintRule, CostRule, ExtraRule, JobTicketOption, JobTicketScope, NumberUpRule,
    OptionMapping, SubstRule,
};

/// Job ticket options per scope, plus one lookup across all scopes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobTicketTables {
    pub media: IndexMap<String, JobTicketOption>,
    pub sheet: IndexMap<String, JobTicketOption>,
    pub copy: IndexMap<String, JobTicketOption>,
    pub set: IndexMap<String, JobTicketOption>,
    /// Attribute -> scope that last defined it
    pub combined: IndexMap<String, JobTicketScope>,
}

impl JobTicketTables {
    pub fn scope(&self, scope: JobTicketScope) -> &IndexMap<String, JobTicketOption> {
        match scope {
            JobTicketScope::Media => &self.media,
            JobTicketScope::Sheet => &self.sheet,
            JobTicketScope::Copy => &self.copy,
            JobTicketScope::Set => &self.set,
        }
    }

    pub fn scope_mut(&mut self, scope: JobTicketScope) -> &mut IndexMap<String, JobTicketOption> {
        match scope {
            JobTicketScope::Media => &mut self.media,
            JobTicketScope::Sheet => &mut self.sheet,
            JobTicketScope::Copy => &mut self.copy,
            JobTicketScope::Set => &mut self.set,
        }
    }

    /// Find a job ticket option in whichever scope defined it last.
    pub fn lookup(&self, attribute: &str) -> Option<&JobTicketOption> {
        let scope = self.combined.get(attribute)?;
        self.scope(*scope).get(attribute)
    }

    /// All options in scope order media, sheet, copy, set.
    pub fn flatten(&self) -> impl Iterator<Item = &JobTicketOption> {
        JobTicketScope::ALL
            .into_iter()
            .flat_map(move |scope| self.scope(scope).values())
    }

    pub fn len(&self) -> usize {
        JobTicketScope::ALL
            .iter()
            .map(|scope| self.scope(*scope).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cost rules per job ticket scope, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostRuleTables {
    pub media: Vec<CostRule>,
    pub sheet: Vec<CostRule>,
    pub copy: Vec<CostRule>,
    pub set: Vec<CostRule>,
}

impl CostRuleTables {
    pub fn scope(&self, scope: JobTicketScope) -> &[CostRule] {
        match scope {
            JobTicketScope::Media => &self.media,
            JobTicketScope::Sheet => &self.sheet,
            JobTicketScope::Copy => &self.copy,
            JobTicketScope::Set => &self.set,
        }
    }

    pub fn scope_mut(&mut self, scope: JobTicketScope) -> &mut Vec<CostRule> {
        match scope {
            JobTicketScope::Media => &mut self.media,
            JobTicketScope::Sheet => &mut self.sheet,
            JobTicketScope::Copy => &mut self.copy,
            JobTicketScope::Set => &mut self.set,
        }
    }

    pub fn len(&self) -> usize {
        self.media.len() + self.sheet.len() + self.copy.len() + self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything compiled from one PPDE file.
///
/// Ownership moves to the caller, typically by merging it into a
/// [`PrinterOptions`](crate::printer::PrinterOptions) with `inject_into`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PpdExtRules {
    /// File name used in diagnostics
    pub file: String,
    /// Keyed by native keyword, in file order
    pub option_mappings: IndexMap<String, OptionMapping>,
    pub job_tickets: JobTicketTables,
    pub cost_rules: CostRuleTables,
    pub number_up_rules: Vec<NumberUpRule>,
    pub constraint_rules: Vec<ConstraintRule>,
    pub extra_rules: Vec<ExtraRule>,
    pub subst_rules: Vec<SubstRule>,
    /// `Some(true)` for `Minus90`, `Some(false)` for `Plus90`
    pub landscape_minus90: Option<bool>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PpdExtRules {
    /// The mapping whose abstract keyword is `keyword`.
    pub fn mapping_for_abstract(&self, keyword: &str) -> Option<&OptionMapping> {
        self.option_mappings
            .values()
            .find(|m| m.abstract_keyword == keyword)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
