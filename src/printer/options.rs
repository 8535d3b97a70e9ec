//! Printer option model that compiled PPDE rules are merged into.

use rust_decimal::Decimal;
use serde::Serialize;

use super::dictionary::UiGroup;
use crate::ppde::CostRuleTables;
use crate::rules::{
    calc_custom_cost, find_number_up_rule, ConstraintRule, ExtraRule, JobTicketScope,
    NativeValue, NumberUpQuery, NumberUpRule, Selection, SubstRule,
};

/// One selectable value of a printer option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrinterChoice {
    /// Abstract choice
    pub choice: String,
    /// Native choice sent to the print system, when known
    pub native_choice: Option<String>,
    pub extended: bool,
}

impl PrinterChoice {
    pub fn new(choice: &str) -> Self {
        Self {
            choice: choice.to_string(),
            native_choice: None,
            extended: false,
        }
    }
}

/// A printer option keyed by its abstract attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrinterOption {
    pub keyword: String,
    /// Native keyword, set once a PPDE mapping targets the option
    pub native_keyword: Option<String>,
    pub choices: Vec<PrinterChoice>,
    pub default_choice: Option<String>,
    pub default_choice_native: Option<String>,
}

impl PrinterOption {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            native_keyword: None,
            choices: Vec::new(),
            default_choice: None,
            default_choice_native: None,
        }
    }

    pub fn choice(&self, choice: &str) -> Option<&PrinterChoice> {
        self.choices.iter().find(|c| c.choice == choice)
    }

    pub fn choice_mut(&mut self, choice: &str) -> Option<&mut PrinterChoice> {
        self.choices.iter_mut().find(|c| c.choice == choice)
    }
}

/// Options presented together in one UI group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionGroup {
    pub group: UiGroup,
    pub options: Vec<PrinterOption>,
}

impl OptionGroup {
    pub fn new(group: UiGroup) -> Self {
        Self {
            group,
            options: Vec::new(),
        }
    }
}

/// Everything known about the options of one printer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrinterOptions {
    /// Groups in presentation order
    pub groups: Vec<OptionGroup>,
    pub cost_rules: CostRuleTables,
    pub number_up_rules: Vec<NumberUpRule>,
    pub constraint_rules: Vec<ConstraintRule>,
    pub extra_rules: Vec<ExtraRule>,
    pub subst_rules: Vec<SubstRule>,
    /// A PPDE mapping targets `print-scaling`
    pub print_scaling_mapped: bool,
    /// Landscape is rendered by rotating minus 90 degrees
    pub landscape_minus90: bool,
}

impl PrinterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self, group: UiGroup) -> Option<&OptionGroup> {
        self.groups.iter().find(|g| g.group == group)
    }

    /// The group, appended at the end of the group list when absent.
    pub fn group_mut_or_insert(&mut self, group: UiGroup) -> &mut OptionGroup {
        let index = match self.groups.iter().position(|g| g.group == group) {
            Some(index) => index,
            None => {
                self.groups.push(OptionGroup::new(group));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    /// Find an option by abstract keyword across all groups.
    pub fn option(&self, keyword: &str) -> Option<&PrinterOption> {
        self.groups
            .iter()
            .flat_map(|g| g.options.iter())
            .find(|o| o.keyword == keyword)
    }

    pub fn option_mut(&mut self, keyword: &str) -> Option<&mut PrinterOption> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.options.iter_mut())
            .find(|o| o.keyword == keyword)
    }

    /// Summed cost of the scope's matching cost rules, `None` when none match.
    pub fn custom_cost(&self, scope: JobTicketScope, selection: &Selection) -> Option<Decimal> {
        calc_custom_cost(self.cost_rules.scope(scope), selection)
    }

    /// Constraint rules the selection violates, in rule order.
    pub fn constraint_violations(&self, selection: &Selection) -> Vec<&ConstraintRule> {
        self.constraint_rules
            .iter()
            .filter(|rule| rule.is_violated(selection))
            .collect()
    }

    pub fn find_number_up_rule(&self, query: &NumberUpQuery) -> Option<&NumberUpRule> {
        find_number_up_rule(&self.number_up_rules, query)
    }

    /// Native values injected by all applying extra rules, in rule order.
    pub fn extra_native_values(&self, selection: &Selection) -> Vec<&NativeValue> {
        self.extra_rules
            .iter()
            .filter(|rule| rule.applies(selection))
            .flat_map(|rule| rule.extra_native.iter())
            .collect()
    }

    /// Native value replacing the selected choice of `attribute`, from the
    /// first applying substitution rule.
    pub fn substitute_native(&self, attribute: &str, selection: &Selection) -> Option<&str> {
        self.subst_rules
            .iter()
            .find(|rule| rule.main.attribute == attribute && rule.applies(selection))
            .map(|rule| rule.substitute.as_str())
    }

    /// Translate an abstract selection into native keyword/choice pairs.
    ///
    /// Only options with a native mapping are translated. Substitutions
    /// replace the mapped choice; extra native values are appended.
    pub fn native_values(&self, selection: &Selection) -> Vec<NativeValue> {
        let mut values = Vec::new();

        for option in self.groups.iter().flat_map(|g| g.options.iter()) {
            let Some(native_keyword) = &option.native_keyword else {
                continue;
            };
            let Some(selected) = selection.get(&option.keyword) else {
                continue;
            };
            let native_choice = self
                .substitute_native(&option.keyword, selection)
                .or_else(|| {
                    option
                        .choice(selected)
                        .and_then(|c| c.native_choice.as_deref())
                });
            if let Some(choice) = native_choice {
                values.push(NativeValue {
                    keyword: native_keyword.clone(),
                    choice: choice.to_string(),
                });
            }
        }

        values.extend(self.extra_native_values(selection).into_iter().cloned());
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Condition, CostRule, MainCondition};
    use std::str::FromStr;

    fn selection(pairs: &[(&str, &str)]) -> Selection {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn mapped_option(keyword: &str, native: &str, choices: &[(&str, &str)]) -> PrinterOption {
        let mut option = PrinterOption::new(keyword);
        option.native_keyword = Some(native.to_string());
        option.choices = choices
            .iter()
            .map(|(choice, native)| PrinterChoice {
                choice: choice.to_string(),
                native_choice: Some(native.to_string()),
                extended: false,
            })
            .collect();
        option
    }

    #[test]
    fn test_group_mut_or_insert_appends_once() {
        let mut options = PrinterOptions::new();
        options.group_mut_or_insert(UiGroup::Job);
        options.group_mut_or_insert(UiGroup::PageSetup);
        options.group_mut_or_insert(UiGroup::Job);
        let groups: Vec<_> = options.groups.iter().map(|g| g.group).collect();
        assert_eq!(groups, vec![UiGroup::Job, UiGroup::PageSetup]);
    }

    #[test]
    fn test_custom_cost_per_scope() {
        let mut options = PrinterOptions::new();
        options.cost_rules.media.push(CostRule {
            alias: "m1".to_string(),
            cost: Decimal::from_str("0.05").unwrap(),
            conditions: vec![Condition::new("media-color", "blue", true)],
        });

        let sel = selection(&[("media-color", "blue")]);
        assert_eq!(
            options.custom_cost(JobTicketScope::Media, &sel),
            Some(Decimal::from_str("0.05").unwrap())
        );
        assert_eq!(options.custom_cost(JobTicketScope::Sheet, &sel), None);
    }

    #[test]
    fn test_constraint_violations() {
        let mut options = PrinterOptions::new();
        options.constraint_rules.push(ConstraintRule {
            alias: "c1".to_string(),
            conditions: [
                Condition::new("media-type", "labels", true),
                Condition::new("sides", "one-sided", false),
            ],
        });

        let sel = selection(&[("media-type", "labels"), ("sides", "two-sided-long-edge")]);
        assert_eq!(options.constraint_violations(&sel).len(), 1);

        let sel = selection(&[("media-type", "labels"), ("sides", "one-sided")]);
        assert!(options.constraint_violations(&sel).is_empty());
    }

    #[test]
    fn test_native_values_with_substitution_and_extras() {
        let mut options = PrinterOptions::new();
        options.group_mut_or_insert(UiGroup::PageSetup).options.push(mapped_option(
            "media-type",
            "*MediaType",
            &[("stationery", "Plain"), ("labels", "Labels")],
        ));
        options.subst_rules.push(SubstRule {
            alias: "s1".to_string(),
            main: MainCondition {
                attribute: "media-type".to_string(),
                choice: "labels".to_string(),
            },
            conditions: vec![Condition::new("print-color-mode", "color", true)],
            substitute: "ThickLabels".to_string(),
        });
        options.extra_rules.push(ExtraRule {
            alias: "e1".to_string(),
            main: MainCondition {
                attribute: "media-type".to_string(),
                choice: "labels".to_string(),
            },
            conditions: vec![],
            extra_native: vec![NativeValue {
                keyword: "*MediaWeight".to_string(),
                choice: "Heavy".to_string(),
            }],
        });

        let sel = selection(&[("media-type", "stationery")]);
        assert_eq!(
            options.native_values(&sel),
            vec![NativeValue {
                keyword: "*MediaType".to_string(),
                choice: "Plain".to_string(),
            }]
        );

        let sel = selection(&[("media-type", "labels"), ("print-color-mode", "color")]);
        let values = options.native_values(&sel);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].choice, "ThickLabels");
        assert_eq!(values[1].keyword, "*MediaWeight");

        let sel = selection(&[("media-type", "labels"), ("print-color-mode", "monochrome")]);
        assert_eq!(options.native_values(&sel)[0].choice, "Labels");
    }

    #[test]
    fn test_option_lookup_across_groups() {
        let mut options = PrinterOptions::new();
        options
            .group_mut_or_insert(UiGroup::Job)
            .options
            .push(PrinterOption::new("sides"));
        assert!(options.option("sides").is_some());
        assert!(options.option("media").is_none());
        options.option_mut("sides").unwrap().default_choice = Some("one-sided".to_string());
        assert_eq!(
            options.option("sides").unwrap().default_choice.as_deref(),
            Some("one-sided")
        );
    }
}
