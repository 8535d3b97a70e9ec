//! Evaluation of compiled rules against a job's option selection.

use rust_decimal::Decimal;

use super::types::*;

impl CostRule {
    /// True when every condition holds for the selection.
    pub fn matches(&self, selection: &Selection) -> bool {
        self.conditions.iter().all(|c| c.holds(selection))
    }

    /// The rule's cost when it matches, otherwise `None`.
    pub fn calc_cost(&self, selection: &Selection) -> Option<Decimal> {
        self.matches(selection).then_some(self.cost)
    }
}

/// Sum of the costs of all matching rules, `None` when no rule matches.
pub fn calc_custom_cost(rules: &[CostRule], selection: &Selection) -> Option<Decimal> {
    rules
        .iter()
        .filter_map(|rule| rule.calc_cost(selection))
        .reduce(|total, cost| total + cost)
}

impl ConstraintRule {
    /// True when both conditions hold, i.e. the combination is not allowed.
    pub fn is_violated(&self, selection: &Selection) -> bool {
        self.conditions.iter().all(|c| c.holds(selection))
    }
}

impl MainCondition {
    pub fn holds(&self, selection: &Selection) -> bool {
        selection
            .get(&self.attribute)
            .is_some_and(|value| value == &self.choice)
    }
}

impl ExtraRule {
    pub fn applies(&self, selection: &Selection) -> bool {
        self.main.holds(selection) && self.conditions.iter().all(|c| c.holds(selection))
    }
}

impl SubstRule {
    pub fn applies(&self, selection: &Selection) -> bool {
        self.main.holds(selection) && self.conditions.iter().all(|c| c.holds(selection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn selection(pairs: &[(&str, &str)]) -> Selection {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn cost_rule(alias: &str, cost: &str, conditions: Vec<Condition>) -> CostRule {
        CostRule {
            alias: alias.to_string(),
            cost: Decimal::from_str(cost).unwrap(),
            conditions,
        }
    }

    #[test]
    fn test_cost_rule_matches_all_conditions() {
        let rule = cost_rule(
            "color-duplex",
            "0.10",
            vec![
                Condition::new("print-color-mode", "color", true),
                Condition::new("sides", "one-sided", false),
            ],
        );

        let sel = selection(&[("print-color-mode", "color"), ("sides", "two-sided-long-edge")]);
        assert_eq!(rule.calc_cost(&sel), Some(Decimal::from_str("0.10").unwrap()));

        let sel = selection(&[("print-color-mode", "color"), ("sides", "one-sided")]);
        assert_eq!(rule.calc_cost(&sel), None);
    }

    #[test]
    fn test_rule_without_conditions_always_matches() {
        let rule = cost_rule("base", "1.5", vec![]);
        assert!(rule.matches(&selection(&[])));
    }

    #[test]
    fn test_custom_cost_sums_matching_rules() {
        let rules = vec![
            cost_rule("blue", "0.05", vec![Condition::new("media-color", "blue", true)]),
            cost_rule("heavy", "0.20", vec![Condition::new("media-type", "heavy", true)]),
            cost_rule("red", "0.07", vec![Condition::new("media-color", "red", true)]),
        ];

        let sel = selection(&[("media-color", "blue"), ("media-type", "heavy")]);
        assert_eq!(
            calc_custom_cost(&rules, &sel),
            Some(Decimal::from_str("0.25").unwrap())
        );

        let sel = selection(&[("media-color", "green")]);
        assert_eq!(calc_custom_cost(&rules, &sel), None);
    }

    #[test]
    fn test_constraint_violation() {
        let rule = ConstraintRule {
            alias: "no-duplex-labels".to_string(),
            conditions: [
                Condition::new("media-type", "labels", true),
                Condition::new("sides", "one-sided", false),
            ],
        };

        let sel = selection(&[("media-type", "labels"), ("sides", "two-sided-long-edge")]);
        assert!(rule.is_violated(&sel));

        let sel = selection(&[("media-type", "labels"), ("sides", "one-sided")]);
        assert!(!rule.is_violated(&sel));

        let sel = selection(&[("media-type", "plain"), ("sides", "two-sided-long-edge")]);
        assert!(!rule.is_violated(&sel));
    }

    #[test]
    fn test_extra_rule_applies() {
        let rule = ExtraRule {
            alias: "punch".to_string(),
            main: MainCondition {
                attribute: "org.savapage-finishings-punch".to_string(),
                choice: "hole-2".to_string(),
            },
            conditions: vec![Condition::new("media", "iso_a3_297x420mm", false)],
            extra_native: vec![NativeValue {
                keyword: "*Punch".to_string(),
                choice: "2Hole".to_string(),
            }],
        };

        let sel = selection(&[
            ("org.savapage-finishings-punch", "hole-2"),
            ("media", "iso_a4_210x297mm"),
        ]);
        assert!(rule.applies(&sel));

        let sel = selection(&[
            ("org.savapage-finishings-punch", "hole-2"),
            ("media", "iso_a3_297x420mm"),
        ]);
        assert!(!rule.applies(&sel));

        assert!(!rule.applies(&selection(&[("media", "iso_a4_210x297mm")])));
    }
}
