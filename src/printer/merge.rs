//! Injection of compiled PPDE rules into a printer option model.

use tracing::debug;

use super::dictionary::{AttributeDictionary, UiGroup};
use super::options::{PrinterChoice, PrinterOption, PrinterOptions};
use crate::ppde::{Diagnostic, PpdExtRules};
use crate::rules::{JobTicketOption, OptionMapping};

/// Abstract keyword whose mapping flags the printer as scaling natively.
const PRINT_SCALING: &str = "print-scaling";

impl PpdExtRules {
    /// Merge the compiled tables into `options`, consuming them.
    ///
    /// Returns the compile diagnostics, which have no place in the option
    /// model.
    pub fn inject_into(
        self,
        options: &mut PrinterOptions,
        dictionary: &AttributeDictionary,
    ) -> Vec<Diagnostic> {
        for mapping in self.option_mappings.values() {
            if mapping.abstract_keyword == PRINT_SCALING {
                options.print_scaling_mapped = true;
            }
            inject_mapping(options, dictionary, mapping);
        }

        let group = options.group_mut_or_insert(UiGroup::JobTicket);
        group.options = self.job_tickets.flatten().map(job_ticket_option).collect();

        options.cost_rules = self.cost_rules;
        options.number_up_rules = self.number_up_rules;
        options.constraint_rules = self.constraint_rules;
        options.extra_rules = self.extra_rules;
        options.subst_rules = self.subst_rules;

        if let Some(minus90) = self.landscape_minus90 {
            options.landscape_minus90 = minus90;
        }

        self.diagnostics
    }
}

fn inject_mapping(
    options: &mut PrinterOptions,
    dictionary: &AttributeDictionary,
    mapping: &OptionMapping,
) {
    let Some(group) = dictionary.group_of(&mapping.abstract_keyword) else {
        debug!(
            "{} -> {}: attribute has no UI group, not injected",
            mapping.native_keyword, mapping.abstract_keyword
        );
        return;
    };

    if let Some(option) = options.option_mut(&mapping.abstract_keyword) {
        merge_mapping(option, mapping);
        return;
    }

    let mut option = PrinterOption::new(&mapping.abstract_keyword);
    merge_mapping(&mut option, mapping);
    options.group_mut_or_insert(group).options.push(option);
}

/// Overlay the native side of a mapping; choices the option lacks are appended.
fn merge_mapping(option: &mut PrinterOption, mapping: &OptionMapping) {
    option.native_keyword = Some(mapping.native_keyword.clone());

    for (choice, native) in &mapping.choices {
        match option.choice_mut(choice) {
            Some(existing) => existing.native_choice = Some(native.clone()),
            None => option.choices.push(PrinterChoice {
                choice: choice.clone(),
                native_choice: Some(native.clone()),
                extended: false,
            }),
        }
    }

    if mapping.default_choice.is_some() {
        option.default_choice = mapping.default_choice.clone();
        option.default_choice_native = mapping.default_choice_native.clone();
    }
}

fn job_ticket_option(source: &JobTicketOption) -> PrinterOption {
    PrinterOption {
        keyword: source.keyword.clone(),
        native_keyword: None,
        choices: source
            .choices
            .iter()
            .map(|(choice, jt)| PrinterChoice {
                choice: choice.clone(),
                native_choice: Some(jt.native_value.clone()),
                extended: jt.extended,
            })
            .collect(),
        default_choice: source.default_choice.clone(),
        default_choice_native: source.default_choice_native.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppde::compile_str;
    use crate::printer::{default_dictionary, CapabilitySet};
    use crate::settings::default_settings;

    fn compile(content: &str) -> PpdExtRules {
        compile_str("test.ppde", content, &default_settings(), &CapabilitySet::new())
    }

    #[test]
    fn test_new_option_created_in_dictionary_group() {
        let rules = compile(
            "*MediaType media-type\n\
             *MediaType *Plain stationery\n\
             *MediaType Labels labels\n",
        );
        let mut options = PrinterOptions::new();
        let diagnostics = rules.inject_into(&mut options, &default_dictionary());
        assert!(diagnostics.is_empty());

        let group = options.group(UiGroup::PageSetup).unwrap();
        assert_eq!(group.options.len(), 1);
        let option = &group.options[0];
        assert_eq!(option.keyword, "media-type");
        assert_eq!(option.native_keyword.as_deref(), Some("*MediaType"));
        assert_eq!(option.choices.len(), 2);
        assert_eq!(option.default_choice.as_deref(), Some("stationery"));
        assert_eq!(option.default_choice_native.as_deref(), Some("stationery"));
        assert_eq!(
            option.choice("stationery").unwrap().native_choice.as_deref(),
            Some("Plain")
        );
    }

    #[test]
    fn test_existing_option_merged() {
        let mut options = PrinterOptions::new();
        let mut sides = PrinterOption::new("sides");
        sides.choices.push(PrinterChoice::new("one-sided"));
        sides.default_choice = Some("one-sided".to_string());
        options.group_mut_or_insert(UiGroup::Job).options.push(sides);

        let rules = compile(
            "*Duplex sides\n\
             *Duplex None one-sided\n\
             *Duplex DuplexNoTumble two-sided-long-edge\n",
        );
        rules.inject_into(&mut options, &default_dictionary());

        assert_eq!(options.group(UiGroup::Job).unwrap().options.len(), 1);
        let sides = options.option("sides").unwrap();
        assert_eq!(sides.native_keyword.as_deref(), Some("*Duplex"));
        assert_eq!(sides.choices.len(), 2);
        assert_eq!(sides.choices[0].native_choice.as_deref(), Some("None"));
        assert_eq!(sides.choices[1].choice, "two-sided-long-edge");
        // no default marker in the mapping
        assert_eq!(sides.default_choice.as_deref(), Some("one-sided"));
    }

    #[test]
    fn test_unknown_attribute_not_injected() {
        let rules = compile("*Frobnicate org.example-frob\n");
        let mut options = PrinterOptions::new();
        rules.inject_into(&mut options, &default_dictionary());
        assert!(options.group(UiGroup::Advanced).is_none());
        assert!(options.option("org.example-frob").is_none());
    }

    #[test]
    fn test_existing_option_unknown_to_dictionary_untouched() {
        let mut options = PrinterOptions::new();
        options
            .group_mut_or_insert(UiGroup::Advanced)
            .options
            .push(PrinterOption::new("org.example-frob"));

        let rules = compile("*Frob org.example-frob\n*Frob On on\n");
        rules.inject_into(&mut options, &AttributeDictionary::default());

        let option = options.option("org.example-frob").unwrap();
        assert_eq!(option.native_keyword, None);
        assert!(option.choices.is_empty());
    }

    #[test]
    fn test_job_ticket_group_replaced() {
        let mut options = PrinterOptions::new();
        options
            .group_mut_or_insert(UiGroup::JobTicket)
            .options
            .push(PrinterOption::new("stale"));

        let rules = compile(
            "*SPJobTicket/Set: org.savapage-binding *none +glue\n\
             *SPJobTicket/Media: media-color *white blue\n",
        );
        rules.inject_into(&mut options, &default_dictionary());

        let group = options.group(UiGroup::JobTicket).unwrap();
        let keywords: Vec<_> = group.options.iter().map(|o| o.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["media-color", "org.savapage-binding"]);
        assert!(group.options[1].choices[1].extended);
    }

    #[test]
    fn test_job_ticket_group_cleared_by_file_without_options() {
        let mut options = PrinterOptions::new();
        let dictionary = default_dictionary();

        compile("*SPJobTicket/Media: media-color *white\n").inject_into(&mut options, &dictionary);
        assert_eq!(options.group(UiGroup::JobTicket).unwrap().options.len(), 1);

        compile("*MediaType media-type\n").inject_into(&mut options, &dictionary);
        assert!(options.group(UiGroup::JobTicket).unwrap().options.is_empty());
    }

    #[test]
    fn test_flags_and_rules_attached() {
        let rules = compile(
            "*LandscapeOrientation: Minus90\n\
             *FitToPage print-scaling\n\
             *SPConstraint: c1 media-type/labels sides/!one-sided\n\
             bad line with five tokens\n",
        );
        let mut options = PrinterOptions::new();
        let diagnostics = rules.inject_into(&mut options, &default_dictionary());

        assert!(options.landscape_minus90);
        assert!(options.print_scaling_mapped);
        assert_eq!(options.constraint_rules.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 4);
    }
}
