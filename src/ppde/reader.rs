//! One compile pass over a PPDE file.
//!
//! Every line is classified into a [`Directive`] and handed to its handler.
//! A handler either appends to the tables or returns a [`LineError`], in
//! which case the line is logged, recorded as a diagnostic and skipped.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::compiled::PpdExtRules;
use super::diagnostics::Diagnostic;
use super::directive::{Directive, JobTicketKind, RuleKind};
use super::lines::{LineReader, LogicalLine};
use crate::error::{LineError, PpdExtError, Result};
use crate::printer::CapabilitySet;
use crate::rules::{
    Condition, ConstraintRule, CostRule, ExtraRule, JobTicketChoice, JobTicketOption,
    JobTicketScope, MainCondition, NativeValue, NumberUpRuleBuilder, OptionMapping, SubstRule,
};
use crate::settings::CompilerSettings;

/// Prefix on a choice marking it as the default.
const DEFAULT_MARKER: char = '*';
/// Prefix (after the default marker) on a job ticket choice marking it extended.
const EXTENDED_MARKER: char = '+';
/// Prefix on a choice (after the slash) negating the condition.
const NEGATE_MARKER: char = '!';
/// Prefix on native values in Extra/Subst rules.
const NATIVE_MARKER: char = '*';
/// Minimum arguments of a number-up rule: alias plus 6 conditions.
const NUMBER_UP_MIN_ARGS: usize = 7;

/// Outcome of handling one line; an error drops the line.
type LineResult<T = ()> = std::result::Result<T, LineError>;

/// Compile a PPDE file from disk.
///
/// Only a read failure is an error; malformed lines end up in
/// [`PpdExtRules::diagnostics`].
pub fn compile_file(
    path: &Path,
    settings: &CompilerSettings,
    capabilities: &CapabilitySet,
) -> Result<PpdExtRules> {
    let content = std::fs::read_to_string(path).map_err(|source| PpdExtError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(compile_str(&name, &content, settings, capabilities))
}

/// Compile PPDE content held in memory. `file` names the source in diagnostics.
pub fn compile_str(
    file: &str,
    content: &str,
    settings: &CompilerSettings,
    capabilities: &CapabilitySet,
) -> PpdExtRules {
    PpdExtReader::new(file, settings, capabilities).read(content)
}

/// Parse state of one compile pass.
pub struct PpdExtReader<'a> {
    settings: &'a CompilerSettings,
    capabilities: &'a CapabilitySet,
    rules: PpdExtRules,
    /// Abstract keyword -> native keyword
    abstract_index: HashMap<String, String>,
}

impl<'a> PpdExtReader<'a> {
    pub fn new(file: &str, settings: &'a CompilerSettings, capabilities: &'a CapabilitySet) -> Self {
        Self {
            settings,
            capabilities,
            rules: PpdExtRules {
                file: file.to_string(),
                ..Default::default()
            },
            abstract_index: HashMap::new(),
        }
    }

    /// Read all lines to the end and hand over the compiled tables.
    pub fn read(mut self, content: &str) -> PpdExtRules {
        let settings = self.settings;
        for line in LineReader::new(content, &settings.reader) {
            if let Err(error) = self.on_line(&line.tokens) {
                self.reject(&line, error);
            }
        }

        let rules = self.rules;
        info!(
            "Compiled {}: {} mappings, {} job ticket options, {} cost rules, {} number-up rules, \
             {} constraints, {} extra rules, {} subst rules, {} lines dropped",
            rules.file,
            rules.option_mappings.len(),
            rules.job_tickets.len(),
            rules.cost_rules.len(),
            rules.number_up_rules.len(),
            rules.constraint_rules.len(),
            rules.extra_rules.len(),
            rules.subst_rules.len(),
            rules.diagnostics.len()
        );
        rules
    }

    fn reject(&mut self, line: &LogicalLine, error: LineError) {
        warn!(
            "{}:{}: {} [{}]",
            self.rules.file,
            line.number,
            error,
            line.tokens.join(" ")
        );
        self.rules.diagnostics.push(Diagnostic {
            file: self.rules.file.clone(),
            line: line.number,
            error,
        });
    }

    fn on_line(&mut self, tokens: &[String]) -> LineResult {
        match Directive::classify(tokens)? {
            Directive::Landscape { value } => self.on_landscape(value),
            Directive::JobTicket { kind, args } => self.on_job_ticket(kind, args),
            Directive::Rule { kind, args } => self.on_rule(kind, args),
            Directive::Extra {
                attribute,
                choice,
                args,
            } => self.on_extra(attribute, choice, args),
            Directive::Subst {
                attribute,
                choice,
                args,
            } => self.on_subst(attribute, choice, args),
            Directive::Constraint { args } => self.on_constraint(args),
            Directive::Constant { name } => {
                debug!("{}: constant {}", self.rules.file, name);
                Ok(())
            }
            Directive::Mapping {
                native_keyword,
                abstract_keyword,
            } => self.on_mapping(native_keyword, abstract_keyword),
            Directive::ChoiceMapping {
                native_keyword,
                native_choice,
                abstract_choice,
            } => self.on_choice_mapping(native_keyword, native_choice, abstract_choice),
        }
    }

    // --- Printer-wide settings ---

    fn on_landscape(&mut self, value: &str) -> LineResult {
        let minus90 = if value.eq_ignore_ascii_case("Plus90") {
            false
        } else if value.eq_ignore_ascii_case("Minus90") {
            true
        } else {
            return Err(LineError::syntax(format!(
                "[{value}] is not Plus90 or Minus90"
            )));
        };
        self.rules.landscape_minus90 = Some(minus90);
        Ok(())
    }

    // --- Option mappings ---

    fn on_mapping(
        &mut self,
        native_keyword: &str,
        abstract_keyword: &str,
    ) -> LineResult {
        if let Some(mapped_from) = self.abstract_index.get(abstract_keyword) {
            if mapped_from != native_keyword {
                return Err(LineError::reference(format!(
                    "[{abstract_keyword}] is already mapped from [{mapped_from}]"
                )));
            }
        }

        match self.rules.option_mappings.get_mut(native_keyword) {
            Some(mapping) => {
                let previous =
                    std::mem::replace(&mut mapping.abstract_keyword, abstract_keyword.to_string());
                self.abstract_index.remove(&previous);
            }
            None => {
                self.rules.option_mappings.insert(
                    native_keyword.to_string(),
                    OptionMapping::new(native_keyword, abstract_keyword),
                );
            }
        }
        self.abstract_index
            .insert(abstract_keyword.to_string(), native_keyword.to_string());

        debug!("{}: {} -> {}", self.rules.file, native_keyword, abstract_keyword);
        Ok(())
    }

    fn on_choice_mapping(
        &mut self,
        native_keyword: &str,
        native_choice: &str,
        abstract_choice: &str,
    ) -> LineResult {
        let mapping = self
            .rules
            .option_mappings
            .get_mut(native_keyword)
            .ok_or_else(|| {
                LineError::reference(format!("[{native_keyword}] is not mapped to an attribute"))
            })?;

        let (native_choice, is_default) = match native_choice.strip_prefix(DEFAULT_MARKER) {
            Some(choice) => (choice, true),
            None => (native_choice, false),
        };
        if native_choice.is_empty() {
            return Err(LineError::syntax(format!(
                "empty native choice for [{native_keyword}]"
            )));
        }

        mapping
            .choices
            .insert(abstract_choice.to_string(), native_choice.to_string());
        if is_default {
            mapping.default_choice = Some(abstract_choice.to_string());
            mapping.default_choice_native = Some(abstract_choice.to_string());
        }
        Ok(())
    }

    // --- Job ticket ---

    fn on_job_ticket(
        &mut self,
        kind: JobTicketKind,
        args: &[String],
    ) -> LineResult {
        if kind.cost {
            self.on_job_ticket_cost(kind.scope, args)
        } else {
            self.on_job_ticket_option(kind.scope, args)
        }
    }

    fn on_job_ticket_option(
        &mut self,
        scope: JobTicketScope,
        args: &[String],
    ) -> LineResult {
        let Some((keyword, choices)) = args.split_first() else {
            return Err(LineError::syntax("missing job ticket attribute"));
        };
        if choices.is_empty() {
            return Err(LineError::syntax(format!("no choices for [{keyword}]")));
        }

        // Validate every choice before touching the table.
        let parsed = choices
            .iter()
            .map(|token| parse_job_ticket_choice(token))
            .collect::<LineResult<Vec<_>>>()?;

        let option = self
            .rules
            .job_tickets
            .scope_mut(scope)
            .entry(keyword.clone())
            .or_insert_with(|| JobTicketOption::new(keyword));

        for (choice, is_default, extended) in parsed {
            option.choices.insert(
                choice.to_string(),
                JobTicketChoice {
                    native_value: choice.to_string(),
                    extended,
                },
            );
            if is_default {
                option.default_choice = Some(choice.to_string());
                option.default_choice_native = Some(choice.to_string());
            }
        }

        self.rules
            .job_tickets
            .combined
            .insert(keyword.clone(), scope);
        Ok(())
    }

    fn on_job_ticket_cost(
        &mut self,
        scope: JobTicketScope,
        args: &[String],
    ) -> LineResult {
        let [cost, alias, conditions @ ..] = args else {
            return Err(LineError::syntax(
                "cost rule expects <cost> <alias> [<attribute>/<choice>...]",
            ));
        };

        let cost = parse_cost(cost, self.settings.cost.decimal_separator)?;
        let conditions = conditions
            .iter()
            .map(|token| self.cost_condition(scope, token))
            .collect::<LineResult<Vec<_>>>()?;

        self.rules.cost_rules.scope_mut(scope).push(CostRule {
            alias: alias.clone(),
            cost,
            conditions,
        });
        Ok(())
    }

    /// Resolve a cost condition against the scope's options, then the option
    /// mappings, then the capability set. The first source knowing the
    /// attribute decides.
    fn cost_condition(
        &self,
        scope: JobTicketScope,
        token: &str,
    ) -> LineResult<Condition> {
        let condition = parse_condition(token)?;
        let attribute = condition.attribute.as_str();
        let choice = condition.choice.as_str();

        let known = if let Some(option) = self.rules.job_tickets.scope(scope).get(attribute) {
            Some(option.has_choice(choice))
        } else if let Some(mapping) = self.mapping_for_abstract(attribute) {
            Some(mapping.choices.contains_key(choice))
        } else {
            self.capabilities
                .choices(attribute)
                .map(|choices| choices.iter().any(|c| c == choice))
        };

        match known {
            Some(true) => Ok(condition),
            Some(false) => Err(LineError::reference(format!(
                "unknown choice [{choice}] for [{attribute}]"
            ))),
            None if self.rules.job_tickets.lookup(attribute).is_some() => Err(
                LineError::reference(format!("[{attribute}] is not a {scope} job ticket option")),
            ),
            None => Err(LineError::reference(format!(
                "unknown attribute [{attribute}]"
            ))),
        }
    }

    fn mapping_for_abstract(&self, keyword: &str) -> Option<&OptionMapping> {
        let native = self.abstract_index.get(keyword)?;
        self.rules.option_mappings.get(native)
    }

    // --- Rules ---

    fn on_rule(&mut self, kind: RuleKind, args: &[String]) -> LineResult {
        match kind {
            RuleKind::NumberUp => self.on_number_up(args),
            RuleKind::Unhandled(name) => {
                Err(LineError::syntax(format!("unhandled rule [{name}]")))
            }
        }
    }

    fn on_number_up(&mut self, args: &[String]) -> LineResult {
        if args.len() < NUMBER_UP_MIN_ARGS {
            return Err(LineError::syntax(format!(
                "number-up rule expects an alias and at least {} conditions, found {} token(s)",
                NUMBER_UP_MIN_ARGS - 1,
                args.len()
            )));
        }

        let mut builder = NumberUpRuleBuilder::new(&args[0]);
        for token in &args[1..] {
            builder.apply(token)?;
        }
        self.rules.number_up_rules.push(builder.build());
        Ok(())
    }

    fn on_constraint(&mut self, args: &[String]) -> LineResult {
        let [alias, first, second] = args else {
            return Err(LineError::syntax(
                "constraint expects <alias> <attribute>/<choice> <attribute>/<choice>",
            ));
        };
        let conditions = [parse_condition(first)?, parse_condition(second)?];
        self.rules.constraint_rules.push(ConstraintRule {
            alias: alias.clone(),
            conditions,
        });
        Ok(())
    }

    fn on_extra(
        &mut self,
        attribute: &str,
        choice: &str,
        args: &[String],
    ) -> LineResult {
        let (alias, tokens) = split_alias(args)?;
        let mut conditions = Vec::new();
        let mut extra_native = Vec::new();

        for token in tokens {
            if token.starts_with(NATIVE_MARKER) {
                extra_native.push(parse_native_value(token)?);
            } else {
                conditions.push(parse_condition(token)?);
            }
        }

        self.rules.extra_rules.push(ExtraRule {
            alias: alias.to_string(),
            main: MainCondition {
                attribute: attribute.to_string(),
                choice: choice.to_string(),
            },
            conditions,
            extra_native,
        });
        Ok(())
    }

    fn on_subst(
        &mut self,
        attribute: &str,
        choice: &str,
        args: &[String],
    ) -> LineResult {
        let (alias, tokens) = split_alias(args)?;
        let mut conditions = Vec::new();
        let mut substitute = None;

        for token in tokens {
            match token.strip_prefix(NATIVE_MARKER) {
                Some(value) => {
                    if value.is_empty() || value.contains('/') {
                        return Err(LineError::syntax(format!(
                            "[{token}] is not a *<value> substitution"
                        )));
                    }
                    if substitute.is_some() {
                        return Err(LineError::syntax(format!(
                            "second substitution value [{token}]"
                        )));
                    }
                    substitute = Some(value.to_string());
                }
                None => conditions.push(parse_condition(token)?),
            }
        }

        let substitute = substitute
            .ok_or_else(|| LineError::syntax(format!("no substitution value in [{alias}]")))?;

        self.rules.subst_rules.push(SubstRule {
            alias: alias.to_string(),
            main: MainCondition {
                attribute: attribute.to_string(),
                choice: choice.to_string(),
            },
            conditions,
            substitute,
        });
        Ok(())
    }
}

// --- Token helpers ---

fn split_alias(args: &[String]) -> LineResult<(&str, &[String])> {
    match args.split_first() {
        Some((alias, rest)) => Ok((alias.as_str(), rest)),
        None => Err(LineError::syntax("missing rule alias")),
    }
}

/// `[*][+]choice` -> (choice, default, extended)
fn parse_job_ticket_choice(token: &str) -> LineResult<(&str, bool, bool)> {
    let (rest, is_default) = match token.strip_prefix(DEFAULT_MARKER) {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    let (choice, extended) = match rest.strip_prefix(EXTENDED_MARKER) {
        Some(choice) => (choice, true),
        None => (rest, false),
    };
    if choice.is_empty() {
        return Err(LineError::syntax(format!("empty choice [{token}]")));
    }
    Ok((choice, is_default, extended))
}

/// `attribute/choice` or `attribute/!choice`
fn parse_condition(token: &str) -> LineResult<Condition> {
    let (attribute, choice) = token
        .split_once('/')
        .ok_or_else(|| LineError::syntax(format!("[{token}] is not <attribute>/<choice>")))?;
    let (choice, must_match) = match choice.strip_prefix(NEGATE_MARKER) {
        Some(choice) => (choice, false),
        None => (choice, true),
    };
    if attribute.is_empty() || choice.is_empty() {
        return Err(LineError::syntax(format!(
            "[{token}] is not <attribute>/<choice>"
        )));
    }
    Ok(Condition::new(attribute, choice, must_match))
}

/// `*Keyword/Choice`; the keyword keeps its marker like mapped native keywords.
fn parse_native_value(token: &str) -> LineResult<NativeValue> {
    match token.split_once('/') {
        Some((keyword, choice)) if keyword.len() > 1 && !choice.is_empty() => Ok(NativeValue {
            keyword: keyword.to_string(),
            choice: choice.to_string(),
        }),
        _ => Err(LineError::syntax(format!(
            "[{token}] is not *<keyword>/<choice>"
        ))),
    }
}

/// Parse a cost amount with the configured decimal separator.
///
/// The other separator is not accepted, so "1,000.5" fails rather than
/// being read with a grouping character.
fn parse_cost(token: &str, decimal_separator: char) -> LineResult<Decimal> {
    let foreign = if decimal_separator == ',' { '.' } else { ',' };
    let invalid = || LineError::value(format!("[{token}] is not a valid cost"));
    if token.contains(foreign) {
        return Err(invalid());
    }
    let normalized = token.replace(decimal_separator, ".");
    Decimal::from_str(&normalized).map_err(|_| invalid())
}
