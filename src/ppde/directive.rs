//! Classification of logical lines into directives.
//!
//! Each directive family has its own token-arity contract; a line that
//! fits none of them is a syntax error.

use crate::error::LineError;
use crate::rules::JobTicketScope;

pub const LANDSCAPE_ORIENTATION: &str = "*LandscapeOrientation:";
pub const SP_JOBTICKET_PFX: &str = "*SPJobTicket";
pub const SP_RULE_PFX: &str = "*SPRule";
pub const SP_EXTRA_PFX: &str = "*SPExtra";
pub const SP_SUBST_PFX: &str = "*SPSubst";
pub const SP_CONSTRAINT: &str = "*SPConstraint:";

/// Sub-keyword of a `*SPJobTicket` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTicketKind {
    pub scope: JobTicketScope,
    pub cost: bool,
}

/// Sub-keyword of a `*SPRule` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    NumberUp,
    Unhandled(String),
}

/// A classified logical line. Arguments exclude the directive keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    Landscape {
        value: &'a str,
    },
    JobTicket {
        kind: JobTicketKind,
        args: &'a [String],
    },
    Rule {
        kind: RuleKind,
        args: &'a [String],
    },
    Extra {
        attribute: &'a str,
        choice: &'a str,
        args: &'a [String],
    },
    Subst {
        attribute: &'a str,
        choice: &'a str,
        args: &'a [String],
    },
    Constraint {
        args: &'a [String],
    },
    Constant {
        name: &'a str,
    },
    Mapping {
        native_keyword: &'a str,
        abstract_keyword: &'a str,
    },
    ChoiceMapping {
        native_keyword: &'a str,
        native_choice: &'a str,
        abstract_choice: &'a str,
    },
}

impl<'a> Directive<'a> {
    /// Classify a non-empty token list by its keyword shape.
    pub fn classify(tokens: &'a [String]) -> Result<Self, LineError> {
        let Some((first, args)) = tokens.split_first() else {
            return Err(LineError::syntax("empty line"));
        };
        let keyword = first.as_str();

        if keyword == LANDSCAPE_ORIENTATION {
            return match args {
                [value] => Ok(Self::Landscape { value }),
                _ => Err(arity(keyword, "exactly 1 value", args.len())),
            };
        }

        if let Some(sub) = keyword.strip_prefix(SP_JOBTICKET_PFX) {
            if args.is_empty() {
                return Err(arity(keyword, "at least 1 argument", 0));
            }
            let kind = job_ticket_kind(sub)
                .ok_or_else(|| LineError::syntax(format!("unknown job ticket keyword [{keyword}]")))?;
            return Ok(Self::JobTicket { kind, args });
        }

        if let Some(sub) = keyword.strip_prefix(SP_RULE_PFX) {
            return Ok(Self::Rule {
                kind: rule_kind(sub),
                args,
            });
        }

        if keyword.starts_with(SP_EXTRA_PFX) {
            let (attribute, choice) = main_condition(keyword, args)?;
            return Ok(Self::Extra {
                attribute,
                choice,
                args,
            });
        }

        if keyword.starts_with(SP_SUBST_PFX) {
            let (attribute, choice) = main_condition(keyword, args)?;
            return Ok(Self::Subst {
                attribute,
                choice,
                args,
            });
        }

        if keyword == SP_CONSTRAINT {
            return match args.len() {
                3 => Ok(Self::Constraint { args }),
                n => Err(arity(keyword, "an alias and exactly 2 conditions", n)),
            };
        }

        match tokens {
            [name] => Ok(Self::Constant { name }),
            [native_keyword, abstract_keyword] => Ok(Self::Mapping {
                native_keyword,
                abstract_keyword,
            }),
            [native_keyword, native_choice, abstract_choice] => Ok(Self::ChoiceMapping {
                native_keyword,
                native_choice,
                abstract_choice,
            }),
            _ => Err(LineError::syntax(format!(
                "unrecognized directive [{keyword}] with {} tokens",
                tokens.len()
            ))),
        }
    }
}

fn arity(keyword: &str, expected: &str, found: usize) -> LineError {
    LineError::syntax(format!(
        "[{keyword}] expects {expected}, found {found} argument(s)"
    ))
}

/// `Media`, `/Media:`, `Media/Cost:` and `/Media/Cost:` are all accepted.
fn job_ticket_kind(sub: &str) -> Option<JobTicketKind> {
    let sub = sub.strip_suffix(':').unwrap_or(sub);
    let sub = sub.strip_prefix('/').unwrap_or(sub);
    let (scope, cost) = match sub.split_once('/') {
        Some((scope, "Cost")) => (scope, true),
        Some(_) => return None,
        None => (sub, false),
    };
    JobTicketScope::from_keyword(scope).map(|scope| JobTicketKind { scope, cost })
}

fn rule_kind(sub: &str) -> RuleKind {
    let sub = sub.strip_suffix(':').unwrap_or(sub);
    if sub.to_ascii_lowercase().ends_with("number-up") {
        RuleKind::NumberUp
    } else {
        RuleKind::Unhandled(sub.trim_start_matches(['/', '*']).to_string())
    }
}

/// `*SPExtra/<attr>/<choice>:` -> (attr, choice), with at least an alias and
/// one more token following.
fn main_condition<'a>(
    keyword: &'a str,
    args: &[String],
) -> Result<(&'a str, &'a str), LineError> {
    let stripped = keyword.strip_suffix(':').unwrap_or(keyword);
    let parts: Vec<&str> = stripped.split('/').collect();
    if parts.len() < 3 || parts[1].is_empty() || parts[2].is_empty() {
        return Err(LineError::syntax(format!(
            "[{keyword}] must have the form <keyword>/<attribute>/<choice>:"
        )));
    }
    if args.len() < 2 {
        return Err(arity(keyword, "an alias and at least 1 more token", args.len()));
    }
    Ok((parts[1], parts[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_landscape() {
        let t = tokens("*LandscapeOrientation: Plus90");
        assert_eq!(Directive::classify(&t), Ok(Directive::Landscape { value: "Plus90" }));

        let t = tokens("*LandscapeOrientation: Plus90 Minus90");
        assert!(matches!(Directive::classify(&t), Err(LineError::Syntax(_))));
    }

    #[test]
    fn test_job_ticket_kinds() {
        for (line, scope, cost) in [
            ("*SPJobTicket/Media: media-color", JobTicketScope::Media, false),
            ("*SPJobTicketMedia: media-color", JobTicketScope::Media, false),
            ("*SPJobTicket/Sheet/Cost: 0.1 a", JobTicketScope::Sheet, true),
            ("*SPJobTicketCopy/Cost: 0.1 a", JobTicketScope::Copy, true),
            ("*SPJobTicket/Set: x", JobTicketScope::Set, false),
        ] {
            let t = tokens(line);
            match Directive::classify(&t) {
                Ok(Directive::JobTicket { kind, .. }) => {
                    assert_eq!(kind, JobTicketKind { scope, cost }, "{line}")
                }
                other => panic!("{line}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_job_ticket_unknown_sub_keyword() {
        let t = tokens("*SPJobTicket/Page: x");
        assert!(matches!(Directive::classify(&t), Err(LineError::Syntax(_))));
        let t = tokens("*SPJobTicket/Media/Price: x");
        assert!(matches!(Directive::classify(&t), Err(LineError::Syntax(_))));
    }

    #[test]
    fn test_job_ticket_needs_argument() {
        let t = tokens("*SPJobTicket/Media:");
        assert!(matches!(Directive::classify(&t), Err(LineError::Syntax(_))));
    }

    #[test]
    fn test_rule_kinds() {
        let t = tokens("*SPRule/number-up: a b");
        assert!(matches!(
            Directive::classify(&t),
            Ok(Directive::Rule { kind: RuleKind::NumberUp, .. })
        ));
        let t = tokens("*SPRule*foo/Number-Up: a b");
        assert!(matches!(
            Directive::classify(&t),
            Ok(Directive::Rule { kind: RuleKind::NumberUp, .. })
        ));
        let t = tokens("*SPRule/booklet: a b");
        assert_eq!(
            Directive::classify(&t),
            Ok(Directive::Rule {
                kind: RuleKind::Unhandled("booklet".to_string()),
                args: &t[1..],
            })
        );
    }

    #[test]
    fn test_extra_and_subst_main_condition() {
        let t = tokens("*SPExtra/media-type/labels: l1 *MediaWeight/Heavy");
        assert_eq!(
            Directive::classify(&t),
            Ok(Directive::Extra {
                attribute: "media-type",
                choice: "labels",
                args: &t[1..],
            })
        );

        let t = tokens("*SPSubst/media-type/labels: s1 *Thick");
        assert!(matches!(
            Directive::classify(&t),
            Ok(Directive::Subst { attribute: "media-type", choice: "labels", .. })
        ));
    }

    #[test]
    fn test_extra_shape_errors() {
        let t = tokens("*SPExtra/media-type: l1 *MediaWeight/Heavy");
        assert!(matches!(Directive::classify(&t), Err(LineError::Syntax(_))));
        let t = tokens("*SPExtra/media-type/labels: l1");
        assert!(matches!(Directive::classify(&t), Err(LineError::Syntax(_))));
    }

    #[test]
    fn test_constraint_arity() {
        let t = tokens("*SPConstraint: c1 media-color/blue sides/two-sided-long-edge");
        assert!(matches!(Directive::classify(&t), Ok(Directive::Constraint { .. })));
        let t = tokens("*SPConstraint: c1 media-color/blue");
        assert!(matches!(Directive::classify(&t), Err(LineError::Syntax(_))));
    }

    #[test]
    fn test_plain_shapes() {
        let t = tokens("*SPSomeConstant");
        assert_eq!(Directive::classify(&t), Ok(Directive::Constant { name: "*SPSomeConstant" }));

        let t = tokens("*MediaType media-type");
        assert_eq!(
            Directive::classify(&t),
            Ok(Directive::Mapping {
                native_keyword: "*MediaType",
                abstract_keyword: "media-type",
            })
        );

        let t = tokens("*MediaType *Plain stationery");
        assert_eq!(
            Directive::classify(&t),
            Ok(Directive::ChoiceMapping {
                native_keyword: "*MediaType",
                native_choice: "*Plain",
                abstract_choice: "stationery",
            })
        );

        let t = tokens("a b c d");
        assert!(matches!(Directive::classify(&t), Err(LineError::Syntax(_))));
    }
}
