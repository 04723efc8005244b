use crate::CoreError;
use shadeplan_schema::{is_under, RelocationRule, TargetId};

/// The ordered set of relocation rules declared for one target.
///
/// Rules are kept sorted by source prefix. Adding a rule validates it against
/// the rules already present so that [`apply`] is deterministic and idempotent:
/// sources are unique, every exception is strictly nested under its source, and
/// no destination falls under any source.
#[derive(Debug, Clone, Default)]
pub struct RelocationPlan {
    rules: Vec<RelocationRule>,
}

impl RelocationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: &TargetId, rule: RelocationRule) -> Result<(), CoreError> {
        validate_rule(target, &rule)?;

        for existing in &self.rules {
            if existing.source == rule.source {
                return Err(CoreError::DuplicateRelocation {
                    target: target.clone(),
                    prefix: rule.source,
                });
            }
            if is_under(&rule.destination, &existing.source) {
                return Err(CoreError::InvalidRelocationDestination {
                    target: target.clone(),
                    prefix: existing.source.clone(),
                    destination: rule.destination,
                });
            }
            if is_under(&existing.destination, &rule.source) {
                return Err(CoreError::InvalidRelocationDestination {
                    target: target.clone(),
                    prefix: rule.source,
                    destination: existing.destination.clone(),
                });
            }
        }

        let pos = self
            .rules
            .binary_search_by(|r| r.source.cmp(&rule.source))
            .unwrap_or_else(|p| p);
        self.rules.insert(pos, rule);
        Ok(())
    }

    pub fn rules(&self) -> &[RelocationRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite `fqcn` with this plan; see [`apply`] for the segment-aware matching.
    pub fn apply(&self, fqcn: &str) -> String {
        apply(fqcn, &self.rules)
    }
}

fn validate_rule(target: &TargetId, rule: &RelocationRule) -> Result<(), CoreError> {
    if rule.destination.is_empty() || is_under(&rule.destination, &rule.source) {
        return Err(CoreError::InvalidRelocationDestination {
            target: target.clone(),
            prefix: rule.source.clone(),
            destination: rule.destination.clone(),
        });
    }
    for exception in &rule.exceptions {
        if exception == &rule.source || !is_under(exception, &rule.source) {
            return Err(CoreError::InvalidRelocationException {
                target: target.clone(),
                prefix: rule.source.clone(),
                exception: exception.clone(),
            });
        }
    }
    Ok(())
}

/// The rule with the longest source prefix covering `fqcn`.
pub fn longest_match<'a>(fqcn: &str, rules: &'a [RelocationRule]) -> Option<&'a RelocationRule> {
    rules
        .iter()
        .filter(|r| r.covers(fqcn))
        .max_by_key(|r| r.source.len())
}

/// Rewrite `fqcn` under the most specific covering rule.
///
/// Returns `fqcn` unchanged when no rule covers it, or when the covering rule
/// has an exception that does. A shorter rule is never consulted once a longer
/// one matched.
///
/// Coverage is per package segment rather than a raw string prefix: a rule for
/// `a.b` rewrites `a.b` and `a.b.C` but leaves `a.bc.D` alone. Exceptions are
/// matched the same way.
pub fn apply(fqcn: &str, rules: &[RelocationRule]) -> String {
    match longest_match(fqcn, rules) {
        Some(rule) if !rule.is_excepted(fqcn) => rule.rewrite(fqcn),
        _ => fqcn.to_owned(),
    }
}
