use shadeplan_schema::{Coordinate, ExclusionPattern};
use std::collections::BTreeSet;

/// The set of exclusion patterns a host provides for one target.
///
/// Additive only: there is no removal, and registering an equal pattern twice
/// leaves the set unchanged. Patterns are keyed by their canonical
/// `group:artifact:version` form.
#[derive(Debug, Clone, Default)]
pub struct ProvidedRegistry {
    patterns: BTreeSet<ExclusionPattern>,
}

impl ProvidedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern. Returns `false` when an equal pattern was already present.
    pub fn register(&mut self, pattern: ExclusionPattern) -> bool {
        self.patterns.insert(pattern)
    }

    /// True if any registered pattern matches `coordinate`.
    pub fn is_provided(&self, coordinate: &Coordinate) -> bool {
        self.matching(coordinate).is_some()
    }

    /// The first pattern (in key order) that matches `coordinate`.
    pub fn matching(&self, coordinate: &Coordinate) -> Option<&ExclusionPattern> {
        self.patterns.iter().find(|p| p.matches(coordinate))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExclusionPattern> {
        self.patterns.iter()
    }
}
