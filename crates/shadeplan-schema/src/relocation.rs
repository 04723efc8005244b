use crate::coordinate::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a relocation destination is derived from the source prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationNamespace {
    /// `<base>.shaded.<source>`
    Shared,
    /// `<base>.platform.<target>.shaded.<source>`
    Platform,
    /// A destination given verbatim.
    Explicit(String),
}

impl RelocationNamespace {
    pub fn destination(&self, base: &str, target: &str, source: &str) -> String {
        match self {
            Self::Shared => format!("{base}.shaded.{source}"),
            Self::Platform => format!("{base}.platform.{target}.shaded.{source}"),
            Self::Explicit(destination) => destination.clone(),
        }
    }
}

/// A package-prefix rewrite with nested exceptions that stay in place.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelocationRule {
    pub source: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exceptions: BTreeSet<String>,
}

impl RelocationRule {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: normalize_prefix(&source.into()),
            destination: normalize_prefix(&destination.into()),
            exceptions: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exceptions.insert(normalize_prefix(&exception.into()));
        self
    }

    /// True when `fqcn` falls under the source prefix.
    pub fn covers(&self, fqcn: &str) -> bool {
        is_under(fqcn, &self.source)
    }

    /// True when `fqcn` falls under one of the exceptions.
    pub fn is_excepted(&self, fqcn: &str) -> bool {
        self.exceptions.iter().any(|e| is_under(fqcn, e))
    }

    /// Rewrite `fqcn` under this rule, assuming [`covers`](Self::covers) holds.
    pub fn rewrite(&self, fqcn: &str) -> String {
        format!("{}{}", self.destination, &fqcn[self.source.len()..])
    }
}

/// A rewrite recorded in a bundle manifest for one embedded artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelocationEntry {
    pub artifact: Coordinate,
    pub original: String,
    pub relocated: String,
}

/// Package-segment aware prefix test: `a.b` covers `a.b` and `a.b.C`, not `a.bc`.
pub fn is_under(name: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match name.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// Trim whitespace and trailing dots from a package prefix.
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.trim().trim_end_matches('.').to_owned()
}
