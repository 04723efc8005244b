use crate::coordinate::Coordinate;
use serde::{Deserialize, Serialize};

/// One node of an externally resolved dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub coordinate: Coordinate,
    pub direct: bool,
    /// The dependency that pulled this one in, when transitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Coordinate>,
    /// Fully-qualified class or package names contained in the artifact.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
}

impl ResolvedDependency {
    pub fn direct(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            direct: true,
            parent: None,
            packages: Vec::new(),
        }
    }

    pub fn transitive(coordinate: Coordinate, parent: Option<Coordinate>) -> Self {
        Self {
            coordinate,
            direct: false,
            parent,
            packages: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages.extend(packages.into_iter().map(Into::into));
        self
    }
}
