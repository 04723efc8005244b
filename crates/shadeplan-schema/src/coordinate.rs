use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("invalid coordinate '{0}', expected 'group:artifact[:version]'")]
    Malformed(String),
}

/// A `(group, artifact, version)` triple identifying one dependency artifact.
///
/// Any field may be empty, meaning "unspecified". Ordering is by group, then
/// artifact, then version, which is the order manifests are emitted in.
/// Serializes as the `group:artifact[:version]` notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Parse `group:artifact` or `group:artifact:version`. Fields are trimmed.
    pub fn parse(notation: &str) -> Result<Self, CoordinateError> {
        let parts: Vec<&str> = notation.split(':').map(str::trim).collect();
        match parts.as_slice() {
            [group, artifact] => Ok(Self::new(*group, *artifact, "")),
            [group, artifact, version] => Ok(Self::new(*group, *artifact, *version)),
            _ => Err(CoordinateError::Malformed(notation.to_owned())),
        }
    }

    /// The `(group, artifact)` pair, ignoring version.
    pub fn module(&self) -> (&str, &str) {
        (&self.group, &self.artifact)
    }

    /// `group:artifact`, as used for shaded-set membership checks.
    pub fn module_key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    /// True when both group and artifact are present.
    pub fn is_resolvable(&self) -> bool {
        !self.group.trim().is_empty() && !self.artifact.trim().is_empty()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}:{}", self.group, self.artifact)
        } else {
            write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
        }
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Coordinate> for String {
    fn from(value: Coordinate) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_and_three_part_notation() {
        let c = Coordinate::parse("io.netty:netty-handler").unwrap();
        assert_eq!(c.module(), ("io.netty", "netty-handler"));
        assert!(c.version.is_empty());

        let c = Coordinate::parse("io.netty:netty-buffer:4.1.66").unwrap();
        assert_eq!(c.version, "4.1.66");
    }

    #[test]
    fn rejects_wrong_part_count() {
        assert!(Coordinate::parse("io.netty").is_err());
        assert!(Coordinate::parse("a:b:c:d").is_err());
    }

    #[test]
    fn empty_fields_are_kept_but_unresolvable() {
        let c = Coordinate::parse(":netty-handler:1.0").unwrap();
        assert!(c.group.is_empty());
        assert!(!c.is_resolvable());
        assert!(Coordinate::new("g", "a", "").is_resolvable());
    }

    #[test]
    fn display_matches_parse() {
        for s in ["g:a", "g:a:1.0", ":a:1.0"] {
            assert_eq!(Coordinate::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn orders_by_group_then_artifact_then_version() {
        let mut list = vec![
            Coordinate::new("b", "a", "1"),
            Coordinate::new("a", "z", "1"),
            Coordinate::new("a", "b", "2"),
            Coordinate::new("a", "b", "1"),
        ];
        list.sort();
        let rendered: Vec<String> = list.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["a:b:1", "a:b:2", "a:z:1", "b:a:1"]);
    }

    #[test]
    fn serializes_as_notation_string() {
        let c = Coordinate::new("io.netty", "netty-buffer", "4.1.66");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"io.netty:netty-buffer:4.1.66\"");
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
