//! Field-level exclusion patterns over dependency coordinates.
//!
//! Each of the three coordinate fields is matched independently by a
//! [`FieldMatcher`]. A field is inactive when its bit is cleared in the
//! [`FieldMask`]; an inactive field, an empty pattern value, and the bare `*`
//! marker all match anything. A value containing `*` elsewhere is a fully
//! anchored regular expression (`.*`, `netty-.*`), not a shell glob: a `*`
//! that does not follow `.`, `)` or `]` is rejected, so `netty-*` fails
//! instead of silently matching only `netty`. Anything else is compared for
//! exact equality.

use crate::coordinate::Coordinate;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::BitOr;
use thiserror::Error;

/// The reserved marker that turns a pattern field into a wildcard.
pub const WILDCARD_MARKER: char = '*';

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid field mask {0:#05b}, expected a value in 0b000..=0b111")]
    InvalidMask(u8),
    #[error("invalid wildcard '{text}': {reason}")]
    InvalidWildcard { text: String, reason: String },
}

/// Three-bit activity mask: group = `0b100`, artifact = `0b010`, version = `0b001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldMask(u8);

impl FieldMask {
    pub const NONE: Self = Self(0b000);
    pub const VERSION: Self = Self(0b001);
    pub const ARTIFACT: Self = Self(0b010);
    pub const GROUP: Self = Self(0b100);
    pub const ALL: Self = Self(0b111);

    pub fn from_bits(bits: u8) -> Result<Self, PatternError> {
        if bits > Self::ALL.0 {
            return Err(PatternError::InvalidMask(bits));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for FieldMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for FieldMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Byte offset of a shell-glob style `*`: one that does not follow `.`, `)` or `]`.
fn glob_star(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().find_map(|(i, &b)| {
        let repeats = i > 0 && matches!(bytes[i - 1], b'.' | b')' | b']');
        (b == b'*' && !repeats).then_some(i)
    })
}

/// How a single coordinate field is matched.
#[derive(Debug, Clone)]
pub enum FieldMatcher {
    Any,
    Exact(String),
    Wildcard { text: String, regex: Regex },
}

impl FieldMatcher {
    pub fn parse(text: &str, active: bool) -> Result<Self, PatternError> {
        let text = text.trim();
        if !active || text.is_empty() || text == "*" {
            return Ok(Self::Any);
        }
        if !text.contains(WILDCARD_MARKER) {
            return Ok(Self::Exact(text.to_owned()));
        }
        if let Some(glob) = glob_star(text) {
            return Err(PatternError::InvalidWildcard {
                text: text.to_owned(),
                reason: format!(
                    "'*' at offset {glob} repeats nothing; wildcard fields are regular \
                     expressions, write '.*' to match any run of characters"
                ),
            });
        }
        let regex = Regex::new(&format!("^(?:{text})$")).map_err(|e| {
            PatternError::InvalidWildcard {
                text: text.to_owned(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::Wildcard {
            text: text.to_owned(),
            regex,
        })
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(text) => text == value,
            Self::Wildcard { regex, .. } => regex.is_match(value),
        }
    }

    /// The text this field contributes to a pattern key; empty for `Any`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => "",
            Self::Exact(text) | Self::Wildcard { text, .. } => text,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

/// A coordinate glob with field-level wildcards.
///
/// Identity is the canonical `group:artifact:version` key with inactive fields
/// blanked, so two patterns that match the same way compare equal.
#[derive(Debug, Clone)]
pub struct ExclusionPattern {
    group: FieldMatcher,
    artifact: FieldMatcher,
    version: FieldMatcher,
    key: String,
}

impl ExclusionPattern {
    pub fn new(
        group: &str,
        artifact: &str,
        version: &str,
        mask: FieldMask,
    ) -> Result<Self, PatternError> {
        let group = FieldMatcher::parse(group, mask.contains(FieldMask::GROUP))?;
        let artifact = FieldMatcher::parse(artifact, mask.contains(FieldMask::ARTIFACT))?;
        let version = FieldMatcher::parse(version, mask.contains(FieldMask::VERSION))?;
        let key = format!(
            "{}:{}:{}",
            group.as_str(),
            artifact.as_str(),
            version.as_str()
        );
        Ok(Self {
            group,
            artifact,
            version,
            key,
        })
    }

    /// The common two-argument form: group and artifact, any version.
    pub fn module(group: &str, artifact: &str) -> Result<Self, PatternError> {
        Self::new(group, artifact, "", FieldMask::ALL)
    }

    /// A pattern that matches every coordinate.
    pub fn any() -> Self {
        Self {
            group: FieldMatcher::Any,
            artifact: FieldMatcher::Any,
            version: FieldMatcher::Any,
            key: "::".to_owned(),
        }
    }

    pub fn matches(&self, coordinate: &Coordinate) -> bool {
        self.group.matches(&coordinate.group)
            && self.artifact.matches(&coordinate.artifact)
            && self.version.matches(&coordinate.version)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn group(&self) -> &FieldMatcher {
        &self.group
    }

    pub fn artifact(&self) -> &FieldMatcher {
        &self.artifact
    }

    pub fn version(&self) -> &FieldMatcher {
        &self.version
    }
}

/// True iff every active field of `pattern` accepts the corresponding field of `coordinate`.
pub fn matches(coordinate: &Coordinate, pattern: &ExclusionPattern) -> bool {
    pattern.matches(coordinate)
}

impl fmt::Display for ExclusionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl PartialEq for ExclusionPattern {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ExclusionPattern {}

impl PartialOrd for ExclusionPattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExclusionPattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Hash for ExclusionPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
