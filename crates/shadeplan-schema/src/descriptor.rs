use crate::coordinate::CoordinateError;
use crate::pattern::PatternError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read descriptor file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse descriptor: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported descriptor_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("base_package must not be empty")]
    EmptyBasePackage,
    #[error("target name must not be empty")]
    EmptyTargetName,
    #[error("target '{target}' is declared more than once")]
    DuplicateTargetName { target: String },
    #[error("target '{target}': {error}")]
    Coordinate {
        target: String,
        error: CoordinateError,
    },
    #[error("target '{target}': {error}")]
    Pattern { target: String, error: PatternError },
    #[error("target '{target}': unknown preset '{preset}'")]
    UnknownPreset { target: String, preset: String },
    #[error("target '{target}': relocation source must not be empty")]
    EmptyRelocationSource { target: String },
    #[error("target '{target}': relocation of '{prefix}' uses namespace 'explicit' without a destination")]
    MissingDestination { target: String, prefix: String },
    #[error("target '{target}': relocation of '{prefix}' sets a destination but namespace is not 'explicit'")]
    UnexpectedDestination { target: String, prefix: String },
}

/// The on-disk build descriptor (`shadeplan.toml`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DescriptorV1 {
    pub descriptor_version: u32,
    pub base_package: String,
    #[serde(default)]
    pub targets: BTreeMap<String, TargetSection>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TargetSection {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub include_transitive: Option<bool>,
    #[serde(default)]
    pub provided: Vec<ProvidedDecl>,
    #[serde(default)]
    pub shaded: Vec<String>,
    #[serde(default)]
    pub relocate: Vec<RelocateDecl>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDecl>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProvidedDecl {
    pub group: String,
    #[serde(default)]
    pub artifact: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub mask: Option<u8>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceMode {
    #[default]
    Shared,
    Platform,
    Explicit,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RelocateDecl {
    pub source: String,
    #[serde(default)]
    pub namespace: NamespaceMode,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub exceptions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DependencyDecl {
    pub coordinate: String,
    /// Defaults to `true` unless a parent is given.
    #[serde(default)]
    pub direct: Option<bool>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub packages: Vec<String>,
}

pub fn parse_descriptor_str(input: &str) -> Result<DescriptorV1, DescriptorError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_descriptor_file(path: impl AsRef<Path>) -> Result<DescriptorV1, DescriptorError> {
    let content = fs::read_to_string(path)?;
    parse_descriptor_str(&content)
}
