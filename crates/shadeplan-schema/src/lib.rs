//! Coordinates, exclusion patterns, relocation rules, build descriptors, and bundle
//! manifests for shadeplan.
//!
//! This crate defines the schema layer: dependency coordinates and the field-level
//! exclusion patterns matched against them (`ExclusionPattern`), package relocation
//! rules (`RelocationRule`), TOML build descriptor parsing (`DescriptorV1`) and its
//! per-target normalized form (`NormalizedTarget`), built-in platform presets, and the
//! deterministic per-target `BundleManifest` with its emitter.

pub mod bundle;
pub mod coordinate;
pub mod dependency;
pub mod descriptor;
pub mod normalize;
pub mod pattern;
pub mod preset;
pub mod relocation;
pub mod types;

pub use bundle::{
    emit, BundleDecisions, BundleError, BundleManifest, ManifestFormat, SerializedManifest,
    BUNDLE_MANIFEST_VERSION,
};
pub use coordinate::{Coordinate, CoordinateError};
pub use dependency::ResolvedDependency;
pub use descriptor::{
    parse_descriptor_file, parse_descriptor_str, DependencyDecl, DescriptorError, DescriptorV1,
    NamespaceMode, ProvidedDecl, RelocateDecl, TargetSection,
};
pub use normalize::{
    NormalizedDescriptor, NormalizedTarget, ProvidedEntry, RelocationDirective, TargetResult,
};
pub use pattern::{matches, ExclusionPattern, FieldMask, FieldMatcher, PatternError};
pub use preset::{get_preset, list_presets, Preset, BUILTIN_PRESETS};
pub use relocation::{
    is_under, normalize_prefix, RelocationEntry, RelocationNamespace, RelocationRule,
};
pub use types::{ManifestDigest, ShortDigest, TargetId};
