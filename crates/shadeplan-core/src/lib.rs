//! Provisioning and relocation resolver for shadeplan.
//!
//! This crate turns declared configuration into bundle decisions: the per-target
//! `ProvidedRegistry` of host-supplied exclusion patterns, the `RelocationPlan` of
//! package-prefix rewrites with longest-prefix-wins matching, the phase-guarded
//! `TargetProfile` that owns both, the bundle resolver that combines them with an
//! externally resolved dependency graph, and the `Engine` that drives every target
//! of a build descriptor independently.

pub mod engine;
pub mod lifecycle;
pub mod profile;
pub mod registry;
pub mod relocation;
pub mod resolver;

pub use engine::{Engine, ResolveReport};
pub use lifecycle::{validate_transition, Phase};
pub use profile::TargetProfile;
pub use registry::ProvidedRegistry;
pub use relocation::{apply, longest_match, RelocationPlan};
pub use resolver::resolve_bundle;

use shadeplan_schema::TargetId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("target '{target}': dependency '{coordinate}' has no resolvable group/artifact")]
    UnresolvedCoordinate { target: TargetId, coordinate: String },
    #[error(
        "target '{target}': relocation exception '{exception}' is not nested under source prefix '{prefix}'"
    )]
    InvalidRelocationException {
        target: TargetId,
        prefix: String,
        exception: String,
    },
    #[error("target '{target}': cannot {operation} in phase '{phase}'")]
    PhaseViolation {
        target: TargetId,
        operation: String,
        phase: Phase,
    },
    #[error("target '{target}': relocation source '{prefix}' is declared more than once")]
    DuplicateRelocation { target: TargetId, prefix: String },
    #[error(
        "target '{target}': relocation destination '{destination}' is invalid under source prefix '{prefix}'"
    )]
    InvalidRelocationDestination {
        target: TargetId,
        prefix: String,
        destination: String,
    },
    #[error("target '{target}': {error}")]
    Pattern {
        target: TargetId,
        error: shadeplan_schema::PatternError,
    },
    #[error("{reason}")]
    InvalidTarget { target: TargetId, reason: String },
    #[error("unknown target: {0}")]
    UnknownTarget(String),
    #[error("descriptor error: {0}")]
    Descriptor(#[from] shadeplan_schema::DescriptorError),
    #[error("bundle error: {0}")]
    Bundle(#[from] shadeplan_schema::BundleError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// The target an error is scoped to, when it has one.
    pub fn target(&self) -> Option<&TargetId> {
        match self {
            Self::UnresolvedCoordinate { target, .. }
            | Self::InvalidRelocationException { target, .. }
            | Self::PhaseViolation { target, .. }
            | Self::DuplicateRelocation { target, .. }
            | Self::InvalidRelocationDestination { target, .. }
            | Self::Pattern { target, .. }
            | Self::InvalidTarget { target, .. } => Some(target),
            _ => None,
        }
    }
}
