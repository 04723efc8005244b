use crate::coordinate::Coordinate;
use crate::dependency::ResolvedDependency;
use crate::descriptor::{
    DependencyDecl, DescriptorError, DescriptorV1, NamespaceMode, RelocateDecl, TargetSection,
};
use crate::pattern::FieldMask;
use crate::preset::get_preset;
use crate::relocation::{normalize_prefix, RelocationNamespace};
use crate::types::TargetId;
use std::collections::BTreeMap;

/// Outcome of normalizing one target section. Errors stay scoped to their target.
pub type TargetResult = Result<NormalizedTarget, DescriptorError>;

/// A descriptor whose top-level fields validated, with each target normalized independently.
#[derive(Debug)]
pub struct NormalizedDescriptor {
    pub base_package: String,
    pub targets: BTreeMap<TargetId, TargetResult>,
}

/// Canonical, trimmed representation of one target section with its preset applied.
///
/// Declarations keep their declared order (preset entries first) because they
/// are replayed as configuration calls; sets such as `shaded` and each
/// dependency's `packages` are sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTarget {
    pub name: TargetId,
    pub base_package: String,
    pub preset: Option<String>,
    pub include_transitive: bool,
    pub provided: Vec<ProvidedEntry>,
    pub relocations: Vec<RelocationDirective>,
    pub shaded: Vec<Coordinate>,
    pub graph: Vec<ResolvedDependency>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedEntry {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub mask: FieldMask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationDirective {
    pub source: String,
    pub namespace: RelocationNamespace,
    pub exceptions: Vec<String>,
}

impl DescriptorV1 {
    /// Validate top-level fields and normalize every target.
    pub fn normalize(&self) -> Result<NormalizedDescriptor, DescriptorError> {
        if self.descriptor_version != 1 {
            return Err(DescriptorError::UnsupportedVersion(self.descriptor_version));
        }

        let base_package = normalize_prefix(&self.base_package);
        if base_package.is_empty() {
            return Err(DescriptorError::EmptyBasePackage);
        }

        let mut targets = BTreeMap::new();
        for (name, section) in &self.targets {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(DescriptorError::EmptyTargetName);
            }
            let id = TargetId::new(trimmed);
            // Names that collide after trimming poison the target instead of replacing it.
            if targets.contains_key(&id) {
                targets.insert(
                    id,
                    Err(DescriptorError::DuplicateTargetName {
                        target: trimmed.to_owned(),
                    }),
                );
                continue;
            }
            targets.insert(id, section.normalize(trimmed, &base_package));
        }

        Ok(NormalizedDescriptor {
            base_package,
            targets,
        })
    }
}

impl TargetSection {
    pub fn normalize(&self, target: &str, base_package: &str) -> TargetResult {
        let preset = match self.preset.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(get_preset(name).ok_or_else(|| {
                DescriptorError::UnknownPreset {
                    target: target.to_owned(),
                    preset: name.to_owned(),
                }
            })?),
        };

        let mut provided = Vec::new();
        if let Some(preset) = preset {
            for (group, artifact) in preset.provided {
                provided.push(ProvidedEntry {
                    group: (*group).to_owned(),
                    artifact: (*artifact).to_owned(),
                    version: String::new(),
                    mask: FieldMask::ALL,
                });
            }
        }
        for decl in &self.provided {
            let mask = match decl.mask {
                Some(bits) => FieldMask::from_bits(bits).map_err(|error| {
                    DescriptorError::Pattern {
                        target: target.to_owned(),
                        error,
                    }
                })?,
                None => FieldMask::ALL,
            };
            provided.push(ProvidedEntry {
                group: decl.group.trim().to_owned(),
                artifact: decl.artifact.trim().to_owned(),
                version: decl.version.trim().to_owned(),
                mask,
            });
        }

        let relocations = self
            .relocate
            .iter()
            .map(|decl| normalize_relocation(target, decl))
            .collect::<Result<Vec<_>, _>>()?;

        let mut shaded = self
            .shaded
            .iter()
            .map(|s| parse_coordinate(target, s))
            .collect::<Result<Vec<_>, _>>()?;
        shaded.sort();
        shaded.dedup();

        let graph = self
            .dependencies
            .iter()
            .map(|decl| normalize_dependency(target, decl))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NormalizedTarget {
            name: TargetId::new(target),
            base_package: base_package.to_owned(),
            preset: preset.map(|p| p.name.to_owned()),
            include_transitive: self
                .include_transitive
                .or(preset.map(|p| p.include_transitive))
                .unwrap_or(false),
            provided,
            relocations,
            shaded,
            graph,
        })
    }
}

fn normalize_relocation(
    target: &str,
    decl: &RelocateDecl,
) -> Result<RelocationDirective, DescriptorError> {
    let source = normalize_prefix(&decl.source);
    if source.is_empty() {
        return Err(DescriptorError::EmptyRelocationSource {
            target: target.to_owned(),
        });
    }

    let destination = decl
        .destination
        .as_deref()
        .map(normalize_prefix)
        .filter(|d| !d.is_empty());
    let namespace = match (decl.namespace, destination) {
        (NamespaceMode::Explicit, Some(destination)) => RelocationNamespace::Explicit(destination),
        (NamespaceMode::Explicit, None) => {
            return Err(DescriptorError::MissingDestination {
                target: target.to_owned(),
                prefix: source,
            })
        }
        (_, Some(_)) => {
            return Err(DescriptorError::UnexpectedDestination {
                target: target.to_owned(),
                prefix: source,
            })
        }
        (NamespaceMode::Shared, None) => RelocationNamespace::Shared,
        (NamespaceMode::Platform, None) => RelocationNamespace::Platform,
    };

    Ok(RelocationDirective {
        source,
        namespace,
        exceptions: normalize_string_list(&decl.exceptions),
    })
}

fn normalize_dependency(
    target: &str,
    decl: &DependencyDecl,
) -> Result<ResolvedDependency, DescriptorError> {
    let coordinate = parse_coordinate(target, &decl.coordinate)?;
    let parent = decl
        .parent
        .as_deref()
        .map(|p| parse_coordinate(target, p))
        .transpose()?;
    let direct = decl.direct.unwrap_or(parent.is_none());

    Ok(ResolvedDependency {
        coordinate,
        direct,
        parent,
        packages: normalize_string_list(&decl.packages),
    })
}

fn parse_coordinate(target: &str, notation: &str) -> Result<Coordinate, DescriptorError> {
    Coordinate::parse(notation).map_err(|error| DescriptorError::Coordinate {
        target: target.to_owned(),
        error,
    })
}

fn normalize_string_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = values
        .iter()
        .map(String::as_str)
        .map(normalize_prefix)
        .filter(|v| !v.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
