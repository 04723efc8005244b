use crate::profile::TargetProfile;
use crate::relocation::longest_match;
use crate::CoreError;
use shadeplan_schema::{
    BundleDecisions, BundleManifest, Coordinate, RelocationEntry, ResolvedDependency,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// A graph entry after merging duplicate coordinates.
#[derive(Debug, Default)]
struct Node {
    direct: bool,
    parent: Option<Coordinate>,
    packages: BTreeSet<String>,
}

/// Decide, for one target, which dependencies are embedded, excluded, or left
/// to the host, and which contained names get rewritten.
///
/// A dependency is excluded when a provided pattern matches it or when its
/// `group:artifact` is already shaded into the main artifact. Surviving direct
/// dependencies are embedded; surviving transitive ones are embedded only when
/// the target bundles transitives, and are otherwise left external. Relocation
/// entries are recorded for embedded artifacts only.
pub fn resolve_bundle(
    profile: &TargetProfile,
    graph: &[ResolvedDependency],
    already_shaded: &BTreeSet<Coordinate>,
) -> Result<BundleManifest, CoreError> {
    let target = profile.id();

    let mut nodes: BTreeMap<Coordinate, Node> = BTreeMap::new();
    for dep in graph {
        if !dep.coordinate.is_resolvable() {
            return Err(CoreError::UnresolvedCoordinate {
                target: target.clone(),
                coordinate: dep.coordinate.to_string(),
            });
        }
        let node = nodes.entry(dep.coordinate.clone()).or_default();
        node.direct |= dep.direct;
        if node.parent.is_none() {
            node.parent.clone_from(&dep.parent);
        }
        node.packages.extend(dep.packages.iter().cloned());
    }

    let shaded: BTreeSet<(&str, &str)> = already_shaded.iter().map(Coordinate::module).collect();

    let mut decisions = BundleDecisions {
        rules: profile.rules().to_vec(),
        ..BundleDecisions::default()
    };

    for (coordinate, node) in &nodes {
        if let Some(pattern) = profile.registry().matching(coordinate) {
            debug!("{target}: not including {coordinate}, provided by host ({pattern})");
            decisions.excluded.insert(coordinate.clone());
            continue;
        }
        if shaded.contains(&coordinate.module()) {
            debug!("{target}: not including {coordinate}, already shaded");
            decisions.excluded.insert(coordinate.clone());
            continue;
        }

        if node.direct {
            debug!("{target}: including direct dependency {coordinate}");
        } else if profile.include_transitive() {
            match &node.parent {
                Some(parent) => {
                    debug!("{target}: including {coordinate} via jar-in-jar (from {parent})");
                }
                None => debug!("{target}: including {coordinate} via jar-in-jar"),
            }
        } else {
            debug!("{target}: leaving transitive {coordinate} to the host");
            decisions.external.insert(coordinate.clone());
            continue;
        }

        decisions.embed.insert(coordinate.clone());
        for name in &node.packages {
            let Some(rule) = longest_match(name, profile.rules()) else {
                continue;
            };
            if rule.is_excepted(name) {
                debug!("{target}: {name} kept in place by exception of {}", rule.source);
                continue;
            }
            decisions.relocate.push(RelocationEntry {
                artifact: coordinate.clone(),
                original: name.clone(),
                relocated: rule.rewrite(name),
            });
        }
    }

    info!(
        "{target}: {} embedded, {} excluded, {} external, {} relocation(s)",
        decisions.embed.len(),
        decisions.excluded.len(),
        decisions.external.len(),
        decisions.relocate.len()
    );

    Ok(BundleManifest::from_decisions(
        target.clone(),
        profile.include_transitive(),
        decisions,
    ))
}
