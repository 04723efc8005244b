use crate::profile::TargetProfile;
use crate::CoreError;
use shadeplan_schema::{
    parse_descriptor_file, BundleManifest, DescriptorV1, ManifestFormat, NormalizedDescriptor,
    NormalizedTarget, TargetId,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Drives every target of a build descriptor through configuration and resolution.
///
/// Targets are independent: each gets its own [`TargetProfile`], and a target
/// whose section is invalid or whose resolution fails is reported without
/// affecting the others.
pub struct Engine {
    descriptor: NormalizedDescriptor,
}

/// Per-target outcomes of one resolution run, ordered by target name.
#[derive(Debug)]
pub struct ResolveReport {
    pub outcomes: BTreeMap<TargetId, Result<BundleManifest, CoreError>>,
}

impl Engine {
    /// Validate a parsed descriptor. Only descriptor-level errors fail here;
    /// problems inside a target section surface when that target is configured.
    pub fn new(descriptor: &DescriptorV1) -> Result<Self, CoreError> {
        let descriptor = descriptor.normalize()?;
        debug!(
            "descriptor for {} declares {} target(s)",
            descriptor.base_package,
            descriptor.targets.len()
        );
        Ok(Self { descriptor })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        info!("loading descriptor {}", path.display());
        let descriptor = parse_descriptor_file(path)?;
        Self::new(&descriptor)
    }

    /// Configure and resolve every target of `descriptor`.
    pub fn resolve_descriptor(descriptor: &DescriptorV1) -> Result<ResolveReport, CoreError> {
        Ok(Self::new(descriptor)?.resolve_all())
    }

    pub fn base_package(&self) -> &str {
        &self.descriptor.base_package
    }

    pub fn target_names(&self) -> impl Iterator<Item = &TargetId> {
        self.descriptor.targets.keys()
    }

    fn normalized(&self, name: &str) -> Result<(&TargetId, &NormalizedTarget), CoreError> {
        let (id, section) = self
            .descriptor
            .targets
            .get_key_value(name)
            .ok_or_else(|| CoreError::UnknownTarget(name.to_owned()))?;
        let target = section.as_ref().map_err(|e| CoreError::InvalidTarget {
            target: id.clone(),
            reason: e.to_string(),
        })?;
        Ok((id, target))
    }

    /// Build the target's profile by replaying its declarations. The profile is
    /// returned still in the configuring phase.
    pub fn configure(&self, name: &str) -> Result<TargetProfile, CoreError> {
        let (_, target) = self.normalized(name)?;
        TargetProfile::from_normalized(target)
    }

    /// Configure every target without resolving, for validation.
    pub fn check(&self) -> BTreeMap<TargetId, Result<TargetProfile, CoreError>> {
        self.target_names()
            .map(|id| (id.clone(), self.configure(id)))
            .collect()
    }

    pub fn resolve_target(&self, name: &str) -> Result<BundleManifest, CoreError> {
        let (_, target) = self.normalized(name)?;
        let mut profile = TargetProfile::from_normalized(target)?;
        let shaded: BTreeSet<_> = target.shaded.iter().cloned().collect();
        profile.resolve(&target.graph, &shaded)
    }

    pub fn resolve_all(&self) -> ResolveReport {
        self.resolve_ids(self.target_names())
    }

    /// Resolve only the named targets. Any unknown name fails the whole call
    /// before anything is resolved.
    pub fn resolve_selected<S: AsRef<str>>(&self, names: &[S]) -> Result<ResolveReport, CoreError> {
        let mut ids = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            let (id, _) = self
                .descriptor
                .targets
                .get_key_value(name)
                .ok_or_else(|| CoreError::UnknownTarget(name.to_owned()))?;
            ids.insert(id);
        }
        Ok(self.resolve_ids(ids.into_iter()))
    }

    fn resolve_ids<'a>(&self, ids: impl Iterator<Item = &'a TargetId>) -> ResolveReport {
        let outcomes: BTreeMap<_, _> = ids
            .map(|id| {
                let outcome = self.resolve_target(id);
                match &outcome {
                    Ok(manifest) => info!("{id}: resolved ({})", manifest.short_digest),
                    Err(e) => warn!("{id}: resolution failed: {e}"),
                }
                (id.clone(), outcome)
            })
            .collect();
        ResolveReport { outcomes }
    }
}

impl ResolveReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&TargetId, &BundleManifest)> {
        self.outcomes
            .iter()
            .filter_map(|(id, r)| r.as_ref().ok().map(|m| (id, m)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&TargetId, &CoreError)> {
        self.outcomes
            .iter()
            .filter_map(|(id, r)| r.as_ref().err().map(|e| (id, e)))
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.values().all(Result::is_ok)
    }

    pub fn get(&self, target: &str) -> Option<&Result<BundleManifest, CoreError>> {
        self.outcomes.get(target)
    }

    /// Write each successful manifest to `<dir>/<target>.bundle.<ext>` atomically.
    /// Failed targets are skipped. Returns the written paths in target order.
    pub fn write_manifests(
        &self,
        dir: impl AsRef<Path>,
        format: ManifestFormat,
    ) -> Result<Vec<PathBuf>, CoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for (id, manifest) in self.succeeded() {
            let path = dir.join(format!("{id}.bundle.{}", format.extension()));
            manifest.write_to_file(&path, format)?;
            debug!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadeplan_schema::parse_descriptor_str;

    const DESCRIPTOR: &str = r#"
descriptor_version = 1
base_package = "org.example"

[targets.good]
preset = "spigot"

[[targets.good.dependencies]]
coordinate = "org.example:lib:1.0"

[targets.bad_preset]
preset = "nope"

[targets.bad_rule]
[[targets.bad_rule.relocate]]
source = "a.b"
exceptions = ["a.c"]
"#;

    fn engine() -> Engine {
        Engine::new(&parse_descriptor_str(DESCRIPTOR).unwrap()).unwrap()
    }

    #[test]
    fn targets_fail_independently() {
        let report = engine().resolve_all();
        assert_eq!(report.outcomes.len(), 3);
        assert!(report.get("good").unwrap().is_ok());
        assert!(matches!(
            report.get("bad_preset"),
            Some(Err(CoreError::InvalidTarget { .. }))
        ));
        assert!(matches!(
            report.get("bad_rule"),
            Some(Err(CoreError::InvalidRelocationException { .. }))
        ));
        assert!(!report.is_success());
        assert_eq!(report.succeeded().count(), 1);
        assert_eq!(report.failed().count(), 2);
    }

    #[test]
    fn duplicate_trimmed_target_is_reported_not_dropped() {
        let input = "descriptor_version = 1\nbase_package = \"org.example\"\n\
                     [targets.velocity]\npreset = \"velocity\"\n\
                     [targets.\" velocity\"]\npreset = \"nope\"\n";
        let engine = Engine::new(&parse_descriptor_str(input).unwrap()).unwrap();
        let report = engine.resolve_all();
        assert!(!report.is_success());
        let Some(Err(CoreError::InvalidTarget { reason, .. })) = report.get("velocity") else {
            panic!("duplicate target must fail");
        };
        assert!(reason.contains("more than once"), "{reason}");
    }

    #[test]
    fn unknown_target_in_selection_fails_early() {
        let err = engine().resolve_selected(&["good", "missing"]).unwrap_err();
        assert!(matches!(err, CoreError::UnknownTarget(ref n) if n == "missing"));
    }

    #[test]
    fn selection_resolves_only_named_targets() {
        let report = engine().resolve_selected(&["good"]).unwrap();
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.is_success());
    }

    #[test]
    fn descriptor_level_error_aborts() {
        let descriptor = parse_descriptor_str(
            "descriptor_version = 2\nbase_package = \"org.example\"\n",
        )
        .unwrap();
        assert!(matches!(
            Engine::new(&descriptor),
            Err(CoreError::Descriptor(_))
        ));
    }

    #[test]
    fn write_manifests_skips_failed_targets() {
        let dir = tempfile::tempdir().unwrap();
        let report = engine().resolve_all();
        let written = report
            .write_manifests(dir.path(), ManifestFormat::Toml)
            .unwrap();
        assert_eq!(written, vec![dir.path().join("good.bundle.toml")]);
        let back = BundleManifest::read_from_file(&written[0]).unwrap();
        assert_eq!(&back, report.get("good").unwrap().as_ref().unwrap());
    }
}
