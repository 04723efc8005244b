use crate::lifecycle::{validate_transition, Phase};
use crate::registry::ProvidedRegistry;
use crate::relocation::RelocationPlan;
use crate::resolver::resolve_bundle;
use crate::CoreError;
use shadeplan_schema::{
    BundleManifest, Coordinate, ExclusionPattern, FieldMask, NormalizedTarget, RelocationNamespace,
    RelocationRule, ResolvedDependency, TargetId,
};
use std::collections::BTreeSet;
use tracing::debug;

/// One deployment target: its host-provided registry, its relocation plan, and
/// whether transitive dependencies are bundled.
///
/// A profile is configured by a strictly ordered series of calls, then resolved
/// exactly once. Every configuration call made after [`resolve`](Self::resolve)
/// fails with [`CoreError::PhaseViolation`].
#[derive(Debug, Clone)]
pub struct TargetProfile {
    id: TargetId,
    base_package: String,
    include_transitive: bool,
    registry: ProvidedRegistry,
    plan: RelocationPlan,
    phase: Phase,
}

impl TargetProfile {
    pub fn new(id: impl Into<TargetId>, base_package: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_package: base_package.into(),
            include_transitive: false,
            registry: ProvidedRegistry::new(),
            plan: RelocationPlan::new(),
            phase: Phase::Configuring,
        }
    }

    /// Build a profile by replaying a normalized target's declarations in order.
    pub fn from_normalized(target: &NormalizedTarget) -> Result<Self, CoreError> {
        let mut profile = Self::new(target.name.clone(), target.base_package.clone());
        profile.set_include_transitive(target.include_transitive)?;

        for entry in &target.provided {
            profile.register(&entry.group, &entry.artifact, &entry.version, entry.mask)?;
        }

        for directive in &target.relocations {
            let destination = directive.namespace.destination(
                &profile.base_package,
                &profile.id,
                &directive.source,
            );
            let rule = directive
                .exceptions
                .iter()
                .fold(RelocationRule::new(&directive.source, destination), |rule, e| {
                    rule.with_exception(e)
                });
            profile.add_relocation(rule)?;
        }

        debug!(
            "configured target {}: {} provided pattern(s), {} relocation rule(s), transitive={}",
            profile.id,
            profile.registry.len(),
            profile.plan.rules().len(),
            profile.include_transitive
        );
        Ok(profile)
    }

    pub fn id(&self) -> &TargetId {
        &self.id
    }

    pub fn base_package(&self) -> &str {
        &self.base_package
    }

    pub fn include_transitive(&self) -> bool {
        self.include_transitive
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn registry(&self) -> &ProvidedRegistry {
        &self.registry
    }

    pub fn plan(&self) -> &RelocationPlan {
        &self.plan
    }

    /// The relocation rules declared for this target, sorted by source prefix.
    pub fn rules(&self) -> &[RelocationRule] {
        self.plan.rules()
    }

    fn configure(&self, operation: &str) -> Result<(), CoreError> {
        validate_transition(&self.id, self.phase, Phase::Configuring, operation)
    }

    pub fn set_include_transitive(&mut self, enabled: bool) -> Result<(), CoreError> {
        self.configure("set transitive inclusion")?;
        self.include_transitive = enabled;
        Ok(())
    }

    /// `provided(group, artifact)`: any version of the module is host-supplied.
    pub fn provided(&mut self, group: &str, artifact: &str) -> Result<(), CoreError> {
        self.register(group, artifact, "", FieldMask::ALL)
    }

    /// `provided(group, artifact, version)`: only that exact version is host-supplied.
    pub fn provided_version(
        &mut self,
        group: &str,
        artifact: &str,
        version: &str,
    ) -> Result<(), CoreError> {
        self.register(group, artifact, version, FieldMask::ALL)
    }

    pub fn register(
        &mut self,
        group: &str,
        artifact: &str,
        version: &str,
        mask: FieldMask,
    ) -> Result<(), CoreError> {
        self.configure("register a provided dependency")?;
        let pattern = ExclusionPattern::new(group, artifact, version, mask).map_err(|error| {
            CoreError::Pattern {
                target: self.id.clone(),
                error,
            }
        })?;
        self.register_pattern(pattern)
    }

    pub fn register_pattern(&mut self, pattern: ExclusionPattern) -> Result<(), CoreError> {
        self.configure("register a provided dependency")?;
        if !self.registry.register(pattern.clone()) {
            debug!("{}: provided pattern {pattern} already registered", self.id);
        }
        Ok(())
    }

    pub fn is_provided(&self, coordinate: &Coordinate) -> bool {
        self.registry.is_provided(coordinate)
    }

    /// `relocate(source[, namespace])`.
    pub fn relocate(
        &mut self,
        source: &str,
        namespace: &RelocationNamespace,
    ) -> Result<(), CoreError> {
        let rule = self.rule_for(source, namespace);
        self.add_relocation(rule)
    }

    /// `relocateWithException(source, suffix)`: the exception is `source + suffix`.
    /// An empty suffix adds no exception.
    pub fn relocate_with_exception(
        &mut self,
        source: &str,
        exception_suffix: &str,
        namespace: &RelocationNamespace,
    ) -> Result<(), CoreError> {
        let mut rule = self.rule_for(source, namespace);
        if !exception_suffix.trim().is_empty() {
            let exception = format!("{}{}", rule.source, exception_suffix.trim());
            rule = rule.with_exception(exception);
        }
        self.add_relocation(rule)
    }

    pub fn add_relocation(&mut self, rule: RelocationRule) -> Result<(), CoreError> {
        self.configure("relocate")?;
        self.plan.add(&self.id, rule)
    }

    fn rule_for(&self, source: &str, namespace: &RelocationNamespace) -> RelocationRule {
        let source = shadeplan_schema::normalize_prefix(source);
        let destination = namespace.destination(&self.base_package, &self.id, &source);
        RelocationRule::new(source, destination)
    }

    /// Close the configuration phase and compute this target's bundle manifest.
    ///
    /// The phase moves to `Resolved` even when resolution fails, so a profile
    /// can never be reconfigured and resolved a second time.
    pub fn resolve(
        &mut self,
        graph: &[ResolvedDependency],
        already_shaded: &BTreeSet<Coordinate>,
    ) -> Result<BundleManifest, CoreError> {
        validate_transition(&self.id, self.phase, Phase::Resolved, "resolve")?;
        self.phase = Phase::Resolved;
        resolve_bundle(self, graph, already_shaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(s: &str) -> Coordinate {
        Coordinate::parse(s).unwrap()
    }

    #[test]
    fn two_argument_provided_matches_any_version() {
        let mut profile = TargetProfile::new("spigot", "org.example");
        profile.provided("com.google.code.gson", "gson").unwrap();
        assert!(profile.is_provided(&coord("com.google.code.gson:gson:2.8.0")));
        assert!(profile.is_provided(&coord("com.google.code.gson:gson:2.10.1")));
    }

    #[test]
    fn versioned_provided_matches_only_that_version() {
        let mut profile = TargetProfile::new("spigot", "org.example");
        profile
            .provided_version("com.google.code.gson", "gson", "2.8.0")
            .unwrap();
        assert!(profile.is_provided(&coord("com.google.code.gson:gson:2.8.0")));
        assert!(!profile.is_provided(&coord("com.google.code.gson:gson:2.10.1")));
    }

    #[test]
    fn relocate_modes_namespace_the_destination() {
        let mut profile = TargetProfile::new("velocity", "org.geysermc.geyser");
        profile
            .relocate("net.kyori", &RelocationNamespace::Platform)
            .unwrap();
        profile
            .relocate("org.yaml", &RelocationNamespace::Shared)
            .unwrap();
        let destinations: Vec<&str> = profile
            .rules()
            .iter()
            .map(|r| r.destination.as_str())
            .collect();
        assert_eq!(
            destinations,
            vec![
                "org.geysermc.geyser.platform.velocity.shaded.net.kyori",
                "org.geysermc.geyser.shaded.org.yaml",
            ]
        );
    }

    #[test]
    fn relocate_with_exception_appends_suffix() {
        let mut profile = TargetProfile::new("velocity", "org.geysermc");
        profile
            .relocate_with_exception(
                "net.kyori",
                ".adventure.text.logger",
                &RelocationNamespace::Shared,
            )
            .unwrap();
        let rule = &profile.rules()[0];
        assert!(rule.exceptions.contains("net.kyori.adventure.text.logger"));
        assert_eq!(
            profile.plan().apply("net.kyori.adventure.text.logger.Foo"),
            "net.kyori.adventure.text.logger.Foo"
        );
    }

    #[test]
    fn relocate_with_empty_suffix_adds_no_exception() {
        let mut profile = TargetProfile::new("velocity", "org.geysermc");
        profile
            .relocate_with_exception("net.kyori", "", &RelocationNamespace::Shared)
            .unwrap();
        assert!(profile.rules()[0].exceptions.is_empty());
    }

    #[test]
    fn configuration_after_resolve_is_rejected() {
        let mut profile = TargetProfile::new("spigot", "org.example");
        profile.provided("io.netty", ".*").unwrap();
        profile.resolve(&[], &BTreeSet::new()).unwrap();
        assert_eq!(profile.phase(), Phase::Resolved);

        assert!(matches!(
            profile.provided("org.yaml", "snakeyaml"),
            Err(CoreError::PhaseViolation { .. })
        ));
        assert!(matches!(
            profile.relocate("org.yaml", &RelocationNamespace::Shared),
            Err(CoreError::PhaseViolation { .. })
        ));
        assert!(matches!(
            profile.set_include_transitive(true),
            Err(CoreError::PhaseViolation { .. })
        ));
        assert!(matches!(
            profile.resolve(&[], &BTreeSet::new()),
            Err(CoreError::PhaseViolation { .. })
        ));
        assert_eq!(profile.registry().len(), 1);
    }

    #[test]
    fn failed_resolve_still_closes_configuration() {
        let mut profile = TargetProfile::new("spigot", "org.example");
        let graph = vec![ResolvedDependency::direct(coord(":nameless:1.0"))];
        assert!(matches!(
            profile.resolve(&graph, &BTreeSet::new()),
            Err(CoreError::UnresolvedCoordinate { .. })
        ));
        assert!(matches!(
            profile.provided("a", "b"),
            Err(CoreError::PhaseViolation { .. })
        ));
    }

    #[test]
    fn invalid_wildcard_is_target_scoped() {
        let mut profile = TargetProfile::new("spigot", "org.example");
        let err = profile.provided("io.netty", "(*").unwrap_err();
        assert_eq!(err.target().map(TargetId::as_str), Some("spigot"));
    }
}
