use crate::coordinate::Coordinate;
use crate::relocation::{RelocationEntry, RelocationRule};
use crate::types::{ManifestDigest, ShortDigest, TargetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const BUNDLE_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundle manifest I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bundle manifest parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("bundle manifest serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("bundle manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bundle manifest digest mismatch: manifest has '{stored}', recomputed '{computed}'")]
    DigestMismatch { stored: String, computed: String },
}

/// The per-target packaging decision: what to embed, what to leave to the host,
/// and which names to rewrite.
///
/// All collections are ordered (coordinates by group, artifact, version), so
/// equal decisions always serialize to identical bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BundleManifest {
    pub manifest_version: u32,
    pub target: TargetId,
    pub digest: ManifestDigest,
    pub short_digest: ShortDigest,
    pub include_transitive: bool,

    /// Artifacts nested into the bundle.
    pub embed: BTreeSet<Coordinate>,
    /// Artifacts the host provides, or that are already shaded into the main artifact.
    pub excluded: BTreeSet<Coordinate>,
    /// Transitive artifacts left to the host's own dependency resolution.
    #[serde(default)]
    pub external: BTreeSet<Coordinate>,

    /// The relocation plan packaging applies to merged classes.
    #[serde(default)]
    pub rules: Vec<RelocationRule>,
    /// Rewrites of names contained in embedded artifacts.
    #[serde(default)]
    pub relocate: Vec<RelocationEntry>,
}

/// The three decision sets plus the rewrites computed for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleDecisions {
    pub embed: BTreeSet<Coordinate>,
    pub excluded: BTreeSet<Coordinate>,
    pub external: BTreeSet<Coordinate>,
    pub rules: Vec<RelocationRule>,
    pub relocate: Vec<RelocationEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManifestFormat {
    #[default]
    Toml,
    Json,
}

impl ManifestFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

/// A bundle manifest rendered to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedManifest {
    pub format: ManifestFormat,
    pub content: String,
}

impl BundleManifest {
    /// Build a manifest from resolver decisions and stamp its digest.
    pub fn from_decisions(
        target: TargetId,
        include_transitive: bool,
        decisions: BundleDecisions,
    ) -> Self {
        let mut rules = decisions.rules;
        rules.sort();
        rules.dedup();
        let mut relocate = decisions.relocate;
        relocate.sort();
        relocate.dedup();

        let manifest = BundleManifest {
            manifest_version: BUNDLE_MANIFEST_VERSION,
            target,
            digest: ManifestDigest::new(String::new()), // computed below
            short_digest: ShortDigest::new(String::new()),
            include_transitive,
            embed: decisions.embed,
            excluded: decisions.excluded,
            external: decisions.external,
            rules,
            relocate,
        };

        let (digest, short_digest) = manifest.compute_digest();
        BundleManifest {
            digest,
            short_digest,
            ..manifest
        }
    }

    /// Hash every decision in canonical order. The stored digest itself is not an input.
    pub fn compute_digest(&self) -> (ManifestDigest, ShortDigest) {
        let mut hasher = blake3::Hasher::new();

        let version = self.manifest_version.to_string();
        hash_record(&mut hasher, "version", &[version.as_str()]);
        hash_record(&mut hasher, "target", &[self.target.as_str()]);
        if self.include_transitive {
            hash_record(&mut hasher, "transitive", &[]);
        }

        for c in &self.embed {
            hash_record(&mut hasher, "embed", &[c.to_string().as_str()]);
        }
        for c in &self.excluded {
            hash_record(&mut hasher, "excluded", &[c.to_string().as_str()]);
        }
        for c in &self.external {
            hash_record(&mut hasher, "external", &[c.to_string().as_str()]);
        }

        let mut rules: Vec<&RelocationRule> = self.rules.iter().collect();
        rules.sort();
        for rule in rules {
            hash_record(&mut hasher, "rule", &[rule.source.as_str(), rule.destination.as_str()]);
            for exception in &rule.exceptions {
                hash_record(&mut hasher, "except", &[exception.as_str()]);
            }
        }

        let mut relocate: Vec<&RelocationEntry> = self.relocate.iter().collect();
        relocate.sort();
        for entry in relocate {
            hash_record(
                &mut hasher,
                "relocate",
                &[
                    entry.artifact.to_string().as_str(),
                    entry.original.as_str(),
                    entry.relocated.as_str(),
                ],
            );
        }

        let hex = hasher.finalize().to_hex().to_string();
        let short = hex[..12].to_owned();
        (ManifestDigest::new(hex), ShortDigest::new(short))
    }

    /// Check that the stored digest matches the manifest content.
    pub fn verify_digest(&self) -> Result<(), BundleError> {
        let (computed, _) = self.compute_digest();
        if self.digest != computed {
            return Err(BundleError::DigestMismatch {
                stored: self.digest.to_string(),
                computed: computed.into_inner(),
            });
        }
        Ok(())
    }

    /// A copy with every list in canonical order.
    fn canonical(&self) -> Self {
        let mut out = self.clone();
        out.rules.sort();
        out.relocate.sort();
        out
    }

    /// Relocation entries recorded for one embedded artifact.
    pub fn relocations_for<'a>(
        &'a self,
        artifact: &'a Coordinate,
    ) -> impl Iterator<Item = &'a RelocationEntry> + 'a {
        self.relocate.iter().filter(move |e| &e.artifact == artifact)
    }

    pub fn write_to_file(
        &self,
        path: impl AsRef<Path>,
        format: ManifestFormat,
    ) -> Result<(), BundleError> {
        let path = path.as_ref();
        let content = emit(self, format)?.content;
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| BundleError::Io(e.error))?;
        // Fsync parent directory to ensure rename durability on power loss.
        if let Ok(f) = fs::File::open(dir) {
            let _ = f.sync_all();
        }
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            return Ok(serde_json::from_str(&content)?);
        }
        Ok(toml::from_str(&content)?)
    }
}

/// Feed one tagged record into `hasher`. Every field is length-prefixed and the
/// record is newline-terminated, so no two field splits share a byte stream.
fn hash_record(hasher: &mut blake3::Hasher, tag: &str, fields: &[&str]) {
    hasher.update(tag.as_bytes());
    for field in fields {
        hasher.update(&(field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hasher.update(b"\n");
}

/// Render a manifest deterministically. Pure: equal manifests give equal bytes.
pub fn emit(
    manifest: &BundleManifest,
    format: ManifestFormat,
) -> Result<SerializedManifest, BundleError> {
    let canonical = manifest.canonical();
    let content = match format {
        ManifestFormat::Toml => toml::to_string_pretty(&canonical)?,
        ManifestFormat::Json => {
            let mut json = serde_json::to_string_pretty(&canonical)?;
            json.push('\n');
            json
        }
    };
    Ok(SerializedManifest { format, content })
}
