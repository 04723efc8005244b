//! End-to-end tests: descriptor file on disk through to written bundle manifests.

use shadeplan_core::{CoreError, Engine};
use shadeplan_schema::{BundleManifest, ManifestFormat};
use std::fs;
use std::path::{Path, PathBuf};

const DESCRIPTOR: &str = r#"
descriptor_version = 1
base_package = "org.geysermc.geyser"

[targets.velocity]
preset = "velocity"
shaded = ["org.cloudburstmc.protocol:bedrock-codec:3.0.0"]

[[targets.velocity.relocate]]
source = "net.kyori"
namespace = "explicit"
destination = "org.geysermc.shaded.net.kyori"
exceptions = ["net.kyori.adventure.text.logger"]

[[targets.velocity.relocate]]
source = "org.yaml"
namespace = "platform"

[[targets.velocity.dependencies]]
coordinate = "org.geysermc.geyser:core:2.4.0"

[[targets.velocity.dependencies]]
coordinate = "net.kyori:examination-api:1.3.0"
packages = ["net.kyori.adventure.text.logger.Foo", "net.kyori.examination.Examinable"]

[[targets.velocity.dependencies]]
coordinate = "net.kyori:adventure-api:4.14.0"
parent = "org.geysermc.geyser:core:2.4.0"

[[targets.velocity.dependencies]]
coordinate = "org.cloudburstmc.protocol:bedrock-codec:3.0.0"
parent = "org.geysermc.geyser:core:2.4.0"

[[targets.velocity.dependencies]]
coordinate = "org.jetbrains:annotations:24.0.0"
parent = "org.geysermc.geyser:core:2.4.0"

[[targets.velocity.dependencies]]
coordinate = "org.yaml:snakeyaml:2.2"
packages = ["org.yaml.snakeyaml.Yaml"]

[targets.fabric]
preset = "fabric"

[[targets.fabric.relocate]]
source = "org.yaml"
namespace = "platform"

[[targets.fabric.dependencies]]
coordinate = "org.geysermc.geyser:core:2.4.0"

[[targets.fabric.dependencies]]
coordinate = "org.yaml:snakeyaml:2.2"
parent = "org.geysermc.geyser:core:2.4.0"
packages = ["org.yaml.snakeyaml.Yaml"]

[[targets.fabric.dependencies]]
coordinate = "io.netty:netty-codec:4.1.107.Final"
parent = "org.geysermc.geyser:core:2.4.0"

[targets.broken]
[[targets.broken.dependencies]]
coordinate = "org.example:lib:1.0"

[[targets.broken.relocate]]
source = "org.example"
namespace = "explicit"
destination = "org.example.shaded"
"#;

fn write_descriptor(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("shadeplan.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn descriptor_to_manifests() {
    let project = tempfile::tempdir().unwrap();
    let engine = Engine::load(write_descriptor(project.path(), DESCRIPTOR)).unwrap();
    assert_eq!(engine.base_package(), "org.geysermc.geyser");

    let report = engine.resolve_all();
    let names: Vec<&str> = report.outcomes.keys().map(|t| t.as_str()).collect();
    assert_eq!(names, vec!["broken", "fabric", "velocity"]);

    let velocity = report.get("velocity").unwrap().as_ref().unwrap();
    assert!(!velocity.include_transitive);
    let embed: Vec<String> = velocity.embed.iter().map(ToString::to_string).collect();
    assert_eq!(
        embed,
        vec![
            "net.kyori:examination-api:1.3.0",
            "org.geysermc.geyser:core:2.4.0",
            "org.yaml:snakeyaml:2.2",
        ]
    );
    let excluded: Vec<String> = velocity.excluded.iter().map(ToString::to_string).collect();
    assert_eq!(
        excluded,
        vec![
            "net.kyori:adventure-api:4.14.0",
            "org.cloudburstmc.protocol:bedrock-codec:3.0.0",
        ]
    );
    let external: Vec<String> = velocity.external.iter().map(ToString::to_string).collect();
    assert_eq!(external, vec!["org.jetbrains:annotations:24.0.0"]);

    let relocated: Vec<&str> = velocity
        .relocate
        .iter()
        .map(|e| e.relocated.as_str())
        .collect();
    assert_eq!(
        relocated,
        vec![
            "org.geysermc.shaded.net.kyori.examination.Examinable",
            "org.geysermc.geyser.platform.velocity.shaded.org.yaml.snakeyaml.Yaml",
        ]
    );

    let fabric = report.get("fabric").unwrap().as_ref().unwrap();
    assert!(fabric.include_transitive);
    let embed: Vec<String> = fabric.embed.iter().map(ToString::to_string).collect();
    assert_eq!(
        embed,
        vec!["org.geysermc.geyser:core:2.4.0", "org.yaml:snakeyaml:2.2"]
    );
    assert_eq!(
        fabric.relocate[0].relocated,
        "org.geysermc.geyser.platform.fabric.shaded.org.yaml.snakeyaml.Yaml"
    );

    assert!(matches!(
        report.get("broken"),
        Some(Err(CoreError::InvalidRelocationDestination { .. }))
    ));
}

#[test]
fn written_manifests_round_trip_and_verify() {
    let project = tempfile::tempdir().unwrap();
    let out = project.path().join("build").join("bundles");
    let engine = Engine::load(write_descriptor(project.path(), DESCRIPTOR)).unwrap();
    let report = engine.resolve_all();

    let written = report.write_manifests(&out, ManifestFormat::Toml).unwrap();
    assert_eq!(
        written,
        vec![
            out.join("fabric.bundle.toml"),
            out.join("velocity.bundle.toml"),
        ]
    );
    assert!(!out.join("broken.bundle.toml").exists());

    for path in &written {
        let manifest = BundleManifest::read_from_file(path).unwrap();
        manifest.verify_digest().unwrap();
    }

    let json = report.write_manifests(&out, ManifestFormat::Json).unwrap();
    let fabric = BundleManifest::read_from_file(&json[0]).unwrap();
    assert_eq!(&fabric, report.get("fabric").unwrap().as_ref().unwrap());
}

#[test]
fn repeated_runs_are_byte_identical() {
    let project = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(project.path(), DESCRIPTOR);
    let first = project.path().join("a");
    let second = project.path().join("b");

    Engine::load(&descriptor)
        .unwrap()
        .resolve_all()
        .write_manifests(&first, ManifestFormat::Toml)
        .unwrap();
    Engine::load(&descriptor)
        .unwrap()
        .resolve_all()
        .write_manifests(&second, ManifestFormat::Toml)
        .unwrap();

    for name in ["fabric.bundle.toml", "velocity.bundle.toml"] {
        assert_eq!(
            fs::read(first.join(name)).unwrap(),
            fs::read(second.join(name)).unwrap(),
            "{name}"
        );
    }
}

#[test]
fn tampered_manifest_fails_verification() {
    let project = tempfile::tempdir().unwrap();
    let out = project.path().join("out");
    let engine = Engine::load(write_descriptor(project.path(), DESCRIPTOR)).unwrap();
    let written = engine
        .resolve_selected(&["fabric"])
        .unwrap()
        .write_manifests(&out, ManifestFormat::Toml)
        .unwrap();

    let content = fs::read_to_string(&written[0]).unwrap();
    fs::write(&written[0], content.replace("snakeyaml:2.2", "snakeyaml:2.3")).unwrap();
    let tampered = BundleManifest::read_from_file(&written[0]).unwrap();
    assert!(tampered.verify_digest().is_err());
}

#[test]
fn missing_descriptor_is_an_error() {
    let project = tempfile::tempdir().unwrap();
    assert!(matches!(
        Engine::load(project.path().join("absent.toml")),
        Err(CoreError::Descriptor(_))
    ));
}
