use super::{json_pretty, mark_fail, mark_ok, EXIT_SUCCESS, EXIT_TARGET_FAILED};
use shadeplan_core::{Engine, ResolveReport};
use shadeplan_schema::{emit, ManifestFormat};
use std::collections::BTreeMap;
use std::path::Path;

pub fn run(
    descriptor: &Path,
    targets: &[String],
    out: Option<&Path>,
    json: bool,
) -> Result<u8, String> {
    let engine = Engine::load(descriptor).map_err(|e| e.to_string())?;
    let report = if targets.is_empty() {
        engine.resolve_all()
    } else {
        engine.resolve_selected(targets).map_err(|e| e.to_string())?
    };

    let errors: BTreeMap<&str, String> = report
        .failed()
        .map(|(id, e)| (id.as_str(), e.to_string()))
        .collect();

    match out {
        Some(dir) => write(&report, dir, &errors, json)?,
        None => print(&report, &errors, json)?,
    }

    if errors.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_TARGET_FAILED)
    }
}

fn write(
    report: &ResolveReport,
    dir: &Path,
    errors: &BTreeMap<&str, String>,
    json: bool,
) -> Result<(), String> {
    let format = if json {
        ManifestFormat::Json
    } else {
        ManifestFormat::Toml
    };
    let written = report
        .write_manifests(dir, format)
        .map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "written": written,
            "errors": errors,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        for path in &written {
            println!("{}", mark_ok(&format!("wrote {}", path.display())));
        }
        for msg in errors.values() {
            eprintln!("{}", mark_fail(msg));
        }
    }
    Ok(())
}

fn print(
    report: &ResolveReport,
    errors: &BTreeMap<&str, String>,
    json: bool,
) -> Result<(), String> {
    if json {
        let manifests: BTreeMap<&str, _> = report
            .succeeded()
            .map(|(id, manifest)| (id.as_str(), manifest))
            .collect();
        let payload = serde_json::json!({
            "targets": manifests,
            "errors": errors,
        });
        println!("{}", json_pretty(&payload)?);
        return Ok(());
    }

    let mut first = true;
    for (_, manifest) in report.succeeded() {
        let rendered = emit(manifest, ManifestFormat::Toml).map_err(|e| e.to_string())?;
        if !first {
            println!();
        }
        first = false;
        print!("{}", rendered.content);
    }
    for msg in errors.values() {
        eprintln!("{}", mark_fail(msg));
    }
    Ok(())
}
