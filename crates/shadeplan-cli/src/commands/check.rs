use super::{colorize_flag, json_pretty, mark_fail, mark_ok, EXIT_SUCCESS, EXIT_TARGET_FAILED};
use shadeplan_core::Engine;
use std::path::Path;

pub fn run(descriptor: &Path, json: bool) -> Result<u8, String> {
    let engine = Engine::load(descriptor).map_err(|e| e.to_string())?;
    let results = engine.check();
    let failed = results.values().filter(|r| r.is_err()).count();

    if json {
        let entries: Vec<serde_json::Value> = results
            .iter()
            .map(|(id, result)| match result {
                Ok(profile) => {
                    let provided: Vec<String> =
                        profile.registry().iter().map(ToString::to_string).collect();
                    serde_json::json!({
                        "target": id,
                        "ok": true,
                        "include_transitive": profile.include_transitive(),
                        "provided": provided,
                        "rules": profile.rules(),
                    })
                }
                Err(e) => serde_json::json!({
                    "target": id,
                    "ok": false,
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!("{}", json_pretty(&entries)?);
    } else {
        for (id, result) in &results {
            match result {
                Ok(profile) => println!(
                    "{}",
                    mark_ok(&format!(
                        "{id}: {} provided pattern(s), {} relocation rule(s), transitive {}",
                        profile.registry().len(),
                        profile.rules().len(),
                        colorize_flag(profile.include_transitive())
                    ))
                ),
                Err(e) => println!("{}", mark_fail(&e.to_string())),
            }
        }
        println!("{} target(s) checked, {failed} with errors", results.len());
    }

    if failed == 0 {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_TARGET_FAILED)
    }
}
