use super::{colorize_flag_padded, json_pretty, EXIT_SUCCESS};
use shadeplan_schema::list_presets;

pub fn run(json: bool) -> Result<u8, String> {
    let presets = list_presets();
    if json {
        println!("{}", json_pretty(&presets)?);
    } else {
        println!("{:<12} {:<11} DESCRIPTION", "NAME", "TRANSITIVE");
        for preset in presets {
            println!(
                "{:<12} {} {}",
                preset.name,
                colorize_flag_padded(preset.include_transitive, 11),
                preset.description
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
