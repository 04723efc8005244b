pub mod check;
pub mod completions;
pub mod man_pages;
pub mod presets;
pub mod resolve;

use console::Style;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_DESCRIPTOR_ERROR: u8 = 2;
pub const EXIT_TARGET_FAILED: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn mark_ok(msg: &str) -> String {
    format!("{} {msg}", Style::new().green().apply_to("✓"))
}

pub fn mark_fail(msg: &str) -> String {
    format!("{} {msg}", Style::new().red().bold().apply_to("✗"))
}

pub fn colorize_flag(enabled: bool) -> String {
    colorize_flag_padded(enabled, 0)
}

/// Pads the bare word to `width` before styling, so escape codes never count
/// toward table column widths.
pub fn colorize_flag_padded(enabled: bool, width: usize) -> String {
    let (word, style) = if enabled {
        ("yes", Style::new().cyan())
    } else {
        ("no", Style::new().dim())
    };
    style.apply_to(format!("{word:<width$}")).to_string()
}
