use colored::Colorize;

/// Width of the status block in columns
pub const STATUS_WIDTH: usize = 40;

/// Renders the one-line status block printed after a lookup.
///
/// With colors it is a solid green or red bar, otherwise a padded
/// `[ OK ]` / `[FAIL]` marker of the same width.
pub fn status_box(success: bool, color: bool) -> String {
    if color {
        let bar = " ".repeat(STATUS_WIDTH);
        let bar = if success { bar.on_green() } else { bar.on_red() };

        return bar.to_string();
    }

    let marker = if success { "[ OK ]" } else { "[FAIL]" };
    format!("{marker:<width$}", width = STATUS_WIDTH)
}
