pub mod dashboard;
pub mod quiz;
pub mod topics;

use ratatui::style::Color;

use quiztrace::models::Level;

const BAR_CELLS: u32 = 10;

pub fn create_mastery_bar(percent: u32) -> String {
    let filled = (percent.min(100) * BAR_CELLS / 100) as usize;
    let empty = BAR_CELLS as usize - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

pub fn level_color(level: Level) -> Color {
    match level {
        Level::Beginner => Color::Red,
        Level::Intermediate => Color::Yellow,
        Level::Advanced => Color::Green,
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
