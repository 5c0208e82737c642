use ratatui::prelude::*;

use crate::core::rig_monitor::is_valid;

/// Text for a reading; sentinel values show as a dash pair
pub fn format_reading(value: i64) -> String {
    if is_valid(value) {
        value.to_string()
    } else {
        "--".to_string()
    }
}

/// Color a reading against a caution level and a hard limit
pub fn limit_color(value: i64, caution: i64, limit: i64) -> Color {
    match value {
        v if !is_valid(v) => Color::DarkGray,
        v if v > limit => Color::Red,
        v if v > caution => Color::LightYellow,
        _ => Color::Cyan,
    }
}

/// Caution starts at this fraction of a limit
pub fn caution_level(limit: i64) -> i64 {
    limit * 8 / 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rig_monitor::NO_DATA;

    #[test]
    fn test_format_reading() {
        assert_eq!(format_reading(NO_DATA), "--");
        assert_eq!(format_reading(-3), "-3");
        assert_eq!(format_reading(0), "0");
    }

    #[test]
    fn test_limit_color() {
        assert_eq!(limit_color(NO_DATA, 80, 100), Color::DarkGray);
        assert_eq!(limit_color(50, 80, 100), Color::Cyan);
        assert_eq!(limit_color(90, 80, 100), Color::LightYellow);
        assert_eq!(limit_color(101, 80, 100), Color::Red);
        assert_eq!(caution_level(90), 72);
    }
}
