mod catalog;
mod detail;
mod help;
mod spotlight;
mod stats;

use crate::app::{App, View};
use crate::catalog::Tier;
use crate::prefs::Theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
};

/// Colours for the active theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub dim: Color,
    pub accent: Color,
    pub price: Color,
    pub error: Color,
    pub ok: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
}

pub fn palette(theme: Theme) -> Palette {
    if theme.is_dark() {
        Palette {
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            price: Color::Yellow,
            error: Color::Red,
            ok: Color::Green,
            highlight_bg: Color::DarkGray,
            highlight_fg: Color::White,
        }
    } else {
        Palette {
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
            price: Color::Magenta,
            error: Color::Red,
            ok: Color::Green,
            highlight_bg: Color::LightBlue,
            highlight_fg: Color::Black,
        }
    }
}

pub fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Diamond => Color::LightCyan,
        Tier::Gold => Color::Yellow,
        Tier::Silver => Color::Gray,
        Tier::Bronze => Color::Rgb(205, 127, 50),
        Tier::Member => Color::DarkGray,
    }
}

/// Top-level render dispatch.
pub fn render(app: &App, frame: &mut Frame) {
    match app.view {
        View::Catalog => catalog::render(app, frame),
        View::Detail => {
            catalog::render(app, frame);
            detail::render(app, frame);
        }
        View::Spotlight => spotlight::render(app, frame),
        View::Stats => stats::render(app, frame),
    }

    // Render help overlay on top if active
    if app.show_help {
        help::render(app, frame);
    }
}

/// Bold key hint followed by its description, for status bars.
fn key_hint<'a>(key: &'a str, label: &'a str, p: &Palette) -> [Span<'a>; 2] {
    [
        Span::styled(key, Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
        Span::raw(label),
    ]
}

/// Truncate a string to `max_width` columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if unicode_width::UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        width += w;
        result.push(ch);
    }
    result.push('…');
    result
}

/// Create a centered rectangle using percentage of parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("a long product name", 8), "a long …");
        assert_eq!(truncate_str("日本語テキスト", 7), "日本語…");
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let r = centered_rect(70, 70, area);
        assert!(r.x > 0 && r.y > 0);
        assert!(r.right() < area.right() && r.bottom() < area.bottom());
    }

    #[test]
    fn test_palettes_differ() {
        assert_ne!(palette(Theme::Light).fg, palette(Theme::Dark).fg);
        assert_eq!(palette(Theme::Auto).fg, palette(Theme::Dark).fg);
    }
}
