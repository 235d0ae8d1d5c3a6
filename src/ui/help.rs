use super::{Palette, centered_rect, palette};
use crate::app::App;
use ratatui::{
    Frame,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("?", "Toggle this help"),
            ("q", "Back from a panel, quit from the catalog"),
            ("Esc", "Back / cancel"),
            ("t", "Cycle theme (light, dark, auto)"),
        ],
    ),
    (
        "Catalog",
        &[
            ("↑/k ↓/j", "Previous/next row"),
            ("←/h →/l", "Previous/next card"),
            ("PgUp/PgDn", "Page up/down"),
            ("g/G", "Jump to first/last item"),
            ("c", "Cycle category filter"),
            ("o", "Cycle sort order"),
            ("v", "Toggle grid/list layout"),
            ("/", "Search names and descriptions"),
            ("Enter", "Open item details"),
            ("p", "Featured members spotlight"),
            ("i", "Catalog statistics"),
            ("q", "Quit (saves preferences)"),
        ],
    ),
    (
        "Details",
        &[("↑/↓", "Scroll content"), ("Esc/Enter", "Close dialog")],
    ),
    ("Spotlight", &[("p", "Pick new featured members")]),
    ("Statistics", &[("x", "Clear view history")]),
];

pub fn render(app: &App, frame: &mut Frame) {
    let p = palette(app.theme);
    let area = centered_rect(70, 70, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let help = Paragraph::new(help_lines(&p))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.accent))
                .title(" Help (press ? or Esc to close) "),
        );
    frame.render_widget(help, area);
}

fn help_lines(p: &Palette) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (title, keys) in SECTIONS {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", title),
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        )));
        for (key, action) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("    {:<10}", key), Style::default().fg(p.price)),
                Span::raw(*action),
            ]));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::Theme;

    fn action(section: &str, key: &str) -> Option<&'static str> {
        SECTIONS
            .iter()
            .find(|(title, _)| *title == section)
            .and_then(|(_, keys)| keys.iter().find(|(k, _)| *k == key))
            .map(|(_, a)| *a)
    }

    #[test]
    fn test_theme_order_matches_cycle() {
        let order = [Theme::Light, Theme::Light.next(), Theme::Light.next().next()];
        assert_eq!(order[2].next(), Theme::Light);
        let listed = order.map(Theme::as_str).join(", ");
        let text = action("Global", "t").unwrap();
        assert!(text.contains(&listed), "{text} does not list {listed}");
    }

    #[test]
    fn test_quit_only_promised_in_catalog() {
        assert!(!action("Global", "q").unwrap().starts_with("Quit"));
        assert!(action("Catalog", "q").unwrap().starts_with("Quit"));
    }
}
