use super::{Palette, centered_rect, key_hint, palette, tier_color};
use crate::app::App;
use crate::render::{FieldKind, Fragment, render_detail};
use ratatui::{
    Frame,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render(app: &App, frame: &mut Frame) {
    let Some(item) = app.detail_item() else {
        return;
    };
    let p = palette(app.theme);
    let fragment = render_detail(item, &app.options);
    let area = centered_rect(70, 70, frame.area());
    frame.render_widget(Clear, area);

    let mut footer = vec![Span::raw(" ")];
    footer.extend(key_hint("↑↓", " Scroll  ", &p));
    footer.extend(key_hint("Esc", " Close ", &p));

    let dialog = Paragraph::new(detail_lines(&fragment, &p))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.accent))
                .title(format!(" {} ", fragment.title.to_plain()))
                .title_bottom(Line::from(footer)),
        );
    frame.render_widget(dialog, area);
}

fn detail_lines(fragment: &Fragment, p: &Palette) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];

    if let Some(badge) = fragment.badge {
        lines.push(Line::from(Span::styled(
            format!("  {}", badge.text()),
            Style::default().fg(tier_color(badge.tier)).add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(subtitle) = &fragment.subtitle {
        lines.push(Line::from(Span::styled(
            format!("  {}", subtitle.to_plain()),
            Style::default().fg(p.dim).add_modifier(Modifier::ITALIC),
        )));
    }
    if let Some(price) = fragment.plain(FieldKind::Price) {
        lines.push(Line::from(Span::styled(
            format!("  {}", price),
            Style::default().fg(p.price).add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(rating) = fragment.plain(FieldKind::Rating) {
        lines.push(Line::from(format!("  {}", rating)));
    }
    if let Some(description) = fragment.plain(FieldKind::Description) {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("  {}", description)));
    }

    lines.push(Line::from(""));
    for field in &fragment.fields {
        if matches!(field.kind, FieldKind::Price | FieldKind::Rating | FieldKind::Description) {
            continue;
        }
        let label = field.label.unwrap_or("");
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", label), Style::default().fg(p.dim)),
            Span::styled(field.text.to_plain(), Style::default().fg(p.fg)),
        ]));
    }

    if let Some(availability) = &fragment.availability {
        let color = if availability.in_stock { p.ok } else { p.error };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", availability.text),
            Style::default().fg(color),
        )));
    }
    for action in &fragment.actions {
        lines.push(Line::from(Span::styled(
            format!("  [ {} ]", action.label),
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        )));
    }
    lines
}
