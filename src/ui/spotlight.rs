use super::{Palette, key_hint, palette, tier_color, truncate_str};
use crate::app::App;
use crate::render::{Fragment, render_spotlight};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Spotlight panel: the selected 2-3 featured members side by side.
pub fn render(app: &App, frame: &mut Frame) {
    let p = palette(app.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(6), Constraint::Length(1)])
        .split(frame.area());

    let title = Paragraph::new(Line::from(Span::styled(
        " ★ Featured Members",
        Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, chunks[0]);

    let cards: Vec<Fragment> = app.spotlight_items().into_iter().map(render_spotlight).collect();
    if cards.is_empty() {
        let empty = Paragraph::new("No featured members to show.")
            .style(Style::default().fg(p.dim))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(p.dim)));
        frame.render_widget(empty, chunks[1]);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
            .split(chunks[1]);

        for (fragment, area) in cards.iter().zip(columns.iter()) {
            let width = area.width.saturating_sub(4) as usize;
            let border = fragment.badge.map(|b| tier_color(b.tier)).unwrap_or(p.dim);
            let card = Paragraph::new(spotlight_lines(fragment, width, &p))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(border))
                        .title(format!(" {} ", truncate_str(&fragment.title.to_plain(), width))),
                );
            frame.render_widget(card, *area);
        }
    }

    let mut status = vec![Span::raw(" ")];
    status.extend(key_hint("p", " Reshuffle  ", &p));
    status.extend(key_hint("Esc", " Back  ", &p));
    status.extend(key_hint("q", " Back", &p));
    frame.render_widget(Paragraph::new(Line::from(status)), chunks[2]);
}

fn spotlight_lines(fragment: &Fragment, width: usize, p: &Palette) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    if let Some(badge) = fragment.badge {
        lines.push(Line::from(Span::styled(
            format!(" {}", badge.text()),
            Style::default().fg(tier_color(badge.tier)).add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(subtitle) = &fragment.subtitle {
        lines.push(Line::from(Span::styled(
            format!(" {}", truncate_str(&subtitle.to_plain(), width)),
            Style::default().fg(p.dim),
        )));
    }
    lines.push(Line::from(""));
    for field in &fragment.fields {
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", field.label.unwrap_or("")), Style::default().fg(p.dim)),
            Span::styled(truncate_str(&field.text.to_plain(), width), Style::default().fg(p.fg)),
        ]));
    }
    lines
}
