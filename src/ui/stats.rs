use super::{Palette, key_hint, palette, truncate_str};
use crate::app::App;
use crate::catalog::Catalog;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

pub fn render(app: &App, frame: &mut Frame) {
    let p = palette(app.theme);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(frame.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    match &app.catalog {
        Some(catalog) => {
            render_summary(catalog, frame, chunks[0], &p);
            render_history(app, catalog, frame, chunks[1], &p);
        }
        None => {
            let items = vec![ListItem::new(Span::styled(
                app.load_error.as_deref().unwrap_or("No catalog loaded."),
                Style::default().fg(p.error),
            ))];
            let block = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(p.dim))
                    .title(" Catalog Statistics "),
            );
            frame.render_widget(block, rows[0]);
        }
    }

    let mut status = vec![Span::raw(" ")];
    status.extend(key_hint("x", " Clear history  ", &p));
    status.extend(key_hint("Esc", " Back  ", &p));
    status.extend(key_hint("q", " Back", &p));
    frame.render_widget(Paragraph::new(Line::from(status)), rows[1]);
}

fn heading<'a>(text: &'a str, p: &Palette) -> ListItem<'a> {
    ListItem::new(Line::from(Span::styled(
        text,
        Style::default().fg(p.price).add_modifier(Modifier::BOLD),
    )))
}

fn render_summary(catalog: &Catalog, frame: &mut Frame, area: Rect, p: &Palette) {
    let mut items = vec![
        heading(" ITEMS ", p),
        ListItem::new(format!("   Total:        {}", catalog.len())),
        ListItem::new(format!("   Avg rating:   {:.1}", catalog.average_rating())),
        ListItem::new(Line::from(vec![
            Span::raw("   In stock:     "),
            Span::styled(catalog.in_stock().len().to_string(), Style::default().fg(p.ok)),
        ])),
        ListItem::new(Line::from(vec![
            Span::raw("   Out of stock: "),
            Span::styled(catalog.out_of_stock().len().to_string(), Style::default().fg(p.error)),
        ])),
        ListItem::new(Line::from("")),
        heading(" CATEGORIES ", p),
    ];
    for (category, count) in catalog.category_counts() {
        let name = if category.is_empty() { "(none)".to_string() } else { category };
        items.push(ListItem::new(format!("   • {:<16} {}", truncate_str(&name, 16), count)));
    }

    let block = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.dim))
            .title(" Catalog Statistics "),
    );
    frame.render_widget(block, area);
}

fn render_history(app: &App, catalog: &Catalog, frame: &mut Frame, area: Rect, p: &Palette) {
    let mut items = vec![
        heading(" MOST VIEWED ", p),
        ListItem::new(Span::styled(
            format!("   ({} views recorded)", app.history.len()),
            Style::default().fg(p.dim),
        )),
    ];
    if let Some(last) = app.history.records().last() {
        items.push(ListItem::new(Span::styled(
            format!("   last opened {}", last.timestamp.format("%Y-%m-%d %H:%M")),
            Style::default().fg(p.dim),
        )));
    }
    let ranked = app.history.most_viewed();
    if app.history.is_empty() {
        items.push(ListItem::new(Span::styled(
            "   Nothing viewed yet.",
            Style::default().fg(p.dim),
        )));
    }
    for (id, count) in ranked.iter().take(10) {
        let name = catalog.find(id).map(|i| i.name.as_str()).unwrap_or(id.as_str());
        items.push(ListItem::new(format!("   {:>3}×  {}", count, truncate_str(name, 30))));
    }
    if ranked.len() > 10 {
        items.push(ListItem::new(format!("   ... and {} more", ranked.len() - 10)));
    }

    let block = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.accent))
            .title(" Recently Opened "),
    );
    frame.render_widget(block, area);
}
