use super::{Palette, key_hint, palette, tier_color, truncate_str};
use crate::app::{App, GRID_CARD_HEIGHT, GRID_CARD_WIDTH, InputMode};
use crate::catalog::Item;
use crate::render::{FieldKind, Fragment, Notice, render_item};
use crate::view::{CategoryFilter, Layout as ViewLayout};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let p = palette(app.theme);

    // Layout: header(3) + search(3) + catalog(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(app, frame, chunks[0], &p);
    render_search(app, frame, chunks[1], &p);

    // ── Catalog region ──
    let page_info = format!(
        " {}-{} of {} ",
        if app.visible.is_empty() { 0 } else { app.offset + 1 },
        (app.offset + app.page_size).min(app.visible.len()),
        app.visible.len()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.dim))
        .title(format!(" {} ", app.state.layout.as_str()))
        .title_bottom(Line::from(page_info).alignment(Alignment::Right));

    if let Some(err) = &app.load_error {
        let lines = vec![
            Line::from(Span::styled(Notice::LoadError.text(), Style::default().fg(p.error).add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(err.as_str(), Style::default().fg(p.dim))),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), chunks[2]);
    } else if app.visible.is_empty() {
        let notice = Paragraph::new(Notice::Empty.text())
            .style(Style::default().fg(p.dim))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(notice, chunks[2]);
    } else {
        match app.state.layout {
            ViewLayout::List => render_list(app, frame, chunks[2], block, &p),
            ViewLayout::Grid => render_grid(app, frame, chunks[2], block, &p),
        }
    }

    render_status(app, frame, chunks[3], &p);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, p: &Palette) {
    let mut tabs = vec![Span::raw(" ")];
    let all = std::iter::once("all").chain(app.categories.iter().map(String::as_str));
    for name in all {
        let active = app.state.category == CategoryFilter::parse(name);
        let style = if active {
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(p.dim)
        };
        tabs.push(Span::styled(name.to_string(), style));
        tabs.push(Span::raw("  "));
    }
    tabs.push(Span::styled(
        format!("│ sort: {}", app.state.sort.label()),
        Style::default().fg(p.fg),
    ));

    let mut title = vec![
        Span::styled(" Catalog Explorer", Style::default().fg(p.accent).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("   [{} of {} items]", app.visible.len(), app.items().len()),
            Style::default().fg(p.dim),
        ),
    ];
    if let Some(item) = app.selected_item() {
        title.push(Span::styled(
            format!("   ▸ {}", truncate_str(&item.name, 40)),
            Style::default().fg(p.fg),
        ));
    }
    let lines = vec![Line::from(title), Line::from(tabs)];
    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(p.dim)),
    );
    frame.render_widget(header, area);
}

fn render_search(app: &App, frame: &mut Frame, area: Rect, p: &Palette) {
    let style = match app.input_mode {
        InputMode::Editing => Style::default().fg(p.price),
        InputMode::Normal => Style::default().fg(p.dim),
    };
    let label = if app.input_mode == InputMode::Editing {
        " Search (Enter to apply, Esc to cancel): "
    } else {
        " Search (/): "
    };
    let bar = Paragraph::new(format!("{}{}", label, app.state.search))
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style).title(" Search "));
    frame.render_widget(bar, area);

    if app.input_mode == InputMode::Editing {
        let cursor_x = area.x + 1 + label.len() as u16 + app.state.search.chars().count() as u16;
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

/// Price, stars and stock for products; badge and phone for members.
fn summary_spans(fragment: &Fragment, p: &Palette) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if let Some(badge) = fragment.badge {
        spans.push(Span::styled(format!(" {} ", badge.label), Style::default().fg(tier_color(badge.tier))));
        if let Some(phone) = fragment.plain(FieldKind::Phone) {
            spans.push(Span::styled(format!(" {}", phone), Style::default().fg(p.dim)));
        }
        return spans;
    }
    if let Some(price) = fragment.plain(FieldKind::Price) {
        spans.push(Span::styled(format!(" {}", price), Style::default().fg(p.price)));
    }
    if let Some(rating) = fragment.plain(FieldKind::Rating) {
        spans.push(Span::raw(format!(" {}", rating)));
    }
    if let Some(availability) = &fragment.availability {
        let color = if availability.in_stock { p.ok } else { p.error };
        spans.push(Span::styled(format!(" {}", availability.text), Style::default().fg(color)));
    }
    spans
}

/// Body of a grid card: subtitle or description, address, then the summary.
fn card_lines(fragment: &Fragment, width: usize, p: &Palette) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let subtitle = fragment
        .subtitle
        .as_ref()
        .map(|s| s.to_plain())
        .or_else(|| fragment.plain(FieldKind::Description));
    if let Some(sub) = subtitle {
        lines.push(Line::from(Span::styled(truncate_str(&sub, width), Style::default().fg(p.dim))));
    }
    if let Some(address) = fragment.plain(FieldKind::Address) {
        lines.push(Line::from(truncate_str(&address, width)));
    }
    lines.push(Line::from(summary_spans(fragment, p)));
    lines
}

fn page(app: &App) -> impl Iterator<Item = &Item> {
    app.visible_items().skip(app.offset).take(app.page_size)
}

fn render_list(app: &App, frame: &mut Frame, area: Rect, block: Block, p: &Palette) {
    let name_width = (area.width as usize).saturating_sub(50).max(10);
    let items: Vec<ListItem> = page(app)
        .map(|item| {
            let fragment = render_item(item, &app.options);
            let category = fragment.category.as_ref().map(|c| c.to_plain()).unwrap_or_default();
            let mut spans = vec![
                Span::styled(format!("{:>5} ", truncate_str(&item.key(), 5)), Style::default().fg(p.dim)),
                Span::styled(
                    format!(
                        "{:<width$}",
                        truncate_str(&fragment.title.to_plain(), name_width),
                        width = name_width
                    ),
                    Style::default().fg(p.fg),
                ),
                Span::styled(format!(" {:<10}", truncate_str(&category, 10)), Style::default().fg(p.dim)),
            ];
            spans.extend(summary_spans(&fragment, p));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(p.highlight_bg)
                .fg(p.highlight_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    state.select(Some(app.selected.saturating_sub(app.offset)));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_grid(app: &App, frame: &mut Frame, area: Rect, block: Block, p: &Palette) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cols = app.grid_columns.max(1);
    for (n, item) in page(app).enumerate() {
        let row = (n / cols) as u16;
        let col = (n % cols) as u16;
        let rect = Rect {
            x: inner.x + col * GRID_CARD_WIDTH,
            y: inner.y + row * GRID_CARD_HEIGHT,
            width: GRID_CARD_WIDTH.min(inner.width),
            height: GRID_CARD_HEIGHT,
        };
        if rect.bottom() > inner.bottom() || rect.right() > inner.right() {
            break;
        }
        let selected = app.offset + n == app.selected;
        render_card(frame, rect, &render_item(item, &app.options), selected, p);
    }
}

fn render_card(frame: &mut Frame, area: Rect, fragment: &Fragment, selected: bool, p: &Palette) {
    let text_width = area.width.saturating_sub(2) as usize;
    let border = if selected {
        Style::default().fg(p.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(p.dim)
    };

    let card = Paragraph::new(card_lines(fragment, text_width, p)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(truncate_str(&fragment.title.to_plain(), text_width.saturating_sub(2))),
    );
    frame.render_widget(card, area);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect, p: &Palette) {
    let mut spans = vec![Span::raw(" ")];
    for (key, label) in [
        ("↑↓", " Move  "),
        ("c", " Category  "),
        ("o", " Sort  "),
        ("v", " Layout  "),
        ("Enter", " Details  "),
        ("p", " Spotlight  "),
        ("?", " Help  "),
        ("q", " Quit  "),
    ] {
        spans.extend(key_hint(key, label, p));
    }
    spans.push(Span::styled(app.status_msg.as_str(), Style::default().fg(p.dim)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
