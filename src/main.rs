mod app;
mod catalog;
mod history;
mod loader;
mod prefs;
mod render;
mod spotlight;
mod ui;
mod view;

use app::{App, InputMode, View};
use catalog::{Catalog, present};
use clap::{Args, Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use history::ViewHistory;
use loader::{LoadError, Source};
use prefs::{JsonFileStore, MemoryStore, PreferenceStore};
use render::{Notice, RenderOptions};
use spotlight::{RandomSource, SeededSource, ThreadSource};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use view::{CategoryFilter, Layout, SortKey, ViewState};

/// Filter, sort and render member directories and product catalogs
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    view: ViewArgs,

    /// Log at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Clone)]
struct ViewArgs {
    /// Catalog JSON: an http(s) URL or a local path
    #[arg(short, long, global = true, default_value = "data/products.json")]
    source: String,

    /// Category to show ("all" for everything)
    #[arg(short, long, global = true)]
    category: Option<String>,

    /// Sort order: price-low, price-high, name, rating
    #[arg(long, global = true)]
    sort: Option<String>,

    /// Layout mode: grid or list
    #[arg(long, global = true)]
    layout: Option<String>,

    /// Show at most this many items
    #[arg(short, long, global = true)]
    limit: Option<usize>,

    /// Currency symbol for prices
    #[arg(long, global = true)]
    currency: Option<String>,

    /// Only items whose name, description or category contain this text
    #[arg(long, global = true)]
    search: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog in the terminal (default)
    Browse,
    /// Write the catalog as an HTML document
    Render {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Render the details dialog of one item instead of the listing.
        /// Items without an id are matched by name
        #[arg(long, value_name = "ID")]
        detail: Option<String>,
    },
    /// Pick featured gold and silver members
    Spotlight {
        /// Seed for a repeatable selection
        #[arg(long)]
        seed: Option<u64>,
        /// Print HTML cards instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Print category counts, ratings, stock and view history
    Stats,
}

impl ViewArgs {
    /// Lay the command-line choices over `base`.
    fn apply_to(&self, base: ViewState) -> ViewState {
        let mut state = base;
        if let Some(c) = &self.category {
            state = state.with_category(CategoryFilter::parse(c));
        }
        if let Some(s) = &self.sort {
            state = state.with_sort(SortKey::parse(s));
        }
        if let Some(l) = &self.layout {
            match Layout::parse(l) {
                Some(layout) => state = state.with_layout(layout),
                None => warn!("unknown layout {:?}, keeping {}", l, state.layout.as_str()),
            }
        }
        if let Some(term) = &self.search {
            state = state.with_search(term.as_str());
        }
        state
    }

    fn render_options(&self) -> RenderOptions {
        match &self.currency {
            Some(currency) => RenderOptions {
                currency: currency.clone(),
            },
            None => RenderOptions::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Browse);
    let is_browse = matches!(command, Commands::Browse);

    init_logging(cli.verbose, is_browse);

    let args = cli.view;
    let source = Source::parse(&args.source);

    match command {
        Commands::Browse => browse(source, &args).await?,
        Commands::Render { output, detail } => {
            let state = args.apply_to(ViewState::default());
            let document = match detail {
                Some(id) => {
                    let catalog = load_or_exit(&source).await;
                    let Some(item) = catalog.find(&id) else {
                        eprintln!("Error: no item with id or name {} in {}", id, source);
                        std::process::exit(1);
                    };
                    let fragment = render::render_detail(item, &args.render_options());
                    render::render_document(&item.name, &fragment.to_html())
                }
                None => {
                    let result = load(&source).await;
                    render_html(result, &state, args.limit, &args.render_options())
                }
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, document)?;
                    eprintln!("Wrote {}", path.display());
                }
                None => std::io::stdout().write_all(document.as_bytes())?,
            }
        }
        Commands::Spotlight { seed, html } => {
            let catalog = load_or_exit(&source).await;
            let mut rng: Box<dyn RandomSource> = match seed {
                Some(seed) => Box::new(SeededSource::new(seed)),
                None => Box::new(ThreadSource),
            };
            let picked = spotlight::select(catalog.items(), rng.as_mut());
            if picked.is_empty() {
                eprintln!("No gold or silver members in {}", source);
            }
            for item in picked {
                if html {
                    print!("{}", render::render_spotlight(item).to_html());
                } else {
                    let badge = render::badge_for_tier(item.membership_level);
                    println!("{}  {}", badge.text(), item.name);
                    if let Some(tagline) = present(&item.tagline) {
                        println!("    {}", tagline);
                    }
                }
            }
        }
        Commands::Stats => {
            let catalog = load_or_exit(&source).await;
            let store = open_store();
            print_stats(&catalog, &ViewHistory::from_store(store.as_ref()));
        }
    }

    Ok(())
}

/// In the terminal browser logs go to a file so they don't tear the screen.
fn init_logging(verbose: bool, to_file: bool) {
    let level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_file = to_file
        .then(|| directories::ProjectDirs::from("com", "catalog-explorer", "catalog-explorer"))
        .flatten()
        .and_then(|dirs| {
            let dir = dirs.cache_dir();
            std::fs::create_dir_all(dir).ok()?;
            std::fs::File::create(dir.join("catalog-explorer.log")).ok()
        });

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init(),
        // No cache dir in browse mode: drop logs rather than draw over the UI
        None if to_file => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Preferences file, or an in-memory store when there is no config dir.
fn open_store() -> Box<dyn PreferenceStore> {
    match JsonFileStore::default_path() {
        Ok(path) => {
            let store = JsonFileStore::open(&path);
            info!("preferences at {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            warn!("{}; preferences will not be saved", e.user_message());
            Box::new(MemoryStore::default())
        }
    }
}

async fn load(source: &Source) -> Result<Catalog, LoadError> {
    let pb = loader::spinner(source);
    let result = loader::load_with_progress(source, &pb).await;
    pb.finish_and_clear();
    result
}

async fn load_or_exit(source: &Source) -> Catalog {
    match load(source).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("load failed: {}", e);
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    }
}

/// Full HTML page for a load outcome. A failed load still produces a page,
/// carrying the load-error notice in place of the cards.
fn render_html(
    result: Result<Catalog, LoadError>,
    state: &ViewState,
    limit: Option<usize>,
    options: &RenderOptions,
) -> String {
    let region = match result {
        Ok(catalog) => {
            let shown = view::take_preview(&state.apply(catalog.items()), limit);
            info!("rendering {} of {} items", shown.len(), catalog.len());
            let fragments: Vec<_> = shown
                .into_iter()
                .map(|item| render::render_item(item, options))
                .collect();
            render::render_region(&fragments, state.layout)
        }
        Err(e) => {
            error!("load failed: {}", e);
            eprintln!("Error: {}", e.user_message());
            format!(
                "<div class=\"{}\">\n{}</div>\n",
                state.layout.container_class(),
                Notice::LoadError.to_html()
            )
        }
    };
    render::render_document("Catalog", &region)
}

fn print_stats(catalog: &Catalog, history: &ViewHistory) {
    println!("Items:        {}", catalog.len());
    println!("Avg rating:   {:.1}", catalog.average_rating());
    println!("In stock:     {}", catalog.in_stock().len());
    println!("Out of stock: {}", catalog.out_of_stock().len());
    println!();
    println!("Categories:");
    for (category, items) in catalog.group_by_category() {
        let name = if category.is_empty() { "(none)" } else { category.as_str() };
        let top = view::sort(&items, SortKey::Rating);
        let best = top.first().map(|i| i.name.as_str()).unwrap_or("");
        println!("  {:<20} {:>4}   top rated: {}", name, items.len(), best);
    }
    let ranked = history.most_viewed();
    if let Some(last) = history.records().last() {
        println!();
        println!("Most viewed (last opened {}):", last.timestamp.format("%Y-%m-%d %H:%M"));
        for (id, count) in ranked.iter().take(10) {
            let name = catalog.find(id).map(|i| i.name.as_str()).unwrap_or(id.as_str());
            println!("  {:>3}  {}", count, name);
        }
    }
}

async fn browse(source: Source, args: &ViewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(source.clone(), open_store(), Box::new(ThreadSource));
    app.state = args.apply_to(std::mem::take(&mut app.state));
    app.limit = args.limit;
    app.options = args.render_options();

    // Load before taking over the terminal so the spinner is visible
    let result = load(&source).await;
    app.set_catalog(result);

    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, &mut app);
    ratatui::restore();

    if let Err(e) = app.persist() {
        warn!("could not save preferences: {}", e);
        eprintln!("Warning: {}", e.user_message());
    }

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let size = terminal.size()?;
    app.update_page_size(size.width, size.height);

    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Poll for events with a 250ms timeout
        if event::poll(std::time::Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key);
                    // Layout toggles change how many cards fit
                    let size = terminal.size()?;
                    app.update_page_size(size.width, size.height);
                }
                Event::Resize(width, height) => {
                    app.update_page_size(width, height);
                }
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Help toggle (global)
    if key.code == KeyCode::Char('?') && app.input_mode == InputMode::Normal {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.input_mode == InputMode::Editing {
        handle_search_input(app, key);
        return;
    }
    match app.view {
        View::Catalog => handle_catalog_key(app, key),
        View::Detail => handle_detail_key(app, key),
        View::Spotlight => handle_spotlight_key(app, key),
        View::Stats => handle_stats_key(app, key),
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.status_msg = format!("{} matches", app.visible.len());
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.clear_search();
        }
        KeyCode::Backspace => app.pop_search(),
        KeyCode::Char(c) => app.push_search(c),
        _ => {}
    }
}

fn handle_catalog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('/') => app.input_mode = InputMode::Editing,
        KeyCode::Down | KeyCode::Char('j') => app.next_row(),
        KeyCode::Up | KeyCode::Char('k') => app.prev_row(),
        KeyCode::Right | KeyCode::Char('l') => app.next_item(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_item(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::Char('g') => app.jump_first(),
        KeyCode::Char('G') => app.jump_last(),
        KeyCode::Char('c') => app.cycle_category(),
        KeyCode::Char('o') => app.cycle_sort(),
        KeyCode::Char('v') => app.toggle_layout(),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('p') => app.view = View::Spotlight,
        KeyCode::Char('i') => app.view = View::Stats,
        KeyCode::Esc => app.clear_search(),
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_detail(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Char('t') => app.cycle_theme(),
        _ => {}
    }
}

fn handle_spotlight_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.view = View::Catalog,
        KeyCode::Char('p') => {
            app.reshuffle_spotlight();
            app.status_msg = format!("{} featured members", app.spotlight.len());
        }
        KeyCode::Char('t') => app.cycle_theme(),
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('i') => app.view = View::Catalog,
        KeyCode::Char('x') => {
            app.history.clear();
            app.status_msg = "View history cleared".to_string();
        }
        KeyCode::Char('t') => app.cycle_theme(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;

    fn args() -> ViewArgs {
        ViewArgs {
            source: "data/products.json".into(),
            category: None,
            sort: None,
            layout: None,
            limit: None,
            currency: None,
            search: None,
        }
    }

    #[test]
    fn test_cli_defaults_to_browse() {
        let cli = Cli::try_parse_from(["catalog-explorer"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.view.source, "data/products.json");
    }

    #[test]
    fn test_cli_global_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "catalog-explorer",
            "render",
            "--source",
            "data/members.json",
            "--category",
            "gold",
            "--sort",
            "price-low",
            "--limit",
            "3",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Render {
                output: None,
                detail: None
            })
        ));
        assert_eq!(cli.view.source, "data/members.json");
        assert_eq!(cli.view.category.as_deref(), Some("gold"));
        assert_eq!(cli.view.limit, Some(3));
    }

    #[test]
    fn test_view_args_override_base() {
        let base = ViewState::default().with_sort(SortKey::Name);
        let mut a = args();
        a.category = Some("women".into());
        a.layout = Some("bogus".into());
        let state = a.apply_to(base);
        assert_eq!(state.category, CategoryFilter::Only("women".into()));
        assert_eq!(state.sort, SortKey::Name);
        assert_eq!(state.layout, Layout::default());
    }

    #[test]
    fn test_render_html_success_and_failure() {
        let catalog = Catalog::from_items(vec![
            product(1, "A", "gold", 10.0),
            product(2, "B", "silver", 5.0),
            product(3, "C", "gold", 20.0),
        ])
        .unwrap();
        let state = ViewState::default()
            .with_category(CategoryFilter::parse("gold"))
            .with_sort(SortKey::PriceLow);
        let html = render_html(Ok(catalog), &state, None, &RenderOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        let a = html.find(">A<").unwrap();
        let c = html.find(">C<").unwrap();
        assert!(a < c);
        assert!(!html.contains(">B<"));

        let err = LoadError::Status {
            status: 500,
            url: "https://example.test/p.json".into(),
        };
        let html = render_html(Err(err), &state, None, &RenderOptions::default());
        assert!(html.contains(Notice::LoadError.text()));
        assert!(!html.contains(Notice::Empty.text()));
    }
}
