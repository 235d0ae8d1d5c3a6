use crate::catalog::{Catalog, Item};
use crate::history::ViewHistory;
use crate::loader::{LoadError, Source};
use crate::prefs::{KEY_THEME, PreferenceStore, PrefsError, Theme};
use crate::render::RenderOptions;
use crate::spotlight::{self, RandomSource};
use crate::view::{self, CategoryFilter, Layout, ViewState};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Which panel is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Catalog,
    Detail,
    Spotlight,
    Stats,
}

/// Input mode for the search bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Rows taken by header, category bar, borders and status line.
pub const CATALOG_OVERHEAD: u16 = 9;
/// Rows one grid card occupies.
pub const GRID_CARD_HEIGHT: u16 = 6;
pub const GRID_CARD_WIDTH: u16 = 34;

/// Main application state.
pub struct App {
    pub should_quit: bool,
    pub view: View,
    pub show_help: bool,
    pub input_mode: InputMode,

    pub source: Source,
    pub catalog: Option<Catalog>,
    pub load_error: Option<String>,
    pub categories: Vec<String>,

    pub state: ViewState,
    pub theme: Theme,
    pub options: RenderOptions,
    pub limit: Option<usize>,

    // Indices into the catalog items, in display order
    pub visible: Vec<usize>,
    pub selected: usize,
    pub offset: usize,
    pub page_size: usize,
    pub grid_columns: usize,

    pub detail: Option<usize>,
    pub detail_scroll: u16,

    pub spotlight: Vec<usize>,
    rng: Box<dyn RandomSource>,

    pub history: ViewHistory,
    store: Box<dyn PreferenceStore>,

    pub status_msg: String,
}

impl App {
    pub fn new(source: Source, store: Box<dyn PreferenceStore>, rng: Box<dyn RandomSource>) -> Self {
        let state = ViewState::from_store(store.as_ref());
        let theme = Theme::from_store(store.as_ref());
        let history = ViewHistory::from_store(store.as_ref());
        Self {
            should_quit: false,
            view: View::Catalog,
            show_help: false,
            input_mode: InputMode::Normal,

            source,
            catalog: None,
            load_error: None,
            categories: Vec::new(),

            state,
            theme,
            options: RenderOptions::default(),
            limit: None,

            visible: Vec::new(),
            selected: 0,
            offset: 0,
            page_size: 20,
            grid_columns: 1,

            detail: None,
            detail_scroll: 0,

            spotlight: Vec::new(),
            rng,

            history,
            store,

            status_msg: "Loading catalog...".to_string(),
        }
    }

    /// Take the outcome of the initial load. A failure leaves the catalog
    /// region showing the error notice; the rest of the app keeps working.
    pub fn set_catalog(&mut self, result: Result<Catalog, LoadError>) {
        match result {
            Ok(catalog) => {
                self.categories = catalog.categories();
                if let CategoryFilter::Only(c) = &self.state.category {
                    if !self.categories.contains(c) {
                        debug!("stored category {} not in catalog, showing all", c);
                        self.state.category = CategoryFilter::All;
                    }
                }
                self.status_msg = format!("{} items loaded from {}", catalog.len(), self.source);
                self.catalog = Some(catalog);
                self.load_error = None;
            }
            Err(e) => {
                warn!("catalog load failed: {}", e);
                self.status_msg = e.user_message();
                self.load_error = Some(e.user_message());
                self.catalog = None;
            }
        }
        self.refresh();
        self.reshuffle_spotlight();
    }

    pub fn items(&self) -> &[Item] {
        self.catalog.as_ref().map(Catalog::items).unwrap_or(&[])
    }

    /// Re-run filter, sort, search and the preview limit.
    pub fn refresh(&mut self) {
        let items = self.items();
        let positions: HashMap<*const Item, usize> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item as *const Item, i))
            .collect();
        let shown = view::take_preview(&self.state.apply(items), self.limit);
        let visible: Vec<usize> = shown
            .into_iter()
            .filter_map(|item| positions.get(&(item as *const Item)).copied())
            .collect();
        self.visible = visible;
        self.selected = 0;
        self.offset = 0;
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &Item> {
        let items = self.items();
        self.visible.iter().filter_map(move |&i| items.get(i))
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.visible
            .get(self.selected)
            .and_then(|&i| self.items().get(i))
    }

    pub fn detail_item(&self) -> Option<&Item> {
        self.detail.and_then(|i| self.items().get(i))
    }

    pub fn spotlight_items(&self) -> Vec<&Item> {
        let items = self.items();
        self.spotlight.iter().filter_map(|&i| items.get(i)).collect()
    }

    /// Update paging from the catalog area size.
    pub fn update_page_size(&mut self, width: u16, height: u16) {
        let rows = height.saturating_sub(CATALOG_OVERHEAD).max(1);
        match self.state.layout {
            Layout::List => {
                self.grid_columns = 1;
                self.page_size = rows as usize;
            }
            Layout::Grid => {
                self.grid_columns = (width.saturating_sub(2) / GRID_CARD_WIDTH).max(1) as usize;
                let card_rows = (rows / GRID_CARD_HEIGHT).max(1) as usize;
                self.page_size = card_rows * self.grid_columns;
            }
        }
        self.ensure_visible();
    }

    fn ensure_visible(&mut self) {
        let page = self.page_size.max(1);
        if self.selected < self.offset {
            self.offset = self.selected - self.selected % self.grid_columns.max(1);
        } else if self.selected >= self.offset + page {
            let first_row = (self.selected + 1).saturating_sub(page);
            let cols = self.grid_columns.max(1);
            self.offset = first_row.div_ceil(cols) * cols;
        }
    }

    fn move_by(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        let target = self.selected as isize + delta;
        self.selected = target.clamp(0, last as isize) as usize;
        self.ensure_visible();
    }

    /// Down one row: one item in list layout, one row of cards in grid.
    pub fn next_row(&mut self) {
        self.move_by(self.grid_columns as isize);
    }

    pub fn prev_row(&mut self) {
        self.move_by(-(self.grid_columns as isize));
    }

    pub fn next_item(&mut self) {
        self.move_by(1);
    }

    pub fn prev_item(&mut self) {
        self.move_by(-1);
    }

    pub fn page_down(&mut self) {
        self.move_by(self.page_size as isize);
    }

    pub fn page_up(&mut self) {
        self.move_by(-(self.page_size as isize));
    }

    pub fn jump_first(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    pub fn jump_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
        self.ensure_visible();
    }

    pub fn cycle_category(&mut self) {
        let next = self.state.category.cycle(&self.categories);
        self.state = std::mem::take(&mut self.state).with_category(next);
        self.refresh();
        self.status_msg = format!(
            "{} items in \"{}\"",
            self.visible.len(),
            self.state.category.as_str()
        );
    }

    pub fn cycle_sort(&mut self) {
        let next = self.state.sort.next();
        self.state = std::mem::take(&mut self.state).with_sort(next);
        self.refresh();
        self.status_msg = format!("Sorted by {}", next.label());
    }

    pub fn toggle_layout(&mut self) {
        let next = self.state.layout.toggle();
        self.state = std::mem::take(&mut self.state).with_layout(next);
        self.status_msg = format!("{} view", next.as_str());
    }

    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.status_msg = format!("Theme: {}", self.theme.as_str());
    }

    pub fn push_search(&mut self, c: char) {
        self.state.search.push(c);
        self.refresh();
    }

    pub fn pop_search(&mut self) {
        self.state.search.pop();
        self.refresh();
    }

    pub fn clear_search(&mut self) {
        if !self.state.search.is_empty() {
            self.state.search.clear();
            self.refresh();
        }
    }

    /// Open the details dialog for the selected item and log the view.
    pub fn open_detail(&mut self) {
        let Some(&index) = self.visible.get(self.selected) else {
            return;
        };
        let key = self.items()[index].key();
        self.history.record(&key, chrono::Utc::now());
        debug!("opened detail for {}", key);
        self.detail = Some(index);
        self.detail_scroll = 0;
        self.view = View::Detail;
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.view = View::Catalog;
    }

    pub fn reshuffle_spotlight(&mut self) {
        let items = self.catalog.as_ref().map(Catalog::items).unwrap_or(&[]);
        let picked = spotlight::select(items, self.rng.as_mut());
        let positions: Vec<usize> = picked
            .into_iter()
            .filter_map(|p| items.iter().position(|i| std::ptr::eq(i, p)))
            .collect();
        self.spotlight = positions;
    }

    pub fn scroll_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
    }

    /// Write view state, theme and history back to the preference store.
    pub fn persist(&mut self) -> Result<(), PrefsError> {
        self.state.write_to(self.store.as_mut());
        match self.theme {
            Theme::Auto => self.store.remove(KEY_THEME),
            theme => self.store.set(KEY_THEME, theme.as_str()),
        }
        self.history.write_to(self.store.as_mut())?;
        self.store.save()?;
        info!("preferences saved");
        Ok(())
    }
}
