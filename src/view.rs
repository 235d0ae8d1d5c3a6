//! View state and the pure filter/sort pipeline.
//!
//! Every function here takes the batch by shared reference and returns a new
//! sequence of references; the loaded items are never reordered in place.

use crate::catalog::Item;
use crate::prefs::PreferenceStore;
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Category selection. `All` is the sentinel that disables filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(s.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Only(c) => c,
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => item.category() == c,
        }
    }

    /// Next entry when cycling through `all` followed by `categories`.
    pub fn cycle(&self, categories: &[String]) -> Self {
        match self {
            Self::All => categories
                .first()
                .map(|c| Self::Only(c.clone()))
                .unwrap_or(Self::All),
            Self::Only(current) => {
                let pos = categories.iter().position(|c| c == current);
                match pos.and_then(|p| categories.get(p + 1)) {
                    Some(next) => Self::Only(next.clone()),
                    None => Self::All,
                }
            }
        }
    }
}

/// Sort selection. `None` keeps the input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    PriceLow,
    PriceHigh,
    Name,
    Rating,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        Self::None,
        Self::PriceLow,
        Self::PriceHigh,
        Self::Name,
        Self::Rating,
    ];

    /// Unknown strings fall back to `None`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "name" => Self::Name,
            "rating" => Self::Rating,
            _ => Self::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Name => "name",
            Self::Rating => "rating",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "Default",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Name => "Name",
            Self::Rating => "Top Rated",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::None => Self::PriceLow,
            Self::PriceLow => Self::PriceHigh,
            Self::PriceHigh => Self::Name,
            Self::Name => Self::Rating,
            Self::Rating => Self::None,
        }
    }
}

/// Presentation toggle; has no effect on order or membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Grid,
    List,
}

impl Layout {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "grid" => Some(Self::Grid),
            "list" => Some(Self::List),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Grid => Self::List,
            Self::List => Self::Grid,
        }
    }

    /// CSS class of the layout container.
    pub fn container_class(self) -> &'static str {
        match self {
            Self::Grid => "member-grid",
            Self::List => "member-list",
        }
    }
}

/// The user-selected parameters controlling what the catalog shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub category: CategoryFilter,
    pub sort: SortKey,
    pub layout: Layout,
    pub search: String,
}

pub const KEY_CATEGORY: &str = "category";
pub const KEY_SORT: &str = "sort";
pub const KEY_LAYOUT: &str = "layout";

impl ViewState {
    /// Read startup defaults; missing or unknown values keep the default.
    pub fn from_store(store: &dyn PreferenceStore) -> Self {
        let mut state = Self::default();
        if let Some(c) = store.get(KEY_CATEGORY) {
            state.category = CategoryFilter::parse(&c);
        }
        if let Some(s) = store.get(KEY_SORT) {
            state.sort = SortKey::parse(&s);
        }
        if let Some(layout) = store.get(KEY_LAYOUT).and_then(|l| Layout::parse(&l)) {
            state.layout = layout;
        }
        state
    }

    pub fn write_to(&self, store: &mut dyn PreferenceStore) {
        store.set(KEY_CATEGORY, self.category.as_str());
        store.set(KEY_SORT, self.sort.as_str());
        store.set(KEY_LAYOUT, self.layout.as_str());
    }

    pub fn with_category(self, category: CategoryFilter) -> Self {
        Self { category, ..self }
    }

    pub fn with_sort(self, sort: SortKey) -> Self {
        Self { sort, ..self }
    }

    pub fn with_layout(self, layout: Layout) -> Self {
        Self { layout, ..self }
    }

    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self
        }
    }

    /// Compose, then narrow by the search term when one is set.
    pub fn apply<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        let composed = compose(items, &self.category, self.sort);
        if self.search.trim().is_empty() {
            composed
        } else {
            search(&composed, &self.search)
        }
    }
}

/// Items whose category matches, in input order.
pub fn filter<'a>(items: &'a [Item], category: &CategoryFilter) -> Vec<&'a Item> {
    items.iter().filter(|item| category.matches(item)).collect()
}

/// A sorted copy of `items`. `slice::sort_by` is stable, so items with equal
/// keys keep their relative input order.
pub fn sort<'a>(items: &[&'a Item], key: SortKey) -> Vec<&'a Item> {
    let mut sorted = items.to_vec();
    match key {
        SortKey::PriceLow => sorted.sort_by(|a, b| a.price_or_zero().total_cmp(&b.price_or_zero())),
        SortKey::PriceHigh => sorted.sort_by(|a, b| b.price_or_zero().total_cmp(&a.price_or_zero())),
        SortKey::Name => sorted.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::Rating => sorted.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero())),
        SortKey::None => {}
    }
    sorted
}

/// Filter first, then sort.
pub fn compose<'a>(items: &'a [Item], category: &CategoryFilter, key: SortKey) -> Vec<&'a Item> {
    sort(&filter(items, category), key)
}

/// Case-insensitive substring match on name, description and category.
pub fn search<'a>(items: &[&'a Item], term: &str) -> Vec<&'a Item> {
    let term = term.trim().to_lowercase();
    items
        .iter()
        .copied()
        .filter(|item| {
            item.name.to_lowercase().contains(&term)
                || item
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&term))
                || item.category().to_lowercase().contains(&term)
        })
        .collect()
}

/// At most `limit` items from the front; `None` keeps everything.
pub fn take_preview<'a>(items: &[&'a Item], limit: Option<usize>) -> Vec<&'a Item> {
    match limit {
        Some(n) => items.iter().take(n).copied().collect(),
        None => items.to_vec(),
    }
}

// Case folding only; names that differ just by case compare equal and keep
// input order.
/// Collation key: canonical decomposition with combining marks dropped, then
/// lowercased. "Émile" sorts with the e's, not after "z".
fn fold_name(name: &str) -> String {
    name.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

/// Base letters first, then accents. Names differing only in case compare equal.
fn compare_names(a: &str, b: &str) -> Ordering {
    fold_name(a)
        .cmp(&fold_name(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
}
