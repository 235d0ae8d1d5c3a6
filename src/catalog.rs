use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Identifier of an item, unique within one loaded batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(i) => write!(f, "{}", i),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

/// Membership tier derived from a member's `membershipLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Diamond,
    Gold,
    Silver,
    Bronze,
    Member,
}

impl Tier {
    pub fn from_level(level: Option<i64>) -> Self {
        match level {
            Some(4) => Self::Diamond,
            Some(3) => Self::Gold,
            Some(2) => Self::Silver,
            Some(1) => Self::Bronze,
            _ => Self::Member,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Diamond => "diamond",
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Bronze => "bronze",
            Self::Member => "member",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Diamond => "Diamond",
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Bronze => "Bronze",
            Self::Member => "Member",
        }
    }
}

/// One directory member or catalog product.
///
/// Both document shapes deserialize into this struct; every field other than
/// `name` may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub id: Option<ItemId>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub membership_level: Option<i64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
}

impl Item {
    /// Category used for filtering: the explicit category, or the tier slug
    /// for members, or "" when neither is set.
    pub fn category(&self) -> &str {
        match (&self.category, self.membership_level) {
            (Some(c), _) => c,
            (None, Some(_)) => self.tier().slug(),
            (None, None) => "",
        }
    }

    pub fn tier(&self) -> Tier {
        Tier::from_level(self.membership_level)
    }

    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    pub fn is_in_stock(&self) -> bool {
        self.in_stock.unwrap_or(false)
    }

    /// Display key: the id when present, otherwise the name.
    pub fn key(&self) -> String {
        match &self.id {
            Some(id) => id.to_string(),
            None => self.name.clone(),
        }
    }
}

/// An optional text field counts as present only when it has non-blank content.
pub fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The accepted document shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Items(Vec<Item>),
    Products { products: Vec<Item> },
    Members { members: Vec<Item> },
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("malformed catalog document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("duplicate item id {0}")]
    DuplicateId(ItemId),
}

/// A loaded, validated batch of items. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn from_items(items: Vec<Item>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for item in &items {
            if let Some(id) = &item.id {
                if !seen.insert(id) {
                    return Err(CatalogError::DuplicateId(id.clone()));
                }
            }
        }
        Ok(Self { items })
    }

    /// Parse a JSON document: a bare array, `{"products": [...]}` or
    /// `{"members": [...]}`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let items = match serde_json::from_slice::<Document>(bytes)? {
            Document::Items(items) => items,
            Document::Products { products } => products,
            Document::Members { members } => members,
        };
        Self::from_items(items)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct categories in first-appearance order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .map(Item::category)
            .filter(|c| !c.is_empty() && seen.insert(*c))
            .map(str::to_string)
            .collect()
    }

    /// Look up an item by [`Item::key`]: explicit ids first, then the names
    /// of items that have no id.
    pub fn find(&self, key: &str) -> Option<&Item> {
        let key = key.trim();
        let by_id = self.items.iter().find(|item| match &item.id {
            Some(ItemId::Int(i)) => key.parse::<i64>().is_ok_and(|k| k == *i),
            Some(ItemId::Text(s)) => s == key,
            None => false,
        });
        by_id.or_else(|| {
            self.items
                .iter()
                .find(|item| item.id.is_none() && item.name.trim() == key)
        })
    }

    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.category().to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn group_by_category(&self) -> BTreeMap<String, Vec<&Item>> {
        let mut groups: BTreeMap<String, Vec<&Item>> = BTreeMap::new();
        for item in &self.items {
            groups.entry(item.category().to_string()).or_default().push(item);
        }
        groups
    }

    /// Mean rating rounded to one decimal; 0 for an empty batch.
    pub fn average_rating(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        let total: f64 = self.items.iter().map(Item::rating_or_zero).sum();
        (total / self.items.len() as f64 * 10.0).round() / 10.0
    }

    pub fn in_stock(&self) -> Vec<&Item> {
        self.items.iter().filter(|i| i.is_in_stock()).collect()
    }

    pub fn out_of_stock(&self) -> Vec<&Item> {
        self.items.iter().filter(|i| !i.is_in_stock()).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn product(id: i64, name: &str, category: &str, price: f64) -> Item {
        Item {
            id: Some(ItemId::Int(id)),
            name: name.to_string(),
            category: Some(category.to_string()),
            price: Some(price),
            ..Default::default()
        }
    }

    pub fn member(name: &str, level: i64) -> Item {
        Item {
            name: name.to_string(),
            membership_level: Some(level),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_bare_array() {
        let json = br#"[{"id":1,"name":"A","category":"gold","price":10}]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.items()[0].id, Some(ItemId::Int(1)));
        assert_eq!(catalog.items()[0].price, Some(10.0));
    }

    #[test]
    fn test_parse_products_document() {
        let json = br#"{"products":[
            {"id":1,"name":"Ankara Dress","category":"women","price":15000,"rating":4.5,"inStock":true,"description":"d","image":"a.webp"},
            {"id":2,"name":"Kaftan","category":"men","price":22000,"rating":4.8,"inStock":false}
        ]}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.items()[0].is_in_stock());
        assert!(!catalog.items()[1].is_in_stock());
        assert_eq!(catalog.items()[1].category(), "men");
    }

    #[test]
    fn test_parse_members_document_uses_tier_category() {
        let json = br#"{"members":[{"name":"Acme","membershipLevel":3,"address":"1 Main St"}]}"#;
        let catalog = Catalog::from_json(json).unwrap();
        let item = &catalog.items()[0];
        assert_eq!(item.id, None);
        assert_eq!(item.category(), "gold");
        assert_eq!(item.tier(), Tier::Gold);
    }

    #[test]
    fn test_string_ids_are_accepted() {
        let json = br#"[{"id":"sku-1","name":"A"},{"id":2,"name":"B"}]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.items()[0].id, Some(ItemId::Text("sku-1".into())));
        assert!(catalog.find("sku-1").is_some());
        assert!(catalog.find("2").is_some());
        assert!(catalog.find("3").is_none());
    }

    #[test]
    fn test_find_falls_back_to_name_for_items_without_id() {
        let catalog = Catalog::from_items(vec![
            product(1, "Ankara", "women", 10.0),
            member("Lagos Looms", 3),
            member("1", 1),
        ])
        .unwrap();
        let looms = catalog.find("Lagos Looms").unwrap();
        assert_eq!(looms.key(), "Lagos Looms");
        assert_eq!(catalog.find(&looms.key()).map(|i| i.name.as_str()), Some("Lagos Looms"));
        // an explicit id wins over a name
        assert_eq!(catalog.find("1").map(|i| i.name.as_str()), Some("Ankara"));
        // named items with an id are only reachable through that id
        assert!(catalog.find("Ankara").is_none());
    }

    #[test]
    fn test_malformed_document_is_rejected() {
        assert!(matches!(
            Catalog::from_json(b"{\"items\": 3}"),
            Err(CatalogError::Malformed(_))
        ));
        assert!(Catalog::from_json(b"not json").is_err());
        assert!(Catalog::from_json(br#"[{"id":1}]"#).is_err());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let json = br#"[{"id":1,"name":"A"},{"id":1,"name":"B"}]"#;
        match Catalog::from_json(json) {
            Err(CatalogError::DuplicateId(id)) => assert_eq!(id, ItemId::Int(1)),
            other => panic!("expected duplicate id error, got {:?}", other),
        }
    }

    #[test]
    fn test_items_without_ids_never_collide() {
        let catalog = Catalog::from_items(vec![member("A", 1), member("B", 1)]).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_tier_table() {
        assert_eq!(Tier::from_level(Some(4)), Tier::Diamond);
        assert_eq!(Tier::from_level(Some(3)), Tier::Gold);
        assert_eq!(Tier::from_level(Some(2)), Tier::Silver);
        assert_eq!(Tier::from_level(Some(1)), Tier::Bronze);
        assert_eq!(Tier::from_level(Some(0)), Tier::Member);
        assert_eq!(Tier::from_level(Some(5)), Tier::Member);
        assert_eq!(Tier::from_level(None), Tier::Member);
    }

    #[test]
    fn test_present_skips_blank_fields() {
        assert_eq!(present(&None), None);
        assert_eq!(present(&Some(String::new())), None);
        assert_eq!(present(&Some("   ".into())), None);
        assert_eq!(present(&Some(" x ".into())), Some("x"));
    }

    #[test]
    fn test_stats() {
        let mut a = product(1, "A", "women", 10.0);
        a.rating = Some(4.0);
        a.in_stock = Some(true);
        let mut b = product(2, "B", "men", 20.0);
        b.rating = Some(4.5);
        let mut c = product(3, "C", "women", 30.0);
        c.rating = Some(3.2);
        c.in_stock = Some(true);
        let catalog = Catalog::from_items(vec![a, b, c]).unwrap();

        let counts = catalog.category_counts();
        assert_eq!(counts.get("women"), Some(&2));
        assert_eq!(counts.get("men"), Some(&1));
        assert_eq!(catalog.categories(), vec!["women".to_string(), "men".to_string()]);
        assert_eq!(catalog.average_rating(), 3.9);
        assert_eq!(catalog.in_stock().len(), 2);
        assert_eq!(catalog.out_of_stock()[0].name, "B");
        assert_eq!(catalog.group_by_category()["women"].len(), 2);
        assert_eq!(Catalog::default().average_rating(), 0.0);
    }
}
