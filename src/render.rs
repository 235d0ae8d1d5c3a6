//! Item → display fragment mapping.
//!
//! Fragments are plain data; `to_html` is the only place markup is assembled.
//! Every piece of item text goes through [`escape_html`] on the way in, and the
//! [`Escaped`] newtype keeps raw text from reaching the markup by accident.

use crate::catalog::{present, Item, Tier};
use crate::view::Layout;
use std::fmt::{self, Write};

/// Text that has been through [`escape_html`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Escaped(String);

impl Escaped {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Undo the escaping, for surfaces that are not markup.
    pub fn to_plain(&self) -> String {
        self.0
            .replace("&gt;", ">")
            .replace("&lt;", "<")
            .replace("&#39;", "'")
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
    }
}

impl fmt::Display for Escaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape `& " ' < >`. The ampersand goes first so existing entities are
/// escaped exactly once.
pub fn escape_html(s: &str) -> Escaped {
    Escaped(
        s.replace('&', "&amp;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    )
}

/// Tier-derived label and style class shown on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub tier: Tier,
    pub label: &'static str,
    pub class: &'static str,
}

impl Badge {
    pub fn text(&self) -> &'static str {
        match self.tier {
            Tier::Diamond => "💎 Diamond Member",
            Tier::Gold => "🥇 Gold Member",
            Tier::Silver => "🥈 Silver Member",
            Tier::Bronze => "🥉 Bronze Member",
            Tier::Member => "Member",
        }
    }
}

pub fn badge_for_tier(level: Option<i64>) -> Badge {
    let tier = Tier::from_level(level);
    let class = match tier {
        Tier::Diamond => "badge-diamond",
        Tier::Gold => "badge-gold",
        Tier::Silver => "badge-silver",
        Tier::Bronze => "badge-bronze",
        Tier::Member => "badge-member",
    };
    Badge {
        tier,
        label: tier.label(),
        class,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Member,
    Product,
    Spotlight,
    Detail,
}

impl CardKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Product => "product",
            Self::Spotlight => "spotlight",
            Self::Detail => "modal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Address,
    Phone,
    Website,
    Email,
    Category,
    Description,
    Price,
    Rating,
    Id,
}

impl FieldKind {
    pub fn class(self) -> &'static str {
        match self {
            Self::Address => "field-address",
            Self::Phone => "field-phone",
            Self::Website => "field-website",
            Self::Email => "field-email",
            Self::Category => "product-category",
            Self::Description => "product-description",
            Self::Price => "product-price",
            Self::Rating => "product-rating",
            Self::Id => "field-id",
        }
    }
}

/// One line of a card. `href` turns the text into a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub kind: FieldKind,
    pub label: Option<&'static str>,
    pub text: Escaped,
    pub href: Option<Escaped>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub in_stock: bool,
    pub text: &'static str,
}

impl Availability {
    fn class(&self) -> &'static str {
        if self.in_stock { "in-stock" } else { "out-of-stock" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub label: &'static str,
    pub class: &'static str,
}

/// A self-contained display value for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: CardKind,
    pub id: Option<Escaped>,
    pub category: Option<Escaped>,
    pub title: Escaped,
    pub subtitle: Option<Escaped>,
    pub image: Option<Escaped>,
    pub fields: Vec<Field>,
    pub badge: Option<Badge>,
    pub availability: Option<Availability>,
    pub actions: Vec<Action>,
}

impl Fragment {
    fn new(kind: CardKind, item: &Item) -> Self {
        Self {
            kind,
            id: item.id.as_ref().map(|id| escape_html(&id.to_string())),
            category: Some(item.category())
                .filter(|c| !c.is_empty())
                .map(escape_html),
            title: escape_html(&item.name),
            subtitle: present(&item.tagline).map(escape_html),
            image: present(&item.image).map(escape_html),
            fields: Vec::new(),
            badge: None,
            availability: None,
            actions: Vec::new(),
        }
    }

    pub fn field(&self, kind: FieldKind) -> Option<&Field> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    /// Plain-text value of a field, for terminal display.
    pub fn plain(&self, kind: FieldKind) -> Option<String> {
        self.field(kind).map(|f| f.text.to_plain())
    }

    pub fn to_html(&self) -> String {
        let p = self.kind.prefix();
        let mut out = String::new();
        let _ = write!(out, "<div class=\"{}-card\"", p);
        if let Some(id) = &self.id {
            let _ = write!(out, " data-id=\"{}\"", id);
        }
        if let Some(category) = &self.category {
            let _ = write!(out, " data-category=\"{}\"", category);
        }
        out.push_str(">\n");
        if let Some(src) = &self.image {
            let _ = writeln!(
                out,
                "  <img src=\"{}\" alt=\"{}\" class=\"{}-image\" loading=\"lazy\">",
                src, self.title, p
            );
        }
        let _ = writeln!(out, "  <div class=\"{}-info\">", p);
        let _ = writeln!(out, "    <h3>{}</h3>", self.title);
        if let Some(subtitle) = &self.subtitle {
            let _ = writeln!(out, "    <p class=\"{}-tagline\">{}</p>", p, subtitle);
        }
        if !self.fields.is_empty() {
            let _ = writeln!(out, "    <div class=\"{}-details\">", p);
            for field in &self.fields {
                out.push_str("      ");
                write_field(&mut out, field);
                out.push('\n');
            }
            out.push_str("    </div>\n");
        }
        if let Some(badge) = &self.badge {
            let _ = writeln!(
                out,
                "    <span class=\"membership-badge {}\">{}</span>",
                badge.class,
                badge.text()
            );
        }
        if let Some(availability) = &self.availability {
            let _ = writeln!(
                out,
                "    <span class=\"stock-status {}\">{}</span>",
                availability.class(),
                availability.text
            );
        }
        for action in &self.actions {
            let _ = write!(out, "    <button class=\"{}\"", action.class);
            if let Some(id) = &self.id {
                let _ = write!(out, " data-id=\"{}\"", id);
            }
            let _ = writeln!(out, ">{}</button>", action.label);
        }
        out.push_str("  </div>\n</div>\n");
        out
    }
}

fn write_field(out: &mut String, field: &Field) {
    let _ = write!(out, "<p class=\"{}\">", field.kind.class());
    if let Some(label) = field.label {
        let _ = write!(out, "{} ", label);
    }
    match &field.href {
        Some(href) => {
            let target = if field.kind == FieldKind::Website {
                " target=\"_blank\" rel=\"noopener\""
            } else {
                ""
            };
            let _ = write!(out, "<a href=\"{}\"{}>{}</a>", href, target, field.text);
        }
        None => {
            let _ = write!(out, "{}", field.text);
        }
    }
    out.push_str("</p>");
}

/// Formatting knobs for prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub currency: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            currency: "₦".to_string(),
        }
    }
}

/// Thousands-separated price with the currency symbol in front. Two decimals
/// are shown only when the amount has a fractional part.
pub fn format_price(price: f64, currency: &str) -> String {
    if !price.is_finite() {
        return format!("{}{}", currency, price);
    }
    let fixed = format!("{:.2}", price.abs());
    let (digits, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let zero = digits.bytes().all(|b| b == b'0') && frac == "00";
    let sign = if price < 0.0 && !zero { "-" } else { "" };
    if frac == "00" {
        format!("{}{}{}", sign, currency, grouped)
    } else {
        format!("{}{}{}.{}", sign, currency, grouped, frac)
    }
}

/// One star (U+2B50) per whole rating point, at most five.
pub fn stars(rating: f64) -> String {
    let n = rating.floor().clamp(0.0, 5.0) as usize;
    "\u{2B50}".repeat(n)
}

fn text_field(kind: FieldKind, value: &str) -> Field {
    Field {
        kind,
        label: None,
        text: escape_html(value),
        href: None,
    }
}

fn link_field(kind: FieldKind, label: Option<&'static str>, value: &str, href: String) -> Field {
    Field {
        kind,
        label,
        text: escape_html(value),
        href: Some(escape_html(&href)),
    }
}

// Address, phone, website and email, each only when present.
fn contact_fields(item: &Item, labelled: bool) -> Vec<Field> {
    let mut fields = Vec::new();
    if let Some(address) = present(&item.address) {
        let mut f = text_field(FieldKind::Address, address);
        f.label = labelled.then_some("ADDRESS:");
        fields.push(f);
    }
    if let Some(phone) = present(&item.phone) {
        fields.push(link_field(
            FieldKind::Phone,
            labelled.then_some("PHONE:"),
            phone,
            format!("tel:{}", phone),
        ));
    }
    if let Some(website) = present(&item.website) {
        fields.push(link_field(
            FieldKind::Website,
            labelled.then_some("URL:"),
            website,
            website.to_string(),
        ));
    }
    if let Some(email) = present(&item.email) {
        fields.push(link_field(
            FieldKind::Email,
            labelled.then_some("EMAIL:"),
            email,
            format!("mailto:{}", email),
        ));
    }
    fields
}

fn availability(item: &Item, long: bool) -> Option<Availability> {
    let in_stock = item.in_stock?;
    let text = match (in_stock, long) {
        (true, false) => "In Stock",
        (false, false) => "Out of Stock",
        (true, true) => "✓ In Stock - Ready to Ship",
        (false, true) => "✗ Currently Out of Stock",
    };
    Some(Availability { in_stock, text })
}

fn rating_text(rating: f64, suffix: &str) -> String {
    format!("{} {}{}", stars(rating), rating, suffix).trim().to_string()
}

/// Card for a listing. Members (items with a membership level) get contact
/// details and a tier badge; everything else renders as a product card.
pub fn render_item(item: &Item, options: &RenderOptions) -> Fragment {
    if item.membership_level.is_some() {
        let mut fragment = Fragment::new(CardKind::Member, item);
        fragment.fields = contact_fields(item, false);
        fragment.badge = Some(badge_for_tier(item.membership_level));
        return fragment;
    }

    let mut fragment = Fragment::new(CardKind::Product, item);
    if let Some(description) = present(&item.description) {
        fragment.fields.push(text_field(FieldKind::Description, description));
    }
    if let Some(price) = item.price {
        fragment
            .fields
            .push(text_field(FieldKind::Price, &format_price(price, &options.currency)));
    }
    if let Some(rating) = item.rating {
        fragment.fields.push(text_field(FieldKind::Rating, &rating_text(rating, "")));
    }
    fragment.availability = availability(item, false);
    fragment.actions.push(Action {
        label: "View Details",
        class: "view-details",
    });
    fragment
}

/// Extended fragment for the details dialog.
pub fn render_detail(item: &Item, options: &RenderOptions) -> Fragment {
    let mut fragment = Fragment::new(CardKind::Detail, item);
    if let Some(price) = item.price {
        fragment
            .fields
            .push(text_field(FieldKind::Price, &format_price(price, &options.currency)));
    }
    if let Some(rating) = item.rating {
        fragment
            .fields
            .push(text_field(FieldKind::Rating, &rating_text(rating, " out of 5")));
    }
    if let Some(description) = present(&item.description) {
        fragment.fields.push(text_field(FieldKind::Description, description));
    }
    fragment.fields.extend(contact_fields(item, true));
    if let Some(id) = &item.id {
        let mut f = text_field(FieldKind::Id, &id.to_string());
        f.label = Some("Product ID:");
        fragment.fields.push(f);
    }
    if let Some(category) = fragment.category.clone() {
        fragment.fields.push(Field {
            kind: FieldKind::Category,
            label: Some("Category:"),
            text: category,
            href: None,
        });
    }
    if item.membership_level.is_some() {
        fragment.badge = Some(badge_for_tier(item.membership_level));
    }
    fragment.availability = availability(item, true);
    if item.in_stock == Some(true) {
        fragment.actions.push(Action {
            label: "Add to Cart",
            class: "submit-btn",
        });
    }
    fragment
}

/// Compact card for the spotlight panel: labelled contact links and badge.
pub fn render_spotlight(item: &Item) -> Fragment {
    let mut fragment = Fragment::new(CardKind::Spotlight, item);
    fragment.fields = contact_fields(item, true)
        .into_iter()
        .filter(|f| f.kind != FieldKind::Address)
        .collect();
    fragment.badge = Some(badge_for_tier(item.membership_level));
    fragment
}

/// Messages shown in place of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Empty,
    LoadError,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Self::Empty => "No items found in this category.",
            Self::LoadError => "Unable to load the catalog. Please try again later.",
        }
    }

    pub fn to_html(self) -> String {
        let class = match self {
            Self::Empty => "catalog-empty",
            Self::LoadError => "catalog-error",
        };
        format!("<p class=\"{}\">{}</p>\n", class, self.text())
    }
}

/// Full catalog region: the fragments inside a layout container, or the empty
/// notice when there is nothing to show.
pub fn render_region(fragments: &[Fragment], layout: Layout) -> String {
    let mut out = format!("<div class=\"{}\">\n", layout.container_class());
    if fragments.is_empty() {
        out.push_str(&Notice::Empty.to_html());
    } else {
        for fragment in fragments {
            out.push_str(&fragment.to_html());
        }
    }
    out.push_str("</div>\n");
    out
}

/// Standalone HTML page wrapping a rendered region.
pub fn render_document(title: &str, region: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        region
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{member, product};
    use crate::catalog::ItemId;
    use proptest::prelude::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("O'Brien & Sons <Ltd>").as_str(),
            "O&#39;Brien &amp; Sons &lt;Ltd&gt;"
        );
        assert_eq!(escape_html("\"q\"").as_str(), "&quot;q&quot;");
        assert_eq!(escape_html("&amp;").as_str(), "&amp;amp;");
        assert_eq!(escape_html("").as_str(), "");
    }

    #[test]
    fn test_to_plain_reverses_escaping() {
        for raw in ["O'Brien & Sons <Ltd>", "&amp; \"x\"", "&lt;", "plain"] {
            assert_eq!(escape_html(raw).to_plain(), raw);
        }
    }

    #[test]
    fn test_render_escapes_name_everywhere() {
        let mut item = member("O'Brien & Sons <Ltd>", 3);
        item.image = Some("logo.png".into());
        let html = render_item(&item, &RenderOptions::default()).to_html();
        assert!(!html.contains("O'Brien"));
        assert!(!html.contains("<Ltd>"));
        assert!(!html.contains("& Sons"));
        assert!(html.contains("<h3>O&#39;Brien &amp; Sons &lt;Ltd&gt;</h3>"));
        assert!(html.contains("alt=\"O&#39;Brien &amp; Sons &lt;Ltd&gt;\""));
    }

    #[test]
    fn test_render_escapes_hostile_links() {
        let mut item = member("Acme", 2);
        item.website = Some("https://x.test/\" onclick=\"alert(1)".into());
        let fragment = render_item(&item, &RenderOptions::default());
        let website = fragment.field(FieldKind::Website).unwrap();
        assert!(!website.href.as_ref().unwrap().as_str().contains('"'));
        assert!(!fragment.to_html().contains("\" onclick"));
    }

    #[test]
    fn test_missing_address_is_omitted() {
        let mut item = member("Acme", 1);
        item.phone = Some("555-0100".into());
        let fragment = render_item(&item, &RenderOptions::default());
        assert!(fragment.field(FieldKind::Address).is_none());
        let html = fragment.to_html();
        assert!(!html.contains("field-address"));
        assert!(!html.contains("undefined"));
        assert!(html.contains("<a href=\"tel:555-0100\">555-0100</a>"));
    }

    #[test]
    fn test_blank_fields_are_omitted() {
        let mut item = member("Acme", 1);
        item.address = Some("  ".into());
        item.tagline = Some(String::new());
        let fragment = render_item(&item, &RenderOptions::default());
        assert!(fragment.fields.is_empty());
        assert!(fragment.subtitle.is_none());
        assert!(!fragment.to_html().contains("member-details"));
    }

    #[test]
    fn test_present_address_is_rendered() {
        let mut item = member("Acme", 1);
        item.address = Some("12 Airport Rd, Warri".into());
        let html = render_item(&item, &RenderOptions::default()).to_html();
        assert!(html.contains("<p class=\"field-address\">12 Airport Rd, Warri</p>"));
    }

    #[test]
    fn test_badge_table() {
        let cases = [
            (Some(4), "Diamond", "badge-diamond"),
            (Some(3), "Gold", "badge-gold"),
            (Some(2), "Silver", "badge-silver"),
            (Some(1), "Bronze", "badge-bronze"),
            (Some(0), "Member", "badge-member"),
            (Some(5), "Member", "badge-member"),
            (Some(-1), "Member", "badge-member"),
            (None, "Member", "badge-member"),
        ];
        for (level, label, class) in cases {
            let badge = badge_for_tier(level);
            assert_eq!(badge.label, label, "level {:?}", level);
            assert_eq!(badge.class, class, "level {:?}", level);
        }
        assert_eq!(badge_for_tier(Some(3)).text(), "🥇 Gold Member");
        assert_eq!(badge_for_tier(None).text(), "Member");
    }

    #[test]
    fn test_product_card() {
        let mut item = product(7, "Ankara Dress", "women", 15000.0);
        item.rating = Some(4.5);
        item.in_stock = Some(true);
        let html = render_item(&item, &RenderOptions::default()).to_html();
        assert!(html.starts_with("<div class=\"product-card\" data-id=\"7\" data-category=\"women\">"));
        assert!(html.contains("₦15,000"));
        assert!(html.contains(&format!("{} 4.5", stars(4.5))));
        assert!(html.contains("<span class=\"stock-status in-stock\">In Stock</span>"));
        assert!(html.contains("<button class=\"view-details\" data-id=\"7\">View Details</button>"));
        assert!(!html.contains("membership-badge"));
    }

    #[test]
    fn test_product_without_stock_flag_has_no_status() {
        let item = product(1, "A", "x", 1.0);
        assert!(render_item(&item, &RenderOptions::default()).availability.is_none());
    }

    #[test]
    fn test_detail_fragment() {
        let mut item = product(3, "Kaftan", "men", 22000.0);
        item.rating = Some(4.8);
        item.in_stock = Some(false);
        let fragment = render_detail(&item, &RenderOptions::default());
        assert_eq!(
            fragment.field(FieldKind::Rating).unwrap().text.as_str(),
            format!("{} 4.8 out of 5", stars(4.8))
        );
        assert_eq!(fragment.field(FieldKind::Id).unwrap().text.as_str(), "3");
        assert_eq!(fragment.availability.unwrap().text, "✗ Currently Out of Stock");
        assert!(fragment.actions.is_empty());

        item.in_stock = Some(true);
        let fragment = render_detail(&item, &RenderOptions::default());
        assert_eq!(fragment.actions[0].label, "Add to Cart");
    }

    #[test]
    fn test_spotlight_fragment() {
        let mut item = member("Acme", 2);
        item.email = Some("hi@acme.test".into());
        item.address = Some("1 Main".into());
        let fragment = render_spotlight(&item);
        assert_eq!(fragment.kind, CardKind::Spotlight);
        assert!(fragment.field(FieldKind::Address).is_none());
        let html = fragment.to_html();
        assert!(html.contains("EMAIL: <a href=\"mailto:hi@acme.test\">hi@acme.test</a>"));
        assert!(html.contains("badge-silver"));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(15000.0, "₦"), "₦15,000");
        assert_eq!(format_price(999.0, "₦"), "₦999");
        assert_eq!(format_price(1234567.5, "$"), "$1,234,567.50");
        assert_eq!(format_price(0.0, "₦"), "₦0");
        assert_eq!(format_price(-1200.0, "₦"), "-₦1,200");
        assert_eq!(format_price(-0.001, "₦"), "₦0");
    }

    #[test]
    fn test_format_price_beyond_integer_range() {
        assert_eq!(format_price(2e20, "$"), "$200,000,000,000,000,000,000");
        assert_eq!(format_price(-2e20, "$"), "-$200,000,000,000,000,000,000");
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(4.9), "\u{2B50}".repeat(4));
        assert_eq!(stars(0.5), "");
        assert_eq!(stars(9.0).chars().count(), 5);
        assert_eq!(stars(-2.0), "");
    }

    #[test]
    fn test_notices_are_distinct() {
        assert_ne!(Notice::Empty.text(), Notice::LoadError.text());
        assert!(Notice::LoadError.to_html().contains("catalog-error"));
    }

    #[test]
    fn test_render_region() {
        let empty = render_region(&[], Layout::List);
        assert!(empty.starts_with("<div class=\"member-list\">"));
        assert!(empty.contains(Notice::Empty.text()));

        let item = product(1, "A", "x", 1.0);
        let region = render_region(&[render_item(&item, &RenderOptions::default())], Layout::Grid);
        assert!(region.starts_with("<div class=\"member-grid\">"));
        assert!(!region.contains(Notice::Empty.text()));
        assert!(render_document("Shop & Co", &region).contains("<title>Shop &amp; Co</title>"));
    }

    #[test]
    fn test_string_id_is_escaped() {
        let mut item = product(1, "A", "x", 1.0);
        item.id = Some(ItemId::Text("a\"b".into()));
        assert!(render_item(&item, &RenderOptions::default()).to_html().contains("data-id=\"a&quot;b\""));
    }

    fn arb_text() -> impl Strategy<Value = String> {
        "[a-z &<>\"']{0,12}"
    }

    proptest! {
        #[test]
        fn prop_rendered_text_has_no_raw_specials(
            name in arb_text(),
            tagline in arb_text(),
            description in arb_text(),
            address in arb_text(),
            level in prop::option::of(0i64..6),
        ) {
            let item = Item {
                id: Some(ItemId::Int(1)),
                name,
                tagline: Some(tagline),
                description: Some(description),
                address: Some(address),
                membership_level: level,
                ..Default::default()
            };
            let fragment = render_item(&item, &RenderOptions::default());
            let mut texts = vec![fragment.title.as_str()];
            texts.extend(fragment.subtitle.as_ref().map(Escaped::as_str));
            texts.extend(fragment.fields.iter().map(|f| f.text.as_str()));
            for text in texts {
                prop_assert!(!text.contains(['<', '>', '"', '\'']));
                // every ampersand starts an entity
                for (i, _) in text.match_indices('&') {
                    let rest = &text[i..];
                    prop_assert!(
                        rest.starts_with("&amp;")
                            || rest.starts_with("&lt;")
                            || rest.starts_with("&gt;")
                            || rest.starts_with("&quot;")
                            || rest.starts_with("&#39;")
                    );
                }
            }
        }
    }
}
