use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;

use crate::domain::models::{ImageRecord, ScanResult, MAX_RECORDED_IMAGES};

/// Elements whose text never renders.
const HIDDEN_TEXT_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

pub struct PageExtractor;

impl PageExtractor {
    /// Run every structural check against one parsed document.
    pub fn scan_html(html: &str) -> ScanResult {
        let document = Html::parse_document(html);

        let all_images = Self::extract_images(&document);
        let image_count = all_images.len();
        let missing_alt_count = all_images.iter().filter(|i| i.is_missing_alt()).count();
        let lazy_count = all_images.iter().filter(|i| i.is_lazy()).count();

        let text = Self::visible_text(&document);

        let mut images = all_images;
        images.truncate(MAX_RECORDED_IMAGES);

        ScanResult {
            image_count,
            missing_alt_count,
            lazy_count,
            has_search: Self::has_search(&document),
            has_add_to_cart: Self::has_add_to_cart(&document),
            has_price: Self::has_price(&text),
            has_shipping_text: Self::has_shipping_text(&text),
            images,
        }
    }

    pub fn extract_images(html: &Html) -> Vec<ImageRecord> {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("img").unwrap());

        html.select(selector)
            .map(|element| {
                let attr = |name: &str| element.value().attr(name).map(|s| s.to_string());
                ImageRecord {
                    src: attr("src").unwrap_or_default(),
                    alt: attr("alt"),
                    width: attr("width"),
                    height: attr("height"),
                    loading: attr("loading"),
                }
            })
            .collect()
    }

    pub fn has_search(html: &Html) -> bool {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| {
            Selector::parse(r#"form[action*="search"], input[type="search"], input[name="q"]"#)
                .unwrap()
        });
        html.select(selector).next().is_some()
    }

    /// Loose heuristic: any matched button with text counts, an explicit
    /// "add ... cart" label is not required.
    pub fn has_add_to_cart(html: &Html) -> bool {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| {
            Selector::parse(
                r#"form[action*="cart/add"] button, button[name="add"], button[type="submit"]"#,
            )
            .unwrap()
        });

        let labels: Vec<String> = html
            .select(selector)
            .map(|button| button.text().collect::<String>().trim().to_lowercase())
            .filter(|text| !text.is_empty())
            .collect();

        labels
            .iter()
            .any(|text| text.contains("add") && text.contains("cart"))
            || !labels.is_empty()
    }

    pub fn has_price(text: &str) -> bool {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| Regex::new(r"\$[\d,.]+").unwrap());
        pattern.is_match(text)
    }

    pub fn has_shipping_text(text: &str) -> bool {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"(?i)shipping|returns|money[\s-]back|guarantee").unwrap()
        });
        pattern.is_match(text)
    }

    /// Text under `body` (or the whole document), skipping script/style subtrees.
    pub fn visible_text(html: &Html) -> String {
        static SELECTOR: OnceLock<Selector> = OnceLock::new();
        let selector = SELECTOR.get_or_init(|| Selector::parse("body").unwrap());
        let root = html
            .select(selector)
            .next()
            .unwrap_or_else(|| html.root_element());

        let mut text = String::new();
        collect_text(root, &mut text);
        text
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if HIDDEN_TEXT_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}
