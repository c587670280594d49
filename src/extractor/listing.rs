//! Listing page extraction: (identifier, item URL) pairs.

use std::sync::OnceLock;

use scraper::{Html, Selector};
use url::Url;

/// One item reference discovered on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub id: i64,
    pub url: String,
}

/// Extract all item references from a listing page, resolving relative
/// links against `base`. Elements without a parsable identifier or link
/// are dropped.
pub fn extract_item_refs(html: &str, base: &Url) -> Vec<ItemRef> {
    static CARD: OnceLock<Selector> = OnceLock::new();
    static LINK: OnceLock<Selector> = OnceLock::new();
    let card = CARD.get_or_init(|| Selector::parse("[data-project_pid]").unwrap());
    let link = LINK.get_or_init(|| Selector::parse("a[href]").unwrap());

    let document = Html::parse_document(html);
    document
        .select(card)
        .filter_map(|element| {
            let id = element
                .value()
                .attr("data-project_pid")?
                .trim()
                .parse::<i64>()
                .ok()?;
            let href = element.select(link).next()?.value().attr("href")?;
            let url = base.join(href).ok()?.to_string();
            Some(ItemRef { id, url })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_ids_and_resolves_relative_links() {
        let base = Url::parse("https://example.com").unwrap();
        let html = r#"
            <div data-project_pid="101"><a href="/projects/maker/alpha">Alpha</a></div>
            <div data-project_pid="102"><a href="https://example.com/projects/maker/beta">Beta</a></div>
        "#;

        let refs = extract_item_refs(html, &base);
        assert_eq!(
            refs,
            vec![
                ItemRef {
                    id: 101,
                    url: "https://example.com/projects/maker/alpha".to_string()
                },
                ItemRef {
                    id: 102,
                    url: "https://example.com/projects/maker/beta".to_string()
                },
            ]
        );
    }

    #[test]
    fn skips_cards_without_parsable_id_or_link() {
        let base = Url::parse("https://example.com").unwrap();
        let html = r#"
            <div data-project_pid="nope"><a href="/projects/x">X</a></div>
            <div data-project_pid="7">no link in here</div>
            <div data-project_pid="8"><a href="/projects/y">Y</a></div>
        "#;

        let refs = extract_item_refs(html, &base);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].id, 8);
    }

    #[test]
    fn empty_page_yields_no_refs() {
        let base = Url::parse("https://example.com").unwrap();
        assert!(extract_item_refs("<html><body></body></html>", &base).is_empty());
    }
}
