//! Item page extraction: description page blocks, activity-log posts and
//! discussion entries.

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

use crate::domain::models::ActivityEntry;
use crate::extractor::normalize_ws;

/// Body text the source substitutes for moderated discussion entries.
/// Entries carrying it are dropped, not stored.
pub const REMOVED_PLACEHOLDER: &str = "This comment has been removed by Kickstarter.";

/// A discussion entry as found in markup, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiscussionEntry {
    pub body: String,
    pub creator: bool,
    pub superbacker: bool,
}

fn selector(cell: &'static OnceLock<Selector>, css: &'static str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).unwrap())
}

/// Full description block of the description page, if present.
pub fn extract_description(html: &str) -> Option<String> {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let document = Html::parse_document(html);
    first_text(&document, selector(&SELECTOR, ".full-description"))
}

/// Risks-and-challenges block of the description page, if present.
pub fn extract_risks(html: &str) -> Option<String> {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let document = Html::parse_document(html);
    first_text(&document, selector(&SELECTOR, ".js-risks"))
}

/// FAQ count shown on the description page; 0 when the counter is absent
/// or unparsable.
pub fn extract_faq_count(html: &str) -> i64 {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let document = Html::parse_document(html);
    document
        .select(selector(&SELECTOR, r#"[data-content="faqs"] .count"#))
        .next()
        .and_then(|el| normalize_ws(&collect_text(el)).parse::<i64>().ok())
        .unwrap_or(0)
}

/// Activity-log posts of one `updates` page, in document order.
pub fn extract_activity_entries(html: &str) -> Vec<ActivityEntry> {
    static POST: OnceLock<Selector> = OnceLock::new();
    static TITLE: OnceLock<Selector> = OnceLock::new();
    static BODY: OnceLock<Selector> = OnceLock::new();

    let document = Html::parse_document(html);
    document
        .select(selector(&POST, ".post"))
        .map(|post| ActivityEntry {
            title: child_text(post, selector(&TITLE, ".title")),
            body: child_text(post, selector(&BODY, ".body")),
        })
        .collect()
}

/// Discussion entries of one `comments` page, in document order. Removed
/// placeholders are kept here; dropping them is assembly policy.
pub fn extract_discussion_entries(html: &str) -> Vec<RawDiscussionEntry> {
    static COMMENT: OnceLock<Selector> = OnceLock::new();
    static BODY: OnceLock<Selector> = OnceLock::new();

    let document = Html::parse_document(html);
    document
        .select(selector(&COMMENT, ".comment"))
        .map(|comment| {
            let classes = comment.value();
            RawDiscussionEntry {
                body: child_text(comment, selector(&BODY, "p")),
                creator: classes.has_class("creator", scraper::CaseSensitivity::AsciiCaseInsensitive),
                superbacker: classes
                    .has_class("superbacker", scraper::CaseSensitivity::AsciiCaseInsensitive),
            }
        })
        .collect()
}

/// The "older comments" cursor link of a discussion page, absolute and
/// followed verbatim. Absent on the last page.
pub fn extract_older_link(html: &str) -> Option<String> {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let document = Html::parse_document(html);
    document
        .select(selector(&SELECTOR, "a.older_comments[href]"))
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|href| href.to_string())
}

fn first_text(document: &Html, sel: &Selector) -> Option<String> {
    document
        .select(sel)
        .next()
        .map(|el| normalize_ws(&collect_text(el)))
        .filter(|text| !text.is_empty())
}

fn child_text(parent: ElementRef<'_>, sel: &Selector) -> String {
    let text = parent
        .select(sel)
        .map(collect_text)
        .collect::<Vec<_>>()
        .join(" ");
    normalize_ws(&text)
}

fn collect_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_and_risks_are_normalized() {
        let html = r#"
            <div class="full-description">
                <p>A   gadget</p>
                <p>that  beeps</p>
            </div>
            <div class="js-risks">Might
            not   beep</div>
        "#;
        assert_eq!(extract_description(html).unwrap(), "A gadget that beeps");
        assert_eq!(extract_risks(html).unwrap(), "Might not beep");
    }

    #[test]
    fn missing_blocks_yield_none() {
        let html = "<html><body><p>nothing here</p></body></html>";
        assert!(extract_description(html).is_none());
        assert!(extract_risks(html).is_none());
    }

    #[test]
    fn faq_count_defaults_to_zero() {
        assert_eq!(extract_faq_count("<html></html>"), 0);
        let html = r#"<li data-content="faqs"><span class="count">4</span></li>"#;
        assert_eq!(extract_faq_count(html), 4);
        let junk = r#"<li data-content="faqs"><span class="count">soon</span></li>"#;
        assert_eq!(extract_faq_count(junk), 0);
    }

    #[test]
    fn activity_entries_preserve_document_order() {
        let html = r#"
            <div class="post"><h2 class="title">First </h2><div class="body">one  body</div></div>
            <div class="post"><h2 class="title">Second</h2><div class="body">two body</div></div>
        "#;
        let entries = extract_activity_entries(html);
        assert_eq!(
            entries,
            vec![
                ActivityEntry {
                    title: "First".to_string(),
                    body: "one body".to_string()
                },
                ActivityEntry {
                    title: "Second".to_string(),
                    body: "two body".to_string()
                },
            ]
        );
    }

    #[test]
    fn discussion_entries_carry_badges() {
        let html = r#"
            <li class="comment creator"><p>We fixed it!</p></li>
            <li class="comment"><p>Great   news</p></li>
            <li class="comment superbacker"><p>Backed again</p></li>
        "#;
        let entries = extract_discussion_entries(html);
        assert_eq!(entries.len(), 3);
        assert!(entries[0].creator && !entries[0].superbacker);
        assert_eq!(entries[1].body, "Great news");
        assert!(entries[2].superbacker);
    }

    #[test]
    fn older_link_present_then_absent() {
        let with = r#"<a class="older_comments" href="https://example.com/c?cursor=9">Older</a>"#;
        assert_eq!(
            extract_older_link(with).unwrap(),
            "https://example.com/c?cursor=9"
        );
        assert!(extract_older_link("<html></html>").is_none());
    }
}
