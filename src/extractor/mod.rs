pub mod item_page;
pub mod listing;
pub mod payload;

/// Collapse every run of whitespace to a single space and trim the ends.
/// All text lifted out of markup goes through this.
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
