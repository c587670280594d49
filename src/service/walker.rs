//! Generic pagination drivers for auxiliary sub-resources.
//!
//! Two styles exist in the source: numbered pages (`?page=N`) that end on
//! the first page with zero records, and cursor pages chained by an
//! explicit "older" link that ends when the link is absent. Both extract
//! records synchronously from the fetched markup and accumulate them in
//! page-then-document order.

use std::collections::HashSet;

use crate::service::http::PageFetcher;

/// Upper bound on cursor hops. The upstream contract is that the chain
/// eventually ends; this guard keeps a self-referential link from looping
/// forever.
pub const MAX_CURSOR_STEPS: usize = 1_000;

/// Records accumulated by a walk, plus whether the walk reached its
/// natural end. `complete == false` means a fetch failure or cursor guard
/// cut it short; callers accept the partial data and log it.
#[derive(Debug)]
pub struct WalkOutcome<T> {
    pub records: Vec<T>,
    pub complete: bool,
}

/// Append `page=N` to a base URL, picking the right separator.
pub fn page_url(base: &str, page: usize) -> String {
    if base.contains('?') {
        format!("{base}&page={page}")
    } else {
        format!("{base}?page={page}")
    }
}

/// Numbered-page walk: fetch `base?page=N` from N=1 upward until a page
/// yields zero records. The empty page is a normal stop, not an error.
pub async fn walk_numbered<T>(
    fetcher: &PageFetcher,
    base: &str,
    extract: impl Fn(&str) -> Vec<T>,
) -> WalkOutcome<T> {
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        let url = page_url(base, page);
        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("walk aborted at {url}: {e}");
                return WalkOutcome {
                    records,
                    complete: false,
                };
            }
        };

        let batch = extract(&body);
        if batch.is_empty() {
            break;
        }
        records.extend(batch);
        page += 1;
    }

    WalkOutcome {
        records,
        complete: true,
    }
}

/// Cursor walk: fetch `start`, then keep following the link `next` finds
/// in each page, verbatim, until no link is present. A repeated URL or an
/// overlong chain trips the cycle guard and ends the walk as incomplete.
pub async fn walk_cursor<T>(
    fetcher: &PageFetcher,
    start: &str,
    extract: impl Fn(&str) -> Vec<T>,
    next: impl Fn(&str) -> Option<String>,
) -> WalkOutcome<T> {
    let mut records = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut url = start.to_string();

    loop {
        if !visited.insert(url.clone()) {
            tracing::warn!("cursor walk revisited {url}, stopping");
            return WalkOutcome {
                records,
                complete: false,
            };
        }
        if visited.len() > MAX_CURSOR_STEPS {
            tracing::warn!("cursor walk exceeded {MAX_CURSOR_STEPS} steps, stopping");
            return WalkOutcome {
                records,
                complete: false,
            };
        }

        let body = match fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("walk aborted at {url}: {e}");
                return WalkOutcome {
                    records,
                    complete: false,
                };
            }
        };

        records.extend(extract(&body));

        match next(&body) {
            Some(older) => url = older,
            None => break,
        }
    }

    WalkOutcome {
        records,
        complete: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(body: &str) -> Vec<String> {
        body.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("next:"))
            .map(str::to_string)
            .collect()
    }

    fn next_line(body: &str) -> Option<String> {
        body.lines()
            .find_map(|l| l.trim().strip_prefix("next:").map(str::to_string))
    }

    #[tokio::test]
    async fn numbered_walk_stops_on_first_empty_page() {
        let mut server = mockito::Server::new_async().await;
        let _p1 = server
            .mock("GET", "/updates?page=1")
            .with_body("a\nb")
            .create_async()
            .await;
        let _p2 = server
            .mock("GET", "/updates?page=2")
            .with_body("c")
            .create_async()
            .await;
        let p3 = server
            .mock("GET", "/updates?page=3")
            .with_body("")
            .create_async()
            .await;
        let p4 = server
            .mock("GET", "/updates?page=4")
            .with_body("never")
            .expect(0)
            .create_async()
            .await;

        let fetcher = PageFetcher::new().unwrap();
        let out = walk_numbered(&fetcher, &format!("{}/updates", server.url()), lines).await;

        assert!(out.complete);
        assert_eq!(out.records, vec!["a", "b", "c"]);
        p3.assert_async().await;
        p4.assert_async().await; // page 4 never fetched
    }

    #[tokio::test]
    async fn numbered_walk_returns_partial_on_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _p1 = server
            .mock("GET", "/updates?page=1")
            .with_body("a")
            .create_async()
            .await;
        let _p2 = server
            .mock("GET", "/updates?page=2")
            .with_status(500)
            .create_async()
            .await;

        let fetcher = PageFetcher::new().unwrap();
        let out = walk_numbered(&fetcher, &format!("{}/updates", server.url()), lines).await;

        assert!(!out.complete);
        assert_eq!(out.records, vec!["a"]);
    }

    #[tokio::test]
    async fn numbered_walk_keeps_existing_query_string() {
        assert_eq!(page_url("http://x/list?sort=newest", 2), "http://x/list?sort=newest&page=2");
        assert_eq!(page_url("http://x/updates", 1), "http://x/updates?page=1");
    }

    #[tokio::test]
    async fn cursor_walk_follows_older_link_in_order() {
        let mut server = mockito::Server::new_async().await;
        let second = format!("{}/comments?cursor=2", server.url());
        let _p1 = server
            .mock("GET", "/comments")
            .with_body(format!("a\nb\nnext:{second}"))
            .create_async()
            .await;
        let _p2 = server
            .mock("GET", "/comments?cursor=2")
            .with_body("c")
            .create_async()
            .await;

        let fetcher = PageFetcher::new().unwrap();
        let out = walk_cursor(
            &fetcher,
            &format!("{}/comments", server.url()),
            lines,
            next_line,
        )
        .await;

        assert!(out.complete);
        assert_eq!(out.records, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn cursor_walk_guards_against_self_referential_link() {
        let mut server = mockito::Server::new_async().await;
        let own = format!("{}/comments", server.url());
        let _p = server
            .mock("GET", "/comments")
            .with_body(format!("a\nnext:{own}"))
            .expect(1)
            .create_async()
            .await;

        let fetcher = PageFetcher::new().unwrap();
        let out = walk_cursor(&fetcher, &own, lines, next_line).await;

        assert!(!out.complete, "cycle stops the walk");
        assert_eq!(out.records, vec!["a"]);
    }
}
