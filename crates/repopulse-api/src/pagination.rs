// Link-header pagination helpers
use reqwest::header::{HeaderMap, LINK};
use reqwest::Url;

/// Items requested per page. GitHub refuses to go higher.
pub const PER_PAGE: u32 = 100;

/// How many pages we are willing to walk before giving up on the rest
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

const SINGLE_PAGE: u32 = 1;

/// Work out the last page index from the `Link` header of the first page.
///
/// GitHub only sends `rel="last"` when there is more than one page, so a
/// missing header is the normal single-page case. A header we cannot make
/// sense of is treated exactly the same way.
pub fn last_page(headers: &HeaderMap) -> u32 {
    match parse_last_page(headers) {
        Some(page) => page,
        None => SINGLE_PAGE,
    }
}

fn parse_last_page(headers: &HeaderMap) -> Option<u32> {
    let link = headers.get(LINK)?.to_str().ok()?;

    let target = link.split(',').find_map(|part| {
        let (url, params) = part.split_once(';')?;
        let is_last = params
            .split(';')
            .any(|p| matches!(p.trim(), "rel=\"last\"" | "rel=last"));
        is_last.then(|| url.trim().trim_start_matches('<').trim_end_matches('>'))
    })?;

    let url = Url::parse(target).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
        .filter(|page| *page >= SINGLE_PAGE)
}

/// Which pages to fetch, after applying the page cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    /// Index of the final page we will request (inclusive)
    pub pages: u32,
    /// The real last page, set only when the cap cut it short
    pub truncated_from: Option<u32>,
}

impl PagePlan {
    pub fn new(last_page: u32, limit: u32) -> Self {
        if last_page > limit {
            Self {
                pages: limit,
                truncated_from: Some(last_page),
            }
        } else {
            Self {
                pages: last_page,
                truncated_from: None,
            }
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated_from.is_some()
    }
}
