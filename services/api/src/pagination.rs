//! Limit/offset pagination for list endpoints
//!
//! Pagination is opt-in: a list is returned as a plain array unless the
//! request carries `limit` or `offset`, in which case it is wrapped in a
//! [`Page`] envelope.

use serde::{Deserialize, Serialize};

/// Raw query parameters; parsed leniently, like the rest of the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Page size limits for a paginated resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Pagination {
    pub fn new(default_limit: u32, max_limit: u32) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    /// The requested window, or `None` when the client asked for the full list.
    ///
    /// A missing, malformed or non-positive `limit` falls back to the default
    /// size; a malformed or negative `offset` is treated as 0.
    pub fn request(&self, params: &PageParams) -> Option<PageRequest> {
        if params.limit.is_none() && params.offset.is_none() {
            return None;
        }

        let limit = params
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(self.default_limit)
            .min(self.max_limit);

        let offset = params
            .offset
            .as_deref()
            .and_then(|o| o.trim().parse::<u64>().ok())
            .unwrap_or(0);

        Some(PageRequest {
            limit: i64::from(limit),
            offset: i64::try_from(offset).unwrap_or(i64::MAX),
        })
    }
}

/// A resolved limit/offset window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    /// Wrap one window of results. `path` is the request path the links point
    /// back to.
    pub fn page<T>(self, path: &str, count: i64, results: Vec<T>) -> Page<T> {
        let next = (self.offset.saturating_add(self.limit) < count).then(|| {
            format!(
                "{}?limit={}&offset={}",
                path,
                self.limit,
                self.offset + self.limit
            )
        });

        let previous = if self.offset <= 0 {
            None
        } else if self.offset - self.limit <= 0 {
            Some(format!("{}?limit={}", path, self.limit))
        } else {
            Some(format!(
                "{}?limit={}&offset={}",
                path,
                self.limit,
                self.offset - self.limit
            ))
        };

        Page {
            count,
            next,
            previous,
            results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Either the whole collection or one page of it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Full(Vec<T>),
    Page(Page<T>),
}

impl<T> Listing<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        match self {
            Listing::Full(items) => Listing::Full(items.into_iter().map(f).collect()),
            Listing::Page(page) => Listing::Page(Page {
                count: page.count,
                next: page.next,
                previous: page.previous,
                results: page.results.into_iter().map(f).collect(),
            }),
        }
    }
}
