//! Paginated list responses.
//!
//! List endpoints return one [`Page`] per call. Pages are never followed
//! automatically: when [`Page::has_next`] is `true`, call `list` again with
//! [`Page::next_page_number`].
//!
//! # Example
//!
//! ```no_run
//! use finwise::{Client, PageParams};
//! use finwise::resources::ListTransactionsParams;
//!
//! # async fn example(client: Client) -> finwise::Result<()> {
//! let mut params = ListTransactionsParams::default().page(PageParams::new(1).with_page_size(50));
//! loop {
//!     let page = client.transactions().list(params.clone()).await?;
//!     for txn in &page {
//!         println!("{} {}", txn.transaction_date, txn.amount);
//!     }
//!     match page.next_page_number() {
//!         Some(next) => params.page.page_number = next,
//!         None => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::ops::{Deref, Index};

use crate::request::ApiRequest;
use crate::{Error, Result};

/// Largest page size the API accepts.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Page selection for list calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// The page to fetch (1-indexed).
    pub page_number: u32,
    /// Items per page; `None` lets the server choose.
    pub page_size: Option<u32>,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: None,
        }
    }
}

impl PageParams {
    /// Selects the given page with the server's default page size.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            page_size: None,
        }
    }

    /// Sets the number of items per page.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Checks the bounds before any request is made.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.page_number < 1 {
            return Err(Error::InvalidRequest(
                "page_number must be at least 1".to_string(),
            ));
        }
        if let Some(size) = self.page_size {
            if !(1..=MAX_PAGE_SIZE).contains(&size) {
                return Err(Error::InvalidRequest(format!(
                    "page_size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, size
                )));
            }
        }
        Ok(())
    }

    /// Adds `pageNumber` / `pageSize` to the request query.
    pub(crate) fn apply(&self, request: ApiRequest) -> Result<ApiRequest> {
        self.validate()?;
        Ok(request
            .with_query_param("pageNumber", self.page_number)
            .with_optional_query_param("pageSize", self.page_size))
    }
}

/// One page of results plus the metadata needed to walk forward.
///
/// A page derefs to a slice of its items, so it can be indexed, iterated and
/// measured directly; [`Page::data`] exposes the same items explicitly.
///
/// The metadata always satisfies:
/// - `total_pages == ceil(total_count / page_size)` when `page_size > 0`
/// - `has_next == (page_number < total_pages)`
/// - `has_previous == (page_number > 1)`
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    data: Vec<T>,
    page_number: u32,
    page_size: u32,
    total_count: u64,
    total_pages: u64,
}

impl<T> Page<T> {
    /// Builds a page, deriving `total_pages` from the count and size.
    pub fn new(data: Vec<T>, page_number: u32, page_size: u32, total_count: u64) -> Self {
        Self {
            data,
            page_number,
            page_size,
            total_count,
            total_pages: total_pages(total_count, page_size),
        }
    }

    /// The items on this page.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the page, returning its items.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// The current page number (1-indexed).
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// The number of items per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The total number of items across all pages.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// The total number of pages.
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Whether a page follows this one.
    pub fn has_next(&self) -> bool {
        u64::from(self.page_number) < self.total_pages
    }

    /// Whether a page precedes this one.
    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    /// The number of the following page, if any.
    pub fn next_page_number(&self) -> Option<u32> {
        self.has_next().then(|| self.page_number + 1)
    }

    /// The number of the preceding page, if any.
    pub fn previous_page_number(&self) -> Option<u32> {
        self.has_previous().then(|| self.page_number - 1)
    }

    /// Transforms each item while keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

impl<T> Deref for Page<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> AsRef<[T]> for Page<T> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<usize> for Page<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        0
    } else {
        total_count.div_ceil(u64::from(page_size))
    }
}

/// The list envelope as sent by the server; metadata fields may be missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    data: Vec<Value>,
    page_number: Option<u32>,
    page_size: Option<u32>,
    total_count: Option<u64>,
    total_pages: Option<u64>,
    has_next: Option<bool>,
    has_previous: Option<bool>,
}

/// Decodes a list response into a [`Page`].
///
/// Accepts the paginated envelope or a bare JSON array (treated as a single
/// page). Missing metadata falls back to the requested values. Metadata that
/// contradicts the page invariants is rejected.
pub(crate) fn decode_page<T: DeserializeOwned>(body: Value, requested: &PageParams) -> Result<Page<T>> {
    let raw_response = body.to_string();
    let malformed = |message: String| Error::Deserialization {
        message,
        raw_response: raw_response.clone(),
        status: http::StatusCode::OK,
    };

    let envelope = match body {
        Value::Array(items) => {
            let len = items.len();
            RawEnvelope {
                data: items,
                page_number: Some(requested.page_number),
                page_size: Some(requested.page_size.unwrap_or(0).max(len as u32)),
                total_count: Some(len as u64),
                total_pages: None,
                has_next: None,
                has_previous: None,
            }
        }
        other => serde_json::from_value::<RawEnvelope>(other)
            .map_err(|e| malformed(format!("invalid page envelope: {}", e)))?,
    };

    let data = envelope
        .data
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<T>(item)
                .map_err(|e| malformed(format!("invalid item at index {}: {}", i, e)))
        })
        .collect::<Result<Vec<T>>>()?;

    let page_number = envelope.page_number.unwrap_or(requested.page_number);
    if page_number < 1 {
        return Err(malformed("pageNumber must be at least 1".to_string()));
    }
    let page_size = envelope
        .page_size
        .or(requested.page_size)
        .unwrap_or(data.len() as u32);
    let total_count = envelope.total_count.unwrap_or(data.len() as u64);

    let page = Page::new(data, page_number, page_size, total_count);

    if let Some(reported) = envelope.total_pages {
        if page_size > 0 && reported != page.total_pages() {
            return Err(malformed(format!(
                "totalPages {} does not match totalCount {} / pageSize {}",
                reported, total_count, page_size
            )));
        }
    }
    if let Some(reported) = envelope.has_next {
        if reported != page.has_next() {
            return Err(malformed(format!(
                "hasNext {} contradicts page {} of {}",
                reported,
                page_number,
                page.total_pages()
            )));
        }
    }
    if let Some(reported) = envelope.has_previous {
        if reported != page.has_previous() {
            return Err(malformed(format!(
                "hasPrevious {} contradicts page {}",
                reported, page_number
            )));
        }
    }

    Ok(page)
}
