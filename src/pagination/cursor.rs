//! Cursor-based paginator
//!
//! Follows the server-supplied `paging.next` URL until it is absent. The first
//! request carries the caller's query parameters; every continuation URL
//! already embeds the full query state and is requested verbatim.

use super::types::QueryParams;
use crate::decode::{decode_envelope, PageEnvelope};
use crate::error::{Error, Result};
use crate::http::{strip_query, HttpClient, RequestConfig};
use crate::types::RawRecord;
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// Delay before each continuation request
pub const PAGE_DELAY: Duration = Duration::from_millis(200);

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Query parameter carrying the page size hint
pub const PAGE_SIZE_PARAM: &str = "limit";

/// Walks a cursor-paginated resource one page at a time
///
/// Not resumable once partially consumed: start a new paginator to begin
/// again from the first page.
#[derive(Debug)]
pub struct CursorPaginator<'a> {
    client: &'a HttpClient,
    locator: Option<String>,
    params: QueryParams,
    timeout: Duration,
    pages_fetched: usize,
    records_fetched: usize,
}

impl<'a> CursorPaginator<'a> {
    /// Create a paginator starting at `locator` with `params`
    pub fn new(client: &'a HttpClient, locator: impl Into<String>, params: QueryParams) -> Self {
        Self {
            client,
            locator: Some(locator.into()),
            params,
            timeout: DEFAULT_TIMEOUT,
            pages_fetched: 0,
            records_fetched: 0,
        }
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ask the server for pages of at most `size` records
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.params.insert(PAGE_SIZE_PARAM, size);
        self
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Number of records received so far
    pub fn records_fetched(&self) -> usize {
        self.records_fetched
    }

    /// Check if the sequence is finished (exhausted or failed)
    pub fn is_done(&self) -> bool {
        self.locator.is_none()
    }

    /// Fetch the next page
    ///
    /// Returns `Ok(None)` once the terminal page has been returned. After an
    /// error the sequence is finished and later calls return `Ok(None)`.
    pub async fn next_page(&mut self) -> Result<Option<PageEnvelope>> {
        let Some(locator) = self.locator.take() else {
            return Ok(None);
        };

        if self.pages_fetched > 0 {
            tokio::time::sleep(PAGE_DELAY).await;
        }

        let mut request = RequestConfig::new().timeout(self.timeout);
        for (key, value) in self.params.to_query() {
            request = request.query(key, value);
        }
        // Continuation URLs are self-contained
        self.params.clear();

        let body = self.client.get_text(&locator, request).await?;
        let page = decode_envelope(&body)?;

        self.pages_fetched += 1;
        self.records_fetched += page.len();
        debug!(
            "Page {} from {}: {} records{}",
            self.pages_fetched,
            strip_query(&locator),
            page.len(),
            if page.is_terminal() { " (last)" } else { "" }
        );

        self.locator.clone_from(&page.next);
        Ok(Some(page))
    }

    /// Turn the paginator into a lazy stream of records
    ///
    /// Records are yielded in server order across pages. The stream ends after
    /// the first error.
    pub fn into_records(self) -> impl Stream<Item = Result<RawRecord>> + 'a {
        stream::try_unfold(
            (self, VecDeque::new()),
            |(mut pager, mut buffer)| async move {
                loop {
                    if let Some(record) = buffer.pop_front() {
                        return Ok::<_, Error>(Some((record, (pager, buffer))));
                    }
                    match pager.next_page().await {
                        Ok(Some(page)) => buffer.extend(page.records),
                        Ok(None) => return Ok(None),
                        Err(e) => return Err(e),
                    }
                }
            },
        )
    }
}
