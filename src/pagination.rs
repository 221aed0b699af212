//! Paginated, handler-driven enumeration.
//!
//! The host addresses pages with a 1-based offset where "no offset" means
//! "everything"; the remote service takes a 0-based start index and a window
//! size and answers with an empty page once it runs out. [`PageCursor`]
//! bridges the two conventions and [`enumerate`] drives the fetch loop,
//! handing each object to a callback that may stop the enumeration.

use crate::error::ConnectorResult;
use log::{debug, trace};

/// Window sequence for one enumeration.
///
/// With an explicit offset (≥ 1) the cursor yields exactly one window
/// starting at `offset - 1`. Without one it yields windows at `0`,
/// `page_size`, `2 * page_size` and so on until an empty page is observed;
/// a short page does not end the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page_size: usize,
    next_start: usize,
    explicit: bool,
    done: bool,
}

impl PageCursor {
    pub fn new(page_size: usize, page_offset: usize) -> Self {
        let explicit = page_offset >= 1;
        Self {
            page_size,
            next_start: if explicit { page_offset - 1 } else { 0 },
            explicit,
            done: false,
        }
    }

    /// Whether the host asked for one specific page.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// The next `(start, size)` window to fetch, if any.
    pub fn next_window(&self) -> Option<(usize, usize)> {
        (!self.done).then_some((self.next_start, self.page_size))
    }

    /// Record how many objects the last fetched window held.
    pub fn observe(&mut self, fetched: usize) {
        if self.explicit || fetched == 0 {
            self.done = true;
        } else {
            self.next_start += self.page_size;
        }
    }
}

/// Fetch pages and hand each object to `handler` until the pages run out or
/// the handler returns `false`.
///
/// Returns the number of objects handed to the handler, including the one
/// on which it stopped. A failed fetch or handler call aborts the
/// enumeration with that error.
pub async fn enumerate<T, F, H>(
    page_size: usize,
    page_offset: usize,
    mut fetch: F,
    mut handler: H,
) -> ConnectorResult<usize>
where
    F: AsyncFnMut(usize, usize) -> ConnectorResult<Vec<T>>,
    H: AsyncFnMut(T) -> ConnectorResult<bool>,
{
    let mut cursor = PageCursor::new(page_size, page_offset);
    let mut delivered = 0;

    while let Some((start, size)) = cursor.next_window() {
        trace!("Fetching window start={} size={}", start, size);
        let page = fetch(start, size).await?;
        cursor.observe(page.len());

        for item in page {
            delivered += 1;
            if !handler(item).await? {
                debug!("Handler stopped enumeration after {} objects", delivered);
                return Ok(delivered);
            }
        }
    }

    debug!("Enumeration finished after {} objects", delivered);
    Ok(delivered)
}

/// Fetch every page and collect all objects.
pub async fn collect_all<T, F>(page_size: usize, fetch: F) -> ConnectorResult<Vec<T>>
where
    F: AsyncFnMut(usize, usize) -> ConnectorResult<Vec<T>>,
{
    let mut items = Vec::new();
    enumerate(page_size, 0, fetch, async |item: T| {
        items.push(item);
        Ok(true)
    })
    .await?;
    Ok(items)
}

/// Remaining-results signal for an explicit page request.
///
/// Computed as `total - page_size * page_offset`; only meaningful when the
/// host asked for a specific page, so `None` otherwise.
pub fn remaining_paged_results(total: usize, page_size: usize, page_offset: usize) -> Option<i64> {
    if page_offset < 1 {
        return None;
    }
    let consumed = page_size.saturating_mul(page_offset);
    Some(total as i64 - consumed as i64)
}
