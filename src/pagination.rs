// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Offset/limit pagination over provider collections
//!
//! Huawei Cloud list APIs return one page of items plus a `total_count`
//! watermark. [`list_all`] walks the pages until the offset reaches it.

use std::future::Future;
use tracing::debug;

use crate::types::SolverError;

/// Page size requested from the provider, also used as the initial total-count estimate
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Offset/limit pair sent with a list request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// One page of a list response
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u32,
}

/// Fetch every page of a collection, preserving provider order.
///
/// At least one page is always fetched. The offset advances by the number of
/// items actually returned; an empty page ends the walk even if the provider
/// still reports more items. The first failing fetch aborts with its error.
pub async fn list_all<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, SolverError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, SolverError>>,
{
    let mut request = PageRequest::default();
    let mut total_count = DEFAULT_PAGE_LIMIT;
    let mut items = Vec::new();

    while request.offset < total_count {
        let page = fetch(request).await?;
        let fetched = page.items.len() as u32;
        total_count = page.total_count;
        items.extend(page.items);

        debug!(
            "fetched page at offset {}: {} items (total {})",
            request.offset, fetched, total_count
        );

        if fetched == 0 {
            break;
        }
        request.offset += fetched;
    }

    Ok(items)
}
