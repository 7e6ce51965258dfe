// src/listing.rs
//! State behind every list screen: the rows on display plus the numbers
//! the pager needs. A failed fetch leaves the list empty; nothing retries.

use std::future::Future;
use tracing::{error, info, warn};

use crate::core::query::{ListQuery, RowFilter};
use crate::error::Result;
use crate::types::Page;

#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub error: Option<String>,
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            current_page: 1,
            total_pages: 0,
            error: None,
        }
    }
}

impl<T> ListPage<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Replace the page contents with the outcome of a list call
    pub fn apply(&mut self, query: &ListQuery, outcome: Result<Page<T>>)
    where
        ListQuery: RowFilter<T>,
    {
        self.current_page = query.current_page();

        let page = match outcome {
            Ok(page) => page,
            Err(e) => {
                error!("Failed to load list page {}: {}", self.current_page, e);
                self.items.clear();
                self.total = 0;
                self.total_pages = 0;
                self.error = Some(e.user_message());
                return;
            }
        };

        let received = page.items.len();
        let items: Vec<T> = page
            .items
            .into_iter()
            .filter(|item| query.matches(item))
            .collect();

        if items.len() != received {
            warn!(
                "Dropped {} of {} rows that do not match the active filter",
                received - items.len(),
                received
            );
        }

        let total = page.total.unwrap_or(items.len() as u64);
        let page_size = u64::from(query.page_size());

        self.total_pages = page
            .pages
            .unwrap_or_else(|| total.div_ceil(page_size).max(1) as u32);
        if let Some(server_page) = page.page {
            self.current_page = server_page;
        }
        self.total = total;
        self.items = items;
        self.error = None;

        info!(
            "Loaded {} rows (page {}/{}, {} total)",
            self.items.len(),
            self.current_page,
            self.total_pages,
            self.total
        );
    }

    /// Await `fetch` and apply its outcome
    pub async fn load<F>(&mut self, query: &ListQuery, fetch: F)
    where
        F: Future<Output = Result<Page<T>>>,
        ListQuery: RowFilter<T>,
    {
        let outcome = fetch.await;
        self.apply(query, outcome);
    }
}
