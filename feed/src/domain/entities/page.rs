//! Pagination types

use serde::{Deserialize, Serialize};

use super::{Post, QueryState};

/// Pagination metadata returned alongside every list response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// One page of posts, in server order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

/// Parameters for a single list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostListRequest {
    /// 1-based
    pub page: u32,
    pub per_page: u32,
    pub query: QueryState,
}

/// Pagination bookkeeping owned by the synchronizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    /// Page the next fetch will request. Reset to 1 with the query, advanced
    /// only after a page has been merged.
    pub cursor: u32,
    pub has_more: bool,
    /// A reset (page 1) fetch is in flight
    pub loading: bool,
    /// A next-page fetch is in flight
    pub loading_more: bool,
    pub error: Option<String>,
    pub total: Option<u64>,
    pub pages: Option<u32>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            cursor: 1,
            has_more: true,
            loading: false,
            loading_more: false,
            error: None,
            total: None,
            pages: None,
        }
    }
}

impl PageState {
    pub fn is_fetching(&self) -> bool {
        self.loading || self.loading_more
    }
}
