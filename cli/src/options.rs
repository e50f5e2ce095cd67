//! Feed options read from the environment

use std::env;

use anyhow::{anyhow, Context, Result};
use feedsync::{QueryPatch, SortKey, SortOrder, Visibility};

const DEFAULT_MAX_PAGES: u32 = 5;

/// Initial query and paging limit for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    pub query: QueryPatch,
    pub max_pages: u32,
}

impl FeedOptions {
    /// Optional env vars:
    /// - FEED_SEARCH, FEED_CATEGORY: free text
    /// - FEED_TAGS: comma separated
    /// - FEED_VISIBILITY: all | featured | recent
    /// - FEED_SORT_BY: created_at | updated_at | likes_count | views_count | comments_count
    /// - FEED_SORT_ORDER: asc | desc
    /// - FEED_MAX_PAGES: pages to fetch before stopping (default 5)
    pub fn from_env() -> Result<Self> {
        let query = QueryPatch {
            search: var("FEED_SEARCH"),
            category: var("FEED_CATEGORY").map(Some),
            tags: var("FEED_TAGS").map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            }),
            visibility: var("FEED_VISIBILITY")
                .map(|v| v.parse::<Visibility>().map_err(|e| anyhow!(e)))
                .transpose()?,
            sort_by: var("FEED_SORT_BY")
                .map(|v| v.parse::<SortKey>().map_err(|e| anyhow!(e)))
                .transpose()?,
            sort_order: var("FEED_SORT_ORDER")
                .map(|v| v.parse::<SortOrder>().map_err(|e| anyhow!(e)))
                .transpose()?,
            author: None,
        };

        let max_pages = match var("FEED_MAX_PAGES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("FEED_MAX_PAGES must be a number, got {:?}", raw))?,
            None => DEFAULT_MAX_PAGES,
        };

        Ok(Self { query, max_pages })
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_env() {
        env::set_var("FEED_TAGS", "jdm, drift,,");
        env::set_var("FEED_SORT_BY", "likes_count");
        env::set_var("FEED_MAX_PAGES", "2");

        let options = FeedOptions::from_env().unwrap();
        assert_eq!(options.max_pages, 2);
        assert_eq!(options.query.sort_by, Some(SortKey::LikesCount));
        let tags = options.query.tags.unwrap();
        assert!(tags.contains("jdm") && tags.contains("drift"));
        assert_eq!(tags.len(), 2);

        env::set_var("FEED_SORT_BY", "hype");
        assert!(FeedOptions::from_env().is_err());

        env::remove_var("FEED_TAGS");
        env::remove_var("FEED_SORT_BY");
        env::remove_var("FEED_MAX_PAGES");
    }
}
