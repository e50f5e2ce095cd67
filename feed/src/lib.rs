//! feedsync
//!
//! Client-side synchronization for a paginated social feed. The
//! `FeedSynchronizer` keeps an ordered, deduplicated list of posts in step
//! with a REST backend while applying likes and deletes optimistically.
//! Uses a ports & adapters layout: the synchronizer only sees the traits in
//! `domain::ports`, and `adapters` provides the HTTP and session
//! implementations.

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;

#[cfg(test)]
mod test_utils;

pub use adapters::{HttpPostService, StaticSession, StoredSession};
pub use app::{FeedSnapshot, FeedSynchronizer, LoadOutcome, SyncOptions};
pub use config::Config;
pub use domain::entities::{
    Post, PostId, QueryPatch, QueryState, SortKey, SortOrder, UserId, Visibility,
};
pub use error::FeedError;
