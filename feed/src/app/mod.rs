//! Application layer
//!
//! The feed synchronizer and the debouncer it uses for search input.

pub mod debounce;
pub mod synchronizer;

pub use debounce::Debouncer;
pub use synchronizer::{FeedSnapshot, FeedSynchronizer, LoadOutcome, SyncOptions};
