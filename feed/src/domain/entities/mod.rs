//! Domain entities
//!
//! Plain data types describing posts, the feed query and pagination.

pub mod catalog;
pub mod identity;
pub mod page;
pub mod post;
pub mod query;

pub use catalog::{Category, PopularTag, PostStats};
pub use identity::Identity;
pub use page::{PageState, Pagination, PostListRequest, PostPage};
pub use post::{AuthorSummary, Media, MediaKind, Post, PostId, UserId};
pub use query::{QueryPatch, QueryState, SortKey, SortOrder, Visibility};
