//! Domain ports (traits)
//!
//! Port traits define what the feed needs from the outside world.
//! Adapters provide concrete implementations.

pub mod posts;
pub mod session;

pub use posts::{PostMutationService, PostQueryService};
pub use session::SessionProvider;
