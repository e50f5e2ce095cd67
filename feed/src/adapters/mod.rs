//! Adapters
//!
//! Concrete implementations of the domain ports.

pub mod http;
pub mod session;

pub use http::HttpPostService;
pub use session::{StaticSession, StoredSession};
