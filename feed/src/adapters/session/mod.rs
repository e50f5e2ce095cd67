//! Session adapters
//!
//! - `StaticSession`: a fixed token, typically from the environment
//! - `StoredSession`: a JSON key-value file holding `token` and `user`

mod listeners;
mod static_session;
mod stored;

pub use static_session::StaticSession;
pub use stored::{identity_from_token, SessionData, StoredSession};
