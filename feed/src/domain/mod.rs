//! Domain layer
//!
//! - `entities`: posts, query state and pagination
//! - `ports`: trait definitions for the posts API and the session store

pub mod entities;
pub mod ports;
