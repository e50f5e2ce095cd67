//! HTTP adapter for the posts API

mod client;

pub use client::HttpPostService;
