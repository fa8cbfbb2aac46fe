//! Twitter/X API integration.
//!
//! `client` resolves a username and reads one page of the user's timeline;
//! `types` holds the v2 response models it decodes.
pub mod client;
pub mod types;

pub use client::TwitterApi;
