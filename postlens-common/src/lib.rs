//! Common types and utilities shared across Postlens crates.
//!
//! This crate defines the post model, the shared error type, and the
//! observability helpers used throughout the Postlens workspace. It is
//! intentionally lightweight so that every crate can depend on it without
//! pulling in HTTP or configuration machinery.
//!
//! # Overview
//!
//! - [`Post`] and [`PostId`]: the immutable unit fetched from a social platform
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`PostlensError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use postlens_common::{Post, PostId};
//!
//! let post = Post::new("1700000000000000001", "shipping the new parser today", "en");
//! assert_eq!(post.id, PostId::from("1700000000000000001"));
//! assert_eq!(post.id.to_string(), "1700000000000000001");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod observability;

/// Language tag used when the platform did not report one.
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Opaque identifier assigned to a post by the source platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PostId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single original post as fetched from the social platform.
///
/// Posts are never mutated after the fetch; the orchestrator hands the exact
/// fetched sequence back to callers alongside the analysis results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    /// BCP-47 style language tag, `"und"` when unknown.
    pub language: String,
}

impl Post {
    pub fn new(
        id: impl Into<PostId>,
        text: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            language: language.into(),
        }
    }
}

/// Error types used across the Postlens system.
#[derive(thiserror::Error, Debug)]
pub enum PostlensError {
    /// The user exists but has no original posts, or does not exist at all.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A call to the social platform or the analysis service failed.
    #[error("Upstream error from {service}: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// The caller's cancellation token fired while work was pending.
    #[error("Operation cancelled")]
    Cancelled,

    /// A request violated a precondition before any upstream call was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PostlensError {
    pub fn upstream(service: &'static str, message: impl fmt::Display) -> Self {
        Self::Upstream {
            service,
            message: message.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Convenient alias for results that use [`PostlensError`].
pub type Result<T> = std::result::Result<T, PostlensError>;
