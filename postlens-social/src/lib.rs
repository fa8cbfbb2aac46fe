//! Social network clients used by Postlens.
//!
//! [`PostSource`] is the seam the analysis orchestrator consumes; the
//! Twitter/X implementation lives in [`twitter`].
pub mod source;
pub mod twitter;

pub use source::PostSource;
pub use twitter::TwitterApi;
