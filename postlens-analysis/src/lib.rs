//! Batch analysis of a user's recent posts.
//!
//! [`BatchAnalysisOrchestrator`] fetches up to `max_posts` original posts
//! through a [`postlens_social::PostSource`], splits them into batches of
//! [`BATCH_SIZE`] and sends each batch to a
//! [`postlens_text::traits::TextAnalysisClient`]. Results are merged across
//! batches:
//!
//! * key phrases into one sorted set of distinct strings,
//! * sentiment into one result per batch, in batch order.
//!
//! A failed batch is reported to the injected [`FailureLogger`] and then
//! either aborts the call ([`FailurePolicy::FailFast`]) or is skipped
//! ([`FailurePolicy::Continue`]). Cancellation always aborts with
//! [`postlens_common::PostlensError::Cancelled`] and is never logged as a
//! batch failure.
pub mod batch;
pub mod logger;
pub mod orchestrator;
pub mod outcome;

pub use batch::BATCH_SIZE;
pub use logger::{FailureLogger, NoopFailureLogger, TracingFailureLogger};
pub use orchestrator::BatchAnalysisOrchestrator;
pub use outcome::{
    AnalysisOptions, AnalysisOutcome, BatchOutcome, FailurePolicy, SentimentAnalysis,
    TopicAnalysis, DEFAULT_MAX_POSTS,
};
