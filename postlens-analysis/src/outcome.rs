use postlens_common::{Post, PostlensError, Result};
use postlens_text::SentimentResult;
use serde::Serialize;
use std::collections::BTreeSet;

pub const DEFAULT_MAX_POSTS: usize = 50;

/// What happens to the rest of the call when one batch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort on the first failed batch and return its error.
    FailFast,
    /// Log the failed batch, skip it, and keep going.
    #[default]
    Continue,
}

impl From<bool> for FailurePolicy {
    fn from(fail_fast: bool) -> Self {
        if fail_fast {
            Self::FailFast
        } else {
            Self::Continue
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Upper bound on posts fetched for the user.
    pub max_posts: usize,
    pub policy: FailurePolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_posts: DEFAULT_MAX_POSTS,
            policy: FailurePolicy::default(),
        }
    }
}

impl AnalysisOptions {
    pub fn with_max_posts(mut self, max_posts: usize) -> Self {
        self.max_posts = max_posts;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.policy = fail_fast.into();
        self
    }
}

/// Aggregated results plus the complete fetched post sequence.
///
/// `source_posts` is never filtered, even when batches were skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome<T> {
    pub results: T,
    pub source_posts: Vec<Post>,
}

/// Distinct key phrases across all successful batches.
pub type TopicAnalysis = AnalysisOutcome<BTreeSet<String>>;

/// One sentiment judgment per successful batch, in batch order.
pub type SentimentAnalysis = AnalysisOutcome<Vec<SentimentResult>>;

/// Result of analysing one batch, consumed by the failure policy.
#[derive(Debug)]
pub enum BatchOutcome<T> {
    Analyzed(T),
    Failed(PostlensError),
}

impl<T> From<Result<T>> for BatchOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Analyzed(value),
            Err(err) => Self::Failed(err),
        }
    }
}

/// Drop later items equal to an earlier one, keeping first-seen order.
pub(crate) fn dedup_by_equality<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !kept.contains(&item) {
            kept.push(item);
        }
    }
    kept
}
