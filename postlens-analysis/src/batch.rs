//! Pagination of a fetched post collection into analysis-sized batches.

use postlens_common::Post;
use postlens_text::{AnalysisDocument, MAX_DOCUMENTS_PER_REQUEST};

/// Posts per analysis call. Pinned to the analysis API's per-call document
/// limit; exceeding it makes the service reject the whole call.
pub const BATCH_SIZE: usize = MAX_DOCUMENTS_PER_REQUEST;

/// Number of batches needed for `total` posts.
pub fn page_count(total: usize) -> usize {
    total.div_ceil(BATCH_SIZE)
}

/// Consecutive batches in fetch order; only the last may be short.
pub fn batches(posts: &[Post]) -> impl Iterator<Item = &[Post]> {
    posts.chunks(BATCH_SIZE)
}

pub fn documents_for(batch: &[Post]) -> Vec<AnalysisDocument> {
    batch.iter().map(AnalysisDocument::from).collect()
}
