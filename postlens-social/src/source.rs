use async_trait::async_trait;
use postlens_common::{Post, Result};
use tokio_util::sync::CancellationToken;

/// Anything that can hand back a user's recent posts in platform order.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch up to `max_count` of `username`'s most recent posts, newest first.
    ///
    /// When `exclude_reposts` is set, reposts of other users' content are left
    /// out. An unknown user yields an empty list rather than an error so the
    /// caller decides how to report it. Transport and API failures surface as
    /// [`postlens_common::PostlensError::Upstream`].
    async fn fetch_posts(
        &self,
        username: &str,
        max_count: usize,
        exclude_reposts: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<Post>>;

    /// Short platform name used in logs.
    fn platform(&self) -> &str;
}
