//! Minimal wrapper around the Twitter/X v2 user timeline API.
//!
//! A fetch is two requests: resolve the username to an id, then read one
//! page of that user's tweets. There is no pagination through `next_token`;
//! callers asking for more than [`MAX_TIMELINE_PAGE`] posts get one full page.
use crate::source::PostSource;
use crate::twitter::types::{TimelineResponse, User, UserLookupResponse};
use async_trait::async_trait;
use postlens_common::{Post, PostlensError, Result};
use postlens_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TWITTER_BASE: &str = "https://api.twitter.com";
/// Bounds Twitter enforces on `max_results` for the timeline endpoint.
pub const MIN_TIMELINE_PAGE: usize = 5;
pub const MAX_TIMELINE_PAGE: usize = 100;

const SERVICE: &str = "twitter";

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: String,
}

impl TwitterApi {
    pub fn new(bearer_token: String) -> Result<Self> {
        Self::with_base_url(DEFAULT_TWITTER_BASE, bearer_token)
    }

    pub fn with_base_url(base_url: &str, bearer_token: String) -> Result<Self> {
        let http = HttpClient::new(base_url)
            .map_err(|e| PostlensError::Config(format!("twitter client init failed: {e}")))?;
        Ok(Self {
            http,
            bearer: bearer_token,
        })
    }

    /// Resolve a username (with or without a leading `@`) to a user record.
    /// `Ok(None)` when Twitter reports no such user.
    pub async fn lookup_user(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<User>> {
        let handle = username.trim().trim_start_matches('@');
        let resp: UserLookupResponse = self
            .http
            .get_json(
                &format!("2/users/by/username/{handle}"),
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    cancel: Some(cancel),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_postlens)?;

        if resp.data.is_none() {
            let detail = resp
                .errors
                .as_deref()
                .and_then(|errs| errs.first())
                .and_then(|e| e.detail.clone().or_else(|| e.title.clone()))
                .unwrap_or_default();
            tracing::info!(username = handle, %detail, "twitter.user_not_found");
        }
        Ok(resp.data)
    }

    /// Read one page of a user's tweets, newest first.
    pub async fn user_timeline(
        &self,
        user_id: &str,
        max_results: usize,
        exclude_reposts: bool,
        cancel: &CancellationToken,
    ) -> Result<TimelineResponse> {
        let page = max_results.clamp(MIN_TIMELINE_PAGE, MAX_TIMELINE_PAGE);
        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("max_results", page.to_string().into()),
            ("tweet.fields", "lang,created_at,referenced_tweets".into()),
        ];
        if exclude_reposts {
            params.push(("exclude", "retweets".into()));
        }

        let resp: TimelineResponse = self
            .http
            .get_json(
                &format!("2/users/{user_id}/tweets"),
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(params),
                    cancel: Some(cancel),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_postlens)?;

        tracing::debug!(
            user_id,
            result_count = ?resp.meta.as_ref().and_then(|m| m.result_count),
            "twitter.timeline"
        );
        Ok(resp)
    }
}

#[async_trait]
impl PostSource for TwitterApi {
    async fn fetch_posts(
        &self,
        username: &str,
        max_count: usize,
        exclude_reposts: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<Post>> {
        let Some(user) = self.lookup_user(username, cancel).await? else {
            return Ok(Vec::new());
        };
        if cancel.is_cancelled() {
            return Err(PostlensError::Cancelled);
        }

        let timeline = self
            .user_timeline(&user.id, max_count, exclude_reposts, cancel)
            .await?;

        let posts: Vec<Post> = timeline
            .data
            .unwrap_or_default()
            .into_iter()
            .filter(|tweet| !(exclude_reposts && tweet.is_retweet()))
            .take(max_count)
            .map(Post::from)
            .collect();

        tracing::info!(
            username = %user.username,
            user_id = %user.id,
            fetched = posts.len(),
            "twitter.posts_fetched"
        );
        Ok(posts)
    }

    fn platform(&self) -> &str {
        SERVICE
    }
}

fn http_to_postlens(e: HttpError) -> PostlensError {
    match e {
        HttpError::Cancelled => PostlensError::Cancelled,
        other => PostlensError::upstream(SERVICE, other),
    }
}
