//! Fetch → paginate → analyse → merge, one batch at a time.
//!
//! Batches run strictly in fetch order and each analysis call is awaited
//! before the next one starts, so a fail-fast abort never overlaps a later
//! batch. The caller's cancellation token is checked before every suspension
//! point and raced against it while it is pending.
use crate::batch::{batches, documents_for, page_count};
use crate::logger::FailureLogger;
use crate::outcome::{
    dedup_by_equality, AnalysisOptions, AnalysisOutcome, BatchOutcome, FailurePolicy,
    SentimentAnalysis, TopicAnalysis,
};
use postlens_common::{Post, PostlensError, Result};
use postlens_social::PostSource;
use postlens_text::traits::TextAnalysisClient;
use postlens_text::{AnalysisDocument, SentimentResult};
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnalysisKind {
    KeyPhrases,
    Sentiment,
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisKind::KeyPhrases => "key-phrase",
            AnalysisKind::Sentiment => "sentiment",
        })
    }
}

/// Per-call settings shared by every batch of one analysis.
#[derive(Clone, Copy)]
struct BatchRun<'a> {
    username: &'a str,
    kind: AnalysisKind,
    policy: FailurePolicy,
    cancel: &'a CancellationToken,
}

#[derive(Debug, Default, Clone, Copy)]
struct BatchTally {
    succeeded: usize,
    failed: usize,
}

pub struct BatchAnalysisOrchestrator {
    source: Arc<dyn PostSource>,
    text: Arc<dyn TextAnalysisClient>,
    logger: Arc<dyn FailureLogger>,
}

impl BatchAnalysisOrchestrator {
    pub fn new(
        source: Arc<dyn PostSource>,
        text: Arc<dyn TextAnalysisClient>,
        logger: Arc<dyn FailureLogger>,
    ) -> Self {
        Self {
            source,
            text,
            logger,
        }
    }

    /// Distinct key phrases across the user's recent original posts.
    ///
    /// Fails with [`PostlensError::NotFound`] when the user has no posts,
    /// whatever the failure policy.
    #[tracing::instrument(level = "info", skip(self, cancel), fields(kind = "key-phrase"))]
    pub async fn analyze_topics(
        &self,
        username: &str,
        options: AnalysisOptions,
        cancel: &CancellationToken,
    ) -> Result<TopicAnalysis> {
        let username = username.trim();
        let posts = self.fetch(username, &options, cancel).await?;

        let text = self.text.as_ref();
        let mut phrases: BTreeSet<String> = BTreeSet::new();
        let run = BatchRun {
            username,
            kind: AnalysisKind::KeyPhrases,
            policy: options.policy,
            cancel,
        };
        self.run_batches(
            run,
            &posts,
            |documents| async move { text.extract_key_phrases(&documents, cancel).await },
            |batch| phrases.extend(batch.into_values().flatten()),
        )
        .await?;

        tracing::info!(username, distinct_phrases = phrases.len(), "analysis.topics");
        Ok(AnalysisOutcome {
            results: phrases,
            source_posts: posts,
        })
    }

    /// One sentiment judgment per batch, in batch order.
    ///
    /// Results are deduplicated by whole-object equality. Separate batches
    /// cover different documents, so this normally keeps every result.
    #[tracing::instrument(level = "info", skip(self, cancel), fields(kind = "sentiment"))]
    pub async fn analyze_sentiment(
        &self,
        username: &str,
        options: AnalysisOptions,
        cancel: &CancellationToken,
    ) -> Result<SentimentAnalysis> {
        let username = username.trim();
        let posts = self.fetch(username, &options, cancel).await?;

        let text = self.text.as_ref();
        let mut sentiments: Vec<SentimentResult> = Vec::new();
        let run = BatchRun {
            username,
            kind: AnalysisKind::Sentiment,
            policy: options.policy,
            cancel,
        };
        self.run_batches(
            run,
            &posts,
            |documents| async move { text.score_sentiment(&documents, cancel).await },
            |result| sentiments.push(result),
        )
        .await?;

        let sentiments = dedup_by_equality(sentiments);
        tracing::info!(username, results = sentiments.len(), "analysis.sentiment");
        Ok(AnalysisOutcome {
            results: sentiments,
            source_posts: posts,
        })
    }

    async fn fetch(
        &self,
        username: &str,
        options: &AnalysisOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Post>> {
        if username.is_empty() {
            return Err(PostlensError::InvalidInput("username must not be empty".into()));
        }
        if options.max_posts == 0 {
            return Err(PostlensError::InvalidInput("max_posts must be positive".into()));
        }
        if cancel.is_cancelled() {
            return Err(PostlensError::Cancelled);
        }

        let fetched = until_cancelled(
            cancel,
            self.source
                .fetch_posts(username, options.max_posts, true, cancel),
        )
        .await;
        let posts = match fetched {
            Ok(posts) => posts,
            Err(err) => {
                if !err.is_cancelled() {
                    tracing::warn!(
                        username,
                        platform = self.source.platform(),
                        error = %err,
                        "analysis.fetch_failed"
                    );
                }
                return Err(err);
            }
        };

        if posts.is_empty() {
            return Err(PostlensError::NotFound(format!("no posts for user {username}")));
        }
        tracing::debug!(username, fetched = posts.len(), "analysis.posts_fetched");
        Ok(posts)
    }

    async fn run_batches<T, A, Fut, M>(
        &self,
        run: BatchRun<'_>,
        posts: &[Post],
        mut analyze: A,
        mut merge: M,
    ) -> Result<()>
    where
        A: FnMut(Vec<AnalysisDocument>) -> Fut,
        Fut: Future<Output = Result<T>>,
        M: FnMut(T),
    {
        let BatchRun {
            username,
            kind,
            policy,
            cancel,
        } = run;
        let total = page_count(posts.len());
        let mut tally = BatchTally::default();
        tracing::info!(
            username,
            %kind,
            posts = posts.len(),
            batches = total,
            ?policy,
            "analysis.batches_planned"
        );

        for (index, batch) in batches(posts).enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(username, %kind, batch = index + 1, total, "analysis.cancelled");
                return Err(PostlensError::Cancelled);
            }

            let documents = documents_for(batch);
            let result = until_cancelled(cancel, analyze(documents)).await;
            if matches!(result, Err(PostlensError::Cancelled)) {
                tracing::info!(username, %kind, batch = index + 1, total, "analysis.cancelled");
                return Err(PostlensError::Cancelled);
            }

            match BatchOutcome::from(result) {
                BatchOutcome::Analyzed(value) => {
                    tally.succeeded += 1;
                    tracing::debug!(
                        username,
                        %kind,
                        batch = index + 1,
                        total,
                        documents = batch.len(),
                        "analysis.batch_ok"
                    );
                    merge(value);
                }
                BatchOutcome::Failed(err) => {
                    tally.failed += 1;
                    let message = format!(
                        "{kind} batch {}/{total} failed for user {username}",
                        index + 1
                    );
                    self.logger.log_failure(&err, &message);
                    if policy == FailurePolicy::FailFast {
                        return Err(err);
                    }
                }
            }
        }

        tracing::info!(
            username,
            %kind,
            batches = total,
            succeeded = tally.succeeded,
            failed = tally.failed,
            "analysis.completed"
        );
        Ok(())
    }
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PostlensError::Cancelled),
        out = fut => out,
    }
}
