#![allow(dead_code)]

use async_trait::async_trait;
use postlens_analysis::FailureLogger;
use postlens_common::{Post, PostlensError, Result};
use postlens_social::PostSource;
use postlens_text::traits::{ConfidenceScores, DocumentSentiment, TextAnalysisClient};
use postlens_text::{AnalysisDocument, KeyPhrases, SentimentLabel, SentimentResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub fn posts(n: usize) -> Vec<Post> {
    (0..n)
        .map(|i| Post::new(format!("{}", 1_000 + i), format!("post {i}"), "en"))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub username: String,
    pub max_count: usize,
    pub exclude_reposts: bool,
}

enum FetchScript {
    Posts(Vec<Post>),
    Upstream(String),
    Hang,
}

pub struct FakePostSource {
    script: FetchScript,
    calls: Mutex<Vec<FetchCall>>,
}

impl FakePostSource {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            script: FetchScript::Posts(posts),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            script: FetchScript::Upstream(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A fetch that never completes on its own.
    pub fn hanging() -> Self {
        Self {
            script: FetchScript::Hang,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostSource for FakePostSource {
    async fn fetch_posts(
        &self,
        username: &str,
        max_count: usize,
        exclude_reposts: bool,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Post>> {
        self.calls.lock().unwrap().push(FetchCall {
            username: username.to_string(),
            max_count,
            exclude_reposts,
        });
        match &self.script {
            FetchScript::Posts(posts) => Ok(posts.iter().take(max_count).cloned().collect()),
            FetchScript::Upstream(message) => Err(PostlensError::upstream("twitter", message)),
            FetchScript::Hang => std::future::pending().await,
        }
    }

    fn platform(&self) -> &str {
        "fake"
    }
}

type PhraseFn = Box<dyn Fn(&AnalysisDocument) -> Vec<String> + Send + Sync>;

/// Text client whose behaviour is scripted per call index (0-based).
pub struct ScriptedTextClient {
    phrases: PhraseFn,
    fail_on: BTreeSet<usize>,
    cancel_after: Option<(usize, CancellationToken)>,
    hang_on: Option<usize>,
    uniform_sentiment: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTextClient {
    pub fn new() -> Self {
        Self {
            phrases: Box::new(|doc| vec![format!("phrase {}", doc.id)]),
            fail_on: BTreeSet::new(),
            cancel_after: None,
            hang_on: None,
            uniform_sentiment: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_phrases(
        mut self,
        phrases: impl Fn(&AnalysisDocument) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.phrases = Box::new(phrases);
        self
    }

    pub fn failing_on(mut self, call_index: usize) -> Self {
        self.fail_on.insert(call_index);
        self
    }

    /// Cancel `token` once `calls` analysis calls have completed.
    pub fn cancelling_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    /// Call `call_index` records its documents and then never completes.
    pub fn hanging_on(mut self, call_index: usize) -> Self {
        self.hang_on = Some(call_index);
        self
    }

    /// Every sentiment call returns the same empty result.
    pub fn with_uniform_sentiment(mut self) -> Self {
        self.uniform_sentiment = true;
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, documents: &[AnalysisDocument]) -> Result<usize> {
        let index = self.record(documents)?;
        if self.hang_on == Some(index) {
            std::future::pending::<()>().await;
        }
        Ok(index)
    }

    fn record(&self, documents: &[AnalysisDocument]) -> Result<usize> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(documents.iter().map(|d| d.id.clone()).collect());
            calls.len() - 1
        };
        if let Some((after, token)) = &self.cancel_after {
            if index + 1 >= *after {
                token.cancel();
            }
        }
        if self.fail_on.contains(&index) {
            return Err(PostlensError::upstream(
                "azure-text-analytics",
                format!("scripted failure on call {index}"),
            ));
        }
        Ok(index)
    }
}

#[async_trait]
impl TextAnalysisClient for ScriptedTextClient {
    async fn extract_key_phrases(
        &self,
        documents: &[AnalysisDocument],
        _cancel: &CancellationToken,
    ) -> Result<KeyPhrases> {
        self.enter(documents).await?;
        let mut out: KeyPhrases = BTreeMap::new();
        for doc in documents {
            out.insert(doc.id.clone(), (self.phrases)(doc).into_iter().collect());
        }
        Ok(out)
    }

    async fn score_sentiment(
        &self,
        documents: &[AnalysisDocument],
        _cancel: &CancellationToken,
    ) -> Result<SentimentResult> {
        self.enter(documents).await?;
        if self.uniform_sentiment {
            return Ok(SentimentResult {
                documents: Vec::new(),
                errors: Vec::new(),
                model_version: Some("2022-11-01".into()),
            });
        }
        Ok(SentimentResult {
            documents: documents
                .iter()
                .map(|doc| DocumentSentiment {
                    id: doc.id.clone(),
                    sentiment: SentimentLabel::Positive,
                    confidence_scores: ConfidenceScores {
                        positive: 0.9,
                        neutral: 0.08,
                        negative: 0.02,
                    },
                })
                .collect(),
            errors: Vec::new(),
            model_version: Some("2022-11-01".into()),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
pub struct CapturingLogger {
    entries: Mutex<Vec<(String, String)>>,
}

impl CapturingLogger {
    /// `(error, message)` pairs in the order they were logged.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().unwrap().clone()
    }
}

impl FailureLogger for CapturingLogger {
    fn log_failure(&self, error: &PostlensError, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((error.to_string(), message.to_string()));
    }
}
