use async_trait::async_trait;
use postlens_common::{Post, PostlensError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tokio_util::sync::CancellationToken;

/// Per-call document limit of the text analytics API.
pub const MAX_DOCUMENTS_PER_REQUEST: usize = 10;

/// One post in the shape the analysis API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDocument {
    pub id: String,
    pub language: String,
    pub text: String,
}

impl From<&Post> for AnalysisDocument {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            language: post.language.clone(),
            text: post.text.clone(),
        }
    }
}

/// Extracted phrases keyed by document id.
pub type KeyPhrases = BTreeMap<String, BTreeSet<String>>;

/// Sentiment judgment for one batch, as returned by a single analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResult {
    #[serde(default)]
    pub documents: Vec<DocumentSentiment>,
    #[serde(default)]
    pub errors: Vec<DocumentError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSentiment {
    pub id: String,
    pub sentiment: SentimentLabel,
    pub confidence_scores: ConfidenceScores,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// A document the service refused to analyse inside an otherwise successful call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentError {
    pub id: String,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Reject batches the API would refuse anyway.
pub fn ensure_batch_within_limit(documents: &[AnalysisDocument]) -> Result<()> {
    if documents.is_empty() {
        return Err(PostlensError::InvalidInput(
            "analysis batch must contain at least one document".into(),
        ));
    }
    if documents.len() > MAX_DOCUMENTS_PER_REQUEST {
        return Err(PostlensError::InvalidInput(format!(
            "analysis batch has {} documents, limit is {MAX_DOCUMENTS_PER_REQUEST}",
            documents.len()
        )));
    }
    Ok(())
}

#[async_trait]
pub trait TextAnalysisClient: Send + Sync {
    /// Extract key phrases for at most [`MAX_DOCUMENTS_PER_REQUEST`] documents.
    async fn extract_key_phrases(
        &self,
        documents: &[AnalysisDocument],
        cancel: &CancellationToken,
    ) -> Result<KeyPhrases>;

    /// Score sentiment for at most [`MAX_DOCUMENTS_PER_REQUEST`] documents.
    /// The whole batch comes back as one [`SentimentResult`].
    async fn score_sentiment(
        &self,
        documents: &[AnalysisDocument],
        cancel: &CancellationToken,
    ) -> Result<SentimentResult>;

    /// Check if the analysis service is reachable with the configured credentials.
    async fn health_check(&self) -> Result<bool>;

    /// Get the provider name being used
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str) -> AnalysisDocument {
        AnalysisDocument {
            id: id.into(),
            language: "en".into(),
            text: "text".into(),
        }
    }

    #[test]
    fn documents_mirror_their_post() {
        let post = Post::new("1712", "Rust 2024 edition is out", "en");
        let doc = AnalysisDocument::from(&post);
        assert_eq!(doc.id, "1712");
        assert_eq!(doc.language, "en");
        assert_eq!(doc.text, "Rust 2024 edition is out");
    }

    #[test]
    fn batch_limit_is_enforced() {
        let ten: Vec<_> = (0..10).map(|i| doc(&i.to_string())).collect();
        assert!(ensure_batch_within_limit(&ten).is_ok());

        let eleven: Vec<_> = (0..11).map(|i| doc(&i.to_string())).collect();
        assert!(matches!(
            ensure_batch_within_limit(&eleven),
            Err(PostlensError::InvalidInput(_))
        ));
        assert!(ensure_batch_within_limit(&[]).is_err());
    }

    #[test]
    fn sentiment_result_decodes_service_shape() {
        let result: SentimentResult = serde_json::from_value(json!({
            "documents": [{
                "id": "1",
                "sentiment": "mixed",
                "confidenceScores": {"positive": 0.4, "neutral": 0.2, "negative": 0.4},
                "sentences": []
            }],
            "errors": [{"id": "2", "error": {"code": "InvalidArgument", "message": "Invalid language code."}}],
            "modelVersion": "2022-11-01"
        }))
        .unwrap();

        assert_eq!(result.documents[0].sentiment, SentimentLabel::Mixed);
        assert_eq!(result.errors[0].error.code, "InvalidArgument");
        assert_eq!(result.model_version.as_deref(), Some("2022-11-01"));
    }
}
