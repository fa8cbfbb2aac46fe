use crate::traits::{
    ensure_batch_within_limit, AnalysisDocument, DocumentError, KeyPhrases, SentimentResult,
    TextAnalysisClient,
};
use async_trait::async_trait;
use postlens_common::{PostlensError, Result};
use postlens_http::{Auth, HttpClient, HttpError, RequestOpts};
use reqwest::header::{HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const SERVICE: &str = "azure-text-analytics";
const KEY_PHRASES_ROUTE: &str = "text/analytics/v3.1/keyPhrases";
const SENTIMENT_ROUTE: &str = "text/analytics/v3.1/sentiment";
const SUBSCRIPTION_KEY_HEADER: HeaderName = HeaderName::from_static("ocp-apim-subscription-key");

/// Azure Cognitive Services Text Analytics (v3.1) client.
pub struct AzureTextAnalyticsClient {
    client: HttpClient,
    api_key: HeaderValue,
}

#[derive(Serialize)]
struct DocumentsRequest<'a> {
    documents: &'a [AnalysisDocument],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyPhrasesResponse {
    #[serde(default)]
    documents: Vec<KeyPhraseDocument>,
    #[serde(default)]
    errors: Vec<DocumentError>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyPhraseDocument {
    id: String,
    #[serde(default)]
    key_phrases: Vec<String>,
}

impl AzureTextAnalyticsClient {
    /// Create a client for a Cognitive Services resource endpoint, e.g.
    /// `https://<resource>.cognitiveservices.azure.com`.
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self> {
        let client = HttpClient::new(endpoint)
            .map_err(|e| PostlensError::Config(format!("HttpClient init failed: {e}")))?;
        let mut api_key = HeaderValue::from_str(api_key.trim())
            .map_err(|e| PostlensError::Config(format!("invalid text analytics key: {e}")))?;
        api_key.set_sensitive(true);

        Ok(Self { client, api_key })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    async fn post_documents<T: DeserializeOwned>(
        &self,
        route: &str,
        documents: &[AnalysisDocument],
        cancel: &CancellationToken,
    ) -> Result<T> {
        ensure_batch_within_limit(documents)?;

        // Failed batches are reported to the caller as-is; retrying is not this client's call.
        let opts = RequestOpts {
            auth: Some(Auth::Header {
                name: SUBSCRIPTION_KEY_HEADER,
                value: self.api_key.clone(),
            }),
            retries: Some(0),
            cancel: Some(cancel),
            ..Default::default()
        };

        self.client
            .post_json_opts(route, &DocumentsRequest { documents }, opts)
            .await
            .map_err(http_to_postlens)
    }
}

#[async_trait]
impl TextAnalysisClient for AzureTextAnalyticsClient {
    async fn extract_key_phrases(
        &self,
        documents: &[AnalysisDocument],
        cancel: &CancellationToken,
    ) -> Result<KeyPhrases> {
        let resp: KeyPhrasesResponse = self
            .post_documents(KEY_PHRASES_ROUTE, documents, cancel)
            .await?;

        log_rejected("key_phrases", &resp.errors);
        tracing::debug!(
            documents = resp.documents.len(),
            rejected = resp.errors.len(),
            model_version = ?resp.model_version,
            "azure.key_phrases"
        );

        Ok(resp
            .documents
            .into_iter()
            .map(|doc| (doc.id, doc.key_phrases.into_iter().collect::<BTreeSet<_>>()))
            .collect())
    }

    async fn score_sentiment(
        &self,
        documents: &[AnalysisDocument],
        cancel: &CancellationToken,
    ) -> Result<SentimentResult> {
        let resp: SentimentResult = self
            .post_documents(SENTIMENT_ROUTE, documents, cancel)
            .await?;
        log_rejected("sentiment", &resp.errors);
        tracing::debug!(
            documents = resp.documents.len(),
            rejected = resp.errors.len(),
            model_version = ?resp.model_version,
            "azure.sentiment"
        );
        Ok(resp)
    }

    async fn health_check(&self) -> Result<bool> {
        let probe = [AnalysisDocument {
            id: "health".into(),
            language: "en".into(),
            text: "health check".into(),
        }];
        let cancel = CancellationToken::new();

        match self.extract_key_phrases(&probe, &cancel).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Azure text analytics health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn provider_name(&self) -> &str {
        "azure"
    }
}

/// Documents the service refused inside a successful call; the batch still counts.
fn log_rejected(route: &'static str, errors: &[DocumentError]) {
    for rejected in errors {
        tracing::warn!(
            route,
            document_id = %rejected.id,
            code = %rejected.error.code,
            message = %rejected.error.message,
            "azure.document_error"
        );
    }
}

fn http_to_postlens(e: HttpError) -> PostlensError {
    match e {
        HttpError::Cancelled => PostlensError::Cancelled,
        other => PostlensError::upstream(SERVICE, other),
    }
}
