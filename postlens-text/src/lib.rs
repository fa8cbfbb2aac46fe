//! Provider‑agnostic text analysis integration for Postlens.
//!
//! This crate exposes a common [`traits::TextAnalysisClient`] interface
//! (key-phrase extraction and sentiment scoring over small document batches)
//! and the Azure Text Analytics implementation. [`text_client_from_config`]
//! builds a client from a [`postlens_config::TextAnalyticsConfig`].
//!
//! # Examples
//! ```no_run
//! use postlens_config::TextAnalyticsConfig;
//! use postlens_text::text_client_from_config;
//! use postlens_text::traits::TextAnalysisClient as _;
//!
//! let cfg = TextAnalyticsConfig::Azure {
//!     endpoint: "https://my-resource.cognitiveservices.azure.com".into(),
//!     api_key: "key".into(),
//!     timeout_secs: None,
//! };
//! let client = text_client_from_config(&cfg).unwrap();
//! assert_eq!(client.provider_name(), "azure");
//! ```
pub mod azure;
pub mod traits;

use azure::AzureTextAnalyticsClient;
use postlens_config::TextAnalyticsConfig;
use std::sync::Arc;
use std::time::Duration;
use traits::TextAnalysisClient;

pub use traits::{
    AnalysisDocument, KeyPhrases, SentimentLabel, SentimentResult, MAX_DOCUMENTS_PER_REQUEST,
};

/// Build the configured text analysis client.
pub fn text_client_from_config(
    config: &TextAnalyticsConfig,
) -> postlens_common::Result<Arc<dyn TextAnalysisClient + Send + Sync + 'static>> {
    match config {
        TextAnalyticsConfig::Azure {
            endpoint,
            api_key,
            timeout_secs,
        } => {
            let mut client = AzureTextAnalyticsClient::new(endpoint, api_key)?;
            if let Some(secs) = timeout_secs {
                client = client.with_timeout(Duration::from_secs(*secs));
            }
            Ok(Arc::new(client))
        }
    }
}
