use postlens_common::PostlensError;
use postlens_text::azure::AzureTextAnalyticsClient;
use postlens_text::traits::TextAnalysisClient;
use postlens_text::{AnalysisDocument, SentimentLabel};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn docs(n: usize) -> Vec<AnalysisDocument> {
    (0..n)
        .map(|i| AnalysisDocument {
            id: i.to_string(),
            language: "en".into(),
            text: format!("document {i}"),
        })
        .collect()
}

#[tokio::test]
async fn key_phrases_are_grouped_by_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text/analytics/v3.1/keyPhrases"))
        .and(header("Ocp-Apim-Subscription-Key", "az-key"))
        .and(body_json(json!({"documents": [
            {"id": "0", "language": "en", "text": "document 0"},
            {"id": "1", "language": "en", "text": "document 1"}
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {"id": "0", "keyPhrases": ["machine learning", "rust"], "warnings": []},
                {"id": "1", "keyPhrases": ["machine learning"], "warnings": []}
            ],
            "errors": [],
            "modelVersion": "2022-10-01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AzureTextAnalyticsClient::new(&server.uri(), "az-key").unwrap();
    let phrases = client
        .extract_key_phrases(&docs(2), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(phrases.len(), 2);
    assert!(phrases["0"].contains("rust"));
    assert!(phrases["1"].contains("machine learning"));
}

#[tokio::test]
async fn rejected_documents_do_not_fail_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text/analytics/v3.1/keyPhrases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{"id": "0", "keyPhrases": ["tokio"]}],
            "errors": [{"id": "1", "error": {"code": "InvalidArgument", "message": "Invalid language code."}}]
        })))
        .mount(&server)
        .await;

    let client = AzureTextAnalyticsClient::new(&server.uri(), "az-key").unwrap();
    let phrases = client
        .extract_key_phrases(&docs(2), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(phrases.len(), 1);
}

#[tokio::test]
async fn rejected_documents_stay_in_the_sentiment_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text/analytics/v3.1/sentiment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {"id": "0", "sentiment": "neutral", "confidenceScores": {"positive": 0.1, "neutral": 0.8, "negative": 0.1}}
            ],
            "errors": [{"id": "1", "error": {"code": "InvalidArgument", "message": "Invalid language code."}}],
            "modelVersion": "2022-11-01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AzureTextAnalyticsClient::new(&server.uri(), "az-key").unwrap();
    let result = client
        .score_sentiment(&docs(2), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.documents.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].id, "1");
    assert_eq!(result.errors[0].error.code, "InvalidArgument");
}

#[tokio::test]
async fn sentiment_returns_the_whole_batch_judgment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text/analytics/v3.1/sentiment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {"id": "0", "sentiment": "positive", "confidenceScores": {"positive": 0.9, "neutral": 0.05, "negative": 0.05}},
                {"id": "1", "sentiment": "negative", "confidenceScores": {"positive": 0.1, "neutral": 0.1, "negative": 0.8}}
            ],
            "errors": [],
            "modelVersion": "2022-11-01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AzureTextAnalyticsClient::new(&server.uri(), "az-key").unwrap();
    let result = client
        .score_sentiment(&docs(2), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.documents.len(), 2);
    assert_eq!(result.documents[0].sentiment, SentimentLabel::Positive);
    assert_eq!(result.documents[1].sentiment, SentimentLabel::Negative);
}

#[tokio::test]
async fn failures_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text/analytics/v3.1/sentiment"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": "429", "message": "Rate limit is exceeded."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AzureTextAnalyticsClient::new(&server.uri(), "az-key").unwrap();
    let err = client
        .score_sentiment(&docs(3), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        PostlensError::Upstream { service, message } => {
            assert_eq!(service, "azure-text-analytics");
            assert!(message.contains("Rate limit is exceeded."));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn oversized_batches_never_reach_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = AzureTextAnalyticsClient::new(&server.uri(), "az-key").unwrap();
    let err = client
        .extract_key_phrases(&docs(11), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PostlensError::InvalidInput(_)));
}

#[tokio::test]
async fn health_check_reports_unreachable_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text/analytics/v3.1/keyPhrases"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "401", "message": "Access denied due to invalid subscription key."}
        })))
        .mount(&server)
        .await;

    let client = AzureTextAnalyticsClient::new(&server.uri(), "bad-key").unwrap();
    assert!(!client.health_check().await.unwrap());
}
