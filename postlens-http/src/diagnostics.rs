//! Log-safe rendering of requests and responses.

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use serde::Deserialize;

const SECRET_PARAMS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "apikey",
    "subscription-key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

const SECRET_HEADERS: &[&str] = &["authorization", "ocp-apim-subscription-key"];

fn is_secret_param(name: &str) -> bool {
    SECRET_PARAMS.contains(&name.to_ascii_lowercase().as_str())
}

fn is_secret_header(name: &str) -> bool {
    SECRET_HEADERS
        .iter()
        .any(|secret| name.eq_ignore_ascii_case(secret))
}

pub(crate) fn redact_pairs<'a>(
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
) -> Vec<(String, String)> {
    pairs
        .map(|(k, v)| {
            let shown = if is_secret_param(k) { "<redacted>" } else { v };
            (k.to_string(), shown.to_string())
        })
        .collect()
}

pub(crate) fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if is_secret_header(&key) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

/// Render a best-effort curl command for repro/debug. Secrets in the query
/// string and headers are already redacted by the time they reach here.
pub(crate) fn make_curl(
    method: &Method,
    url: &Url,
    redacted_query: &[(String, String)],
    headers: Option<&HeaderMap>,
    body: Option<&[u8]>,
    max_body: usize,
) -> String {
    let mut shown = url.clone();
    if !redacted_query.is_empty() {
        shown
            .query_pairs_mut()
            .extend_pairs(redacted_query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    if let Some(headers) = headers {
        for (name, val) in redact_headers(headers) {
            parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
        }
    }
    if let Some(bytes) = body {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                let mut s = s.to_string();
                if s.len() > max_body {
                    let cut = (0..=max_body)
                        .rev()
                        .find(|i| s.is_char_boundary(*i))
                        .unwrap_or(0);
                    s.truncate(cut);
                    s.push('…');
                }
                parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
            }
            Err(_) => parts.push(format!("--data-binary @- # ({} bytes)", bytes.len())),
        }
    }
    parts.push(format!("'{}'", shown.as_str()));
    parts.join(" ")
}

pub(crate) fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        let cut = (0..=500).rev().find(|i| snip.is_char_boundary(*i)).unwrap_or(0);
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

/// Pull a human-readable message out of the error envelopes we talk to.
pub(crate) fn extract_error_message(body: &[u8]) -> String {
    // Azure Cognitive Services: {"error":{"code":"...","message":"...","innererror":{...}}}
    #[derive(Deserialize)]
    struct AzureEnv {
        error: AzureDetail,
    }
    #[derive(Deserialize)]
    struct AzureDetail {
        #[serde(default)]
        code: String,
        #[serde(default)]
        message: String,
    }

    // Twitter: {"errors":[{"message":"...", "detail":"...", "title":"..."}]}
    #[derive(Deserialize)]
    struct TwErrors {
        errors: Vec<TwErr>,
    }
    #[derive(Deserialize)]
    struct TwErr {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"title":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    fn first_non_empty(candidates: [String; 3]) -> Option<String> {
        candidates.into_iter().find(|s| !s.is_empty())
    }

    if let Ok(env) = serde_json::from_slice::<AzureEnv>(body) {
        if let Some(msg) = first_non_empty([env.error.message, env.error.code, String::new()]) {
            return msg;
        }
    }
    if let Ok(tw) = serde_json::from_slice::<TwErrors>(body) {
        if let Some(first) = tw.errors.into_iter().next() {
            if let Some(msg) = first_non_empty([first.message, first.detail, first.title]) {
                return msg;
            }
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if let Some(msg) = first_non_empty([m.message, m.detail, m.title]) {
            return msg;
        }
    }
    snip_body(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn azure_error_message_is_extracted() {
        let body = br#"{"error":{"code":"InvalidRequest","message":"Batch request contains too many records."}}"#;
        assert_eq!(
            extract_error_message(body),
            "Batch request contains too many records."
        );
    }

    #[test]
    fn twitter_error_falls_back_to_detail() {
        let body = br#"{"errors":[{"detail":"Could not find user with username: [ghost]."}]}"#;
        assert_eq!(
            extract_error_message(body),
            "Could not find user with username: [ghost]."
        );
    }

    #[test]
    fn unknown_bodies_are_snipped() {
        let body = "x".repeat(800);
        let msg = extract_error_message(body.as_bytes());
        assert_eq!(msg.len(), 503);
        assert!(msg.ends_with("..."));
    }

    #[test]
    fn secrets_never_reach_curl_output() {
        let url = Url::parse("https://example.com/text/analytics/v3.1/sentiment").unwrap();
        let query = redact_pairs([("token", "s3cr3t"), ("q", "rust")].into_iter());
        let mut headers = HeaderMap::new();
        headers.insert(
            "Ocp-Apim-Subscription-Key",
            HeaderValue::from_static("azure-secret"),
        );
        let curl = make_curl(&Method::POST, &url, &query, Some(&headers), Some(b"{}"), 64);
        assert!(!curl.contains("s3cr3t"));
        assert!(!curl.contains("azure-secret"));
        assert!(curl.contains("q=rust"));
    }
}
