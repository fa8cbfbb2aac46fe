use postlens_common::{Post, UNDETERMINED_LANGUAGE};
use serde::{Deserialize, Serialize};

/// `GET /2/users/by/username/:username`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLookupResponse {
    #[serde(default)]
    pub data: Option<User>,
    #[serde(default)]
    pub errors: Option<Vec<ApiProblem>>,
}

/// `GET /2/users/:id/tweets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineResponse {
    #[serde(default)]
    pub data: Option<Vec<Tweet>>,
    #[serde(default)]
    pub meta: Option<Meta>,
    #[serde(default)]
    pub errors: Option<Vec<ApiProblem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Meta {
    #[serde(default)]
    pub result_count: Option<u32>,
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Partial errors Twitter reports next to (or instead of) `data`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiProblem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub referenced_tweets: Option<Vec<ReferencedTweet>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencedTweet {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl Tweet {
    pub fn is_retweet(&self) -> bool {
        self.referenced_tweets
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|r| r.kind == "retweeted")
    }
}

impl From<Tweet> for Post {
    fn from(tweet: Tweet) -> Self {
        let language = tweet
            .lang
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string());
        Post::new(tweet.id, tweet.text, language)
    }
}
