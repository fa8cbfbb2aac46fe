//! Loader for workspace configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are added, then `POSTLENS__*`
//! environment variables win (`POSTLENS__TWITTER__BEARER_TOKEN` maps to
//! `twitter.bearer_token`). `${VAR}` placeholders anywhere in the merged tree
//! are expanded before the typed structs are materialised.
//!
//! ```yaml
//! version: "1"
//! twitter:
//!   bearer_token: "${TWITTER_BEARER_TOKEN}"
//! text_analytics:
//!   provider: azure
//!   endpoint: "https://my-resource.cognitiveservices.azure.com"
//!   api_key: "${AZURE_TEXT_ANALYTICS_KEY}"
//! analysis:
//!   max_posts: 50
//!   fail_fast: false
//! logging:
//!   format: json
//!   emit_stderr: true
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "POSTLENS";

#[derive(Debug, Deserialize)]
pub struct PostlensConfig {
    pub version: Option<String>,
    pub twitter: TwitterConfig,
    pub text_analytics: TextAnalyticsConfig,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize)]
pub struct TwitterConfig {
    pub bearer_token: String,
    #[serde(default = "default_twitter_base_url")]
    pub base_url: String,
}

/// The tag is `provider`; the remaining keys are provider specific.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum TextAnalyticsConfig {
    Azure {
        endpoint: String,
        api_key: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default = "default_max_posts")]
    pub max_posts: usize,
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_posts: default_max_posts(),
            fail_fast: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub emit_stderr: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            emit_stderr: false,
            dir: None,
            filter: default_log_filter(),
        }
    }
}

fn default_twitter_base_url() -> String {
    "https://api.twitter.com".into()
}
fn default_max_posts() -> usize {
    50
}
fn default_log_format() -> String {
    "text".into()
}
fn default_log_filter() -> String {
    "info".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct PostlensConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PostlensConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PostlensConfigLoader {
    /// Start with the environment overlay only; add files or snippets next.
    ///
    /// ```
    /// use postlens_config::PostlensConfigLoader;
    ///
    /// let config = PostlensConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// twitter: { bearer_token: "tw" }
    /// text_analytics: { provider: azure, endpoint: "https://x.example", api_key: "k" }
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.analysis.max_posts, 50);
    /// assert!(!config.analysis.fail_fast);
    /// assert_eq!(config.twitter.base_url, "https://api.twitter.com");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`Self::with_file`], but a missing file is skipped so deployments
    /// can rely purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use postlens_config::{PostlensConfigLoader, TextAnalyticsConfig};
    ///
    /// unsafe { std::env::set_var("DOC_AZURE_KEY", "injected-from-env"); }
    ///
    /// let config = PostlensConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// version: "1"
    /// twitter:
    ///   bearer_token: "tw-token"
    /// text_analytics:
    ///   provider: "azure"
    ///   endpoint: "https://lang.example"
    ///   api_key: "${DOC_AZURE_KEY}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match &config.text_analytics {
    ///     TextAnalyticsConfig::Azure { api_key, endpoint, .. } => {
    ///         assert_eq!(api_key, "injected-from-env");
    ///         assert_eq!(endpoint, "https://lang.example");
    ///     }
    /// }
    ///
    /// unsafe { std::env::remove_var("DOC_AZURE_KEY"); }
    /// ```
    pub fn load(self) -> Result<PostlensConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
