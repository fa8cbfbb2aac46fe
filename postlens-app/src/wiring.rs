use anyhow::{Context, Result};
use postlens_analysis::{AnalysisOptions, BatchAnalysisOrchestrator, TracingFailureLogger};
use postlens_common::observability::{LogConfig, LogFormat};
use postlens_config::{AnalysisSettings, LoggingSettings, PostlensConfig};
use postlens_social::TwitterApi;
use postlens_text::{text_client_from_config, traits::TextAnalysisClient};
use std::sync::Arc;

pub fn log_config(settings: &LoggingSettings) -> LogConfig {
    LogConfig {
        log_dir: settings.dir.clone(),
        emit_stderr: settings.emit_stderr,
        format: LogFormat::from_name(&settings.format),
        default_filter: settings.filter.clone(),
        ..LogConfig::default()
    }
}

/// Command-line flags win over the `analysis` section.
pub fn analysis_options(
    settings: &AnalysisSettings,
    max_posts: Option<usize>,
    fail_fast: Option<bool>,
) -> AnalysisOptions {
    AnalysisOptions::default()
        .with_max_posts(max_posts.unwrap_or(settings.max_posts))
        .fail_fast(fail_fast.unwrap_or(settings.fail_fast))
}

pub fn build_text_client(cfg: &PostlensConfig) -> Result<Arc<dyn TextAnalysisClient>> {
    let client = text_client_from_config(&cfg.text_analytics)
        .context("building text analytics client")?;
    Ok(client)
}

pub fn build_orchestrator(cfg: &PostlensConfig) -> Result<BatchAnalysisOrchestrator> {
    let twitter = TwitterApi::with_base_url(&cfg.twitter.base_url, cfg.twitter.bearer_token.clone())
        .context("building twitter client")?;
    let text = build_text_client(cfg)?;

    tracing::info!(
        twitter = %cfg.twitter.base_url,
        provider = text.provider_name(),
        "postlens.wired"
    );
    Ok(BatchAnalysisOrchestrator::new(
        Arc::new(twitter),
        text,
        Arc::new(TracingFailureLogger),
    ))
}
