use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use postlens_common::observability::init_logging;
use postlens_config::{PostlensConfig, PostlensConfigLoader};
use postlens_text::traits::TextAnalysisClient as _;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
mod wiring;

#[derive(Parser, Debug)]
#[command(name = "postlens")]
#[command(about = "Key phrases and sentiment for a user's recent posts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// YAML config file; POSTLENS__* environment variables override it.
    #[arg(short, long, default_value = "postlens.yaml", env = "POSTLENS_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Distinct key phrases across the user's recent posts.
    Topics(Target),
    /// One sentiment judgment per batch of the user's recent posts.
    Sentiment(Target),
    /// Probe the text analytics service with the configured credentials.
    Check,
}

#[derive(Args, Debug)]
struct Target {
    username: String,

    /// Upper bound on posts fetched (defaults to `analysis.max_posts`).
    #[arg(long)]
    max_posts: Option<usize>,

    /// Abort on the first failed batch instead of skipping it.
    #[arg(long, overrides_with = "no_fail_fast")]
    fail_fast: bool,

    /// Skip failed batches even when `analysis.fail_fast` is set.
    #[arg(long, overrides_with = "fail_fast")]
    no_fail_fast: bool,
}

impl Target {
    /// `None` when neither flag was given, so the config value stands.
    fn fail_fast_override(&self) -> Option<bool> {
        if self.fail_fast {
            Some(true)
        } else if self.no_fail_fast {
            Some(false)
        } else {
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config first: logging is configured from it (env wins).
    let cfg: PostlensConfig = PostlensConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    let log_path = init_logging(wiring::log_config(&cfg.logging))?;
    tracing::debug!(log = %log_path.display(), config = %cli.config.display(), "postlens.start");

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("ctrl-c received, cancelling");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Command::Topics(target) => {
            let orchestrator = wiring::build_orchestrator(&cfg)?;
            let options = wiring::analysis_options(
                &cfg.analysis,
                target.max_posts,
                target.fail_fast_override(),
            );
            let outcome = orchestrator
                .analyze_topics(&target.username, options, &cancel)
                .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Sentiment(target) => {
            let orchestrator = wiring::build_orchestrator(&cfg)?;
            let options = wiring::analysis_options(
                &cfg.analysis,
                target.max_posts,
                target.fail_fast_override(),
            );
            let outcome = orchestrator
                .analyze_sentiment(&target.username, options, &cancel)
                .await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Check => {
            let text = wiring::build_text_client(&cfg)?;
            if !text.health_check().await? {
                bail!("{} text analytics service is unreachable", text.provider_name());
            }
            println!("{}: ok", text.provider_name());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(args: &[&str]) -> Target {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Topics(target) | Command::Sentiment(target) => target,
            Command::Check => panic!("expected an analysis command"),
        }
    }

    #[test]
    fn fail_fast_flags_are_tri_state() {
        assert_eq!(target(&["postlens", "topics", "alice"]).fail_fast_override(), None);
        assert_eq!(
            target(&["postlens", "topics", "alice", "--fail-fast"]).fail_fast_override(),
            Some(true)
        );
        assert_eq!(
            target(&["postlens", "sentiment", "alice", "--no-fail-fast"]).fail_fast_override(),
            Some(false)
        );
        assert_eq!(
            target(&["postlens", "topics", "alice", "--fail-fast", "--no-fail-fast"])
                .fail_fast_override(),
            Some(false)
        );
    }
}
