mod config;
mod error;
mod extract;
mod monitor;
mod page;
mod post;
mod state;
mod telegram;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use config::Config;
use monitor::{run, RunReport, Watch};
use page::HttpPageSource;
use std::path::Path;
use std::process::ExitCode;
use telegram::TelegramNotifier;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = Config::load(Path::new(&config_path)).context("Failed to load configuration")?;
    let rule = config.post_rule()?;
    let site_label = config.site_label();

    let source = HttpPageSource::new(&config.site_url, &config.user_agent)?;
    let notifier = TelegramNotifier::new(&config.telegram);
    let watch = Watch {
        rule: &rule,
        state_file: Path::new(&config.state_file),
        site_label: &site_label,
    };

    match run(&watch, &source, &notifier).await {
        Ok(RunReport::NoNewPosts) => Ok(ExitCode::SUCCESS),
        Ok(report) => {
            for d in report.failures() {
                tracing::warn!(link = %d.post.link, "Post will not be retried");
            }
            tracing::info!(sent = report.sent(), failed = report.failed(), "Run complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            Ok(ExitCode::FAILURE)
        }
    }
}
