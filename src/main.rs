use std::time::Duration;

use clap::Parser;

use macrometer::config::ClientConfig;
use macrometer::shell;
use macrometer::state::AppState;

/// Terminal client for the MacroMeter calorie tracker.
#[derive(Parser, Debug)]
#[command(name = "macrometer", version, about)]
struct Cli {
    /// Backend base URL, overrides API_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Refuse authenticated calls locally while logged out.
    #[arg(long)]
    strict_auth: bool,

    /// Per-request timeout in seconds, overrides API_TIMEOUT_SECS.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "macrometer=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    // stdout belongs to the shell
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.base_url {
        config.api_base_url = url;
    }
    if cli.strict_auth {
        config.strict_auth = true;
    }
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    config.validate()?;

    tracing::info!(
        base_url = %config.api_base_url,
        strict_auth = config.strict_auth,
        "starting macrometer"
    );
    let state = AppState::init(config)?;
    shell::run_shell(state).await
}
