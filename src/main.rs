//! MAJOR-BOT: Multi-account daily rewards runner
//!
//! Entry point. Loads configuration and credentials, initialises
//! structured logging, and runs the pass → idle loop until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use major_bot::accounts;
use major_bot::api::client::MajorClient;
use major_bot::config::{self, AppConfig};
use major_bot::console::Console;
use major_bot::engine::pacing::TokioPacer;
use major_bot::engine::processor::AccountProcessor;
use major_bot::engine::runner::Runner;

const BANNER: &str = r#"
 __  __    _       _  ___  ____
|  \/  |  / \     | |/ _ \|  _ \
| |\/| | / _ \ _  | | | | | |_) |
| |  | |/ ___ \ |_| | |_| |  _ <
|_|  |_/_/   \_\___/ \___/|_| \_\

  Daily rewards runner
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Initialise structured logging
    init_logging();

    let config_path = std::env::var(config::CONFIG_PATH_ENV)
        .unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    // Missing credentials are the one fatal startup error.
    let credentials = accounts::load_credentials(&cfg.agent.data_file)?;

    println!("{BANNER}");
    info!(
        agent_name = %cfg.agent.name,
        accounts = credentials.len(),
        pass_interval_secs = cfg.pacing.pass_interval_secs,
        rating_policy = ?cfg.totals.rating_policy,
        "MAJOR-BOT starting up"
    );

    // -- Initialise components -------------------------------------------

    let api = Arc::new(MajorClient::new(&cfg.api)?);
    let processor = AccountProcessor::new(api, cfg.rewards.clone(), &cfg.pacing);
    let runner = Runner::new(
        processor,
        Arc::new(TokioPacer),
        &cfg.pacing,
        cfg.totals.rating_policy,
    );

    // -- Main loop -------------------------------------------------------

    info!("Entering main loop. Press Ctrl+C to stop.");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let passes = runner.run(&credentials, &mut Console, shutdown).await;

    info!(passes, "MAJOR-BOT stopped.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("major_bot=info"));

    let json_logging = std::env::var("MAJOR_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
