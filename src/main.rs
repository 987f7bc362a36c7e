use clap::Parser;
use reinvent_sessions::app::App;
use reinvent_sessions::cli::Args;
use reinvent_sessions::config::Config;
use reinvent_sessions::logging::setup_logging;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Config is loaded before logging so the configured level applies from the first event
    let config = match Config::load(args.config.as_deref(), &args.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:?}", anyhow::Error::new(e));
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config.log_level, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        },
        "starting reinvent-sessions"
    );

    let app = match App::new(config, &args) {
        Ok(app) => app,
        Err(e) => {
            error!(error = ?e, "failed to initialize");
            return ExitCode::FAILURE;
        }
    };

    app.run().await
}
