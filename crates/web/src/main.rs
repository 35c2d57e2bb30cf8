use std::process::ExitCode;

use inkwell_web::{Config, Server};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(config.log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
    }

    let server = match Server::new(&config) {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "failed to prepare server");
            return ExitCode::FAILURE;
        }
    };

    match server.start().await {
        Ok(()) => {
            info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(cause = %e, "bind server error");
            ExitCode::FAILURE
        }
    }
}
