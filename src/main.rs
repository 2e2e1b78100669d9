use std::{path::Path, process::ExitCode, sync::Arc, thread};

use tiny_http::Server;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod allow_list;
mod config;
mod constants;
mod error;
mod handlers;
mod router;
mod service_manager;
mod utilities;
use config::load_config;
use constants::{Config, CONFIG_NAME};
use error::PanelError;
use router::{route, Panel};
use service_manager::SystemRunner;

fn main() -> ExitCode {
    let config = match load_config(Path::new(CONFIG_NAME)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load {}: {}", CONFIG_NAME, err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level) {
        eprintln!("Failed to initialize logging: {}", err);
        return ExitCode::FAILURE;
    }

    match serve(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Service panel stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) -> Result<(), PanelError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| PanelError::Config {
            message: format!("invalid log_level {:?}: {}", level, e),
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

/// Accept requests forever, handling each one on its own thread
fn serve(config: Config) -> Result<(), PanelError> {
    let address = format!("0.0.0.0:{}", config.port);
    let server = Server::http(&address).map_err(|err| PanelError::Server {
        message: format!("cannot listen on {}: {}", address, err),
    })?;

    let panel = Arc::new(Panel::new(config, Arc::new(SystemRunner)));

    info!(
        address = %address,
        backend = ?panel.services.backend(),
        allow_services = ?panel.config.allow_services,
        "Service panel listening"
    );

    for mut request in server.incoming_requests() {
        let panel = Arc::clone(&panel);

        thread::spawn(move || {
            let method = request.method().clone();
            let url = request.url().to_string();

            let response = route(&method, &url, request.as_reader(), &panel);

            if let Err(err) = request.respond(response) {
                warn!(method = %method, url = %url, error = %err, "Failed to send response");
            }
        });
    }

    Ok(())
}
