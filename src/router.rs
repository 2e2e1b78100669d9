use std::{io::Read, sync::Arc};

use tiny_http::{Method, StatusCode};
use tracing::debug;
use url::Url;

use crate::allow_list::ServiceLocks;
use crate::constants::Config;
use crate::handlers::{
    control::handle_control_request, home::handle_home_request,
    services::handle_services_request,
};
use crate::service_manager::{Backend, CommandRunner, ServiceManager};
use crate::utilities::{empty_response_with_status, preflight_response, PanelResponse};

const HOME: &str = "/home";
const CONTROL: &str = "/control";
const SERVICES: &str = "/services";

/// Everything a request worker needs, fixed at startup
pub struct Panel {
    pub config: Config,
    pub services: ServiceManager,
    pub locks: ServiceLocks,
}

impl Panel {
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        let backend = config.backend.unwrap_or_else(Backend::native);
        let locks = ServiceLocks::new(&config.allow_services);

        Self {
            services: ServiceManager::new(backend, runner),
            locks,
            config,
        }
    }
}

fn in_scope(path: &str, route: &str) -> bool {
    path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Dispatch one request to its handler
pub fn route(method: &Method, url: &str, body: &mut dyn Read, panel: &Panel) -> PanelResponse {
    let full_url = format!("http://localhost{}", url);
    let parsed_url = match Url::parse(&full_url) {
        Ok(parsed_url) => parsed_url,
        Err(_) => return empty_response_with_status(StatusCode(400)),
    };
    let path = parsed_url.path();

    debug!(method = %method, path = %path, "Handling request");

    if *method == Method::Options {
        return if [HOME, CONTROL, SERVICES]
            .iter()
            .any(|route| in_scope(path, route))
        {
            preflight_response()
        } else {
            empty_response_with_status(StatusCode(404))
        };
    }

    match (method, path) {
        (Method::Get, HOME) => handle_home_request(),
        (Method::Post, CONTROL) => handle_control_request(body, panel),
        (Method::Get, SERVICES) => handle_services_request(panel),
        (_, HOME | CONTROL | SERVICES) => empty_response_with_status(StatusCode(405)),
        _ => empty_response_with_status(StatusCode(404)),
    }
}
