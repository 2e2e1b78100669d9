use tiny_http::StatusCode;
use tracing::warn;

use crate::constants::LIST_FAILED;
use crate::router::Panel;
use crate::utilities::{json_response_with_status, text_response_with_status, PanelResponse};

/// List the state of every allow-listed service as a JSON array
pub fn handle_services_request(panel: &Panel) -> PanelResponse {
    match panel.services.list(&panel.config.allow_services) {
        Ok(services) => json_response_with_status(StatusCode(200), &services),
        Err(err) => {
            warn!(error = %err, "Failed to query services");
            text_response_with_status(StatusCode(403), LIST_FAILED)
        }
    }
}
