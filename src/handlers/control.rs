use std::io::Read;

use serde_json::Deserializer;
use tiny_http::StatusCode;
use tracing::{info, warn};

use crate::allow_list::is_allowed;
use crate::constants::{Command, COMMAND_FAILED, EMPTY_BODY, NOT_ALLOWED, UNKNOWN_ACTION};
use crate::router::Panel;
use crate::service_manager::Action;
use crate::utilities::{empty_response_with_status, text_response_with_status, PanelResponse};

/// Start or stop an allow-listed service named in the JSON request body
pub fn handle_control_request(body: &mut dyn Read, panel: &Panel) -> PanelResponse {
    // Only the first JSON value counts; anything after it is left unread.
    let mut values = Deserializer::from_reader(body).into_iter::<Command>();
    let command = match values.next() {
        Some(Ok(command)) => command,
        Some(Err(err)) => return text_response_with_status(StatusCode(400), &err.to_string()),
        None => return text_response_with_status(StatusCode(400), EMPTY_BODY),
    };

    if !is_allowed(&panel.config.allow_services, &command.service) {
        warn!(service = %command.service, "Rejected control of service outside allow-list");
        return text_response_with_status(StatusCode(403), NOT_ALLOWED);
    }

    let action = match Action::parse(&command.action) {
        Some(action) => action,
        None => return text_response_with_status(StatusCode(400), UNKNOWN_ACTION),
    };

    let _guard = match panel.locks.acquire(&command.service) {
        Some(guard) => guard,
        None => return text_response_with_status(StatusCode(403), NOT_ALLOWED),
    };

    match panel.services.control(action, &command.service) {
        Ok(()) => {
            info!(service = %command.service, action = action.as_str(), "Service command succeeded");
            empty_response_with_status(StatusCode(200))
        }
        Err(err) => {
            warn!(
                service = %command.service,
                action = action.as_str(),
                error = %err,
                "Service command failed"
            );
            text_response_with_status(StatusCode(403), COMMAND_FAILED)
        }
    }
}
