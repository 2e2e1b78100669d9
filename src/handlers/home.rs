use crate::utilities::{html_response, PanelResponse};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Serve the static control page
pub fn handle_home_request() -> PanelResponse {
    html_response(INDEX_HTML)
}
