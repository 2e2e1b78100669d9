use serde::Serialize;
use std::io::Cursor;
use tiny_http::{Header, Response, StatusCode};

use crate::constants::{CORS_HEADER, CORS_ORIGIN};

pub type PanelResponse = Response<Cursor<Vec<u8>>>;

fn content_type(value: &str) -> Header {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes())
        .expect("content type is a valid header")
}

/// Return a JSON response with the given data and status code
pub fn json_response_with_status<T: Serialize>(status: StatusCode, data: &T) -> PanelResponse {
    match serde_json::to_vec(data) {
        Ok(json_bytes) => {
            let content_length = json_bytes.len();
            let mut response =
                Response::new(status, vec![], Cursor::new(json_bytes), Some(content_length), None);
            response.add_header(content_type("application/json"));
            response
        }
        Err(err) => text_response_with_status(StatusCode(500), &err.to_string()),
    }
}

/// Return a plain text response with the given status code
pub fn text_response_with_status(status: StatusCode, text: &str) -> PanelResponse {
    let mut response = Response::from_string(text).with_status_code(status);
    response.add_header(content_type("text/plain; charset=utf-8"));
    response
}

/// Return an HTML response with status code 200 OK
pub fn html_response(html: &str) -> PanelResponse {
    let mut response = Response::from_string(html);
    response.add_header(content_type("text/html; charset=utf-8"));
    response
}

/// Return an empty response with the given status code
pub fn empty_response_with_status(status: StatusCode) -> PanelResponse {
    Response::new(status, vec![], Cursor::new(vec![]), Some(0), None)
}

/// Return the empty pre-flight response carrying the cross-origin header
pub fn preflight_response() -> PanelResponse {
    let header = Header::from_bytes(CORS_HEADER.as_bytes(), CORS_ORIGIN.as_bytes())
        .expect("cross-origin header is valid");
    empty_response_with_status(StatusCode(200)).with_header(header)
}
