//! HTTP responses.
//!
//! Handlers build a [`Reply`]; [`send`] turns it into a tiny_http response.
//! HEAD requests get the same status and headers with an empty body.

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde_json::json;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::utils::mime::types::{JSON, PLAIN};

/// A response waiting to be sent.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub headers: Vec<(&'static str, String)>,
}

impl Reply {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::new(status, PLAIN, body)
    }

    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::new(status, JSON, body),
            Err(e) => Self::error(500, &e.to_string()),
        }
    }

    /// `{ "error": message }`
    pub fn error(status: u16, message: &str) -> Self {
        Self::new(status, JSON, json!({ "error": message }).to_string())
    }

    pub fn no_content() -> Self {
        Self::new(204, PLAIN, Vec::new())
    }

    pub fn not_found() -> Self {
        Self::text(404, "404 Not Found")
    }

    pub fn unavailable() -> Self {
        Self::text(503, "503 Service Unavailable")
    }

    pub fn method_not_allowed(allow: &Method) -> Self {
        Self::text(405, "405 Method Not Allowed").with_header("Allow", allow.to_string())
    }

    pub fn with_header(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((key, value.into()));
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }
}

/// Send `reply` as the response to `request`.
pub fn send(request: Request, reply: Reply) -> Result<()> {
    let mut headers = vec![make_header("Content-Type", reply.content_type)?];
    for (key, value) in &reply.headers {
        headers.push(make_header(key, value)?);
    }

    let body = if is_head_request(&request) {
        Vec::new()
    } else {
        reply.body
    };

    let mut response = Response::from_data(body).with_status_code(StatusCode(reply.status));
    for header in headers {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send(request, Reply::unavailable())
}

/// Value of the request header `name`, matched case-insensitively.
pub fn request_header<'a>(request: &'a Request, name: &'static str) -> Option<&'a str> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn make_header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|_| anyhow!("invalid header {key}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body() {
        let reply = Reply::error(422, "Expected `}`");
        assert_eq!(reply.status, 422);
        assert_eq!(reply.content_type, JSON);
        let body: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(body, json!({ "error": "Expected `}`" }));
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let reply = Reply::method_not_allowed(&Method::Post);
        assert_eq!(reply.status, 405);
        assert_eq!(reply.header("allow"), Some("POST"));
    }
}
