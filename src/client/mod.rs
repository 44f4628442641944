//! Blocking HTTP wrapper for the remote API.
//!
//! Every call yields an [`ApiResponse`]; transport errors never escape as
//! `Err`, they are folded into a failed response with status `0`.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Response body, parsed as JSON when possible
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Parse raw text as JSON, keeping the text when it is not JSON
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text),
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn is_object(&self) -> bool {
        self.json().map_or(false, Value::is_object)
    }

    /// Rendering truncated to `max_chars` characters, for console output
    pub fn excerpt(&self, max_chars: usize) -> String {
        let full = self.to_string();
        if full.chars().count() <= max_chars {
            return full;
        }
        let cut: String = full.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{}", value),
            ResponseBody::Text(text) => f.write_str(text),
        }
    }
}

/// Normalized outcome of one HTTP call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// `true` when the status code is below 400
    pub success: bool,
    pub body: ResponseBody,
    /// HTTP status, `0` when no response was received
    pub status: u16,
}

impl ApiResponse {
    pub fn from_status(status: u16, body: ResponseBody) -> Self {
        Self {
            success: status < 400,
            body,
            status,
        }
    }

    pub fn network_failure(description: impl Into<String>) -> Self {
        Self {
            success: false,
            body: ResponseBody::Text(description.into()),
            status: 0,
        }
    }

    pub fn is_network_failure(&self) -> bool {
        self.status == 0
    }
}

/// HTTP client bound to the API base URL
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue one request. `token`, when present, is merged into `headers`
    /// as a bearer `Authorization` header.
    pub fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
        headers: Option<HeaderMap>,
        token: Option<&str>,
    ) -> ApiResponse {
        let Some(method) = parse_method(method) else {
            return ApiResponse::network_failure(format!("Unsupported method: {}", method));
        };

        let url = self.url(path);
        let mut req = self
            .http
            .request(method.clone(), &url)
            .headers(with_bearer(headers, token));

        if let Some(body) = body {
            req = req.json(body);
        }

        let response = match req.send() {
            Ok(response) => response,
            Err(e) => {
                warn!("{} {} failed: {}", method, url, e);
                return ApiResponse::network_failure(e.to_string());
            }
        };

        let status = response.status().as_u16();
        debug!("{} {} -> {}", method, url, status);

        match response.text() {
            Ok(text) => ApiResponse::from_status(status, ResponseBody::parse(text)),
            Err(e) => {
                warn!("{} {}: failed to read body: {}", method, url, e);
                ApiResponse::network_failure(e.to_string())
            }
        }
    }

    pub fn get(&self, path: &str, token: Option<&str>) -> ApiResponse {
        self.request("GET", path, None, None, token)
    }
}

fn parse_method(method: &str) -> Option<Method> {
    match method.to_ascii_uppercase().as_str() {
        "GET" => Some(Method::GET),
        "POST" => Some(Method::POST),
        "PUT" => Some(Method::PUT),
        "DELETE" => Some(Method::DELETE),
        "PATCH" => Some(Method::PATCH),
        _ => None,
    }
}

/// Merge a bearer token into an optional caller-supplied header set
pub fn with_bearer(headers: Option<HeaderMap>, token: Option<&str>) -> HeaderMap {
    let mut headers = headers.unwrap_or_default();
    if let Some(token) = token {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Bearer token is not a valid header value, sending without it"),
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::ACCEPT;
    use serde_json::json;

    #[test]
    fn test_body_falls_back_to_text() {
        assert_eq!(
            ResponseBody::parse(r#"{"success":true}"#.to_string()),
            ResponseBody::Json(json!({"success": true}))
        );
        assert_eq!(
            ResponseBody::parse("<html>Bad Gateway</html>".to_string()),
            ResponseBody::Text("<html>Bad Gateway</html>".to_string())
        );
        assert_eq!(
            ResponseBody::parse(String::new()),
            ResponseBody::Text(String::new())
        );
    }

    #[test]
    fn test_success_threshold() {
        assert!(ApiResponse::from_status(201, ResponseBody::Text(String::new())).success);
        assert!(ApiResponse::from_status(399, ResponseBody::Text(String::new())).success);
        assert!(!ApiResponse::from_status(400, ResponseBody::Text(String::new())).success);
    }

    #[test]
    fn test_bearer_merged_into_caller_headers() {
        let mut caller = HeaderMap::new();
        caller.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let merged = with_bearer(Some(caller), Some("abc"));
        assert_eq!(merged.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(merged.get(AUTHORIZATION).unwrap(), "Bearer abc");

        let fresh = with_bearer(None, Some("abc"));
        assert_eq!(fresh.len(), 1);

        assert!(with_bearer(None, None).is_empty());
    }

    #[test]
    fn test_unsupported_method_is_a_failure() {
        let client = ApiClient::new("http://127.0.0.1:9/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/api");

        let resp = client.request("TRACE", "/", None, None, None);
        assert!(!resp.success);
        assert_eq!(resp.status, 0);
        assert_eq!(
            resp.body,
            ResponseBody::Text("Unsupported method: TRACE".to_string())
        );
    }

    #[test]
    fn test_connection_refused_is_status_zero() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = ApiClient::new(
            &format!("http://127.0.0.1:{}/api", port),
            Duration::from_secs(2),
        )
        .unwrap();

        let resp = client.get("/", None);
        assert!(resp.is_network_failure());
        assert!(!resp.success);
        assert!(matches!(resp.body, ResponseBody::Text(ref t) if !t.is_empty()));
    }

    #[test]
    fn test_excerpt_truncates() {
        let body = ResponseBody::Text("abcdefgh".to_string());
        assert_eq!(body.excerpt(3), "abc...");
        assert_eq!(body.excerpt(20), "abcdefgh");
    }
}
