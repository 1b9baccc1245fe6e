//! Request descriptors and the retrying executor.

mod backoff;
mod executor;

pub use backoff::BackoffTimer;
pub(crate) use backoff::POLL_BACKOFF_CAP;
pub use executor::RequestExecutor;

use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;

/// Request body variants. Bodies with a file attachment are sent as
/// multipart, form bodies without one are URL-encoded.
#[derive(Debug, Clone)]
pub enum RequestBody {
    None,
    Form(Vec<(String, String)>),
    Json(Value),
}

/// A file attached to an upload request. The content is retained as [`Bytes`]
/// so the multipart body can be rebuilt for every retry attempt.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub filename: String,
    pub content: Bytes,
}

/// Describes one logical API operation. Immutable once built; the executor
/// may send it several times when retrying.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: RequestBody,
    pub(crate) file: Option<FilePayload>,
    pub(crate) headers: Vec<(&'static str, String)>,
    pub(crate) timeout: Option<Duration>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::None,
            file: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    pub fn file(mut self, filename: impl Into<String>, content: Bytes) -> Self {
        self.file = Some(FilePayload {
            filename: filename.into(),
            content,
        });
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Per-request timeout override; replaces the backoff-derived timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The raw outcome of an executed request: status classification happens in
/// the resource client, not here.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Builds the user-agent string sent with every request. Platform details are
/// only included when the caller has allowed it.
pub(crate) fn build_user_agent(
    user_agent_override: Option<&str>,
    send_platform_info: bool,
    app_info: Option<&crate::options::AppInfo>,
) -> String {
    let mut agent = match user_agent_override {
        Some(value) => value.to_string(),
        None => {
            let mut value = format!("lingo-rust/{}", env!("CARGO_PKG_VERSION"));
            if send_platform_info {
                value.push_str(&format!(
                    " ({} {}) reqwest",
                    std::env::consts::OS,
                    std::env::consts::ARCH
                ));
            }
            value
        }
    };
    if let Some(info) = app_info {
        agent.push_str(&format!(" {}/{}", info.name, info.version));
    }
    agent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("v2/languages")
            .query("type", "target")
            .header("Accept", "application/json")
            .timeout(Duration::from_secs(3));

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "v2/languages");
        assert_eq!(request.query, vec![("type".to_string(), "target".to_string())]);
        assert_eq!(request.timeout, Some(Duration::from_secs(3)));
        assert!(matches!(request.body, RequestBody::None));
    }

    #[test]
    fn test_user_agent_variants() {
        let plain = build_user_agent(None, false, None);
        assert!(plain.starts_with("lingo-rust/"));
        assert!(!plain.contains('('));

        let with_platform = build_user_agent(None, true, None);
        assert!(with_platform.contains('('));

        let app_info = crate::options::AppInfo {
            name: "my-app".to_string(),
            version: "1.2.3".to_string(),
        };
        let with_app = build_user_agent(Some("custom-agent"), true, Some(&app_info));
        assert_eq!(with_app, "custom-agent my-app/1.2.3");
    }

    #[test]
    fn test_response_json_accessor() {
        let response = ApiResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"{\"message\":\"ok\"}"),
        };
        assert!(response.is_success());
        assert_eq!(response.json().unwrap()["message"], "ok");

        let broken = ApiResponse {
            status: 502,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"<html>bad gateway</html>"),
        };
        assert!(!broken.is_success());
        assert!(broken.json().is_none());
    }
}
