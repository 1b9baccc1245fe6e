//! Retrying request executor: issues a single logical operation against the
//! API base URL and retries transient failures with exponential backoff.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Proxy};
use tracing::{debug, warn};

use super::backoff::BackoffTimer;
use super::{ApiRequest, ApiResponse, FilePayload, RequestBody, build_user_agent};
use crate::error::{Error, Result};
use crate::options::{ProxyConfig, TranslatorOptions};

/// Stateless across calls apart from the per-call retry counter; safe to
/// share between concurrent operations.
#[derive(Debug)]
pub struct RequestExecutor {
    client: Client,
    server_url: String,
    auth_header: String,
    user_agent: String,
    max_retries: u32,
    min_timeout: Duration,
}

impl RequestExecutor {
    pub fn new(auth_key: &str, server_url: String, options: &TranslatorOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if !options.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }
        for proxy in build_proxies(options.proxy.as_ref())? {
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
            auth_header: format!("Lingo-Auth-Key {auth_key}"),
            user_agent: build_user_agent(
                options.user_agent.as_deref(),
                options.send_platform_info,
                options.app_info.as_ref(),
            ),
            max_retries: options.max_network_retries,
            min_timeout: options.min_connection_timeout,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Executes the request, retrying transient failures. HTTP error statuses
    /// are returned as responses for classification by the resource client;
    /// only requests that never produced a response fail here.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut backoff = BackoffTimer::new(self.min_timeout);
        debug!(method = %request.method, path = %request.path, "API request");

        loop {
            match self.send_once(request, backoff.timeout()).await {
                Ok(response) => {
                    if !retryable_status(response.status) || backoff.retries() >= self.max_retries {
                        debug!(
                            path = %request.path,
                            status = response.status,
                            attempts = backoff.retries() + 1,
                            "API response"
                        );
                        return Ok(response);
                    }
                    warn!(
                        path = %request.path,
                        status = response.status,
                        "retryable server error"
                    );
                }
                Err(error) => {
                    if !error.should_retry() {
                        return Err(error);
                    }
                    if backoff.retries() >= self.max_retries {
                        warn!(
                            path = %request.path,
                            attempts = backoff.retries() + 1,
                            error = %error,
                            "request failed after retries"
                        );
                        return Err(error.exhausted());
                    }
                    warn!(path = %request.path, error = %error, "retryable connection failure");
                }
            }

            let delay = backoff.next_delay();
            debug!(
                path = %request.path,
                retry = backoff.retries(),
                delay_ms = delay.as_millis() as u64,
                "sleeping before retry"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send_once(&self, request: &ApiRequest, timeout: Duration) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.server_url, request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .timeout(request.timeout.unwrap_or(timeout))
            .header(AUTHORIZATION, &self.auth_header)
            .header(USER_AGENT, &self.user_agent);

        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match (&request.body, &request.file) {
            (body, Some(file)) => builder.multipart(build_multipart(body, file)?),
            (RequestBody::Json(value), None) => builder.json(value),
            (RequestBody::Form(fields), None) => builder.form(fields),
            (RequestBody::None, None) => builder,
        };

        let response = builder.send().await.map_err(classify_send_error)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| Error::Connection {
            message: format!("failed to read response body: {e}"),
            should_retry: true,
        })?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

/// Retry on rate limiting and the transient server-error statuses; every
/// other status is surfaced after a single attempt.
fn retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn classify_send_error(error: reqwest::Error) -> Error {
    let should_retry = error.is_timeout() || error.is_connect();
    Error::Connection {
        message: error.to_string(),
        should_retry,
    }
}

/// Multipart bodies are rebuilt from the retained bytes for every attempt so
/// a retry never re-sends a consumed stream.
fn build_multipart(body: &RequestBody, file: &FilePayload) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    if let RequestBody::Form(fields) = body {
        for (key, value) in fields {
            form = form.text(key.clone(), value.clone());
        }
    }
    let part = reqwest::multipart::Part::bytes(file.content.to_vec())
        .file_name(file.filename.clone())
        .mime_str(mime::APPLICATION_OCTET_STREAM.as_ref())
        .map_err(|e| Error::Config(format!("invalid upload content type: {e}")))?;
    Ok(form.part("file", part))
}

fn build_proxies(config: Option<&ProxyConfig>) -> Result<Vec<Proxy>> {
    let invalid = |e: reqwest::Error| Error::Config(format!("invalid proxy URL: {e}"));
    match config {
        None => Ok(Vec::new()),
        Some(ProxyConfig::Single(url)) => Ok(vec![Proxy::all(url).map_err(invalid)?]),
        Some(ProxyConfig::PerScheme { http, https }) => {
            let mut proxies = Vec::new();
            if let Some(url) = http {
                proxies.push(Proxy::http(url).map_err(invalid)?);
            }
            if let Some(url) = https {
                proxies.push(Proxy::https(url).map_err(invalid)?);
            }
            Ok(proxies)
        }
    }
}
