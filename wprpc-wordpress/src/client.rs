//! HTTP client for the WordPress REST API
//!
//! Every call targets `<siteUrl>/wp-json/wp/v2` of the credentials it was
//! given, authenticated with HTTP Basic auth. Credentials differ per request,
//! so the auth header is attached per call rather than as a client default;
//! the underlying connection pool is shared.
//!
//! | operation | request |
//! |---|---|
//! | create | `POST /posts` with `{title, content, status}` |
//! | list | `GET /posts?per_page=N&page=M` |
//! | update | `POST /posts/{id}` with the changed fields only |

use crate::backend::{Backend, BackendError};
use crate::config::WordPressConfig;
use crate::operation::Operation;
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use wprpc_core::Credentials;

/// Path of the posts API below the site address
pub const API_PATH: &str = "/wp-json/wp/v2";

/// Base address of the REST API for a site
pub fn api_base(site_url: &str) -> String {
    format!("{}{}", site_url.trim_end_matches('/'), API_PATH)
}

/// `Authorization` header value for HTTP Basic auth
pub fn basic_auth(credentials: &Credentials) -> Result<HeaderValue, BackendError> {
    let encoded = base64::engine::general_purpose::STANDARD
        .encode(format!("{}:{}", credentials.username, credentials.password));
    let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))
        .map_err(|e| BackendError::Request(format!("Invalid basic auth: {}", e)))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Address of an API resource; each segment is percent-encoded on its own
///
/// `.` and `..` are refused, since the URL writer would drop them silently.
pub fn endpoint(site_url: &str, segments: &[&str]) -> Result<Url, BackendError> {
    if let Some(dot) = segments.iter().find(|s| matches!(s.trim(), "." | "..")) {
        return Err(BackendError::Request(format!("Invalid path segment: {:?}", dot)));
    }
    let mut url = Url::parse(&api_base(site_url))
        .map_err(|e| BackendError::Request(format!("Invalid site URL: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| BackendError::Request(format!("Invalid site URL: {}", site_url)))?
        .extend(segments);
    Ok(url)
}

/// WordPress backend over HTTP
#[derive(Debug, Clone)]
pub struct WordPressClient {
    http: reqwest::Client,
}

impl WordPressClient {
    /// Build a client honouring the configured timeout
    pub fn new(config: &WordPressConfig) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| BackendError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }

    fn request(
        &self,
        method: Method,
        url: Url,
        credentials: &Credentials,
    ) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, basic_auth(credentials)?)
            .header(CONTENT_TYPE, "application/json"))
    }

    fn build(
        &self,
        operation: &Operation,
        credentials: &Credentials,
    ) -> Result<RequestBuilder, BackendError> {
        let site = &credentials.site_url;

        let request = match operation {
            Operation::CreatePost(post) => self
                .request(Method::POST, endpoint(site, &["posts"])?, credentials)?
                .json(post),
            Operation::GetPosts(query) => self
                .request(Method::GET, endpoint(site, &["posts"])?, credentials)?
                .query(&[("per_page", query.per_page), ("page", query.page)]),
            Operation::UpdatePost(update) => {
                let id = update.post_id.to_string();
                self.request(Method::POST, endpoint(site, &["posts", &id])?, credentials)?
                    .json(&update.changes)
            }
        };

        Ok(request)
    }
}

#[async_trait]
impl Backend for WordPressClient {
    #[tracing::instrument(skip_all, name = "wordpress.invoke", fields(method = operation.method()))]
    async fn invoke(
        &self,
        operation: Operation,
        credentials: &Credentials,
    ) -> Result<Value, BackendError> {
        let response = self
            .build(&operation, credentials)?
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Backend responded");

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        Ok(payload(&body))
    }
}

/// The error body's `message`, else the generic status text
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()))
}

/// A JSON body as-is, anything else as a JSON string
fn payload(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
