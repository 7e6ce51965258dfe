// src/core/api_client.rs
//! HTTP client for the careers backend: base URL, bearer token, JSON and
//! multipart bodies, and mapping of non-2xx answers onto `ApiError`.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::multipart::{Form, Part};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, trace};

use crate::config::ClientConfig;
use crate::core::query::ListQuery;
use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// A file to send as multipart/form-data
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: &std::path::Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }

    /// Lowercased extension, if any
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let lower_name = file_name.to_lowercase();
    if lower_name.ends_with(".pdf") {
        "application/pdf"
    } else if lower_name.ends_with(".docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else if lower_name.ends_with(".doc") {
        "application/msword"
    } else if lower_name.ends_with(".png") {
        "image/png"
    } else if lower_name.ends_with(".jpg") || lower_name.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower_name.ends_with(".webp") {
        "image/webp"
    } else if lower_name.ends_with(".gif") {
        "image/gif"
    } else {
        "application/octet-stream"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart { field: &'static str, file: FileUpload },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub bearer: Option<String>,
    pub request_id: String,
}

impl ApiRequest {
    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Wire seam: production uses reqwest, tests substitute a recording fake
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = builder.header("X-Request-Id", request.request_id.as_str());

        builder = match request.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Multipart { field, file }) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|e| ApiError::Transport(format!("Failed to create multipart: {}", e)))?;
                builder.multipart(Form::new().part(field, part))
            }
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{} {} failed: {}", request.method, url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response body: {}", e)))?;

        Ok(ApiResponse { status, body })
    }
}

/// Cheap to clone; every service holds its own copy
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, token: Option<String>) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.api_base_url, config.timeout_seconds)?;
        Ok(Self::with_transport(Arc::new(transport), token))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, token: Option<String>) -> Self {
        Self { transport, token }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub async fn get<R>(&self, path: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.execute(Method::Get, path, Vec::new(), None).await?;
        decode_body(&response)
    }

    pub async fn get_list<R>(&self, path: &str, query: &ListQuery) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self
            .execute(Method::Get, path, query.to_pairs(), None)
            .await?;
        decode_body(&response)
    }

    pub async fn post<B, R>(&self, path: &str, payload: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = RequestBody::Json(to_json(payload)?);
        let response = self.execute(Method::Post, path, Vec::new(), Some(body)).await?;
        decode_body(&response)
    }

    pub async fn put<B, R>(&self, path: &str, payload: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = RequestBody::Json(to_json(payload)?);
        let response = self.execute(Method::Put, path, Vec::new(), Some(body)).await?;
        decode_body(&response)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::Delete, path, Vec::new(), None).await?;
        Ok(())
    }

    /// POST a single `file` field as multipart/form-data
    pub async fn upload<R>(&self, path: &str, file: FileUpload) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let body = RequestBody::Multipart {
            field: "file",
            file,
        };
        let response = self.execute(Method::Post, path, Vec::new(), Some(body)).await?;
        decode_body(&response)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<RequestBody>,
    ) -> Result<ApiResponse> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            query,
            body,
            bearer: self.token.clone(),
            request_id: uuid::Uuid::new_v4().to_string(),
        };

        info!("{} {} (request {})", method, path, request.request_id);

        let response = self.transport.send(request).await.map_err(|e| {
            error!("{} {} failed: {}", method, path, e);
            e
        })?;

        trace!("{} {} -> {}", method, path, response.status);

        if response.is_success() {
            return Ok(response);
        }

        let message = extract_message(&response.body);
        error!(
            "{} {} returned {}: {}",
            method,
            path,
            response.status,
            message.as_deref().unwrap_or("<no message>")
        );

        Err(match response.status {
            401 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message.unwrap_or_else(|| format!("{} not found", path))),
            status => ApiError::Server { status, message },
        })
    }
}

fn to_json<B: Serialize + ?Sized>(payload: &B) -> Result<serde_json::Value> {
    serde_json::to_value(payload).map_err(|e| ApiError::Decode(format!("Failed to encode payload: {}", e)))
}

fn decode_body<R: DeserializeOwned>(response: &ApiResponse) -> Result<R> {
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };

    serde_json::from_str(body).map_err(|e| {
        ApiError::Decode(format!("{} (status {})", e, response.status))
    })
}

/// Human message from an error body: `detail`, `message` or `error`.
/// FastAPI-style `detail` arrays are joined by their `msg` entries.
pub fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    for key in ["detail", "message", "error"] {
        match value.get(key) {
            Some(serde_json::Value::String(text)) if !text.trim().is_empty() => {
                return Some(text.clone());
            }
            Some(serde_json::Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join("; "));
                }
            }
            _ => {}
        }
    }

    None
}

/// Everything but unreserved URL characters gets escaped
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode one path segment (ids, slugs)
pub fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::MockTransport;

    #[derive(Debug, serde::Deserialize)]
    struct Ping {
        ok: bool,
    }

    #[tokio::test]
    async fn test_bearer_token_is_injected() {
        let transport = MockTransport::new().respond(200, r#"{"ok": true}"#);
        let client = ApiClient::with_transport(transport.clone(), Some("tok-1".into()));

        let ping: Ping = client.get("/health").await.unwrap();
        assert!(ping.ok);

        let request = transport.only_request();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.bearer.as_deref(), Some("tok-1"));
        assert!(!request.request_id.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_client_sends_no_token() {
        let transport = MockTransport::new().respond(200, r#"{"ok": true}"#);
        let client = ApiClient::with_transport(transport.clone(), None);
        let _: Ping = client.get("/health").await.unwrap();
        assert!(transport.only_request().bearer.is_none());
    }

    #[tokio::test]
    async fn test_server_message_is_kept() {
        let transport =
            MockTransport::new().respond(400, r#"{"detail": "Application deadline has passed"}"#);
        let client = ApiClient::with_transport(transport, None);

        let err = client.get::<Ping>("/careers/jobs/x").await.unwrap_err();
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message.as_deref(), Some("Application deadline has passed"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let transport = MockTransport::new()
            .respond(401, r#"{"detail": "Not authenticated"}"#)
            .respond(404, "")
            .respond(500, "<html>oops</html>")
            .respond(401, "");
        let client = ApiClient::with_transport(transport, None);

        assert!(matches!(
            client.get::<Ping>("/a").await,
            Err(ApiError::Unauthorized(Some(message))) if message == "Not authenticated"
        ));
        assert!(matches!(
            client.get::<Ping>("/b").await,
            Err(ApiError::NotFound(message)) if message == "/b not found"
        ));
        assert!(matches!(
            client.get::<Ping>("/c").await,
            Err(ApiError::Server { status: 500, message: None })
        ));
        assert!(matches!(
            client.get::<Ping>("/d").await,
            Err(ApiError::Unauthorized(None))
        ));
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let transport = MockTransport::new().respond(204, "");
        let client = ApiClient::with_transport(transport.clone(), None);
        client.delete("/admin/users/u1").await.unwrap();
        assert_eq!(transport.only_request().method, Method::Delete);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = MockTransport::new();
        let client = ApiClient::with_transport(transport, None);
        assert!(matches!(
            client.get::<Ping>("/x").await,
            Err(ApiError::Transport(_))
        ));
    }

    #[test]
    fn test_extract_message_shapes() {
        assert_eq!(
            extract_message(r#"{"message": "Email taken"}"#).as_deref(),
            Some("Email taken")
        );
        assert_eq!(
            extract_message(r#"{"detail": [{"msg": "field required"}, {"msg": "too short"}]}"#)
                .as_deref(),
            Some("field required; too short")
        );
        assert_eq!(extract_message("not json"), None);
        assert_eq!(extract_message(r#"{"detail": ""}"#), None);
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("abc123"), "abc123");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
        assert_eq!(segment("we-are_hiring.v2~"), "we-are_hiring.v2~");
        assert_eq!(segment("café?"), "caf%C3%A9%3F");
    }

    #[test]
    fn test_content_type_detection() {
        assert_eq!(FileUpload::new("CV.PDF", vec![]).content_type, "application/pdf");
        assert_eq!(FileUpload::new("photo.jpeg", vec![]).content_type, "image/jpeg");
        assert_eq!(FileUpload::new("cv.docx", vec![]).extension().as_deref(), Some("docx"));
    }
}
