//! Request model handed to CRUD handlers
//!
//! [`ResourceRequest`] is the transport-neutral view of an inbound request:
//! named path parameters, query parameters and the parsed body. Body parsing
//! accepts JSON (non-strict: any JSON value, not only objects and arrays) and
//! `application/x-www-form-urlencoded`. Other content types leave the body
//! absent.

use std::collections::HashMap;

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, Request},
    http::{header, HeaderMap},
    RequestPartsExt,
};
use serde_json::{Map, Value};

use crate::handler::{HandlerError, Operation};

/// Name of the path parameter carrying the record id
pub const ID_PARAM: &str = "id";

/// Parsed request passed to [`ResourceHandler`](crate::handler::ResourceHandler) methods
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRequest {
    /// Named path parameters, e.g. `id`
    pub path_params: HashMap<String, String>,
    /// Query string parameters; repeated keys keep the last value
    pub query_params: HashMap<String, String>,
    /// Parsed payload, absent when the request carried none
    pub body: Option<Value>,
}

impl ResourceRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path parameter
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The `id` path parameter, if the route captured one
    pub fn id(&self) -> Option<&str> {
        self.path_params.get(ID_PARAM).map(String::as_str)
    }

    /// The `id` path parameter, or a serialization failure for `operation`
    pub fn require_id(&self, operation: Operation) -> Result<&str, HandlerError> {
        self.id().ok_or_else(|| {
            HandlerError::serialization(operation, "Missing `id` path parameter")
        })
    }

    /// Parse an axum request into a [`ResourceRequest`]
    ///
    /// Bodies larger than `body_limit` bytes, malformed query strings and
    /// malformed payloads fail with [`ErrorKind::SerializationFailure`](crate::handler::ErrorKind::SerializationFailure).
    pub async fn from_http(
        request: Request,
        operation: Operation,
        body_limit: usize,
    ) -> Result<Self, HandlerError> {
        let (mut parts, body) = request.into_parts();

        // Routes without captures have no path parameters to extract.
        let path_params = match parts.extract::<Path<HashMap<String, String>>>().await {
            Ok(Path(params)) => params,
            Err(_) => HashMap::new(),
        };

        let Query(query_params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| HandlerError::serialization(operation, e.body_text()))?;

        let body = read_body(&parts.headers, body, operation, body_limit).await?;

        Ok(Self {
            path_params,
            query_params,
            body,
        })
    }
}

async fn read_body(
    headers: &HeaderMap,
    body: Body,
    operation: Operation,
    body_limit: usize,
) -> Result<Option<Value>, HandlerError> {
    let bytes = to_bytes(body, body_limit)
        .await
        .map_err(|e| HandlerError::serialization(operation, format!("Failed to read body: {e}")))?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    parse_body(content_type, &bytes, operation)
}

/// Parse raw body bytes according to their content type
pub(crate) fn parse_body(
    content_type: &str,
    bytes: &[u8],
    operation: Operation,
) -> Result<Option<Value>, HandlerError> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == "application/json" || essence.ends_with("+json") {
        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| HandlerError::serialization(operation, format!("Invalid JSON body: {e}")))
    } else if essence == "application/x-www-form-urlencoded" {
        let fields: Map<String, Value> = url::form_urlencoded::parse(bytes)
            .into_owned()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Ok(Some(Value::Object(fields)))
    } else {
        tracing::debug!(content_type = %content_type, "Ignoring body with unsupported content type");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_parse_json_object() {
        let body = parse_body("application/json", br#"{"a":1}"#, Operation::Insert).unwrap();
        assert_eq!(body, Some(json!({"a": 1})));
    }

    #[test]
    fn test_parse_json_is_non_strict() {
        let body = parse_body("application/json; charset=utf-8", b"\"bare\"", Operation::Insert)
            .unwrap();
        assert_eq!(body, Some(json!("bare")));

        let body = parse_body("application/vnd.api+json", b"42", Operation::Insert).unwrap();
        assert_eq!(body, Some(json!(42)));
    }

    #[test]
    fn test_parse_malformed_json_is_serialization_failure() {
        let err = parse_body("application/json", b"{oops", Operation::Update).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SerializationFailure);
        assert_eq!(err.operation, Operation::Update);
    }

    #[test]
    fn test_parse_form_body() {
        let body = parse_body(
            "application/x-www-form-urlencoded",
            b"name=Ada+Lovelace&lang=en",
            Operation::Insert,
        )
        .unwrap();
        assert_eq!(body, Some(json!({"name": "Ada Lovelace", "lang": "en"})));
    }

    #[test]
    fn test_empty_or_unknown_body_is_absent() {
        assert_eq!(parse_body("application/json", b"", Operation::Insert).unwrap(), None);
        assert_eq!(parse_body("text/plain", b"hello", Operation::Insert).unwrap(), None);
        assert_eq!(parse_body("", b"{}", Operation::Insert).unwrap(), None);
    }

    #[test]
    fn test_require_id() {
        let req = ResourceRequest::new().with_path_param("id", "abc");
        assert_eq!(req.require_id(Operation::Delete).unwrap(), "abc");

        let err = ResourceRequest::new().require_id(Operation::Delete).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SerializationFailure);
    }

    #[tokio::test]
    async fn test_from_http_reads_query_and_body() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/?color=red&size=L")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"x":true}"#))
            .unwrap();

        let parsed = ResourceRequest::from_http(request, Operation::Insert, 1024)
            .await
            .unwrap();
        assert!(parsed.path_params.is_empty());
        assert_eq!(parsed.query_params.get("color").map(String::as_str), Some("red"));
        assert_eq!(parsed.query_params.get("size").map(String::as_str), Some("L"));
        assert_eq!(parsed.body, Some(json!({"x": true})));
    }

    #[tokio::test]
    async fn test_from_http_rejects_oversized_body() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(vec![b' '; 64]))
            .unwrap();

        let err = ResourceRequest::from_http(request, Operation::Insert, 8)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SerializationFailure);
    }
}
