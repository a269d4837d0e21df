//! Response formatting for CRUD handlers
//!
//! Successful handlers produce a [`Reply`]. Data replies go through
//! [`respond`], which always finalizes the response: `200 OK`, with a JSON
//! body when the data is present and truthy, and no body otherwise.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// Plain-text body written for 404 responses
pub const NOT_FOUND_TEXT: &str = "Not found";

/// Successful handler outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `200 OK`, serialized through [`respond`]
    Data(Option<Value>),
    /// Fixed status with a plain-text body
    Text(StatusCode, String),
}

impl Reply {
    /// `200 OK` with a JSON body
    pub fn json(value: Value) -> Self {
        Self::Data(Some(value))
    }

    /// `200 OK` with no body
    pub fn empty() -> Self {
        Self::Data(None)
    }

    /// `404` with the plain-text `Not found` body
    pub fn not_found() -> Self {
        Self::Text(StatusCode::NOT_FOUND, NOT_FOUND_TEXT.to_string())
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Self::Data(data) => respond(data),
            Self::Text(status, text) => plain_text(status, text),
        }
    }
}

/// Whether a value counts as "no data" for the response body
///
/// `null`, `false`, `0` and `""` are falsy. Empty arrays and objects are
/// still written out.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Write `data` as a `200 OK` response
pub fn respond(data: Option<Value>) -> Response {
    match data {
        Some(value) if !is_falsy(&value) => (StatusCode::OK, Json(value)).into_response(),
        _ => StatusCode::OK.into_response(),
    }
}

/// Write a plain-text response with the given status
pub fn plain_text(status: StatusCode, text: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text.into(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    async fn body_of(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_is_falsy() {
        assert!(is_falsy(&Value::Null));
        assert!(is_falsy(&json!(false)));
        assert!(is_falsy(&json!(0)));
        assert!(is_falsy(&json!(0.0)));
        assert!(is_falsy(&json!("")));
        assert!(!is_falsy(&json!([])));
        assert!(!is_falsy(&json!({})));
        assert!(!is_falsy(&json!("x")));
        assert!(!is_falsy(&json!(1)));
    }

    #[tokio::test]
    async fn test_respond_with_data_writes_json() {
        let response = respond(Some(json!([{"id": "1"}])));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: Value = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body, json!([{"id": "1"}]));
    }

    #[tokio::test]
    async fn test_respond_empty_collection_is_still_written() {
        let response = respond(Some(json!([])));
        assert_eq!(body_of(response).await, b"[]");
    }

    #[tokio::test]
    async fn test_respond_without_data_has_no_body() {
        for data in [None, Some(Value::Null), Some(json!(""))] {
            let response = respond(data);
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get(header::CONTENT_TYPE).is_none());
            assert!(body_of(response).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_not_found_reply_is_plain_text() {
        let response = Reply::not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_of(response).await, NOT_FOUND_TEXT.as_bytes());
    }
}
