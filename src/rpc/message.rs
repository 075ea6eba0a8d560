use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

/// Reserved JSON-RPC error codes.
/// https://www.jsonrpc.org/specification#error_object
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const SERVER_ERROR_START: i32 = -32099;
    pub const SERVER_ERROR_END: i32 = -32000;
    pub const SERVER_NOT_INITIALIZED: i32 = -32002;
    pub const UNKNOWN_ERROR_CODE: i32 = -32001;
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported jsonrpc version: {0:?}")]
    Version(String),

    #[error("message has neither method nor id")]
    Shape,
}

/// Request/response correlation id. Echoed back verbatim in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestMessage {
    pub id: Id,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMessage {
    pub jsonrpc: &'static str,
    pub id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl ResponseMessage {
    pub fn success(id: Id, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Id, code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(ResponseError {
                code,
                message: message.into(),
                data,
            }),
        }
    }
}

/// One decoded protocol message, discriminated by field presence:
/// `method` with `id` is a request, `method` without `id` a notification,
/// `id` without `method` a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request(RequestMessage),
    Notification(NotificationMessage),
    Response {
        id: Id,
        result: Option<Value>,
        error: Option<ResponseError>,
    },
}

/// Raw shape used for strict classification.
#[derive(Deserialize)]
struct RawMessage {
    jsonrpc: String,
    #[serde(default)]
    id: Option<Id>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ResponseError>,
}

impl Message {
    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        let raw: RawMessage = serde_json::from_slice(body)?;
        if raw.jsonrpc != JSONRPC_VERSION {
            return Err(DecodeError::Version(raw.jsonrpc));
        }
        match (raw.method, raw.id) {
            (Some(method), Some(id)) => Ok(Message::Request(RequestMessage {
                id,
                method,
                params: raw.params,
            })),
            (Some(method), None) => Ok(Message::Notification(NotificationMessage {
                method,
                params: raw.params,
            })),
            (None, Some(id)) => Ok(Message::Response {
                id,
                result: raw.result,
                error: raw.error,
            }),
            (None, None) => Err(DecodeError::Shape),
        }
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            Message::Request(r) => Some(&r.method),
            Message::Notification(n) => Some(&n.method),
            Message::Response { .. } => None,
        }
    }

    pub fn params(&self) -> Option<&Value> {
        match self {
            Message::Request(r) => r.params.as_ref(),
            Message::Notification(n) => n.params.as_ref(),
            Message::Response { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_request_by_method_and_id() {
        let body = br#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#;
        let message = Message::from_slice(body).unwrap();
        let Message::Request(request) = message else {
            panic!("expected a request");
        };
        assert_eq!(request.id, Id::Number(1));
        assert_eq!(request.method, "initialize");
        assert_eq!(request.params, Some(json!({})));
    }

    #[test]
    fn classifies_notification_by_method_without_id() {
        let body = br#"{"jsonrpc":"2.0","method":"textDocument/didOpen","params":{"x":1}}"#;
        let message = Message::from_slice(body).unwrap();
        assert!(matches!(message, Message::Notification(_)));
    }

    #[test]
    fn classifies_response_by_id_without_method() {
        let body = br#"{"jsonrpc":"2.0","id":"abc","result":null}"#;
        let message = Message::from_slice(body).unwrap();
        let Message::Response { id, .. } = message else {
            panic!("expected a response");
        };
        assert_eq!(id, Id::String("abc".to_string()));
    }

    #[test]
    fn string_id_round_trips_verbatim() {
        let response = ResponseMessage::success(Id::String("req-9".into()), json!({"ok": true}));
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded["id"], json!("req-9"));
        assert_eq!(encoded["jsonrpc"], json!("2.0"));
    }

    #[test]
    fn rejects_message_without_method_or_id() {
        let body = br#"{"jsonrpc":"2.0","params":{}}"#;
        assert!(matches!(
            Message::from_slice(body),
            Err(DecodeError::Shape)
        ));
    }

    #[test]
    fn rejects_wrong_jsonrpc_version() {
        let body = br#"{"jsonrpc":"1.0","id":1,"method":"initialize"}"#;
        assert!(matches!(
            Message::from_slice(body),
            Err(DecodeError::Version(_))
        ));
    }

    #[test]
    fn error_response_skips_result_field() {
        let response = ResponseMessage::failure(
            Id::Number(4),
            error_codes::METHOD_NOT_FOUND,
            "unknown method: foo/bar",
            None,
        );
        let encoded = serde_json::to_value(&response).unwrap();
        assert!(encoded.get("result").is_none());
        assert_eq!(encoded["error"]["code"], json!(-32601));
    }
}
