//! JSON-RPC 2.0 Protocol Implementation for LSP
//!
//! Only the message types needed to start a server, sync a document and ask
//! for its document symbols.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// JSON-RPC 2.0 Core Types
// ============================================================================

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: RequestId::Number(id),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: RequestId, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: None,
            error: Some(ResponseError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Value, ResponseError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// JSON-RPC 2.0 Notification (no id, no response expected)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Notification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Request ID - can be number or string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    String(String),
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        RequestId::Number(id)
    }
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ResponseError {}

/// Standard JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;

    // LSP-specific error codes
    pub const SERVER_NOT_INITIALIZED: i32 = -32002;
    pub const REQUEST_CANCELLED: i32 = -32800;
    pub const CONTENT_MODIFIED: i32 = -32801;

    // Client-side: server process went away with requests in flight
    pub const SERVER_TERMINATED: i32 = -32099;
}

/// Incoming message from LSP server
#[derive(Debug, Clone)]
pub enum Message {
    Response(Response),
    Request(Request),
    Notification(Notification),
}

impl Message {
    /// Parse a JSON string into a Message
    ///
    /// Payloads (`params`, `result`) may nest arbitrarily deep. They are moved
    /// out of the envelope as-is rather than decoded a second time.
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        let mut value: Value = crate::infra::json::from_str_unbounded(json)?;
        let has_id = value.get("id").is_some();
        let has_method = value.get("method").is_some();

        let params = value.get_mut("params").map(Value::take);
        let result = value.get_mut("result").map(Value::take);

        match (has_id, has_method) {
            (true, true) => {
                let mut request: Request = serde_json::from_value(value)?;
                request.params = params;
                Ok(Message::Request(request))
            }
            (true, false) => {
                let mut response: Response = serde_json::from_value(value)?;
                response.result = result;
                Ok(Message::Response(response))
            }
            (false, true) => {
                let mut notification: Notification = serde_json::from_value(value)?;
                notification.params = params;
                Ok(Message::Notification(notification))
            }
            (false, false) => {
                use serde::de::Error;
                Err(serde_json::Error::custom("Invalid LSP message"))
            }
        }
    }

    /// Best-effort id of a message body that failed to parse as a [`Message`]
    pub fn salvage_id(json: &str) -> Option<RequestId> {
        let value: Value = crate::infra::json::from_str_unbounded(json).ok()?;
        serde_json::from_value(value.get("id")?.clone()).ok()
    }
}

// ============================================================================
// LSP Lifecycle Types
// ============================================================================

/// Text document identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

impl TextDocumentIdentifier {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Params of `textDocument/documentSymbol`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSymbolParams {
    pub text_document: TextDocumentIdentifier,
}

impl DocumentSymbolParams {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            text_document: TextDocumentIdentifier::new(uri),
        }
    }
}

/// Client info for identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Initialize params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub process_id: Option<u32>,
    pub root_uri: Option<String>,
    pub capabilities: ClientCapabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
}

/// Client capabilities
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_document: Option<TextDocumentClientCapabilities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<WorkspaceClientCapabilities>,
}

impl ClientCapabilities {
    /// Capabilities of a read-only client interested in hierarchical outlines
    pub fn outline_only() -> Self {
        Self {
            text_document: Some(TextDocumentClientCapabilities {
                synchronization: Some(serde_json::json!({
                    "dynamicRegistration": false,
                    "didSave": false
                })),
                document_symbol: Some(serde_json::json!({
                    "dynamicRegistration": false,
                    "hierarchicalDocumentSymbolSupport": true,
                    "symbolKind": { "valueSet": (1..=26).collect::<Vec<u32>>() }
                })),
            }),
            workspace: Some(WorkspaceClientCapabilities {
                configuration: Some(true),
                workspace_folders: Some(false),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentClientCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synchronization: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_symbol: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceClientCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_folders: Option<bool>,
}

/// Server capabilities (from initialize response)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_document_sync: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_symbol_provider: Option<Value>,
}

impl ServerCapabilities {
    /// `documentSymbolProvider` may be `true` or an options object
    pub fn supports_document_symbols(&self) -> bool {
        match &self.document_symbol_provider {
            Some(Value::Bool(enabled)) => *enabled,
            Some(Value::Object(_)) => true,
            _ => false,
        }
    }
}

/// Initialize result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub capabilities: ServerCapabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_info: Option<ServerInfo>,
}

/// Server info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let params = serde_json::to_value(DocumentSymbolParams::new("file:///a.rs")).unwrap();
        let req = Request::new(1, "textDocument/documentSymbol", Some(params));
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"textDocument\":{\"uri\":\"file:///a.rs\"}"));
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"jsonrpc":"2.0","id":1,"result":[{"name":"main","kind":12}]}"#;
        let resp: Response = serde_json::from_str(json).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.id, Some(RequestId::Number(1)));
        assert!(resp.into_result().unwrap().is_array());
    }

    #[test]
    fn test_null_result_is_success() {
        let json = r#"{"jsonrpc":"2.0","id":2,"result":null}"#;
        let resp: Response = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn test_error_response() {
        let json =
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#;
        let resp: Response = serde_json::from_str(json).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.into_result().unwrap_err().code, error_codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_message_classification() {
        let request = Message::parse(r#"{"jsonrpc":"2.0","id":3,"method":"workspace/configuration"}"#);
        assert!(matches!(request, Ok(Message::Request(_))));

        let notification =
            Message::parse(r#"{"jsonrpc":"2.0","method":"window/logMessage","params":{}}"#);
        assert!(matches!(notification, Ok(Message::Notification(_))));

        assert!(Message::parse(r#"{"jsonrpc":"2.0"}"#).is_err());
    }

    #[test]
    fn test_document_symbol_provider_shapes() {
        let caps: ServerCapabilities =
            serde_json::from_value(serde_json::json!({"documentSymbolProvider": true})).unwrap();
        assert!(caps.supports_document_symbols());

        let caps: ServerCapabilities = serde_json::from_value(
            serde_json::json!({"documentSymbolProvider": {"label": "ra"}}),
        )
        .unwrap();
        assert!(caps.supports_document_symbols());

        assert!(!ServerCapabilities::default().supports_document_symbols());
    }

    fn nested_symbols(depth: usize) -> String {
        let mut json = r#"{"name": "leaf", "kind": 12}"#.to_string();
        for _ in 0..depth {
            json = format!(r#"{{"result": {json}}}"#);
        }
        json
    }

    #[test]
    fn test_parse_deeply_nested_result() {
        let body = format!(r#"{{"jsonrpc":"2.0","id":7,"result":[{}]}}"#, nested_symbols(300));
        let Ok(Message::Response(response)) = Message::parse(&body) else {
            panic!("expected response");
        };
        assert_eq!(response.id, Some(RequestId::Number(7)));
        assert!(response.into_result().unwrap().is_array());
    }

    #[test]
    fn test_null_result_survives_parse() {
        let Ok(Message::Response(response)) =
            Message::parse(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
        else {
            panic!("expected response");
        };
        assert!(response.is_success());
        assert_eq!(response.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn test_salvage_id() {
        let body = r#"{"jsonrpc":"2.0","id":4,"error":"not an object"}"#;
        assert!(Message::parse(body).is_err());
        assert_eq!(Message::salvage_id(body), Some(RequestId::Number(4)));
        assert_eq!(Message::salvage_id("{not json"), None);
    }
}
