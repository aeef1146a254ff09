//! JSON-RPC message transport
//!
//! Message framing with `Content-Length` headers over any async reader and
//! writer pair, plus the JSON-RPC 2.0 message types. The binary runs it over
//! stdio; tests drive it over in-memory buffers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::types::{LspError, LspResult};

/// JSON-RPC request message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID
    pub id: Value,
    /// Method name
    pub method: String,
    /// Request parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request
    pub fn new(id: Value, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID
    pub id: Value,
    /// Response result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Response error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a new JSON-RPC error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Parse error (-32700)
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(-32700, message)
    }

    /// Invalid request (-32600)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(-32600, message)
    }

    /// Method not found (-32601)
    pub fn method_not_found(method: &str) -> Self {
        Self::new(-32601, format!("Method not found: {}", method))
    }

    /// Invalid params (-32602)
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(-32602, message)
    }

    /// Internal error (-32603)
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(-32603, message)
    }
}

impl From<LspError> for JsonRpcError {
    fn from(err: LspError) -> Self {
        match err {
            LspError::ParseError(msg) => JsonRpcError::parse_error(msg),
            LspError::InvalidRequest(msg) => JsonRpcError::invalid_request(msg),
            LspError::MethodNotFound(method) => JsonRpcError::method_not_found(&method),
            LspError::InvalidParams(msg) => JsonRpcError::invalid_params(msg),
            other => JsonRpcError::internal_error(other.to_string()),
        }
    }
}

/// JSON-RPC notification message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Method name
    pub method: String,
    /// Notification parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    /// Create a new JSON-RPC notification
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
        }
    }
}

/// LSP message (can be request, response, or notification)
#[derive(Debug, Clone)]
pub enum LspMessage {
    /// Request message
    Request(JsonRpcRequest),
    /// Response message
    Response(JsonRpcResponse),
    /// Notification message
    Notification(JsonRpcNotification),
}

impl LspMessage {
    /// Parse a message from JSON
    pub fn from_json(json: &str) -> LspResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| LspError::ParseError(format!("Failed to parse JSON: {}", e)))?;

        // Responses carry a result or an error
        if value.get("result").is_some() || value.get("error").is_some() {
            let response: JsonRpcResponse = serde_json::from_value(value)
                .map_err(|e| LspError::ParseError(format!("Failed to parse response: {}", e)))?;
            Ok(LspMessage::Response(response))
        } else if value.get("id").is_some() && value.get("method").is_some() {
            let request: JsonRpcRequest = serde_json::from_value(value)
                .map_err(|e| LspError::ParseError(format!("Failed to parse request: {}", e)))?;
            Ok(LspMessage::Request(request))
        } else if value.get("method").is_some() {
            let notification: JsonRpcNotification = serde_json::from_value(value)
                .map_err(|e| LspError::ParseError(format!("Failed to parse notification: {}", e)))?;
            Ok(LspMessage::Notification(notification))
        } else {
            Err(LspError::InvalidRequest(
                "Message must be a request, response, or notification".to_string(),
            ))
        }
    }

    /// Serialize message to JSON
    pub fn to_json(&self) -> LspResult<String> {
        let result = match self {
            LspMessage::Request(req) => serde_json::to_string(req),
            LspMessage::Response(resp) => serde_json::to_string(resp),
            LspMessage::Notification(notif) => serde_json::to_string(notif),
        };
        result.map_err(|e| LspError::SerializationError(format!("Failed to serialize message: {}", e)))
    }
}

/// Largest message body accepted
pub const MAX_CONTENT_LENGTH: usize = 64 * 1024 * 1024;

/// `Content-Length` framed transport over an async reader and writer
pub struct MessageTransport<R, W> {
    reader: R,
    writer: W,
}

/// Transport over the process's stdin and stdout
pub type StdioTransport = MessageTransport<BufReader<Stdin>, Stdout>;

impl StdioTransport {
    /// Create a transport over stdio
    pub fn stdio() -> Self {
        MessageTransport::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> MessageTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a transport over the given reader and writer
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read the next message; `None` once the input is closed
    pub async fn read_message(&mut self) -> LspResult<Option<LspMessage>> {
        let mut content_length: Option<usize> = None;
        let mut saw_header = false;

        loop {
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .await
                .map_err(|e| LspError::IoError(format!("Failed to read header: {}", e)))?;
            if read == 0 {
                return Ok(None);
            }

            let line = line.trim();
            if line.is_empty() {
                // blank lines between frames are tolerated
                if saw_header {
                    break;
                }
                continue;
            }
            saw_header = true;

            if let Some((key, value)) = line.split_once(':') {
                if key.trim().eq_ignore_ascii_case("Content-Length") {
                    let length = value
                        .trim()
                        .parse()
                        .map_err(|e| LspError::InvalidRequest(format!("Invalid Content-Length: {}", e)))?;
                    content_length = Some(length);
                }
            }
        }

        let content_length = content_length
            .ok_or_else(|| LspError::InvalidRequest("Missing Content-Length header".to_string()))?;

        if content_length > MAX_CONTENT_LENGTH {
            return Err(LspError::InvalidRequest(format!(
                "Content-Length {} exceeds limit of {} bytes",
                content_length, MAX_CONTENT_LENGTH
            )));
        }

        // grows with the bytes actually received, not with the header's claim
        let mut content = Vec::new();
        (&mut self.reader)
            .take(content_length as u64)
            .read_to_end(&mut content)
            .await
            .map_err(|e| LspError::IoError(format!("Failed to read content: {}", e)))?;
        if content.len() < content_length {
            return Err(LspError::IoError(format!(
                "Input closed after {} of {} content bytes",
                content.len(),
                content_length
            )));
        }

        let json = String::from_utf8(content)
            .map_err(|e| LspError::ParseError(format!("Invalid UTF-8: {}", e)))?;

        LspMessage::from_json(&json).map(Some)
    }

    /// Write one framed message and flush
    pub async fn write_message(&mut self, message: &LspMessage) -> LspResult<()> {
        let json = message.to_json()?;

        self.writer
            .write_all(format!("Content-Length: {}\r\n\r\n{}", json.len(), json).as_bytes())
            .await
            .map_err(|e| LspError::IoError(format!("Failed to write message: {}", e)))?;

        self.writer
            .flush()
            .await
            .map_err(|e| LspError::IoError(format!("Failed to flush output: {}", e)))?;

        Ok(())
    }

    /// Give back the reader and writer
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// Frame a JSON payload the way [`MessageTransport::write_message`] does
pub fn frame(json: &str) -> String {
    format!("Content-Length: {}\r\n\r\n{}", json.len(), json)
}
