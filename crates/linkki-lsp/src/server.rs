//! LSP Server implementation
//!
//! This module implements the server lifecycle, request routing and the
//! handlers that translate protocol parameters into engine calls. The server
//! owns the document store and configuration; every engine is built per
//! request over an [`AnalysisContext`] borrowing them.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, error, info, warn};

use crate::code_actions::{CodeActionsEngine, APPLY_SNIPPET_COMMAND};
use crate::completion::CompletionEngine;
use crate::config::{ConfigLoader, ServerConfig};
use crate::definition::DefinitionResolver;
use crate::diagnostics::{Compiler, DiagnosticsEngine, JavacCompiler};
use crate::formatting::FormattingEngine;
use crate::store::DocumentStore;
use crate::symbols::SymbolsBuilder;
use crate::transport::{JsonRpcError, JsonRpcNotification, JsonRpcResponse, LspMessage, MessageTransport};
use crate::types::{Diagnostic, LspError, LspResult, Position, Range, ServerState};
use crate::AnalysisContext;

/// Notification relaying a snippet insertion to the client
pub const APPLY_SNIPPET_NOTIFICATION: &str = "linkki/applySnippet";

/// Server capabilities
#[derive(Debug, Clone)]
pub struct ServerCapabilities {
    /// Text document sync kind (1 = full)
    pub text_document_sync: u32,
    /// Whether saved text is sent along with `didSave`
    pub save_include_text: bool,
    /// Definition capability
    pub definition_provider: bool,
    /// Completion capability
    pub completion_provider: bool,
    /// Code action capability
    pub code_action_provider: bool,
    /// Formatting capability
    pub document_formatting_provider: bool,
    /// Outline capability
    pub document_symbol_provider: bool,
    /// Commands handled by `workspace/executeCommand`
    pub commands: Vec<String>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            text_document_sync: 1,
            save_include_text: true,
            definition_provider: true,
            completion_provider: true,
            code_action_provider: true,
            document_formatting_provider: true,
            document_symbol_provider: true,
            commands: vec![APPLY_SNIPPET_COMMAND.to_string()],
        }
    }
}

impl ServerCapabilities {
    /// Convert to JSON
    pub fn to_json(&self) -> Value {
        let mut capabilities = json!({
            "textDocumentSync": {
                "openClose": true,
                "change": self.text_document_sync,
                "save": { "includeText": self.save_include_text },
            },
            "definitionProvider": self.definition_provider,
            "codeActionProvider": self.code_action_provider,
            "documentFormattingProvider": self.document_formatting_provider,
            "documentSymbolProvider": self.document_symbol_provider,
            "executeCommandProvider": { "commands": self.commands },
        });
        if self.completion_provider {
            capabilities["completionProvider"] = json!({ "resolveProvider": false });
        }
        capabilities
    }
}

/// LSP Server
pub struct LspServer {
    /// Server state
    state: ServerState,
    /// Whether `shutdown` was requested before `exit`
    shutdown_requested: bool,
    capabilities: ServerCapabilities,
    config: ServerConfig,
    /// Open documents (URI -> content)
    store: DocumentStore,
    compiler: Box<dyn Compiler>,
    /// Server-initiated notifications waiting to be written
    outbox: Vec<JsonRpcNotification>,
}

impl LspServer {
    /// Create a server with an explicit compile capability
    pub fn new(config: ServerConfig, compiler: Box<dyn Compiler>) -> Self {
        Self {
            state: ServerState::Initializing,
            shutdown_requested: false,
            capabilities: ServerCapabilities::default(),
            config,
            store: DocumentStore::new(),
            compiler,
            outbox: Vec::new(),
        }
    }

    /// Create a server compiling with `javac` as configured
    pub fn with_javac(config: ServerConfig) -> Self {
        let compiler = JavacCompiler::new(config.compiler.clone());
        Self::new(config, Box::new(compiler))
    }

    /// Get the current server state
    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Get server capabilities
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    /// Active configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open documents
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Process exit code: 0 after an orderly shutdown, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.shutdown_requested {
            0
        } else {
            1
        }
    }

    /// Drain the notifications queued by handlers
    pub fn take_notifications(&mut self) -> Vec<JsonRpcNotification> {
        std::mem::take(&mut self.outbox)
    }

    fn context(&self) -> AnalysisContext<'_> {
        AnalysisContext::new(&self.store, &self.config)
    }

    fn ensure_initialized(&self) -> LspResult<()> {
        if self.state != ServerState::Initialized {
            return Err(LspError::InvalidRequest("Server is not initialized".to_string()));
        }
        Ok(())
    }

    /// Handle initialize request
    pub async fn handle_initialize(&mut self, params: Value) -> LspResult<Value> {
        if self.state != ServerState::Initializing {
            return Err(LspError::InvalidRequest(
                "Server is not in initializing state".to_string(),
            ));
        }

        info!("Initializing LSP server");

        match params.get("initializationOptions") {
            Some(options) if options.is_object() => match ConfigLoader::overlay(&self.config, options) {
                Ok(config) => {
                    debug!("Applied client initialization options");
                    self.compiler.reconfigure(&config.compiler);
                    self.config = config;
                }
                Err(e) => warn!("Ignoring invalid initialization options: {}", e),
            },
            Some(Value::Null) | None => {}
            Some(other) => warn!("Ignoring non-object initialization options: {}", other),
        }

        info!("LSP server initialization complete");
        Ok(json!({
            "capabilities": self.capabilities.to_json(),
            "serverInfo": {
                "name": "linkki-lsp",
                "version": env!("CARGO_PKG_VERSION")
            }
        }))
    }

    /// Handle initialized notification
    pub async fn handle_initialized(&mut self) -> LspResult<()> {
        if self.state != ServerState::Initializing {
            return Err(LspError::InvalidRequest(
                "Server is not in initializing state".to_string(),
            ));
        }

        self.state = ServerState::Initialized;
        info!("Server state changed to Initialized");
        Ok(())
    }

    /// Handle shutdown request
    pub async fn handle_shutdown(&mut self) -> LspResult<Value> {
        self.ensure_initialized()?;

        info!("Shutdown request received");
        self.state = ServerState::ShuttingDown;
        self.shutdown_requested = true;
        info!("Server state changed to ShuttingDown");
        Ok(Value::Null)
    }

    /// Handle exit notification
    pub async fn handle_exit(&mut self) -> LspResult<()> {
        if self.state != ServerState::ShuttingDown {
            warn!("Exit notification received without shutdown");
        } else {
            info!("Exit notification received");
        }
        self.state = ServerState::ShutDown;
        info!("Server state changed to ShutDown");
        Ok(())
    }

    /// Handle didOpen notification
    pub async fn handle_did_open(&mut self, params: Value) -> LspResult<()> {
        self.ensure_initialized()?;

        let text_document = params
            .get("textDocument")
            .ok_or_else(|| LspError::InvalidParams("Missing textDocument".to_string()))?;
        let uri = document_uri(&params)?;
        let text = text_document
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LspError::InvalidParams("Missing text".to_string()))?;

        debug!("Document opened: uri={}, size={} bytes", uri, text.len());
        self.store.open(uri.clone(), text);
        self.publish_diagnostics(&uri);
        Ok(())
    }

    /// Handle didChange notification; full sync, the last change wins
    pub async fn handle_did_change(&mut self, params: Value) -> LspResult<()> {
        self.ensure_initialized()?;

        let uri = document_uri(&params)?;
        let content_changes = params
            .get("contentChanges")
            .and_then(|v| v.as_array())
            .ok_or_else(|| LspError::InvalidParams("Missing contentChanges".to_string()))?;

        let Some(text) = content_changes
            .last()
            .and_then(|change| change.get("text"))
            .and_then(|v| v.as_str())
        else {
            debug!("No text in changes for {}", uri);
            return Ok(());
        };

        self.store.update(uri.clone(), text);
        self.publish_diagnostics(&uri);
        Ok(())
    }

    /// Handle didSave notification
    pub async fn handle_did_save(&mut self, params: Value) -> LspResult<()> {
        self.ensure_initialized()?;

        let uri = document_uri(&params)?;
        if let Some(text) = params.get("text").and_then(|v| v.as_str()) {
            self.store.update(uri.clone(), text);
        }
        self.publish_diagnostics(&uri);
        Ok(())
    }

    /// Handle didClose notification
    pub async fn handle_did_close(&mut self, params: Value) -> LspResult<()> {
        self.ensure_initialized()?;

        let uri = document_uri(&params)?;
        debug!("Document closed: uri={}", uri);
        self.store.close(&uri);
        self.queue_diagnostics(&uri, Vec::new());
        Ok(())
    }

    /// Handle definition request
    pub async fn handle_definition(&self, params: Value) -> LspResult<Value> {
        self.ensure_initialized()?;

        let uri = document_uri(&params)?;
        let position: Position = param(&params, "position")?;
        let locations = DefinitionResolver::new(self.context()).find_definition(&uri, position);
        to_json(&locations)
    }

    /// Handle completion request
    pub async fn handle_completion(&self, params: Value) -> LspResult<Value> {
        self.ensure_initialized()?;

        let uri = document_uri(&params)?;
        let position: Position = param(&params, "position")?;
        let items = CompletionEngine::new(self.context()).completions(&uri, position);
        to_json(&items)
    }

    /// Handle code action request
    pub async fn handle_code_action(&self, params: Value) -> LspResult<Value> {
        self.ensure_initialized()?;

        let uri = document_uri(&params)?;
        let range: Range = param(&params, "range")?;
        let diagnostics: Vec<Diagnostic> = params
            .get("context")
            .and_then(|context| context.get("diagnostics"))
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match serde_json::from_value(item.clone()) {
                        Ok(diagnostic) => Some(diagnostic),
                        Err(e) => {
                            debug!("Skipping unreadable diagnostic in context: {}", e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let actions = CodeActionsEngine::new(self.context()).code_actions(&uri, range, &diagnostics);
        to_json(&actions)
    }

    /// Handle documentSymbol request
    pub async fn handle_document_symbol(&self, params: Value) -> LspResult<Value> {
        self.ensure_initialized()?;

        let uri = document_uri(&params)?;
        let symbols = SymbolsBuilder::new(self.context()).document_symbols(&uri);
        to_json(&symbols)
    }

    /// Handle formatting request
    pub async fn handle_formatting(&self, params: Value) -> LspResult<Value> {
        self.ensure_initialized()?;

        let uri = document_uri(&params)?;
        let edits = FormattingEngine::new(self.context()).format(&uri);
        to_json(&edits)
    }

    /// Handle workspace/executeCommand request
    ///
    /// `linkki.applySnippet(uri, range, snippet)` is relayed to the client
    /// unchanged as positional params; other commands are ignored.
    pub async fn handle_execute_command(&mut self, params: Value) -> LspResult<Value> {
        self.ensure_initialized()?;

        let command = params
            .get("command")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LspError::InvalidParams("Missing command".to_string()))?;

        if command != APPLY_SNIPPET_COMMAND {
            warn!("Ignoring unknown command: {}", command);
            return Ok(Value::Null);
        }

        let arguments = params
            .get("arguments")
            .and_then(|v| v.as_array())
            .filter(|args| args.len() >= 3)
            .ok_or_else(|| {
                LspError::InvalidParams(format!("{} expects uri, range and snippet", APPLY_SNIPPET_COMMAND))
            })?;

        debug!("Relaying snippet for {}", arguments[0]);
        self.outbox.push(JsonRpcNotification::new(
            APPLY_SNIPPET_NOTIFICATION,
            Some(Value::Array(arguments[..3].to_vec())),
        ));
        Ok(Value::Null)
    }

    fn publish_diagnostics(&mut self, uri: &str) {
        let diagnostics = DiagnosticsEngine::new(self.context(), self.compiler.as_ref()).diagnostics(uri);
        self.queue_diagnostics(uri, diagnostics);
    }

    fn queue_diagnostics(&mut self, uri: &str, diagnostics: Vec<Diagnostic>) {
        debug!("Publishing {} diagnostics for {}", diagnostics.len(), uri);
        self.outbox.push(JsonRpcNotification::new(
            "textDocument/publishDiagnostics",
            Some(json!({ "uri": uri, "diagnostics": diagnostics })),
        ));
    }

    async fn process_request(&mut self, method: &str, params: Value) -> LspResult<Value> {
        if method != "initialize" && self.state == ServerState::Initializing {
            return Err(LspError::InvalidRequest("Server is not initialized".to_string()));
        }

        match method {
            "initialize" => self.handle_initialize(params).await,
            "shutdown" => self.handle_shutdown().await,
            "textDocument/definition" => self.handle_definition(params).await,
            "textDocument/completion" => self.handle_completion(params).await,
            "textDocument/codeAction" => self.handle_code_action(params).await,
            "textDocument/documentSymbol" => self.handle_document_symbol(params).await,
            "textDocument/formatting" => self.handle_formatting(params).await,
            "workspace/executeCommand" => self.handle_execute_command(params).await,
            _ => Err(LspError::MethodNotFound(method.to_string())),
        }
    }

    async fn process_notification(&mut self, method: &str, params: Value) -> LspResult<()> {
        match method {
            "initialized" => self.handle_initialized().await,
            "exit" => self.handle_exit().await,
            "textDocument/didOpen" => self.handle_did_open(params).await,
            "textDocument/didChange" => self.handle_did_change(params).await,
            "textDocument/didSave" => self.handle_did_save(params).await,
            "textDocument/didClose" => self.handle_did_close(params).await,
            _ => {
                debug!("Ignoring notification: {}", method);
                Ok(())
            }
        }
    }

    /// Process one message; requests yield the response to send
    pub async fn handle_message(&mut self, message: LspMessage) -> Option<JsonRpcResponse> {
        match message {
            LspMessage::Request(req) => {
                debug!("Received request: method={}, id={}", req.method, req.id);
                let params = req.params.unwrap_or_else(|| json!({}));
                let response = match self.process_request(&req.method, params).await {
                    Ok(result) => JsonRpcResponse::success(req.id, result),
                    Err(err) => {
                        warn!("Error processing {}: {}", req.method, err);
                        JsonRpcResponse::error(req.id, JsonRpcError::from(err))
                    }
                };
                Some(response)
            }
            LspMessage::Notification(notif) => {
                debug!("Received notification: method={}", notif.method);
                let params = notif.params.unwrap_or_else(|| json!({}));
                if let Err(err) = self.process_notification(&notif.method, params).await {
                    warn!("Error processing {}: {}", notif.method, err);
                }
                None
            }
            LspMessage::Response(resp) => {
                debug!("Ignoring client response: id={}", resp.id);
                None
            }
        }
    }

    /// Serve messages until `exit` or the end of input
    pub async fn run<R, W>(&mut self, transport: &mut MessageTransport<R, W>) -> LspResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("LSP server started");

        loop {
            let message = match transport.read_message().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    info!("Input closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to read message: {}", e);
                    continue;
                }
            };

            if let Some(response) = self.handle_message(message).await {
                if let Err(e) = transport.write_message(&LspMessage::Response(response)).await {
                    error!("Failed to send response: {}", e);
                }
            }

            for notification in self.take_notifications() {
                if let Err(e) = transport
                    .write_message(&LspMessage::Notification(notification))
                    .await
                {
                    error!("Failed to send notification: {}", e);
                }
            }

            if self.state == ServerState::ShutDown {
                info!("LSP server shutting down");
                break;
            }
        }

        info!("LSP server stopped");
        Ok(())
    }
}

impl Default for LspServer {
    fn default() -> Self {
        Self::with_javac(ServerConfig::default())
    }
}

fn document_uri(params: &Value) -> LspResult<String> {
    params
        .get("textDocument")
        .and_then(|doc| doc.get("uri"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| LspError::InvalidParams("Missing uri".to_string()))
}

fn param<T: DeserializeOwned>(params: &Value, name: &str) -> LspResult<T> {
    let value = params
        .get(name)
        .ok_or_else(|| LspError::InvalidParams(format!("Missing {}", name)))?;
    serde_json::from_value(value.clone()).map_err(|e| LspError::InvalidParams(format!("Invalid {}: {}", name, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> LspResult<Value> {
    serde_json::to_value(value).map_err(|e| LspError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerConfig;
    use crate::diagnostics::{CompileResult, RawDiagnostic};
    use crate::transport::{frame, JsonRpcRequest};
    use crate::types::DiagnosticSeverity;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingCompiler {
        calls: Arc<Mutex<Vec<String>>>,
        configs: Arc<Mutex<Vec<CompilerConfig>>>,
    }

    impl Compiler for RecordingCompiler {
        fn compile(&self, uri: &str, _text: &str) -> CompileResult<Vec<RawDiagnostic>> {
            self.calls.lock().unwrap().push(uri.to_string());
            Ok(Vec::new())
        }

        fn reconfigure(&mut self, config: &CompilerConfig) {
            self.configs.lock().unwrap().push(config.clone());
        }
    }

    fn server() -> LspServer {
        LspServer::new(ServerConfig::default(), Box::new(RecordingCompiler::default()))
    }

    async fn initialized_server() -> LspServer {
        let mut server = server();
        server.handle_initialize(json!({})).await.unwrap();
        server.handle_initialized().await.unwrap();
        server
    }

    fn open_params(uri: &str, text: &str) -> Value {
        json!({ "textDocument": { "uri": uri, "languageId": "properties", "version": 1, "text": text } })
    }

    #[test]
    fn test_server_creation() {
        let server = server();
        assert_eq!(server.state(), ServerState::Initializing);
        assert!(server.store().is_empty());
    }

    #[test]
    fn test_server_capabilities_json() {
        let json = ServerCapabilities::default().to_json();
        assert_eq!(json["textDocumentSync"]["change"], 1);
        assert_eq!(json["textDocumentSync"]["save"]["includeText"], true);
        assert_eq!(json["definitionProvider"], true);
        assert_eq!(json["documentSymbolProvider"], true);
        assert_eq!(json["documentFormattingProvider"], true);
        assert!(json["completionProvider"].is_object());
        assert_eq!(json["executeCommandProvider"]["commands"], json!([APPLY_SNIPPET_COMMAND]));
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let mut server = server();
        let result = server.handle_initialize(json!({ "processId": 1 })).await.unwrap();
        assert_eq!(result["serverInfo"]["name"], "linkki-lsp");

        server.handle_initialized().await.unwrap();
        assert_eq!(server.state(), ServerState::Initialized);
        assert!(server.handle_initialize(json!({})).await.is_err());

        server.handle_shutdown().await.unwrap();
        assert_eq!(server.state(), ServerState::ShuttingDown);
        server.handle_exit().await.unwrap();
        assert_eq!(server.state(), ServerState::ShutDown);
        assert_eq!(server.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_exit_without_shutdown() {
        let mut server = initialized_server().await;
        server.handle_exit().await.unwrap();
        assert_eq!(server.state(), ServerState::ShutDown);
        assert_eq!(server.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_requests_before_initialize_are_rejected() {
        let mut server = server();
        let request = JsonRpcRequest::new(json!(1), "textDocument/formatting", Some(json!({})));
        let response = server.handle_message(LspMessage::Request(request)).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut server = initialized_server().await;
        let request = JsonRpcRequest::new(json!(2), "textDocument/hover", None);
        let response = server.handle_message(LspMessage::Request(request)).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_missing_params() {
        let mut server = initialized_server().await;
        let request = JsonRpcRequest::new(json!(3), "textDocument/definition", Some(json!({})));
        let response = server.handle_message(LspMessage::Request(request)).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_initialization_options_overlay() {
        let compiler = RecordingCompiler::default();
        let configs = compiler.configs.clone();
        let mut server = LspServer::new(ServerConfig::default(), Box::new(compiler));

        server
            .handle_initialize(json!({
                "initializationOptions": {
                    "binding_annotation_prefix": "Ui",
                    "compiler": { "enabled": false }
                }
            }))
            .await
            .unwrap();

        assert_eq!(server.config().binding_annotation_prefix, "Ui");
        assert_eq!(server.config().source_root, "src/main/java");
        assert_eq!(configs.lock().unwrap().len(), 1);
        assert!(!configs.lock().unwrap()[0].enabled);
    }

    #[tokio::test]
    async fn test_invalid_initialization_options_are_ignored() {
        let mut server = server();
        server
            .handle_initialize(json!({ "initializationOptions": { "binding_annotation_prefix": "" } }))
            .await
            .unwrap();
        assert_eq!(server.config(), &ServerConfig::default());
    }

    #[tokio::test]
    async fn test_open_publishes_diagnostics() {
        let mut server = initialized_server().await;
        server
            .handle_did_open(open_params("file:///r/messages.properties", "Foo_b=1\nFoo_a=2\n"))
            .await
            .unwrap();

        let notifications = server.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].method, "textDocument/publishDiagnostics");
        let params = notifications[0].params.as_ref().unwrap();
        assert_eq!(params["uri"], "file:///r/messages.properties");
        let diagnostics: Vec<Diagnostic> = serde_json::from_value(params["diagnostics"].clone()).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range.start.line, 1);
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Warning);
        assert!(server.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_change_keeps_last_text_and_compiles_sources() {
        let compiler = RecordingCompiler::default();
        let calls = compiler.calls.clone();
        let mut server = LspServer::new(ServerConfig::default(), Box::new(compiler));
        server.handle_initialize(json!({})).await.unwrap();
        server.handle_initialized().await.unwrap();

        let uri = "file:///p/src/main/java/A.java";
        server.handle_did_open(open_params(uri, "class A {}")).await.unwrap();
        server
            .handle_did_change(json!({
                "textDocument": { "uri": uri, "version": 2 },
                "contentChanges": [{ "text": "class B {}" }, { "text": "class C {}" }]
            }))
            .await
            .unwrap();

        assert_eq!(server.store().get(uri), Some("class C {}"));
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(server.take_notifications().len(), 2);
    }

    #[tokio::test]
    async fn test_close_clears_diagnostics() {
        let mut server = initialized_server().await;
        let uri = "file:///r/messages.properties";
        server.handle_did_open(open_params(uri, "b=1\na=2\n")).await.unwrap();
        server.take_notifications();

        server.handle_did_close(json!({ "textDocument": { "uri": uri } })).await.unwrap();
        assert!(!server.store().is_open(uri));
        let notifications = server.take_notifications();
        assert_eq!(notifications[0].params.as_ref().unwrap()["diagnostics"], json!([]));
    }

    #[tokio::test]
    async fn test_execute_command_relays_snippet() {
        let mut server = initialized_server().await;
        let range = json!({ "start": { "line": 5, "character": 5 }, "end": { "line": 5, "character": 5 } });
        let result = server
            .handle_execute_command(json!({
                "command": APPLY_SNIPPET_COMMAND,
                "arguments": ["file:///A.java", range, "\n\npublic ${1:boolean} isX() {}"]
            }))
            .await
            .unwrap();
        assert!(result.is_null());

        let notifications = server.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].method, APPLY_SNIPPET_NOTIFICATION);
        let params = notifications[0].params.as_ref().unwrap();
        assert!(params.is_array());
        assert_eq!(
            params,
            &json!(["file:///A.java", range, "\n\npublic ${1:boolean} isX() {}"])
        );
    }

    #[tokio::test]
    async fn test_execute_command_needs_three_arguments() {
        let mut server = initialized_server().await;
        let result = server
            .handle_execute_command(json!({ "command": APPLY_SNIPPET_COMMAND, "arguments": ["x"] }))
            .await;
        assert!(matches!(result, Err(LspError::InvalidParams(_))));
        assert!(server.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_run_until_exit() {
        let mut input = String::new();
        input.push_str(&frame(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#));
        input.push_str(&frame(r#"{"jsonrpc":"2.0","method":"initialized","params":{}}"#));
        input.push_str("Content-Length: 5\r\n\r\n{bad}");
        input.push_str(&frame(
            r#"{"jsonrpc":"2.0","method":"textDocument/didOpen","params":{"textDocument":{"uri":"file:///r/messages.properties","text":"a=1\n"}}}"#,
        ));
        input.push_str(&frame(r#"{"jsonrpc":"2.0","id":2,"method":"shutdown"}"#));
        input.push_str(&frame(r#"{"jsonrpc":"2.0","method":"exit"}"#));
        input.push_str(&frame(r#"{"jsonrpc":"2.0","id":3,"method":"shutdown"}"#));

        let mut transport = MessageTransport::new(input.as_bytes(), Vec::new());
        let mut server = server();
        server.run(&mut transport).await.unwrap();
        assert_eq!(server.state(), ServerState::ShutDown);

        let (_, output) = transport.into_inner();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("Content-Length").count(), 3);
        assert!(output.contains(r#""id":1"#));
        assert!(output.contains("textDocument/publishDiagnostics"));
        assert!(output.contains(r#""id":2"#));
        assert!(!output.contains(r#""id":3"#));
    }
}
