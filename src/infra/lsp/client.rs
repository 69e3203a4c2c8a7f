use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::time::timeout;

use super::protocol::{
    ClientCapabilities, ClientInfo, DocumentSymbolParams, InitializeParams, InitializeResult,
    Message, Notification, Request, RequestId, Response, error_codes,
};
use super::transport::{Transport, write_notification, write_request, write_response};
use super::uri::path_to_uri;
use crate::error::LspError;

type PendingRequest = oneshot::Sender<Response>;

#[derive(Debug)]
struct DocumentState {
    version: u32,
    content_hash: u64,
}

impl DocumentState {
    fn new(content: &str) -> Self {
        Self {
            version: 1,
            content_hash: crate::infra::hash_content(content),
        }
    }

    fn needs_update(&self, new_content: &str) -> bool {
        crate::infra::hash_content(new_content) != self.content_hash
    }

    fn update(&mut self, new_content: &str) {
        self.version += 1;
        self.content_hash = crate::infra::hash_content(new_content);
    }
}

/// Connection to one stdio language server
pub struct LspClient {
    name: String,
    root: PathBuf,
    process: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    next_id: AtomicU64,
    pending: RwLock<HashMap<RequestId, PendingRequest>>,
    documents: RwLock<HashMap<String, DocumentState>>,
    capabilities: RwLock<Option<InitializeResult>>,
    shutdown: AtomicBool,
    terminated: AtomicBool,
}

impl LspClient {
    pub fn new(name: impl Into<String>, root: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            root,
            process: Mutex::new(None),
            stdin: Mutex::new(None),
            next_id: AtomicU64::new(1),
            pending: RwLock::new(HashMap::new()),
            documents: RwLock::new(HashMap::new()),
            capabilities: RwLock::new(None),
            shutdown: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawn the server process and run the initialize handshake
    pub async fn start(self: &Arc<Self>, command: &str, args: &[String]) -> Result<(), LspError> {
        if self.is_running().await {
            return Ok(());
        }

        tracing::info!("Starting {} language server: {} {:?}", self.name, command, args);

        let mut child = Command::new(command)
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LspError::ServerStart(format!("{}: {}", command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LspError::ServerStart("Failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LspError::ServerStart("Failed to get stdout".to_string()))?;

        *self.process.lock().await = Some(child);
        *self.stdin.lock().await = Some(stdin);

        let client = Arc::clone(self);
        tokio::spawn(async move {
            client.read_responses(Transport::new(stdout)).await;
        });

        self.initialize().await?;

        tracing::info!("{} language server started successfully", self.name);
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        let mut process = self.process.lock().await;
        if let Some(ref mut child) = *process {
            matches!(child.try_wait(), Ok(None))
        } else {
            false
        }
    }

    async fn initialize(&self) -> Result<(), LspError> {
        let params = InitializeParams {
            process_id: Some(std::process::id()),
            root_uri: Some(path_to_uri(&self.root)),
            capabilities: ClientCapabilities::outline_only(),
            client_info: Some(ClientInfo {
                name: "symquery".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        };

        let result: InitializeResult = self
            .request("initialize", Some(serde_json::to_value(params)?))
            .await?;

        tracing::debug!(
            "{} initialized (server: {:?}, documentSymbol: {})",
            self.name,
            result.server_info.as_ref().map(|s| s.name.as_str()),
            result.capabilities.supports_document_symbols()
        );

        *self.capabilities.write().await = Some(result);

        self.notify("initialized", Some(serde_json::json!({})))
            .await?;

        Ok(())
    }

    pub async fn supports_document_symbols(&self) -> bool {
        self.capabilities
            .read()
            .await
            .as_ref()
            .is_some_and(|c| c.capabilities.supports_document_symbols())
    }

    /// Send a request and wait for response
    pub async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, LspError> {
        let result = self.request_value(method, params).await?;
        serde_json::from_value(result).map_err(|e| LspError::Protocol(e.to_string()))
    }

    /// Send a request and return its raw `result`
    pub async fn request_value(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, LspError> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(LspError::ServerTerminated {
                server: self.name.clone(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.write().await.insert(RequestId::Number(id), tx);

        let request = Request::new(id, method, params);
        tracing::trace!("{} LSP request {}: {}", self.name, id, method);

        {
            let mut stdin_guard = self.stdin.lock().await;
            let stdin = stdin_guard.as_mut().ok_or(LspError::NotConnected)?;
            write_request(stdin, &request).await?;
        }

        match timeout(crate::config::timeout_for(method), rx).await {
            Ok(Ok(response)) => match response.into_result() {
                Ok(result) => Ok(result),
                Err(err) if err.code == error_codes::SERVER_TERMINATED => {
                    Err(LspError::ServerTerminated {
                        server: self.name.clone(),
                    })
                }
                Err(err) => Err(err.into()),
            },
            Ok(Err(_)) => Err(LspError::RequestCancelled),
            Err(_) => {
                self.cancel_request(id).await;
                Err(LspError::Timeout(format!(
                    "{} '{}' timed out. The language server may be busy or unresponsive",
                    self.name, method
                )))
            }
        }
    }

    pub async fn request_with_retry(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, LspError> {
        use crate::infra::retry::{RetryConfig, with_retry};
        let config = RetryConfig::from_runtime();
        with_retry(&config, || self.request_value(method, params.clone())).await
    }

    pub async fn cancel_request(&self, id: u64) {
        self.pending.write().await.remove(&RequestId::Number(id));
        let _ = self
            .notify("$/cancelRequest", Some(serde_json::json!({ "id": id })))
            .await;
    }

    /// Send a notification (no response expected)
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), LspError> {
        let notification = Notification::new(method, params);

        let mut stdin_guard = self.stdin.lock().await;
        let stdin = stdin_guard.as_mut().ok_or(LspError::NotConnected)?;
        write_notification(stdin, &notification).await?;

        Ok(())
    }

    /// Open the document, or push its new content if it changed since last time
    pub async fn sync_document(
        &self,
        uri: &str,
        language_id: &str,
        content: &str,
    ) -> Result<(), LspError> {
        let mut documents = self.documents.write().await;

        if let Some(state) = documents.get_mut(uri) {
            if state.needs_update(content) {
                state.update(content);
                self.notify(
                    "textDocument/didChange",
                    Some(serde_json::json!({
                        "textDocument": { "uri": uri, "version": state.version },
                        "contentChanges": [{ "text": content }]
                    })),
                )
                .await?;
            }
            return Ok(());
        }

        let state = DocumentState::new(content);
        self.notify(
            "textDocument/didOpen",
            Some(serde_json::json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": language_id,
                    "version": state.version,
                    "text": content
                }
            })),
        )
        .await?;
        documents.insert(uri.to_string(), state);
        Ok(())
    }

    /// Raw `textDocument/documentSymbol` payload for a synced document
    pub async fn document_symbols(
        &self,
        uri: &str,
        language_id: &str,
        content: &str,
    ) -> Result<Value, LspError> {
        self.sync_document(uri, language_id, content).await?;
        let params = serde_json::to_value(DocumentSymbolParams::new(uri))?;
        self.request_with_retry("textDocument/documentSymbol", Some(params))
            .await
    }

    /// Background task that reads and dispatches responses
    async fn read_responses(self: Arc<Self>, mut transport: Transport<ChildStdout>) {
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            match transport.read_frame().await {
                Ok(body) => self.handle_frame(&body).await,
                Err(e) => {
                    if !self.shutdown.load(Ordering::Acquire) {
                        tracing::error!("{} LSP read error: {}", self.name, e);
                        self.terminated.store(true, Ordering::Release);
                        self.cancel_pending_requests(
                            error_codes::SERVER_TERMINATED,
                            &format!("{} language server terminated unexpectedly", self.name),
                        )
                        .await;
                    }
                    break;
                }
            }
        }
    }

    /// Fail every in-flight request with the given error code
    async fn cancel_pending_requests(&self, code: i32, reason: &str) {
        let mut pending = self.pending.write().await;
        if !pending.is_empty() {
            tracing::debug!("Cancelling {} pending requests: {}", pending.len(), reason);
        }
        for (id, sender) in pending.drain() {
            let _ = sender.send(Response::failure(id, code, reason));
        }
    }

    /// Dispatch one framed body. A body that is not a valid message fails
    /// only the request it answers; the connection stays up.
    async fn handle_frame(&self, body: &str) {
        match Message::parse(body) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => {
                tracing::warn!("{} sent an unparsable message: {}", self.name, e);
                let Some(id) = Message::salvage_id(body) else {
                    return;
                };
                if let Some(tx) = self.take_pending(&id).await {
                    let _ = tx.send(Response::failure(
                        id,
                        error_codes::PARSE_ERROR,
                        format!("Unparsable response: {e}"),
                    ));
                }
            }
        }
    }

    async fn take_pending(&self, id: &RequestId) -> Option<PendingRequest> {
        let mut pending = self.pending.write().await;
        // Some servers echo numeric ids back as strings
        pending.remove(id).or_else(|| match id {
            RequestId::String(s) => s
                .parse::<u64>()
                .ok()
                .and_then(|n| pending.remove(&RequestId::Number(n))),
            RequestId::Number(_) => None,
        })
    }

    async fn handle_message(&self, message: Message) {
        match message {
            Message::Response(response) => {
                let Some(id) = response.id.clone() else {
                    return;
                };
                match self.take_pending(&id).await {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => tracing::debug!(
                        "Received response for unknown request ID {:?} (may have timed out)",
                        id
                    ),
                }
            }
            Message::Request(request) => self.handle_server_request(request).await,
            Message::Notification(notification) => {
                let params = notification.params.unwrap_or(Value::Null);
                match notification.method.as_str() {
                    "window/logMessage" | "window/showMessage" => {
                        if let Some(msg) = params.get("message").and_then(|m| m.as_str()) {
                            match params.get("type").and_then(|t| t.as_u64()) {
                                Some(1) => tracing::warn!("LSP {}: {}", self.name, msg),
                                _ => tracing::debug!("LSP {}: {}", self.name, msg),
                            }
                        }
                    }
                    method => tracing::trace!("Unhandled notification: {}", method),
                }
            }
        }
    }

    async fn handle_server_request(&self, request: Request) {
        let response = server_request_response(&request);

        let mut stdin_guard = self.stdin.lock().await;
        if let Some(stdin) = stdin_guard.as_mut()
            && let Err(e) = write_response(stdin, &response).await
        {
            tracing::debug!("Failed to answer {} from {}: {}", request.method, self.name, e);
        }
    }

    /// Shutdown the language server with 3-stage graceful termination
    pub async fn shutdown(&self) -> Result<(), LspError> {
        self.shutdown.store(true, Ordering::Release);

        // Stage 1: shutdown request, then exit notification
        let polite = timeout(Duration::from_secs(2), async {
            if let Ok(()) = self.request::<()>("shutdown", None).await {
                let _ = self.notify("exit", None).await;
            }
        })
        .await;

        if polite.is_err() {
            tracing::debug!("{} LSP shutdown request timed out", self.name);
        }

        self.stdin.lock().await.take();

        // Stage 2 & 3: wait for exit, then force kill
        if let Some(mut child) = self.process.lock().await.take() {
            match timeout(Duration::from_secs(5), child.wait()).await {
                Ok(Ok(status)) => {
                    tracing::debug!("{} language server exited: {:?}", self.name, status)
                }
                Ok(Err(e)) => tracing::warn!("{} language server wait error: {}", self.name, e),
                Err(_) => {
                    tracing::warn!(
                        "{} language server termination timed out, forcing kill",
                        self.name
                    );
                    let _ = child.kill().await;
                }
            }
        }

        self.cancel_pending_requests(error_codes::REQUEST_CANCELLED, "Server shutdown")
            .await;
        tracing::info!("{} language server stopped", self.name);
        Ok(())
    }
}

/// Reply to a server-to-client request. Only configuration is answered with
/// content; registration and progress requests are acknowledged.
fn server_request_response(request: &Request) -> Response {
    let id = request.id.clone();
    match request.method.as_str() {
        "workspace/configuration" => {
            let items = request
                .params
                .as_ref()
                .and_then(|p| p.get("items"))
                .and_then(|i| i.as_array())
                .map_or(0, Vec::len);
            Response::success(id, Value::Array(vec![Value::Null; items]))
        }
        "client/registerCapability"
        | "client/unregisterCapability"
        | "window/workDoneProgress/create"
        | "window/showMessageRequest" => Response::success(id, Value::Null),
        method => Response::failure(
            id,
            error_codes::METHOD_NOT_FOUND,
            format!("Unsupported request: {method}"),
        ),
    }
}
