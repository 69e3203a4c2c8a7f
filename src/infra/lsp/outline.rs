//! Document-symbol outlines served by attached language servers

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;

use super::client::LspClient;
use super::uri::{language_id_for, path_to_uri};
use crate::error::{LspError, OutlineError};
use crate::infra::buffer::BufferAccess;
use crate::infra::outline::SymbolOutlineClient;
use crate::models::query::BufferId;
use crate::models::symbol::{SymbolResponse, SymbolTree, parse_symbol_response};

/// Asks every attached server for `textDocument/documentSymbol` and returns
/// the answers as one sequence of `{ result = ... }` envelopes.
///
/// Requests block on the runtime captured at connect time, so callers must
/// be off the async executor (e.g. inside `spawn_blocking`).
pub struct LspOutlineClient {
    handle: Handle,
    clients: Vec<Arc<LspClient>>,
    buffers: Arc<dyn BufferAccess>,
}

impl LspOutlineClient {
    /// Start one server per command line. Servers that fail to start are skipped.
    pub async fn connect(
        commands: &[String],
        root: &Path,
        buffers: Arc<dyn BufferAccess>,
    ) -> Self {
        let mut clients = Vec::with_capacity(commands.len());

        for command in commands {
            let Some((program, args)) = parse_command_line(command) else {
                tracing::warn!("Ignoring empty language server command");
                continue;
            };

            let client = LspClient::new(server_name(&program), root.to_path_buf());
            match client.start(&program, &args).await {
                Ok(()) => clients.push(client),
                Err(e) => tracing::warn!("Skipping language server '{}': {}", command, e),
            }
        }

        Self {
            handle: Handle::current(),
            clients,
            buffers,
        }
    }

    pub fn server_count(&self) -> usize {
        self.clients.len()
    }

    pub async fn shutdown(&self) {
        for client in &self.clients {
            if let Err(e) = client.shutdown().await {
                tracing::warn!("Failed to stop {}: {}", client.name(), e);
            }
        }
    }

    async fn request_all(&self, uri: &str, language_id: &str, text: &str) -> Vec<Result<Value, LspError>> {
        let mut answers = Vec::with_capacity(self.clients.len());

        for client in &self.clients {
            if !client.supports_document_symbols().await {
                tracing::debug!("{} does not provide document symbols", client.name());
                continue;
            }
            let answer = client.document_symbols(uri, language_id, text).await;
            if let Err(ref e) = answer {
                tracing::warn!("{} documentSymbol failed: {}", client.name(), e);
            }
            answers.push(answer);
        }

        answers
    }
}

impl SymbolOutlineClient for LspOutlineClient {
    fn request_document_symbols(&self, buffer: BufferId) -> Result<SymbolResponse, OutlineError> {
        if self.clients.is_empty() {
            return Err(OutlineError::NoCapableServer);
        }

        let path = self.buffers.buffer_path(buffer)?;
        let text = self.buffers.get_lines(buffer, 1, None)?.join("\n");
        let uri = path_to_uri(&path);
        let language_id = language_id_for(&path);

        let answers = self
            .handle
            .block_on(self.request_all(&uri, language_id, &text));
        aggregate(answers)
    }
}

/// Merge per-server answers. Failed servers are left out; the request fails
/// only when no server answered.
fn aggregate(answers: Vec<Result<Value, LspError>>) -> Result<SymbolResponse, OutlineError> {
    let mut envelopes = Vec::with_capacity(answers.len());
    let mut answered = false;
    let mut last_error = None;

    for answer in answers {
        match answer.map_err(OutlineError::from).and_then(|value| {
            parse_symbol_response(value).map_err(OutlineError::from)
        }) {
            Ok(Some(payload)) => {
                answered = true;
                envelopes.push(SymbolTree::envelope(payload));
            }
            Ok(None) => answered = true,
            Err(e) => last_error = Some(e),
        }
    }

    if answered {
        Ok(Some(SymbolTree::Sequence(envelopes)))
    } else {
        Err(last_error.unwrap_or(OutlineError::NoCapableServer))
    }
}

/// Split a configured command line such as `pyright-langserver --stdio`
fn parse_command_line(command: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

fn server_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program)
        .to_string()
}
