//! Symbol outline providers

use std::path::Path;

use crate::error::{LspError, OutlineError};
use crate::infra::json::from_str_unbounded;
use crate::models::query::BufferId;
use crate::models::symbol::{SymbolResponse, parse_symbol_response};

/// Source of document-symbol outlines.
///
/// Calls block until the outline is available or the request has failed.
pub trait SymbolOutlineClient: Send + Sync {
    fn request_document_symbols(&self, buffer: BufferId) -> Result<SymbolResponse, OutlineError>;
}

/// Replays a fixed outline for every buffer
#[derive(Debug)]
pub struct FixedOutline {
    response: Result<SymbolResponse, String>,
}

impl FixedOutline {
    pub fn new(response: SymbolResponse) -> Self {
        Self {
            response: Ok(response),
        }
    }

    /// Always fail as if no server could answer
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            response: Err(reason.into()),
        }
    }

    /// Load a raw document-symbol JSON payload from disk
    pub async fn from_json_file(path: &Path) -> Result<Self, OutlineError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(LspError::from)?;
        let value: serde_json::Value = from_str_unbounded(&content)?;
        Ok(Self::new(parse_symbol_response(value)?))
    }
}

impl SymbolOutlineClient for FixedOutline {
    fn request_document_symbols(&self, buffer: BufferId) -> Result<SymbolResponse, OutlineError> {
        tracing::debug!("Serving fixed outline for {}", buffer);
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(reason) => Err(OutlineError::Lsp(LspError::Protocol(reason.clone()))),
        }
    }
}
