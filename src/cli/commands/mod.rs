//! Command implementations for Symquery
//!
//! Each command is implemented in its own module.

pub mod config;
pub mod symbols;
pub mod window;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::infra::buffer::BufferStore;
use crate::models::query::BufferId;

/// Load `file` as the active buffer, optionally placing the cursor on `line`
pub(crate) async fn open_buffer(
    file: &Path,
    line: Option<usize>,
) -> Result<(Arc<BufferStore>, BufferId)> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let store = Arc::new(BufferStore::new());
    let buffer = store.open(file, &text);
    if let Some(line) = line {
        store.set_cursor_line(line)?;
    }

    tracing::debug!(
        "Opened {} as {} ({} lines)",
        file.display(),
        buffer,
        store.line_count(buffer)?
    );
    Ok((store, buffer))
}
