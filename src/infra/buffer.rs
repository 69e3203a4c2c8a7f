//! Buffer access
//!
//! The host editor owns buffers and cursor state; queries only read them
//! through [`BufferAccess`]. [`BufferStore`] is the in-memory implementation
//! used by the CLI and tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::BufferError;
use crate::models::query::BufferId;

/// Read access to editor buffers. Line numbers are 1-indexed.
pub trait BufferAccess: Send + Sync {
    /// Buffer shown in the active window
    fn current_buffer(&self) -> Result<BufferId, BufferError>;

    /// Lines `[start, end)`; `end = None` reads to the end of the buffer.
    /// Ranges past the last line are clamped.
    fn get_lines(
        &self,
        buffer: BufferId,
        start: usize,
        end: Option<usize>,
    ) -> Result<Vec<String>, BufferError>;

    /// Cursor line of the active window
    fn cursor_line(&self) -> Result<usize, BufferError>;

    /// File backing the buffer
    fn buffer_path(&self, buffer: BufferId) -> Result<PathBuf, BufferError>;
}

/// Resolve an optional buffer handle, mapping absence and the
/// [`BufferId::CURRENT`] sentinel to the active buffer.
pub fn resolve_buffer(
    access: &dyn BufferAccess,
    buffer: Option<BufferId>,
) -> Result<BufferId, BufferError> {
    match buffer {
        Some(id) if !id.is_current() => Ok(id),
        _ => access.current_buffer(),
    }
}

#[derive(Debug)]
struct Buffer {
    path: PathBuf,
    lines: Vec<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    buffers: BTreeMap<BufferId, Buffer>,
    active: Option<BufferId>,
    cursor_line: Option<usize>,
    next_id: u32,
}

/// Thread-safe in-memory buffer list with a single active window
#[derive(Debug, Default)]
pub struct BufferStore {
    state: RwLock<StoreState>,
}

impl BufferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `text` as a new buffer and make it the active one.
    /// The cursor moves to line 1.
    pub fn open(&self, path: impl AsRef<Path>, text: &str) -> BufferId {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.next_id += 1;
        let id = BufferId(state.next_id);
        state.buffers.insert(
            id,
            Buffer {
                path: path.as_ref().to_path_buf(),
                lines: text.lines().map(str::to_string).collect(),
            },
        );
        state.active = Some(id);
        state.cursor_line = Some(1);
        tracing::debug!("Opened {} for {}", id, path.as_ref().display());
        id
    }

    pub fn set_active(&self, buffer: BufferId) -> Result<(), BufferError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if !state.buffers.contains_key(&buffer) {
            return Err(BufferError::NotFound(buffer));
        }
        state.active = Some(buffer);
        Ok(())
    }

    /// Move the cursor of the active window
    pub fn set_cursor_line(&self, line: usize) -> Result<(), BufferError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let active = state.active.ok_or(BufferError::NoActiveWindow)?;
        let line_count = state
            .buffers
            .get(&active)
            .map(|b| b.lines.len())
            .ok_or(BufferError::NotFound(active))?;

        if line == 0 || line > line_count.max(1) {
            return Err(BufferError::InvalidLine {
                buffer: active,
                line,
                line_count,
            });
        }

        state.cursor_line = Some(line);
        Ok(())
    }

    pub fn line_count(&self, buffer: BufferId) -> Result<usize, BufferError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state
            .buffers
            .get(&buffer)
            .map(|b| b.lines.len())
            .ok_or(BufferError::NotFound(buffer))
    }
}

impl BufferAccess for BufferStore {
    fn current_buffer(&self) -> Result<BufferId, BufferError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.active.ok_or(BufferError::NoActiveBuffer)
    }

    fn get_lines(
        &self,
        buffer: BufferId,
        start: usize,
        end: Option<usize>,
    ) -> Result<Vec<String>, BufferError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        let lines = &state
            .buffers
            .get(&buffer)
            .ok_or(BufferError::NotFound(buffer))?
            .lines;

        let start = start.max(1) - 1;
        let end = end.map_or(lines.len(), |e| e.saturating_sub(1)).min(lines.len());
        if start >= end {
            return Ok(Vec::new());
        }
        Ok(lines[start..end].to_vec())
    }

    fn cursor_line(&self) -> Result<usize, BufferError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.cursor_line.ok_or(BufferError::NoActiveWindow)
    }

    fn buffer_path(&self, buffer: BufferId) -> Result<PathBuf, BufferError> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state
            .buffers
            .get(&buffer)
            .map(|b| b.path.clone())
            .ok_or(BufferError::NotFound(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> String {
        (1..=count)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_open_makes_buffer_active() {
        let store = BufferStore::new();
        let first = store.open("a.rs", "fn a() {}");
        let second = store.open("b.rs", "fn b() {}");
        assert_ne!(first, second);
        assert_eq!(store.current_buffer().unwrap(), second);
        assert_eq!(store.cursor_line().unwrap(), 1);

        store.set_active(first).unwrap();
        assert_eq!(store.current_buffer().unwrap(), first);
        assert_eq!(store.buffer_path(first).unwrap(), PathBuf::from("a.rs"));
    }

    #[test]
    fn test_get_lines_end_exclusive() {
        let store = BufferStore::new();
        let id = store.open("f.txt", &numbered(10));
        assert_eq!(store.get_lines(id, 3, Some(5)).unwrap(), vec!["line 3", "line 4"]);
        assert_eq!(store.get_lines(id, 9, None).unwrap(), vec!["line 9", "line 10"]);
    }

    #[test]
    fn test_get_lines_clamped() {
        let store = BufferStore::new();
        let id = store.open("f.txt", &numbered(3));
        assert_eq!(store.get_lines(id, 2, Some(50)).unwrap().len(), 2);
        assert!(store.get_lines(id, 7, Some(9)).unwrap().is_empty());
        assert_eq!(store.get_lines(id, 0, None).unwrap().len(), 3);
    }

    #[test]
    fn test_missing_buffer() {
        let store = BufferStore::new();
        assert!(matches!(
            store.get_lines(BufferId(7), 1, None),
            Err(BufferError::NotFound(BufferId(7)))
        ));
        assert!(matches!(
            store.current_buffer(),
            Err(BufferError::NoActiveBuffer)
        ));
        assert!(matches!(
            store.cursor_line(),
            Err(BufferError::NoActiveWindow)
        ));
    }

    #[test]
    fn test_cursor_bounds() {
        let store = BufferStore::new();
        store.open("f.txt", &numbered(5));
        store.set_cursor_line(5).unwrap();
        assert_eq!(store.cursor_line().unwrap(), 5);
        assert!(store.set_cursor_line(6).is_err());
        assert!(store.set_cursor_line(0).is_err());
    }

    #[test]
    fn test_resolve_buffer() {
        let store = BufferStore::new();
        let id = store.open("f.txt", "x");
        assert_eq!(resolve_buffer(&store, None).unwrap(), id);
        assert_eq!(resolve_buffer(&store, Some(BufferId::CURRENT)).unwrap(), id);
        assert_eq!(resolve_buffer(&store, Some(BufferId(42))).unwrap(), BufferId(42));
    }
}
