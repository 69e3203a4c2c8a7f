//! Context query strategies
//!
//! Two interchangeable ways of turning a buffer into a compact query string:
//! the names of the symbols in its outline, or a window of raw lines around
//! the cursor. The symbol query falls back to the whole buffer text whenever
//! no outline can be obtained.

use std::sync::Arc;

use crate::error::{BufferError, OutlineError};
use crate::infra::buffer::{BufferAccess, resolve_buffer};
use crate::infra::outline::SymbolOutlineClient;
use crate::models::query::{BufferId, QueryResult};
use crate::models::symbol::SymbolResponse;
use crate::services::walker::SymbolTreeWalker;

/// A strategy that produces a query for a buffer
pub trait ContextQuery: Send + Sync {
    fn query(&self, buffer: Option<BufferId>) -> Result<QueryResult, BufferError>;
}

/// Raw lines around the cursor, or the whole buffer when `line_count <= 0`
#[derive(Clone)]
pub struct WindowQuery {
    buffers: Arc<dyn BufferAccess>,
    line_count: i64,
}

impl WindowQuery {
    pub fn new(buffers: Arc<dyn BufferAccess>, line_count: i64) -> Self {
        Self {
            buffers,
            line_count,
        }
    }

    pub fn whole_buffer(buffers: Arc<dyn BufferAccess>) -> Self {
        Self::new(buffers, 0)
    }

    pub fn line_count(&self) -> i64 {
        self.line_count
    }

    pub fn text(&self, buffer: Option<BufferId>) -> Result<String, BufferError> {
        let buffer = resolve_buffer(self.buffers.as_ref(), buffer)?;

        let lines = if self.line_count <= 0 {
            self.buffers.get_lines(buffer, 1, None)?
        } else {
            let count = self.line_count as usize;
            let cursor = self.buffers.cursor_line()?;
            let start = cursor.saturating_sub(count / 2).max(1);
            self.buffers.get_lines(buffer, start, Some(start + count))?
        };

        Ok(lines.join("\n"))
    }
}

impl ContextQuery for WindowQuery {
    fn query(&self, buffer: Option<BufferId>) -> Result<QueryResult, BufferError> {
        self.text(buffer).map(QueryResult::Text)
    }
}

/// Symbol names from the buffer's outline, in traversal order
#[derive(Clone)]
pub struct SymbolNameQuery {
    buffers: Arc<dyn BufferAccess>,
    outline: Arc<dyn SymbolOutlineClient>,
    walker: SymbolTreeWalker,
}

impl SymbolNameQuery {
    pub fn new(
        buffers: Arc<dyn BufferAccess>,
        outline: Arc<dyn SymbolOutlineClient>,
        walker: SymbolTreeWalker,
    ) -> Self {
        Self {
            buffers,
            outline,
            walker,
        }
    }

    /// Outcome of the outline request alone, without fallback
    pub fn names(&self, buffer: BufferId) -> Result<Vec<String>, OutlineError> {
        let response: SymbolResponse = self.outline.request_document_symbols(buffer)?;
        let (names, stats) = self.walker.collect_names(response.as_ref());
        tracing::debug!(
            "Collected {} symbol names for {} ({} visited, {} excluded)",
            names.len(),
            buffer,
            stats.visited,
            stats.skipped
        );
        Ok(names)
    }
}

impl ContextQuery for SymbolNameQuery {
    fn query(&self, buffer: Option<BufferId>) -> Result<QueryResult, BufferError> {
        let buffer = resolve_buffer(self.buffers.as_ref(), buffer)?;

        match self.names(buffer) {
            Ok(names) => Ok(QueryResult::Names(names)),
            Err(e) => {
                tracing::debug!(
                    "Symbol outline unavailable for {}: {}, using buffer text",
                    buffer,
                    e
                );
                WindowQuery::whole_buffer(Arc::clone(&self.buffers)).query(Some(buffer))
            }
        }
    }
}

/// Build a callable running the symbol-name query
pub fn symbol_name_query_callback(
    buffers: Arc<dyn BufferAccess>,
    outline: Arc<dyn SymbolOutlineClient>,
    walker: SymbolTreeWalker,
) -> impl Fn(Option<BufferId>) -> Result<QueryResult, BufferError> + Send + Sync {
    let query = SymbolNameQuery::new(buffers, outline, walker);
    move |buffer| query.query(buffer)
}

/// Build a callable returning `line_count` lines around the cursor
pub fn window_query_callback(
    buffers: Arc<dyn BufferAccess>,
    line_count: i64,
) -> impl Fn(Option<BufferId>) -> Result<String, BufferError> + Send + Sync {
    let query = WindowQuery::new(buffers, line_count);
    move |buffer| query.text(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::buffer::BufferStore;
    use crate::infra::outline::FixedOutline;
    use crate::models::symbol::parse_symbol_response;

    fn store_with_lines(count: usize) -> (Arc<BufferStore>, BufferId) {
        let store = Arc::new(BufferStore::new());
        let text = (1..=count)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let id = store.open("sample.rs", &text);
        (store, id)
    }

    fn expected(range: std::ops::Range<usize>) -> String {
        range
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn outline(value: serde_json::Value) -> Arc<FixedOutline> {
        Arc::new(FixedOutline::new(parse_symbol_response(value).unwrap()))
    }

    #[test]
    fn test_window_whole_buffer() {
        let (store, id) = store_with_lines(30);
        let full = expected(1..31);

        for line_count in [0, -1, -50] {
            let window = window_query_callback(store.clone(), line_count);
            assert_eq!(window(Some(id)).unwrap(), full);
            assert_eq!(window(None).unwrap(), full);
        }
    }

    #[test]
    fn test_window_centered_on_cursor() {
        let (store, _) = store_with_lines(30);
        store.set_cursor_line(10).unwrap();

        let window = window_query_callback(store.clone(), 4);
        assert_eq!(window(None).unwrap(), expected(8..12));
    }

    #[test]
    fn test_window_clamped_at_start() {
        let (store, _) = store_with_lines(30);
        store.set_cursor_line(1).unwrap();

        let window = window_query_callback(store.clone(), 4);
        assert_eq!(window(None).unwrap(), expected(1..5));
    }

    #[test]
    fn test_window_clamped_at_end() {
        let (store, _) = store_with_lines(12);
        store.set_cursor_line(12).unwrap();

        let window = window_query_callback(store.clone(), 6);
        assert_eq!(window(None).unwrap(), expected(9..13));
    }

    #[test]
    fn test_window_odd_line_count() {
        let (store, _) = store_with_lines(30);
        store.set_cursor_line(10).unwrap();

        let window = window_query_callback(store.clone(), 5);
        assert_eq!(window(None).unwrap(), expected(8..13));
    }

    #[test]
    fn test_window_missing_buffer_propagates() {
        let (store, _) = store_with_lines(3);
        let window = window_query_callback(store, 0);
        assert!(matches!(
            window(Some(BufferId(99))),
            Err(BufferError::NotFound(BufferId(99)))
        ));
    }

    #[test]
    fn test_symbol_names_filtered() {
        let (store, _) = store_with_lines(3);
        let query = symbol_name_query_callback(
            store,
            outline(serde_json::json!({
                "children": [{"name": "foo", "kind": 12, "children": [{"name": "bar", "kind": 15}]}]
            })),
            SymbolTreeWalker::default(),
        );
        assert_eq!(
            query(None).unwrap(),
            QueryResult::Names(vec!["foo".to_string()])
        );
    }

    #[test]
    fn test_symbol_names_from_envelopes() {
        let (store, id) = store_with_lines(3);
        let query = symbol_name_query_callback(
            store,
            outline(serde_json::json!([
                {"result": [{"name": "Server", "kind": 23, "children": [{"name": "run", "kind": 6}]}]},
                {"result": [{"name": "main", "kind": 12}]}
            ])),
            SymbolTreeWalker::default(),
        );
        assert_eq!(
            query(Some(id)).unwrap(),
            QueryResult::Names(vec!["run".into(), "Server".into(), "main".into()])
        );
    }

    #[test]
    fn test_null_outline_gives_no_names() {
        let (store, _) = store_with_lines(3);
        let query = symbol_name_query_callback(
            store,
            Arc::new(FixedOutline::new(None)),
            SymbolTreeWalker::default(),
        );
        assert_eq!(query(None).unwrap(), QueryResult::Names(Vec::new()));
    }

    #[test]
    fn test_outline_failure_falls_back_to_buffer_text() {
        let (store, id) = store_with_lines(25);
        store.set_cursor_line(10).unwrap();

        let query = symbol_name_query_callback(
            store.clone(),
            Arc::new(FixedOutline::unavailable("timeout")),
            SymbolTreeWalker::default(),
        );
        let whole = window_query_callback(store.clone(), 0);

        assert_eq!(query(Some(id)).unwrap(), QueryResult::Text(whole(Some(id)).unwrap()));
        assert_eq!(query(None).unwrap(), QueryResult::Text(expected(1..26)));
    }

    #[test]
    fn test_fallback_uses_requested_buffer() {
        let store = Arc::new(BufferStore::new());
        let first = store.open("a.rs", "alpha");
        store.open("b.rs", "beta");

        let query = SymbolNameQuery::new(
            store,
            Arc::new(FixedOutline::unavailable("no server")),
            SymbolTreeWalker::default(),
        );
        assert_eq!(
            query.query(Some(first)).unwrap(),
            QueryResult::Text("alpha".to_string())
        );
    }

    #[test]
    fn test_no_active_buffer_propagates() {
        let store = Arc::new(BufferStore::new());
        let query = SymbolNameQuery::new(
            store,
            Arc::new(FixedOutline::new(None)),
            SymbolTreeWalker::default(),
        );
        assert!(matches!(query.query(None), Err(BufferError::NoActiveBuffer)));
    }

    #[test]
    fn test_strategies_interchangeable() {
        let (store, _) = store_with_lines(4);
        let strategies: Vec<Box<dyn ContextQuery>> = vec![
            Box::new(SymbolNameQuery::new(
                store.clone(),
                outline(serde_json::json!([{"name": "main", "kind": 12}])),
                SymbolTreeWalker::default(),
            )),
            Box::new(WindowQuery::new(store.clone(), 2)),
        ];

        let results: Vec<QueryResult> = strategies
            .iter()
            .map(|s| s.query(None).unwrap())
            .collect();
        assert_eq!(results[0], QueryResult::Names(vec!["main".into()]));
        assert_eq!(results[1], QueryResult::Text(expected(1..3)));
    }
}
