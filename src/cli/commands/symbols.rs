//! Symbols command implementation
//!
//! Symbol names of a file from its document outline. Falls back to the whole
//! file text when no outline can be obtained.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use super::open_buffer;
use crate::app::App;
use crate::infra::buffer::BufferAccess;
use crate::infra::lsp::LspOutlineClient;
use crate::infra::outline::{FixedOutline, SymbolOutlineClient};
use crate::services::query::symbol_name_query_callback;
use crate::services::walker::SymbolTreeWalker;

#[derive(Args, Debug)]
pub struct SymbolsArgs {
    /// File to load as the active buffer
    pub file: PathBuf,

    /// Read the outline from a saved documentSymbol JSON response
    #[arg(long, conflicts_with = "servers")]
    pub outline: Option<PathBuf>,

    /// Language server command line, repeatable (overrides lsp.servers)
    #[arg(long = "server", value_name = "CMD")]
    pub servers: Vec<String>,
}

pub async fn execute(args: SymbolsArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let (store, _) = open_buffer(&args.file, None).await?;
    let buffers: Arc<dyn BufferAccess> = store;

    let mut lsp = None;
    let outline: Arc<dyn SymbolOutlineClient> = match &args.outline {
        Some(path) => Arc::new(load_outline(path).await),
        None => {
            let servers = if args.servers.is_empty() {
                &app.config.lsp.servers
            } else {
                &args.servers
            };
            let client =
                Arc::new(LspOutlineClient::connect(servers, app.root(), Arc::clone(&buffers)).await);
            lsp = Some(Arc::clone(&client));
            client
        }
    };

    let walker = SymbolTreeWalker::new(app.config.query.exclusion_set())
        .with_max_depth(app.config.query.max_depth);
    let query = symbol_name_query_callback(buffers, outline, walker);

    // The LSP outline client blocks on the runtime
    let result = tokio::task::spawn_blocking(move || query(None)).await?;

    if let Some(client) = lsp {
        client.shutdown().await;
    }

    match result {
        Ok(result) => ctx.print_query(&result),
        Err(e) => ctx.print_error(&e.to_string()),
    }

    Ok(())
}

/// A saved outline that cannot be read or parsed counts as unavailable
async fn load_outline(path: &Path) -> FixedOutline {
    match FixedOutline::from_json_file(path).await {
        Ok(outline) => outline,
        Err(e) => {
            tracing::warn!("Ignoring outline {}: {}", path.display(), e);
            FixedOutline::unavailable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::query::QueryResult;
    use std::io::Write;

    async fn query_with_outline(outline_json: &str) -> QueryResult {
        let mut source = tempfile::NamedTempFile::new().unwrap();
        write!(source, "fn main() {{}}\nfn helper() {{}}").unwrap();
        let mut outline_file = tempfile::NamedTempFile::new().unwrap();
        write!(outline_file, "{outline_json}").unwrap();

        let (store, _) = open_buffer(source.path(), None).await.unwrap();
        let outline = Arc::new(load_outline(outline_file.path()).await);
        let query = symbol_name_query_callback(store, outline, SymbolTreeWalker::default());
        query(None).unwrap()
    }

    #[tokio::test]
    async fn test_saved_outline_names() {
        let result = query_with_outline(
            r#"[{"name": "main", "kind": 12}, {"name": "helper", "kind": 12}]"#,
        )
        .await;
        assert_eq!(result, QueryResult::Names(vec!["main".into(), "helper".into()]));
    }

    #[tokio::test]
    async fn test_malformed_outline_falls_back_to_text() {
        let result = query_with_outline("{\"name\": ").await;
        assert_eq!(
            result,
            QueryResult::Text("fn main() {}\nfn helper() {}".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_outline_file_falls_back_to_text() {
        let mut source = tempfile::NamedTempFile::new().unwrap();
        write!(source, "let x = 1;").unwrap();

        let (store, _) = open_buffer(source.path(), None).await.unwrap();
        let outline = Arc::new(load_outline(Path::new("/nonexistent/outline.json")).await);
        let query = symbol_name_query_callback(store, outline, SymbolTreeWalker::default());
        assert_eq!(query(None).unwrap(), QueryResult::Text("let x = 1;".to_string()));
    }
}
