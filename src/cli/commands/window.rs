//! Window command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::open_buffer;
use crate::app::App;
use crate::models::query::QueryResult;
use crate::services::query::window_query_callback;

#[derive(Args, Debug)]
pub struct WindowArgs {
    /// File to load as the active buffer
    pub file: PathBuf,

    /// Cursor line (1-indexed) [default: 1]
    #[arg(short, long)]
    pub line: Option<usize>,

    /// Number of lines to return, 0 or less for the whole file [default: query.window_lines]
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub lines: Option<i64>,
}

pub async fn execute(args: WindowArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let (store, _) = open_buffer(&args.file, args.line).await?;

    let line_count = args.lines.unwrap_or(app.config.query.window_lines);
    let query = window_query_callback(store, line_count);

    match query(None) {
        Ok(text) => ctx.print_query(&QueryResult::Text(text)),
        Err(e) => ctx.print_error(&e.to_string()),
    }

    Ok(())
}
