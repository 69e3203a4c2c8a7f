//! Symquery - editor-context queries for AI assistants
//!
//! Answers two questions about the active buffer: which symbols it declares
//! (from a language server document outline, filtered by kind) and which lines
//! surround the cursor.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod infra;
pub mod models;
pub mod services;

pub use error::{SymqueryError, SymqueryResult};
