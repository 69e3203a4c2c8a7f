//! Data models for Symquery
//!
//! Contains core type definitions used throughout the application.

pub mod config;
pub mod query;
pub mod symbol;

// Re-export commonly used types
pub use config::SymqueryConfig;
pub use query::{BufferId, QueryResult};
pub use symbol::{ExclusionSet, SymbolKind, SymbolNode, SymbolResponse, SymbolTree};
