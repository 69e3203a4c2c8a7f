//! Service layer for Symquery

pub mod config;
pub mod query;
pub mod walker;

pub use config::{ConfigService, DefaultConfigService};
pub use query::{
    ContextQuery, SymbolNameQuery, WindowQuery, symbol_name_query_callback,
    window_query_callback,
};
pub use walker::{DEFAULT_MAX_DEPTH, SymbolTreeWalker, TraversalStats};
