//! LSP Infrastructure for Symquery
//!
//! Just enough of the Language Server Protocol to fetch document outlines:
//! - JSON-RPC 2.0 protocol types
//! - Async message transport with Content-Length framing
//! - Stdio client with atomic request IDs and document sync
//! - Outline client that fans a request out to every attached server

pub mod client;
pub mod outline;
pub mod protocol;
pub mod transport;
pub mod uri;

pub use client::LspClient;
pub use outline::LspOutlineClient;
pub use uri::{language_id_for, path_to_uri};
