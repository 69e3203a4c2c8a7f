//! Infrastructure layer for Symquery
//!
//! Buffer storage, outline providers and language server plumbing.

pub mod buffer;
pub mod json;
pub mod lsp;
pub mod outline;
pub mod retry;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub use buffer::{BufferAccess, BufferStore, resolve_buffer};
pub use outline::{FixedOutline, SymbolOutlineClient};

/// Hash content to detect document changes
#[inline]
pub fn hash_content(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}
