//! JSON decoding for payloads of arbitrary nesting depth
//!
//! Symbol outlines can nest far deeper than serde_json's default recursion
//! limit of 128. Depth is bounded later by the tree walker, so parsing runs
//! without a limit and grows the stack on demand instead.

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Parse `text` with no recursion limit
pub fn from_str_unbounded<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}
