//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Task decomposition prompt (user message)
pub const DECOMPOSE: &str = include_str!("../../prompts/decompose.pmt");

/// System instruction sent with every generation request
pub const SYSTEM: &str = include_str!("../../prompts/system.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "decompose" => Some(DECOMPOSE),
        "system" => Some(SYSTEM),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
