//! Output formatters for duplicate search results.
//!
//! - [`text`]: numbered duplicate sets and summaries for the terminal
//! - [`json`]: a machine-readable document for scripting

pub mod json;
pub mod text;

pub use json::{JsonDuplicateGroup, JsonOutput, JsonOutputError};
pub use text::TextOutput;
