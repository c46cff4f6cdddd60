//! Foundation types for the squill toolchain.
//!
//! This module provides fundamental types used throughout the library:
//! - [`TextSize`], [`TextRange`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Position`], [`Span`] - Offset + line/column positions for lexemes and
//!   AST nodes
//!
//! This module has NO dependencies on other squill modules.

mod line_index;
mod position;

pub use line_index::{LineCol, LineIndex};
pub use position::{Position, Span};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
