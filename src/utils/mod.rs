//! Shared utilities.

pub mod text;

pub use text::{is_blank, normalize_whitespace, truncate_with_ellipsis};
