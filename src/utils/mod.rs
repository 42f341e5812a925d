//! Utility modules: developer log sink, JSON conversion.
pub mod devlog;
pub mod json;
