//! Build-time metadata.

/// Crate version, as compiled.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
