//! Domain layer for changenote-lint
//!
//! Architecture: Domain Model - Pure types for change report validation
//! - Report entries are immutable inputs read from change report files
//! - Violations, entry groups and results express the outcome of a validation run
//! - Independent of file systems, terminals and configuration

pub mod entry;
pub mod violations;

// Re-export main domain types for convenience
pub use entry::*;
pub use violations::*;
