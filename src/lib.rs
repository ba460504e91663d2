//! # swift-registry - SWIFT/BIC code registry
//!
//! Keeps a table of SWIFT/BIC bank identifier codes and answers questions about it.
//!
//! swift-registry provides:
//! - Validated `SwiftCode` / `CountryCode` identifiers
//! - Headquarters/branch hierarchy derived from the 8-character code prefix
//! - SQLite-backed record store behind the `RecordStore` trait
//! - Registry service with conflict-checked create and branch-guarded delete
//! - CSV bulk loader and an axum HTTP API

pub mod code;
pub mod record;
pub mod view;
pub mod storage;
pub mod registry;
pub mod loader;
pub mod server;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use code::{CountryCode, SwiftCode};
pub use record::{NewSwiftRecord, SwiftRecord, ValidationErrors};
pub use view::{CountryView, SwiftCodeDetail, SwiftCodeSummary};
pub use storage::{RecordStore, SqliteStore};
pub use registry::Registry;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for registry operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error("Invalid code: {0}")]
    InvalidCode(String),

    #[error("SWIFT code {0} not found.")]
    NotFound(SwiftCode),

    #[error("SWIFT code {0} already exists.")]
    AlreadyExists(SwiftCode),

    #[error("Cannot delete headquarter SWIFT code {code} while {count} branches exist.")]
    BranchesExist { code: SwiftCode, count: usize },

    #[error("Could not delete SWIFT code {0}.")]
    DeleteFailed(SwiftCode),

    /// Raised by a store when its primary key rejects a write.
    #[error("Duplicate key: {0}")]
    Duplicate(SwiftCode),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Coarse classification callers map onto their transport (HTTP status, exit code)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::InvalidCode(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AlreadyExists(_) | Error::BranchesExist { .. } | Error::Duplicate(_) => {
                ErrorKind::Conflict
            }
            Error::DeleteFailed(_) | Error::Storage(_) | Error::Io(_) | Error::Csv(_) => {
                ErrorKind::Internal
            }
        }
    }
}
