//! Type definitions for codetally

mod day;
mod error;

pub use day::*;
pub use error::*;

/// Store loading warning types
#[derive(Debug, Clone)]
pub enum StoreWarning {
    /// Failed to open or read the store file
    LoadFailed(String),
    /// Store file was corrupted (invalid JSON)
    Corrupted(String),
}

impl std::fmt::Display for StoreWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreWarning::LoadFailed(msg) | StoreWarning::Corrupted(msg) => f.write_str(msg),
        }
    }
}
