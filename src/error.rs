//! Load-time error types
//!
//! Nothing in the core is fatal: every failure here degrades to a
//! user-visible notice and an empty (inert) library or catalog.

use std::path::PathBuf;

use crate::host::Notice;

/// Errors raised while resolving bundled assets
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The asset could not be located at all
    #[error("{name} file not found")]
    Missing { name: String, path: PathBuf },

    /// The asset exists but could not be read
    #[error("Couldn't read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The asset was read but (part of) it failed to decode
    #[error("Couldn't load data: {detail}")]
    Decode { name: String, detail: String },
}

impl AssetError {
    /// Convert into the modal notice shown to the user
    pub fn to_notice(&self) -> Notice {
        Notice::new("Error", &self.to_string())
    }
}

/// Result type for asset loading
pub type AssetResult<T> = Result<T, AssetError>;
