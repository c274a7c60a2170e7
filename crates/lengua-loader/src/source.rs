//! The source trait every data location implements.

use async_trait::async_trait;

use lengua_core::error::LoadError;

/// A place one category's data file is fetched from.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Human-readable location, used in diagnostics.
    fn location(&self) -> String;

    /// Fetch the raw file contents.
    async fn fetch(&self) -> Result<String, LoadError>;
}
