//! Local file source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use lengua_core::error::LoadError;

use crate::source::ItemSource;

/// Reads a data file from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ItemSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<String, LoadError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::Unreachable(format!("{} does not exist", self.path.display()))
            } else {
                LoadError::Io(format!("{}: {e}", self.path.display()))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bv.json");
        std::fs::write(&path, r#"[{"pattern": "_aca", "missing": "v"}]"#).unwrap();

        let source = FileSource::new(&path);
        let body = source.fetch().await.unwrap();
        assert!(body.contains("_aca"));
        assert!(source.location().ends_with("bv.json"));
    }

    #[tokio::test]
    async fn missing_file_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("nope.json"));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, LoadError::Unreachable(_)));
    }
}
