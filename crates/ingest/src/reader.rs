use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

use crate::document::{ContentType, RawDocument};

pub struct FileReader;

impl FileReader {
    pub async fn read_file(path: &Path) -> Result<RawDocument> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let bytes = fs::read(path)
            .await
            .context(format!("Failed to read file: {:?}", path))?;

        let content_type = ContentType::detect(None, &filename);
        tracing::debug!(filename = %filename, bytes = bytes.len(), ?content_type, "Read upload from disk");

        Ok(RawDocument::new(filename, content_type, bytes))
    }

    /// Every supported file directly inside `dir`, sorted by path.
    pub async fn read_directory(dir: &Path) -> Result<Vec<RawDocument>> {
        let mut paths = Vec::new();

        let mut entries = fs::read_dir(dir)
            .await
            .context(format!("Failed to read directory: {:?}", dir))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if path.is_file() && Self::is_supported(&path) {
                paths.push(path);
            }
        }

        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(Self::read_file(&path).await?);
        }

        Ok(documents)
    }

    fn is_supported(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("docx" | "txt" | "md")
        )
    }
}
