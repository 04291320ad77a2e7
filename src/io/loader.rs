//! Source loading: input discovery and reading files into documents.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::errors::{Result, ResultExt, TestforgeError};
use crate::core::pipeline::scaffold_pipeline::SourceDocument;
use crate::core::pipeline::stage::StageHandler;
use crate::lang::registry::language_key_for_path;

/// Stage name used in failures and logs
pub const LOAD_STAGE: &str = "load";

/// Reads source files, tolerating invalid UTF-8
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceLoader;

impl SourceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read a file to text. Invalid UTF-8 is replaced rather than rejected.
    pub async fn load(&self, path: &Path) -> Result<SourceDocument> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    "File contained invalid UTF-8, converted with lossy encoding: {}",
                    path.display()
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };

        debug!(path = %path.display(), bytes = text.len(), "loaded source");
        Ok(SourceDocument::new(path.display().to_string(), text))
    }

    /// Expand inputs into the source files to process.
    ///
    /// Files are taken as given. Directories are walked recursively for
    /// files a registered parser understands, in sorted order.
    pub fn discover(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_file() {
                files.push(input.clone());
                continue;
            }

            if !input.is_dir() {
                return Err(TestforgeError::validation(format!(
                    "Input does not exist: {}",
                    input.display()
                )));
            }

            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(false)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(err) => {
                        warn!("Skipping unreadable entry: {}", err);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| language_key_for_path(path).is_some())
                .collect();
            found.sort();

            debug!(directory = %input.display(), files = found.len(), "discovered sources");
            files.extend(found);
        }

        Ok(files)
    }
}

#[async_trait]
impl StageHandler for SourceLoader {
    type Input = PathBuf;
    type Output = SourceDocument;

    fn describe(&self, input: &PathBuf) -> String {
        input.display().to_string()
    }

    async fn process(&self, input: PathBuf) -> Result<Option<SourceDocument>> {
        self.load(&input).await.map(Some)
    }
}
