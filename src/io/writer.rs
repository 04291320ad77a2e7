//! Artifact persistence with collision-free path reservation.
//!
//! Choosing a path and writing to it are separate steps. Reservation probes
//! candidate names under one lock shared by every writer of the directory;
//! the write itself runs outside that lock so writes stay concurrent. A path
//! handed out once is never handed out again, even if its write fails.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::core::config::OutputConfig;
use crate::core::errors::{Result, ResultExt, TestforgeError};
use crate::core::model::GeneratedArtifact;
use crate::core::pipeline::stage::StageHandler;

/// Stage name used in failures and logs
pub const PERSIST_STAGE: &str = "persist";

const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// A path reserved for exactly one artifact
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ReservedPath {
    path: PathBuf,
}

impl ReservedPath {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

/// Paths written so far, in completion order
#[derive(Debug, Clone, Default)]
pub struct ProducedPaths {
    paths: Arc<Mutex<Vec<PathBuf>>>,
}

impl ProducedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, path: PathBuf) {
        self.paths.lock().push(path);
    }

    /// Snapshot of every recorded path
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.paths.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }
}

/// Writes generated artifacts into one output directory
#[derive(Debug)]
pub struct ArtifactWriter {
    config: OutputConfig,
    reserved: Mutex<HashSet<PathBuf>>,
}

impl ArtifactWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            reserved: Mutex::new(HashSet::new()),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.config.directory
    }

    /// Candidate file name for a collision index; `None` is the plain name
    fn candidate(&self, name: &str, index: Option<u32>) -> PathBuf {
        let file_name = match index {
            None => format!("{name}{}.{}", self.config.file_suffix, self.config.extension),
            Some(n) => format!("{name}{}{n}.{}", self.config.file_suffix, self.config.extension),
        };
        self.config.directory.join(file_name)
    }

    /// Reserve the first free path for an artifact name.
    ///
    /// A candidate is free when it neither exists on disk nor was reserved
    /// earlier by this writer. Probing stats the filesystem, so async callers
    /// go through [`ArtifactWriter::persist`], which runs it on the blocking
    /// pool.
    pub fn reserve(&self, name: &str) -> Result<ReservedPath> {
        let mut reserved = self.reserved.lock();

        let mut attempts = 0u32;
        for index in collision_indices(self.config.max_collision_suffix) {
            attempts = attempts.saturating_add(1);
            let path = self.candidate(name, index);
            if reserved.contains(&path) || path.exists() {
                continue;
            }

            reserved.insert(path.clone());
            debug!(path = %path.display(), attempts, "reserved output path");
            return Ok(ReservedPath { path });
        }

        Err(TestforgeError::PathExhausted {
            directory: self.config.directory.clone(),
            base_name: format!("{name}{}", self.config.file_suffix),
            attempts,
        })
    }

    /// Write content to a reserved path, retrying transient failures on the
    /// same path
    pub async fn write(&self, reserved: &ReservedPath, content: &str) -> Result<()> {
        let attempts = self.config.write_attempts.max(1);
        let mut attempt = 1;
        loop {
            match tokio::fs::write(&reserved.path, content).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt < attempts => {
                    warn!(
                        path = %reserved.path.display(),
                        attempt,
                        error = %err,
                        "write failed, retrying"
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(TestforgeError::write(reserved.path.clone(), err)),
            }
        }
    }

    /// Reserve a path for the artifact, write it, and record it in `produced`
    pub async fn persist(
        self: &Arc<Self>,
        artifact: &GeneratedArtifact,
        produced: &ProducedPaths,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.config.directory)
            .await
            .map_err(|err| {
                TestforgeError::io(
                    format!(
                        "Failed to create output directory {}",
                        self.config.directory.display()
                    ),
                    err,
                )
            })?;

        let writer = Arc::clone(self);
        let name = artifact.name.clone();
        let reserved = tokio::task::spawn_blocking(move || writer.reserve(&name))
            .await
            .context("reserve worker")??;
        self.write(&reserved, &artifact.content).await?;

        let path = reserved.into_path();
        produced.push(path.clone());
        Ok(path)
    }
}

/// Collision indices in probe order: the plain name, then `0..=max`.
/// Without a cap the sequence ends at `u32::MAX`.
fn collision_indices(max: Option<u32>) -> impl DoubleEndedIterator<Item = Option<u32>> {
    std::iter::once(None).chain((0..=max.unwrap_or(u32::MAX)).map(Some))
}

/// Pipeline handler persisting every artifact it receives
#[derive(Debug, Clone)]
pub struct PersistHandler {
    writer: Arc<ArtifactWriter>,
    produced: ProducedPaths,
}

impl PersistHandler {
    pub fn new(writer: Arc<ArtifactWriter>, produced: ProducedPaths) -> Self {
        Self { writer, produced }
    }
}

#[async_trait]
impl StageHandler for PersistHandler {
    type Input = GeneratedArtifact;
    type Output = PathBuf;

    fn describe(&self, input: &GeneratedArtifact) -> String {
        input.name.clone()
    }

    async fn process(&self, input: GeneratedArtifact) -> Result<Option<PathBuf>> {
        self.writer.persist(&input, &self.produced).await.map(Some)
    }
}
