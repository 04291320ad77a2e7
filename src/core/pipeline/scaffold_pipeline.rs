//! Extract → filter → generate pipeline.
//!
//! Raw source text enters the extract stage, which parses it and builds a
//! [`SourceUnit`]. Units without namespaces are dropped by the link into the
//! generate stage. Generated artifacts are forwarded to the target supplied
//! by the caller, typically a persist stage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::stage::{
    FailureLog, ItemFailure, Stage, StageHandler, StageLink, StageOptions, StageTarget,
};
use crate::core::config::TestforgeConfig;
use crate::core::errors::{Result, ResultExt};
use crate::core::extraction::StructuralExtractor;
use crate::core::model::{GeneratedArtifact, SourceUnit};
use crate::generate::scaffold::ScaffoldGenerator;
use crate::lang::common::SourceParser;
use crate::lang::registry::parser_for_language;

/// Stage names, as they appear in failures and logs
pub const EXTRACT_STAGE: &str = "extract";
pub const GENERATE_STAGE: &str = "generate";

/// One input document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Where the text came from (file path or a generated label)
    pub origin: String,
    /// Full source text
    pub text: String,
}

impl SourceDocument {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }
}

/// A unit on its way from extraction to generation
#[derive(Debug, Clone)]
pub struct ExtractedUnit {
    pub origin: String,
    pub unit: SourceUnit,
}

struct ExtractHandler {
    parser: Arc<dyn SourceParser>,
    extractor: StructuralExtractor,
}

#[async_trait]
impl StageHandler for ExtractHandler {
    type Input = SourceDocument;
    type Output = ExtractedUnit;

    fn describe(&self, input: &SourceDocument) -> String {
        input.origin.clone()
    }

    async fn process(&self, input: SourceDocument) -> Result<Option<ExtractedUnit>> {
        let parser = Arc::clone(&self.parser);
        let extractor = self.extractor.clone();
        let SourceDocument { origin, text } = input;
        let file_path = origin.clone();

        // Parsing and extraction are CPU-bound
        let unit = tokio::task::spawn_blocking(move || -> Result<SourceUnit> {
            let tree = parser
                .parse(&text)
                .map_err(|err| err.with_file_path(file_path))?;
            Ok(extractor.extract(&tree))
        })
        .await
        .context("extract worker")??;

        debug!(%origin, namespaces = unit.namespaces.len(), "extracted");
        Ok(Some(ExtractedUnit { origin, unit }))
    }
}

struct GenerateHandler {
    generator: Arc<ScaffoldGenerator>,
}

#[async_trait]
impl StageHandler for GenerateHandler {
    type Input = ExtractedUnit;
    type Output = GeneratedArtifact;

    fn describe(&self, input: &ExtractedUnit) -> String {
        input.origin.clone()
    }

    async fn process(&self, input: ExtractedUnit) -> Result<Option<GeneratedArtifact>> {
        let generator = Arc::clone(&self.generator);
        let artifact = tokio::task::spawn_blocking(move || generator.generate(&input.unit))
            .await
            .context("generate worker")??;
        Ok(Some(artifact))
    }
}

/// Concurrent scaffold pipeline with a fixed extract → generate topology.
///
/// Must be created within a Tokio runtime. Each stage runs up to
/// `pipeline.max_parallelism` items at once.
pub struct ScaffoldPipeline {
    extract: Stage<SourceDocument>,
    generate: Stage<ExtractedUnit>,
    failures: FailureLog,
    dropped_empty: Arc<AtomicUsize>,
    next_label: AtomicUsize,
}

impl ScaffoldPipeline {
    /// Build a pipeline with the parser registered for C#
    pub fn new(config: &TestforgeConfig, output: StageTarget<GeneratedArtifact>) -> Result<Self> {
        let parser = parser_for_language("cs", &config.extraction)?;
        Ok(Self::with_parser(config, parser, output))
    }

    /// Build a pipeline around an explicit parser
    pub fn with_parser(
        config: &TestforgeConfig,
        parser: Arc<dyn SourceParser>,
        output: StageTarget<GeneratedArtifact>,
    ) -> Self {
        let failures = FailureLog::new();
        let options = StageOptions::from_config(&config.pipeline).with_failures(failures.clone());

        let generate = Stage::spawn(
            GENERATE_STAGE,
            GenerateHandler {
                generator: Arc::new(ScaffoldGenerator::with_config(config.generation.clone())),
            },
            options.clone(),
            Some(StageLink::new(output)),
        );

        let link = StageLink::filtered(generate.target(), |item: &ExtractedUnit| {
            !item.unit.is_empty()
        });
        let dropped_empty = link.dropped_counter();

        let extract = Stage::spawn(
            EXTRACT_STAGE,
            ExtractHandler {
                parser,
                extractor: StructuralExtractor::with_config(&config.extraction),
            },
            options,
            Some(link),
        );

        Self {
            extract,
            generate,
            failures,
            dropped_empty,
            next_label: AtomicUsize::new(0),
        }
    }

    /// Input handle, for linking an upstream stage
    pub fn target(&self) -> StageTarget<SourceDocument> {
        self.extract.target()
    }

    /// Queue raw source text, waiting for room in the extract queue.
    /// Returns `false` once the pipeline no longer accepts input.
    pub async fn submit(&self, text: impl Into<String>) -> bool {
        let document = SourceDocument::new(self.generated_label(), text);
        self.extract.submit(document).await
    }

    /// Queue a labelled document, waiting for room in the extract queue
    pub async fn submit_document(&self, document: SourceDocument) -> bool {
        self.extract.submit(document).await
    }

    /// Queue raw source text without waiting
    pub fn try_submit(&self, text: impl Into<String>) -> bool {
        let document = SourceDocument::new(self.generated_label(), text);
        self.extract.try_submit(document)
    }

    /// Signal that no more input will be submitted
    pub fn complete(&self) {
        self.extract.complete();
    }

    /// Fault the pipeline: new submissions are refused and completion
    /// resolves to an error once queued work settles
    pub fn fault(&self, reason: impl Into<String>) {
        self.extract.fault(reason);
    }

    /// Wait until every accepted item has left the generate stage
    pub async fn completion(&self) -> Result<()> {
        self.extract.completion().await?;
        self.generate.completion().await
    }

    /// Number of failures recorded so far
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Remove and return the recorded item failures
    pub fn take_failures(&self) -> Vec<ItemFailure> {
        self.failures.take()
    }

    /// Units dropped for having no namespace
    pub fn dropped_empty(&self) -> usize {
        self.dropped_empty.load(Ordering::Relaxed)
    }

    fn generated_label(&self) -> String {
        format!("input#{}", self.next_label.fetch_add(1, Ordering::Relaxed))
    }
}
