//! Main scaffold generation engine.
//!
//! The engine owns configuration and a parser, and for every run wires a
//! fresh load → extract → generate → persist chain:
//!
//! ```text
//! paths ─▶ load ─▶ extract ─▶ (non-empty?) ─▶ generate ─▶ persist ─▶ files
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::config::TestforgeConfig;
use crate::core::errors::Result;
use crate::core::model::GeneratedArtifact;
use crate::core::pipeline::scaffold_pipeline::{ScaffoldPipeline, SourceDocument};
use crate::core::pipeline::stage::{ItemFailure, Stage, StageLink, StageOptions};
use crate::io::loader::{SourceLoader, LOAD_STAGE};
use crate::io::writer::{ArtifactWriter, PersistHandler, ProducedPaths, PERSIST_STAGE};
use crate::lang::common::SourceParser;
use crate::lang::registry::parser_for_language;

/// Outcome of one engine run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files written, in completion order
    pub written: Vec<PathBuf>,
    /// Items that failed in any stage
    pub failures: Vec<ItemFailure>,
    /// Inputs that declared no namespace and produced nothing
    pub dropped_empty: usize,
}

impl RunReport {
    /// True when no item failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Main testforge engine
///
/// Every run of one engine persists through the same [`ArtifactWriter`], so
/// overlapping runs share one path reservation.
pub struct TestforgeEngine {
    config: TestforgeConfig,
    parser: Arc<dyn SourceParser>,
    writer: Arc<ArtifactWriter>,
}

impl TestforgeEngine {
    /// Create an engine with the built-in C# parser
    pub fn new(config: TestforgeConfig) -> Result<Self> {
        config.validate()?;
        let parser = parser_for_language("cs", &config.extraction)?;
        Ok(Self::assemble(config, parser))
    }

    /// Create an engine around an explicit parser
    pub fn with_parser(config: TestforgeConfig, parser: Arc<dyn SourceParser>) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, parser))
    }

    fn assemble(config: TestforgeConfig, parser: Arc<dyn SourceParser>) -> Self {
        let writer = Arc::new(ArtifactWriter::new(config.output.clone()));
        info!(
            language = parser.language(),
            output = %writer.output_directory().display(),
            "Testforge engine initialized"
        );
        Self {
            config,
            parser,
            writer,
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &TestforgeConfig {
        &self.config
    }

    /// Generate scaffolds for source files
    pub async fn run(&self, paths: Vec<PathBuf>) -> Result<RunReport> {
        info!(inputs = paths.len(), "Starting scaffold generation");
        let chain = self.build_chain();

        let load = Stage::spawn(
            LOAD_STAGE,
            SourceLoader::new(),
            StageOptions::from_config(&self.config.pipeline),
            Some(StageLink::new(chain.pipeline.target())),
        );

        for path in paths {
            if !load.submit(path).await {
                warn!("Load stage stopped accepting input");
                break;
            }
        }
        load.complete();
        load.completion().await?;

        let mut report = chain.finish().await?;
        let mut failures = load.failures().take();
        failures.append(&mut report.failures);
        report.failures = failures;
        Ok(report)
    }

    /// Generate scaffolds for in-memory documents
    pub async fn run_documents(&self, documents: Vec<SourceDocument>) -> Result<RunReport> {
        let chain = self.build_chain();

        for document in documents {
            if !chain.pipeline.submit_document(document).await {
                warn!("Pipeline stopped accepting input");
                break;
            }
        }
        chain.pipeline.complete();

        chain.finish().await
    }

    fn build_chain(&self) -> Chain {
        let options = StageOptions::from_config(&self.config.pipeline);
        let produced = ProducedPaths::new();

        let persist = Stage::spawn(
            PERSIST_STAGE,
            PersistHandler::new(Arc::clone(&self.writer), produced.clone()),
            options,
            None,
        );
        let pipeline =
            ScaffoldPipeline::with_parser(&self.config, Arc::clone(&self.parser), persist.target());

        Chain {
            pipeline,
            persist,
            produced,
        }
    }
}

/// One run's stages downstream of loading
struct Chain {
    pipeline: ScaffoldPipeline,
    persist: Stage<GeneratedArtifact>,
    produced: ProducedPaths,
}

impl Chain {
    async fn finish(self) -> Result<RunReport> {
        self.pipeline.completion().await?;
        self.persist.completion().await?;

        let mut failures = self.pipeline.take_failures();
        failures.extend(self.persist.failures().take());

        let report = RunReport {
            written: self.produced.snapshot(),
            failures,
            dropped_empty: self.pipeline.dropped_empty(),
        };

        info!(
            written = report.written.len(),
            failed = report.failures.len(),
            dropped_empty = report.dropped_empty,
            "Scaffold generation completed"
        );
        Ok(report)
    }
}
