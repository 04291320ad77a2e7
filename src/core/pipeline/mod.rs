//! Scaffold Pipeline Module
//!
//! Concurrent staged processing for scaffold generation.
//!
//! ## Key Components
//!
//! - **Stage**: bounded queue plus a driver running a [`StageHandler`] on up
//!   to N items at once
//! - **StageLink**: forwards a stage's output to the next stage, optionally
//!   through a filter
//! - **ScaffoldPipeline**: the fixed extract → generate topology
//!
//! ## Usage
//!
//! ```ignore
//! use testforge::core::pipeline::ScaffoldPipeline;
//!
//! let pipeline = ScaffoldPipeline::new(&config, persist.target())?;
//! pipeline.submit(source_text).await;
//! pipeline.complete();
//! pipeline.completion().await?;
//! ```

pub use scaffold_pipeline::{
    ExtractedUnit, ScaffoldPipeline, SourceDocument, EXTRACT_STAGE, GENERATE_STAGE,
};
pub use stage::{
    FailureLog, Forwarded, ItemFailure, Stage, StageHandler, StageLink, StageOptions, StageState,
    StageTarget,
};

pub mod scaffold_pipeline;
pub mod stage;
