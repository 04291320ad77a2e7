//! # Testforge-RS: Concurrent Test Scaffold Generator
//!
//! Reads C# source files, extracts their public surface and writes one
//! NUnit/Moq test scaffold per file:
//!
//! - **Extraction**: namespaces, classes, public methods and constructors
//! - **Generation**: fixture fields, mocked dependencies, a setup method
//!   and one stub test per public method
//! - **Persistence**: collision-free file names under concurrent writes
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        API Layer                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Core         │  Language   │  Generate    │  I/O           │
//! │ • Model       │ • Tree      │ • Defaults   │ • Loader       │
//! │ • Extraction  │ • C#        │ • Naming     │ • Writer       │
//! │ • Pipeline    │ • Registry  │ • Scaffold   │                │
//! │ • Config      │             │              │                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use testforge::{TestforgeConfig, TestforgeEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TestforgeConfig::default().with_output_directory("tests/generated");
//!     let engine = TestforgeEngine::new(config)?;
//!
//!     let report = engine.run(vec!["src/MyClass.cs".into()]).await?;
//!     println!("{} scaffolds written", report.written.len());
//!     Ok(())
//! }
//! ```

#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core model, extraction and pipeline
pub mod core {
    //! Core data model, extraction and the staged pipeline.

    pub mod config;
    pub mod errors;
    pub mod extraction;
    pub mod model;
    pub mod pipeline;
}

// Language-specific parsing
pub mod lang {
    //! Source parsing into declaration trees.

    pub mod common;
    pub mod csharp;
    pub mod registry;
}

// Scaffold text generation
pub mod generate {
    //! NUnit/Moq scaffold generation.

    pub mod defaults;
    pub mod naming;
    pub mod scaffold;
    pub mod templates;
}

// Reading sources and writing artifacts
pub mod io {
    //! Source loading and artifact persistence.

    pub mod loader;
    pub mod writer;
}

// Public API and engine interface
pub mod api {
    //! High-level engine interface.

    pub mod engine;
}

// Re-export primary types for convenience
pub use crate::api::engine::{RunReport, TestforgeEngine};
pub use crate::core::config::TestforgeConfig;
pub use crate::core::errors::{Result, ResultExt, TestforgeError};
pub use crate::core::model::{ClassInfo, GeneratedArtifact, MemberSignature, NamespaceInfo, SourceUnit};
pub use crate::core::pipeline::{ScaffoldPipeline, SourceDocument};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
