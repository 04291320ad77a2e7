//! Configuration types and management for testforge.
//!
//! Configuration is a tree of serde structs loaded from YAML. Every section
//! has a `validate` method and [`TestforgeConfig::validate`] checks them all
//! before a pipeline is built.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, ResultExt, TestforgeError};

/// Main configuration for the scaffold generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestforgeConfig {
    /// Pipeline scheduling and queueing
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Structural extraction rules
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Scaffold text generation
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Output placement and writing
    #[serde(default)]
    pub output: OutputConfig,
}

impl TestforgeConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        self.extraction.validate()?;
        self.generation.validate()?;
        self.output.validate()?;
        Ok(())
    }

    /// Builder-style override of the output directory
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output.directory = directory.into();
        self
    }

    /// Builder-style override of the worker count
    pub fn with_max_parallelism(mut self, workers: usize) -> Self {
        self.pipeline.max_parallelism = Some(workers);
        self
    }
}

/// Pipeline scheduling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Items each stage may process at once; `None` uses the hardware parallelism
    pub max_parallelism: Option<usize>,

    /// Capacity of each stage's input queue
    pub queue_capacity: usize,

    /// Whether queued items keep flowing after a stage is faulted
    pub drain_on_fault: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_parallelism: None,
            queue_capacity: 64,
            drain_on_fault: true,
        }
    }
}

impl PipelineConfig {
    /// Resolved worker count for each stage
    pub fn effective_parallelism(&self) -> usize {
        self.max_parallelism.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Validate pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_parallelism == Some(0) {
            return Err(TestforgeError::config_field(
                "max_parallelism must be greater than 0",
                "pipeline.max_parallelism",
            ));
        }

        if self.queue_capacity == 0 {
            return Err(TestforgeError::config_field(
                "queue_capacity must be greater than 0",
                "pipeline.queue_capacity",
            ));
        }

        Ok(())
    }
}

/// Which modifier decides whether a constructor is part of the public surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorVisibility {
    /// The constructor's own access modifier
    #[default]
    Declaration,
    /// The enclosing class's access modifier
    EnclosingClass,
}

/// Structural extraction configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Rule used to retain constructors
    #[serde(default)]
    pub constructor_visibility: ConstructorVisibility,

    /// Report a parse failure when the source contains syntax errors
    #[serde(default)]
    pub reject_syntax_errors: bool,
}

impl ExtractionConfig {
    /// Validate extraction configuration
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Scaffold generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Text prefixed once per nesting level
    pub indent: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Validate generation configuration
    pub fn validate(&self) -> Result<()> {
        if self.indent.is_empty() || !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(TestforgeError::config_field(
                "indent must be a non-empty run of spaces or tabs",
                "generation.indent",
            ));
        }
        Ok(())
    }
}

/// Output placement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving generated files
    pub directory: PathBuf,

    /// Extension of generated files, without the leading dot
    pub extension: String,

    /// Text appended to the artifact name before any collision suffix
    pub file_suffix: String,

    /// Highest collision suffix probed; `None` probes without limit
    pub max_collision_suffix: Option<u32>,

    /// Attempts made to write bytes to a reserved path
    pub write_attempts: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("tests/generated"),
            extension: "cs".to_string(),
            file_suffix: "Tests".to_string(),
            max_collision_suffix: Some(10_000),
            write_attempts: 3,
        }
    }
}

impl OutputConfig {
    /// Validate output configuration
    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(TestforgeError::config_field(
                format!(
                    "extension must be non-empty and given without a leading dot, got '{}'",
                    self.extension
                ),
                "output.extension",
            ));
        }

        if self.extension.contains(['/', '\\']) || self.file_suffix.contains(['/', '\\']) {
            return Err(TestforgeError::config_field(
                "extension and file_suffix must not contain path separators",
                "output",
            ));
        }

        if self.write_attempts == 0 {
            return Err(TestforgeError::config_field(
                "write_attempts must be at least 1",
                "output.write_attempts",
            ));
        }

        Ok(())
    }
}
