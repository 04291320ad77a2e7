//! Error types for the testforge library.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are
//! local to the item that raised them: the pipeline records them per item
//! and keeps processing the rest of the batch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main result type for testforge operations.
pub type Result<T> = std::result::Result<T, TestforgeError>;

/// Error type for all testforge operations.
#[derive(Error, Debug)]
pub enum TestforgeError {
    /// I/O related errors outside of artifact writes (reading sources, config files)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// The external parser could not build a tree for the input
    #[error("Parse error in {language}: {message}")]
    Parse {
        /// Language being parsed
        language: String,
        /// Error description
        message: String,
        /// File path where error occurred
        file_path: Option<String>,
        /// Line number (1-based, if available)
        line: Option<usize>,
        /// Column number (1-based, if available)
        column: Option<usize>,
    },

    /// Scaffold generation errors
    #[error("Generation error: {message}")]
    Generation {
        /// Error description
        message: String,
    },

    /// Pipeline stage errors (faults, broken links)
    #[error("Pipeline error at stage '{stage}': {message}")]
    Pipeline {
        /// Pipeline stage where error occurred
        stage: String,
        /// Error description
        message: String,
    },

    /// No free collision suffix was found for an artifact
    #[error("No free output path for '{base_name}' in {} after {attempts} attempts", .directory.display())]
    PathExhausted {
        /// Output directory being probed
        directory: PathBuf,
        /// File stem before the collision suffix
        base_name: String,
        /// Number of candidate paths probed
        attempts: u32,
    },

    /// Writing an artifact to its reserved path failed
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Reserved path the write targeted
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Validation errors for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
        /// Additional context
        context: Option<String>,
    },

    /// Unsupported operation or feature
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Error description
        message: String,
    },
}

impl TestforgeError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error
    pub fn parse(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_path: None,
            line: None,
            column: None,
        }
    }

    /// Create a new parse error with a source position
    pub fn parse_at(
        language: impl Into<String>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_path: None,
            line: Some(line),
            column: Some(column),
        }
    }

    /// Create a new generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Create a new pipeline error
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a write error for a reserved path
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new unsupported error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Attach the file being processed to a parse error
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        if let Self::Parse { file_path, .. } = &mut self {
            *file_path = Some(path.into());
        }
        self
    }

    /// Add context to an existing error.
    ///
    /// I/O errors take the context as their message; internal errors keep
    /// it alongside theirs. Other variants are returned unchanged.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Io { message, .. } => *message = context.into(),
            Self::Internal { context: ctx, .. } => *ctx = Some(context.into()),
            _ => {}
        }
        self
    }
}

impl From<io::Error> for TestforgeError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_yaml::Error> for TestforgeError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config(format!("YAML serialization failed: {err}"))
    }
}

impl From<tokio::task::JoinError> for TestforgeError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("worker task failed: {err}"))
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TestforgeError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TestforgeError::config("Invalid configuration");
        assert!(matches!(err, TestforgeError::Config { .. }));

        let err = TestforgeError::parse("c_sharp", "Syntax error");
        assert!(matches!(err, TestforgeError::Parse { .. }));
    }

    #[test]
    fn test_parse_error_location() {
        let err = TestforgeError::parse_at("c_sharp", "unexpected token", 4, 9)
            .with_file_path("Calculator.cs");

        if let TestforgeError::Parse {
            language,
            file_path,
            line,
            column,
            ..
        } = err
        {
            assert_eq!(language, "c_sharp");
            assert_eq!(file_path.as_deref(), Some("Calculator.cs"));
            assert_eq!(line, Some(4));
            assert_eq!(column, Some(9));
        } else {
            panic!("Expected Parse error");
        }
    }

    #[test]
    fn test_with_context_internal_error() {
        let err = TestforgeError::internal("Something went wrong").with_context("During persist");

        if let TestforgeError::Internal { context, .. } = err {
            assert_eq!(context, Some("During persist".to_string()));
        } else {
            panic!("Expected Internal error");
        }
    }

    #[test]
    fn test_with_context_non_contextual_error() {
        let err = TestforgeError::config("Bad config").with_context("Should not change");

        if let TestforgeError::Config { message, .. } = err {
            assert_eq!(message, "Bad config");
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_result_extension() {
        let result: std::result::Result<i32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "File not found",
        ));

        let converted = result.context("Failed to read source file");
        match converted {
            Err(TestforgeError::Io { message, source }) => {
                assert_eq!(message, "Failed to read source file");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("Expected Io error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_error_context() {
        let joined = tokio::spawn(async { panic!("boom") }).await;

        let err = joined.context("worker").unwrap_err();
        if let TestforgeError::Internal { context, .. } = err {
            assert_eq!(context.as_deref(), Some("worker"));
        } else {
            panic!("Expected Internal error");
        }
    }

    #[test]
    fn test_path_exhausted_display() {
        let err = TestforgeError::PathExhausted {
            directory: PathBuf::from("out"),
            base_name: "MyClassTests".to_string(),
            attempts: 3,
        };
        let display = err.to_string();
        assert!(display.contains("MyClassTests"));
        assert!(display.contains("3 attempts"));
    }

    #[test]
    fn test_write_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let err = TestforgeError::write("out/MyClassTests.cs", io_err);

        if let TestforgeError::Write { path, source } = &err {
            assert_eq!(path, &PathBuf::from("out/MyClassTests.cs"));
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        } else {
            panic!("Expected Write error");
        }
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<i32>("invalid: yaml: content").unwrap_err();
        let err: TestforgeError = yaml_err.into();
        assert!(matches!(err, TestforgeError::Config { .. }));
    }
}
