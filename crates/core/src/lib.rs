//! PyDepScan Core Library
//!
//! This library statically derives the third-party dependencies of a Python
//! source tree. It parses each file into a syntax tree, extracts every
//! import occurrence (including relative, try/except-guarded and
//! TYPE_CHECKING-guarded forms), and classifies each referenced module as
//! standard-library, local-to-project, third-party, or unresolved.
//!
//! # Features
//!
//! - Extract `import` and `from ... import` statements, aliases, wildcards
//!   and relative levels via tree-sitter
//! - Tag imports under `try`/`except ImportError` and `if TYPE_CHECKING:`
//!   blocks with their guard context
//! - Classify against a versioned standard-library table and an index of
//!   project-owned module names
//! - Aggregate into a deduplicated, deterministically sorted report with
//!   per-name evidence (files, lines, guard contexts)
//! - Output results in flat text, JSON, YAML or summary format
//!
//! # Example
//!
//! ```no_run
//! use pydepscan_core::{DependencyScanner, ScanConfig, OutputFormat, RenderOptions, format_output};
//! use std::path::PathBuf;
//!
//! let config = ScanConfig::new(vec![PathBuf::from(".")]);
//! let scanner = DependencyScanner::new(config).unwrap();
//! let report = scanner.scan().unwrap();
//!
//! let json = format_output(&report, OutputFormat::Json, &RenderOptions::default()).unwrap();
//! println!("{}", json);
//! ```

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod local_index;
pub mod models;
pub mod output;
pub mod parser;
pub mod scanner;
pub mod stdlib;

// Re-exports for convenience
pub use config::{ReportPolicy, ScanConfig};
pub use local_index::LocalModuleIndex;
pub use models::*;
pub use output::{format_output, format_summary, FormatError, OutputFormat, RenderOptions};
pub use parser::{ParserError, PythonImportParser};
pub use scanner::{DependencyScanner, ScanError};
pub use stdlib::{PythonVersion, StdlibTable};
