use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use walkdir::WalkDir;

use crate::aggregator::ReportBuilder;
use crate::classifier::ModuleClassifier;
use crate::config::{IgnoreFilter, ScanConfig};
use crate::local_index::LocalModuleIndex;
use crate::models::{ClassifiedImport, DependencyReport, ParsedFile, ScanMetadata};
use crate::parser::PythonImportParser;
use crate::stdlib::StdlibTable;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
    #[error("no Python files found under {0}")]
    NoFilesFound(String),
}

/// Outcome of analyzing one file. Failures are data, not errors: a bad
/// file never aborts the scan.
enum FileOutcome {
    Parsed(ParsedFile),
    Failed { path: PathBuf, message: String },
}

/// Main scanner: locates source files, builds the local-module index, then
/// extracts and classifies imports file by file.
pub struct DependencyScanner {
    config: ScanConfig,
    ignore_filter: IgnoreFilter,
}

impl DependencyScanner {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let ignore_filter = IgnoreFilter::new(&config)?;
        Ok(Self {
            config,
            ignore_filter,
        })
    }

    /// Scan the configured roots and produce the dependency report.
    pub fn scan(&self) -> Result<DependencyReport, ScanError> {
        let start = Instant::now();

        // 1. Locate candidate files. An empty set is a scan-wide failure:
        // a report over zero files is meaningless.
        let files = self.locate_files()?;
        if files.is_empty() {
            let roots = self
                .config
                .roots
                .iter()
                .map(|r| r.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ScanError::NoFilesFound(roots));
        }

        // 2. Build the immutable lookups. The local index needs the full
        // file set, so this is a barrier before any classification.
        let stdlib = StdlibTable::for_version(self.config.python_version);
        let index = LocalModuleIndex::build(&files);
        let classifier = ModuleClassifier::new(&stdlib, &index);

        // 3. Parse, extract and classify per file. Each file is an
        // independent computation over already-read text, so this runs in
        // parallel; collect() preserves locator order for the merge.
        let outcomes: Vec<FileOutcome> = if self.config.threads == 1 {
            files
                .iter()
                .map(|(abs, rel)| self.analyze_file(abs, rel, &classifier))
                .collect()
        } else {
            let pool = if self.config.threads > 0 {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.config.threads)
                    .build()
                    .ok()
            } else {
                None
            };

            match pool {
                Some(pool) => pool.install(|| {
                    files
                        .par_iter()
                        .map(|(abs, rel)| self.analyze_file(abs, rel, &classifier))
                        .collect()
                }),
                None => files
                    .par_iter()
                    .map(|(abs, rel)| self.analyze_file(abs, rel, &classifier))
                    .collect(),
            }
        };

        // 4. Merge in locator order so the tie-break is deterministic no
        // matter how the parallel work was scheduled.
        let mut builder = ReportBuilder::new(self.config.roots.clone());
        for outcome in outcomes {
            match outcome {
                FileOutcome::Parsed(file) => builder.merge_file(&file),
                FileOutcome::Failed { path, message } => builder.record_failure(path, message),
            }
        }

        let duration = start.elapsed();
        let file_count = files.len();
        let metadata = ScanMetadata {
            scan_duration_ms: duration.as_millis() as u64,
            files_per_second: if duration.as_secs_f64() > 0.0 {
                file_count as f64 / duration.as_secs_f64()
            } else {
                0.0
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        };

        Ok(builder.finish(metadata))
    }

    /// Locate candidate files under the configured roots as
    /// `(absolute, root-relative)` path pairs. Directory roots are walked
    /// recursively; file roots are taken as-is.
    fn locate_files(&self) -> Result<Vec<(PathBuf, PathBuf)>, ScanError> {
        let mut files = Vec::new();

        for root in &self.config.roots {
            if root.is_file() {
                let relative = root
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| root.clone());
                files.push((root.clone(), relative));
                continue;
            }

            for entry in WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();

                if entry.file_type().is_dir() {
                    continue;
                }

                if self.ignore_filter.should_ignore(path, false) {
                    continue;
                }

                if !is_python_source(path) {
                    continue;
                }

                let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
                files.push((path.to_path_buf(), relative));
            }
        }

        Ok(files)
    }

    /// Analyze a single source file: read, extract, classify.
    fn analyze_file(
        &self,
        absolute: &Path,
        relative: &Path,
        classifier: &ModuleClassifier<'_>,
    ) -> FileOutcome {
        let source = match fs::read_to_string(absolute) {
            Ok(source) => source,
            Err(e) => {
                return FileOutcome::Failed {
                    path: absolute.to_path_buf(),
                    message: format!("unreadable: {e}"),
                }
            }
        };

        // tree-sitter parsers are not shareable across threads; one per
        // file keeps the per-file work side-effect free.
        let mut parser = match PythonImportParser::new() {
            Ok(parser) => parser,
            Err(e) => {
                return FileOutcome::Failed {
                    path: absolute.to_path_buf(),
                    message: e.to_string(),
                }
            }
        };

        let records = match parser.parse(&source) {
            Ok(records) => records,
            Err(e) => {
                return FileOutcome::Failed {
                    path: absolute.to_path_buf(),
                    message: e.to_string(),
                }
            }
        };

        let imports = records
            .into_iter()
            .map(|record| {
                let (classification, top_level) = classifier.classify(&record, relative);
                ClassifiedImport {
                    record,
                    classification,
                    top_level,
                }
            })
            .collect();

        FileOutcome::Parsed(ParsedFile {
            path: relative.to_path_buf(),
            absolute_path: absolute.to_path_buf(),
            imports,
        })
    }
}

fn is_python_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("py") | Some("pyi")
    )
}
