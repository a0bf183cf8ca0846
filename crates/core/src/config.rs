use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::stdlib::PythonVersion;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to build glob pattern: {0}")]
    GlobError(#[from] globset::Error),
    #[error("Failed to parse gitignore: {0}")]
    GitignoreError(#[from] ignore::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Whether guarded imports count toward dependency listings.
///
/// Guarded imports usually represent real optional dependencies, so both
/// toggles default to counting them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReportPolicy {
    /// Count imports under `try`/`except ImportError` blocks.
    pub count_try_guarded: bool,
    /// Count imports under `if TYPE_CHECKING:` blocks.
    pub count_type_checking: bool,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            count_try_guarded: true,
            count_type_checking: true,
        }
    }
}

/// Configuration for scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root paths to scan: directories walked recursively, files taken
    /// as-is.
    pub roots: Vec<PathBuf>,
    /// Additional ignore patterns (glob style).
    pub ignore_patterns: Vec<String>,
    /// Custom ignore file path (defaults to the root's .gitignore).
    pub ignore_file: Option<PathBuf>,
    /// Include virtualenvs / vendored trees in the scan.
    pub include_deps: bool,
    /// Number of threads (0 = auto, 1 = sequential).
    pub threads: usize,
    /// Python release the stdlib table is built for.
    pub python_version: PythonVersion,
    /// Guarded-import counting policy.
    pub policy: ReportPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            ignore_patterns: vec![],
            ignore_file: None,
            include_deps: false,
            threads: 0,
            python_version: PythonVersion::default(),
            policy: ReportPolicy::default(),
        }
    }
}

impl ScanConfig {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_ignore_file(mut self, path: PathBuf) -> Self {
        self.ignore_file = Some(path);
        self
    }

    pub fn with_include_deps(mut self, include: bool) -> Self {
        self.include_deps = include;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_python_version(mut self, version: PythonVersion) -> Self {
        self.python_version = version;
        self
    }

    pub fn with_policy(mut self, policy: ReportPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Filter for ignoring files and directories during location.
pub struct IgnoreFilter {
    gitignores: Vec<Gitignore>,
    custom_globs: GlobSet,
    default_ignores: GlobSet,
}

impl IgnoreFilter {
    pub fn new(config: &ScanConfig) -> Result<Self, ConfigError> {
        // An explicit ignore file replaces gitignore discovery; otherwise
        // each root contributes its own .gitignore, anchored at that root.
        let mut gitignores = Vec::new();
        if let Some(ref ignore_file) = config.ignore_file {
            let base = config
                .roots
                .first()
                .cloned()
                .unwrap_or_else(|| PathBuf::from("."));
            let mut builder = GitignoreBuilder::new(&base);
            builder.add(ignore_file);
            gitignores.push(builder.build()?);
        } else {
            for root in &config.roots {
                let gitignore_path = root.join(".gitignore");
                if gitignore_path.exists() {
                    let mut builder = GitignoreBuilder::new(root);
                    builder.add(&gitignore_path);
                    gitignores.push(builder.build()?);
                }
            }
        }

        // Build custom ignore globs
        let mut custom_builder = GlobSetBuilder::new();
        for pattern in &config.ignore_patterns {
            custom_builder.add(Glob::new(pattern)?);
        }
        let custom_globs = custom_builder.build()?;

        // Default ignores (unless include_deps is true)
        let mut default_builder = GlobSetBuilder::new();
        if !config.include_deps {
            default_builder.add(Glob::new("**/.venv/**")?);
            default_builder.add(Glob::new("**/venv/**")?);
            default_builder.add(Glob::new("**/__pycache__/**")?);
            default_builder.add(Glob::new("**/node_modules/**")?);
            default_builder.add(Glob::new("**/dist/**")?);
            default_builder.add(Glob::new("**/build/**")?);
            default_builder.add(Glob::new("**/.git/**")?);
            default_builder.add(Glob::new("**/.tox/**")?);
            default_builder.add(Glob::new("**/.mypy_cache/**")?);
            default_builder.add(Glob::new("**/*.egg-info/**")?);
        }
        let default_ignores = default_builder.build()?;

        Ok(Self {
            gitignores,
            custom_globs,
            default_ignores,
        })
    }

    /// Check if a path should be ignored.
    pub fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        let path_str = path.to_string_lossy();

        if self.default_ignores.is_match(&*path_str) {
            return true;
        }

        if self.custom_globs.is_match(&*path_str) {
            return true;
        }

        self.gitignores
            .iter()
            .any(|gi| gi.matched(path, is_dir).is_ignore())
    }
}
