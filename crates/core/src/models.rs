use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::ReportPolicy;

/// Conditional construct an import occurs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardContext {
    /// Top-level import executed unconditionally.
    Unconditional,
    /// Inside a `try` block whose `except` clause catches ImportError.
    TryExceptGuarded,
    /// Inside an `if TYPE_CHECKING:` block.
    TypeCheckingGuarded,
}

impl Default for GuardContext {
    fn default() -> Self {
        GuardContext::Unconditional
    }
}

/// How a referenced module was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Module ships with the Python distribution.
    StandardLibrary,
    /// Module lives inside the scanned project roots.
    LocalProject,
    /// Externally installed package.
    ThirdParty,
    /// Relative import climbing above the project root, or otherwise
    /// unmappable reference.
    Unresolved,
}

/// One observed import occurrence, as extracted from the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Dotted module path. Empty for `from . import x` forms.
    pub module: String,
    /// Names brought into scope (`from m import a, b`). Empty for plain
    /// `import m` and for wildcard imports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// `from m import *`
    #[serde(default)]
    pub is_wildcard: bool,
    /// Alias if any (`import numpy as np`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Relative-import level: 0 = absolute, n = number of leading dots.
    #[serde(default)]
    pub level: usize,
    /// Import performed through a computed module name
    /// (`importlib.import_module(expr)`); the target is unknowable
    /// statically.
    #[serde(default)]
    pub is_dynamic: bool,
    /// Line number in source file (1-based).
    pub line: usize,
    /// Column position.
    pub column: usize,
    /// The conditional construct the import sits under.
    pub guard: GuardContext,
}

/// An import record together with its resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedImport {
    #[serde(flatten)]
    pub record: ImportRecord,
    pub classification: Classification,
    /// The top-level name the record resolves to (first dotted segment, or
    /// the resolved parent package for relative imports).
    pub top_level: String,
}

/// A successfully parsed source file and its classified imports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFile {
    /// Path relative to the owning project root.
    pub path: PathBuf,
    /// Absolute path.
    pub absolute_path: PathBuf,
    /// All imports in this file.
    pub imports: Vec<ClassifiedImport>,
}

/// Scan-level warning for a file that could not be analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Location evidence for one observation of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub file: PathBuf,
    pub line: usize,
}

/// One top-level name in the final report, with all evidence gathered
/// across the scanned files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEntry {
    /// Top-level module name (`numpy` for `numpy.linalg`).
    pub name: String,
    /// Union of classifications seen for this name.
    pub classifications: BTreeSet<Classification>,
    /// Union of guard contexts seen for this name.
    pub guards: BTreeSet<GuardContext>,
    /// Every file/line where the name was imported.
    pub occurrences: Vec<Occurrence>,
    /// Known distribution name when it differs from the import name
    /// (`opencv-python` for `cv2`), from the fixed lookup table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
}

impl DependencyEntry {
    pub fn is_third_party(&self) -> bool {
        self.classifications.contains(&Classification::ThirdParty)
            && !self.classifications.contains(&Classification::LocalProject)
    }

    /// True if at least one occurrence was not guarded at all.
    pub fn is_unconditional(&self) -> bool {
        self.guards.contains(&GuardContext::Unconditional)
    }

    /// Whether this entry counts toward a dependency listing under the
    /// given policy toggles.
    pub fn counted_under(&self, policy: &ReportPolicy) -> bool {
        if self.is_unconditional() {
            return true;
        }
        (policy.count_try_guarded && self.guards.contains(&GuardContext::TryExceptGuarded))
            || (policy.count_type_checking
                && self.guards.contains(&GuardContext::TypeCheckingGuarded))
    }
}

/// Per-classification import counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_files: usize,
    pub parsed_files: usize,
    pub failed_files: usize,
    pub total_imports: usize,
    pub stdlib_imports: usize,
    pub local_imports: usize,
    pub third_party_imports: usize,
    pub unresolved_imports: usize,
}

/// Scan metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub scan_duration_ms: u64,
    pub files_per_second: f64,
    pub timestamp: String,
    pub tool_version: String,
}

impl Default for ScanMetadata {
    fn default() -> Self {
        Self {
            scan_duration_ms: 0,
            files_per_second: 0.0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Outcome the presenter maps to a process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitCondition {
    Success,
    SuccessWithWarnings,
    /// Zero files were successfully parsed.
    Fatal,
}

/// Final output of a scan: deduplicated, sorted dependency entries plus
/// the warnings collected along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Scanned project root(s).
    pub roots: Vec<PathBuf>,
    /// Entries sorted case-insensitively by name, first-seen order on ties.
    pub entries: Vec<DependencyEntry>,
    /// Parse failures and other per-file problems.
    pub warnings: Vec<ScanWarning>,
    pub stats: ScanStats,
    pub metadata: ScanMetadata,
}

impl DependencyReport {
    /// Third-party entries that count under the given policy.
    pub fn third_party<'a>(&'a self, policy: &ReportPolicy) -> Vec<&'a DependencyEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_third_party() && e.counted_under(policy))
            .collect()
    }

    pub fn exit_condition(&self) -> ExitCondition {
        if self.stats.parsed_files == 0 {
            ExitCondition::Fatal
        } else if self.warnings.is_empty() {
            ExitCondition::Success
        } else {
            ExitCondition::SuccessWithWarnings
        }
    }
}
