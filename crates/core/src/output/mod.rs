mod flat;
mod json;
mod yaml;

pub use flat::to_flat;
pub use json::to_json;
pub use yaml::to_yaml;

use crate::config::ReportPolicy;
use crate::models::{DependencyReport, GuardContext};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The plain-text `# dependencies` / `# optional_dependencies` listing.
    Flat,
    Json,
    Yaml,
    Summary,
}

/// Presenter-facing rendering knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Guarded-import counting policy.
    pub policy: ReportPolicy,
    /// Flat listing also includes standard-library names.
    pub include_stdlib: bool,
}

/// Format a DependencyReport according to the specified format.
pub fn format_output(
    report: &DependencyReport,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<String, FormatError> {
    match format {
        OutputFormat::Flat => Ok(to_flat(report, options)),
        OutputFormat::Json => to_json(report),
        OutputFormat::Yaml => to_yaml(report),
        OutputFormat::Summary => Ok(format_summary(report, &options.policy)),
    }
}

/// Generate a human-readable summary.
pub fn format_summary(report: &DependencyReport, policy: &ReportPolicy) -> String {
    let mut output = String::new();

    let roots = report
        .roots
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    output.push_str(&format!(
        "Dependency Scan Summary\n\
         =======================\n\
         Roots: {}\n\n",
        roots
    ));

    output.push_str(&format!(
        "Files Scanned: {}\n\
         - parsed: {}\n\
         - failed: {}\n\n",
        report.stats.total_files, report.stats.parsed_files, report.stats.failed_files
    ));

    output.push_str(&format!(
        "Total Imports: {}\n\
         - standard library: {}\n\
         - local project: {}\n\
         - third party: {}\n\
         - unresolved: {}\n\n",
        report.stats.total_imports,
        report.stats.stdlib_imports,
        report.stats.local_imports,
        report.stats.third_party_imports,
        report.stats.unresolved_imports
    ));

    let third_party = report.third_party(policy);
    if !third_party.is_empty() {
        output.push_str("Third-Party Dependencies:\n");
        for entry in third_party {
            let mut line = format!("  {}", entry.name);
            if let Some(ref dist) = entry.distribution {
                line.push_str(&format!(" (distribution: {dist})"));
            }
            let mut tags = Vec::new();
            if entry.guards.contains(&GuardContext::TryExceptGuarded) {
                tags.push("try-guarded");
            }
            if entry.guards.contains(&GuardContext::TypeCheckingGuarded) {
                tags.push("type-checking");
            }
            if !entry.is_unconditional() && !tags.is_empty() {
                line.push_str(&format!(" [{}]", tags.join(", ")));
            }
            line.push_str(&format!(" ({} occurrences)", entry.occurrences.len()));
            output.push_str(&line);
            output.push('\n');
        }
        output.push('\n');
    }

    if !report.warnings.is_empty() {
        output.push_str("Warnings:\n");
        for warning in &report.warnings {
            output.push_str(&format!(
                "  {}: {}\n",
                warning.path.display(),
                warning.message
            ));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "Scan Duration: {}ms ({:.2} files/sec)\n\
         Timestamp: {}\n\
         Tool Version: {}\n",
        report.metadata.scan_duration_ms,
        report.metadata.files_per_second,
        report.metadata.timestamp,
        report.metadata.tool_version
    ));

    output
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
