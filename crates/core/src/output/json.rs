use super::FormatError;
use crate::models::DependencyReport;

/// Serialize a DependencyReport to pretty-printed JSON.
pub fn to_json(report: &DependencyReport) -> Result<String, FormatError> {
    serde_json::to_string_pretty(report).map_err(FormatError::from)
}
