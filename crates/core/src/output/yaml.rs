use super::FormatError;
use crate::models::DependencyReport;

/// Serialize a DependencyReport to YAML.
pub fn to_yaml(report: &DependencyReport) -> Result<String, FormatError> {
    serde_yaml::to_string(report).map_err(FormatError::from)
}
