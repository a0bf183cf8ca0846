use super::RenderOptions;
use crate::models::{Classification, DependencyReport};

/// Render the plain-text listing: a `# dependencies` section for names
/// imported unconditionally somewhere, then `# optional_dependencies` for
/// names seen only under guards (subject to the counting policy).
pub fn to_flat(report: &DependencyReport, options: &RenderOptions) -> String {
    let counts = |unconditional: bool| -> Vec<&str> {
        report
            .entries
            .iter()
            .filter(|e| {
                let listed = e.is_third_party()
                    || (options.include_stdlib
                        && e.classifications.contains(&Classification::StandardLibrary));
                listed
                    && e.is_unconditional() == unconditional
                    && e.counted_under(&options.policy)
            })
            .map(|e| e.name.as_str())
            .collect()
    };

    let mut lines = vec!["# dependencies".to_string()];
    lines.extend(counts(true).into_iter().map(String::from));
    lines.push(String::new());
    lines.push("# optional_dependencies".to_string());
    lines.extend(counts(false).into_iter().map(String::from));

    lines.join("\n")
}
