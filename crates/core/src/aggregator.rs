use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::models::{
    Classification, DependencyEntry, DependencyReport, Occurrence, ParsedFile, ScanMetadata,
    ScanStats, ScanWarning,
};
use crate::stdlib;

/// Merges per-file results into the final deduplicated report.
///
/// One merge per file's result set; merges are commutative up to the
/// first-seen tie-break, so the scanner feeds them in locator order to keep
/// the final enumeration deterministic under parallelism.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    roots: Vec<PathBuf>,
    entries: HashMap<String, DependencyEntry>,
    first_seen: HashMap<String, usize>,
    warnings: Vec<ScanWarning>,
    stats: ScanStats,
    next_rank: usize,
}

impl ReportBuilder {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    /// Merge one successfully parsed file.
    pub fn merge_file(&mut self, file: &ParsedFile) {
        self.stats.total_files += 1;
        self.stats.parsed_files += 1;

        for import in &file.imports {
            self.stats.total_imports += 1;
            match import.classification {
                Classification::StandardLibrary => self.stats.stdlib_imports += 1,
                Classification::LocalProject => self.stats.local_imports += 1,
                Classification::ThirdParty => self.stats.third_party_imports += 1,
                Classification::Unresolved => self.stats.unresolved_imports += 1,
            }

            if import.top_level.is_empty() {
                continue;
            }

            let entry = match self.entries.entry(import.top_level.clone()) {
                Entry::Vacant(vacant) => {
                    self.first_seen
                        .insert(import.top_level.clone(), self.next_rank);
                    self.next_rank += 1;
                    vacant.insert(DependencyEntry {
                        name: import.top_level.clone(),
                        classifications: Default::default(),
                        guards: Default::default(),
                        occurrences: vec![],
                        distribution: stdlib::distribution_name(&import.top_level)
                            .map(str::to_string),
                    })
                }
                Entry::Occupied(occupied) => occupied.into_mut(),
            };

            entry.classifications.insert(import.classification);
            entry.guards.insert(import.record.guard);
            entry.occurrences.push(Occurrence {
                file: file.path.clone(),
                line: import.record.line,
            });
        }
    }

    /// Record a file that could not be parsed. The scan continues; the
    /// failure surfaces as a report-level warning.
    pub fn record_failure(&mut self, path: PathBuf, message: String) {
        self.stats.total_files += 1;
        self.stats.failed_files += 1;
        self.warnings.push(ScanWarning { path, message });
    }

    /// Finalize into a report: case-insensitive lexicographic order, ties
    /// broken by first-seen order.
    pub fn finish(self, metadata: ScanMetadata) -> DependencyReport {
        let first_seen = self.first_seen;
        let mut entries: Vec<DependencyEntry> = self.entries.into_values().collect();
        entries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| {
                    let ra = first_seen.get(&a.name).copied().unwrap_or(usize::MAX);
                    let rb = first_seen.get(&b.name).copied().unwrap_or(usize::MAX);
                    ra.cmp(&rb)
                })
        });

        DependencyReport {
            roots: self.roots,
            entries,
            warnings: self.warnings,
            stats: self.stats,
            metadata,
        }
    }
}
