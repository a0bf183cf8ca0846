//! End-to-end scans over on-disk source trees.

use pydepscan_core::{
    Classification, DependencyScanner, GuardContext, ReportPolicy, ScanConfig,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn scan(dir: &TempDir) -> pydepscan_core::DependencyReport {
    scan_with(dir, ScanConfig::new(vec![dir.path().to_path_buf()]))
}

fn scan_with(dir: &TempDir, mut config: ScanConfig) -> pydepscan_core::DependencyReport {
    config.roots = vec![dir.path().to_path_buf()];
    DependencyScanner::new(config).unwrap().scan().unwrap()
}

fn third_party_names(report: &pydepscan_core::DependencyReport) -> Vec<String> {
    report
        .third_party(&ReportPolicy::default())
        .iter()
        .map(|e| e.name.clone())
        .collect()
}

#[test]
fn stdlib_only_files_yield_empty_third_party_set() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.py", "import os\nimport sys\nfrom json import loads\n");

    let report = scan(&dir);
    assert!(third_party_names(&report).is_empty());
    assert_eq!(report.stats.stdlib_imports, 3);
}

#[test]
fn single_numpy_import_reported() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.py", "import numpy\n");

    let report = scan(&dir);
    assert_eq!(third_party_names(&report), vec!["numpy".to_string()]);
}

#[test]
fn relative_sibling_import_is_local_not_third_party() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mypkg/__init__.py", "");
    write(dir.path(), "mypkg/sibling.py", "VALUE = 1\n");
    write(dir.path(), "mypkg/consumer.py", "from .sibling import VALUE\n");

    let report = scan(&dir);
    assert!(third_party_names(&report).is_empty());
    let entry = report.entries.iter().find(|e| e.name == "mypkg").unwrap();
    assert!(entry.classifications.contains(&Classification::LocalProject));
    assert!(!entry.classifications.contains(&Classification::ThirdParty));
}

#[test]
fn duplicate_imports_deduplicated_with_evidence() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.py", "import requests\n");
    write(dir.path(), "b.py", "import requests\n");

    let report = scan(&dir);
    assert_eq!(third_party_names(&report), vec!["requests".to_string()]);
    let entry = report.entries.iter().find(|e| e.name == "requests").unwrap();
    assert_eq!(entry.occurrences.len(), 2);
    let files: Vec<String> = entry
        .occurrences
        .iter()
        .map(|o| o.file.display().to_string())
        .collect();
    assert!(files.contains(&"a.py".to_string()));
    assert!(files.contains(&"b.py".to_string()));
}

#[test]
fn guarded_import_classified_identically_but_tagged() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "app.py",
        "try:\n    import lxml\nexcept ImportError:\n    lxml = None\n",
    );

    let report = scan(&dir);
    let entry = report.entries.iter().find(|e| e.name == "lxml").unwrap();
    assert!(entry.classifications.contains(&Classification::ThirdParty));
    assert!(entry.guards.contains(&GuardContext::TryExceptGuarded));

    // Counted under the default policy, excluded when the toggle is off.
    assert_eq!(third_party_names(&report), vec!["lxml".to_string()]);
    let ignore_guarded = ReportPolicy {
        count_try_guarded: false,
        ..Default::default()
    };
    assert!(report.third_party(&ignore_guarded).is_empty());
}

#[test]
fn excessive_relative_level_is_unresolved_not_a_crash() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mypkg/__init__.py", "");
    write(dir.path(), "mypkg/mod.py", "from ....deep import thing\n");

    let report = scan(&dir);
    assert_eq!(report.stats.unresolved_imports, 1);
    let entry = report.entries.iter().find(|e| e.name == "deep").unwrap();
    assert!(entry.classifications.contains(&Classification::Unresolved));
}

#[test]
fn relative_level_at_package_boundary_is_unresolved() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mypkg/__init__.py", "");
    // Two dots from a depth-one package already escape it.
    write(dir.path(), "mypkg/mod.py", "from ..escape import thing\n");

    let report = scan(&dir);
    assert_eq!(report.stats.unresolved_imports, 1);
    let entry = report.entries.iter().find(|e| e.name == "escape").unwrap();
    assert!(entry.classifications.contains(&Classification::Unresolved));
    assert!(!entry.classifications.contains(&Classification::LocalProject));
}

#[test]
fn ordering_is_deterministic_and_parallelism_independent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.py", "import Zope\nimport flask\n");
    write(dir.path(), "b.py", "import django\nimport NumPy\n");
    write(dir.path(), "c.py", "import yarl\nimport aiohttp\n");

    let sequential = scan_with(&dir, ScanConfig::default().with_threads(1));
    let parallel = scan_with(&dir, ScanConfig::default().with_threads(4));

    let names: Vec<&str> = sequential.entries.iter().map(|e| e.name.as_str()).collect();
    // Case-insensitive alphabetical, regardless of file-processing order.
    assert_eq!(
        names,
        vec!["aiohttp", "django", "flask", "NumPy", "yarl", "Zope"]
    );

    let parallel_names: Vec<&str> = parallel.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, parallel_names);
}

#[test]
fn broken_file_warns_without_aborting_scan() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.py", "def broken(:\n");
    write(dir.path(), "good.py", "import requests\n");

    let report = scan(&dir);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].path.ends_with("bad.py"));
    assert_eq!(third_party_names(&report), vec!["requests".to_string()]);
    assert_eq!(
        report.exit_condition(),
        pydepscan_core::ExitCondition::SuccessWithWarnings
    );
}

#[test]
fn local_package_shadows_external_name() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "requests/__init__.py", "");
    write(dir.path(), "app.py", "import requests\n");

    let report = scan(&dir);
    assert!(third_party_names(&report).is_empty());
    let entry = report.entries.iter().find(|e| e.name == "requests").unwrap();
    assert!(entry.classifications.contains(&Classification::LocalProject));
}

#[test]
fn type_checking_guard_tagged_and_policy_filtered() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "app.py",
        "from typing import TYPE_CHECKING\n\nif TYPE_CHECKING:\n    import pandas\n",
    );

    let report = scan(&dir);
    let entry = report.entries.iter().find(|e| e.name == "pandas").unwrap();
    assert!(entry.guards.contains(&GuardContext::TypeCheckingGuarded));
    assert_eq!(third_party_names(&report), vec!["pandas".to_string()]);

    let ignore_type_checking = ReportPolicy {
        count_type_checking: false,
        ..Default::default()
    };
    assert!(report.third_party(&ignore_type_checking).is_empty());
}

#[test]
fn scanning_a_single_file_root() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "script.py", "import yaml\n");

    let config = ScanConfig::new(vec![dir.path().join("script.py")]);
    let report = DependencyScanner::new(config).unwrap().scan().unwrap();

    assert_eq!(third_party_names(&report), vec!["yaml".to_string()]);
    let entry = report.entries.iter().find(|e| e.name == "yaml").unwrap();
    assert_eq!(entry.distribution.as_deref(), Some("PyYAML"));
}
