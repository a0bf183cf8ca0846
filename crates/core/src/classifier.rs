use std::path::Path;

use crate::local_index::LocalModuleIndex;
use crate::models::{Classification, ImportRecord};
use crate::stdlib::StdlibTable;

/// Maps one import record to a classification and a resolved top-level name.
///
/// Pure function of the record, the importing file's location, and two
/// immutable lookups built before classification starts: the versioned
/// standard-library table and the local-module index.
pub struct ModuleClassifier<'a> {
    stdlib: &'a StdlibTable,
    locals: &'a LocalModuleIndex,
}

impl<'a> ModuleClassifier<'a> {
    pub fn new(stdlib: &'a StdlibTable, locals: &'a LocalModuleIndex) -> Self {
        Self { stdlib, locals }
    }

    /// Classify a record extracted from the file at `file_relative` (path
    /// relative to the project root that owns the file).
    pub fn classify(
        &self,
        record: &ImportRecord,
        file_relative: &Path,
    ) -> (Classification, String) {
        if record.level > 0 {
            return self.classify_relative(record, file_relative);
        }

        // Computed module names are unknowable statically; flagged rather
        // than guessed at.
        if record.is_dynamic {
            return (Classification::Unresolved, String::new());
        }

        let top_level = match record.module.split('.').next() {
            Some(seg) if !seg.is_empty() => seg.to_string(),
            // Not well formed; never silently dropped.
            _ => return (Classification::ThirdParty, record.module.clone()),
        };

        // A project module shadowing a stdlib name resolves locally, so the
        // index is consulted before the stdlib table.
        if self.locals.contains(&top_level) {
            (Classification::LocalProject, top_level)
        } else if self.stdlib.contains(&top_level) {
            (Classification::StandardLibrary, top_level)
        } else {
            (Classification::ThirdParty, top_level)
        }
    }

    /// Resolve a relative import against the importing file's package
    /// location. Climbing past the project root is unresolvable.
    fn classify_relative(
        &self,
        record: &ImportRecord,
        file_relative: &Path,
    ) -> (Classification, String) {
        let package: Vec<String> = file_relative
            .parent()
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();

        // Level 1 targets the file's own package; every further dot climbs
        // one package up. A level exceeding the package depth escapes the
        // top-level package, which Python itself rejects.
        if record.level > package.len() {
            let name = fallback_name(record);
            return (Classification::Unresolved, name);
        }

        let hops = record.level - 1;
        let base = &package[..package.len() - hops];
        let top_level = base
            .first()
            .cloned()
            .unwrap_or_else(|| fallback_name(record));

        (Classification::LocalProject, top_level)
    }
}

/// Best-effort name for diagnostics when resolution fails: the module path's
/// first segment, or the first imported name for `from . import x` forms.
fn fallback_name(record: &ImportRecord) -> String {
    record
        .module
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| record.names.first().cloned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GuardContext;
    use std::path::PathBuf;

    fn record(module: &str, level: usize) -> ImportRecord {
        ImportRecord {
            module: module.to_string(),
            names: vec![],
            is_wildcard: false,
            alias: None,
            level,
            is_dynamic: false,
            line: 1,
            column: 0,
            guard: GuardContext::Unconditional,
        }
    }

    fn classifier_with_locals(locals: &[&str]) -> (StdlibTable, LocalModuleIndex) {
        let files: Vec<(PathBuf, PathBuf)> = locals
            .iter()
            .map(|n| {
                (
                    PathBuf::from("/p").join(n).join("__init__.py"),
                    PathBuf::from(n).join("__init__.py"),
                )
            })
            .collect();
        (StdlibTable::default(), LocalModuleIndex::build(&files))
    }

    #[test]
    fn test_stdlib_classification() {
        let (stdlib, locals) = classifier_with_locals(&[]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        let (cls, top) = classifier.classify(&record("os.path", 0), Path::new("main.py"));
        assert_eq!(cls, Classification::StandardLibrary);
        assert_eq!(top, "os");
    }

    #[test]
    fn test_third_party_classification() {
        let (stdlib, locals) = classifier_with_locals(&[]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        let (cls, top) = classifier.classify(&record("numpy.linalg", 0), Path::new("main.py"));
        assert_eq!(cls, Classification::ThirdParty);
        assert_eq!(top, "numpy");
    }

    #[test]
    fn test_local_classification() {
        let (stdlib, locals) = classifier_with_locals(&["mypkg"]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        let (cls, top) = classifier.classify(&record("mypkg.core", 0), Path::new("main.py"));
        assert_eq!(cls, Classification::LocalProject);
        assert_eq!(top, "mypkg");
    }

    #[test]
    fn test_local_shadows_stdlib() {
        // A project package named `json` wins over the stdlib module.
        let (stdlib, locals) = classifier_with_locals(&["json"]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        let (cls, _) = classifier.classify(&record("json", 0), Path::new("main.py"));
        assert_eq!(cls, Classification::LocalProject);
    }

    #[test]
    fn test_relative_resolves_to_local() {
        let (stdlib, locals) = classifier_with_locals(&["mypkg"]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        // from .sibling import thing, inside mypkg/mod.py
        let (cls, top) =
            classifier.classify(&record("sibling", 1), Path::new("mypkg/mod.py"));
        assert_eq!(cls, Classification::LocalProject);
        assert_eq!(top, "mypkg");
    }

    #[test]
    fn test_relative_two_levels() {
        let (stdlib, locals) = classifier_with_locals(&["mypkg"]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        // from ..config import x, inside mypkg/sub/mod.py
        let (cls, top) =
            classifier.classify(&record("config", 2), Path::new("mypkg/sub/mod.py"));
        assert_eq!(cls, Classification::LocalProject);
        assert_eq!(top, "mypkg");
    }

    #[test]
    fn test_relative_in_root_level_file_unresolved() {
        let (stdlib, locals) = classifier_with_locals(&[]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        // from . import sibling, in a root-level file: there is no parent
        // package to resolve against.
        let mut rec = record("", 1);
        rec.names = vec!["sibling".to_string()];
        let (cls, top) = classifier.classify(&rec, Path::new("main.py"));
        assert_eq!(cls, Classification::Unresolved);
        assert_eq!(top, "sibling");
    }

    #[test]
    fn test_relative_one_dot_past_package_depth_unresolved() {
        let (stdlib, locals) = classifier_with_locals(&["mypkg"]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        // from ..escape import thing inside mypkg/mod.py: one hop escapes
        // the top-level package.
        let (cls, top) =
            classifier.classify(&record("escape", 2), Path::new("mypkg/mod.py"));
        assert_eq!(cls, Classification::Unresolved);
        assert_eq!(top, "escape");
    }

    #[test]
    fn test_relative_climbing_past_root_unresolved() {
        let (stdlib, locals) = classifier_with_locals(&["mypkg"]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        // from ...x import y inside mypkg/mod.py: two hops, one package deep.
        let (cls, top) = classifier.classify(&record("x", 3), Path::new("mypkg/mod.py"));
        assert_eq!(cls, Classification::Unresolved);
        assert_eq!(top, "x");
    }

    #[test]
    fn test_dynamic_import_unresolved() {
        let (stdlib, locals) = classifier_with_locals(&[]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        let mut rec = record("", 0);
        rec.is_dynamic = true;
        let (cls, _) = classifier.classify(&rec, Path::new("main.py"));
        assert_eq!(cls, Classification::Unresolved);
    }

    #[test]
    fn test_malformed_module_defaults_third_party() {
        let (stdlib, locals) = classifier_with_locals(&[]);
        let classifier = ModuleClassifier::new(&stdlib, &locals);

        let (cls, _) = classifier.classify(&record("", 0), Path::new("main.py"));
        assert_eq!(cls, Classification::ThirdParty);
    }
}
