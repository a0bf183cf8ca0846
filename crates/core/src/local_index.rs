use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Top-level module and package names owned by the scanned project.
///
/// Derived purely from filename and directory evidence under the project
/// roots: a root-level `utils.py` contributes `utils`, a root-level
/// `mypkg/` directory containing Python files contributes `mypkg`.
/// Built once, before any classification starts, from the complete set of
/// located files; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct LocalModuleIndex {
    names: HashSet<String>,
}

impl LocalModuleIndex {
    /// Build the index from `(absolute, root-relative)` path pairs as
    /// reported by the source locator.
    pub fn build(files: &[(PathBuf, PathBuf)]) -> Self {
        let mut names = HashSet::new();

        for (_, relative) in files {
            if let Some(name) = top_level_name(relative) {
                names.insert(name);
            }
        }

        Self { names }
    }

    pub fn contains(&self, top_level: &str) -> bool {
        self.names.contains(top_level)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// The project-owned top-level name a relative file path contributes:
/// the first directory component, or the file stem for root-level modules.
fn top_level_name(relative: &Path) -> Option<String> {
    let mut components = relative.components();
    let first = components.next()?;
    let first = first.as_os_str().to_string_lossy();

    if components.next().is_some() {
        // File nested in a directory: the directory is the package name.
        return Some(first.into_owned());
    }

    // Root-level module file: use the stem.
    let stem = relative.file_stem()?.to_string_lossy();
    if stem == "__init__" || stem == "__main__" {
        return None;
    }
    Some(stem.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(paths: &[&str]) -> LocalModuleIndex {
        let files: Vec<(PathBuf, PathBuf)> = paths
            .iter()
            .map(|p| (PathBuf::from("/project").join(p), PathBuf::from(p)))
            .collect();
        LocalModuleIndex::build(&files)
    }

    #[test]
    fn test_root_level_module() {
        let index = index(&["utils.py", "main.py"]);
        assert!(index.contains("utils"));
        assert!(index.contains("main"));
        assert!(!index.contains("numpy"));
    }

    #[test]
    fn test_package_directory() {
        let index = index(&["mypkg/__init__.py", "mypkg/core.py", "mypkg/sub/deep.py"]);
        assert!(index.contains("mypkg"));
        // Nested names are not top-level.
        assert!(!index.contains("core"));
        assert!(!index.contains("sub"));
    }

    #[test]
    fn test_dunder_stems_skipped_at_root() {
        let index = index(&["__init__.py", "__main__.py", "app.py"]);
        assert!(!index.contains("__init__"));
        assert!(!index.contains("__main__"));
        assert!(index.contains("app"));
    }
}
