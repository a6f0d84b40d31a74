//! Discovery and loading of serialized source trees.
//!
//! Sources are `SourceTree` values serialized as JSON, one per file. Files
//! are discovered recursively and loaded in sorted path order so that
//! ordinals, and therefore diagnostics and model order, are deterministic.
//!
//! When a file `model.klass.json` has a sibling `model.klass`, the sibling's
//! text is registered in the [`SourceMap`] so diagnostics can show snippets.

use std::path::{Path, PathBuf};

use klass_ast::syntax::{Numbering, SpanMode};
use klass_ast::{SourceMap, SourceTree, UnitId};
use klass_resolve::CompilationUnit;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while discovering or reading sources.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to walk {dir}: {source}")]
    Walk {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse source tree {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no *{suffix} files found in {dir}")]
    NoSources { dir: PathBuf, suffix: String },
}

/// Units read from disk, with the source map their spans point into.
#[derive(Debug)]
pub struct LoadedSources {
    pub units: Vec<CompilationUnit>,
    pub sources: SourceMap,
}

/// Every file under `dir` whose name ends with `suffix`, sorted by path.
pub fn discover_sources(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, LoadError> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|source| LoadError::Walk {
            dir: dir.to_path_buf(),
            source,
        })?;
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix) && name.len() > suffix.len());
        if entry.file_type().is_file() && matches {
            paths.push(entry.into_path());
        }
    }

    // Ensure deterministic order
    paths.sort();

    if paths.is_empty() {
        return Err(LoadError::NoSources {
            dir: dir.to_path_buf(),
            suffix: suffix.to_string(),
        });
    }
    tracing::debug!(dir = %dir.display(), files = paths.len(), "discovered sources");
    Ok(paths)
}

/// Read and deserialize `paths`, one compilation unit per file.
///
/// `root` is stripped from the paths to form the units' source names.
pub fn load_sources(
    root: &Path,
    paths: &[PathBuf],
    suffix: &str,
) -> Result<LoadedSources, LoadError> {
    let mut sources = SourceMap::new();
    let mut units = Vec::with_capacity(paths.len());

    for (index, path) in paths.iter().enumerate() {
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?;
        let mut tree: SourceTree = serde_json::from_str(&json).map_err(|source| LoadError::Json {
            path: path.clone(),
            source,
        })?;

        let text_path = companion_text(path, suffix);
        let file_id = match text_path.as_deref().map(std::fs::read_to_string) {
            Some(Ok(text)) => sources.add_file(display_path(root, path), text),
            _ => sources.add_detached(display_path(root, path)),
        };
        Numbering::new(SpanMode::Retarget { file_id }).number_tree(&mut tree);

        let source_name = display_path(root, path).display().to_string();
        tracing::trace!(source = %source_name, elements = tree.elements.len(), "loaded tree");
        let id = UnitId(u32::try_from(index).unwrap_or(u32::MAX));
        units.push(CompilationUnit::from_source(id, source_name, tree));
    }

    Ok(LoadedSources { units, sources })
}

/// `model.klass` for `model.klass.json`, when it exists.
fn companion_text(path: &Path, suffix: &str) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(suffix)?;
    let text = path.with_file_name(format!("{stem}.klass"));
    (text != path && text.is_file()).then_some(text)
}

fn display_path(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use klass_ast::foundation::PrimitiveType;
    use klass_ast::syntax::builder::TreeBuilder;
    use std::fs;
    use tempfile::tempdir;

    fn write_tree(dir: &Path, name: &str, class: &str) {
        let tree = TreeBuilder::new("test")
            .class(class, |c| c.property("id", PrimitiveType::Long, |p| p.key()))
            .into_tree();
        fs::write(dir.join(name), serde_json::to_string(&tree).unwrap()).unwrap();
    }

    #[test]
    fn test_discovery_is_sorted_and_recursive() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        write_tree(dir.path(), "b.klass.json", "B");
        write_tree(&dir.path().join("nested"), "a.klass.json", "A");
        write_tree(dir.path(), "a.klass.json", "A2");
        fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let paths = discover_sources(dir.path(), ".klass.json").unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.klass.json"),
                PathBuf::from("b.klass.json"),
                PathBuf::from("nested/a.klass.json"),
            ]
        );
    }

    #[test]
    fn test_empty_directory_has_no_sources() {
        let dir = tempdir().unwrap();
        let result = discover_sources(dir.path(), ".klass.json");
        assert!(matches!(result, Err(LoadError::NoSources { .. })));
    }

    #[test]
    fn test_spans_point_at_their_file() {
        let dir = tempdir().unwrap();
        write_tree(dir.path(), "a.klass.json", "A");
        write_tree(dir.path(), "b.klass.json", "B");
        fs::write(dir.path().join("b.klass"), "package test\nclass B\n").unwrap();

        let paths = discover_sources(dir.path(), ".klass.json").unwrap();
        let loaded = load_sources(dir.path(), &paths, ".klass.json").unwrap();
        assert_eq!(loaded.units.len(), 2);
        assert_eq!(loaded.sources.file_count(), 2);

        let tree = loaded.units[1].source_tree().unwrap();
        assert_eq!(tree.package.span.file_id, 1);
        let file = loaded.sources.file(&tree.package.span).unwrap();
        assert!(file.has_text());
        assert_eq!(file.path, PathBuf::from("b.klass.json"));
        assert_eq!(loaded.units[0].source_name, "a.klass.json");
    }

    #[test]
    fn test_malformed_json_names_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.klass.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_sources(dir.path(), &[path.clone()], ".klass.json").unwrap_err();
        match err {
            LoadError::Json { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected a JSON error, got {other:?}"),
        }
    }
}
