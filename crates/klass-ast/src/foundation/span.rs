//! Source location tracking for diagnostics.
//!
//! Klass trees usually reach the compiler already parsed, so a registered
//! [`SourceFile`] may or may not carry the original text. Every lookup here
//! degrades gracefully when the text is missing: line numbers come from the
//! line cached on the [`Span`] and snippets are simply absent.
//!
//! # Examples
//!
//! ```
//! # use klass_ast::foundation::span::*;
//! # use std::path::PathBuf;
//! let mut map = SourceMap::new();
//! let file_id = map.add_file(PathBuf::from("model.klass"), "class Foo\n{\n}\n".to_string());
//! let span = Span::new(file_id, 6, 9, 1);
//!
//! assert_eq!(map.file_path(&span).and_then(|p| p.to_str()), Some("model.klass"));
//! assert_eq!(map.snippet(&span), Some("Foo"));
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Compact source location reference.
///
/// Points to a byte range in a source file with the start line cached, so
/// diagnostics can report a line even when the file text is not available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Index into [`SourceMap`] files
    pub file_id: u16,
    /// Byte offset of start position
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
    /// Cached 1-based line number of `start`
    pub start_line: u16,
}

impl Span {
    /// Create a new span.
    pub fn new(file_id: u16, start: u32, end: u32, start_line: u16) -> Self {
        Self {
            file_id,
            start,
            end,
            start_line,
        }
    }

    /// Create a zero-length span at the start of a file.
    pub fn zero(file_id: u16) -> Self {
        Self::new(file_id, 0, 0, 1)
    }

    /// Check if this span is zero-length.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Length in bytes; inverted spans count as empty.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

/// Collection of all source files in a compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

/// A single source file with line indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path or logical source name of this file
    pub path: PathBuf,
    /// Original source text, empty when only the parse tree is known
    pub source: String,
    /// Byte offsets of each line start, with an EOF sentinel
    pub line_starts: Vec<u32>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Add a source file and return its ID.
    ///
    /// Files beyond `u16::MAX` share the last id; compilations never get near
    /// that many files.
    pub fn add_file(&mut self, path: PathBuf, source: String) -> u16 {
        let file_id = u16::try_from(self.files.len()).unwrap_or(u16::MAX);
        self.files.push(SourceFile::new(path, source));
        file_id
    }

    /// Add a file that is known only by name.
    pub fn add_detached(&mut self, path: PathBuf) -> u16 {
        self.add_file(path, String::new())
    }

    /// Get the source file for a span.
    pub fn file(&self, span: &Span) -> Option<&SourceFile> {
        self.files.get(span.file_id as usize)
    }

    /// Get the file path for a span.
    pub fn file_path(&self, span: &Span) -> Option<&Path> {
        self.file(span).map(|file| file.path.as_path())
    }

    /// Get the source snippet for a span, if the text is known.
    pub fn snippet(&self, span: &Span) -> Option<&str> {
        self.file(span)?
            .source
            .get(span.start as usize..span.end as usize)
    }

    /// Get the 1-based (line, column) position for a span's start.
    ///
    /// Falls back to the cached line and column 1 when the text is missing.
    pub fn line_col(&self, span: &Span) -> (u32, u32) {
        self.file(span)
            .and_then(|file| file.line_col(span.start))
            .unwrap_or((u32::from(span.start_line), 1))
    }

    /// Get the number of files in this map.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl SourceFile {
    /// Create a new source file with precomputed line starts.
    pub fn new(path: PathBuf, source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        Self {
            path,
            source,
            line_starts,
        }
    }

    /// Whether the original text is available.
    pub fn has_text(&self) -> bool {
        !self.source.is_empty()
    }

    /// Get 1-based (line, column) for a byte offset inside the known text.
    pub fn line_col(&self, offset: u32) -> Option<(u32, u32)> {
        if !self.has_text() || offset as usize > self.source.len() {
            return None;
        }

        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.max(1) - 1,
        };
        let line = (line_idx + 1) as u32;
        let col = offset - self.line_starts[line_idx] + 1;
        Some((line, col))
    }

    /// Get the text of a specific line (1-based), without its newline.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 || line as usize >= self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[(line - 1) as usize] as usize;
        let end = self.line_starts[line as usize] as usize;
        self.source
            .get(start..end)
            .map(|text| text.trim_end_matches(['\n', '\r']))
    }
}

/// Byte offsets of line starts, terminated by an EOF sentinel.
fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }
    if line_starts.last() != Some(&(source.len() as u32)) {
        line_starts.push(source.len() as u32);
    }
    line_starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_creation() {
        let span = Span::new(0, 10, 20, 3);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert!(Span::zero(0).is_empty());
        assert_eq!(Span::new(0, 10, 5, 1).len(), 0);
    }

    #[test]
    fn test_compute_line_starts() {
        assert_eq!(compute_line_starts("a\nbb\nccc"), vec![0, 2, 5, 8]);
        assert_eq!(compute_line_starts("a\nbb\n"), vec![0, 2, 5]);
    }

    #[test]
    fn test_line_col_with_text() {
        let file = SourceFile::new(PathBuf::from("a.klass"), "class A\n{\n}\n".to_string());
        assert_eq!(file.line_col(0), Some((1, 1)));
        assert_eq!(file.line_col(8), Some((2, 1)));
        assert_eq!(file.line_text(1), Some("class A"));
        assert_eq!(file.line_text(9), None);
    }

    #[test]
    fn test_detached_file_falls_back_to_cached_line() {
        let mut map = SourceMap::new();
        let file_id = map.add_detached(PathBuf::from("tree.klass.json"));
        let span = Span::new(file_id, 40, 45, 7);

        assert_eq!(map.line_col(&span), (7, 1));
        assert_eq!(map.snippet(&span), None);
        assert_eq!(map.file_path(&span).and_then(|p| p.to_str()), Some("tree.klass.json"));
    }

    #[test]
    fn test_unknown_file_id() {
        let map = SourceMap::new();
        let span = Span::new(4, 0, 1, 2);
        assert!(map.file(&span).is_none());
        assert_eq!(map.line_col(&span), (2, 1));
    }
}
