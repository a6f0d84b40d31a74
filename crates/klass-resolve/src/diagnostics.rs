//! Accumulated diagnostics of one compilation.

use crate::error::{CompileError, ErrorKind, Severity};
use klass_ast::foundation::{Span, UnitId};

/// Ordered holder for every diagnostic reported during compilation.
///
/// Phases keep running after errors; the pipeline consults
/// [`Diagnostics::has_errors`] once, before assembly.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<CompileError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: CompileError) {
        tracing::trace!(
            code = diagnostic.kind.code(),
            severity = %diagnostic.severity,
            message = %diagnostic.message,
            "diagnostic"
        );
        self.entries.push(diagnostic);
    }

    /// Report an error, or a warning for `WRN_` kinds.
    pub fn report(&mut self, kind: ErrorKind, unit: UnitId, span: Span, message: String) {
        let diagnostic = if kind.is_warning() {
            CompileError::warning(kind, span, message)
        } else {
            CompileError::new(kind, span, message)
        };
        self.push(diagnostic.with_unit(unit));
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(CompileError::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompileError> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnostics in source order: by unit, then by position, then by the
    /// order they were reported.
    pub fn into_sorted(mut self) -> Vec<CompileError> {
        self.entries
            .sort_by_key(|d| (d.unit, d.span.file_id, d.span.start_line, d.span.start));
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_picks_severity_from_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(
            ErrorKind::UnreferencedPrivate,
            UnitId(0),
            Span::zero(0),
            "unused".to_string(),
        );
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.warning_count(), 1);

        diagnostics.report(ErrorKind::MissingKey, UnitId(0), Span::zero(0), "no key".to_string());
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[test]
    fn test_sorted_by_unit_then_line() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(ErrorKind::MissingKey, UnitId(1), Span::new(1, 0, 0, 1), "c".into());
        diagnostics.report(ErrorKind::MissingKey, UnitId(0), Span::new(0, 0, 0, 9), "b".into());
        diagnostics.report(ErrorKind::MissingKey, UnitId(0), Span::new(0, 0, 0, 2), "a".into());

        let messages: Vec<_> = diagnostics
            .into_sorted()
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }
}
