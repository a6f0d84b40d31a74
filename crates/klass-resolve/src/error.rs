//! Compile-time error reporting and diagnostics.
//!
//! Semantic problems in Klass sources are reported as [`CompileError`]
//! diagnostics and accumulate across every phase. Violations of the
//! compiler's own invariants are [`InternalError`]s and abort compilation.
//!
//! # Design
//!
//! - `CompileError`: single diagnostic with primary and optional secondary spans
//! - `ErrorKind`: stable diagnostic code such as `ERR_CLS_KEY`
//! - `Severity`: error, warning, or note
//! - `DiagnosticFormatter`: formats diagnostics with source snippets
//!
//! # Examples
//!
//! ```
//! # use klass_resolve::error::*;
//! # use klass_ast::foundation::{Span, UnitId};
//! # let span = Span::new(0, 0, 5, 1);
//! let error = CompileError::new(
//!     ErrorKind::DuplicateTopLevel,
//!     span,
//!     "duplicate top level item name: 'Question'".to_string(),
//! )
//! .with_unit(UnitId(0));
//! assert_eq!(error.kind.code(), "ERR_DUP_TOP");
//! ```

use klass_ast::foundation::{ContextKey, SourceMap, Span, UnitId};
use std::fmt;

/// Compilation diagnostic with source location and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Category of this diagnostic
    pub kind: ErrorKind,
    /// Severity level
    pub severity: Severity,
    /// Primary source location
    pub span: Span,
    /// Compilation unit the span belongs to
    pub unit: Option<UnitId>,
    /// Primary message
    pub message: String,
    /// Additional labeled spans
    pub labels: Vec<Label>,
    /// Additional notes or hints
    pub notes: Vec<String>,
}

/// Stable diagnostic codes.
///
/// # Invariant
///
/// The discriminant values must match the ERROR_KIND_TABLE indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ErrorKind {
    // Top-level elements
    DuplicateTopLevel = 0,
    DuplicateUser = 1,

    // Class keys and versions
    MissingKey = 2,
    VersionAndVersioned = 3,
    DuplicateVersion = 4,
    KeysAndIds = 5,
    TransientId = 6,

    // Members and modifiers
    DuplicateMember = 7,
    DuplicateModifier = 8,
    DuplicateValidation = 9,

    // Interfaces and inheritance
    ImplementsNonInterface = 10,
    DuplicateInterface = 11,
    RedundantInterface = 12,
    ForwardReference = 13,
    CircularInheritance = 14,
    ExtendsNonClass = 15,

    // Type and member references
    UnresolvedType = 16,
    UnresolvedMemberType = 17,
    UnresolvedTypeMember = 18,
    UnresolvedThisMember = 19,
    UnresolvedHop = 20,

    // Temporal properties
    TemporalRangeType = 21,
    TemporalEndpointFamily = 22,
    TemporalInstantType = 23,
    TemporalFromAndTo = 24,

    // Audit, version and user-id properties
    AuditKey = 25,
    AuditDataType = 26,
    AuditUserId = 27,
    AuditPrivate = 28,
    VersionDataType = 29,
    UserIdDataType = 30,

    // Foreign keys
    ForeignKeyMultiplicity = 31,

    // Order-by
    ToOneOrderBy = 32,
    OrderByHop = 33,

    // Service groups and services
    UnresolvedServiceGroupType = 34,
    DuplicateUrl = 35,
    EmptyServiceGroup = 36,
    DuplicateServiceGroup = 37,
    DuplicateCriteria = 38,
    VerbCriteria = 39,
    UnresolvedVariable = 40,
    DuplicateParameter = 41,
    ServiceProjection = 42,

    // Projections
    DuplicateProjectionMember = 43,
    ProjectionEndNotFound = 44,
    ProjectionEndAmbiguous = 45,
    ProjectionReferenceClass = 46,
    ProjectionDataTypeProperty = 47,

    // Criteria operators
    InOperator = 48,

    // Names
    TopLevelName = 49,
    MemberName = 50,
    EndName = 51,
    PackageName = 52,

    // Enumerations
    DuplicateLiteral = 53,

    // Warnings
    UnreferencedPrivate = 54,
    CreatedByName = 55,
    LastUpdatedByName = 56,
    OptionalForeignKey = 57,
}

/// Code and human-readable name per error kind.
///
/// Index matches ErrorKind discriminant.
const ERROR_KIND_TABLE: &[(&str, &str)] = &[
    ("ERR_DUP_TOP", "duplicate top-level name"),       // 0
    ("ERR_DUP_USR", "duplicate user class"),           // 1
    ("ERR_CLS_KEY", "missing key"),                    // 2
    ("ERR_VER_VER", "version and versioned"),          // 3
    ("ERR_DUP_VER", "duplicate version"),              // 4
    ("ERR_KEY_IDS", "keys mixed with ids"),            // 5
    ("ERR_TNS_IDP", "id on transient class"),          // 6
    ("ERR_DUP_MEM", "duplicate member"),               // 7
    ("ERR_DUP_MOD", "duplicate modifier"),             // 8
    ("ERR_DUP_VAL", "duplicate validation"),           // 9
    ("ERR_IMP_INT", "implements non-interface"),       // 10
    ("ERR_DUP_INT", "duplicate interface"),            // 11
    ("ERR_RED_INT", "redundant interface"),            // 12
    ("ERR_FWD_REF", "forward reference"),              // 13
    ("ERR_CIR_INH", "circular inheritance"),           // 14
    ("ERR_EXT_INT", "extends non-class"),              // 15
    ("ERR_REF_TYP", "unresolved type"),                // 16
    ("ERR_MEM_TYP", "unresolved member type"),         // 17
    ("ERR_TYP_MEM", "unresolved type member"),         // 18
    ("ERR_THS_MEM", "unresolved this member"),         // 19
    ("ERR_HOP_END", "unresolved association end hop"), // 20
    ("ERR_TMP_RNG", "invalid temporal range"),         // 21
    ("ERR_TMP_SYS", "invalid temporal family"),        // 22
    ("ERR_TMP_INS", "invalid temporal instant"),       // 23
    ("ERR_TMP_FTO", "temporal from and to"),           // 24
    ("ERR_AUD_KEY", "audit property is key"),          // 25
    ("ERR_AUD_DTP", "invalid audit data type"),        // 26
    ("ERR_AUD_UID", "invalid user id usage"),          // 27
    ("ERR_AUD_PRI", "audit property not private"),     // 28
    ("ERR_VER_DTP", "invalid version data type"),      // 29
    ("ERR_USR_DTP", "invalid user id data type"),      // 30
    ("ERR_FOR_MUL", "foreign key multiplicity"),       // 31
    ("ERR_REF_ORD", "order-by on to-one end"),         // 32
    ("ERR_ORD_HOP", "order-by through hops"),          // 33
    ("ERR_SRG_TYP", "unresolved service group type"),  // 34
    ("ERR_DUP_URL", "duplicate url"),                  // 35
    ("ERR_SER_EMP", "empty service group"),            // 36
    ("ERR_DUP_SVC", "duplicate service group"),        // 37
    ("ERR_DUP_CRI", "duplicate service criteria"),     // 38
    ("ERR_VRB_CRT", "criteria not allowed for verb"),  // 39
    ("ERR_VAR_REF", "unresolved variable"),            // 40
    ("ERR_DUP_PAR", "duplicate parameter"),            // 41
    ("ERR_SVC_PRJ", "invalid service projection"),     // 42
    ("ERR_DUP_PRJ", "duplicate projection member"),    // 43
    ("ERR_PAE_NFD", "projection end not found"),       // 44
    ("ERR_PAE_AMB", "ambiguous projection end"),       // 45
    ("ERR_PRR_KLS", "projection reference class"),     // 46
    ("ERR_PRJ_DTP", "projection property not found"),  // 47
    ("ERR_OPR_IN", "invalid in operator"),             // 48
    ("ERR_TOP_NME", "invalid top-level name"),         // 49
    ("ERR_MEM_NME", "invalid member name"),            // 50
    ("ERR_END_NME", "invalid association end name"),   // 51
    ("ERR_PKG_NME", "invalid package name"),           // 52
    ("ERR_DUP_LIT", "duplicate enumeration literal"),  // 53
    ("WRN_PRV_UNR", "unreferenced private property"),  // 54
    ("WRN_CRT_NAM", "createdBy property name"),        // 55
    ("WRN_LUB_NAM", "lastUpdatedBy property name"),    // 56
    ("WRN_FOR_OPT", "optional foreign key end"),       // 57
];

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational note (not an error)
    Note,
    /// Warning (model is produced but suspicious)
    Warning,
    /// Error (no model is produced)
    Error,
}

/// Secondary labeled span in a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl CompileError {
    /// Creates a new error diagnostic.
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Error, span, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Warning, span, message)
    }

    /// Creates a new note diagnostic.
    pub fn note(kind: ErrorKind, span: Span, message: String) -> Self {
        Self::with_severity(kind, Severity::Note, span, message)
    }

    fn with_severity(kind: ErrorKind, severity: Severity, span: Span, message: String) -> Self {
        Self {
            kind,
            severity,
            span,
            unit: None,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Records the compilation unit that owns the primary span.
    pub fn with_unit(mut self, unit: UnitId) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Adds a secondary labeled span.
    pub fn with_label(mut self, span: Span, message: String) -> Self {
        self.labels.push(Label { span, message });
        self
    }

    /// Adds a note or hint.
    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl ErrorKind {
    /// Stable short code, e.g. `ERR_CLS_KEY`.
    pub fn code(self) -> &'static str {
        ERROR_KIND_TABLE[self as usize].0
    }

    /// Human-readable name for this error kind.
    pub fn name(self) -> &'static str {
        ERROR_KIND_TABLE[self as usize].1
    }

    /// Whether diagnostics of this kind are warnings by default.
    pub fn is_warning(self) -> bool {
        self.code().starts_with("WRN_")
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.kind.code(), self.message)
    }
}

impl std::error::Error for CompileError {}

/// Violation of a compiler invariant.
///
/// These never come from bad Klass sources. They abort compilation
/// immediately instead of accumulating.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternalError {
    #[error("parse context {0} registered twice")]
    DuplicateContext(ContextKey),

    #[error("no compiler state registered for parse context {0}")]
    UnknownContext(ContextKey),

    #[error("entered a {kind} walk while another {kind} walk is open")]
    ReentrantWalk { kind: &'static str },

    #[error("exited a {expected} walk but the innermost open walk is {found}")]
    UnbalancedWalk {
        expected: &'static str,
        found: &'static str,
    },

    #[error("macro expansion exceeded the maximum depth of {max}")]
    MacroDepthExceeded { max: u32 },

    #[error("no model index allocated for {what}")]
    MissingIndex { what: String },
}

/// Formats diagnostics with source code context.
///
/// # Examples
///
/// ```
/// # use klass_resolve::error::*;
/// # use klass_ast::foundation::{Span, SourceMap};
/// # use std::path::PathBuf;
/// let mut sources = SourceMap::new();
/// let file_id = sources.add_file(PathBuf::from("model.klass"), "class Foo\n{\n}\n".to_string());
/// let span = Span::new(file_id, 6, 9, 1);
///
/// let error = CompileError::new(
///     ErrorKind::MissingKey,
///     span,
///     "class 'Foo' must have at least one key property".to_string(),
/// );
///
/// let formatted = DiagnosticFormatter::new(&sources).format(&error);
/// assert!(formatted.contains("model.klass:1:7"));
/// ```
pub struct DiagnosticFormatter<'a> {
    sources: &'a SourceMap,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    /// Formats a diagnostic as a string with source context.
    pub fn format(&self, error: &CompileError) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}[{}]: {}\n",
            error.severity,
            error.kind.code(),
            error.message
        ));

        let (line, col) = self.sources.line_col(&error.span);
        output.push_str(&format!(
            "  --> {}:{}:{}\n",
            self.display_path(&error.span),
            line,
            col
        ));

        if let Some(source_line) = self
            .sources
            .file(&error.span)
            .and_then(|file| file.line_text(line))
        {
            output.push_str("   |\n");
            output.push_str(&format!("{:3} | {}\n", line, source_line));

            let start_col = col as usize;
            let end_col = (start_col + error.span.len() as usize).min(source_line.len() + 1);
            let underline = " ".repeat(start_col.saturating_sub(1))
                + &"^".repeat(end_col.saturating_sub(start_col).max(1));
            output.push_str(&format!("   | {}\n", underline));
        }

        for label in &error.labels {
            output.push_str(&format!("   = note: {}\n", label.message));
            let (label_line, label_col) = self.sources.line_col(&label.span);
            output.push_str(&format!(
                "     at {}:{}:{}\n",
                self.display_path(&label.span),
                label_line,
                label_col
            ));
        }

        for note in &error.notes {
            output.push_str(&format!("   = help: {}\n", note));
        }

        output
    }

    /// Formats multiple diagnostics, separated by blank lines.
    pub fn format_all(&self, errors: &[CompileError]) -> String {
        errors
            .iter()
            .map(|e| self.format(e))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn display_path(&self, span: &Span) -> String {
        self.sources
            .file_path(span)
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dummy_span() -> Span {
        Span::new(0, 0, 5, 1)
    }

    #[test]
    fn test_error_creation() {
        let err = CompileError::new(
            ErrorKind::DuplicateTopLevel,
            dummy_span(),
            "duplicate top level item name: 'Foo'".to_string(),
        );

        assert_eq!(err.kind, ErrorKind::DuplicateTopLevel);
        assert_eq!(err.severity, Severity::Error);
        assert!(err.unit.is_none());
        assert!(err.labels.is_empty());
        assert!(err.notes.is_empty());
    }

    #[test]
    fn test_warning_creation() {
        let warn = CompileError::warning(
            ErrorKind::UnreferencedPrivate,
            dummy_span(),
            "private property 'secret' is never referenced".to_string(),
        );
        assert_eq!(warn.severity, Severity::Warning);
        assert!(!warn.is_error());
    }

    #[test]
    fn test_error_chaining() {
        let err = CompileError::new(ErrorKind::DuplicateMember, dummy_span(), "dup".to_string())
            .with_unit(UnitId(3))
            .with_label(dummy_span(), "first defined here".to_string())
            .with_note("rename one of the members".to_string());

        assert_eq!(err.unit, Some(UnitId(3)));
        assert_eq!(err.labels.len(), 1);
        assert_eq!(err.notes.len(), 1);
    }

    #[test]
    fn test_table_matches_discriminants() {
        assert_eq!(ERROR_KIND_TABLE.len(), ErrorKind::OptionalForeignKey as usize + 1);
        assert_eq!(ErrorKind::DuplicateTopLevel.code(), "ERR_DUP_TOP");
        assert_eq!(ErrorKind::MissingKey.code(), "ERR_CLS_KEY");
        assert_eq!(ErrorKind::InOperator.code(), "ERR_OPR_IN");
        assert_eq!(ErrorKind::DuplicateLiteral.code(), "ERR_DUP_LIT");
        assert_eq!(ErrorKind::OptionalForeignKey.code(), "WRN_FOR_OPT");
    }

    #[test]
    fn test_only_wrn_codes_are_warnings() {
        assert!(ErrorKind::UnreferencedPrivate.is_warning());
        assert!(ErrorKind::CreatedByName.is_warning());
        assert!(!ErrorKind::ForeignKeyMultiplicity.is_warning());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Note < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_error_display() {
        let err = CompileError::new(
            ErrorKind::MissingKey,
            dummy_span(),
            "class 'Foo' must have at least one key property".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "error[ERR_CLS_KEY]: class 'Foo' must have at least one key property"
        );
    }

    #[test]
    fn test_formatter_with_source_text() {
        let mut sources = SourceMap::new();
        let file_id = sources.add_file(
            PathBuf::from("test.klass"),
            "class Foo\n{\n    id: Long;\n}\n".to_string(),
        );
        let err = CompileError::new(
            ErrorKind::MissingKey,
            Span::new(file_id, 6, 9, 1),
            "class 'Foo' must have at least one key property".to_string(),
        )
        .with_note("mark a property with 'key'".to_string());

        let formatted = DiagnosticFormatter::new(&sources).format(&err);
        assert!(formatted.contains("--> test.klass:1:7"));
        assert!(formatted.contains("  1 | class Foo"));
        assert!(formatted.contains("^^^"));
        assert!(formatted.contains("= help: mark a property with 'key'"));
    }

    #[test]
    fn test_formatter_without_source_text() {
        let mut sources = SourceMap::new();
        let file_id = sources.add_detached(PathBuf::from("tree.klass.json"));
        let err = CompileError::new(
            ErrorKind::DuplicateTopLevel,
            Span::new(file_id, 0, 0, 4),
            "duplicate top level item name: 'Foo'".to_string(),
        );

        let formatted = DiagnosticFormatter::new(&sources).format(&err);
        assert!(formatted.contains("--> tree.klass.json:4:1"));
        assert!(!formatted.contains(" | "));
    }

    #[test]
    fn test_internal_error_messages() {
        let err = InternalError::UnbalancedWalk {
            expected: "classifier",
            found: "unit",
        };
        assert_eq!(
            err.to_string(),
            "exited a classifier walk but the innermost open walk is unit"
        );
    }
}
