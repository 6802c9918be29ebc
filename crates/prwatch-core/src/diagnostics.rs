//! Non-fatal problems found while reading the source trees.
//!
//! A missing root, an unreadable file or a row with a bad date never stops a
//! merge. Each is recorded against the path it came from and printed after
//! the coverage report.
//!
//! ```
//! use prwatch_core::diagnostics::{Diagnostics, IssueKind};
//!
//! let mut diag = Diagnostics::new();
//! diag.missing_source("PR");
//! diag.skipped_file("GHI/site/2024-01_GHI.csv", "missing GHI column");
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.of_kind(IssueKind::File).count(), 1);
//! ```

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    /// A whole source file was dropped.
    Error,
}

/// Where in the pipeline an issue was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Source root missing or a directory entry unreadable.
    Source,
    /// A CSV file that could not be read or lacks its columns.
    File,
    /// A single row skipped inside an otherwise readable file.
    Row,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::Source => "source",
            IssueKind::File => "file",
            IssueKind::Row => "row",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    /// File or directory the issue refers to.
    pub path: String,
    /// 1-based line, for row issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{severity} [{}] {}", self.kind.as_str(), self.path)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        severity: Severity,
        kind: IssueKind,
        path: &str,
        line: Option<usize>,
        message: &str,
    ) {
        self.issues.push(DiagnosticIssue {
            severity,
            kind,
            path: path.to_string(),
            line,
            message: message.to_string(),
        });
    }

    pub fn missing_source(&mut self, root: &str) {
        self.push(
            Severity::Warning,
            IssueKind::Source,
            root,
            None,
            "directory not found",
        );
    }

    pub fn unreadable_entry(&mut self, root: &str, reason: &str) {
        self.push(Severity::Warning, IssueKind::Source, root, None, reason);
    }

    pub fn skipped_file(&mut self, path: &str, reason: &str) {
        self.push(Severity::Error, IssueKind::File, path, None, reason);
    }

    pub fn skipped_row(&mut self, path: &str, line: usize, reason: &str) {
        self.push(Severity::Warning, IssueKind::Row, path, Some(line), reason);
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &DiagnosticIssue> + '_ {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    /// e.g. `2 warnings, 1 error`.
    pub fn summary(&self) -> String {
        fn counted(n: usize, noun: &str) -> String {
            if n == 1 {
                format!("1 {noun}")
            } else {
                format!("{n} {noun}s")
            }
        }
        match (self.warning_count(), self.error_count()) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => counted(w, "warning"),
            (0, e) => counted(e, "error"),
            (w, e) => format!("{}, {}", counted(w, "warning"), counted(e, "error")),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {issue}")?;
        }
        Ok(())
    }
}
