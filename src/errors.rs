//! Diagnostic accumulation and rendering.
//!
//! The lexer and parser never print; they push [`ErrorReport`]s into a
//! shared [`ErrorContext`] and the caller decides how to render them
//! (text for terminals, JSON for tooling).

use std::fmt;

use serde_json::json;

/// How bad a diagnostic is. `Info` is informational only and does not
/// count toward the error total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stage produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    Lexer,
    Parser,
    Semantic,
    Runtime,
    System,
}

impl ErrorSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorSource::Lexer => "Lexer",
            ErrorSource::Parser => "Parser",
            ErrorSource::Semantic => "Semantic",
            ErrorSource::Runtime => "Runtime",
            ErrorSource::System => "System",
        }
    }
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic. Column is 0 when only the line is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    pub severity: Severity,
    pub source: ErrorSource,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (line {}, col {}): {}",
            self.severity, self.source, self.line, self.column, self.message
        )
    }
}

/// Ordered collection of diagnostics with aggregate counters.
#[derive(Debug, Default)]
pub struct ErrorContext {
    reports: Vec<ErrorReport>,
    error_count: u32,
    warning_count: u32,
    has_fatal: bool,
}

impl ErrorContext {
    pub fn new() -> Self {
        ErrorContext::default()
    }

    /// Record a diagnostic. Reports keep arrival order.
    pub fn report(
        &mut self,
        severity: Severity,
        source: ErrorSource,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) {
        match severity {
            Severity::Warning => self.warning_count += 1,
            Severity::Error => self.error_count += 1,
            Severity::Fatal => {
                self.error_count += 1;
                self.has_fatal = true;
            }
            Severity::Info => {}
        }
        self.reports.push(ErrorReport {
            severity,
            source,
            line,
            column,
            message: message.into(),
        });
    }

    pub fn reports(&self) -> &[ErrorReport] {
        &self.reports
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    /// True once any Error or Fatal report has been recorded.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_fatal(&self) -> bool {
        self.has_fatal
    }

    pub fn clear(&mut self) {
        self.reports.clear();
        self.error_count = 0;
        self.warning_count = 0;
        self.has_fatal = false;
    }

    /// Render every report as human-readable text, one per line, after a
    /// one-line summary.
    pub fn format_text(&self) -> String {
        let mut out = format!(
            "Polite parsing results: {} error(s), {} warning(s)\n\n",
            self.error_count, self.warning_count
        );
        for report in &self.reports {
            out.push_str(&report.to_string());
            out.push('\n');
        }
        out
    }

    /// Render every report as a JSON document with a summary object and a
    /// details array.
    pub fn format_json(&self) -> serde_json::Value {
        json!({
            "summary": {
                "errors": self.error_count,
                "warnings": self.warning_count,
            },
            "details": self
                .reports
                .iter()
                .map(|r| {
                    json!({
                        "severity": r.severity.as_str(),
                        "source": r.source.as_str(),
                        "line": r.line,
                        "column": r.column,
                        "message": r.message,
                    })
                })
                .collect::<Vec<_>>(),
        })
    }
}

#[test]
fn test_counters_track_severity() {
    let mut ctx = ErrorContext::new();
    ctx.report(Severity::Info, ErrorSource::System, 0, 0, "loaded");
    ctx.report(Severity::Warning, ErrorSource::Lexer, 1, 0, "long string");
    ctx.report(Severity::Error, ErrorSource::Parser, 2, 0, "bad clause");
    assert_eq!(ctx.error_count(), 1);
    assert_eq!(ctx.warning_count(), 1);
    assert!(ctx.has_errors());
    assert!(!ctx.has_fatal());

    ctx.report(Severity::Fatal, ErrorSource::System, 0, 0, "out of space");
    assert_eq!(ctx.error_count(), 2);
    assert!(ctx.has_fatal());
}

#[test]
fn test_text_format() {
    let mut ctx = ErrorContext::new();
    ctx.report(Severity::Error, ErrorSource::Parser, 3, 0, "Expected expression");
    let text = ctx.format_text();
    assert!(text.starts_with("Polite parsing results: 1 error(s), 0 warning(s)\n"));
    assert!(text.contains("[Error] Parser (line 3, col 0): Expected expression"));
}

#[test]
fn test_json_format_escapes_messages() {
    let mut ctx = ErrorContext::new();
    ctx.report(Severity::Error, ErrorSource::Lexer, 1, 0, "bad \"quote\"");
    let v = ctx.format_json();
    assert_eq!(v["summary"]["errors"], 1);
    assert_eq!(v["details"][0]["message"], "bad \"quote\"");
}
