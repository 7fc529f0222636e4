//! Diagnostic reporting and the engine's hard-error taxonomy.
//!
//! `Span`/`Diagnostic`/`ErrorLevel`/`DiagnosticEngine` follow the usual
//! Rust-compiler-flavored reporting shape, since parse errors and pass-skip
//! warnings still need exactly that. `EngineError` is the closed set of
//! conditions the Pass Driver must treat as fatal invariant violations (a
//! missing mapping key chief among them), modeled as a `thiserror` enum per
//! the workspace's `panic = "deny"` / `unwrap_used = "deny"` lints rather
//! than as panics.

use colored::Colorize;
use std::fmt;

/// Source code location (line, column, file).
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl Span {
    pub fn new(file: String, line: usize, column: usize, length: usize) -> Self {
        Self {
            file,
            line,
            column,
            length,
        }
    }

    pub fn from_file_and_span(file: &str, source: &str, span: std::ops::Range<usize>) -> Self {
        let before = &source[..span.start];
        let line = before.chars().filter(|&c| c == '\n').count() + 1;
        let column = before
            .rfind('\n')
            .map_or(before.len() + 1, |pos| before.len() - pos);
        let length = span.end.saturating_sub(span.start).max(1);

        Self {
            file: file.to_string(),
            line,
            column,
            length,
        }
    }

    pub fn unknown() -> Self {
        Self {
            file: "<unknown>".to_string(),
            line: 0,
            column: 0,
            length: 0,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorLevel::Error => write!(f, "{}", "error".red().bold()),
            ErrorLevel::Warning => write!(f, "{}", "warning".yellow().bold()),
            ErrorLevel::Info => write!(f, "{}", "info".blue().bold()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: ErrorLevel,
    pub code: String,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(level: ErrorLevel, code: &str, message: String, span: Span) -> Self {
        Self {
            level,
            code: code.to_string(),
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn error(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Error, code, message, span)
    }

    pub fn warning(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Warning, code, message, span)
    }

    pub fn info(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Info, code, message, span)
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    fn format_simple(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}[{}]: {}\n",
            self.level,
            self.code,
            self.message.bold()
        ));
        output.push_str(&format!(
            " {} {}:{}:{}\n",
            "-->".cyan().bold(),
            self.span.file,
            self.span.line,
            self.span.column
        ));
        for note in &self.notes {
            output.push_str(&format!(" {} {}\n", "=".cyan().bold(), note.cyan()));
        }
        if let Some(help) = &self.help {
            output.push_str(&format!(" {} {}\n", "help:".green().bold(), help));
        }
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

/// Diagnostic collection and reporting. A pass's non-fatal conditions (e.g.
/// a reparse warning under `--debug`) accumulate here; fatal conditions are
/// `EngineError`s returned directly instead.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            ErrorLevel::Error => self.error_count += 1,
            ErrorLevel::Warning => self.warning_count += 1,
            ErrorLevel::Info => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn print_all(&self) {
        for diag in &self.diagnostics {
            eprintln!("{diag}");
        }
    }

    pub fn print_summary(&self) {
        if self.error_count > 0 {
            eprintln!(
                "\n{}: {} error{} emitted",
                "error".red().bold(),
                self.error_count,
                if self.error_count == 1 { "" } else { "s" }
            );
        }
        if self.warning_count > 0 {
            eprintln!(
                "{}: {} warning{} emitted",
                "warning".yellow().bold(),
                self.warning_count,
                if self.warning_count == 1 { "" } else { "s" }
            );
        }
    }
}

pub mod error_codes {
    pub const SYNTAX_ERROR: &str = "E0001";
    pub const UNEXPECTED_TOKEN: &str = "E0002";
    pub const UNEXPECTED_EOF: &str = "E0003";
    pub const INVALID_LITERAL: &str = "E0004";
    pub const UNDEFINED_NAME: &str = "E0425";
    pub const MAXSTAGE_REACHED: &str = "W0010";
}

/// Invariant violations the Pass Driver treats as fatal. Never constructed
/// for recoverable conditions — those stay as
/// `Diagnostic`s on a `DiagnosticEngine`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A generic call/instance record's mapping does not bind every type
    /// parameter the callee/type declares.
    #[error("missing type mapping for type parameter `{param}` while instantiating `{entity}`")]
    MissingMapping { entity: String, param: String },

    /// Decision recorded in `DESIGN.md`: two bindings for the same type
    /// parameter (one from a named type argument, one from positional
    /// unnamed inference) disagree.
    #[error("conflicting binding for type parameter `{param}` in `{entity}`: `{first}` vs `{second}`")]
    ConflictingBinding {
        entity: String,
        param: String,
        first: String,
        second: String,
    },

    /// The Type Renderer was asked to render a type with no concrete
    /// syntax (a tuple, a bare type parameter, a signature that still
    /// carries type parameters) — the `bad` sentinel reached a context
    /// that required a real name.
    #[error("cannot render type to a name or expression: {reason}")]
    Unrenderable { reason: String },

    /// The facade reported a call/instance site whose callee could not be
    /// resolved back to a known generic declaration.
    #[error("generic call/instance site refers to unknown declaration `{name}`")]
    UnknownDeclaration { name: String },

    #[error("source error: {0}")]
    Source(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
