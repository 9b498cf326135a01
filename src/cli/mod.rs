//! CLI support for polite-lang
//!
//! Provides programmatic access to the `polite` front end for embedding
//! in other tools.

use std::fmt::Write as _;
use std::io;

use crate::codec;
use crate::errors::ErrorContext;
use crate::lexer::Lexer;
use crate::metadata;
use crate::parser::Parser;
use crate::printer;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// IO error
    Io(io::Error),
    /// No query provided
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No query provided. Pass a query, use --file, or pipe to stdin.")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::NoInput => None,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// What to run and which stages to print.
pub struct RunOptions {
    pub source: String,
    pub show_tokens: bool,
    pub show_ast: bool,
    pub serialize: bool,
    pub json_errors: bool,
}

/// Everything a run produced, ready to print.
pub struct RunReport {
    pub output: String,
    pub succeeded: bool,
}

/// Run a source string through the full pipeline and collect the output
/// the selected flags ask for.
pub fn run_source(options: &RunOptions) -> RunReport {
    let mut out = String::new();

    if options.show_tokens {
        let _ = writeln!(out, "Tokens:");
        for token in Lexer::new(&options.source).tokenize() {
            let _ = writeln!(
                out,
                "  line {:<4} {:<14} '{}'",
                token.line,
                format!("{:?}", token.kind),
                token.lexeme
            );
        }
    }

    let mut parser = Parser::new(Lexer::new(&options.source));
    let program = parser.parse_program();
    let succeeded = !parser.had_error();

    if options.show_ast {
        out.push_str(&printer::to_text(&program));
    }

    if options.serialize && succeeded {
        let hints = metadata::classify(first_statement(&program));
        let mut codec_errors = ErrorContext::new();
        let artifact = codec::serialize(&program, Some(&hints), &mut codec_errors);

        let _ = writeln!(out, "Serialized {} bytes", artifact.len());
        let _ = writeln!(
            out,
            "Checksum: {:#010x} ({})",
            artifact.checksum(),
            if artifact.verify_checksum() { "valid" } else { "INVALID" }
        );
        if let Some(hints) = artifact.extract_metadata() {
            let _ = writeln!(
                out,
                "Engine: {}  priority: {}  flags: {:#06x}  rows: {}  timeout: {} ms",
                hints.engine_type.as_str(),
                hints.priority,
                hints.hint_flags.bits(),
                hints.estimated_rows,
                hints.timeout_ms
            );
        }
        let shown = artifact.data().len().min(16);
        let _ = write!(out, "Header:");
        for byte in &artifact.data()[..shown] {
            let _ = write!(out, " {:02x}", byte);
        }
        out.push('\n');
        for report in codec_errors.reports() {
            let _ = writeln!(out, "{}", report);
        }
    }

    if parser.errors().error_count() > 0 || parser.errors().warning_count() > 0 {
        if options.json_errors {
            let _ = writeln!(out, "{}", parser.errors().format_json());
        } else {
            out.push_str(&parser.errors().format_text());
        }
    }

    RunReport {
        output: out,
        succeeded,
    }
}

fn first_statement(program: &crate::ast::Node) -> Option<&crate::ast::Node> {
    match &program.kind {
        crate::ast::NodeKind::Program(statements) => statements.first(),
        _ => Some(program),
    }
}
