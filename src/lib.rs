//! Polite is a conversational query language that fronts both SQL and
//! NoSQL stores. Statements read like requests (`ASK users FOR name WHEN
//! age > 18 PLEASE`) and compile to a checksummed binary artifact plus
//! execution hints for the engine that runs them.
//!
//! The pipeline is lex, parse, classify, serialize:
//!
//! ```
//! use polite_lang::{classify, serialize, ErrorContext, Lexer, Parser};
//!
//! let mut parser = Parser::new(Lexer::new("ASK users FOR name WHEN age > 18"));
//! let tree = parser.parse_query();
//! assert!(!parser.had_error());
//!
//! let metadata = classify(Some(&tree));
//! let mut errors = ErrorContext::new();
//! let artifact = serialize(&tree, Some(&metadata), &mut errors);
//! assert!(artifact.is_valid());
//! ```

pub mod ast;
pub mod codec;
pub mod errors;
pub mod lexer;
pub mod metadata;
pub mod parser;
pub mod printer;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinaryOp, Literal, Node, NodeKind, Token, TokenKind, UnaryOp};
pub use codec::{crc32, deserialize, serialize, CodecError, SerializedAst};
pub use errors::{ErrorContext, ErrorReport, ErrorSource, Severity};
pub use lexer::Lexer;
pub use metadata::{classify, EngineType, ExecutionMetadata, HintFlags};
pub use parser::Parser;
pub use printer::{to_json, to_text, walk};
