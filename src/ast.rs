//! # Polite Query Language - Abstract Syntax Tree
//!
//! This module defines the tokens and tree nodes for Polite, a conversational
//! SQL/NoSQL hybrid query language. Queries read like requests and end with
//! `;` or, if you were raised well, `PLEASE`.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[nodes]** - Tree nodes: statements, clauses, expressions, literals
//! - **[operators]** - Binary and unary operators with their wire tags
//!
//! ## The Five Statements
//!
//! ```text
//! ASK users FOR name, email WHERE age > 30 PLEASE
//! TELL users TO ADD "alice" PLEASE
//! FIND orders THAT total > 100 SORT BY total DESC;
//! SHOW ME name FROM customers LIMIT 10;
//! GET name FROM customers WHERE active = 1;
//! ```
//!
//! - **ASK** - SQL-flavored projection with the full clause set
//! - **TELL** - Mutation: `ADD`, `REMOVE`, `UPDATE`, `CREATE` actions
//! - **FIND** - NoSQL-flavored search over a source
//! - **SHOW** / **GET** - Reporting projections (`SHOW` takes an optional `ME`)
//!
//! ## Tree Shape
//!
//! Every node is a [`nodes::Node`]: a line number plus a [`nodes::NodeKind`]
//! payload. Statements own their clauses as `Option<Box<Node>>` fields, so a
//! missing `LIMIT` is an absent child, not a sentinel value. A statement that
//! failed to parse becomes a [`nodes::NodeKind::Error`] node carrying its
//! diagnostic, which keeps the rest of the program walkable.
pub mod nodes;
pub mod operators;
pub mod tokens;

pub use nodes::{ConstraintKind, Literal, Node, NodeKind, OrderKey};
pub use operators::{BinaryOp, UnaryOp};
pub use tokens::{Token, TokenKind};
