use crate::{
    ast::{BinaryOp, ConstraintKind, Literal, Node, NodeKind, OrderKey, Token, TokenKind, UnaryOp},
    errors::{ErrorContext, ErrorSource, Severity},
    lexer::Lexer,
};

/// Recursive-descent parser with one token of lookahead and panic-mode
/// error recovery.
///
/// Diagnostics accumulate in an owned [`ErrorContext`]; a tree always
/// comes back, with [`NodeKind::Error`] placeholders where productions
/// failed. Every reported error synchronizes immediately. With recovery
/// enabled (the default), that skips to the next statement keyword and
/// `had_error` stays set for the whole parse. With recovery disabled,
/// synchronizing clears the error flag right after each report, so
/// `had_error` ends up false and the accumulated reports alone record
/// what failed.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token<'a>,
    previous: Token<'a>,
    errors: ErrorContext,
    panic_mode: bool,
    had_error: bool,
    recover: bool,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let mut parser = Parser {
            lexer,
            current: Token::placeholder(),
            previous: Token::placeholder(),
            errors: ErrorContext::new(),
            panic_mode: false,
            had_error: false,
            recover: true,
        };
        parser.advance();
        parser
    }

    /// Select the recovery mode before parsing. Off means an error resets
    /// the parser state instead of skipping to the next statement.
    pub fn with_recovery(mut self, recover: bool) -> Self {
        self.recover = recover;
        self
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn errors(&self) -> &ErrorContext {
        &self.errors
    }

    pub fn into_errors(self) -> ErrorContext {
        self.errors
    }

    // Token plumbing

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.lexer.next_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            // Error tokens carry their message in the lexeme
            let token = self.current;
            self.lexical_error(token);
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current.kind == kind {
            self.advance();
            return;
        }
        self.error_at_current(message);
    }

    // Error handling

    fn error_at_current(&mut self, message: &str) {
        let token = self.current;
        self.error_at(token, ErrorSource::Parser, message);
    }

    fn lexical_error(&mut self, token: Token<'a>) {
        self.error_at(token, ErrorSource::Lexer, token.lexeme);
    }

    fn error_at(&mut self, token: Token<'a>, source: ErrorSource, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;

        let rendered = match token.kind {
            TokenKind::Eof => format!("{message} at end"),
            TokenKind::Error => message.to_string(),
            _ => format!("{message} at '{}'", token.lexeme),
        };
        self.errors
            .report(Severity::Error, source, token.line, 0, rendered);

        self.synchronize();
    }

    /// With recovery on, skip to the next statement-start keyword so the
    /// rest of the input still gets parsed. With recovery off, reset the
    /// error state and resume where we are.
    fn synchronize(&mut self) {
        self.panic_mode = false;

        if self.recover {
            while !self.check(TokenKind::Eof) && !self.current.kind.starts_statement() {
                self.advance();
            }
        } else {
            self.had_error = false;
        }
    }

    /// Warnings bypass panic mode and never mark the parse as failed.
    fn warning_at_current(&mut self, message: impl Into<String>) {
        self.errors.report(
            Severity::Warning,
            ErrorSource::Parser,
            self.current.line,
            0,
            message,
        );
    }

    fn error_node(&mut self, message: &str) -> Node {
        let line = self.current.line;
        self.error_at_current(message);
        Node::new(line, NodeKind::Error(message.to_string()))
    }

    // Statements

    /// Parse one statement, dispatching on the leading keyword.
    pub fn parse_query(&mut self) -> Node {
        if self.match_kind(TokenKind::Ask) {
            self.parse_ask_query()
        } else if self.match_kind(TokenKind::Tell) {
            self.parse_tell_query()
        } else if self.match_kind(TokenKind::Find) {
            self.parse_find_query()
        } else if self.match_kind(TokenKind::Show) {
            self.parse_projection_query(false)
        } else if self.match_kind(TokenKind::Get) {
            self.parse_projection_query(true)
        } else {
            self.error_node("Expected a query type (ASK, TELL, FIND, SHOW, GET)")
        }
    }

    /// Parse a terminator-separated statement sequence into a Program node.
    pub fn parse_program(&mut self) -> Node {
        let line = self.current.line;
        let mut statements = Vec::new();

        loop {
            while self.match_kind(TokenKind::Terminator) {}
            if self.check(TokenKind::Eof) {
                break;
            }

            let mark = self.lexer.offset();
            statements.push(self.parse_query());

            if !self.match_kind(TokenKind::Terminator)
                && !self.check(TokenKind::Eof)
                && !self.current.kind.starts_statement()
            {
                self.error_at_current("Expected ';' or 'PLEASE' after statement");
            }

            // Without recovery an error does not skip tokens, so force
            // progress if this iteration consumed nothing.
            if self.lexer.offset() == mark && !self.check(TokenKind::Eof) {
                self.advance();
            }
        }

        Node::new(line, NodeKind::Program(statements))
    }

    fn parse_ask_query(&mut self) -> Node {
        let line = self.previous.line;

        let source = Box::new(self.parse_source());
        self.consume(TokenKind::For, "Expected 'FOR' after source in ASK query");
        let fields = Box::new(self.parse_field_list());

        let condition =
            self.parse_optional_condition(&[TokenKind::When, TokenKind::If, TokenKind::Where]);
        let (group_by, order_by, limit) = self.parse_tail_clauses();

        Node::new(
            line,
            NodeKind::Ask {
                source,
                fields,
                condition,
                group_by,
                order_by,
                limit,
            },
        )
    }

    fn parse_tell_query(&mut self) -> Node {
        let line = self.previous.line;

        let source = Box::new(self.parse_source());
        self.consume(TokenKind::To, "Expected 'TO' after source in TELL query");

        let action = if self.match_kind(TokenKind::Add) {
            self.parse_add_action()
        } else if self.match_kind(TokenKind::Remove) {
            self.parse_remove_action()
        } else if self.match_kind(TokenKind::Update) {
            self.parse_update_action()
        } else if self.match_kind(TokenKind::Create) {
            self.parse_create_action()
        } else {
            return self.error_node("Expected action (ADD, REMOVE, UPDATE, CREATE)");
        };

        let condition =
            self.parse_optional_condition(&[TokenKind::When, TokenKind::If, TokenKind::Where]);

        Node::new(
            line,
            NodeKind::Tell {
                source,
                action: Box::new(action),
                condition,
            },
        )
    }

    fn parse_find_query(&mut self) -> Node {
        let line = self.previous.line;

        // A bare FIND searches everything; IN narrows it afterwards
        let mut source = if self.check(TokenKind::Identifier) || self.check(TokenKind::String) {
            self.parse_source()
        } else {
            Node::new(
                self.previous.line,
                NodeKind::Source {
                    name: "*".to_string(),
                    join: None,
                },
            )
        };

        if self.match_kind(TokenKind::In) {
            source = self.parse_source();
        }

        let condition = self.parse_optional_condition(&[
            TokenKind::That,
            TokenKind::When,
            TokenKind::Where,
            TokenKind::Which,
        ]);
        let (group_by, order_by, limit) = self.parse_tail_clauses();

        Node::new(
            line,
            NodeKind::Find {
                source: Box::new(source),
                condition,
                group_by,
                order_by,
                limit,
            },
        )
    }

    /// SHOW and GET share one shape; only the node kind differs.
    fn parse_projection_query(&mut self, is_get: bool) -> Node {
        let line = self.previous.line;

        // SHOW takes an optional polite "ME"
        if !is_get && self.check(TokenKind::Identifier) && self.current.lexeme == "ME" {
            self.advance();
        }

        let fields = Box::new(self.parse_field_list());
        if is_get {
            self.consume(TokenKind::From, "Expected 'FROM' after fields in GET query");
        } else {
            self.consume(TokenKind::From, "Expected 'FROM' after fields in SHOW query");
        }
        let source = Box::new(self.parse_source());

        let condition =
            self.parse_optional_condition(&[TokenKind::When, TokenKind::If, TokenKind::Where]);
        let (group_by, order_by, limit) = self.parse_tail_clauses();

        let kind = if is_get {
            NodeKind::Get {
                source,
                fields,
                condition,
                group_by,
                order_by,
                limit,
            }
        } else {
            NodeKind::Show {
                source,
                fields,
                condition,
                group_by,
                order_by,
                limit,
            }
        };
        Node::new(line, kind)
    }

    // Clauses

    fn parse_optional_condition(&mut self, introducers: &[TokenKind]) -> Option<Box<Node>> {
        for &kind in introducers {
            if self.match_kind(kind) {
                return Some(Box::new(self.parse_expression()));
            }
        }
        None
    }

    fn parse_tail_clauses(
        &mut self,
    ) -> (Option<Box<Node>>, Option<Box<Node>>, Option<Box<Node>>) {
        let group_by = if self.match_kind(TokenKind::Group) {
            self.consume(TokenKind::By, "Expected 'BY' after 'GROUP'");
            Some(Box::new(self.parse_group_by()))
        } else {
            None
        };

        let order_by = if self.match_kind(TokenKind::Order) {
            self.consume(TokenKind::By, "Expected 'BY' after 'ORDER'");
            Some(Box::new(self.parse_order_by()))
        } else if self.match_kind(TokenKind::Sort) {
            self.consume(TokenKind::By, "Expected 'BY' after 'SORT'");
            Some(Box::new(self.parse_order_by()))
        } else {
            None
        };

        let limit = if self.match_kind(TokenKind::Limit) {
            Some(Box::new(self.parse_limit()))
        } else {
            None
        };

        (group_by, order_by, limit)
    }

    fn parse_source(&mut self) -> Node {
        let line = self.current.line;

        if self.check(TokenKind::Identifier) || self.check(TokenKind::String) {
            let name = self.current.lexeme.to_string();
            self.advance();

            let join = if self.match_kind(TokenKind::And) || self.match_kind(TokenKind::With) {
                Some(Box::new(self.parse_join()))
            } else {
                None
            };

            Node::new(line, NodeKind::Source { name, join })
        } else {
            self.error_node("Expected identifier or string for source")
        }
    }

    fn parse_join(&mut self) -> Node {
        let line = self.previous.line;
        let source = Box::new(self.parse_source());

        let condition = if self.match_kind(TokenKind::When) || self.match_kind(TokenKind::Where) {
            self.parse_expression()
        } else {
            self.error_node("Expected 'WHEN' or 'WHERE' after join source")
        };

        Node::new(
            line,
            NodeKind::Join {
                source,
                condition: Box::new(condition),
            },
        )
    }

    fn parse_field_list(&mut self) -> Node {
        let line = self.previous.line;
        let mut fields = Vec::new();

        if self.check(TokenKind::Identifier) || self.check(TokenKind::String) {
            fields.push(self.identifier_node());

            while self.match_kind(TokenKind::Comma) {
                if self.check(TokenKind::Identifier) || self.check(TokenKind::String) {
                    fields.push(self.identifier_node());
                } else {
                    self.error_at_current("Expected identifier or string after comma");
                    break;
                }
            }
        } else {
            self.error_at_current("Expected identifier or string for field list");
        }

        Node::new(line, NodeKind::FieldList(fields))
    }

    /// Consume the current identifier or string token as an Identifier node.
    fn identifier_node(&mut self) -> Node {
        let node = Node::new(
            self.current.line,
            NodeKind::Identifier(self.current.lexeme.to_string()),
        );
        self.advance();
        node
    }

    fn parse_group_by(&mut self) -> Node {
        let line = self.previous.line;
        let fields = Box::new(self.parse_field_list());

        let having = if self.match_kind(TokenKind::Having) {
            Some(Box::new(self.parse_expression()))
        } else {
            None
        };

        Node::new(line, NodeKind::GroupBy { fields, having })
    }

    fn parse_order_by(&mut self) -> Node {
        let line = self.previous.line;
        let mut keys = Vec::new();

        if self.check(TokenKind::Identifier) {
            keys.push(self.parse_order_key());

            while self.match_kind(TokenKind::Comma) {
                if self.check(TokenKind::Identifier) {
                    keys.push(self.parse_order_key());
                } else {
                    self.error_at_current("Expected identifier after comma in ORDER BY clause");
                    break;
                }
            }
        } else {
            self.error_at_current("Expected identifier for ORDER BY clause");
        }

        Node::new(line, NodeKind::OrderBy(keys))
    }

    fn parse_order_key(&mut self) -> OrderKey {
        let field = self.identifier_node();

        let ascending = if self.check(TokenKind::Identifier) {
            match self.current.lexeme {
                "ASC" => {
                    self.advance();
                    true
                }
                "DESC" => {
                    self.advance();
                    false
                }
                _ => {
                    self.error_at_current("Expected 'ASC', 'DESC', or ','");
                    true
                }
            }
        } else {
            true
        };

        OrderKey { field, ascending }
    }

    fn parse_limit(&mut self) -> Node {
        let line = self.previous.line;

        let limit = if self.check(TokenKind::Integer) {
            let value = self.clause_integer("LIMIT");
            self.advance();
            value
        } else {
            self.error_at_current("Expected integer for LIMIT clause");
            0
        };

        let offset = if self.check(TokenKind::Identifier) && self.current.lexeme == "OFFSET" {
            self.advance();
            if self.check(TokenKind::Integer) {
                let value = self.clause_integer("OFFSET");
                self.advance();
                value
            } else {
                self.error_at_current("Expected integer for OFFSET clause");
                0
            }
        } else {
            0
        };

        Node::new(line, NodeKind::Limit { limit, offset })
    }

    /// Parse the current Integer token's value for a LIMIT/OFFSET clause,
    /// clamping overflow with a warning. Does not advance.
    fn clause_integer(&mut self, clause: &str) -> i32 {
        match self.current.lexeme.parse::<i32>() {
            Ok(value) => value,
            Err(_) => {
                self.warning_at_current(format!(
                    "{clause} value out of range, clamping to {}",
                    i32::MAX
                ));
                i32::MAX
            }
        }
    }

    // TELL actions

    fn parse_add_action(&mut self) -> Node {
        let line = self.previous.line;
        let value = Box::new(self.parse_expression());

        let record_spec = if self.match_kind(TokenKind::With) {
            Some(Box::new(self.parse_field_list()))
        } else {
            None
        };

        Node::new(line, NodeKind::Add { value, record_spec })
    }

    /// REMOVE with no condition means remove everything.
    fn parse_remove_action(&mut self) -> Node {
        let line = self.previous.line;

        let condition =
            self.parse_optional_condition(&[TokenKind::When, TokenKind::If, TokenKind::Where]);

        Node::new(line, NodeKind::Remove { condition })
    }

    fn parse_update_action(&mut self) -> Node {
        let line = self.previous.line;
        let mut assignments = Vec::new();

        if self.check(TokenKind::Identifier) {
            assignments.push(self.parse_assignment());

            while self.match_kind(TokenKind::Comma) {
                if self.check(TokenKind::Identifier) {
                    assignments.push(self.parse_assignment());
                } else {
                    self.error_at_current("Expected identifier after comma in UPDATE action");
                    break;
                }
            }
        } else {
            self.error_at_current("Expected identifier for UPDATE action");
        }

        Node::new(line, NodeKind::Update { assignments })
    }

    fn parse_assignment(&mut self) -> (Node, Node) {
        let field = self.identifier_node();
        self.consume(TokenKind::Equal, "Expected '=' after field name");
        let value = self.parse_expression();
        (field, value)
    }

    fn parse_create_action(&mut self) -> Node {
        let line = self.previous.line;
        let mut field_defs = vec![self.parse_field_def()];

        while self.match_kind(TokenKind::Comma) {
            field_defs.push(self.parse_field_def());
        }

        Node::new(line, NodeKind::Create { field_defs })
    }

    fn parse_field_def(&mut self) -> Node {
        let line = self.previous.line;

        let name = if self.check(TokenKind::Identifier) {
            self.identifier_node()
        } else {
            self.error_node("Expected identifier for field name")
        };

        let type_name = if self.match_kind(TokenKind::As) {
            if self.check(TokenKind::Identifier) {
                let name = self.current.lexeme.to_string();
                self.advance();
                Some(name)
            } else {
                self.error_at_current("Expected identifier for field type");
                None
            }
        } else {
            None
        };

        let mut constraints = Vec::new();
        if self.match_kind(TokenKind::LParen) {
            constraints.push(self.parse_constraint());
            while self.match_kind(TokenKind::Comma) {
                constraints.push(self.parse_constraint());
            }
            self.consume(TokenKind::RParen, "Expected ')' after field constraints");
        }

        Node::new(
            line,
            NodeKind::FieldDef {
                name: Box::new(name),
                type_name,
                constraints,
            },
        )
    }

    fn parse_constraint(&mut self) -> Node {
        let line = self.current.line;

        if self.check(TokenKind::Identifier) {
            match self.current.lexeme {
                "REQUIRED" => {
                    self.advance();
                    Node::new(
                        line,
                        NodeKind::Constraint {
                            kind: ConstraintKind::Required,
                            default_value: None,
                        },
                    )
                }
                "UNIQUE" => {
                    self.advance();
                    Node::new(
                        line,
                        NodeKind::Constraint {
                            kind: ConstraintKind::Unique,
                            default_value: None,
                        },
                    )
                }
                "DEFAULT" => {
                    self.advance();
                    let default_value = Some(Box::new(self.parse_expression()));
                    Node::new(
                        line,
                        NodeKind::Constraint {
                            kind: ConstraintKind::Default,
                            default_value,
                        },
                    )
                }
                _ => self.error_node("Expected constraint type (REQUIRED, UNIQUE, DEFAULT)"),
            }
        } else {
            self.error_node("Expected constraint type")
        }
    }

    // Expressions, lowest to highest precedence

    fn parse_expression(&mut self) -> Node {
        self.parse_logic_or()
    }

    fn parse_logic_or(&mut self) -> Node {
        let mut left = self.parse_logic_and();
        while self.match_kind(TokenKind::Or) {
            let right = self.parse_logic_and();
            left = binary(left, BinaryOp::Or, right);
        }
        left
    }

    fn parse_logic_and(&mut self) -> Node {
        let mut left = self.parse_equality();
        while self.match_kind(TokenKind::And) {
            let right = self.parse_equality();
            left = binary(left, BinaryOp::And, right);
        }
        left
    }

    fn parse_equality(&mut self) -> Node {
        let mut left = self.parse_comparison();
        loop {
            let op = if self.match_kind(TokenKind::Equal) {
                BinaryOp::Equal
            } else if self.match_kind(TokenKind::NotEqual) {
                BinaryOp::NotEqual
            } else if self.match_kind(TokenKind::Like) {
                BinaryOp::Like
            } else {
                return left;
            };
            let right = self.parse_comparison();
            left = binary(left, op, right);
        }
    }

    fn parse_comparison(&mut self) -> Node {
        let mut left = self.parse_term();
        loop {
            let op = if self.match_kind(TokenKind::Less) {
                BinaryOp::Less
            } else if self.match_kind(TokenKind::LessEqual) {
                BinaryOp::LessEqual
            } else if self.match_kind(TokenKind::Greater) {
                BinaryOp::Greater
            } else if self.match_kind(TokenKind::GreaterEqual) {
                BinaryOp::GreaterEqual
            } else {
                return left;
            };
            let right = self.parse_term();
            left = binary(left, op, right);
        }
    }

    fn parse_term(&mut self) -> Node {
        let mut left = self.parse_factor();
        loop {
            let op = if self.match_kind(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.match_kind(TokenKind::Minus) {
                BinaryOp::Subtract
            } else {
                return left;
            };
            let right = self.parse_factor();
            left = binary(left, op, right);
        }
    }

    fn parse_factor(&mut self) -> Node {
        let mut left = self.parse_unary();
        loop {
            let op = if self.match_kind(TokenKind::Star) {
                BinaryOp::Multiply
            } else if self.match_kind(TokenKind::Slash) {
                BinaryOp::Divide
            } else if self.match_kind(TokenKind::Percent) {
                BinaryOp::Modulo
            } else {
                return left;
            };
            let right = self.parse_unary();
            left = binary(left, op, right);
        }
    }

    fn parse_unary(&mut self) -> Node {
        let op = if self.match_kind(TokenKind::Not) {
            UnaryOp::Not
        } else if self.match_kind(TokenKind::Minus) {
            UnaryOp::Negate
        } else {
            return self.parse_primary();
        };

        let line = self.previous.line;
        let operand = Box::new(self.parse_unary());
        Node::new(line, NodeKind::Unary { op, operand })
    }

    fn parse_primary(&mut self) -> Node {
        if self.match_kind(TokenKind::String) {
            return Node::new(
                self.previous.line,
                NodeKind::Literal(Literal::String(self.previous.lexeme.to_string())),
            );
        }

        if self.match_kind(TokenKind::Integer) {
            let value = match self.previous.lexeme.parse::<i64>() {
                Ok(value) => value,
                Err(_) => {
                    self.errors.report(
                        Severity::Warning,
                        ErrorSource::Parser,
                        self.previous.line,
                        0,
                        format!("Integer literal out of range, clamping to {}", i64::MAX),
                    );
                    i64::MAX
                }
            };
            return Node::new(self.previous.line, NodeKind::Literal(Literal::Integer(value)));
        }

        if self.match_kind(TokenKind::Decimal) {
            let value = self.previous.lexeme.parse::<f64>().unwrap_or(f64::NAN);
            return Node::new(self.previous.line, NodeKind::Literal(Literal::Decimal(value)));
        }

        if self.check(TokenKind::Identifier) {
            let name = self.current.lexeme.to_string();
            let line = self.current.line;
            self.advance();

            if self.match_kind(TokenKind::LParen) {
                return self.parse_function_call(name, line);
            }
            return Node::new(line, NodeKind::Identifier(name));
        }

        if self.match_kind(TokenKind::LParen) {
            let expr = self.parse_expression();
            self.consume(TokenKind::RParen, "Expected ')' after expression");
            return expr;
        }

        self.error_node("Expected expression")
    }

    /// Called with the name and opening paren already consumed.
    fn parse_function_call(&mut self, name: String, line: u32) -> Node {
        let mut args = Vec::new();

        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expression());
            while self.match_kind(TokenKind::Comma) {
                args.push(self.parse_expression());
            }
        }

        self.consume(TokenKind::RParen, "Expected ')' after function arguments");
        Node::new(line, NodeKind::FunctionCall { name, args })
    }
}

fn binary(left: Node, op: BinaryOp, right: Node) -> Node {
    let line = left.line;
    Node::new(
        line,
        NodeKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    )
}
