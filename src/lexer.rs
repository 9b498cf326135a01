use crate::ast::{Token, TokenKind};

/// Single-pass tokenizer over a source string.
///
/// Tokens borrow their lexemes from the source, so lexing allocates
/// nothing. Call [`Lexer::next_token`] until it returns
/// [`TokenKind::Eof`]; after that it returns Eof forever.
pub struct Lexer<'a> {
    source: &'a str,
    start: usize,
    current: usize,
    line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            start: 0,
            current: 0,
            line: 1,
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    /// Byte offset of the scan cursor; used by the parser to detect
    /// non-advancing iterations.
    pub(crate) fn offset(&self) -> usize {
        self.current
    }

    fn peek(&self) -> u8 {
        self.source.as_bytes().get(self.current).copied().unwrap_or(0)
    }

    fn peek_next(&self) -> u8 {
        self.source
            .as_bytes()
            .get(self.current + 1)
            .copied()
            .unwrap_or(0)
    }

    fn advance(&mut self) -> u8 {
        let b = self.peek();
        self.current += 1;
        b
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == expected {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\r' | b'\t' => {
                    self.advance();
                }
                b'\n' => {
                    self.line += 1;
                    self.advance();
                }
                // `>>` starts a comment that runs to end of line
                b'>' if self.peek_next() == b'>' => {
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token<'a> {
        Token {
            kind,
            lexeme: &self.source[self.start..self.current],
            line: self.line,
        }
    }

    fn error_token(&self, message: &'static str) -> Token<'a> {
        Token {
            kind: TokenKind::Error,
            lexeme: message,
            line: self.line,
        }
    }

    fn identifier(&mut self) -> Token<'a> {
        while is_alnum(self.peek()) {
            self.advance();
        }
        self.make_token(keyword_kind(&self.source[self.start..self.current]))
    }

    fn number(&mut self) -> Token<'a> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
            return self.make_token(TokenKind::Decimal);
        }

        self.make_token(TokenKind::Integer)
    }

    /// Strings close with the same quote character that opened them. The
    /// lexeme excludes the quotes.
    fn string(&mut self, quote: u8) -> Token<'a> {
        while self.peek() != quote && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return self.error_token("Unterminated string.");
        }

        self.advance();
        Token {
            kind: TokenKind::String,
            lexeme: &self.source[self.start + 1..self.current - 1],
            line: self.line,
        }
    }

    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_whitespace();
        self.start = self.current;

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof);
        }

        let c = self.advance();

        if is_alpha(c) {
            return self.identifier();
        }
        if c.is_ascii_digit() {
            return self.number();
        }

        match c {
            b'(' => self.make_token(TokenKind::LParen),
            b')' => self.make_token(TokenKind::RParen),
            b',' => self.make_token(TokenKind::Comma),
            b'=' => self.make_token(TokenKind::Equal),
            b'<' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::LessEqual)
                } else {
                    self.make_token(TokenKind::Less)
                }
            }
            b'>' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::GreaterEqual)
                } else {
                    self.make_token(TokenKind::Greater)
                }
            }
            b'!' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::NotEqual)
                } else {
                    self.error_token("Unexpected character.")
                }
            }
            b'+' => self.make_token(TokenKind::Plus),
            b'-' => self.make_token(TokenKind::Minus),
            b'*' => self.make_token(TokenKind::Star),
            b'/' => self.make_token(TokenKind::Slash),
            b'%' => self.make_token(TokenKind::Percent),
            b'"' => self.string(b'"'),
            b'\'' => self.string(b'\''),
            b';' => self.make_token(TokenKind::Terminator),
            _ => self.error_token("Unexpected character."),
        }
    }

    /// Lex the remaining input to completion, including the trailing Eof.
    pub fn tokenize(mut self) -> Vec<Token<'a>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_alnum(c: u8) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

/// Keywords are case-sensitive; `ask` is an identifier.
fn keyword_kind(lexeme: &str) -> TokenKind {
    match lexeme {
        "ASK" => TokenKind::Ask,
        "TELL" => TokenKind::Tell,
        "FIND" => TokenKind::Find,
        "SHOW" => TokenKind::Show,
        "GET" => TokenKind::Get,
        "FOR" => TokenKind::For,
        "FROM" => TokenKind::From,
        "TO" => TokenKind::To,
        "IF" => TokenKind::If,
        "WHEN" => TokenKind::When,
        "WHERE" => TokenKind::Where,
        "THAT" => TokenKind::That,
        "WHICH" => TokenKind::Which,
        "GROUP" => TokenKind::Group,
        "SORT" => TokenKind::Sort,
        "ORDER" => TokenKind::Order,
        "BY" => TokenKind::By,
        "HAVING" => TokenKind::Having,
        "LIMIT" => TokenKind::Limit,
        "WITH" => TokenKind::With,
        "AS" => TokenKind::As,
        "IN" => TokenKind::In,
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "NOT" => TokenKind::Not,
        "LIKE" => TokenKind::Like,
        "ADD" => TokenKind::Add,
        "REMOVE" => TokenKind::Remove,
        "UPDATE" => TokenKind::Update,
        "CREATE" => TokenKind::Create,
        "PLEASE" => TokenKind::Terminator,
        _ => TokenKind::Identifier,
    }
}

#[test]
fn test_keywords_are_case_sensitive() {
    let mut lexer = Lexer::new("ASK ask Ask");
    assert_eq!(lexer.next_token().kind, TokenKind::Ask);
    assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
    assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
}

#[test]
fn test_keyword_prefix_is_identifier() {
    let mut lexer = Lexer::new("ASKING FORM");
    let t = lexer.next_token();
    assert_eq!(t.kind, TokenKind::Identifier);
    assert_eq!(t.lexeme, "ASKING");
    let t = lexer.next_token();
    assert_eq!(t.kind, TokenKind::Identifier);
    assert_eq!(t.lexeme, "FORM");
}

#[test]
fn test_please_is_a_terminator() {
    let mut lexer = Lexer::new("; PLEASE");
    assert_eq!(lexer.next_token().kind, TokenKind::Terminator);
    assert_eq!(lexer.next_token().kind, TokenKind::Terminator);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_comments_run_to_end_of_line() {
    let mut lexer = Lexer::new(">> nothing here\nusers");
    let t = lexer.next_token();
    assert_eq!(t.kind, TokenKind::Identifier);
    assert_eq!(t.lexeme, "users");
    assert_eq!(t.line, 2);
}

#[test]
fn test_two_char_operators() {
    let mut lexer = Lexer::new(">= <= != > < =");
    assert_eq!(lexer.next_token().kind, TokenKind::GreaterEqual);
    assert_eq!(lexer.next_token().kind, TokenKind::LessEqual);
    assert_eq!(lexer.next_token().kind, TokenKind::NotEqual);
    assert_eq!(lexer.next_token().kind, TokenKind::Greater);
    assert_eq!(lexer.next_token().kind, TokenKind::Less);
    assert_eq!(lexer.next_token().kind, TokenKind::Equal);
}

#[test]
fn test_bare_bang_is_an_error() {
    let mut lexer = Lexer::new("!");
    let t = lexer.next_token();
    assert_eq!(t.kind, TokenKind::Error);
    assert_eq!(t.lexeme, "Unexpected character.");
}

#[test]
fn test_strings_keep_quote_style() {
    let mut lexer = Lexer::new("\"it's\" 'say \"hi\"'");
    let t = lexer.next_token();
    assert_eq!(t.kind, TokenKind::String);
    assert_eq!(t.lexeme, "it's");
    let t = lexer.next_token();
    assert_eq!(t.kind, TokenKind::String);
    assert_eq!(t.lexeme, "say \"hi\"");
}

#[test]
fn test_unterminated_string() {
    let mut lexer = Lexer::new("'oops");
    let t = lexer.next_token();
    assert_eq!(t.kind, TokenKind::Error);
    assert_eq!(t.lexeme, "Unterminated string.");
}

#[test]
fn test_numbers() {
    let mut lexer = Lexer::new("42 3.14 7.");
    let t = lexer.next_token();
    assert_eq!(t.kind, TokenKind::Integer);
    assert_eq!(t.lexeme, "42");
    let t = lexer.next_token();
    assert_eq!(t.kind, TokenKind::Decimal);
    assert_eq!(t.lexeme, "3.14");
    // A trailing dot is not part of the number
    let t = lexer.next_token();
    assert_eq!(t.kind, TokenKind::Integer);
    assert_eq!(t.lexeme, "7");
    assert_eq!(lexer.next_token().kind, TokenKind::Error);
}
