// tests/lexer_tests.rs

use polite_lang::ast::TokenKind;
use polite_lang::lexer::Lexer;

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
}

// ============================================================================
// Keywords and identifiers
// ============================================================================

#[test]
fn test_statement_keywords() {
    let test_cases = vec![
        ("ASK", TokenKind::Ask),
        ("TELL", TokenKind::Tell),
        ("FIND", TokenKind::Find),
        ("SHOW", TokenKind::Show),
        ("GET", TokenKind::Get),
        ("ADD", TokenKind::Add),
        ("REMOVE", TokenKind::Remove),
        ("UPDATE", TokenKind::Update),
        ("CREATE", TokenKind::Create),
        ("WHEN", TokenKind::When),
        ("WHERE", TokenKind::Where),
        ("IF", TokenKind::If),
        ("IN", TokenKind::In),
        ("LIKE", TokenKind::Like),
        ("HAVING", TokenKind::Having),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token();
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}

#[test]
fn test_lowercase_keywords_are_identifiers() {
    assert_eq!(
        kinds("ask tell find"),
        vec![
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_keyword_must_match_whole_lexeme() {
    // ASKS and WHENever are plain identifiers
    assert_eq!(
        kinds("ASKS WHENever"),
        vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
    );
}

#[test]
fn test_identifiers_allow_underscores_and_digits() {
    let mut lexer = Lexer::new("_private user2 first_name");
    for expected in ["_private", "user2", "first_name"] {
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.lexeme, expected);
    }
}

// ============================================================================
// Terminators and punctuation
// ============================================================================

#[test]
fn test_please_and_semicolon_both_terminate() {
    assert_eq!(
        kinds("PLEASE ;"),
        vec![TokenKind::Terminator, TokenKind::Terminator, TokenKind::Eof]
    );
}

#[test]
fn test_operators() {
    let test_cases = vec![
        ("=", TokenKind::Equal),
        ("!=", TokenKind::NotEqual),
        ("<", TokenKind::Less),
        (">", TokenKind::Greater),
        ("<=", TokenKind::LessEqual),
        (">=", TokenKind::GreaterEqual),
        ("+", TokenKind::Plus),
        ("-", TokenKind::Minus),
        ("*", TokenKind::Star),
        ("/", TokenKind::Slash),
        ("%", TokenKind::Percent),
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        (",", TokenKind::Comma),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().kind, expected, "Failed for input: {}", input);
    }
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_integer_and_decimal() {
    let mut lexer = Lexer::new("0 42 3.14 10.0");
    let expected = vec![
        (TokenKind::Integer, "0"),
        (TokenKind::Integer, "42"),
        (TokenKind::Decimal, "3.14"),
        (TokenKind::Decimal, "10.0"),
    ];
    for (kind, lexeme) in expected {
        let token = lexer.next_token();
        assert_eq!(token.kind, kind);
        assert_eq!(token.lexeme, lexeme);
    }
}

#[test]
fn test_string_lexeme_excludes_quotes() {
    let mut lexer = Lexer::new("\"hello world\"");
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.lexeme, "hello world");
}

#[test]
fn test_single_quoted_string() {
    let mut lexer = Lexer::new("'O\"Brien'");
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.lexeme, "O\"Brien");
}

#[test]
fn test_multiline_string_tracks_lines() {
    let mut lexer = Lexer::new("\"a\nb\" users");
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.lexeme, "a\nb");
    let token = lexer.next_token();
    assert_eq!(token.line, 2);
}

// ============================================================================
// Comments and whitespace
// ============================================================================

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds(">> a comment\nASK users FOR name >> trailing"),
        vec![
            TokenKind::Ask,
            TokenKind::Identifier,
            TokenKind::For,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_line_numbers_advance() {
    let mut lexer = Lexer::new("ASK\nusers\n\nFOR");
    assert_eq!(lexer.next_token().line, 1);
    assert_eq!(lexer.next_token().line, 2);
    assert_eq!(lexer.next_token().line, 4);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_error_tokens() {
    let test_cases = vec![
        ("!", "Unexpected character."),
        ("#", "Unexpected character."),
        ("\"open", "Unterminated string."),
    ];

    for (input, message) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Error, "Failed for input: {}", input);
        assert_eq!(token.lexeme, message);
    }
}

#[test]
fn test_lexing_continues_after_error() {
    let mut lexer = Lexer::new("# users");
    assert_eq!(lexer.next_token().kind, TokenKind::Error);
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Identifier);
    assert_eq!(token.lexeme, "users");
}

#[test]
fn test_whole_query_token_stream() {
    assert_eq!(
        kinds("ASK users FOR name, email WHEN age >= 18 PLEASE"),
        vec![
            TokenKind::Ask,
            TokenKind::Identifier,
            TokenKind::For,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::Identifier,
            TokenKind::When,
            TokenKind::Identifier,
            TokenKind::GreaterEqual,
            TokenKind::Integer,
            TokenKind::Terminator,
            TokenKind::Eof
        ]
    );
}
