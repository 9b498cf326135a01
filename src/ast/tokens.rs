/// Lexical token kind.
///
/// Keywords are case-sensitive and always upper-case in source text:
/// `ask users for name` is four identifiers, not a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Query starters
    /// `ASK <source> FOR <fields> ...`
    Ask,
    /// `TELL <source> TO <action> ...`
    Tell,
    /// `FIND <target> [IN <source>] ...`
    Find,
    /// `SHOW [ME] <fields> FROM <source> ...`
    Show,
    /// `GET <fields> FROM <source> ...`
    Get,

    // Clause keywords
    For,
    From,
    To,
    If,
    When,
    Where,
    That,
    Which,
    Group,
    Sort,
    Order,
    By,
    Having,
    Limit,
    With,
    As,
    In,

    // TELL actions
    Add,
    Remove,
    Update,
    Create,

    // Word operators
    And,
    Or,
    Not,
    Like,

    // Symbolic operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `=` (Polite has no `==`; a single equals is the equality test)
    Equal,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    NotEqual,

    // Literals and names
    Identifier,
    /// String literal; the lexeme excludes the surrounding quotes.
    String,
    Integer,
    Decimal,

    // Punctuation
    Comma,
    LParen,
    RParen,

    /// Statement terminator: `;` or the keyword `PLEASE`.
    Terminator,

    /// Lexical error. The lexeme holds a static diagnostic message
    /// rather than a source span.
    Error,

    /// End of input; produced forever once reached.
    Eof,
}

impl TokenKind {
    /// True for the keywords that can begin a statement. Panic-mode
    /// recovery skips ahead to one of these.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Ask | TokenKind::Tell | TokenKind::Find | TokenKind::Show | TokenKind::Get
        )
    }
}

/// A classified lexical unit with its source position.
///
/// The lexeme borrows from the source string (or is a static message for
/// [`TokenKind::Error`]); tokens never outlive a parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub line: u32,
}

impl Token<'_> {
    /// Synthetic token used to prime parser state before the first advance.
    pub(crate) fn placeholder() -> Token<'static> {
        Token {
            kind: TokenKind::Eof,
            lexeme: "",
            line: 1,
        }
    }
}
