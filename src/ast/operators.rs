//! Operator enums shared by the parser, printer, and codec.
//!
//! The wire tag values are fixed by the v1 binary format, which encodes an
//! operator as the numeric value of the token that produced it.

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Logical
    /// Logical AND (`AND`)
    And,
    /// Logical OR (`OR`)
    Or,

    // Comparison
    /// Equality (`=`)
    Equal,
    /// Inequality (`!=`)
    NotEqual,
    /// Less than (`<`)
    Less,
    /// Greater than (`>`)
    Greater,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Pattern match (`LIKE`)
    Like,

    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,
}

impl BinaryOp {
    /// Tag byte used in the serialized form.
    pub fn wire_tag(self) -> u8 {
        match self {
            BinaryOp::And => 16,
            BinaryOp::Or => 17,
            BinaryOp::Add => 29,
            BinaryOp::Subtract => 30,
            BinaryOp::Multiply => 31,
            BinaryOp::Divide => 32,
            BinaryOp::Modulo => 33,
            BinaryOp::Equal => 34,
            BinaryOp::Greater => 35,
            BinaryOp::Less => 36,
            BinaryOp::GreaterEqual => 37,
            BinaryOp::LessEqual => 38,
            BinaryOp::NotEqual => 39,
            BinaryOp::Like => 40,
        }
    }

    /// Source-level spelling, as the text printer shows it.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Like => "LIKE",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation (`NOT`)
    Not,
    /// Arithmetic negation (`-`)
    Negate,
}

impl UnaryOp {
    /// Tag byte used in the serialized form.
    pub fn wire_tag(self) -> u8 {
        match self {
            UnaryOp::Not => 27,
            UnaryOp::Negate => 30,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "NOT",
            UnaryOp::Negate => "-",
        }
    }
}
