use super::operators::{BinaryOp, UnaryOp};

/// A syntax tree node: a source line number plus the production-specific
/// payload. Children are owned; dropping the root drops the whole tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub line: u32,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(line: u32, kind: NodeKind) -> Self {
        Node { line, kind }
    }

    /// True when this node (or, for a program, any statement in it) is a
    /// parse-error placeholder.
    pub fn has_errors(&self) -> bool {
        match &self.kind {
            NodeKind::Error(_) => true,
            NodeKind::Program(stmts) => stmts.iter().any(Node::has_errors),
            _ => false,
        }
    }
}

/// One production of the grammar.
///
/// Query statements keep one field per optional clause so downstream
/// passes can test clause presence without walking children.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `ASK <source> FOR <fields> [IF|WHEN|WHERE <cond>] [GROUP BY ...]
    /// [ORDER|SORT BY ...] [LIMIT n]`
    Ask {
        source: Box<Node>,
        fields: Box<Node>,
        condition: Option<Box<Node>>,
        group_by: Option<Box<Node>>,
        order_by: Option<Box<Node>>,
        limit: Option<Box<Node>>,
    },

    /// `TELL <source> TO <action> [IF|WHEN|WHERE <cond>]`
    Tell {
        source: Box<Node>,
        action: Box<Node>,
        condition: Option<Box<Node>>,
    },

    /// `FIND <source> [THAT|WHICH|WHERE <cond>] [GROUP BY ...]
    /// [ORDER|SORT BY ...] [LIMIT n]`
    Find {
        source: Box<Node>,
        condition: Option<Box<Node>>,
        group_by: Option<Box<Node>>,
        order_by: Option<Box<Node>>,
        limit: Option<Box<Node>>,
    },

    /// `SHOW [ME] <fields> FROM <source> ...`
    Show {
        source: Box<Node>,
        fields: Box<Node>,
        condition: Option<Box<Node>>,
        group_by: Option<Box<Node>>,
        order_by: Option<Box<Node>>,
        limit: Option<Box<Node>>,
    },

    /// `GET <fields> FROM <source> ...` (same clause set as SHOW)
    Get {
        source: Box<Node>,
        fields: Box<Node>,
        condition: Option<Box<Node>>,
        group_by: Option<Box<Node>>,
        order_by: Option<Box<Node>>,
        limit: Option<Box<Node>>,
    },

    /// Comma-separated projection list of identifiers or quoted names.
    FieldList(Vec<Node>),

    /// A named data source with an optional join chain.
    Source {
        name: String,
        join: Option<Box<Node>>,
    },

    /// `WITH <source> WHEN|WHERE <cond>`
    Join {
        source: Box<Node>,
        condition: Box<Node>,
    },

    /// `GROUP BY <fields> [HAVING <cond>]`
    GroupBy {
        fields: Box<Node>,
        having: Option<Box<Node>>,
    },

    /// `ORDER BY` / `SORT BY` key list.
    OrderBy(Vec<OrderKey>),

    /// `LIMIT n`; offset is reserved for a future `OFFSET` clause and is
    /// always 0 today.
    Limit { limit: i32, offset: i32 },

    /// `ADD <value> [WITH <record spec>]`
    Add {
        value: Box<Node>,
        record_spec: Option<Box<Node>>,
    },

    /// `REMOVE` (the enclosing TELL carries the condition).
    Remove { condition: Option<Box<Node>> },

    /// `UPDATE field = value, ...`
    Update { assignments: Vec<(Node, Node)> },

    /// `CREATE field type [constraints], ...`
    Create { field_defs: Vec<Node> },

    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },

    Identifier(String),

    Literal(Literal),

    /// Column definition inside CREATE.
    FieldDef {
        name: Box<Node>,
        type_name: Option<String>,
        constraints: Vec<Node>,
    },

    Constraint {
        kind: ConstraintKind,
        default_value: Option<Box<Node>>,
    },

    FunctionCall { name: String, args: Vec<Node> },

    /// Placeholder left behind where a production failed to parse; the
    /// message matches the diagnostic that was reported.
    Error(String),

    /// Top-level statement sequence.
    Program(Vec<Node>),
}

impl NodeKind {
    /// Tag byte identifying the variant in the serialized form.
    pub fn wire_tag(&self) -> u8 {
        match self {
            NodeKind::Ask { .. } => 0,
            NodeKind::Tell { .. } => 1,
            NodeKind::Find { .. } => 2,
            NodeKind::Show { .. } => 3,
            NodeKind::Get { .. } => 4,
            NodeKind::FieldList(_) => 5,
            NodeKind::Source { .. } => 6,
            NodeKind::Join { .. } => 7,
            NodeKind::GroupBy { .. } => 8,
            NodeKind::OrderBy(_) => 9,
            NodeKind::Limit { .. } => 10,
            NodeKind::Add { .. } => 11,
            NodeKind::Remove { .. } => 12,
            NodeKind::Update { .. } => 13,
            NodeKind::Create { .. } => 14,
            NodeKind::Binary { .. } => 15,
            NodeKind::Unary { .. } => 16,
            NodeKind::Identifier(_) => 17,
            NodeKind::Literal(_) => 18,
            NodeKind::FieldDef { .. } => 19,
            NodeKind::Constraint { .. } => 20,
            NodeKind::FunctionCall { .. } => 21,
            NodeKind::Error(_) => 22,
            NodeKind::Program(_) => 23,
        }
    }

    /// Human-readable variant name, used by the printers.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Ask { .. } => "AskQuery",
            NodeKind::Tell { .. } => "TellQuery",
            NodeKind::Find { .. } => "FindQuery",
            NodeKind::Show { .. } => "ShowQuery",
            NodeKind::Get { .. } => "GetQuery",
            NodeKind::FieldList(_) => "FieldList",
            NodeKind::Source { .. } => "Source",
            NodeKind::Join { .. } => "Join",
            NodeKind::GroupBy { .. } => "GroupBy",
            NodeKind::OrderBy(_) => "OrderBy",
            NodeKind::Limit { .. } => "Limit",
            NodeKind::Add { .. } => "AddAction",
            NodeKind::Remove { .. } => "RemoveAction",
            NodeKind::Update { .. } => "UpdateAction",
            NodeKind::Create { .. } => "CreateAction",
            NodeKind::Binary { .. } => "BinaryExpr",
            NodeKind::Unary { .. } => "UnaryExpr",
            NodeKind::Identifier(_) => "Identifier",
            NodeKind::Literal(_) => "Literal",
            NodeKind::FieldDef { .. } => "FieldDef",
            NodeKind::Constraint { .. } => "Constraint",
            NodeKind::FunctionCall { .. } => "FunctionCall",
            NodeKind::Error(_) => "Error",
            NodeKind::Program(_) => "Program",
        }
    }
}

/// One `ORDER BY` key: the expression and its direction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderKey {
    pub field: Node,
    pub ascending: bool,
}

/// Literal values. Integers keep their `i64` value in the tree; the wire
/// format carries every number as an 8-byte float.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Decimal(f64),
}

impl Literal {
    /// Tag byte identifying the literal kind in the serialized form.
    pub fn wire_tag(&self) -> u8 {
        match self {
            Literal::String(_) => 42,
            Literal::Integer(_) => 43,
            Literal::Decimal(_) => 44,
        }
    }
}

/// Column constraints accepted inside CREATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Required,
    Unique,
    Default,
}

impl ConstraintKind {
    pub fn wire_tag(self) -> u8 {
        match self {
            ConstraintKind::Required => 0,
            ConstraintKind::Unique => 1,
            ConstraintKind::Default => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintKind::Required => "REQUIRED",
            ConstraintKind::Unique => "UNIQUE",
            ConstraintKind::Default => "DEFAULT",
        }
    }
}
