//! Execution metadata and the rule-based engine classifier.
//!
//! The hint flag values, engine codes, and classification table are part
//! of the v1 wire contract consumed by the execution engine; the numbers
//! here must not change.

use crate::ast::{Node, NodeKind};

/// Bit flags advising the engine how to run a query.
///
/// `FULL_SCAN` is `0x0003` and therefore overlaps `PARALLEL_EXEC |
/// INDEX_SCAN` bit-wise; consumers treat the scan hints as a small enum
/// in the low bits. Fixed wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HintFlags(pub u16);

impl HintFlags {
    pub const PARALLEL_EXEC: u16 = 0x0001;
    pub const INDEX_SCAN: u16 = 0x0002;
    pub const FULL_SCAN: u16 = 0x0003;
    pub const CACHE_RESULT: u16 = 0x0004;
    pub const PRIORITY_HIGH: u16 = 0x0010;
    pub const PRIORITY_LOW: u16 = 0x0020;
    pub const READ_ONLY: u16 = 0x0040;

    pub fn contains(self, flags: u16) -> bool {
        self.0 & flags == flags
    }

    pub fn insert(&mut self, flags: u16) {
        self.0 |= flags;
    }

    pub fn bits(self) -> u16 {
        self.0
    }
}

/// Which storage engine a query is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineType {
    #[default]
    Auto,
    Sql,
    NoSql,
}

impl EngineType {
    pub fn wire_tag(self) -> u8 {
        match self {
            EngineType::Auto => 0,
            EngineType::Sql => 1,
            EngineType::NoSql => 2,
        }
    }

    pub fn from_wire_tag(tag: u8) -> Option<EngineType> {
        match tag {
            0 => Some(EngineType::Auto),
            1 => Some(EngineType::Sql),
            2 => Some(EngineType::NoSql),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EngineType::Auto => "auto",
            EngineType::Sql => "sql",
            EngineType::NoSql => "nosql",
        }
    }
}

/// Execution hints serialized into the artifact trailer. `timeout_ms` and
/// `estimated_rows` are advisory; nothing here is enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionMetadata {
    pub hint_flags: HintFlags,
    pub priority: u8,
    pub engine_type: EngineType,
    pub estimated_rows: u32,
    pub timeout_ms: u32,
    pub target_index: Option<String>,
}

impl Default for ExecutionMetadata {
    fn default() -> Self {
        ExecutionMetadata {
            hint_flags: HintFlags(0),
            priority: 128,
            engine_type: EngineType::Auto,
            estimated_rows: 0,
            timeout_ms: 30000,
            target_index: None,
        }
    }
}

/// True for the statement kinds routed to the NoSQL engine.
fn is_nosql_query(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Find { .. } | NodeKind::Show { .. } | NodeKind::Get { .. }
    )
}

/// Derive execution metadata from a statement node.
///
/// Pure function over the node shape; the same tree always classifies the
/// same way. `None` yields the defaults.
pub fn classify(node: Option<&Node>) -> ExecutionMetadata {
    let mut metadata = ExecutionMetadata::default();

    let Some(node) = node else {
        return metadata;
    };

    if is_nosql_query(node) {
        metadata.engine_type = EngineType::NoSql;
        metadata
            .hint_flags
            .insert(HintFlags::PARALLEL_EXEC | HintFlags::READ_ONLY);
        metadata.timeout_ms = 10000;

        match &node.kind {
            // FIND scans broadly and returns many rows
            NodeKind::Find { .. } => {
                metadata.estimated_rows = 10000;
                metadata.hint_flags.insert(HintFlags::FULL_SCAN);
            }
            // SHOW/GET are reporting queries; cache their results
            NodeKind::Show { .. } | NodeKind::Get { .. } => {
                metadata.estimated_rows = 1000;
                metadata.hint_flags.insert(HintFlags::CACHE_RESULT);
                metadata.priority = 96;
            }
            _ => {}
        }
    } else {
        metadata.engine_type = EngineType::Sql;

        match &node.kind {
            NodeKind::Ask {
                condition, limit, ..
            } => {
                metadata.hint_flags.insert(HintFlags::READ_ONLY);
                if condition.is_some() {
                    metadata.hint_flags.insert(HintFlags::INDEX_SCAN);
                    metadata.estimated_rows = 100;
                } else {
                    metadata.hint_flags.insert(HintFlags::FULL_SCAN);
                    metadata.estimated_rows = 1000;
                }
                if limit.is_some() {
                    metadata.hint_flags.insert(HintFlags::CACHE_RESULT);
                }
            }
            NodeKind::Tell { .. } => {
                // Writes run at high priority with no read-only flag
                metadata.priority = 192;
                metadata.hint_flags = HintFlags(0);
                metadata.estimated_rows = 1;
            }
            _ => {
                metadata.engine_type = EngineType::Auto;
            }
        }
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::Lexer, parser::Parser};

    fn parse(src: &str) -> Node {
        let mut parser = Parser::new(Lexer::new(src));
        let node = parser.parse_query();
        assert!(!parser.had_error(), "parse failed: {src}");
        node
    }

    #[test]
    fn defaults_for_no_node() {
        let m = classify(None);
        assert_eq!(m, ExecutionMetadata::default());
        assert_eq!(m.priority, 128);
        assert_eq!(m.timeout_ms, 30000);
    }

    #[test]
    fn find_is_nosql_full_scan() {
        let node = parse("FIND orders THAT total > 100");
        let m = classify(Some(&node));
        assert_eq!(m.engine_type, EngineType::NoSql);
        assert!(m.hint_flags.contains(HintFlags::FULL_SCAN));
        assert!(m.hint_flags.contains(HintFlags::PARALLEL_EXEC));
        assert!(m.hint_flags.contains(HintFlags::READ_ONLY));
        assert_eq!(m.estimated_rows, 10000);
        assert_eq!(m.timeout_ms, 10000);
    }

    #[test]
    fn show_and_get_cache_results() {
        for src in ["SHOW ME name FROM users", "GET name FROM users"] {
            let node = parse(src);
            let m = classify(Some(&node));
            assert_eq!(m.engine_type, EngineType::NoSql);
            assert!(m.hint_flags.contains(HintFlags::CACHE_RESULT));
            assert_eq!(m.priority, 96);
            assert_eq!(m.estimated_rows, 1000);
        }
    }

    #[test]
    fn ask_with_condition_prefers_index() {
        let node = parse("ASK users FOR name WHEN age > 18 LIMIT 5");
        let m = classify(Some(&node));
        assert_eq!(m.engine_type, EngineType::Sql);
        assert!(m.hint_flags.contains(HintFlags::INDEX_SCAN));
        assert!(m.hint_flags.contains(HintFlags::CACHE_RESULT));
        assert!(m.hint_flags.contains(HintFlags::READ_ONLY));
        assert_eq!(m.estimated_rows, 100);
        assert_eq!(m.timeout_ms, 30000);
    }

    #[test]
    fn ask_without_condition_scans() {
        let node = parse("ASK users FOR name");
        let m = classify(Some(&node));
        assert!(m.hint_flags.contains(HintFlags::FULL_SCAN));
        assert_eq!(m.estimated_rows, 1000);
    }

    #[test]
    fn tell_is_a_high_priority_write() {
        let node = parse("TELL users TO REMOVE WHEN age < 0");
        let m = classify(Some(&node));
        assert_eq!(m.engine_type, EngineType::Sql);
        assert_eq!(m.hint_flags.bits(), 0);
        assert_eq!(m.priority, 192);
        assert_eq!(m.estimated_rows, 1);
    }

    #[test]
    fn classification_is_idempotent() {
        let node = parse("FIND orders");
        let first = classify(Some(&node));
        let second = classify(Some(&node));
        assert_eq!(first, second);
    }
}
