//! Binary serialization of syntax trees.
//!
//! Artifact layout, all integers little-endian:
//!
//! ```text
//! header (28 bytes): magic u32, version u32, reserved u32,
//!                    data_size u32, original_size u32, checksum u32,
//!                    reserved u32
//! body:              pre-order nodes, each [tag:u8][line:u32][payload];
//!                    0xFF marks an absent optional child
//! trailer:           hint_flags u16, priority u8, engine u8,
//!                    estimated_rows u32, timeout_ms u32,
//!                    target_index bytes, target_index length u16
//! ```
//!
//! The checksum is a CRC-32 of the data region (body + trailer).
//! `original_size` equals `data_size`; it is reserved for a compressed
//! encoding that shares this header.

use std::fmt;

use crate::ast::{Literal, Node, NodeKind, OrderKey};
use crate::errors::{ErrorContext, ErrorSource, Severity};
use crate::metadata::{EngineType, ExecutionMetadata, HintFlags};

/// `"LQRN"` read as a little-endian u32.
pub const AST_MAGIC: u32 = 0x4E52514C;
pub const AST_VERSION: u32 = 1;

const HEADER_SIZE: usize = 28;
const NULL_NODE_TAG: u8 = 0xFF;

/// Why a byte buffer could not be accepted as an artifact. A checksum
/// mismatch is deliberately not in this list; it yields an invalid
/// [`SerializedAst`] instead so callers can still inspect the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Shorter than the fixed header.
    TooShort,
    /// Magic number does not match.
    BadMagic,
    /// Version is newer than this crate understands.
    UnsupportedVersion,
    /// Buffer length disagrees with the header's data size.
    SizeMismatch,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::TooShort => write!(f, "buffer too short for artifact header"),
            CodecError::BadMagic => write!(f, "bad magic number"),
            CodecError::UnsupportedVersion => write!(f, "unsupported artifact version"),
            CodecError::SizeMismatch => write!(f, "buffer size does not match header"),
        }
    }
}

impl std::error::Error for CodecError {}

// CRC-32 (reflected, polynomial 0xEDB88320), table built at compile time.

const CRC32_TABLE: [u32; 256] = build_crc32_table();

const fn build_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { 0xEDB88320 ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

pub fn crc32(data: &[u8]) -> u32 {
    let mut c = 0xFFFF_FFFFu32;
    for &byte in data {
        c = CRC32_TABLE[((c ^ byte as u32) & 0xFF) as usize] ^ (c >> 8);
    }
    c ^ 0xFFFF_FFFF
}

/// An encoded artifact: header, body, and trailer in one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedAst {
    data: Vec<u8>,
    checksum: u32,
    is_valid: bool,
}

impl SerializedAst {
    /// The complete artifact bytes, header included.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// CRC-32 of the data region as computed when this value was built.
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// False when the stored checksum disagreed with the computed one at
    /// deserialization time.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Recompute the data-region checksum and compare it against the one
    /// stored in the header.
    pub fn verify_checksum(&self) -> bool {
        if self.data.len() < HEADER_SIZE {
            return false;
        }
        let data_size = read_u32(&self.data, 12) as usize;
        let stored = read_u32(&self.data, 20);
        match self.data.get(HEADER_SIZE..HEADER_SIZE + data_size) {
            Some(region) => crc32(region) == stored,
            None => false,
        }
    }

    /// Recover the execution metadata by walking backward from the end of
    /// the data region. The trailer ends with the index name's length, so
    /// the walk needs no knowledge of the body.
    pub fn extract_metadata(&self) -> Option<ExecutionMetadata> {
        if !self.is_valid {
            return None;
        }

        let data_size = read_u32(&self.data, 12) as usize;
        let region = self.data.get(HEADER_SIZE..HEADER_SIZE + data_size)?;

        // Fixed-width scalars (12 bytes) plus the string length prefix
        if region.len() < 14 {
            return None;
        }

        let mut pos = region.len() - 2;
        let str_len = u16::from_le_bytes([region[pos], region[pos + 1]]) as usize;
        if pos < str_len + 12 {
            return None;
        }

        pos -= str_len;
        let target_index = if str_len > 0 {
            Some(String::from_utf8_lossy(&region[pos..pos + str_len]).into_owned())
        } else {
            None
        };

        pos -= 4;
        let timeout_ms = u32::from_le_bytes(region[pos..pos + 4].try_into().ok()?);
        pos -= 4;
        let estimated_rows = u32::from_le_bytes(region[pos..pos + 4].try_into().ok()?);
        pos -= 1;
        let engine_type = EngineType::from_wire_tag(region[pos]).unwrap_or(EngineType::Auto);
        pos -= 1;
        let priority = region[pos];
        pos -= 2;
        let hint_flags = HintFlags(u16::from_le_bytes([region[pos], region[pos + 1]]));

        Some(ExecutionMetadata {
            hint_flags,
            priority,
            engine_type,
            estimated_rows,
            timeout_ms,
            target_index,
        })
    }
}

/// Encode a tree and its metadata into an artifact.
///
/// With no metadata the classifier defaults are written. Oversized
/// strings are truncated with a Warning report; encoding itself cannot
/// fail, since ownership guarantees a well-formed tree.
pub fn serialize(
    root: &Node,
    metadata: Option<&ExecutionMetadata>,
    errors: &mut ErrorContext,
) -> SerializedAst {
    let mut encoder = Encoder {
        buf: Vec::with_capacity(4096),
        errors,
    };

    encoder.node(root);

    let default_metadata;
    let metadata = match metadata {
        Some(m) => m,
        None => {
            default_metadata = ExecutionMetadata::default();
            &default_metadata
        }
    };
    encoder.metadata(metadata);

    let body = encoder.buf;
    let checksum = crc32(&body);

    let mut data = Vec::with_capacity(HEADER_SIZE + body.len());
    data.extend_from_slice(&AST_MAGIC.to_le_bytes());
    data.extend_from_slice(&AST_VERSION.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&(body.len() as u32).to_le_bytes());
    // Original size; no compression, so it equals the data size
    data.extend_from_slice(&(body.len() as u32).to_le_bytes());
    data.extend_from_slice(&checksum.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&body);

    SerializedAst {
        data,
        checksum,
        is_valid: true,
    }
}

/// Validate an artifact envelope and recover its checksum state.
///
/// The node tree is not rebuilt; the downstream engine owns the body
/// format. A checksum mismatch returns `Ok` with `is_valid() == false`.
pub fn deserialize(bytes: &[u8]) -> Result<SerializedAst, CodecError> {
    if bytes.len() < HEADER_SIZE {
        return Err(CodecError::TooShort);
    }

    let magic = read_u32(bytes, 0);
    let version = read_u32(bytes, 4);
    let data_size = read_u32(bytes, 12) as usize;
    let stored_checksum = read_u32(bytes, 20);

    if magic != AST_MAGIC {
        return Err(CodecError::BadMagic);
    }
    if version > AST_VERSION {
        return Err(CodecError::UnsupportedVersion);
    }
    if bytes.len() != HEADER_SIZE + data_size {
        return Err(CodecError::SizeMismatch);
    }

    let computed = crc32(&bytes[HEADER_SIZE..]);

    Ok(SerializedAst {
        data: bytes.to_vec(),
        checksum: computed,
        is_valid: computed == stored_checksum,
    })
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

struct Encoder<'e> {
    buf: Vec<u8>,
    errors: &'e mut ErrorContext,
}

impl Encoder<'_> {
    fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// u16-length-prefixed string; anything past 65535 bytes is dropped
    /// with a warning.
    fn string(&mut self, s: &str, line: u32) {
        let mut bytes = s.as_bytes();
        if bytes.len() > u16::MAX as usize {
            self.errors.report(
                Severity::Warning,
                ErrorSource::System,
                line,
                0,
                format!("String too long, truncating to {} bytes", u16::MAX),
            );
            bytes = &bytes[..u16::MAX as usize];
        }
        self.u16(bytes.len() as u16);
        self.buf.extend_from_slice(bytes);
    }

    fn opt_string(&mut self, s: Option<&str>, line: u32) {
        match s {
            Some(s) => self.string(s, line),
            None => self.u16(0),
        }
    }

    fn opt_node(&mut self, node: &Option<Box<Node>>) {
        match node {
            Some(node) => self.node(node),
            None => self.u8(NULL_NODE_TAG),
        }
    }

    /// u16 element count; entries past 65535 are dropped with a warning,
    /// the same rule oversized strings follow. Returns how many elements
    /// the caller should encode.
    fn count(&mut self, len: usize, line: u32) -> usize {
        let clamped = len.min(u16::MAX as usize);
        if clamped != len {
            self.errors.report(
                Severity::Warning,
                ErrorSource::System,
                line,
                0,
                format!("List too long, truncating to {} items", u16::MAX),
            );
        }
        self.u16(clamped as u16);
        clamped
    }

    fn node(&mut self, node: &Node) {
        self.u8(node.kind.wire_tag());
        self.u32(node.line);

        match &node.kind {
            NodeKind::Ask {
                source,
                fields,
                condition,
                group_by,
                order_by,
                limit,
            }
            | NodeKind::Show {
                source,
                fields,
                condition,
                group_by,
                order_by,
                limit,
            }
            | NodeKind::Get {
                source,
                fields,
                condition,
                group_by,
                order_by,
                limit,
            } => {
                self.node(source);
                self.node(fields);
                self.opt_node(condition);
                self.opt_node(group_by);
                self.opt_node(order_by);
                self.opt_node(limit);
            }

            NodeKind::Tell {
                source,
                action,
                condition,
            } => {
                self.node(source);
                self.node(action);
                self.opt_node(condition);
            }

            NodeKind::Find {
                source,
                condition,
                group_by,
                order_by,
                limit,
            } => {
                self.node(source);
                self.opt_node(condition);
                self.opt_node(group_by);
                self.opt_node(order_by);
                self.opt_node(limit);
            }

            NodeKind::FieldList(fields) => {
                let n = self.count(fields.len(), node.line);
                for field in &fields[..n] {
                    self.node(field);
                }
            }

            NodeKind::Source { name, join } => {
                self.string(name, node.line);
                match join {
                    Some(join) => {
                        self.u8(1);
                        self.node(join);
                    }
                    None => self.u8(0),
                }
            }

            NodeKind::Join { source, condition } => {
                self.node(source);
                self.node(condition);
            }

            NodeKind::GroupBy { fields, having } => {
                self.node(fields);
                self.opt_node(having);
            }

            NodeKind::OrderBy(keys) => {
                let n = self.count(keys.len(), node.line);
                for OrderKey { field, ascending } in &keys[..n] {
                    self.node(field);
                    self.u8(*ascending as u8);
                }
            }

            NodeKind::Limit { limit, offset } => {
                self.i32(*limit);
                self.i32(*offset);
            }

            NodeKind::Add { value, record_spec } => {
                self.node(value);
                self.opt_node(record_spec);
            }

            NodeKind::Remove { condition } => {
                self.opt_node(condition);
            }

            NodeKind::Update { assignments } => {
                let n = self.count(assignments.len(), node.line);
                for (field, value) in &assignments[..n] {
                    self.node(field);
                    self.node(value);
                }
            }

            NodeKind::Create { field_defs } => {
                let n = self.count(field_defs.len(), node.line);
                for def in &field_defs[..n] {
                    self.node(def);
                }
            }

            NodeKind::Binary { op, left, right } => {
                self.u8(op.wire_tag());
                self.node(left);
                self.node(right);
            }

            NodeKind::Unary { op, operand } => {
                self.u8(op.wire_tag());
                self.node(operand);
            }

            NodeKind::Identifier(name) => {
                self.string(name, node.line);
            }

            NodeKind::Literal(literal) => {
                self.u8(literal.wire_tag());
                match literal {
                    Literal::String(s) => self.string(s, node.line),
                    // Numbers are always 8-byte floats on the wire
                    Literal::Integer(i) => self.f64(*i as f64),
                    Literal::Decimal(d) => self.f64(*d),
                }
            }

            NodeKind::FieldDef {
                name,
                type_name,
                constraints,
            } => {
                self.node(name);
                self.opt_string(type_name.as_deref(), node.line);
                let n = self.count(constraints.len(), node.line);
                for constraint in &constraints[..n] {
                    self.node(constraint);
                }
            }

            NodeKind::Constraint {
                kind,
                default_value,
            } => {
                self.u8(kind.wire_tag());
                self.opt_node(default_value);
            }

            NodeKind::FunctionCall { name, args } => {
                self.string(name, node.line);
                let n = self.count(args.len(), node.line);
                for arg in &args[..n] {
                    self.node(arg);
                }
            }

            NodeKind::Error(message) => {
                self.string(message, node.line);
            }

            NodeKind::Program(statements) => {
                let n = self.count(statements.len(), node.line);
                for statement in &statements[..n] {
                    self.node(statement);
                }
            }
        }
    }

    fn metadata(&mut self, metadata: &ExecutionMetadata) {
        self.u16(metadata.hint_flags.bits());
        self.u8(metadata.priority);
        self.u8(metadata.engine_type.wire_tag());
        self.u32(metadata.estimated_rows);
        self.u32(metadata.timeout_ms);

        // The index name closes the data region with its length as a
        // suffix, so extraction can walk backward from the end.
        let name = metadata.target_index.as_deref().unwrap_or("");
        let bytes = &name.as_bytes()[..name.len().min(u16::MAX as usize)];
        self.buf.extend_from_slice(bytes);
        self.u16(bytes.len() as u16);
    }
}

#[test]
fn test_crc32_check_value() {
    // Standard CRC-32 check value
    assert_eq!(crc32(b"123456789"), 0xCBF43926);
}

#[test]
fn test_crc32_of_empty_input() {
    assert_eq!(crc32(b""), 0);
}
