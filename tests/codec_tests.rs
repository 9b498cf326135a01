// tests/codec_tests.rs

use polite_lang::codec::{self, CodecError};
use polite_lang::errors::{ErrorContext, ErrorSource, Severity};
use polite_lang::lexer::Lexer;
use polite_lang::metadata::{classify, EngineType, HintFlags};
use polite_lang::parser::Parser;
use polite_lang::Node;

fn parse(source: &str) -> Node {
    let mut parser = Parser::new(Lexer::new(source));
    let node = parser.parse_query();
    assert!(!parser.had_error(), "unexpected parse error for: {}", source);
    node
}

fn serialize(source: &str) -> codec::SerializedAst {
    let node = parse(source);
    let metadata = classify(Some(&node));
    let mut errors = ErrorContext::new();
    let artifact = codec::serialize(&node, Some(&metadata), &mut errors);
    assert_eq!(errors.error_count(), 0);
    artifact
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_serialize_produces_a_valid_artifact() {
    let artifact = serialize("ASK users FOR name, email WHEN age > 18");
    assert!(artifact.is_valid());
    assert!(artifact.verify_checksum());
    assert!(artifact.len() > 28);
}

#[test]
fn test_magic_bytes_lead_the_artifact() {
    let artifact = serialize("FIND orders");
    assert_eq!(&artifact.data()[..4], &[0x4C, 0x51, 0x52, 0x4E]);
}

#[test]
fn test_deserialize_round_trip() {
    let artifact = serialize("GET name FROM users LIMIT 5");
    let back = codec::deserialize(artifact.data()).expect("round trip should succeed");
    assert!(back.is_valid());
    assert_eq!(back.checksum(), artifact.checksum());
    assert_eq!(back.data(), artifact.data());
}

#[test]
fn test_metadata_survives_the_round_trip() {
    let node = parse("ASK users FOR name WHEN age > 18 LIMIT 10");
    let metadata = classify(Some(&node));
    let mut errors = ErrorContext::new();
    let artifact = codec::serialize(&node, Some(&metadata), &mut errors);

    let recovered = artifact.extract_metadata().expect("metadata should extract");
    assert_eq!(recovered, metadata);
    assert_eq!(recovered.engine_type, EngineType::Sql);
    assert!(recovered.hint_flags.contains(HintFlags::INDEX_SCAN));
    assert!(recovered.hint_flags.contains(HintFlags::CACHE_RESULT));
    assert_eq!(recovered.estimated_rows, 100);
}

#[test]
fn test_default_metadata_when_none_is_given() {
    let node = parse("FIND orders");
    let mut errors = ErrorContext::new();
    let artifact = codec::serialize(&node, None, &mut errors);

    let recovered = artifact.extract_metadata().expect("metadata should extract");
    assert_eq!(recovered.priority, 128);
    assert_eq!(recovered.timeout_ms, 30000);
    assert_eq!(recovered.engine_type, EngineType::Auto);
    assert_eq!(recovered.target_index, None);
}

#[test]
fn test_write_metadata_trailer() {
    let node = parse("TELL users TO REMOVE WHEN age < 0");
    let metadata = classify(Some(&node));
    let mut errors = ErrorContext::new();
    let artifact = codec::serialize(&node, Some(&metadata), &mut errors);

    let recovered = artifact.extract_metadata().unwrap();
    assert_eq!(recovered.engine_type, EngineType::Sql);
    assert_eq!(recovered.priority, 192);
    assert_eq!(recovered.hint_flags.bits(), 0);
    assert_eq!(recovered.estimated_rows, 1);
}

#[test]
fn test_target_index_round_trips() {
    let node = parse("ASK users FOR name WHEN age > 18");
    let mut metadata = classify(Some(&node));
    metadata.target_index = Some("idx_users_age".to_string());

    let mut errors = ErrorContext::new();
    let artifact = codec::serialize(&node, Some(&metadata), &mut errors);

    let recovered = artifact.extract_metadata().unwrap();
    assert_eq!(recovered.target_index.as_deref(), Some("idx_users_age"));
    assert_eq!(recovered, metadata);
}

// ============================================================================
// Corruption
// ============================================================================

#[test]
fn test_flipping_one_body_byte_fails_validation() {
    let artifact = serialize("ASK users FOR name");
    let mut bytes = artifact.data().to_vec();
    bytes[30] ^= 0x01;

    let back = codec::deserialize(&bytes).expect("structure is still parseable");
    assert!(!back.is_valid());
    assert!(back.extract_metadata().is_none());
}

#[test]
fn test_too_short_input() {
    assert!(matches!(
        codec::deserialize(&[0u8; 10]),
        Err(CodecError::TooShort)
    ));
}

#[test]
fn test_bad_magic() {
    let artifact = serialize("FIND orders");
    let mut bytes = artifact.data().to_vec();
    bytes[0] = 0x00;
    assert!(matches!(
        codec::deserialize(&bytes),
        Err(CodecError::BadMagic)
    ));
}

#[test]
fn test_future_version_is_rejected() {
    let artifact = serialize("FIND orders");
    let mut bytes = artifact.data().to_vec();
    // Version lives at offset 4; the checksum does not cover the header
    bytes[4] = 0x02;
    assert!(matches!(
        codec::deserialize(&bytes),
        Err(CodecError::UnsupportedVersion)
    ));
}

#[test]
fn test_trailing_bytes_are_a_size_mismatch() {
    let artifact = serialize("FIND orders");
    let mut bytes = artifact.data().to_vec();
    bytes.push(0x00);
    assert!(matches!(
        codec::deserialize(&bytes),
        Err(CodecError::SizeMismatch)
    ));
}

// ============================================================================
// Oversized strings
// ============================================================================

#[test]
fn test_long_strings_truncate_with_a_warning() {
    let long_name = "x".repeat(70_000);
    let source = format!("ASK users FOR name WHEN name = \"{}\"", long_name);
    let node = parse(&source);

    let mut errors = ErrorContext::new();
    let artifact = codec::serialize(&node, None, &mut errors);

    assert!(artifact.is_valid());
    assert_eq!(errors.error_count(), 0);
    assert_eq!(errors.warning_count(), 1);

    let report = &errors.reports()[0];
    assert_eq!(report.severity, Severity::Warning);
    assert_eq!(report.source, ErrorSource::System);
    assert!(report.message.contains("truncating"), "got: {}", report.message);

    // The artifact still round-trips after truncation
    assert!(codec::deserialize(artifact.data()).unwrap().is_valid());
}

#[test]
fn test_long_lists_truncate_with_a_warning() {
    use polite_lang::NodeKind;

    let fields: Vec<Node> = (0..70_000)
        .map(|i| Node::new(1, NodeKind::Identifier(format!("f{}", i))))
        .collect();
    let list = Node::new(1, NodeKind::FieldList(fields));

    let mut errors = ErrorContext::new();
    let artifact = codec::serialize(&list, None, &mut errors);

    assert!(artifact.is_valid());
    assert_eq!(errors.error_count(), 0);
    assert_eq!(errors.warning_count(), 1);
    assert!(
        errors.reports()[0].message.contains("truncating"),
        "got: {}",
        errors.reports()[0].message
    );

    // The count and the encoded elements agree: 65535 entries, each
    // [tag:u8][line:u32][len:u16]["f" + digits], followed by the trailer
    assert!(codec::deserialize(artifact.data()).unwrap().is_valid());
    let body = &artifact.data()[28..];
    assert_eq!(u16::from_le_bytes([body[5], body[6]]), u16::MAX);
}
