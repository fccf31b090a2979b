//! Unit tests for the protocol types
//!
//! These cover construction, the payload blob invariant and name validation;
//! wire round-trips live with the transport tests.

use crate::protocol::{validate_name, Message, Operation, Payload, MAX_NAME_LENGTH};

#[test]
fn test_payload_scalar_is_vacuous() {
    let p = Payload::scalar(7);
    assert_eq!(p.scalar, 7);
    assert!(p.blob.is_none());
    assert_eq!(p.blob_len(), 0);
    assert!(p.is_well_formed());
}

#[test]
fn test_payload_with_blob() {
    let p = Payload::with_blob(-1, vec![1, 2, 3]);
    assert_eq!(p.blob_len(), 3);
    assert!(p.is_well_formed());
}

#[test]
fn test_payload_empty_blob_is_malformed() {
    let p = Payload::new(0, Some(vec![]));
    assert!(!p.is_well_formed());
}

#[test]
fn test_operation_wire_discriminants() {
    for op in [
        Operation::Find,
        Operation::Call,
        Operation::ReplySuccess,
        Operation::ReplyFailure,
    ] {
        assert_eq!(Operation::from_wire(op.to_wire()), Some(op));
    }
    assert_eq!(Operation::Find.to_wire(), 0);
    assert_eq!(Operation::Call.to_wire(), 1);
    assert_eq!(Operation::ReplySuccess.to_wire(), 2);
    assert_eq!(Operation::ReplyFailure.to_wire(), 3);
    assert_eq!(Operation::from_wire(4), None);
    assert_eq!(Operation::from_wire(-1), None);
}

#[test]
fn test_find_constructor() {
    let msg = Message::find("add2");
    assert_eq!(msg.request_id, 0);
    assert_eq!(msg.operation, Operation::Find);
    assert_eq!(msg.function_name, "add2");
    assert_eq!(msg.payload, Payload::scalar(0));
}

#[test]
fn test_reply_echoes_request_id_and_name() {
    let reply = Message::reply_success(42, "add2", Payload::scalar(103));
    assert_eq!(reply.request_id, 42);
    assert_eq!(reply.function_name, "add2");
    assert_eq!(reply.operation, Operation::ReplySuccess);
}

#[test]
fn test_failure_envelope_is_vacuous() {
    let msg = Message::failure(9);
    assert_eq!(msg.request_id, 9);
    assert_eq!(msg.operation, Operation::ReplyFailure);
    assert_eq!(msg.payload, Payload::scalar(0));
    assert!(msg.validate().is_ok());
}

#[test]
fn test_validate_rejects_malformed_payload() {
    let msg = Message::call("f", Payload::new(0, Some(vec![])));
    assert!(msg.validate().is_err());
}

#[test]
fn test_name_validation_bounds() {
    assert!(validate_name("f").is_ok());
    assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH)).is_ok());
    assert!(validate_name("").is_err());
    assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    assert!(validate_name("bad\0name").is_err());
}
