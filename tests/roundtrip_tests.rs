//! Write-then-read tests through the protocol calls.

use std::io::Cursor;

use pretty_assertions::assert_eq;
use tcompact::{
    CompactProtocol, MemoryTransport, MessageHeader, MessageType, ProtocolError, State,
    StreamTransport, TType, Transport,
};

fn writer() -> CompactProtocol<MemoryTransport> {
    CompactProtocol::new(MemoryTransport::new())
}

fn reread(p: CompactProtocol<MemoryTransport>) -> CompactProtocol<MemoryTransport> {
    CompactProtocol::new(p.into_inner())
}

#[test]
fn test_single_field_struct() {
    let mut p = writer();
    p.write_struct_begin().unwrap();
    p.write_field_begin(TType::I32, 1).unwrap();
    p.write_i32(42).unwrap();
    p.write_field_end().unwrap();
    p.write_field_stop().unwrap();
    p.write_struct_end().unwrap();
    assert_eq!(p.transport().as_slice(), &[0x15, 84, 0x00]);

    let mut r = reread(p);
    r.read_struct_begin().unwrap();
    let field = r.read_field_begin().unwrap();
    assert_eq!((field.field_type, field.id), (TType::I32, 1));
    assert_eq!(r.read_i32().unwrap(), 42);
    r.read_field_end().unwrap();
    assert!(r.read_field_begin().unwrap().is_stop());
    r.read_struct_end().unwrap();
    assert_eq!(r.session().struct_depth(), 0);
    assert_eq!(r.state(), State::Clear);
}

#[test]
fn test_bool_field_in_header() {
    let mut p = writer();
    p.write_struct_begin().unwrap();
    p.write_field_begin(TType::Bool, 5).unwrap();
    p.write_bool(true).unwrap();
    p.write_field_end().unwrap();
    p.write_field_stop().unwrap();
    p.write_struct_end().unwrap();
    // delta 5, low nibble TRUE
    assert_eq!(p.transport().as_slice(), &[0x51, 0x00]);

    let mut r = reread(p);
    r.read_struct_begin().unwrap();
    let field = r.read_field_begin().unwrap();
    assert_eq!((field.field_type, field.id), (TType::Bool, 5));
    assert_eq!(r.state(), State::BoolRead);
    assert!(r.read_bool().unwrap());
    r.read_field_end().unwrap();
    assert!(r.read_field_begin().unwrap().is_stop());
    r.read_struct_end().unwrap();
}

#[test]
fn test_message_with_every_scalar() {
    let mut p = writer();
    p.write_message_begin(&MessageHeader::new("getUser", MessageType::Reply, 99))
        .unwrap();
    p.write_struct_begin().unwrap();
    p.write_field_begin(TType::Byte, 1).unwrap();
    p.write_byte(-7).unwrap();
    p.write_field_end().unwrap();
    p.write_field_begin(TType::I16, 2).unwrap();
    p.write_i16(i16::MIN).unwrap();
    p.write_field_end().unwrap();
    p.write_field_begin(TType::I64, 3).unwrap();
    p.write_i64(i64::MAX).unwrap();
    p.write_field_end().unwrap();
    p.write_field_begin(TType::Double, 4).unwrap();
    p.write_double(-0.5).unwrap();
    p.write_field_end().unwrap();
    p.write_field_begin(TType::String, 30).unwrap();
    p.write_string("héllo").unwrap();
    p.write_field_end().unwrap();
    p.write_field_begin(TType::Bool, 31).unwrap();
    p.write_bool(false).unwrap();
    p.write_field_end().unwrap();
    p.write_field_stop().unwrap();
    p.write_struct_end().unwrap();
    p.write_message_end().unwrap();
    p.flush().unwrap();

    let mut r = reread(p);
    let header = r.read_message_begin().unwrap();
    assert_eq!(
        header,
        MessageHeader::new("getUser", MessageType::Reply, 99)
    );
    r.read_struct_begin().unwrap();

    assert_eq!(r.read_field_begin().unwrap().id, 1);
    assert_eq!(r.read_byte().unwrap(), -7);
    r.read_field_end().unwrap();
    assert_eq!(r.read_field_begin().unwrap().id, 2);
    assert_eq!(r.read_i16().unwrap(), i16::MIN);
    r.read_field_end().unwrap();
    assert_eq!(r.read_field_begin().unwrap().id, 3);
    assert_eq!(r.read_i64().unwrap(), i64::MAX);
    r.read_field_end().unwrap();
    assert_eq!(r.read_field_begin().unwrap().id, 4);
    assert_eq!(r.read_double().unwrap(), -0.5);
    r.read_field_end().unwrap();
    let field = r.read_field_begin().unwrap();
    assert_eq!((field.field_type, field.id), (TType::String, 30));
    assert_eq!(r.read_string().unwrap(), "héllo");
    r.read_field_end().unwrap();
    let field = r.read_field_begin().unwrap();
    assert_eq!((field.field_type, field.id), (TType::Bool, 31));
    assert!(!r.read_bool().unwrap());
    r.read_field_end().unwrap();
    assert!(r.read_field_begin().unwrap().is_stop());
    r.read_struct_end().unwrap();
    r.read_message_end().unwrap();
    assert_eq!(r.state(), State::Clear);
    assert!(r.transport().remaining().is_empty());
}

#[test]
fn test_nested_struct_restores_field_ids() {
    let mut p = writer();
    p.write_struct_begin().unwrap();
    p.write_field_begin(TType::Struct, 10).unwrap();
    p.write_struct_begin().unwrap();
    p.write_field_begin(TType::I32, 1).unwrap();
    p.write_i32(1).unwrap();
    p.write_field_end().unwrap();
    p.write_field_stop().unwrap();
    p.write_struct_end().unwrap();
    p.write_field_end().unwrap();
    // delta from 10, not from the inner struct's 1
    p.write_field_begin(TType::I32, 11).unwrap();
    p.write_i32(2).unwrap();
    p.write_field_end().unwrap();
    p.write_field_stop().unwrap();
    p.write_struct_end().unwrap();
    assert_eq!(
        p.transport().as_slice(),
        &[0xAC, 0x15, 2, 0x00, 0x15, 4, 0x00]
    );

    let mut r = reread(p);
    r.read_struct_begin().unwrap();
    assert_eq!(r.read_field_begin().unwrap().id, 10);
    r.read_struct_begin().unwrap();
    assert_eq!(r.read_field_begin().unwrap().id, 1);
    assert_eq!(r.read_i32().unwrap(), 1);
    r.read_field_end().unwrap();
    assert!(r.read_field_begin().unwrap().is_stop());
    r.read_struct_end().unwrap();
    r.read_field_end().unwrap();
    assert_eq!(r.read_field_begin().unwrap().id, 11);
    assert_eq!(r.read_i32().unwrap(), 2);
}

#[test]
fn test_collections() {
    let mut p = writer();
    p.write_struct_begin().unwrap();
    p.write_field_begin(TType::List, 1).unwrap();
    p.write_list_begin(TType::I32, 20).unwrap();
    for i in 0..20 {
        p.write_i32(i).unwrap();
    }
    p.write_list_end().unwrap();
    p.write_field_end().unwrap();
    p.write_field_begin(TType::Set, 2).unwrap();
    p.write_set_begin(TType::Bool, 2).unwrap();
    p.write_bool(true).unwrap();
    p.write_bool(false).unwrap();
    p.write_set_end().unwrap();
    p.write_field_end().unwrap();
    p.write_field_begin(TType::Map, 3).unwrap();
    p.write_map_begin(TType::String, TType::Struct, 1).unwrap();
    p.write_string("k").unwrap();
    p.write_struct_begin().unwrap();
    p.write_field_stop().unwrap();
    p.write_struct_end().unwrap();
    p.write_map_end().unwrap();
    p.write_field_end().unwrap();
    p.write_field_begin(TType::Map, 4).unwrap();
    p.write_map_begin(TType::I16, TType::I16, 0).unwrap();
    p.write_map_end().unwrap();
    p.write_field_end().unwrap();
    p.write_field_stop().unwrap();
    p.write_struct_end().unwrap();

    let mut r = reread(p);
    r.read_struct_begin().unwrap();

    r.read_field_begin().unwrap();
    let list = r.read_list_begin().unwrap();
    assert_eq!((list.element_type, list.size), (TType::I32, 20));
    let values: Vec<i32> = (0..list.size).map(|_| r.read_i32().unwrap()).collect();
    assert_eq!(values, (0..20).collect::<Vec<_>>());
    r.read_list_end().unwrap();
    r.read_field_end().unwrap();

    r.read_field_begin().unwrap();
    let set = r.read_set_begin().unwrap();
    assert_eq!((set.element_type, set.size), (TType::Bool, 2));
    assert!(r.read_bool().unwrap());
    assert!(!r.read_bool().unwrap());
    r.read_set_end().unwrap();
    r.read_field_end().unwrap();

    r.read_field_begin().unwrap();
    let map = r.read_map_begin().unwrap();
    assert_eq!(
        (map.key_type, map.value_type, map.size),
        (TType::String, TType::Struct, 1)
    );
    assert_eq!(r.read_string().unwrap(), "k");
    r.read_struct_begin().unwrap();
    assert!(r.read_field_begin().unwrap().is_stop());
    r.read_struct_end().unwrap();
    r.read_map_end().unwrap();
    r.read_field_end().unwrap();

    r.read_field_begin().unwrap();
    let empty = r.read_map_begin().unwrap();
    assert_eq!(empty.size, 0);
    r.read_map_end().unwrap();
    r.read_field_end().unwrap();

    assert!(r.read_field_begin().unwrap().is_stop());
    r.read_struct_end().unwrap();
    assert_eq!(r.session().depth(), 0);
}

#[test]
fn test_binary_is_not_utf8_checked() {
    let mut p = writer();
    p.write_struct_begin().unwrap();
    p.write_field_begin(TType::String, 1).unwrap();
    p.write_binary(&[0xff, 0xfe, 0x00]).unwrap();
    p.write_field_end().unwrap();

    let mut r = reread(p);
    r.read_struct_begin().unwrap();
    r.read_field_begin().unwrap();
    assert_eq!(r.read_binary().unwrap(), vec![0xff, 0xfe, 0x00]);
}

#[test]
fn test_invalid_utf8_string() {
    let bytes = vec![0x18, 2, 0xc3, 0x28, 0x00];
    let mut r = CompactProtocol::new(MemoryTransport::from(bytes));
    r.read_struct_begin().unwrap();
    r.read_field_begin().unwrap();
    let err = r.read_string().unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidUtf8(_)));
}

#[test]
fn test_stream_transport() {
    let mut p = CompactProtocol::new(StreamTransport::new(Cursor::new(Vec::new())));
    p.write_message_begin(&MessageHeader::new("event", MessageType::Oneway, 0))
        .unwrap();
    p.write_struct_begin().unwrap();
    p.write_field_stop().unwrap();
    p.write_struct_end().unwrap();
    p.write_message_end().unwrap();
    p.flush().unwrap();

    let mut cursor = p.into_inner().into_inner();
    cursor.set_position(0);
    let mut r = CompactProtocol::new(StreamTransport::new(cursor));
    let header = r.read_message_begin().unwrap();
    assert_eq!(header.message_type, MessageType::Oneway);
    assert_eq!(header.name, "event");
    r.read_struct_begin().unwrap();
    assert!(r.read_field_begin().unwrap().is_stop());
    r.read_struct_end().unwrap();
    r.read_message_end().unwrap();
}

#[test]
fn test_truncated_input_is_transport_error() {
    let mut r = CompactProtocol::new(MemoryTransport::from(vec![0x17, 0, 0, 0]));
    r.read_struct_begin().unwrap();
    r.read_field_begin().unwrap();
    let err = r.read_double().unwrap_err();
    match err {
        ProtocolError::Transport(e) => assert!(e.is_eof()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_boxed_transport() {
    let transport: Box<dyn Transport> = Box::new(MemoryTransport::new());
    let mut p = CompactProtocol::new(transport);
    p.write_struct_begin().unwrap();
    p.write_field_stop().unwrap();
    p.write_struct_end().unwrap();
    assert_eq!(p.state(), State::Clear);
}
