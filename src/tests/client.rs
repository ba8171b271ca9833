use std::time::Duration;

use super::example_protocol::{ProtocolExample, CODE_MISMATCH, DEVICE_FAULT};
use super::scripted::{ScriptedConn, Step};
use super::{echo, init_logger, serve_once};
use crate::{Client, Frame, FrameClient, RawFrame, Sentinel, TcpConn, TransportOptions};

#[test]
fn request_over_tcp_echo() {
    init_logger();
    let address = serve_once(echo);
    let conn = TcpConn::new(TransportOptions::new(address.to_string()));
    let mut client = FrameClient::new(ProtocolExample, conn);
    assert!(!client.is_connected());

    client.connect().expect("Unable to connect to server");
    assert!(client.is_connected());

    let request = RawFrame::new(vec![0x00, 0x10, 0x00, 0x02], 3);
    let response = client.request(&request).expect("Request failed");
    assert_eq!(response, request);
    assert_eq!(response.size(), Some(4));

    client.disconnect().expect("Disconnect failed");
    client.disconnect().expect("Second disconnect failed");
    assert!(!client.is_connected());
    assert!(client.request(&request).unwrap_err().is(Sentinel::ConnClosed));
}

#[test]
fn mismatched_function_code_fails_validation() {
    let conn = ScriptedConn::replying(vec![Step::Ok(vec![4, 0xaa])]);
    let mut client = FrameClient::new(ProtocolExample, conn);
    client.connect().expect("Connect failed");

    let err = client.request(&RawFrame::new(vec![0xaa], 3)).unwrap_err();
    let protocol_err = err.as_protocol().expect("Expected a protocol error");
    assert_eq!(protocol_err.code, CODE_MISMATCH);
    assert!(protocol_err.message.contains("expected function code 3, got 4"));
}

#[test]
fn device_fault_keeps_the_cause() {
    use std::error::Error as _;

    let conn = ScriptedConn::replying(vec![Step::Ok(vec![0x83, 0x02])]);
    let mut client = FrameClient::new(ProtocolExample, conn);
    client.connect().expect("Connect failed");

    let err = client.request(&RawFrame::new(Vec::<u8>::new(), 3)).unwrap_err();
    let protocol_err = err.as_protocol().expect("Expected a protocol error");
    assert_eq!(protocol_err.code, DEVICE_FAULT);
    let cause = protocol_err
        .source()
        .and_then(|source| source.downcast_ref::<Sentinel>())
        .copied();
    assert_eq!(cause, Some(Sentinel::DeviceError));
}

#[test]
fn empty_response_is_too_small() {
    let conn = ScriptedConn::replying(vec![Step::Ok(vec![])]);
    let mut client = FrameClient::new(ProtocolExample, conn);
    client.connect().expect("Connect failed");

    let err = client.request(&RawFrame::new(vec![1], 3)).unwrap_err();
    assert!(err.is(Sentinel::FrameTooSmall));
}

#[test]
fn encode_errors_never_reach_the_wire() {
    let conn = ScriptedConn::replying(vec![Step::Ok(vec![3])]);
    let mut client = FrameClient::new(ProtocolExample, conn);
    client.connect().expect("Connect failed");

    let err = client.request(&RawFrame::new(Vec::<u8>::new(), 300)).unwrap_err();
    assert_eq!(err.as_protocol().map(|e| e.code), Some(CODE_MISMATCH));
    assert!(client.conn().sent.is_empty());
}

#[test]
fn request_with_timeout_passes_the_timeout_down() {
    let conn = ScriptedConn::replying(vec![Step::Ok(vec![5, 1, 2])]);
    let mut client = FrameClient::new(ProtocolExample, conn);
    client.connect().expect("Connect failed");

    let response = client
        .request_with_timeout(&RawFrame::new(vec![9], 5), Duration::from_millis(40))
        .expect("Request failed");
    assert_eq!(response.data(), &[1, 2]);

    let (_, conn) = client.into_parts();
    assert_eq!(conn.sent, vec![vec![5, 9]]);
    assert_eq!(conn.timeouts, vec![Duration::from_millis(40)]);
}
