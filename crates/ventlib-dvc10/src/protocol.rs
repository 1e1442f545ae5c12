//! DVC 10 request encoder and reply decoder.
//!
//! Requests are a fixed six-byte client identity followed by a one or two
//! byte operation code:
//!
//! ```text
//! 6d 6f 62 69 6c 65 | 01 0d
//! "m  o  b  i  l  e"  op code (get status)
//! ```
//!
//! Replies are fixed-layout status frames; the layout and its decoder live in
//! [`ventlib_core::frame`] so simulators can build frames without depending on
//! this crate.

use bytes::{BufMut, BytesMut};

use ventlib_core::error::Result;
use ventlib_core::frame;
use ventlib_core::status::DeviceStatus;

/// Client identity prefix on every request (`mobile`).
pub const REQUEST_PREFIX: &[u8; 6] = b"mobile";

/// Identity prefix the unit puts on replies (`master`). Not validated.
pub const REPLY_PREFIX: &[u8; 6] = frame::REPLY_PREFIX;

/// Encode a request: identity prefix followed by the operation code.
///
/// # Example
///
/// ```
/// use ventlib_dvc10::protocol::encode_command;
///
/// let bytes = encode_command(&[0x04, 0x03]);
/// assert_eq!(bytes, b"mobile\x04\x03");
/// ```
pub fn encode_command(op_code: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(REQUEST_PREFIX.len() + op_code.len());
    buf.put_slice(REQUEST_PREFIX);
    buf.put_slice(op_code);
    buf.to_vec()
}

/// Decode a reply datagram into a [`DeviceStatus`].
pub fn decode_reply(reply: &[u8]) -> Result<DeviceStatus> {
    frame::decode_status(reply)
}

/// Lowercase hex rendering of a request or reply, for logs.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventlib_core::Error;
    use ventlib_core::frame::StatusFrame;

    #[test]
    fn encode_get_status() {
        assert_eq!(to_hex(&encode_command(&[0x01, 0x0D])), "6d6f62696c65010d");
    }

    #[test]
    fn encode_fan_high() {
        assert_eq!(to_hex(&encode_command(&[0x04, 0x03])), "6d6f62696c650403");
    }

    #[test]
    fn encode_single_byte_op_code() {
        let bytes = encode_command(&[0x09]);
        assert_eq!(bytes.len(), 7);
        assert_eq!(&bytes[..6], REQUEST_PREFIX);
    }

    #[test]
    fn reply_prefix_is_master() {
        assert_eq!(to_hex(REPLY_PREFIX), "6d6173746572");
    }

    #[test]
    fn decode_reply_delegates_to_frame_decoder() {
        let status = decode_reply(&StatusFrame::default().to_bytes()).unwrap();
        assert!(status.powered());

        let short = decode_reply(&[0u8; 35]);
        assert!(matches!(short, Err(Error::MalformedFrame(_))));
    }
}
