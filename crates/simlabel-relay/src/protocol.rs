//! Two encodings share one message model.
//!
//! Text messages use the legacy `HEADER:::PAYLOAD` form, where the `DAT`
//! header marks a JSON label session and any other header a log line.
//! Binary messages are framed: a one byte type tag, a big-endian `u32`
//! payload length and the UTF-8 payload.

/// Separator between header and payload in text messages.
pub const DELIMITER: &str = ":::";

/// Text header of a label session message.
pub const DATA_HEADER: &str = "DAT";

/// Text header used when sending log lines.
pub const LOG_HEADER: &str = "LOG";

/// Frame tag of a label session message.
pub const DATA_TAG: u8 = 1;

/// Frame tag of a log message.
pub const LOG_TAG: u8 = 2;

const FRAME_HEADER_LEN: usize = 5;

/// A message exchanged with the client.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    /// A label session to persist.
    Data(serde_json::Value),
    /// A line of text to log.
    Log(String),
}

/// Errors raised while decoding a message.
#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    /// A text message without the `:::` separator.
    #[error("Message has no ':::' separator")]
    MissingDelimiter,

    /// The data payload is not valid JSON.
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A frame shorter than its header.
    #[error("Frame of {0} bytes is shorter than its header")]
    Truncated(usize),

    /// A frame with an unknown type tag.
    #[error("Unknown frame tag {0}")]
    UnknownTag(u8),

    /// The declared payload length differs from the bytes received.
    #[error("Frame declares {declared} payload bytes but carries {actual}")]
    LengthMismatch {
        /// Length from the frame header.
        declared: usize,
        /// Bytes after the header.
        actual: usize,
    },

    /// The payload is not UTF-8.
    #[error("Payload is not UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Parse a legacy `HEADER:::PAYLOAD` text message.
///
/// The message is split on the first separator only, so the payload may
/// itself contain `:::`.
pub fn parse_text(text: &str) -> Result<RelayMessage, ProtocolError> {
    let (header, payload) = text
        .split_once(DELIMITER)
        .ok_or(ProtocolError::MissingDelimiter)?;

    if header == DATA_HEADER {
        Ok(RelayMessage::Data(serde_json::from_str(payload)?))
    } else {
        Ok(RelayMessage::Log(payload.to_string()))
    }
}

/// Encode a message in the legacy text form.
pub fn encode_text(msg: &RelayMessage) -> String {
    match msg {
        RelayMessage::Data(value) => format!("{DATA_HEADER}{DELIMITER}{value}"),
        RelayMessage::Log(line) => format!("{LOG_HEADER}{DELIMITER}{line}"),
    }
}

/// Encode a message as a length-prefixed binary frame.
pub fn encode_frame(msg: &RelayMessage) -> Vec<u8> {
    let (tag, payload) = match msg {
        RelayMessage::Data(value) => (DATA_TAG, value.to_string()),
        RelayMessage::Log(line) => (LOG_TAG, line.clone()),
    };

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.push(tag);
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload.as_bytes());
    frame
}

/// Decode a length-prefixed binary frame.
pub fn decode_frame(frame: &[u8]) -> Result<RelayMessage, ProtocolError> {
    if frame.len() < FRAME_HEADER_LEN {
        return Err(ProtocolError::Truncated(frame.len()));
    }

    let tag = frame[0];
    let declared = u32::from_be_bytes([frame[1], frame[2], frame[3], frame[4]]) as usize;
    let payload = &frame[FRAME_HEADER_LEN..];
    if declared != payload.len() {
        return Err(ProtocolError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }

    let text = std::str::from_utf8(payload)?;
    match tag {
        DATA_TAG => Ok(RelayMessage::Data(serde_json::from_str(text)?)),
        LOG_TAG => Ok(RelayMessage::Log(text.to_string())),
        other => Err(ProtocolError::UnknownTag(other)),
    }
}
