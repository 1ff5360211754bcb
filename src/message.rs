//! # Message
//!
//! Logical WebSocket messages and the conversions between messages and
//! wire frames.
//!
//! A [`Message`] is the application-level unit of communication. On the
//! inbound path messages are produced by [`Assembler`], which may join
//! several wire frames into one payload. On the outbound path
//! [`Message::into_frame`] performs the inverse mapping: one message
//! becomes exactly one final frame, with the payload buffer handed over
//! rather than copied.
//!
//! Payloads are opaque [`Bytes`] for every variant, including text. UTF-8
//! validation is the concern of the layer above; [`Message::to_text`] is
//! provided as a checked view for consumers that want one.
//!
//! [`Assembler`]: crate::Assembler

use bytes::Bytes;

use crate::{
    FramingError,
    frame::{Frame, FrameKind},
};

/// Semantic type tag of a logical message.
///
/// The assembler only ever produces `Text`, `Binary`, `Ping`, and `Pong`.
/// `Close` exists because the session layer above this crate represents
/// close commands as messages too; it never appears on the data path and
/// [`Message::into_frame`] rejects it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// A text message.
    Text,
    /// A binary message.
    Binary,
    /// A ping message.
    Ping,
    /// A pong message.
    Pong,
    /// A close command. Session-level only, rejected by the data path.
    Close,
}

impl TryFrom<FrameKind> for MessageKind {
    type Error = FramingError;

    /// Classifies a wire-frame kind as a message kind.
    ///
    /// Total over the four data-path kinds. `Close` frames are handled
    /// upstream of classification and `Continuation` frames carry no
    /// kind of their own, so both fail with
    /// [`FramingError::UnsupportedFrameKind`]. Pure lookup, no side
    /// effects.
    fn try_from(kind: FrameKind) -> Result<Self, Self::Error> {
        match kind {
            FrameKind::Text => Ok(Self::Text),
            FrameKind::Binary => Ok(Self::Binary),
            FrameKind::Ping => Ok(Self::Ping),
            FrameKind::Pong => Ok(Self::Pong),
            FrameKind::Close | FrameKind::Continuation => {
                Err(FramingError::UnsupportedFrameKind(kind))
            }
        }
    }
}

/// A logical WebSocket message.
///
/// Created by the assembler on completion of a fragment run, or directly
/// by the application for the send path. The payload of an assembled
/// message is the concatenation of all constituent frame payloads in
/// arrival order; for a single-frame message the frame's buffer is reused
/// without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A text message.
    Text(Bytes),
    /// A binary message.
    Binary(Bytes),
    /// A ping message with the specified payload.
    Ping(Bytes),
    /// A pong message with the specified payload.
    Pong(Bytes),
    /// A close command with an opaque payload. Session-level only.
    Close(Bytes),
}

impl Message {
    /// Creates a new text message.
    pub fn text(payload: impl Into<Bytes>) -> Self {
        Self::Text(payload.into())
    }

    /// Creates a new binary message.
    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self::Binary(payload.into())
    }

    /// Creates a new ping message.
    pub fn ping(payload: impl Into<Bytes>) -> Self {
        Self::Ping(payload.into())
    }

    /// Creates a new pong message.
    pub fn pong(payload: impl Into<Bytes>) -> Self {
        Self::Pong(payload.into())
    }

    /// Builds a message of the given kind around an assembled payload.
    pub(crate) fn from_kind(kind: MessageKind, payload: Bytes) -> Self {
        match kind {
            MessageKind::Text => Self::Text(payload),
            MessageKind::Binary => Self::Binary(payload),
            MessageKind::Ping => Self::Ping(payload),
            MessageKind::Pong => Self::Pong(payload),
            MessageKind::Close => Self::Close(payload),
        }
    }

    /// Returns the kind of the message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text(_) => MessageKind::Text,
            Self::Binary(_) => MessageKind::Binary,
            Self::Ping(_) => MessageKind::Ping,
            Self::Pong(_) => MessageKind::Pong,
            Self::Close(_) => MessageKind::Close,
        }
    }

    /// Returns a reference to the message payload.
    pub fn payload(&self) -> &Bytes {
        match self {
            Self::Text(data)
            | Self::Binary(data)
            | Self::Ping(data)
            | Self::Pong(data)
            | Self::Close(data) => data,
        }
    }

    /// Consumes the message and returns its payload.
    pub fn into_payload(self) -> Bytes {
        match self {
            Self::Text(data)
            | Self::Binary(data)
            | Self::Ping(data)
            | Self::Pong(data)
            | Self::Close(data) => data,
        }
    }

    /// Attempts to view the payload as a UTF-8 string slice.
    pub fn to_text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.payload())
    }

    /// Converts this message into exactly one final wire frame.
    ///
    /// The send path performs no fragmentation: the frame carries the
    /// whole payload with `fin` set, and the buffer is handed over
    /// without copying. `Close` messages fail with
    /// [`FramingError::UnsupportedMessageType`]; close traffic has its
    /// own path above this core, and reaching this conversion with one
    /// is a programming error upstream, not a transient condition.
    ///
    /// # Example
    /// ```rust
    /// use wsmsg::{FrameKind, Message};
    ///
    /// let frame = Message::text("hi").into_frame()?;
    /// assert_eq!(frame.kind(), FrameKind::Text);
    /// assert!(frame.is_fin());
    /// # Ok::<(), wsmsg::FramingError>(())
    /// ```
    pub fn into_frame(self) -> crate::Result<Frame> {
        match self {
            Self::Text(payload) => Ok(Frame::text(payload)),
            Self::Binary(payload) => Ok(Frame::binary(payload)),
            Self::Ping(payload) => Ok(Frame::ping(payload)),
            Self::Pong(payload) => Ok(Frame::pong(payload)),
            Self::Close(_) => Err(FramingError::UnsupportedMessageType(MessageKind::Close)),
        }
    }
}

impl TryFrom<Message> for Frame {
    type Error = FramingError;

    fn try_from(message: Message) -> Result<Self, Self::Error> {
        message.into_frame()
    }
}

impl From<String> for Message {
    fn from(string: String) -> Self {
        Message::Text(string.into())
    }
}

impl<'s> From<&'s str> for Message {
    fn from(string: &'s str) -> Self {
        Message::Text(Bytes::copy_from_slice(string.as_bytes()))
    }
}

impl From<Vec<u8>> for Message {
    fn from(data: Vec<u8>) -> Self {
        Message::Binary(data.into())
    }
}
