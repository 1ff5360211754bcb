//! # Frame
//!
//! Wire-level WebSocket frames as defined in
//! [RFC 6455 Section 5.2](https://datatracker.ietf.org/doc/html/rfc6455#section-5.2).
//!
//! A [`Frame`] is one discrete unit of protocol data as delivered by the
//! transport: a kind, a payload, and a final-fragment flag. Frames come in
//! two categories:
//!
//! - **Data frames**: carry application payload
//!   - [`FrameKind::Text`]: UTF-8 text data
//!   - [`FrameKind::Binary`]: raw binary data
//!   - [`FrameKind::Continuation`]: continuation of a fragmented message
//! - **Control frames**: manage the connection
//!   - [`FrameKind::Close`]: connection closure
//!   - [`FrameKind::Ping`]: liveness check
//!   - [`FrameKind::Pong`]: response to a ping
//!
//! Frames produced here carry no mask and no extension bits. Masking,
//! header parsing, and compression all happen in the transport below this
//! crate; the frame seen here is the decoded view.
//!
//! ## Fragmentation
//!
//! One logical message may be split across several frames. The first
//! fragment is a text or binary frame with `fin` unset, followed by zero
//! or more continuation frames, the last of which has `fin` set:
//!
//! ```rust
//! use wsmsg::Frame;
//!
//! let first = Frame::text("Hello, ").with_fin(false);
//! let middle = Frame::continuation("Wor").with_fin(false);
//! let last = Frame::continuation("ld!");
//! ```
//!
//! Reassembly of such sequences is the job of [`Assembler`].
//!
//! [`Assembler`]: crate::Assembler

use bytes::Bytes;

use crate::FramingError;

/// The kind of a wire frame, determining its semantic meaning and handling.
///
/// The set of kinds is fixed by the protocol specification and not
/// extensible at runtime. The numeric values follow
/// [RFC 6455, Section 11.8](https://datatracker.ietf.org/doc/html/rfc6455#section-11.8):
///
/// - Continuation = 0x0
/// - Text = 0x1
/// - Binary = 0x2
/// - Close = 0x8
/// - Ping = 0x9
/// - Pong = 0xA
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Continues a fragmented message opened by an earlier data frame.
    /// Carries no type of its own.
    Continuation,
    /// UTF-8 encoded text data.
    Text,
    /// Raw binary data.
    Binary,
    /// Connection closure. Never enters message assembly.
    Close,
    /// Liveness check, expects a pong in response.
    Ping,
    /// Response to a ping.
    Pong,
}

impl FrameKind {
    /// Returns `true` for `Close`, `Ping`, or `Pong`.
    ///
    /// Control frames manage the connection rather than carry
    /// application data and are never fragmented by a conforming peer.
    pub fn is_control(&self) -> bool {
        matches!(*self, FrameKind::Close | FrameKind::Ping | FrameKind::Pong)
    }

    /// Returns `true` for `Text`, `Binary`, or `Continuation`.
    pub fn is_data(&self) -> bool {
        !self.is_control()
    }
}

impl TryFrom<u8> for FrameKind {
    type Error = FramingError;

    /// Maps a wire opcode byte to a `FrameKind`.
    ///
    /// The reserved opcodes (0x3-0x7 and 0xB-0xF) fail with
    /// [`FramingError::InvalidFrameKind`].
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x0 => Ok(Self::Continuation),
            0x1 => Ok(Self::Text),
            0x2 => Ok(Self::Binary),
            0x8 => Ok(Self::Close),
            0x9 => Ok(Self::Ping),
            0xA => Ok(Self::Pong),
            _ => Err(FramingError::InvalidFrameKind(value)),
        }
    }
}

impl From<FrameKind> for u8 {
    /// Maps a `FrameKind` to its wire opcode byte.
    fn from(val: FrameKind) -> Self {
        match val {
            FrameKind::Continuation => 0x0,
            FrameKind::Text => 0x1,
            FrameKind::Binary => 0x2,
            FrameKind::Close => 0x8,
            FrameKind::Ping => 0x9,
            FrameKind::Pong => 0xA,
        }
    }
}

/// A wire-level WebSocket frame.
///
/// Frames are immutable once produced by the transport; this crate only
/// reads them on the inbound path and builds them on the outbound path.
///
/// # Creating frames
///
/// Use the factory constructors rather than building the struct by hand:
///
/// ```rust
/// use wsmsg::Frame;
///
/// let text = Frame::text("Hello");
/// let binary = Frame::binary(vec![1, 2, 3]);
/// let ping = Frame::ping("");
///
/// assert!(text.is_fin());
/// ```
///
/// Constructors default `fin` to `true`; use [`Frame::with_fin`] to build
/// fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The kind of the frame, defining its type.
    pub(crate) kind: FrameKind,
    /// Indicates if this is the final frame in a message.
    pub(crate) fin: bool,
    /// The payload of the frame, containing the actual data.
    pub(crate) payload: Bytes,
}

impl Frame {
    /// Creates a frame from its parts.
    pub fn new(kind: FrameKind, fin: bool, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            fin,
            payload: payload.into(),
        }
    }

    /// Creates a final text frame with the given payload.
    pub fn text(payload: impl Into<Bytes>) -> Self {
        Self::new(FrameKind::Text, true, payload)
    }

    /// Creates a final binary frame with the given payload.
    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self::new(FrameKind::Binary, true, payload)
    }

    /// Creates a ping frame with the given payload.
    pub fn ping(payload: impl Into<Bytes>) -> Self {
        Self::new(FrameKind::Ping, true, payload)
    }

    /// Creates a pong frame with the given payload.
    pub fn pong(payload: impl Into<Bytes>) -> Self {
        Self::new(FrameKind::Pong, true, payload)
    }

    /// Creates a close frame with the given payload.
    ///
    /// The payload layout (status code plus reason) is owned by the
    /// session layer; this crate treats it as opaque bytes.
    pub fn close(payload: impl Into<Bytes>) -> Self {
        Self::new(FrameKind::Close, true, payload)
    }

    /// Creates a continuation frame with the given payload.
    ///
    /// Continuation frames carry no kind of their own and belong to the
    /// most recently opened, still-incomplete fragment run.
    ///
    /// # Example
    /// ```rust
    /// use wsmsg::Frame;
    ///
    /// let first = Frame::binary(vec![0x01]).with_fin(false);
    /// let last = Frame::continuation(vec![0x02]);
    /// ```
    pub fn continuation(payload: impl Into<Bytes>) -> Self {
        Self::new(FrameKind::Continuation, true, payload)
    }

    /// Sets the fin flag and returns self for method chaining.
    ///
    /// Set `fin` to `false` for non-final fragments.
    ///
    /// # Example
    /// ```rust
    /// use wsmsg::Frame;
    ///
    /// let fragment = Frame::text("partial data").with_fin(false);
    /// assert!(!fragment.is_fin());
    /// ```
    pub fn with_fin(mut self, fin: bool) -> Self {
        self.fin = fin;
        self
    }

    /// Returns the kind of the frame.
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Returns `true` if this frame completes a message.
    pub fn is_fin(&self) -> bool {
        self.fin
    }

    /// Returns a reference to the frame payload.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Consumes the frame and returns its payload.
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Consumes the frame and returns its parts.
    pub fn into_parts(self) -> (FrameKind, bool, Bytes) {
        (self.kind, self.fin, self.payload)
    }
}

impl From<Frame> for (FrameKind, Bytes) {
    fn from(val: Frame) -> Self {
        (val.kind, val.payload)
    }
}
