//! # wsmsg
//!
//! WebSocket message assembly: the mapping between wire-level frames
//! (RFC 6455) and logical application messages.
//!
//! A logical message may span multiple wire frames, the last one marked
//! final. This crate losslessly reassembles such fragment runs into one
//! message buffer, and translates an outgoing message back into a single
//! wire frame. It sits between a transport that speaks frames and an
//! application that speaks messages:
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ Application Layer                              │
//! │ • consumes and produces Message                │
//! └───────▲────────────────────────┬───────────────┘
//!         │ messages               │ message
//! ┌───────┴────────────────────────▼───────────────┐
//! │ wsmsg (this crate)                             │
//! │ • Assembler: frames → messages (inbound)       │
//! │ • Message::into_frame: message → frame (out)   │
//! └───────▲────────────────────────┬───────────────┘
//!         │ frames                 │ frame
//! ┌───────┴────────────────────────▼───────────────┐
//! │ Transport Layer (external)                     │
//! │ • handshake, masking, header codec, close,     │
//! │   ping/pong policy, TLS                        │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! The transport below owns the connection lifecycle: it parses and
//! serializes frame bytes, answers pings, and runs the close handshake.
//! Close frames are delivered to this crate but filtered before grouping;
//! they never surface as messages.
//!
//! # Assembling
//!
//! The core is a small synchronous state machine fed one frame at a time:
//!
//! ```rust
//! use wsmsg::{Assembler, Frame, Message};
//!
//! let mut assembler = Assembler::new();
//!
//! // A fragmented binary message arrives in two frames.
//! assert!(assembler.push(Frame::binary(vec![0x01, 0x02]).with_fin(false))?.is_none());
//! let message = assembler.push(Frame::continuation(vec![0x03]))?.expect("complete");
//!
//! assert_eq!(message, Message::binary(vec![0x01, 0x02, 0x03]));
//! # Ok::<(), wsmsg::FramingError>(())
//! ```
//!
//! For pipelines, the same machine is wrapped as a lazy iterator
//! ([`Messages`]) or a `futures` stream ([`MessageStream`]); both yield
//! each message as soon as its final frame has been seen.
//!
//! # Splitting
//!
//! The send path is 1:1 and performs no fragmentation:
//!
//! ```rust
//! use wsmsg::{FrameKind, Message};
//!
//! let frame = Message::text("hello").into_frame()?;
//! assert_eq!(frame.kind(), FrameKind::Text);
//! assert!(frame.is_fin());
//! # Ok::<(), wsmsg::FramingError>(())
//! ```
//!
//! # Buffers
//!
//! Payloads are [`bytes::Bytes`] throughout: single-frame messages reuse
//! the transport's buffer without copying, and only multi-frame runs pay
//! one concatenation. Buffer pooling and release policy stay with the
//! transport.

pub mod assembler;
pub mod frame;
pub mod message;

pub use assembler::{Assembler, MessageStream, Messages};
pub use frame::{Frame, FrameKind};
pub use message::{Message, MessageKind};
use thiserror::Error;

/// Result type for framing operations.
pub type Result<T> = std::result::Result<T, FramingError>;

/// Errors that can occur while classifying, assembling, or splitting.
///
/// All variants are non-retryable and local to the failing call: they
/// indicate either a malformed peer stream or a programming error
/// upstream, never a transient condition. The crate performs no retries
/// and no partial recovery; after a failed run the surrounding transport
/// decides whether the connection survives.
#[derive(Error, Debug)]
pub enum FramingError {
    /// Classification given a frame kind outside the four data-path
    /// kinds. Close frames must be filtered before classification and
    /// continuation frames carry no kind of their own.
    #[error("unsupported frame kind: {0:?}")]
    UnsupportedFrameKind(FrameKind),

    /// A continuation frame arrived with no open fragment run to join,
    /// so no message kind can be resolved for it.
    #[error("continuation frame without an open fragment run")]
    OrphanContinuationFrame,

    /// A fragment run completed with no frames in it. Grouping never
    /// produces this; it is a broken internal invariant, not a
    /// recoverable protocol error.
    #[error("fragment run completed with no frames")]
    EmptyFragmentRun,

    /// Splitting a message whose kind has no data-path frame mapping.
    #[error("unsupported message type: {0:?}")]
    UnsupportedMessageType(MessageKind),

    /// A wire opcode byte outside the assigned RFC 6455 table.
    #[error("invalid frame kind (byte={0})")]
    InvalidFrameKind(u8),

    /// A fragment run accumulated more payload than the configured
    /// maximum message size.
    #[error("assembled message would exceed {limit} bytes")]
    MessageTooLarge {
        /// The configured cap that was crossed.
        limit: usize,
    },
}

impl FramingError {
    /// Returns `true` if this error indicates a malformed peer stream.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFrameKind(_)
                | Self::OrphanContinuationFrame
                | Self::InvalidFrameKind(_)
                | Self::MessageTooLarge { .. }
        )
    }

    /// Returns `true` if this error indicates a programming error in the
    /// caller rather than anything the peer sent.
    pub fn is_internal_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyFragmentRun | Self::UnsupportedMessageType(_)
        )
    }
}
