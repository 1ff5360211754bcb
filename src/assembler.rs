//! # Assembler
//!
//! Defragmentation of wire frames into logical messages.
//!
//! WebSocket peers may split one message across several frames, the last
//! carrying the final-fragment flag. The [`Assembler`] consumes frames in
//! network arrival order and groups them into maximal consecutive runs: a
//! run starts at the first frame after a final one (or at stream start)
//! and ends, inclusive, at the next frame with the flag set. Each
//! completed run is emitted as one [`Message`] whose payload is the
//! ordered concatenation of the run's frame payloads and whose kind is
//! resolved from the run's opening frame. Close frames never reach
//! grouping; they are dropped and handled by the session layer above.
//!
//! The core is push-based and synchronous:
//!
//! ```rust
//! use wsmsg::{Assembler, Frame};
//!
//! let mut assembler = Assembler::new();
//! assert!(assembler.push(Frame::binary(vec![0x01, 0x02]).with_fin(false))?.is_none());
//!
//! let message = assembler.push(Frame::continuation(vec![0x03]))?.expect("run complete");
//! assert_eq!(message.payload(), &vec![0x01, 0x02, 0x03][..]);
//! # Ok::<(), wsmsg::FramingError>(())
//! ```
//!
//! Two adapters wrap the same state machine for pull and push pipelines:
//! [`Messages`] for synchronous iterators and [`MessageStream`] for
//! `futures` streams. Both emit each message as soon as its final frame
//! has been seen and make a single forward pass over their input.
//!
//! One assembler serves exactly one connection. It holds at most one
//! in-progress run of state, processes frames strictly sequentially, and
//! must not be shared across threads without external serialization.

use std::{
    pin::Pin,
    task::{Context, Poll, ready},
};

use bytes::{BufMut, Bytes, BytesMut};
use futures::{Stream, StreamExt};

use crate::{
    FramingError,
    frame::{Frame, FrameKind},
    message::{Message, MessageKind},
};

/// In-progress accumulation of one fragmented message.
///
/// Owned exclusively by the assembler until the run completes; finishing
/// transfers the payload into the emitted message and the assembler
/// resets to idle.
#[derive(Debug)]
struct PartialMessage {
    /// Kind resolved from the run's opening frame. Later frames carry no
    /// say in it.
    kind: MessageKind,
    /// Running payload total across `parts`.
    len: usize,
    /// Frame payloads in arrival order.
    parts: Vec<Bytes>,
}

impl PartialMessage {
    fn open(kind: MessageKind, payload: Bytes) -> Self {
        Self {
            kind,
            len: payload.len(),
            parts: vec![payload],
        }
    }

    fn push(&mut self, payload: Bytes) {
        self.len += payload.len();
        self.parts.push(payload);
    }

    fn len(&self) -> usize {
        self.len
    }

    /// Reduces the run to one message.
    ///
    /// A single part is wrapped as-is; multiple parts are folded into one
    /// buffer, the only copy point on the inbound path. An empty run is a
    /// broken invariant (grouping never completes a run it did not open)
    /// and fails rather than guessing.
    fn finish(self) -> crate::Result<Message> {
        let mut parts = self.parts;
        let payload = match parts.len() {
            0 => return Err(FramingError::EmptyFragmentRun),
            1 => parts.remove(0),
            _ => parts
                .into_iter()
                .fold(BytesMut::with_capacity(self.len), |mut acc, part| {
                    acc.put(part);
                    acc
                })
                .freeze(),
        };
        Ok(Message::from_kind(self.kind, payload))
    }
}

/// Grouping state. A run boundary occurs immediately after a final frame,
/// so the machine is either between runs or collecting one.
#[derive(Debug, Default)]
enum AssemblyState {
    /// No fragment run in progress.
    #[default]
    Idle,
    /// Accumulating frames until one arrives with the final flag set.
    Collecting(PartialMessage),
}

/// Reassembles fragmented wire frames into logical messages.
///
/// See the [module documentation](self) for the grouping rules. The
/// assembler is deliberately permissive about what a conforming peer
/// would never send: a run opened by a ping, or continued by a frame that
/// is not a continuation, is still assembled under the opening frame's
/// kind. Protocol legality checks belong to the transport.
///
/// Errors leave the assembler idle and usable; whether the connection
/// survives a malformed run is the transport's decision.
#[derive(Debug, Default)]
pub struct Assembler {
    state: AssemblyState,
    max_message_size: Option<usize>,
}

impl Assembler {
    /// Creates an assembler with no size limit on assembled messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the accumulated payload size of a fragment run.
    ///
    /// A run whose running total exceeds `limit` fails with
    /// [`FramingError::MessageTooLarge`] and is discarded. This guards
    /// the only unbounded allocation on the inbound path against a peer
    /// that streams non-final fragments forever.
    pub fn with_max_message_size(mut self, limit: usize) -> Self {
        self.max_message_size = Some(limit);
        self
    }

    /// Returns `true` while a fragment run is in progress.
    pub fn is_collecting(&self) -> bool {
        matches!(self.state, AssemblyState::Collecting(_))
    }

    /// Discards a pending incomplete run, returning the number of
    /// payload bytes dropped.
    ///
    /// Called when the frame source terminates mid-run: an incomplete
    /// run is never emitted as a partial message.
    pub fn abort(&mut self) -> usize {
        match std::mem::replace(&mut self.state, AssemblyState::Idle) {
            AssemblyState::Idle => 0,
            AssemblyState::Collecting(run) => {
                tracing::debug!(
                    "discarding incomplete fragment run: kind={:?} len={}",
                    run.kind,
                    run.len()
                );
                run.len()
            }
        }
    }

    /// Feeds one frame to the assembler.
    ///
    /// Returns:
    /// - `Ok(Some(message))` when this frame completed a run
    /// - `Ok(None)` when the frame was accumulated or dropped
    /// - `Err` on a malformed run; the frame and any pending run are
    ///   discarded and the error is the caller's to act on
    pub fn push(&mut self, frame: Frame) -> crate::Result<Option<Message>> {
        let (kind, fin, payload) = frame.into_parts();

        // Close frames belong to the session layer. They are filtered
        // before grouping, so one arriving mid-run neither contributes
        // payload nor terminates the run.
        if kind == FrameKind::Close {
            tracing::trace!("dropping close frame ({} bytes)", payload.len());
            return Ok(None);
        }

        match std::mem::replace(&mut self.state, AssemblyState::Idle) {
            AssemblyState::Idle => {
                if kind == FrameKind::Continuation {
                    // No opener to resolve a kind from.
                    return Err(FramingError::OrphanContinuationFrame);
                }

                let message_kind = MessageKind::try_from(kind)?;
                if fin {
                    // Single-frame run: the payload buffer is reused
                    // without copying.
                    return Ok(Some(Message::from_kind(message_kind, payload)));
                }

                tracing::trace!(
                    "opening fragment run: kind={message_kind:?} len={}",
                    payload.len()
                );
                self.state = AssemblyState::Collecting(PartialMessage::open(message_kind, payload));
                Ok(None)
            }
            AssemblyState::Collecting(mut run) => {
                // Later frames contribute payload only; the run keeps
                // the kind resolved from its opening frame.
                run.push(payload);

                if let Some(limit) = self.max_message_size
                    && run.len() > limit
                {
                    tracing::debug!(
                        "fragment run exceeded {limit} bytes, discarding {} buffered",
                        run.len()
                    );
                    return Err(FramingError::MessageTooLarge { limit });
                }

                if fin {
                    let message = run.finish()?;
                    tracing::trace!(
                        "fragment run complete: kind={:?} len={}",
                        message.kind(),
                        message.payload().len()
                    );
                    Ok(Some(message))
                } else {
                    self.state = AssemblyState::Collecting(run);
                    Ok(None)
                }
            }
        }
    }
}

/// Pull adapter: a lazy iterator of assembled messages over an iterator
/// of frames.
///
/// Messages are yielded in frame arrival order, each as soon as its final
/// frame is seen. The sequence is unbounded if the source is and is not
/// restartable. If the source ends mid-run, the incomplete run is
/// discarded, not yielded.
///
/// ```rust
/// use wsmsg::{Frame, Messages};
///
/// let frames = vec![
///     Frame::text("hi"),
///     Frame::binary(vec![0x01]).with_fin(false),
///     Frame::continuation(vec![0x02]),
/// ];
///
/// let messages: Vec<_> = Messages::new(frames)
///     .collect::<Result<_, _>>()
///     .expect("well-formed stream");
/// assert_eq!(messages.len(), 2);
/// ```
#[derive(Debug)]
pub struct Messages<I> {
    frames: I,
    assembler: Assembler,
}

impl<I> Messages<I>
where
    I: Iterator<Item = Frame>,
{
    /// Creates the adapter over a frame source with a fresh assembler.
    pub fn new<T>(frames: T) -> Self
    where
        T: IntoIterator<Item = Frame, IntoIter = I>,
    {
        Self::with_assembler(frames, Assembler::new())
    }

    /// Creates the adapter around a preconfigured assembler.
    pub fn with_assembler<T>(frames: T, assembler: Assembler) -> Self
    where
        T: IntoIterator<Item = Frame, IntoIter = I>,
    {
        Self {
            frames: frames.into_iter(),
            assembler,
        }
    }
}

impl<I> Iterator for Messages<I>
where
    I: Iterator<Item = Frame>,
{
    type Item = crate::Result<Message>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.frames.next() {
                Some(frame) => match self.assembler.push(frame) {
                    Ok(Some(message)) => return Some(Ok(message)),
                    Ok(None) => continue,
                    Err(err) => return Some(Err(err)),
                },
                None => {
                    self.assembler.abort();
                    return None;
                }
            }
        }
    }
}

/// Push adapter: a `futures` stream of assembled messages over a stream
/// of frames.
///
/// Grouping semantics are identical to [`Messages`]; backpressure is the
/// surrounding infrastructure's concern and the adapter buffers nothing
/// beyond the one in-progress run.
#[derive(Debug)]
pub struct MessageStream<S> {
    frames: S,
    assembler: Assembler,
}

impl<S> MessageStream<S>
where
    S: Stream<Item = Frame> + Unpin,
{
    /// Creates the adapter over a frame stream with a fresh assembler.
    pub fn new(frames: S) -> Self {
        Self::with_assembler(frames, Assembler::new())
    }

    /// Creates the adapter around a preconfigured assembler.
    pub fn with_assembler(frames: S, assembler: Assembler) -> Self {
        Self { frames, assembler }
    }

    /// Consumes the adapter and returns the underlying frame stream.
    pub fn into_inner(self) -> S {
        self.frames
    }
}

impl<S> Stream for MessageStream<S>
where
    S: Stream<Item = Frame> + Unpin,
{
    type Item = crate::Result<Message>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match ready!(this.frames.poll_next_unpin(cx)) {
                Some(frame) => match this.assembler.push(frame) {
                    Ok(Some(message)) => return Poll::Ready(Some(Ok(message))),
                    Ok(None) => continue,
                    Err(err) => return Poll::Ready(Some(Err(err))),
                },
                None => {
                    this.assembler.abort();
                    return Poll::Ready(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_text_frame() {
        let mut assembler = Assembler::new();
        let message = assembler
            .push(Frame::text("hi"))
            .expect("Failed to assemble")
            .expect("single final frame completes immediately");

        assert_eq!(message.kind(), MessageKind::Text);
        assert_eq!(message.payload(), b"hi" as &[u8]);
        assert!(!assembler.is_collecting());
    }

    #[test]
    fn test_two_frame_binary_run() {
        let mut assembler = Assembler::new();
        assert!(
            assembler
                .push(Frame::binary(vec![0x01, 0x02]).with_fin(false))
                .expect("Failed to open run")
                .is_none()
        );
        assert!(assembler.is_collecting());

        let message = assembler
            .push(Frame::continuation(vec![0x03]))
            .expect("Failed to complete run")
            .expect("final frame completes the run");

        assert_eq!(message.kind(), MessageKind::Binary);
        assert_eq!(message.payload(), &vec![0x01, 0x02, 0x03][..]);
        assert!(!assembler.is_collecting());
    }

    #[test]
    fn test_many_fragment_concatenation_order() {
        let mut assembler = Assembler::new();
        assembler
            .push(Frame::text("a").with_fin(false))
            .expect("Failed to open run");
        for part in ["b", "c", "d"] {
            assert!(
                assembler
                    .push(Frame::continuation(part).with_fin(false))
                    .expect("Failed to accumulate")
                    .is_none()
            );
        }
        let message = assembler
            .push(Frame::continuation("e"))
            .expect("Failed to complete run")
            .expect("run complete");

        assert_eq!(message.kind(), MessageKind::Text);
        assert_eq!(message.payload(), b"abcde" as &[u8]);
    }

    #[test]
    fn test_close_frames_are_dropped() {
        let mut assembler = Assembler::new();
        assert!(
            assembler
                .push(Frame::close(""))
                .expect("close frames are not an error")
                .is_none()
        );
        assert!(!assembler.is_collecting());
    }

    #[test]
    fn test_close_mid_run_does_not_terminate() {
        let mut assembler = Assembler::new();
        assembler
            .push(Frame::text("he").with_fin(false))
            .expect("Failed to open run");

        // A close frame is filtered before grouping: its fin flag must
        // not complete the run and its payload must not leak in.
        assert!(
            assembler
                .push(Frame::close("bye"))
                .expect("close frames are not an error")
                .is_none()
        );
        assert!(assembler.is_collecting());

        let message = assembler
            .push(Frame::continuation("llo"))
            .expect("Failed to complete run")
            .expect("run complete");
        assert_eq!(message.payload(), b"hello" as &[u8]);
    }

    #[test]
    fn test_orphan_continuation() {
        let mut assembler = Assembler::new();
        match assembler.push(Frame::continuation(vec![0x00])) {
            Err(FramingError::OrphanContinuationFrame) => {}
            other => panic!("expected OrphanContinuationFrame, got {other:?}"),
        }
        // The assembler stays usable after the error.
        assert!(!assembler.is_collecting());
        assert!(
            assembler
                .push(Frame::text("still works"))
                .expect("Failed to assemble after error")
                .is_some()
        );
    }

    #[test]
    fn test_orphan_continuation_after_completed_run() {
        let mut assembler = Assembler::new();
        assembler
            .push(Frame::text("a").with_fin(false))
            .expect("Failed to open run");
        assembler
            .push(Frame::continuation("b"))
            .expect("Failed to complete run");

        match assembler.push(Frame::continuation("c")) {
            Err(FramingError::OrphanContinuationFrame) => {}
            other => panic!("expected OrphanContinuationFrame, got {other:?}"),
        }
    }

    #[test]
    fn test_ping_run_assembles_uniformly() {
        // A conforming peer never fragments a ping; the run logic is
        // applied uniformly regardless, with no control-frame special
        // case.
        let mut assembler = Assembler::new();
        assembler
            .push(Frame::ping("pi").with_fin(false))
            .expect("Failed to open run");
        let message = assembler
            .push(Frame::continuation("ng"))
            .expect("Failed to complete run")
            .expect("run complete");

        assert_eq!(message.kind(), MessageKind::Ping);
        assert_eq!(message.payload(), b"ping" as &[u8]);
    }

    #[test]
    fn test_run_kind_comes_from_opening_frame() {
        let mut assembler = Assembler::new();
        assembler
            .push(Frame::text("ab").with_fin(false))
            .expect("Failed to open run");

        // A mid-run binary frame is malformed per RFC but contributes
        // payload only; the opener's kind wins.
        let message = assembler
            .push(Frame::binary(vec![0x63]))
            .expect("Failed to complete run")
            .expect("run complete");

        assert_eq!(message.kind(), MessageKind::Text);
        assert_eq!(message.payload(), b"abc" as &[u8]);
    }

    #[test]
    fn test_max_message_size_enforced() {
        let mut assembler = Assembler::new().with_max_message_size(4);
        assembler
            .push(Frame::binary(vec![0; 3]).with_fin(false))
            .expect("Failed to open run");

        match assembler.push(Frame::continuation(vec![0; 2]).with_fin(false)) {
            Err(FramingError::MessageTooLarge { limit }) => assert_eq!(limit, 4),
            other => panic!("expected MessageTooLarge, got {other:?}"),
        }
        // The oversized run was discarded.
        assert!(!assembler.is_collecting());
    }

    #[test]
    fn test_max_message_size_allows_runs_under_cap() {
        let mut assembler = Assembler::new().with_max_message_size(4);
        assembler
            .push(Frame::binary(vec![0; 2]).with_fin(false))
            .expect("Failed to open run");
        let message = assembler
            .push(Frame::continuation(vec![0; 2]))
            .expect("Failed to complete run")
            .expect("run complete");
        assert_eq!(message.payload().len(), 4);
    }

    #[test]
    fn test_abort_discards_pending_run() {
        let mut assembler = Assembler::new();
        assembler
            .push(Frame::text("abc").with_fin(false))
            .expect("Failed to open run");

        assert_eq!(assembler.abort(), 3);
        assert!(!assembler.is_collecting());
        assert_eq!(assembler.abort(), 0);
    }

    #[test]
    fn test_empty_run_is_fatal() {
        let run = PartialMessage {
            kind: MessageKind::Binary,
            len: 0,
            parts: Vec::new(),
        };
        match run.finish() {
            Err(FramingError::EmptyFragmentRun) => {}
            other => panic!("expected EmptyFragmentRun, got {other:?}"),
        }
    }

    #[test]
    fn test_messages_iterator_interleaved() {
        let frames = vec![
            Frame::text("one"),
            Frame::close("ignored"),
            Frame::binary(vec![0x01, 0x02]).with_fin(false),
            Frame::continuation(vec![0x03]),
            Frame::pong("pp"),
        ];

        let messages: Vec<_> = Messages::new(frames)
            .collect::<crate::Result<_>>()
            .expect("well-formed stream");

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].kind(), MessageKind::Text);
        assert_eq!(messages[0].payload(), b"one" as &[u8]);
        assert_eq!(messages[1].kind(), MessageKind::Binary);
        assert_eq!(messages[1].payload(), &vec![0x01, 0x02, 0x03][..]);
        assert_eq!(messages[2].kind(), MessageKind::Pong);
    }

    #[test]
    fn test_messages_iterator_only_close_frames() {
        let frames = vec![Frame::close(""), Frame::close("again")];
        assert_eq!(Messages::new(frames).count(), 0);
    }

    #[test]
    fn test_messages_iterator_discards_trailing_partial() {
        let frames = vec![
            Frame::text("complete"),
            Frame::text("incomp").with_fin(false),
        ];

        let messages: Vec<_> = Messages::new(frames)
            .collect::<crate::Result<_>>()
            .expect("well-formed prefix");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].payload(), b"complete" as &[u8]);
    }

    #[test]
    fn test_messages_iterator_surfaces_errors() {
        let frames = vec![Frame::continuation("orphan")];
        let mut iter = Messages::new(frames);
        match iter.next() {
            Some(Err(FramingError::OrphanContinuationFrame)) => {}
            other => panic!("expected OrphanContinuationFrame, got {other:?}"),
        }
        assert!(iter.next().is_none());
    }
}
