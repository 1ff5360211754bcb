//! Example demonstrating reassembly of fragmented WebSocket messages.
//!
//! According to RFC 6455, a fragmented message consists of:
//! 1. An initial frame with FIN=0 and an opcode (Text or Binary)
//! 2. Zero or more continuation frames with FIN=0 and opcode=Continuation
//! 3. A final continuation frame with FIN=1 and opcode=Continuation
//!
//! This example feeds such a sequence (with a close frame interleaved,
//! as a transport would deliver it) through the assembler and prints the
//! logical messages that come out.

use futures::StreamExt;
use wsmsg::{Frame, MessageStream};

#[tokio::main(flavor = "current_thread")]
async fn main() -> wsmsg::Result<()> {
    tracing_subscriber::fmt::init();

    let text = "The quick brown fox jumps over the lazy dog";
    let fragment_size = 12;

    // Fragment a text message the way a sending peer would.
    let chunks: Vec<&str> = text
        .as_bytes()
        .chunks(fragment_size)
        .map(|chunk| std::str::from_utf8(chunk).expect("chunked on char boundary"))
        .collect();

    let mut frames = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let is_first = i == 0;
        let is_last = i == chunks.len() - 1;

        let frame = if is_first {
            Frame::text(chunk.to_string()).with_fin(is_last)
        } else {
            Frame::continuation(chunk.to_string()).with_fin(is_last)
        };
        frames.push(frame);
    }

    tracing::info!("Sending {} bytes in {} fragments", text.len(), frames.len());

    // A transport also delivers control traffic; the assembler drops
    // close frames and passes ping payloads through as messages.
    frames.push(Frame::ping("keepalive"));
    frames.push(Frame::close(""));

    let mut messages = MessageStream::new(futures::stream::iter(frames));
    while let Some(message) = messages.next().await {
        let message = message?;
        tracing::info!(
            "Reassembled {:?} message: {} bytes ({:?})",
            message.kind(),
            message.payload().len(),
            message.to_text().unwrap_or("<binary>")
        );
    }

    Ok(())
}
