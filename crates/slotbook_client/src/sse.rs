//! Minimal Server-Sent Events reader for the change feed.

use futures::future::ready;
use futures::{stream, Stream, StreamExt};
use slotbook_booking::handlers::CHANGE_EVENT;
use slotbook_common::models::BookingChange;
use slotbook_common::services::ChangeStream;
use std::fmt::Display;
use tracing::warn;

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseMessage {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental parser: feed raw chunks, get complete messages back.
///
/// Lines may arrive split across chunks; a message is dispatched on a blank line.
/// Comment lines (keep-alives) are ignored.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        self.buffer.extend_from_slice(chunk);
        let mut messages = Vec::new();

        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches('\n').trim_end_matches('\r');

            if line.is_empty() {
                if !self.data.is_empty() {
                    messages.push(SseMessage {
                        event: self.event.take(),
                        data: self.data.join("\n"),
                    });
                    self.data.clear();
                }
                self.event = None;
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }
        messages
    }
}

/// Decodes a `booking-change` message. Undecodable payloads become `Resync`.
pub fn decode_change(message: &SseMessage) -> Option<BookingChange> {
    if let Some(event) = message.event.as_deref() {
        if event != CHANGE_EVENT {
            return None;
        }
    }
    match serde_json::from_str(&message.data) {
        Ok(change) => Some(change),
        Err(err) => {
            warn!(error = %err, "Undecodable change event, forcing resync");
            Some(BookingChange::Resync)
        }
    }
}

/// Turns a response byte stream into a change stream. Ends at the first transport error.
pub fn change_events<S, B, E>(bytes: S) -> ChangeStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let changes = bytes
        .scan(SseParser::default(), |parser, chunk| {
            let messages = match chunk {
                Ok(chunk) => parser.feed(chunk.as_ref()),
                Err(err) => {
                    warn!(error = %err, "Change feed connection failed");
                    return ready(None);
                }
            };
            ready(Some(stream::iter(messages)))
        })
        .flatten()
        .filter_map(|message| ready(decode_change(&message)));
    Box::pin(changes)
}
