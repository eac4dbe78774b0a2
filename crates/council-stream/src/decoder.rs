use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::attachment::read_attachments;
use crate::errors::DecodeError;
use crate::event::{Event, Node, NodeKind};
use crate::frame::FrameSplitter;
use crate::wire;

/// Literal prefix that marks a data-bearing frame.
pub const DATA_PREFIX: &str = "data: ";

const ERROR_TAG: &str = "error";
const FALLBACK_ERROR_MESSAGE: &str = "unknown stream error";
const LOG_PREVIEW_CHARS: usize = 200;

/// An event record with `type` removed, consumed field by field.
///
/// Recognised fields are taken out when their shape matches. Whatever is left
/// (unmodelled fields and values of an unexpected shape) becomes the node's
/// `extra`.
struct Payload {
    kind: NodeKind,
    record: Map<String, Value>,
}

impl Payload {
    /// Removes `key` and returns its value if `read` accepts it. A null
    /// counts as absent; a value `read` rejects stays in the record.
    fn take<T>(&mut self, key: &str, read: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
        match self.record.get(key) {
            None => None,
            Some(Value::Null) => {
                self.record.remove(key);
                None
            }
            Some(value) => {
                let parsed = read(value)?;
                self.record.remove(key);
                Some(parsed)
            }
        }
    }

    /// `take` for a field the kind cannot do without.
    fn require<T>(
        &mut self,
        field: &'static str,
        read: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<T, DecodeError> {
        match self.take(field, read) {
            Some(value) => Ok(value),
            None => Err(self.absent(&[field], field)),
        }
    }

    /// Error for a required field that is missing, or present with the wrong
    /// shape under any of `keys`.
    fn absent(&self, keys: &[&str], field: &'static str) -> DecodeError {
        let kind = self.kind.as_str().to_string();
        if keys.iter().any(|key| self.record.contains_key(*key)) {
            DecodeError::InvalidField {
                kind,
                reason: format!("`{field}` has an unexpected type"),
            }
        } else {
            DecodeError::MissingField { kind, field }
        }
    }

    fn into_node(mut self) -> Result<Node, DecodeError> {
        // unknown kinds are opaque: a missing or odd id falls back to 0
        let id = if self.kind.is_unknown() {
            self.take("id", Value::as_i64).unwrap_or(0)
        } else {
            self.require("id", Value::as_i64)?
        };

        let primary = self.take("model", wire::read_string);
        let alias = self.take("model_name", wire::read_string);
        let model = primary.or(alias);
        if self.kind.requires_model() && model.is_none() {
            return Err(self.absent(&["model", "model_name"], "model"));
        }

        let content = if self.kind.requires_content() {
            Some(self.require("content", wire::read_string)?)
        } else {
            self.take("content", wire::read_string)
        };

        Ok(Node {
            id,
            model,
            content,
            actual_cost: self.take("actual_cost", wire::read_cost),
            attachment_filenames: self.take("attachment_filenames", wire::read_string_or_list),
            prompt_sent: self.take("prompt_sent", wire::read_string),
            warnings: self
                .take("warnings", wire::read_string_list)
                .unwrap_or_default(),
            conversation_id: self.take("conversation_id", wire::read_string_or_number),
            attachments: self
                .take("attachments", read_attachments)
                .unwrap_or_default(),
            kind: self.kind,
            extra: self.record,
        })
    }
}

/// Decodes one complete frame.
///
/// Returns `Ok(None)` for blank frames and for frames without the data prefix
/// (keep-alive comments and other protocol noise).
pub fn decode_frame(frame: &str) -> Result<Option<Event>, DecodeError> {
    if frame.trim().is_empty() {
        return Ok(None);
    }
    let Some(payload) = frame.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };
    let value: Value =
        serde_json::from_str(payload).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    decode_value(value).map(Some)
}

/// Decodes an already-parsed event record.
pub fn decode_value(value: Value) -> Result<Event, DecodeError> {
    let Value::Object(mut record) = value else {
        return Err(DecodeError::NotAnObject);
    };
    let tag = match record.remove("type") {
        Some(Value::String(tag)) => tag,
        _ => return Err(DecodeError::MissingType),
    };

    if tag == ERROR_TAG {
        let message = record
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
            .to_string();
        return Ok(Event::Error { message });
    }

    Payload {
        kind: NodeKind::from_tag(&tag),
        record,
    }
    .into_node()
    .map(Event::Node)
}

/// Push-side decoder: bytes in, events out.
///
/// Malformed frames are logged and skipped. After an `error` event the decoder
/// halts: the rest of the current chunk and every later chunk are ignored.
#[derive(Debug, Default)]
pub struct EventDecoder {
    splitter: FrameSplitter,
    halted: bool,
    malformed_frames: usize,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<Event> {
        if self.halted {
            return Vec::new();
        }
        let mut events = Vec::new();
        for frame in self.splitter.push_chunk(chunk) {
            match decode_frame(&frame) {
                Ok(Some(event)) => {
                    let halt = event.is_error();
                    events.push(event);
                    if halt {
                        debug!("error event received; halting decoder");
                        self.halted = true;
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    self.malformed_frames += 1;
                    warn!(error = %err, frame = %preview(&frame), "skipping malformed frame");
                }
            }
        }
        events
    }

    /// True once an `error` event has been decoded.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn malformed_frames(&self) -> usize {
        self.malformed_frames
    }

    /// Ends the stream, dropping any unterminated trailing frame.
    pub fn finish(self) -> usize {
        self.splitter.finish()
    }
}

fn preview(frame: &str) -> &str {
    match frame.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((idx, _)) => &frame[..idx],
        None => frame,
    }
}
