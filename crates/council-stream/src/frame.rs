use tracing::debug;

const FRAME_DELIMITER: u8 = b'\n';

/// Splits a chunked byte stream into complete newline-terminated frames.
///
/// One splitter is created per stream. Bytes that do not yet end in a
/// delimiter are carried over to the next `push_chunk` call. Frames are only
/// decoded as UTF-8 once complete, so a multi-byte character split across two
/// chunks is reassembled before decoding.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buf: Vec<u8>,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every frame it completed, in order.
    ///
    /// Returned frames do not include the trailing delimiter.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buf[start..]
            .iter()
            .position(|b| *b == FRAME_DELIMITER)
        {
            let end = start + offset;
            frames.push(String::from_utf8_lossy(&self.buf[start..end]).into_owned());
            start = end + 1;
        }
        self.buf.drain(..start);
        frames
    }

    /// Text variant of [`FrameSplitter::push_chunk`].
    pub fn push_str(&mut self, chunk: &str) -> Vec<String> {
        self.push_chunk(chunk.as_bytes())
    }

    /// Number of buffered bytes still waiting for a delimiter.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// Ends the stream and returns how many trailing bytes were dropped.
    ///
    /// An unterminated trailing fragment is incomplete and is never decoded.
    pub fn finish(self) -> usize {
        let dropped = self.buf.len();
        if dropped > 0 {
            debug!(dropped_bytes = dropped, "dropping unterminated trailing frame");
        }
        dropped
    }
}
