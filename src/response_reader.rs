// response_reader.rs - Bounded body reading
// Purpose: Pull at most a fixed amount of body out of a streamed response
//  - event-stream bodies never end on their own, so they are read in chunks up to a byte cap
//  - ordinary bodies are only considered on 200 and capped by character count

use crate::error::ProbeError;
use crate::settings::{CHUNK_SIZE, MAX_RESPONSE_LENGTH, SSE_MAX_SIZE};
use reqwest::StatusCode;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use std::io::Read;

const EVENT_STREAM: &str = "text/event-stream";

// Worst case UTF-8 width, so a character cap never needs more bytes than this
const MAX_CHAR_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Server-push stream: chunked reads, byte cap, any status
    EventStream,
    /// Whole body up to a character cap, 200 only
    Buffered,
}

impl ReadStrategy {
    pub fn for_response(response: &Response) -> Self {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        Self::for_content_type(content_type)
    }

    pub fn for_content_type(content_type: &str) -> Self {
        if content_type.to_ascii_lowercase().contains(EVENT_STREAM) {
            ReadStrategy::EventStream
        } else {
            ReadStrategy::Buffered
        }
    }

    /// Read the body according to the strategy. An empty body is an error:
    /// it carries nothing a signature could match.
    pub fn read(self, response: Response) -> Result<String, ProbeError> {
        let body = match self {
            ReadStrategy::EventStream => read_event_stream(response)?,
            ReadStrategy::Buffered => {
                let status = response.status();
                if status != StatusCode::OK {
                    return Err(ProbeError::Status(status.as_u16()));
                }
                read_buffered(response)?
            }
        };

        if body.is_empty() {
            return Err(ProbeError::EmptyBody);
        }
        Ok(body)
    }
}

fn read_event_stream<R: Read>(mut reader: R) -> Result<String, ProbeError> {
    let mut content = Vec::with_capacity(SSE_MAX_SIZE + CHUNK_SIZE);
    let mut chunk = [0u8; CHUNK_SIZE];

    while content.len() < SSE_MAX_SIZE {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        content.extend_from_slice(&chunk[..n]);
    }
    content.truncate(SSE_MAX_SIZE);

    Ok(String::from_utf8_lossy(&content).into_owned())
}

fn read_buffered<R: Read>(reader: R) -> Result<String, ProbeError> {
    let mut bytes = Vec::new();
    reader
        .take((MAX_RESPONSE_LENGTH * MAX_CHAR_WIDTH) as u64)
        .read_to_end(&mut bytes)?;

    let text = String::from_utf8_lossy(&bytes);
    Ok(text.chars().take(MAX_RESPONSE_LENGTH).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out at most `step` bytes per read, like a socket would
    struct Trickle {
        data: Cursor<Vec<u8>>,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let len = buf.len().min(self.step);
            self.data.read(&mut buf[..len])
        }
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(ReadStrategy::for_content_type("text/event-stream"), ReadStrategy::EventStream);
        assert_eq!(
            ReadStrategy::for_content_type("Text/Event-Stream; charset=utf-8"),
            ReadStrategy::EventStream
        );
        assert_eq!(ReadStrategy::for_content_type("application/json"), ReadStrategy::Buffered);
        assert_eq!(ReadStrategy::for_content_type(""), ReadStrategy::Buffered);
    }

    #[test]
    fn test_event_stream_capped_at_max_size() {
        let body = read_event_stream(Cursor::new(vec![b'a'; SSE_MAX_SIZE * 3])).unwrap();
        assert_eq!(body.len(), SSE_MAX_SIZE);
    }

    #[test]
    fn test_event_stream_small_reads() {
        let reader = Trickle {
            data: Cursor::new(b"data: hello\n\n".repeat(1000)),
            step: 7,
        };
        let body = read_event_stream(reader).unwrap();
        assert_eq!(body.len(), SSE_MAX_SIZE);
        assert!(body.starts_with("data: hello"));
    }

    #[test]
    fn test_event_stream_shorter_than_cap() {
        let body = read_event_stream(Cursor::new(b"data: {}\n\n".to_vec())).unwrap();
        assert_eq!(body, "data: {}\n\n");
    }

    #[test]
    fn test_buffered_capped_by_characters() {
        let text = "é".repeat(MAX_RESPONSE_LENGTH + 10);
        let body = read_buffered(Cursor::new(text.into_bytes())).unwrap();
        assert_eq!(body.chars().count(), MAX_RESPONSE_LENGTH);
    }
}
