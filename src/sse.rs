//! Incremental decoding of the line-oriented streaming body.
//!
//! Upstream delivers byte chunks of arbitrary, provider-controlled size.
//! Chunk boundaries do not align with line or event boundaries, so the
//! decoder keeps a carry-over buffer of bytes that do not yet form a
//! complete line. For any partition of a well-formed payload into delivery
//! chunks, the emitted fragment sequence is identical.
//!
//! ```rust
//! use palaver::StreamDecoder;
//!
//! let mut decoder = StreamDecoder::new();
//! let payload = b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n";
//!
//! let fragments = decoder.push_chunk(payload);
//! assert_eq!(fragments, vec!["Hi".to_string()]);
//! assert!(decoder.is_done());
//! ```

use crate::wire;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Stateful line assembler and event parser for one streamed response.
///
/// Splitting happens on the newline byte before UTF-8 decoding; a multi-byte
/// code point never contains that byte, so a chunk boundary inside a
/// character only grows the carry-over until the line completes.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    carry: Vec<u8>,
    done: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` sentinel has been observed. Further input is
    /// ignored once set.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consumes one delivery chunk and returns the fragments completed by
    /// it, in arrival order. Any trailing incomplete line stays buffered
    /// for the next chunk; at end of stream it is discarded, never parsed.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut fragments = Vec::new();
        if self.done {
            return fragments;
        }

        self.carry.extend_from_slice(chunk);

        while let Some(newline) = self.carry.iter().position(|&byte| byte == b'\n') {
            let line_bytes: Vec<u8> = self.carry.drain(..=newline).collect();

            let Ok(line) = std::str::from_utf8(&line_bytes) else {
                tracing::debug!(len = line_bytes.len(), "skipping non-utf8 stream line");
                continue;
            };

            let line = line.trim();
            if !line.starts_with(DATA_PREFIX) {
                continue;
            }

            let payload = line[DATA_PREFIX.len()..].trim();
            if payload == DONE_SENTINEL {
                self.done = true;
                self.carry.clear();
                break;
            }

            if payload.is_empty() {
                continue;
            }

            match wire::decode_stream_data(payload) {
                Some(content) if !content.is_empty() => fragments.push(content),
                Some(_) => {}
                // A single malformed fragment must not abort the stream.
                None => tracing::debug!(payload, "skipping malformed stream fragment"),
            }
        }

        fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &[u8] = b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n";

    fn decode_in_chunks(payload: &[u8], chunks: &[&[u8]]) -> Vec<String> {
        assert_eq!(chunks.concat(), payload);
        let mut decoder = StreamDecoder::new();
        let mut fragments = Vec::new();
        for chunk in chunks {
            fragments.extend(decoder.push_chunk(chunk));
        }
        fragments
    }

    #[test]
    fn single_chunk_payload_emits_one_fragment() {
        let mut decoder = StreamDecoder::new();
        let fragments = decoder.push_chunk(PAYLOAD);
        assert_eq!(fragments, vec!["Hi".to_string()]);
        assert!(decoder.is_done());
    }

    #[test]
    fn split_inside_the_json_object_emits_the_same_fragment() {
        // Offset 20 lands inside the JSON object.
        let fragments = decode_in_chunks(PAYLOAD, &[&PAYLOAD[..20], &PAYLOAD[20..]]);
        assert_eq!(fragments, vec!["Hi".to_string()]);
    }

    #[test]
    fn every_two_chunk_partition_emits_identical_fragments() {
        let mut decoder = StreamDecoder::new();
        let expected = decoder.push_chunk(PAYLOAD);

        for offset in 0..=PAYLOAD.len() {
            let fragments = decode_in_chunks(PAYLOAD, &[&PAYLOAD[..offset], &PAYLOAD[offset..]]);
            assert_eq!(fragments, expected, "split at byte offset {offset}");
        }
    }

    #[test]
    fn byte_at_a_time_delivery_preserves_order() {
        let payload = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"one\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" two\"}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" three\"}}]}\n",
            "data: [DONE]\n",
        )
        .as_bytes();

        let singles: Vec<&[u8]> = payload.chunks(1).collect();
        let fragments = decode_in_chunks(payload, &singles);
        assert_eq!(fragments, vec!["one", " two", " three"]);
    }

    #[test]
    fn multibyte_content_survives_splits_inside_a_code_point() {
        let payload = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo 世界\"}}]}\ndata: [DONE]\n"
            .as_bytes();

        let mut decoder = StreamDecoder::new();
        let expected = decoder.push_chunk(payload);
        assert_eq!(expected, vec!["héllo 世界".to_string()]);

        for offset in 0..=payload.len() {
            let fragments = decode_in_chunks(payload, &[&payload[..offset], &payload[offset..]]);
            assert_eq!(fragments, expected, "split at byte offset {offset}");
        }
    }

    #[test]
    fn sentinel_is_never_emitted_and_ends_the_stream() {
        let mut decoder = StreamDecoder::new();
        let fragments = decoder.push_chunk(b"data: [DONE]\n");
        assert!(fragments.is_empty());
        assert!(decoder.is_done());

        // Input after the sentinel is ignored.
        let late = decoder.push_chunk(b"data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n");
        assert!(late.is_empty());
    }

    #[test]
    fn malformed_fragments_are_skipped_without_aborting() {
        let payload = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"keep\"}}]}\n",
            "data: {not json\n",
            "data: {\"choices\":[{\"delta\":{}}]}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"also\"}}]}\n",
        );

        let mut decoder = StreamDecoder::new();
        let fragments = decoder.push_chunk(payload.as_bytes());
        assert_eq!(fragments, vec!["keep", "also"]);
        assert!(!decoder.is_done());
    }

    #[test]
    fn non_data_lines_and_blank_lines_are_discarded() {
        let payload = concat!(
            ": keep-alive comment\n",
            "event: message\n",
            "\n",
            "data: \n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n",
        );

        let mut decoder = StreamDecoder::new();
        let fragments = decoder.push_chunk(payload.as_bytes());
        assert_eq!(fragments, vec!["Hi"]);
    }

    #[test]
    fn crlf_line_endings_decode_identically() {
        let payload = b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\r\ndata: [DONE]\r\n";
        let mut decoder = StreamDecoder::new();
        let fragments = decoder.push_chunk(payload);
        assert_eq!(fragments, vec!["Hi"]);
        assert!(decoder.is_done());
    }

    #[test]
    fn empty_delta_content_is_not_emitted() {
        let payload = b"data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n";
        let mut decoder = StreamDecoder::new();
        assert!(decoder.push_chunk(payload).is_empty());
    }

    #[test]
    fn unterminated_carry_over_is_never_parsed() {
        let mut decoder = StreamDecoder::new();
        // No trailing newline: the line is incomplete and must stay buffered.
        let fragments =
            decoder.push_chunk(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}");
        assert!(fragments.is_empty());
        assert!(!decoder.is_done());

        // Completing the line later emits the fragment.
        let fragments = decoder.push_chunk(b"\n");
        assert_eq!(fragments, vec!["Hi"]);
    }
}
