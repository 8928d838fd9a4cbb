use crate::shared::ranges::{CharRange, WordRange};

/// One whitespace-delimited token of the canonical text.
#[derive(Clone, Debug, PartialEq)]
pub struct WordToken {
    pub text: String,
    pub chars: CharRange,
}

/// The canonical transcript text plus its word tokenization.
///
/// All conversions between byte offsets and word indices go through this
/// map; nothing else in the engine is allowed to re-derive either
/// coordinate system from raw strings.
#[derive(Clone, Debug)]
pub struct TextMap {
    text: String,
    tokens: Vec<WordToken>,
}

impl TextMap {
    pub fn build(text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut start: Option<usize> = None;

        for (i, c) in text.char_indices() {
            if c.is_whitespace() {
                if let Some(s) = start.take() {
                    tokens.push(WordToken {
                        text: text[s..i].to_string(),
                        chars: CharRange::new(s, i),
                    });
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            tokens.push(WordToken {
                text: text[s..].to_string(),
                chars: CharRange::new(s, text.len()),
            });
        }

        Self {
            text: text.to_string(),
            tokens,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[WordToken] {
        &self.tokens
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn word(&self, index: usize) -> &str {
        &self.tokens[index].text
    }

    /// Whether `segment_text` appears verbatim at `char_start`.
    pub fn matches_at(&self, char_start: usize, segment_text: &str) -> bool {
        self.text
            .get(char_start..char_start + segment_text.len())
            .is_some_and(|s| s == segment_text)
    }

    /// Word indices touched by a char range (partial overlap counts).
    pub fn word_range_for_chars(&self, range: CharRange) -> WordRange {
        let start = self
            .tokens
            .partition_point(|t| t.chars.end <= range.start);
        let end = self.tokens.partition_point(|t| t.chars.start < range.end);
        WordRange::new(start, end.max(start))
    }

    /// Word boundary nearest a raw byte offset.
    ///
    /// Offsets inside a token resolve to whichever side of the token the
    /// offset is closer to, so a proportional split that failed to snap to
    /// whitespace still never divides a word.
    pub fn word_boundary_near(&self, offset: usize) -> usize {
        let idx = self.tokens.partition_point(|t| t.chars.end <= offset);
        match self.tokens.get(idx) {
            Some(t) if t.chars.contains(offset) => {
                let into = offset - t.chars.start;
                if into * 2 >= t.chars.len() {
                    idx + 1
                } else {
                    idx
                }
            }
            _ => idx,
        }
    }

    /// Byte offset of the nearest whitespace within `window` bytes of
    /// `offset`, or `None` if the window contains no whitespace.
    pub fn nearest_whitespace(&self, offset: usize, window: usize) -> Option<usize> {
        let bytes = self.text.as_bytes();
        if offset < bytes.len() && bytes[offset].is_ascii_whitespace() {
            return Some(offset);
        }
        for d in 1..=window {
            if offset >= d && bytes[offset - d].is_ascii_whitespace() {
                return Some(offset - d);
            }
            if offset + d < bytes.len() && bytes[offset + d].is_ascii_whitespace() {
                return Some(offset + d);
            }
        }
        None
    }
}
