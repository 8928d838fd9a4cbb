/// End-exclusive range of byte offsets into the canonical text.
///
/// Kept as a distinct type from [`WordRange`] so the two coordinate
/// systems can never be mixed without an explicit conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharRange {
    pub start: usize,
    pub end: usize,
}

impl CharRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// End-exclusive range of word indices into the tokenized text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordRange {
    pub start: usize,
    pub end: usize,
}

impl WordRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// Intersection with another word range, or `None` when empty.
    pub fn intersect(&self, other: &WordRange) -> Option<WordRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end > start {
            Some(WordRange::new(start, end))
        } else {
            None
        }
    }
}
