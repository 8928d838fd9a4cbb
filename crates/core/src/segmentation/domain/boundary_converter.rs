use crate::segmentation::domain::recognizer_segment::RecognizerSegment;
use crate::segmentation::domain::speaker_segment::SpeakerSegment;
use crate::segmentation::domain::speaker_word_range::SpeakerWordRange;
use crate::shared::constants::{
    DOMINANCE_THRESHOLD, EDGE_WINDOW_FRACTION, MIN_SPEAKER_OVERLAP_SECS, SNAP_WINDOW_CHARS,
};
use crate::shared::ranges::WordRange;
use crate::shared::text_map::TextMap;
use crate::shared::time_span::TimeSpan;

const EPS: f64 = 1e-9;

#[derive(Clone, Debug)]
pub struct ConverterConfig {
    /// Diarization overlaps shorter than this are ignored as noise.
    pub min_overlap_secs: f64,
    /// Speaker share above which edge-confined minorities are absorbed.
    pub dominance_threshold: f64,
    /// Edge window width as a fraction of the segment duration.
    pub edge_window_fraction: f64,
    /// Search radius (bytes) for snapping split points to whitespace.
    pub snap_window_chars: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            min_overlap_secs: MIN_SPEAKER_OVERLAP_SECS,
            dominance_threshold: DOMINANCE_THRESHOLD,
            edge_window_fraction: EDGE_WINDOW_FRACTION,
            snap_window_chars: SNAP_WINDOW_CHARS,
        }
    }
}

/// One speaker's clipped overlap with a recognizer segment.
#[derive(Clone, Debug)]
struct SpeakerOverlap {
    speaker_id: String,
    span: TimeSpan,
}

/// Maps time-based speaker intervals onto word positions.
///
/// Each recognizer segment is attributed whole when a single speaker
/// covers it, split proportionally when several do, and left unattributed
/// when diarization says nothing about it.
pub struct BoundaryConverter {
    config: ConverterConfig,
}

impl BoundaryConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn convert(
        &self,
        segments: &[RecognizerSegment],
        speakers: &[SpeakerSegment],
        map: &TextMap,
    ) -> Vec<SpeakerWordRange> {
        let mut ranges = Vec::new();

        for seg in segments {
            let seg_words = map.word_range_for_chars(seg.char_range());
            if seg_words.is_empty() {
                continue;
            }

            let overlaps = self.overlaps_for(seg, speakers);
            match overlaps.len() {
                0 => ranges.push(SpeakerWordRange::new(None, seg_words)),
                1 => ranges.push(SpeakerWordRange::new(
                    Some(overlaps[0].speaker_id.clone()),
                    seg_words,
                )),
                _ => {
                    if let Some(dominant) = self.dominant_speaker(seg, &overlaps) {
                        ranges.push(SpeakerWordRange::new(Some(dominant), seg_words));
                    } else {
                        self.split_proportionally(seg, seg_words, &overlaps, map, &mut ranges);
                    }
                }
            }
        }

        SpeakerWordRange::coalesce(ranges)
    }

    /// Clipped, noise-filtered overlaps in time order, with consecutive
    /// entries of the same speaker fused into one slot.
    fn overlaps_for(
        &self,
        seg: &RecognizerSegment,
        speakers: &[SpeakerSegment],
    ) -> Vec<SpeakerOverlap> {
        let mut overlaps: Vec<SpeakerOverlap> = speakers
            .iter()
            .filter_map(|sp| {
                sp.span.overlap(&seg.span).map(|span| SpeakerOverlap {
                    speaker_id: sp.speaker_id.clone(),
                    span,
                })
            })
            .filter(|o| o.span.duration() >= self.config.min_overlap_secs)
            .collect();

        overlaps.sort_by(|a, b| a.span.start.total_cmp(&b.span.start));

        let mut fused: Vec<SpeakerOverlap> = Vec::with_capacity(overlaps.len());
        for o in overlaps {
            match fused.last_mut() {
                Some(prev) if prev.speaker_id == o.speaker_id => {
                    prev.span.end = prev.span.end.max(o.span.end);
                }
                _ => fused.push(o),
            }
        }
        fused
    }

    /// The edge-noise guard: one speaker holds more than the dominance
    /// share of the segment and every other overlap hugs a segment edge.
    /// Mid-segment minorities (a real interjection) never qualify.
    fn dominant_speaker(
        &self,
        seg: &RecognizerSegment,
        overlaps: &[SpeakerOverlap],
    ) -> Option<String> {
        let seg_duration = seg.span.duration();
        if seg_duration <= 0.0 {
            return None;
        }

        // Shares are per speaker, not per slot: a speaker interrupted by
        // an interjection holds two slots that count together.
        let mut totals: Vec<(&str, f64)> = Vec::new();
        for o in overlaps {
            match totals.iter_mut().find(|(id, _)| *id == o.speaker_id) {
                Some((_, d)) => *d += o.span.duration(),
                None => totals.push((&o.speaker_id, o.span.duration())),
            }
        }
        let (major, major_total) = totals
            .iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .copied()?;

        if major_total / seg_duration <= self.config.dominance_threshold {
            return None;
        }

        let edge_w = seg_duration * self.config.edge_window_fraction;
        let lead_end = seg.span.start + edge_w;
        let tail_start = seg.span.end - edge_w;

        let all_edge_confined = overlaps
            .iter()
            .filter(|o| o.speaker_id != major)
            .all(|o| {
                o.span.end <= lead_end + EPS
                    || o.span.start >= tail_start - EPS
                    || o.span.start <= seg.span.start + EPS
                    || o.span.end >= seg.span.end - EPS
            });

        all_edge_confined.then(|| major.to_string())
    }

    /// Splits the segment's char span by each speaker's time share, in
    /// time order, snapping each cut to nearby whitespace when possible.
    fn split_proportionally(
        &self,
        seg: &RecognizerSegment,
        seg_words: WordRange,
        overlaps: &[SpeakerOverlap],
        map: &TextMap,
        out: &mut Vec<SpeakerWordRange>,
    ) {
        let total: f64 = overlaps.iter().map(|o| o.span.duration()).sum();
        if total <= 0.0 {
            out.push(SpeakerWordRange::new(None, seg_words));
            return;
        }

        let mut cursor = seg_words.start;
        let mut covered = 0.0;

        for (i, o) in overlaps.iter().enumerate() {
            let end = if i + 1 == overlaps.len() {
                seg_words.end
            } else {
                covered += o.span.duration();
                let frac = covered / total;
                let raw = seg.char_start + (frac * seg.text.len() as f64).round() as usize;
                let snapped = map
                    .nearest_whitespace(raw, self.config.snap_window_chars)
                    .unwrap_or(raw);
                map.word_boundary_near(snapped)
                    .clamp(cursor, seg_words.end)
            };

            out.push(SpeakerWordRange::new(
                Some(o.speaker_id.clone()),
                WordRange::new(cursor, end),
            ));
            cursor = end;
        }
    }
}

impl Default for BoundaryConverter {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}
