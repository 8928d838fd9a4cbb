use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use sentencer_core::arbitration::domain::semantic_hints::SemanticHints;
use sentencer_core::pipeline::assemble_sentences_use_case::Document;
use sentencer_core::segmentation::domain::recognizer_segment::RecognizerSegment;
use sentencer_core::segmentation::domain::speaker_segment::SpeakerSegment;
use sentencer_core::shared::time_span::TimeSpan;

/// One recognizer chunk as it appears in the input JSON.
#[derive(Deserialize)]
struct RecognizerChunk {
    text: String,
    start: f64,
    end: f64,
}

/// One diarization turn as it appears in the input JSON.
#[derive(Deserialize)]
struct SpeakerTurn {
    speaker: String,
    start: f64,
    end: f64,
}

/// One semantic boundary hint as it appears in the input JSON.
#[derive(Deserialize)]
struct Hint {
    word_index: usize,
    score: f32,
}

/// Reads recognizer chunks and builds the canonical document.
///
/// The canonical text is the chunk texts joined by single spaces, with
/// internal whitespace runs collapsed so byte offsets stay consistent.
pub fn load_document(path: &Path) -> Result<Document, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    let chunks: Vec<RecognizerChunk> = serde_json::from_str(&raw)?;

    let mut text = String::new();
    let mut segments = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let normalized = chunk.text.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            continue;
        }
        let char_start = if text.is_empty() {
            0
        } else {
            text.push(' ');
            text.len()
        };
        text.push_str(&normalized);
        segments.push(RecognizerSegment {
            text: normalized,
            span: TimeSpan::new(chunk.start, chunk.end),
            char_start,
        });
    }

    Ok(Document { text, segments })
}

pub fn load_diarization(path: &Path) -> Result<Vec<SpeakerSegment>, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    let turns: Vec<SpeakerTurn> = serde_json::from_str(&raw)?;
    Ok(turns
        .into_iter()
        .map(|turn| SpeakerSegment {
            speaker_id: turn.speaker,
            span: TimeSpan::new(turn.start, turn.end),
        })
        .collect())
}

pub fn load_hints(path: &Path) -> Result<SemanticHints, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    let hints: Vec<Hint> = serde_json::from_str(&raw)?;
    Ok(SemanticHints::new(
        hints.into_iter().map(|h| (h.word_index, h.score)),
    ))
}
