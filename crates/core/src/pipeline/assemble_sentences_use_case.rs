use std::time::Instant;

use thiserror::Error;

use crate::arbitration::domain::arbitrator::BoundaryArbitrator;
use crate::arbitration::domain::boundary::AcceptedBoundary;
use crate::arbitration::domain::language::{Language, LanguageProfile};
use crate::arbitration::domain::semantic_hints::SemanticHints;
use crate::assembly::domain::merge_formatter::{MergeFormatter, MergeRecord};
use crate::assembly::domain::sentence::Sentence;
use crate::assembly::domain::utterance_assembler::UtteranceAssembler;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::segmentation::domain::boundary_converter::{BoundaryConverter, ConverterConfig};
use crate::segmentation::domain::recognizer_segment::RecognizerSegment;
use crate::segmentation::domain::speaker_segment::SpeakerSegment;
use crate::shared::text_map::TextMap;

/// One transcript to reconcile: the canonical text and the recognizer
/// segments that produced it.
#[derive(Clone, Debug)]
pub struct Document {
    pub text: String,
    pub segments: Vec<RecognizerSegment>,
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(
        "recognizer segment {segment_index} does not match the canonical text at offset {char_start}"
    )]
    InconsistentOffsets {
        segment_index: usize,
        char_start: usize,
    },
    #[error("worker thread panicked before delivering a result")]
    WorkerPanicked,
}

/// Finished output for one document.
#[derive(Debug)]
pub struct DocumentSentences {
    pub sentences: Vec<Sentence>,
    pub merge_records: Vec<MergeRecord>,
    /// Accepted boundary trace, for debugging.
    pub boundaries: Vec<AcceptedBoundary>,
}

/// Orchestrates the full reconciliation pipeline for one document:
/// text map → boundary conversion → arbitration → utterance assembly →
/// merge formatting.
///
/// Strictly single-threaded per document; process independent documents
/// with separate instances (see the threaded executor).
pub struct AssembleSentencesUseCase {
    profile: LanguageProfile,
    converter: BoundaryConverter,
    assembler: UtteranceAssembler,
    formatter: MergeFormatter,
}

impl AssembleSentencesUseCase {
    pub fn new(language: Language, converter_config: ConverterConfig) -> Self {
        Self {
            profile: LanguageProfile::for_language(language),
            converter: BoundaryConverter::new(converter_config),
            assembler: UtteranceAssembler::default(),
            formatter: MergeFormatter::new(language),
        }
    }

    pub fn run(
        &self,
        document: &Document,
        diarization: Option<&[SpeakerSegment]>,
        hints: &SemanticHints,
        logger: &mut dyn PipelineLogger,
    ) -> Result<DocumentSentences, ReconcileError> {
        let started = Instant::now();
        let map = TextMap::build(&document.text);
        self.verify_offsets(&map, &document.segments)?;
        logger.timing("map", started.elapsed().as_secs_f64() * 1000.0);

        let speakers = match diarization {
            Some(segments) => SpeakerSegment::sanitize(segments),
            None => {
                logger.info("No diarization input; arbitrating from recognizer and semantic signals only");
                Vec::new()
            }
        };

        let started = Instant::now();
        let speaker_ranges = self
            .converter
            .convert(&document.segments, &speakers, &map);
        logger.timing("convert", started.elapsed().as_secs_f64() * 1000.0);
        logger.metric("speaker_ranges", speaker_ranges.len() as f64);

        let recognizer_last_words: Vec<usize> = document
            .segments
            .iter()
            .filter_map(|seg| {
                let words = map.word_range_for_chars(seg.char_range());
                (!words.is_empty()).then(|| words.end - 1)
            })
            .collect();

        let started = Instant::now();
        let outcome = BoundaryArbitrator::new(&self.profile).arbitrate(
            &map,
            &recognizer_last_words,
            &speaker_ranges,
            hints,
        );
        logger.timing("arbitrate", started.elapsed().as_secs_f64() * 1000.0);

        let started = Instant::now();
        let sentences: Vec<Sentence> = outcome
            .sentences
            .iter()
            .map(|span| {
                self.assembler
                    .assemble(&outcome.words, span.range, &speaker_ranges)
            })
            .collect();
        logger.timing("assemble", started.elapsed().as_secs_f64() * 1000.0);

        let started = Instant::now();
        let (sentences, merge_records) = self.formatter.format(sentences, &outcome.punctuation);
        logger.timing("merge", started.elapsed().as_secs_f64() * 1000.0);
        logger.metric("sentences", sentences.len() as f64);
        logger.metric("merges", merge_records.iter().filter(|r| r.kept).count() as f64);

        Ok(DocumentSentences {
            sentences,
            merge_records,
            boundaries: outcome.boundaries,
        })
    }

    /// Structural misalignment is the one fatal condition: boundaries
    /// computed against wrong offsets would silently corrupt the output.
    fn verify_offsets(
        &self,
        map: &TextMap,
        segments: &[RecognizerSegment],
    ) -> Result<(), ReconcileError> {
        for (i, seg) in segments.iter().enumerate() {
            if !map.matches_at(seg.char_start, &seg.text) {
                return Err(ReconcileError::InconsistentOffsets {
                    segment_index: i,
                    char_start: seg.char_start,
                });
            }
        }
        Ok(())
    }
}
