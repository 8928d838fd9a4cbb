use std::thread;

use crate::arbitration::domain::language::Language;
use crate::arbitration::domain::semantic_hints::SemanticHints;
use crate::pipeline::assemble_sentences_use_case::{
    AssembleSentencesUseCase, Document, DocumentSentences, ReconcileError,
};
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::segmentation::domain::boundary_converter::ConverterConfig;
use crate::segmentation::domain::speaker_segment::SpeakerSegment;

const DEFAULT_WORKER_COUNT: usize = 4;

/// One independent unit of work: a document plus its side inputs.
#[derive(Clone, Debug)]
pub struct DocumentJob {
    pub document: Document,
    pub diarization: Option<Vec<SpeakerSegment>>,
    pub hints: SemanticHints,
}

/// Reconciles a batch of documents on a fixed pool of worker threads.
///
/// Documents are mutually independent, so the pool is a plain fan-out:
/// each worker owns its own use case and pulls jobs from a shared channel.
/// Results come back in input order regardless of completion order.
pub struct ThreadedDocumentExecutor {
    worker_count: usize,
}

impl ThreadedDocumentExecutor {
    pub fn new() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }

    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }

    pub fn execute(
        &self,
        language: Language,
        config: ConverterConfig,
        jobs: Vec<DocumentJob>,
        logger: &mut dyn PipelineLogger,
    ) -> Vec<Result<DocumentSentences, ReconcileError>> {
        let job_count = jobs.len();
        if job_count == 0 {
            return Vec::new();
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, DocumentJob)>();
        let (result_tx, result_rx) =
            crossbeam_channel::unbounded::<(usize, Result<DocumentSentences, ReconcileError>)>();

        for (index, job) in jobs.into_iter().enumerate() {
            // Unbounded channel, send cannot fail while the receiver lives.
            let _ = job_tx.send((index, job));
        }
        drop(job_tx);

        let workers = self.worker_count.min(job_count);
        let handles: Vec<_> = (0..workers)
            .map(|_| spawn_worker(language, config.clone(), job_rx.clone(), result_tx.clone()))
            .collect();
        drop(result_tx);

        let mut slots: Vec<Option<Result<DocumentSentences, ReconcileError>>> =
            (0..job_count).map(|_| None).collect();
        let mut completed = 0;
        for (index, result) in result_rx {
            slots[index] = Some(result);
            completed += 1;
            logger.progress(completed, job_count);
        }

        for handle in handles {
            if handle.join().is_err() {
                log::error!("document worker panicked");
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or(Err(ReconcileError::WorkerPanicked)))
            .collect()
    }
}

impl Default for ThreadedDocumentExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_worker(
    language: Language,
    config: ConverterConfig,
    job_rx: crossbeam_channel::Receiver<(usize, DocumentJob)>,
    result_tx: crossbeam_channel::Sender<(usize, Result<DocumentSentences, ReconcileError>)>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let use_case = AssembleSentencesUseCase::new(language, config);
        let mut logger = NullPipelineLogger;
        for (index, job) in job_rx {
            let result = use_case.run(
                &job.document,
                job.diarization.as_deref(),
                &job.hints,
                &mut logger,
            );
            if result_tx.send((index, result)).is_err() {
                break;
            }
        }
    })
}
