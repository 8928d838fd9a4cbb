use std::path::PathBuf;
use std::process;

use clap::Parser;

use sentencer_core::arbitration::domain::language::Language;
use sentencer_core::arbitration::domain::semantic_hints::SemanticHints;
use sentencer_core::assembly::domain::merge_formatter::{MergeReason, MergeRecord};
use sentencer_core::assembly::domain::sentence::Sentence;
use sentencer_core::pipeline::assemble_sentences_use_case::AssembleSentencesUseCase;
use sentencer_core::pipeline::infrastructure::threaded_document_executor::{
    DocumentJob, ThreadedDocumentExecutor,
};
use sentencer_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use sentencer_core::segmentation::domain::boundary_converter::ConverterConfig;

mod input;

/// Speaker-aware sentence reconstruction for speech transcripts.
#[derive(Parser)]
#[command(name = "sentencer")]
struct Cli {
    /// Recognizer output: JSON array of {text, start, end} chunks.
    /// Several files are reconciled in parallel.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Diarization turns: JSON array of {speaker, start, end}.
    #[arg(long)]
    diarization: Option<PathBuf>,

    /// Semantic boundary hints: JSON array of {word_index, score}.
    #[arg(long)]
    hints: Option<PathBuf>,

    /// Transcript language: es or en.
    #[arg(long, default_value = "es")]
    language: String,

    /// Ignore diarization overlaps shorter than this many seconds.
    #[arg(long, default_value = "0.3")]
    min_overlap: f64,

    /// Speaker share above which edge-confined minorities are absorbed (0.0-1.0).
    #[arg(long, default_value = "0.8")]
    dominance: f64,

    /// Edge window width as a fraction of segment duration (0.0-0.5).
    #[arg(long, default_value = "0.1")]
    edge_window: f64,

    /// Print merge decisions after the sentences.
    #[arg(long)]
    show_merges: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let language = parse_language(&cli.language)?;
    let config = ConverterConfig {
        min_overlap_secs: cli.min_overlap,
        dominance_threshold: cli.dominance,
        edge_window_fraction: cli.edge_window,
        ..ConverterConfig::default()
    };

    if cli.inputs.len() > 1 {
        return run_batch(&cli, language, config);
    }

    let document = input::load_document(&cli.inputs[0])?;
    let diarization = match &cli.diarization {
        Some(path) => Some(input::load_diarization(path)?),
        None => None,
    };
    let hints = match &cli.hints {
        Some(path) => input::load_hints(path)?,
        None => SemanticHints::default(),
    };

    let use_case = AssembleSentencesUseCase::new(language, config);
    let mut logger = StdoutPipelineLogger::new();
    let output = use_case.run(&document, diarization.as_deref(), &hints, &mut logger)?;

    for sentence in &output.sentences {
        println!("{}", format_sentence(sentence));
    }

    if cli.show_merges {
        for record in &output.merge_records {
            eprintln!("{}", format_merge(record));
        }
    }

    if let Some(summary) = logger.summary_string() {
        log::info!("{summary}");
    }

    Ok(())
}

fn run_batch(
    cli: &Cli,
    language: Language,
    config: ConverterConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut jobs = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        jobs.push(DocumentJob {
            document: input::load_document(path)?,
            diarization: None,
            hints: SemanticHints::default(),
        });
    }

    let executor = ThreadedDocumentExecutor::new();
    let mut logger = StdoutPipelineLogger::new();
    let results = executor.execute(language, config, jobs, &mut logger);

    let mut failures = 0;
    for (path, result) in cli.inputs.iter().zip(results) {
        match result {
            Ok(output) => {
                println!("== {} ==", path.display());
                for sentence in &output.sentences {
                    println!("{}", format_sentence(sentence));
                }
                if cli.show_merges {
                    for record in &output.merge_records {
                        eprintln!("{}", format_merge(record));
                    }
                }
            }
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} document(s) failed").into());
    }
    Ok(())
}

/// Single-speaker sentences print one attribution; sentences spanning
/// several speakers annotate each utterance.
fn format_sentence(sentence: &Sentence) -> String {
    if sentence.utterances.len() > 1 {
        return sentence
            .utterances
            .iter()
            .map(|u| format!("[{}] {}", u.speaker_id.as_deref().unwrap_or("?"), u.text))
            .collect::<Vec<_>>()
            .join(" ");
    }
    let speaker = sentence.primary_speaker.as_deref().unwrap_or("?");
    format!("[{speaker}] {}", sentence.text)
}

fn format_merge(record: &MergeRecord) -> String {
    let (left, right) = record.sentence_indices;
    let verdict = if record.kept { "merged" } else { "vetoed" };
    format!(
        "{verdict} {} between sentences {left} and {right}",
        reason_label(record.reason)
    )
}

fn reason_label(reason: MergeReason) -> &'static str {
    match reason {
        MergeReason::DomainSplit => "domain_split",
        MergeReason::DecimalSplit => "decimal_split",
        MergeReason::LocationAppositive => "location_appositive",
        MergeReason::RepeatedEmphatic => "repeated_emphatic",
        MergeReason::SpeakerMismatch => "speaker_mismatch",
    }
}

fn parse_language(tag: &str) -> Result<Language, Box<dyn std::error::Error>> {
    Language::from_tag(tag).ok_or_else(|| format!("Unsupported language '{tag}'").into())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    for input in &cli.inputs {
        if !input.exists() {
            return Err(format!("Input file not found: {}", input.display()).into());
        }
    }
    if cli.inputs.len() > 1 && (cli.diarization.is_some() || cli.hints.is_some()) {
        return Err("Diarization and hints apply to a single input file".into());
    }
    if cli.min_overlap < 0.0 {
        return Err(format!("Min overlap must be non-negative, got {}", cli.min_overlap).into());
    }
    if !(0.0..=1.0).contains(&cli.dominance) {
        return Err(format!(
            "Dominance must be between 0.0 and 1.0, got {}",
            cli.dominance
        )
        .into());
    }
    if !(0.0..=0.5).contains(&cli.edge_window) {
        return Err(format!(
            "Edge window must be between 0.0 and 0.5, got {}",
            cli.edge_window
        )
        .into());
    }
    Ok(())
}
