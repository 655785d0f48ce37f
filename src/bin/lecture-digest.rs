//! CLI binary for lecture-digest.
//!
//! A thin shim over the library crate that maps CLI flags to `DigestConfig`
//! and prints each result block as soon as its stage finishes.

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use lecture_digest::{
    digest_stream, load_document, AudioFormat, DigestConfig, DigestEvent,
    DigestProgressCallback, Digester, LanguageBucket, MarkerLocale, OutputLayout, PipelineState,
    ProgressCallback, Stage, SynthesisFailurePolicy,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on stderr showing the current stage and chunk.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl DigestProgressCallback for CliProgressCallback {
    fn on_state_change(&self, state: PipelineState) {
        match state {
            PipelineState::Done | PipelineState::Failed => self.bar.finish_and_clear(),
            other => {
                self.bar.set_prefix(capitalise(&other.to_string()));
                self.bar.set_message("");
            }
        }
    }

    fn on_chunk_start(&self, stage: Stage, chunk_num: usize, total: usize) {
        self.bar.set_message(format!("{stage} chunk {chunk_num}/{total}"));
    }

    fn on_chunk_error(&self, stage: Stage, chunk_num: usize, total: usize, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };
        self.bar.println(format!(
            "  {} {} chunk {:>3}/{:<3}  {}",
            red("✗"),
            stage,
            chunk_num,
            total,
            red(&msg),
        ));
    }
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summary, podcasts and quiz for a local lecture
  lecture-digest lecture.pdf

  # From a URL, audio written to ./out
  lecture-digest https://example.com/notes.pdf -o out

  # Keep every run's audio instead of overwriting
  lecture-digest --per-run-dir lecture.pdf

  # Different voices and region
  lecture-digest --arabic-voice Hala --english-voice Matthew --aws-region eu-west-1 lecture.pdf

  # Machine-readable output
  lecture-digest --json lecture.pdf > digest.json

OUTPUT FILES:
  <output-dir>/podcast_ar.<ext>   Arabic lines of the summary (if any)
  <output-dir>/podcast_en.<ext>   all other lines of the summary (if any)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  AWS_ACCESS_KEY_ID       AWS credentials for Polly (or any standard AWS source)
  AWS_SECRET_ACCESS_KEY
  PDFIUM_LIB_PATH         Path to libpdfium; otherwise the system library is used
"#;

/// Summarize a PDF lecture, narrate it in Arabic and English, and generate a quiz.
#[derive(Parser, Debug)]
#[command(
    name = "lecture-digest",
    version,
    about = "Summarize a PDF lecture, narrate it as a podcast, and generate quiz questions",
    long_about = "Extracts the text of a PDF (local file or URL), summarizes it chunk by chunk \
with an LLM, narrates the Arabic and English lines of the summary with Amazon Polly, and \
generates multiple-choice questions from the original text.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Directory receiving the podcast files.
    #[arg(short, long, env = "DIGEST_OUTPUT_DIR", default_value = "assets")]
    output_dir: PathBuf,

    /// Write each run into its own run-<uuid> subdirectory.
    #[arg(long, env = "DIGEST_PER_RUN_DIR")]
    per_run_dir: bool,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "DIGEST_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Characters per summarization call.
    #[arg(long, env = "DIGEST_SUMMARY_CHUNK_SIZE", default_value_t = 1000)]
    summary_chunk_size: usize,

    /// Characters per quiz-generation call.
    #[arg(long, env = "DIGEST_QUIZ_CHUNK_SIZE", default_value_t = 1000)]
    quiz_chunk_size: usize,

    /// Characters per speech-synthesis call.
    #[arg(long, env = "DIGEST_SPEECH_CHUNK_SIZE", default_value_t = 1500)]
    speech_chunk_size: usize,

    /// Minimum summary length per chunk.
    #[arg(long, env = "DIGEST_SUMMARY_MIN", default_value_t = 50)]
    summary_min: usize,

    /// Maximum summary length per chunk.
    #[arg(long, env = "DIGEST_SUMMARY_MAX", default_value_t = 300)]
    summary_max: usize,

    /// Multiple-choice questions requested per quiz chunk.
    #[arg(long, env = "DIGEST_QUESTIONS", default_value_t = 5)]
    questions: usize,

    /// Polly voice for Arabic lines.
    #[arg(long, env = "DIGEST_ARABIC_VOICE", default_value = "Zeina")]
    arabic_voice: String,

    /// Polly voice for all other lines.
    #[arg(long, env = "DIGEST_ENGLISH_VOICE", default_value = "Joanna")]
    english_voice: String,

    /// Audio container for both podcasts.
    #[arg(long, env = "DIGEST_AUDIO_FORMAT", value_enum, default_value = "mp3")]
    audio_format: AudioFormatArg,

    /// Drop failing speech chunks instead of abandoning the whole podcast.
    #[arg(long, env = "DIGEST_SKIP_FAILED_SPEECH")]
    skip_failed_speech_chunks: bool,

    /// Language of inline error markers.
    #[arg(long, env = "DIGEST_MARKER_LANG", value_enum, default_value = "english")]
    marker_lang: MarkerLangArg,

    /// AWS region for Polly.
    #[arg(long, env = "DIGEST_AWS_REGION", default_value = "us-east-1")]
    aws_region: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "DIGEST_PASSWORD")]
    password: Option<String>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DIGEST_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Output structured JSON (DigestOutput) instead of text blocks.
    #[arg(long, env = "DIGEST_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "DIGEST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DIGEST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, env = "DIGEST_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum AudioFormatArg {
    Mp3,
    Ogg,
    Pcm,
}

impl From<AudioFormatArg> for AudioFormat {
    fn from(v: AudioFormatArg) -> Self {
        match v {
            AudioFormatArg::Mp3 => AudioFormat::Mp3,
            AudioFormatArg::Ogg => AudioFormat::OggVorbis,
            AudioFormatArg::Pcm => AudioFormat::Pcm,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum MarkerLangArg {
    English,
    Arabic,
}

impl From<MarkerLangArg> for MarkerLocale {
    fn from(v: MarkerLangArg) -> Self {
        match v {
            MarkerLangArg::English => MarkerLocale::English,
            MarkerLangArg::Arabic => MarkerLocale::Arabic,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO-level library logs unless --verbose is set.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config and services ────────────────────────────────────────
    let spinner = show_progress.then(CliProgressCallback::new);
    let progress_cb = spinner.clone().map(|cb| cb as ProgressCallback);
    let config = build_config(&cli, progress_cb)?;

    let digester = Digester::from_config(config)
        .await
        .context("Failed to initialise services")?;
    let document = load_document(&cli.input, cli.download_timeout)
        .await
        .with_context(|| format!("Failed to load {}", cli.input))?;

    // ── JSON mode: one document at the end ───────────────────────────────
    if cli.json {
        let output = digester.run(document).await.context("Digest failed")?;
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    // ── Human mode: print each block as it arrives ───────────────────────
    let print = |block: String| match &spinner {
        Some(cb) => cb.bar.suspend(|| println!("{block}")),
        None => println!("{block}"),
    };

    let mut events = digest_stream(&digester, document);
    while let Some(event) = events.next().await {
        match event {
            DigestEvent::StateChanged(_) => {}
            DigestEvent::SummaryReady(summary) => {
                print(format!("{}\n{}\n", bold("Summary"), summary));
            }
            DigestEvent::AudioReady(audio) => {
                let title = match audio.bucket {
                    LanguageBucket::Arabic => "Podcast - Arabic",
                    LanguageBucket::Other => "Podcast - English",
                };
                print(format!(
                    "{}\n{} {}  {}\n",
                    bold(title),
                    green("✔"),
                    audio.path.display(),
                    dim(&format!("{} bytes, voice {}", audio.bytes, audio.voice)),
                ));
            }
            DigestEvent::AudioFailed(failure) => {
                let title = match failure.bucket {
                    LanguageBucket::Arabic => "Podcast - Arabic",
                    LanguageBucket::Other => "Podcast - English",
                };
                print(format!("{}\n{} {}\n", bold(title), red("✘"), red(&failure.error)));
            }
            DigestEvent::QuizReady(quiz) => {
                print(format!("{}\n{}\n", bold("Quiz"), quiz));
            }
            DigestEvent::Finished(output) => {
                if !cli.quiet {
                    let stats = &output.stats;
                    let failed = stats.failed_summary_chunks + stats.failed_quiz_chunks;
                    eprintln!(
                        "{}  {} summary / {} quiz chunks  {} podcast(s)  {}ms",
                        if failed == 0 && stats.failed_audio_branches == 0 {
                            green("✔")
                        } else {
                            cyan("⚠")
                        },
                        stats.summary_chunks,
                        stats.quiz_chunks,
                        stats.audio_artifacts,
                        stats.total_duration_ms,
                    );
                    if failed > 0 {
                        eprintln!("   {} chunk(s) failed", red(&failed.to_string()));
                    }
                }
            }
            DigestEvent::Failed(e) => {
                return Err(anyhow::Error::new(e).context("Digest failed"));
            }
        }
    }

    Ok(())
}

/// Map CLI args to `DigestConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<DigestConfig> {
    let mut builder = DigestConfig::builder()
        .summary_chunk_size(cli.summary_chunk_size)
        .quiz_chunk_size(cli.quiz_chunk_size)
        .speech_chunk_size(cli.speech_chunk_size)
        .summary_bounds(cli.summary_min, cli.summary_max)
        .quiz_question_count(cli.questions)
        .arabic_voice(cli.arabic_voice.clone())
        .english_voice(cli.english_voice.clone())
        .audio_format(cli.audio_format.into())
        .output_dir(cli.output_dir.clone())
        .marker_locale(cli.marker_lang.into())
        .temperature(cli.temperature)
        .aws_region(cli.aws_region.clone())
        .download_timeout_secs(cli.download_timeout);

    if cli.per_run_dir {
        builder = builder.output_layout(OutputLayout::PerRun);
    }
    if cli.skip_failed_speech_chunks {
        builder = builder.synthesis_failure_policy(SynthesisFailurePolicy::SkipChunk);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
