//! Application entry point: doc-narrator CLI.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse the command line.
//! 3. Load [`AppConfig`] (defaults on first run) and apply CLI overrides.
//! 4. Create the [`tokio`] runtime.
//! 5. Build the pipeline services: extractor, TTS backend, Whisper model,
//!    ffmpeg encoder.
//! 6. Run one job, logging [`JobEvent`]s as they arrive.
//! 7. Print the output path, or the error and exit 1.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;

use doc_narrator::{
    config::{AppConfig, AppPaths},
    content::extractor_from_config,
    media::FfmpegEncoder,
    pipeline::{JobEvent, JobRequest, PipelineOrchestrator, PipelineServices},
    stt::{ModelPaths, TranscribeParams, TranscriptionError, WhisperRecognizer},
    tts::synthesizer_from_config,
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "doc-narrator", version, about = "Narrate a document over a video, with subtitles")]
struct Cli {
    /// Document to narrate (PDF).
    #[arg(long)]
    document: PathBuf,

    /// Video to lay the narration over (MP4).
    #[arg(long)]
    video: PathBuf,

    /// Output base name; the video extension is appended.
    #[arg(long)]
    name: String,

    /// Directory that receives the output.
    #[arg(long, default_value = ".")]
    dest: PathBuf,

    /// Narration and recognition language, e.g. `en` or `de`.
    #[arg(long)]
    language: Option<String>,

    /// Settings file to use instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Whisper model id (`tiny`, `base`, `small`, ...) or path to a GGML file.
    #[arg(long)]
    model: Option<String>,
}

// ---------------------------------------------------------------------------
// Service construction
// ---------------------------------------------------------------------------

fn build_services(config: &AppConfig) -> anyhow::Result<PipelineServices> {
    let extractor = extractor_from_config(&config.extract)?;
    let synthesizer = synthesizer_from_config(&config.tts);

    let models = ModelPaths::from_app_paths(&AppPaths::new());
    let model_path = models.resolve(&config.stt.model);
    let recognizer = match WhisperRecognizer::load(
        &model_path,
        TranscribeParams::from_config(&config.stt),
        config.stt.use_gpu,
    ) {
        Ok(recognizer) => recognizer,
        Err(e @ TranscriptionError::ModelNotFound(_)) => {
            return Err(anyhow::Error::new(e).context(format!(
                "no Whisper model at {}; known models:\n{}",
                model_path.display(),
                models.describe_models()
            )));
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("loading Whisper model {}", model_path.display())));
        }
    };
    log::info!("Whisper model loaded: {}", model_path.display());

    Ok(PipelineServices {
        extractor,
        synthesizer,
        recognizer: Arc::new(recognizer),
        encoder: Arc::new(FfmpegEncoder::from_config(&config.media)),
    })
}

async fn log_events(mut rx: mpsc::UnboundedReceiver<JobEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            JobEvent::StageStarted { stage, .. } => log::info!("[{stage}] started"),
            JobEvent::StageCompleted {
                stage,
                artifact: Some(path),
                ..
            } => log::info!("[{stage}] wrote {}", path.display()),
            JobEvent::StageCompleted { stage, .. } => log::info!("[{stage}] ok"),
            JobEvent::Finished { .. } | JobEvent::Failed { .. } => break,
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Command line
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<PathBuf> {
    // 3. Configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("reading settings from {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };
    if let Some(model) = &cli.model {
        config.stt.model = model.clone();
    }

    // 4. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    rt.block_on(execute(cli, config))
}

async fn execute(cli: Cli, config: AppConfig) -> anyhow::Result<PathBuf> {
    // 5. Services
    let services = build_services(&config)?;

    // 6. Job
    let (tx, rx) = mpsc::unbounded_channel();
    let logger = tokio::spawn(log_events(rx));

    let orchestrator = PipelineOrchestrator::new(services, config.pipeline).with_events(tx);
    let request = JobRequest {
        document: cli.document,
        video: cli.video,
        output_name: cli.name,
        destination: cli.dest,
        language: cli.language,
    };

    let result = orchestrator.run(&request).await;
    drop(orchestrator);
    let _ = logger.await;

    Ok(result?)
}
