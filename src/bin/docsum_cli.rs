//! Command-line front end for the summarization pipeline.
//!
//! `extract` prints the text the pipeline would see for a document without contacting any
//! provider; `summarize` runs the full pipeline with the provider from the environment. Input
//! files are copied into a temporary artifact first, so the pipeline's cleanup never touches
//! the caller's original.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use docsum::{
    config::Config,
    extraction::DocumentFormat,
    logging,
    processing::{SummarizationPipeline, Submission, TemporaryArtifact, UploadedFile},
    summarization,
};

#[derive(Parser)]
#[command(
    name = "docsum-cli",
    about = "Extract text from documents or summarize them from the command line"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the plain text extracted from a PDF, DOCX, or TXT file.
    Extract { path: PathBuf },
    /// Summarize a document or a piece of text with the configured provider.
    Summarize {
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        file: Option<PathBuf>,
        #[arg(long)]
        text: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_cli_tracing();
    match cli.command {
        Command::Extract { path } => extract(&path).await,
        Command::Summarize { file, text } => summarize(file, text).await,
    }
}

async fn extract(path: &Path) -> Result<()> {
    let file_name = file_name_of(path)?;
    let format = DocumentFormat::from_file_name(&file_name)
        .with_context(|| format!("unsupported file type: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let text = tokio::task::spawn_blocking(move || format.extract(&bytes))
        .await
        .context("extraction task failed")?
        .with_context(|| format!("failed to extract text from {}", path.display()))?;
    println!("{text}");
    Ok(())
}

async fn summarize(file: Option<PathBuf>, text: Option<String>) -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("failed to load configuration")?;
    let summarizer = summarization::client_from_config(&config)
        .context("failed to build summarization client")?;
    let pipeline = SummarizationPipeline::new(summarizer);

    let submission = match (file, text) {
        (Some(path), _) => stage_file(&path).await?,
        (None, Some(text)) => Submission::text(text),
        (None, None) => bail!("either --file or --text is required"),
    };

    let summary = pipeline.run(submission).await?;
    println!("{summary}");
    Ok(())
}

async fn stage_file(path: &Path) -> Result<Submission> {
    let file_name = file_name_of(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let staging_dir = std::env::temp_dir().join("docsum");
    let artifact = TemporaryArtifact::create(&staging_dir, &bytes)
        .await
        .with_context(|| format!("failed to stage {} in {}", path.display(), staging_dir.display()))?;
    Ok(Submission::File(UploadedFile {
        artifact,
        file_name,
        content_type: None,
    }))
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("path has no usable file name: {}", path.display()))
}
