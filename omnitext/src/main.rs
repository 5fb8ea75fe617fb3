use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use omnitext::{
    Config, ErrorKind, ExtractError, ExtractOptions, ExtractedContent, ExtractionFactory,
};

#[derive(Parser)]
#[command(name = "omnitext")]
#[command(about = "Extract plain text from PDF, Office, Outlook and text documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from one or more files
    Extract {
        /// Files to extract
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write `<file name>.txt` (or `.json`) files here instead of stdout
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Emit JSON, with per-sheet rows for spreadsheets
        #[arg(long)]
        structured: bool,

        /// Files extracted concurrently (default: OMNITEXT_JOBS or CPU count)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Show which formats can be extracted in this environment
    Formats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omnitext=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let factory = ExtractionFactory::from_config(&config);

    match cli.command {
        Commands::Extract {
            paths,
            out_dir,
            structured,
            jobs,
        } => {
            let jobs = jobs.unwrap_or(config.batch.jobs).max(1);
            run_extract(Arc::new(factory), paths, out_dir, structured, jobs).await
        }
        Commands::Formats => {
            print_formats(&factory);
            Ok(())
        }
    }
}

async fn run_extract(
    factory: Arc<ExtractionFactory>,
    paths: Vec<PathBuf>,
    out_dir: Option<PathBuf>,
    structured: bool,
    jobs: usize,
) -> anyhow::Result<()> {
    if let Some(dir) = &out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    tracing::info!(files = paths.len(), jobs, "Starting extraction");

    let mut results: Vec<(usize, PathBuf, anyhow::Result<ExtractedContent>)> =
        stream::iter(paths.into_iter().enumerate())
            .map(|(index, path)| {
                let factory = factory.clone();
                async move {
                    let task_path = path.clone();
                    let result = tokio::task::spawn_blocking(move || {
                        extract_one(&factory, &task_path, structured)
                    })
                    .await
                    .context("Extraction task panicked")
                    .and_then(|r| r.map_err(anyhow::Error::from));
                    (index, path, result)
                }
            })
            .buffer_unordered(jobs)
            .collect()
            .await;

    results.sort_by_key(|(index, _, _)| *index);

    let mut failed = 0usize;
    let mut written = HashSet::new();
    for (_, path, result) in results {
        let outcome = result.and_then(|content| match out_dir.as_deref() {
            Some(dir) => {
                let target = dir.join(output_file_name(&path, structured));
                claim_target(&mut written, &target)?;
                write_output(&path, &content, Some(&target), structured)
            }
            None => write_output(&path, &content, None, structured),
        });
        if let Err(e) = outcome {
            failed += 1;
            tracing::error!(path = %path.display(), "Extraction failed: {e:#}");
        }
    }

    if failed > 0 {
        bail!("{failed} file(s) failed to extract");
    }

    tracing::info!("Extraction complete");
    Ok(())
}

/// Structured mode only changes the output for spreadsheets; other formats
/// fall back to their text units.
fn extract_one(
    factory: &ExtractionFactory,
    path: &Path,
    structured: bool,
) -> Result<ExtractedContent, ExtractError> {
    if !structured {
        return factory.auto_extract(path);
    }
    match factory.auto_extract_with(path, &ExtractOptions::structured()) {
        Err(e) if e.kind() == ErrorKind::UnsupportedMode => {
            tracing::debug!(path = %path.display(), "No structured view, using text");
            factory.auto_extract(path)
        }
        other => other,
    }
}

/// `report.pdf` -> `report.pdf.txt`. The source extension stays so
/// `report.pdf` and `report.docx` land in different files.
fn output_file_name(path: &Path, structured: bool) -> String {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let extension = if structured { "json" } else { "txt" };
    format!("{name}.{extension}")
}

/// Inputs with the same file name from different directories would share a
/// target; the later one fails instead of overwriting.
fn claim_target(written: &mut HashSet<PathBuf>, target: &Path) -> anyhow::Result<()> {
    if !written.insert(target.to_path_buf()) {
        bail!(
            "{} was already written for an earlier input",
            target.display()
        );
    }
    Ok(())
}

fn write_output(
    path: &Path,
    content: &ExtractedContent,
    target: Option<&Path>,
    structured: bool,
) -> anyhow::Result<()> {
    let rendered = if structured {
        serde_json::to_string_pretty(content).context("Failed to serialize content")?
    } else {
        content.text()
    };

    match target {
        Some(target) => {
            std::fs::write(target, rendered)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            tracing::info!(
                path = %path.display(),
                output = %target.display(),
                units = content.units.len(),
                words = content.word_count,
                "Extracted"
            );
        }
        None => {
            println!("{rendered}");
        }
    }

    Ok(())
}

fn print_formats(factory: &ExtractionFactory) {
    println!("{:<8} {:<14} AVAILABLE", "FORMAT", "PARSER");
    for row in factory.availability() {
        println!(
            "{:<8} {:<14} {}",
            row.token,
            row.collaborator,
            if row.available { "yes" } else { "no" }
        );
    }
}
