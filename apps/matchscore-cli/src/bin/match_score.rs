//! `match-score <RESUME> <JOB_DESCRIPTION>`
//!
//! Prints the cosine similarity of the two documents' sentence embeddings on
//! stdout and nothing else. Diagnostics go to stderr; failures exit non-zero.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use matchscore_core::config::{Config, Settings};
use matchscore_core::types::Document;
use matchscore_core::{Error, Result, Scorer};
use matchscore_embed::get_default_embedder;

#[derive(Parser, Debug)]
#[command(name = "match-score", version, about = "Semantic similarity between a resume and a job description")]
struct Args {
    /// Plain-text resume
    resume: PathBuf,
    /// Plain-text job description
    job_description: PathBuf,
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args, settings: &Settings) -> Result<f32> {
    let resume = Document::read(&args.resume)?;
    let job_description = Document::read(&args.job_description)?;
    resume.require_text()?;
    job_description.require_text()?;

    let scorer = Scorer::new(get_default_embedder(settings)?);
    scorer.score_texts(&resume.text, &job_description.text)
}

/// Shortest round-trip decimal, always with a fractional part (`1.0`, not `1`).
fn format_score(score: f32) -> String {
    let s = score.to_string();
    if s.contains('.') { s } else { format!("{s}.0") }
}

fn fail(err: &Error) -> ExitCode {
    eprintln!("match-score: {err}");
    ExitCode::from(err.exit_code())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match Config::load().and_then(|c| c.settings()) {
        Ok(s) => s,
        Err(e) => {
            init_logging(&Settings::default().log_level);
            return fail(&e);
        }
    };
    init_logging(&settings.log_level);
    tracing::debug!(resume = %args.resume.display(), job_description = %args.job_description.display(), "scoring");

    match run(&args, &settings) {
        Ok(score) => {
            println!("{}", format_score(score));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
