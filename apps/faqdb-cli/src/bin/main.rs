use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use faqdb_core::config::{Config, Settings};
use faqdb_core::types::IngestReport;
use faqdb_core::Error;
use faqdb_engine::{Resources, Retrieval, RetrievalEngine, StoreHandle};

const EMPTY_QUESTION_WARNING: &str = "⚠️  Please enter a question.";

#[derive(Parser)]
#[command(name = "faqdb", version, about = "Answer questions from ingested text documents")]
struct Cli {
    /// Base configuration file; `config.<env>.toml` next to it is merged on top.
    #[arg(long, global = true, env = "FAQDB_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index text files (directories are searched for *.txt)
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Answer a single question
    Ask {
        question: String,
        /// Number of passages to return (defaults to retrieval.top_k)
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Answer questions read line by line from stdin
    Chat {
        #[arg(short, long)]
        k: Option<usize>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => { eprintln!("error: {:#}", e); ExitCode::FAILURE }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load_from(&cli.config).context("loading configuration")?;
    let settings = config.settings()?;
    let engine = open_engine(&settings)?;
    match cli.command {
        Command::Ingest { paths } => ingest(&engine, &paths),
        Command::Ask { question, k } => {
            let k = k.unwrap_or(engine.default_k());
            match engine.retrieve(&question, k) {
                Ok(retrieval) => { print_retrieval(&retrieval); Ok(ExitCode::SUCCESS) }
                Err(Error::EmptyQuery) => { eprintln!("{}", EMPTY_QUESTION_WARNING); Ok(ExitCode::from(2)) }
                Err(e) => Err(e.into()),
            }
        }
        Command::Chat { k } => chat(&engine, k.unwrap_or(engine.default_k())),
    }
}

fn open_engine(settings: &Settings) -> anyhow::Result<RetrievalEngine<StoreHandle>> {
    let resources = Resources::from_settings(settings).context("initialising embedder and vector store")?;
    Ok(RetrievalEngine::from_settings(resources, settings)?)
}

fn ingest(engine: &RetrievalEngine<StoreHandle>, paths: &[PathBuf]) -> anyhow::Result<ExitCode> {
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paths {msg}")?.progress_chars("#>-"));
    let mut reports: Vec<IngestReport> = Vec::new();
    for path in paths {
        pb.set_message(short_name(path));
        if path.is_dir() {
            reports.extend(engine.ingest_dir(path).with_context(|| format!("ingesting directory {}", path.display()))?);
        } else {
            reports.push(engine.ingest_path(path).with_context(|| format!("ingesting {}", path.display()))?);
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");
    let chunks: usize = reports.iter().map(|r| r.chunks).sum();
    println!("✅ Ingested {} file(s) into {} chunk(s)", reports.len(), chunks);
    Ok(ExitCode::SUCCESS)
}

/// Answer on stdout, sources on stderr.
fn print_retrieval(retrieval: &Retrieval) {
    println!("{}", retrieval.render());
    if retrieval.is_found() {
        eprintln!("sources: {}", retrieval.sources().join(", "));
    }
}

fn chat(engine: &RetrievalEngine<StoreHandle>, k: usize) -> anyhow::Result<ExitCode> {
    let stdin = io::stdin();
    let mut stderr = io::stderr();
    eprintln!("💬 Ask a question (\"exit\" to quit)");
    loop {
        eprint!("> ");
        stderr.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 { break; }
        let question = line.trim();
        if matches!(question, "exit" | "quit") { break; }
        match engine.retrieve(question, k) {
            Ok(retrieval) => { print_retrieval(&retrieval); println!(); }
            Err(Error::EmptyQuery) => eprintln!("{}", EMPTY_QUESTION_WARNING),
            Err(e) => eprintln!("error: {}", e),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn short_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() { Cli::command().debug_assert(); }

    #[test]
    fn ask_accepts_k() {
        let cli = Cli::try_parse_from(["faqdb", "ask", "When is the deadline?", "-k", "3"]).unwrap();
        match cli.command {
            Command::Ask { question, k } => { assert_eq!(question, "When is the deadline?"); assert_eq!(k, Some(3)); }
            _ => panic!("expected ask"),
        }
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn ingest_requires_a_path() {
        assert!(Cli::try_parse_from(["faqdb", "ingest"]).is_err());
    }
}
