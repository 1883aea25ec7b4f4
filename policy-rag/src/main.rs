use std::path::PathBuf;

use clap::Parser;
use policy_rag::{EngineConfig, PolicyQaEngine, QueryRequest, default_corpus, load_corpus_file};
use tracing_subscriber::EnvFilter;

/// Answer an employee question from the company policy corpus.
#[derive(Debug, Parser)]
#[command(name = "policy-qa", version, about)]
struct Cli {
    /// The question to answer.
    question: Option<String>,

    /// JSON file holding an array of policy documents. Uses the built-in
    /// handbook when omitted.
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Maximum number of policies to ground the answer on (1-10).
    #[arg(long)]
    max_results: Option<usize>,

    /// Print engine health instead of answering.
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let engine = PolicyQaEngine::builder().config(EngineConfig::from_env()).build()?;
    let corpus = match &cli.corpus {
        Some(path) => load_corpus_file(path)?,
        None => default_corpus(),
    };
    engine.load_corpus(&corpus).await;

    if cli.health {
        println!("{}", serde_json::to_string_pretty(&engine.health().await)?);
        return Ok(());
    }

    let question = cli.question.ok_or_else(|| anyhow::anyhow!("a question is required"))?;
    let request = match cli.max_results {
        Some(max_results) => QueryRequest::new(question).with_max_results(max_results),
        None => engine.request(question),
    };

    let response = engine.answer(request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
