//! `triage`: answers questions read from stdin, one JSON object per line.
//!
//! ```text
//! TRIAGE_DATASET_PATH=faq.jsonl triage [--rebuild-index] < questions.txt
//! ```

use std::sync::Arc;

use anyhow::{Context, bail};
use mimalloc::MiMalloc;
use tokio::io::{AsyncBufReadExt, BufReader};

use triage::config::Config;
use triage::{
    CategoryEncoder, CentroidModel, ConfidenceScorer, Engine, HashingEmbedder, IndexStore,
    load_dataset,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let rebuild = std::env::args().any(|arg| arg == "--rebuild-index");

    let config = Config::from_env()?;
    tracing::info!(
        index_dir = %config.index_dir.display(),
        dataset = ?config.dataset_path,
        rebuild,
        "Triage starting"
    );

    let embedder = Arc::new(HashingEmbedder::new(config.embedding_dim)?);

    let store = if rebuild {
        let path = config
            .dataset_path
            .as_deref()
            .context("--rebuild-index requires TRIAGE_DATASET_PATH")?;
        let records = load_dataset(path)?;
        let store = IndexStore::build_from_records(&records, &*embedder).await?;
        store.save(&config.index_dir)?;
        store
    } else {
        IndexStore::open_or_build(
            &config.index_dir,
            config.dataset_path.as_deref(),
            &*embedder,
        )
        .await?
    };

    let populated: Vec<&str> = store
        .categories()
        .filter(|c| store.get(c).is_some_and(|i| !i.is_empty()))
        .collect();
    if populated.len() < 2 {
        bail!(
            "need at least two populated categories, found {}",
            populated.len()
        );
    }

    let encoder = CategoryEncoder::sorted(populated)?;
    let model = CentroidModel::fit(&store, encoder.clone())?;
    let scorer = ConfidenceScorer::french_banking(encoder, config.scorer_config());
    let engine = Engine::new(
        embedder,
        model,
        scorer,
        store,
        config.cache_config(),
        config.retriever_config(),
    )?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        let output = match engine.ask(question).await {
            Ok(response) => serde_json::to_string(&response)?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to answer question");
                serde_json::json!({ "question": question, "error": e.to_string() }).to_string()
            }
        };
        println!("{output}");
    }

    tracing::info!(cache = ?engine.cache_stats(), "Triage shutdown complete");
    Ok(())
}
