//! Dataset and engine fixtures.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use triage::{
    CacheConfig, CategoryEncoder, CentroidModel, ConfidenceScorer, Embedder, Engine, FaqRecord,
    IndexStore, RetrieverConfig, ScorerConfig,
};

pub const DIM: usize = 64;

pub const RECHARGE: &str = "Comment recharger ma carte ?";
pub const RECHARGE_ANSWER: &str = "En ligne, en agence ou par virement.";
pub const RIB: &str = "Où trouver mon RIB ?";
pub const RIB_ANSWER: &str = "Dans l'application, rubrique Mes comptes.";

pub fn sample_records() -> Vec<FaqRecord> {
    vec![
        FaqRecord::new("Prépayée", RECHARGE, RECHARGE_ANSWER),
        FaqRecord::new(
            "Prépayée",
            "Quel est le plafond de ma carte prépayée ?",
            "Le plafond est de 500 euros par mois.",
        ),
        FaqRecord::new("Compte", RIB, RIB_ANSWER),
        FaqRecord::new(
            "Compte",
            "Comment fermer mon compte courant ?",
            "Contactez votre conseiller.",
        ),
        FaqRecord::new(
            "Sécurité",
            "J'ai perdu ma carte, que faire ?",
            "Faites opposition immédiatement.",
        ),
    ]
}

/// Writes `records` as JSON Lines to `dir/faq.jsonl`.
pub fn write_dataset(dir: &Path, records: &[FaqRecord]) -> PathBuf {
    let path = dir.join("faq.jsonl");
    let body: String = records
        .iter()
        .map(|r| serde_json::to_string(r).unwrap() + "\n")
        .collect();
    fs::write(&path, body).unwrap();
    path
}

/// Wires an engine over `store` the same way the binary does.
pub fn build_engine<E: Embedder>(embedder: Arc<E>, store: IndexStore) -> Engine<E, CentroidModel> {
    let populated: Vec<String> = store
        .categories()
        .filter(|c| store.get(c).is_some_and(|i| !i.is_empty()))
        .map(str::to_string)
        .collect();
    let encoder = CategoryEncoder::sorted(populated).unwrap();
    let model = CentroidModel::fit(&store, encoder.clone()).unwrap();
    let scorer = ConfidenceScorer::french_banking(encoder, ScorerConfig::default());

    Engine::new(
        embedder,
        model,
        scorer,
        store,
        CacheConfig::default(),
        RetrieverConfig::default(),
    )
    .unwrap()
}
