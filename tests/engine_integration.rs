//! End-to-end engine tests over a JSON Lines dataset.

mod common;

use std::sync::Arc;

use futures::future::join_all;
use tempfile::TempDir;
use triage::constants::NO_ANSWER_MESSAGE;
use triage::{
    EngineError, FaqRecord, HashingEmbedder, IndexStore, MockEmbedder, ScoringError,
};

use common::fixtures::{
    DIM, RECHARGE, RECHARGE_ANSWER, RIB, RIB_ANSWER, build_engine, sample_records, write_dataset,
};

async fn engine_from_dataset(
    temp: &TempDir,
) -> triage::Engine<HashingEmbedder, triage::CentroidModel> {
    let dataset = write_dataset(temp.path(), &sample_records());
    let embedder = Arc::new(HashingEmbedder::new(DIM).unwrap());
    let store = IndexStore::open_or_build(&temp.path().join("indices"), Some(&dataset), &*embedder)
        .await
        .unwrap();
    build_engine(embedder, store)
}

#[tokio::test]
async fn test_ask_answers_known_questions_from_dataset() {
    let temp = TempDir::new().unwrap();
    let engine = engine_from_dataset(&temp).await;

    let response = engine.ask(RECHARGE).await.unwrap();
    assert_eq!(response.category, "Prépayée");
    assert!(response.classification.keyword_override);
    assert_eq!(response.answer, RECHARGE_ANSWER);
    assert_eq!(response.best_question, RECHARGE);
    assert!((response.similarity - 1.0).abs() < 1e-6);
    assert!(response.answer_is_confident);

    let response = engine.ask(RIB).await.unwrap();
    assert_eq!(response.category, "Compte");
    assert_eq!(response.answer, RIB_ANSWER);
}

#[tokio::test]
async fn test_ask_keyword_category_without_entries_gets_no_answer() {
    let temp = TempDir::new().unwrap();
    let engine = engine_from_dataset(&temp).await;

    let response = engine.ask("Bonjour").await.unwrap();

    assert_eq!(response.category, "Salutation");
    assert_eq!(response.answer, NO_ANSWER_MESSAGE);
    assert_eq!(response.similarity, 0.0);
    assert!(response.best_question.is_empty());
    assert!(!response.answer_is_confident);
}

#[tokio::test]
async fn test_ask_rejects_blank_question() {
    let temp = TempDir::new().unwrap();
    let engine = engine_from_dataset(&temp).await;

    let err = engine.ask("   ").await.unwrap_err();
    assert!(matches!(err, EngineError::Scoring(ScoringError::EmptyText)));
}

#[tokio::test]
async fn test_probabilities_cover_every_model_category() {
    let temp = TempDir::new().unwrap();
    let engine = engine_from_dataset(&temp).await;

    let result = engine.classify("xyz abc").await.unwrap();

    let labels: Vec<&String> = result.probabilities.keys().collect();
    assert_eq!(labels, ["Compte", "Prépayée", "Sécurité"]);
    let total: f64 = result.probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(!result.keyword_override);
}

#[tokio::test]
async fn test_analyze_errors_reports_keyword_confusion() {
    let temp = TempDir::new().unwrap();
    let engine = engine_from_dataset(&temp).await;
    let records = sample_records();

    let report = engine.analyze_errors(&records).await.unwrap();

    // "plafond" is a Transaction keyword, so the prepaid limit question is misrouted.
    assert_eq!(report.samples, records.len());
    assert_eq!(report.total_errors, 1);
    assert_eq!(report.confusion.get("Prépayée->Transaction"), Some(&1));
    assert_eq!(report.errors[0].index, 1);
}

#[tokio::test]
async fn test_analyze_ambiguity_counts_every_question() {
    let temp = TempDir::new().unwrap();
    let engine = engine_from_dataset(&temp).await;

    let report = engine
        .analyze_ambiguity(&[RECHARGE, RIB, "xyz abc"])
        .await
        .unwrap();

    assert_eq!(report.samples, 3);
    assert!((0.0..=1.0).contains(&report.ambiguous_rate));
}

#[tokio::test]
async fn test_replace_store_serves_new_answers() {
    let temp = TempDir::new().unwrap();
    let engine = engine_from_dataset(&temp).await;
    assert_eq!(engine.ask(RECHARGE).await.unwrap().answer, RECHARGE_ANSWER);

    let embedder = HashingEmbedder::new(DIM).unwrap();
    let updated = vec![
        FaqRecord::new("Prépayée", RECHARGE, "Depuis l'application uniquement."),
        FaqRecord::new("Compte", RIB, RIB_ANSWER),
    ];
    let store = IndexStore::build_from_records(&updated, &embedder)
        .await
        .unwrap();

    assert_eq!(engine.replace_store(store), 1);
    let response = engine.ask(RECHARGE).await.unwrap();
    assert_eq!(response.answer, "Depuis l'application uniquement.");

    // Categories the scorer can emit stay addressable after the swap.
    let response = engine.ask("J'ai perdu ma carte, que faire ?").await.unwrap();
    assert_eq!(response.category, "Sécurité");
    assert_eq!(response.answer, NO_ANSWER_MESSAGE);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_asks_agree_and_share_the_cache() {
    let temp = TempDir::new().unwrap();
    let dataset = write_dataset(temp.path(), &sample_records());
    let embedder = Arc::new(MockEmbedder::new(DIM));
    let store = IndexStore::open_or_build(&temp.path().join("indices"), Some(&dataset), &*embedder)
        .await
        .unwrap();
    let engine = Arc::new(build_engine(embedder.clone(), store));

    let tasks = (0..16).map(|i| {
        let engine = engine.clone();
        let question = if i % 2 == 0 { RECHARGE } else { RIB };
        tokio::spawn(async move { engine.ask(question).await })
    });
    let responses: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    for (i, response) in responses.iter().enumerate() {
        let expected = if i % 2 == 0 { RECHARGE_ANSWER } else { RIB_ANSWER };
        assert_eq!(response.answer, expected);
    }

    let calls = embedder.calls();
    engine.ask(RECHARGE).await.unwrap();
    engine.ask(RIB).await.unwrap();
    assert_eq!(embedder.calls(), calls, "cached questions must not re-embed");
    assert_eq!(engine.cache_stats().size, 2);
}
