use std::io::Cursor;

use super::*;
use tempfile::TempDir;

#[test]
fn test_parse_records_accepts_aliases() {
    let input = concat!(
        r#"{"category": "Compte", "question": "Où trouver mon RIB ?", "answer": "Dans l'appli."}"#,
        "\n",
        r#"{"Categorie": " Prépayée ", "question": "Comment recharger ?", "Réponse": "En ligne."}"#,
        "\n",
    );
    let records = parse_records(Cursor::new(input)).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].category, "Prépayée");
    assert_eq!(records[1].answer, "En ligne.");
}

#[test]
fn test_parse_records_skips_blank_lines() {
    let input = "\n   \n{\"category\":\"A\",\"question\":\"q\",\"answer\":\"a\"}\n\n";
    assert_eq!(parse_records(Cursor::new(input)).unwrap().len(), 1);
}

#[test]
fn test_parse_error_reports_line() {
    let input = "{\"category\":\"A\",\"question\":\"q\",\"answer\":\"a\"}\nnot json\n";
    let err = parse_records(Cursor::new(input)).unwrap_err();
    assert!(matches!(err, DatasetError::Parse { line: 2, .. }));
}

#[test]
fn test_blank_field_rejected() {
    let input = "{\"category\":\"A\",\"question\":\"  \",\"answer\":\"a\"}\n";
    let err = parse_records(Cursor::new(input)).unwrap_err();
    assert!(matches!(err, DatasetError::InvalidRecord { line: 1, .. }));
}

#[test]
fn test_group_by_category_keeps_first_seen_order() {
    let records = vec![
        FaqRecord::new("Compte", "q1", "a1"),
        FaqRecord::new("Autre", "q2", "a2"),
        FaqRecord::new("Compte", "q3", "a3"),
    ];
    let groups = group_by_category(&records);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, "Compte");
    let questions: Vec<&str> = groups[0].1.iter().map(|r| r.question.as_str()).collect();
    assert_eq!(questions, ["q1", "q3"]);
    assert_eq!(groups[1].0, "Autre");
}

#[test]
fn test_load_dataset_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("faq.jsonl");
    std::fs::write(
        &path,
        "{\"category\":\"A\",\"question\":\"q\",\"answer\":\"a\"}\n",
    )
    .unwrap();

    assert_eq!(load_dataset(&path).unwrap().len(), 1);
}

#[test]
fn test_load_dataset_missing_or_empty() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load_dataset(&dir.path().join("missing.jsonl")),
        Err(DatasetError::Io { .. })
    ));

    let empty = dir.path().join("empty.jsonl");
    std::fs::write(&empty, "\n").unwrap();
    assert!(matches!(load_dataset(&empty), Err(DatasetError::Empty { .. })));
}
