use std::sync::Arc;

use tempfile::TempDir;

use petal::analysis::{FilterRegistry, FnFilter, Pipeline, StopWordFilter};
use petal::lexical::SNAPSHOT_VERSION;
use petal::{
    Document, Engine, Index, IndexConfig, IndexSnapshot, PetalError, Query, SearchRequest,
};

fn sample_index() -> petal::Result<Index> {
    let mut index = Index::new();
    index.add_field("title").add_field("body");
    index.add_doc(
        &Document::new()
            .add_text("id", "a")
            .add_text("title", "Quick brown fox")
            .add_text("body", "jumps over the lazy dog"),
    )?;
    index.add_doc(
        &Document::new()
            .add_text("id", "b")
            .add_text("title", "Quiet night")
            .add_list("body", vec!["stars", "moon"]),
    )?;
    Ok(index)
}

#[test]
fn test_json_layout() -> petal::Result<()> {
    let index = sample_index()?;
    let json: serde_json::Value = serde_json::from_str(&index.to_json()?)?;

    assert_eq!(json["version"], SNAPSHOT_VERSION);
    assert_eq!(json["fields"], serde_json::json!(["title", "body"]));
    assert_eq!(json["ref"], "id");
    assert_eq!(
        json["pipeline"],
        serde_json::json!(["trimmer", "stopWordFilter", "stemmer"])
    );
    assert_eq!(json["documentStore"]["length"], 2);
    assert_eq!(json["documentStore"]["save"], true);
    assert_eq!(json["documentStore"]["docInfo"]["a"]["body"], 4);
    assert_eq!(json["documentStore"]["docs"]["b"]["body"], serde_json::json!(["stars", "moon"]));
    assert_eq!(json["index"]["title"]["root"]["f"]["o"]["x"]["docs"]["a"]["tf"], 1.0);
    assert_eq!(json["index"]["title"]["root"]["f"]["o"]["x"]["df"], 1);
    Ok(())
}

#[test]
fn test_file_round_trip() -> petal::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("index.json");

    let index = sample_index()?;
    index.write_json(&path)?;
    let restored = Index::read_json(&path)?;

    assert_eq!(restored.doc_count(), 2);
    assert_eq!(restored.to_snapshot(), index.to_snapshot());
    for query in ["fox", "quiet", "moon", "lazy dogs"] {
        let query = Query::from(query);
        assert_eq!(restored.search(&query, None), index.search(&query, None));
    }
    Ok(())
}

#[test]
fn test_restored_index_accepts_changes() -> petal::Result<()> {
    let mut restored = Index::from_json(&sample_index()?.to_json()?)?;
    assert!(restored.remove_doc_by_ref("a"));
    restored.add_doc(
        &Document::new()
            .add_text("id", "c")
            .add_text("title", "Fox hunting"),
    )?;

    let results = restored.search(&"fox".into(), None);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].doc_ref, "c");
    Ok(())
}

#[test]
fn test_long_token_round_trip() -> petal::Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("long.json");

    for length in [200, 50_000] {
        let token = "z".repeat(length);
        let mut index = Index::new();
        index.add_field("title");
        index.add_doc(&Document::new().add_text("id", "1").add_text("title", token.as_str()))?;

        let restored = Index::from_json(&index.to_json()?)?;
        assert_eq!(restored.to_snapshot(), index.to_snapshot());
        assert_eq!(restored.search(&Query::from(token.as_str()), None).len(), 1);

        index.write_json(&path)?;
        let restored = Index::read_json(&path)?;
        assert_eq!(restored.search(&Query::from(token.as_str()), None).len(), 1);
    }
    Ok(())
}

#[test]
fn test_engine_restores_long_token() -> petal::Result<()> {
    let config = IndexConfig::builder().add_field("url").build();
    let source = Engine::new(config.clone())?;
    let token = "w".repeat(300);
    source.put_document(Document::new().add_text("id", "1").add_text("url", token.as_str()))?;

    let target = Engine::new(config)?;
    target.restore(IndexSnapshot::from_json(&source.snapshot().to_json()?)?)?;
    assert_eq!(
        target.search(SearchRequest::new(token.as_str())),
        source.search(SearchRequest::new(token.as_str()))
    );
    Ok(())
}

#[test]
fn test_read_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = Index::read_json(temp_dir.path().join("missing.json"));
    assert!(matches!(result, Err(PetalError::Io(_))));
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        Index::from_json("{\"version\": "),
        Err(PetalError::Json(_))
    ));
}

#[test]
fn test_custom_filter_round_trip() -> petal::Result<()> {
    let reverse = Arc::new(FnFilter::new("reverse", |token: &str, _: usize, _: &[String]| {
        Some(token.chars().rev().collect())
    }));

    let stop_words = Arc::new(StopWordFilter::new());
    let mut registry = FilterRegistry::with_defaults(stop_words);
    registry.register(reverse.clone());
    let registry = Arc::new(registry);

    let mut index = Index::new();
    index.add_field("title");
    index.pipeline_mut().add(reverse);
    index.add_doc(&Document::new().add_text("id", "1").add_text("title", "hello"))?;

    let snapshot = index.to_snapshot();
    assert_eq!(
        snapshot.pipeline,
        vec!["trimmer", "stopWordFilter", "stemmer", "reverse"]
    );
    assert!(matches!(
        Index::load(snapshot.clone()),
        Err(PetalError::NotFound(_))
    ));

    let restored = Index::load_with_registry(snapshot, registry.clone())?;
    assert_eq!(restored.search(&"hello".into(), None).len(), 1);

    let pipeline = Pipeline::load(&["reverse"], registry)?;
    assert_eq!(pipeline.run(&["abc".to_string()]), vec!["cba"]);
    Ok(())
}

#[test]
fn test_engine_snapshot_restore() -> petal::Result<()> {
    let config = IndexConfig::builder().add_field("title").build();
    let source = Engine::new(config.clone())?;
    source.put_document(Document::new().add_text("id", "1").add_text("title", "Brown fox"))?;

    let target = Engine::new(config)?;
    assert_eq!(target.doc_count(), 0);

    let snapshot: IndexSnapshot = serde_json::from_str(&serde_json::to_string(&source.snapshot())?)?;
    target.restore(snapshot)?;
    assert_eq!(target.doc_count(), 1);
    assert_eq!(
        target.search(SearchRequest::new("fox")),
        source.search(SearchRequest::new("fox"))
    );
    Ok(())
}
