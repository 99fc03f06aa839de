use std::sync::Arc;
use std::thread;

use petal::{
    BoolMode, Document, Engine, FieldOptions, IndexConfig, PetalError, SearchOptions,
    SearchRequest,
};

fn article(id: &str, title: &str, body: &str) -> Document {
    Document::new()
        .add_text("id", id)
        .add_text("title", title)
        .add_text("body", body)
}

fn engine() -> petal::Result<Engine> {
    let config = IndexConfig::builder()
        .add_field("title")
        .add_field("body")
        .build();
    let engine = Engine::new(config)?;

    engine.put_document(article("1", "Rust ownership", "Borrowing and lifetimes explained"))?;
    engine.put_document(article("2", "Async Rust", "Futures, executors and lifetimes"))?;
    engine.put_document(article("3", "Gardening", "Growing tomatoes in small spaces"))?;
    Ok(engine)
}

fn refs(results: &[petal::SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.doc_ref.as_str()).collect()
}

#[test]
fn test_put_and_search() -> petal::Result<()> {
    let engine = engine()?;
    assert_eq!(engine.doc_count(), 3);

    let results = engine.search(SearchRequest::new("rust"));
    let mut hits = refs(&results);
    hits.sort();
    assert_eq!(hits, vec!["1", "2"]);
    assert!(results.iter().all(|r| r.doc.is_some()));

    assert!(engine.search(SearchRequest::new("python")).is_empty());
    Ok(())
}

#[test]
fn test_field_options() -> petal::Result<()> {
    let engine = engine()?;

    let options = SearchOptions::new()
        .field("title", FieldOptions::new().boost(1.0))
        .field("body", FieldOptions::new().boost(10.0));
    let results = engine.search(SearchRequest::builder("lifetimes").options(options).build());
    assert_eq!(results.len(), 2);

    let title_only = SearchOptions::new().field("title", FieldOptions::new());
    let results = engine.search(
        SearchRequest::builder("lifetimes")
            .options(title_only)
            .build(),
    );
    assert!(results.is_empty());
    Ok(())
}

#[test]
fn test_and_mode_across_fields() -> petal::Result<()> {
    let engine = engine()?;
    let options = SearchOptions::new().bool(BoolMode::And);

    let results = engine.search(
        SearchRequest::builder("futures lifetimes")
            .options(options.clone())
            .build(),
    );
    assert_eq!(refs(&results), vec!["2"]);

    let results = engine.search(
        SearchRequest::builder("gardening rust")
            .options(options)
            .build(),
    );
    assert!(results.is_empty());
    Ok(())
}

#[test]
fn test_limit_and_offset() -> petal::Result<()> {
    let engine = engine()?;
    let all = engine.search(SearchRequest::new("rust lifetimes"));
    assert_eq!(all.len(), 2);

    let first = engine.search(SearchRequest::builder("rust lifetimes").limit(1).build());
    assert_eq!(first, all[..1].to_vec());

    let second = engine.search(
        SearchRequest::builder("rust lifetimes")
            .offset(1)
            .limit(5)
            .build(),
    );
    assert_eq!(second, all[1..].to_vec());

    let beyond = engine.search(SearchRequest::builder("rust lifetimes").offset(9).build());
    assert!(beyond.is_empty());
    Ok(())
}

#[test]
fn test_update_and_delete() -> petal::Result<()> {
    let engine = engine()?;

    engine.update_document(article("3", "Rust gardening", "Weeding with a borrow checker"))?;
    assert_eq!(engine.doc_count(), 3);
    assert!(engine.search(SearchRequest::new("tomatoes")).is_empty());
    assert_eq!(engine.search(SearchRequest::new("rust")).len(), 3);

    assert!(engine.delete_document("3"));
    assert!(!engine.delete_document("3"));
    assert_eq!(engine.doc_count(), 2);
    assert_eq!(engine.search(SearchRequest::new("rust")).len(), 2);
    Ok(())
}

#[test]
fn test_missing_reference() -> petal::Result<()> {
    let engine = engine()?;
    let result = engine.put_document(Document::new().add_text("title", "orphan"));
    assert!(matches!(result, Err(PetalError::InvalidArgument(_))));
    assert_eq!(engine.doc_count(), 3);
    Ok(())
}

#[test]
fn test_custom_analysis() -> petal::Result<()> {
    let config = IndexConfig::builder()
        .add_field("tags")
        .ref_field("slug")
        .separator(r"[,;]+")
        .stop_words(["draft"])
        .pipeline(["trimmer", "stopWordFilter"])
        .build();
    let engine = Engine::new(config)?;
    engine.put_document(
        Document::new()
            .add_text("slug", "post-1")
            .add_text("tags", "Machine Learning;draft,running"),
    )?;

    assert_eq!(
        refs(&engine.search(SearchRequest::new("machine learning"))),
        vec!["post-1"]
    );
    // No stemmer in the pipeline.
    assert!(engine.search(SearchRequest::new("run")).is_empty());
    assert!(engine.search(SearchRequest::new("draft")).is_empty());
    assert_eq!(
        engine.with_index(|index| index.document_store().get_field_length("post-1", "tags")),
        2
    );
    Ok(())
}

#[test]
fn test_invalid_config() {
    let bad_separator = IndexConfig::builder().add_field("title").separator("(").build();
    assert!(matches!(
        Engine::new(bad_separator),
        Err(PetalError::InvalidConfig(_))
    ));

    let bad_pipeline = IndexConfig::builder()
        .add_field("title")
        .pipeline(["lemmatizer"])
        .build();
    assert!(matches!(
        Engine::new(bad_pipeline),
        Err(PetalError::NotFound(_))
    ));
}

#[test]
fn test_without_document_storage() -> petal::Result<()> {
    let config = IndexConfig::builder()
        .add_field("title")
        .store_documents(false)
        .build();
    let engine = Engine::new(config)?;
    engine.put_document(Document::new().add_integer("id", 1).add_text("title", "fox"))?;

    let results = engine.search(SearchRequest::new("fox"));
    assert_eq!(refs(&results), vec!["1"]);
    assert!(results[0].doc.is_none());
    assert!(!engine.delete_document("1"));
    Ok(())
}

#[test]
fn test_concurrent_readers() -> petal::Result<()> {
    let engine = Arc::new(engine()?);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            thread::spawn(move || {
                if i == 0 {
                    engine
                        .put_document(article("4", "Rust macros", "Declarative macros"))
                        .map(|_| 0)
                } else {
                    Ok(engine.search(SearchRequest::new("rust")).len())
                }
            })
        })
        .collect();

    for handle in handles {
        let hits = handle.join().expect("thread panicked")?;
        assert!(hits <= 3);
    }
    assert_eq!(engine.search(SearchRequest::new("rust")).len(), 3);
    Ok(())
}
