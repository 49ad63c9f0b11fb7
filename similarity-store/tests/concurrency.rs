//! Concurrent access through the `SimilarityStore` trait object.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use rag_similarity_store::{Document, InMemoryStore, SimilarityStore};

fn axis(i: usize) -> Vec<f32> {
    let mut v = vec![0.0; 4];
    v[i % 4] = 1.0;
    v
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_upserts_are_all_visible() {
    let store: Arc<dyn SimilarityStore> = Arc::new(InMemoryStore::new());
    store.initialize().await.unwrap();

    let mut handles = Vec::new();
    for writer in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let batch: Vec<Document> = (0..10)
                .map(|i| Document::new(format!("writer {writer} doc {i}"), axis(i)))
                .collect();
            store.upsert(batch).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 10);
    }

    assert_eq!(store.count().await.unwrap(), 80);
    let hits = store.query(&axis(0), 100, None).await.unwrap();
    assert_eq!(hits.len(), 80);
    assert_eq!(hits.iter().filter(|h| h.score > 0.99).count(), 24);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queries_during_writes_see_whole_batches() {
    let store: Arc<dyn SimilarityStore> = Arc::new(InMemoryStore::with_dimension(4));

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for round in 0..20 {
                let batch = vec![
                    Document::new(format!("round {round} a"), axis(0)),
                    Document::new(format!("round {round} b"), axis(1)),
                ];
                store.upsert(batch).await.unwrap();
            }
        })
    };

    for _ in 0..20 {
        let seen = store.query(&axis(0), 1000, None).await.unwrap().len();
        assert_eq!(seen % 2, 0, "a batch was observed half-written");
        tokio::task::yield_now().await;
    }

    writer.await.unwrap();
    assert_eq!(store.count().await.unwrap(), 40);
}
