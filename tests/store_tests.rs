//! Durability tests against the on-disk store.

mod common;

use common::{deck, seed_deck_cache, ScriptedRemote};
use std::sync::Arc;
use tempfile::TempDir;
use vocab_review::store::{
    decode_blob, encode_blob, BlobKind, LocalStore, RedbStore, DECK_KEY, OUTBOX_KEY,
};
use vocab_review::{Outbox, PendingRating, Rating, ReviewDeckCache, ReviewItem};

/// Appends followed by an abrupt drop come back intact after reopening.
#[tokio::test]
async fn test_outbox_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.redb");

    let appended = vec![
        PendingRating::new("w1", Rating::Again),
        PendingRating::new("w2", Rating::Hard),
        PendingRating::new("w3", Rating::Good),
        PendingRating::new("w1", Rating::Easy),
    ];

    {
        let store = Arc::new(RedbStore::open(&path).unwrap());
        let outbox = Outbox::new(store);
        for rating in &appended {
            outbox.append(rating.clone()).await.unwrap();
        }
        // Dropped here without any shutdown step
    }

    let store = Arc::new(RedbStore::open(&path).unwrap());
    let outbox = Outbox::new(store);
    assert_eq!(outbox.peek_all().await.unwrap(), appended);
}

#[tokio::test]
async fn test_prefix_removal_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.redb");
    let appended = vec![
        PendingRating::new("w1", Rating::Good),
        PendingRating::new("w2", Rating::Good),
        PendingRating::new("w3", Rating::Good),
    ];

    {
        let outbox = Outbox::new(Arc::new(RedbStore::open(&path).unwrap()));
        for rating in &appended {
            outbox.append(rating.clone()).await.unwrap();
        }
        outbox.remove_through_index(2).await.unwrap();
    }

    let outbox = Outbox::new(Arc::new(RedbStore::open(&path).unwrap()));
    assert_eq!(outbox.peek_all().await.unwrap(), appended[2..].to_vec());
}

#[tokio::test]
async fn test_deck_roundtrip_for_various_sizes() {
    for n in [0, 1, 2, 7, 25] {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("client.redb");
        let original: Vec<ReviewItem> = deck(n);

        {
            let store: Arc<dyn LocalStore> = Arc::new(RedbStore::open(&path).unwrap());
            seed_deck_cache(store, original.clone()).await;
        }

        let store: Arc<dyn LocalStore> = Arc::new(RedbStore::open(&path).unwrap());
        let cache = ReviewDeckCache::new(Arc::new(ScriptedRemote::new()), store);
        assert_eq!(cache.cached().await.unwrap(), Some(original), "deck of {}", n);
    }
}

#[tokio::test]
async fn test_both_keys_coexist() {
    let dir = TempDir::new().unwrap();
    let store = RedbStore::open(dir.path().join("client.redb")).unwrap();

    let ratings = vec![PendingRating::new("w1", Rating::Good)];
    store
        .write(DECK_KEY, encode_blob(BlobKind::ReviewItems, &deck(2)).unwrap())
        .await
        .unwrap();
    store
        .write(
            OUTBOX_KEY,
            encode_blob(BlobKind::PendingRatings, &ratings).unwrap(),
        )
        .await
        .unwrap();

    let deck_bytes = store.read(DECK_KEY).await.unwrap().unwrap();
    let outbox_bytes = store.read(OUTBOX_KEY).await.unwrap().unwrap();
    let items: Vec<ReviewItem> = decode_blob(BlobKind::ReviewItems, &deck_bytes).unwrap();
    let queued: Vec<PendingRating> = decode_blob(BlobKind::PendingRatings, &outbox_bytes).unwrap();
    assert_eq!(items, deck(2));
    assert_eq!(queued, ratings);
}

/// A legacy bare-array outbox is read as-is and rewritten as an envelope.
#[tokio::test]
async fn test_legacy_outbox_is_migrated_on_write() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(RedbStore::open(dir.path().join("client.redb")).unwrap());

    let legacy = r#"[
        {"id": "0b1e7b8c-5d0f-4a35-b7c1-6f7c9a0d2e11", "word_id": "w1", "rating": 2,
         "created_at": "2026-02-10T09:30:00Z"}
    ]"#;
    store
        .write(OUTBOX_KEY, legacy.as_bytes().to_vec())
        .await
        .unwrap();

    let outbox = Outbox::new(store.clone());
    let existing = outbox.peek_all().await.unwrap();
    assert_eq!(existing.len(), 1);
    assert_eq!(existing[0].rating, Rating::Hard);

    outbox
        .append(PendingRating::new("w2", Rating::Good))
        .await
        .unwrap();

    let raw = store.read(OUTBOX_KEY).await.unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(json["version"], 1);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["items"][0]["word_id"], "w1");
}
