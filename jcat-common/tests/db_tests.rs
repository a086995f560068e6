//! Entity store and filter path persistence tests

use jcat_common::db::{
    clear_filter_path, init_database, init_memory_database, is_catalog_empty, load_catalog,
    load_filter_path, replace_catalog, save_filter_path, Artist, CatalogPayload, Duration,
    FilterPathStore, Instrument, Quote, SqliteFilterPathStore, Video, VideoArtist, VideoType,
};
use jcat_common::{Category, Error, FilterEntry, FilterPath};

fn video(id: i64, name: &str, duration_id: Option<i64>, type_id: Option<i64>) -> Video {
    Video {
        id,
        name: name.to_string(),
        duration_text: "5:00".to_string(),
        path: format!("/videos/{}", id),
        location_id: format!("loc{}", id),
        availability: true,
        duration_id,
        type_id,
    }
}

fn sample_catalog() -> CatalogPayload {
    CatalogPayload {
        instruments: vec![
            Instrument { id: 10, name: "Piano".into() },
            Instrument { id: 20, name: "Trumpet".into() },
        ],
        types: vec![VideoType { id: 1, name: "Live".into() }],
        durations: vec![Duration {
            id: 1,
            name: "Short".into(),
            description: "Under 5 minutes".into(),
        }],
        videos: vec![video(100, "Peace Piece", Some(1), Some(1)), video(101, "So What", None, Some(1))],
        artists: vec![
            Artist {
                id: 1,
                name: "Bill".into(),
                surname: "Evans".into(),
                instrument_id: Some(10),
                rank: Some(5),
            },
            Artist {
                id: 2,
                name: "Miles".into(),
                surname: "Davis".into(),
                instrument_id: Some(20),
                rank: None,
            },
        ],
        quotes: vec![Quote {
            id: 1,
            text: "Do not fear mistakes.".into(),
            artist_id: Some(2),
            video_id: Some(101),
        }],
        video_artists: vec![
            VideoArtist { artist_id: 1, video_id: 100 },
            VideoArtist { artist_id: 2, video_id: 101 },
        ],
    }
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("jcat.db");

    let pool = init_database(&db_path).await;

    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("jcat.db");

    let pool1 = init_database(&db_path).await.unwrap();
    replace_catalog(&pool1, &sample_catalog()).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await.unwrap();
    assert!(!is_catalog_empty(&pool2).await.unwrap());
}

#[tokio::test]
async fn test_fresh_store_is_empty() {
    let pool = init_memory_database().await.unwrap();

    assert!(is_catalog_empty(&pool).await.unwrap());
    assert_eq!(load_catalog(&pool).await.unwrap(), CatalogPayload::default());
}

#[tokio::test]
async fn test_replace_then_load_returns_same_catalog() {
    let pool = init_memory_database().await.unwrap();
    let catalog = sample_catalog();

    let written = replace_catalog(&pool, &catalog).await.unwrap();
    assert_eq!(written.counts().videos, 2);
    assert_eq!(written.counts().video_artists, 2);

    let loaded = load_catalog(&pool).await.unwrap();
    assert_eq!(loaded, catalog);
    assert_eq!(written, loaded);
}

#[tokio::test]
async fn test_replace_returns_payload_as_written() {
    let pool = init_memory_database().await.unwrap();
    let mut catalog = sample_catalog();
    catalog.videos[0].type_id = Some(77);
    catalog.video_artists.push(VideoArtist { artist_id: 404, video_id: 100 });

    let written = replace_catalog(&pool, &catalog).await.unwrap();

    assert_eq!(written.videos[0].type_id, None);
    assert_eq!(written.video_artists.len(), 2);
    assert_eq!(written, load_catalog(&pool).await.unwrap());
}

#[tokio::test]
async fn test_replace_discards_previous_rows() {
    let pool = init_memory_database().await.unwrap();
    replace_catalog(&pool, &sample_catalog()).await.unwrap();

    let smaller = CatalogPayload {
        instruments: vec![Instrument { id: 30, name: "Bass".into() }],
        ..Default::default()
    };
    replace_catalog(&pool, &smaller).await.unwrap();

    let loaded = load_catalog(&pool).await.unwrap();
    assert_eq!(loaded, smaller);
}

#[tokio::test]
async fn test_failed_replace_leaves_store_untouched() {
    let pool = init_memory_database().await.unwrap();
    let original = sample_catalog();
    replace_catalog(&pool, &original).await.unwrap();

    // Duplicate primary key fails half way through the inserts
    let broken = CatalogPayload {
        instruments: vec![Instrument { id: 99, name: "Vibraphone".into() }],
        videos: vec![video(500, "A", None, None), video(500, "B", None, None)],
        ..Default::default()
    };
    let result = replace_catalog(&pool, &broken).await;
    assert!(matches!(result, Err(Error::Database(_))));

    let loaded = load_catalog(&pool).await.unwrap();
    assert_eq!(loaded, original);
}

#[tokio::test]
async fn test_filter_path_roundtrip_preserves_order() {
    let pool = init_memory_database().await.unwrap();
    let path = FilterPath::from_entries(vec![
        FilterEntry::new(Category::Type, 1, "Live"),
        FilterEntry::new(Category::Instrument, 10, "Piano"),
        FilterEntry::new(Category::Artist, 1, "Bill Evans"),
    ]);

    save_filter_path(&pool, &path).await.unwrap();
    assert_eq!(load_filter_path(&pool).await.unwrap(), path);

    // Saving again replaces, never appends
    let shorter = FilterPath::from_entries(vec![FilterEntry::new(Category::Duration, 1, "Short")]);
    save_filter_path(&pool, &shorter).await.unwrap();
    assert_eq!(load_filter_path(&pool).await.unwrap(), shorter);

    clear_filter_path(&pool).await.unwrap();
    assert!(load_filter_path(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_filter_path_survives_catalog_replace() {
    let pool = init_memory_database().await.unwrap();
    replace_catalog(&pool, &sample_catalog()).await.unwrap();

    let path = FilterPath::from_entries(vec![FilterEntry::new(Category::Artist, 2, "Miles Davis")]);
    save_filter_path(&pool, &path).await.unwrap();

    replace_catalog(&pool, &CatalogPayload::default()).await.unwrap();

    assert_eq!(load_filter_path(&pool).await.unwrap(), path);
}

#[tokio::test]
async fn test_load_skips_unknown_categories_and_duplicates() {
    let pool = init_memory_database().await.unwrap();
    for (category_id, entity_id, name) in [(3, 1, "Short"), (9, 5, "Bogus"), (3, 2, "Long")] {
        sqlx::query("INSERT INTO filter_path (category_id, entity_id, entity_name) VALUES (?, ?, ?)")
            .bind(category_id)
            .bind(entity_id)
            .bind(name)
            .execute(&pool)
            .await
            .unwrap();
    }

    let path = load_filter_path(&pool).await.unwrap();

    assert_eq!(path.entries(), &[FilterEntry::new(Category::Duration, 2, "Long")]);
}

#[tokio::test]
async fn test_sqlite_store_trait_object() {
    let pool = init_memory_database().await.unwrap();
    let store: Box<dyn FilterPathStore> = Box::new(SqliteFilterPathStore::new(pool));
    let path = FilterPath::from_entries(vec![FilterEntry::new(Category::Type, 1, "Live")]);

    store.save(&path).await.unwrap();
    assert_eq!(store.load().await.unwrap(), path);
    store.clear().await.unwrap();
    assert!(store.load().await.unwrap().is_empty());
}
