use super::*;

fn temp_root(label: &str) -> PathBuf {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir().join(format!("backdrop_quiz_{label}_{suffix}"))
}

#[tokio::test]
async fn stores_reads_and_removes_credential() {
    let store = SqliteCredentialStore::new("sqlite::memory:")
        .await
        .expect("db");

    assert_eq!(store.get(TMDB_API_KEY_SLOT).await.expect("get"), None);

    store.set(TMDB_API_KEY_SLOT, "abc123").await.expect("set");
    assert_eq!(
        store.get(TMDB_API_KEY_SLOT).await.expect("get").as_deref(),
        Some("abc123")
    );

    store.remove(TMDB_API_KEY_SLOT).await.expect("remove");
    assert_eq!(store.get(TMDB_API_KEY_SLOT).await.expect("get"), None);
}

#[tokio::test]
async fn set_overwrites_existing_slot() {
    let store = SqliteCredentialStore::new("sqlite::memory:")
        .await
        .expect("db");
    store.set(TMDB_API_KEY_SLOT, "old").await.expect("set");
    store.set(TMDB_API_KEY_SLOT, "new").await.expect("set");
    assert_eq!(
        store.get(TMDB_API_KEY_SLOT).await.expect("get").as_deref(),
        Some("new")
    );
}

#[tokio::test]
async fn removing_missing_slot_is_not_an_error() {
    let store = SqliteCredentialStore::new("sqlite::memory:")
        .await
        .expect("db");
    store.remove("never-set").await.expect("remove");
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let store = SqliteCredentialStore::new("sqlite::memory:")
        .await
        .expect("db");
    store.health_check().await.expect("health check");
}

#[tokio::test]
async fn credential_survives_reopening_database_file() {
    let root = temp_root("reopen");
    let db_path = root.join("nested").join("credentials.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let store = SqliteCredentialStore::new(&database_url).await.expect("db");
        store.set(TMDB_API_KEY_SLOT, "persisted").await.expect("set");
        store.pool().close().await;
    }

    assert!(db_path.exists(), "database file should exist: {}", db_path.display());

    let reopened = SqliteCredentialStore::new(&database_url).await.expect("db");
    assert_eq!(
        reopened.get(TMDB_API_KEY_SLOT).await.expect("get").as_deref(),
        Some("persisted")
    );
    reopened.pool().close().await;

    std::fs::remove_dir_all(root).expect("cleanup");
}

#[tokio::test]
async fn memory_store_round_trips_values() {
    let store = MemoryCredentialStore::with_value(TMDB_API_KEY_SLOT, "seeded");
    assert_eq!(
        store.get(TMDB_API_KEY_SLOT).await.expect("get").as_deref(),
        Some("seeded")
    );
    store.remove(TMDB_API_KEY_SLOT).await.expect("remove");
    assert_eq!(store.get(TMDB_API_KEY_SLOT).await.expect("get"), None);
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite:./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(normalize_database_url("  "), DEFAULT_DATABASE_URL);
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
}

#[test]
fn prepare_creates_parent_dir() {
    let root = temp_root("prepare");
    let db_path = root.join("data").join("credentials.db");

    prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare db url");
    assert!(root.join("data").exists());

    std::fs::remove_dir_all(root).expect("cleanup");
}
