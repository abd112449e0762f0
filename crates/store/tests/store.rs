//! Integration tests for the JSON state store.

use tessera_core::{IconStatus, ItemKind};
use tessera_store::{ProcessPatch, StateStore, WebsitePatch};

#[tokio::test]
async fn open_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("local");

    let store = StateStore::open(&data_dir).await.unwrap();

    assert!(data_dir.is_dir());
    assert!(store.icons_dir().is_dir());
    assert!(store.last_scan().await.is_none());
}

#[tokio::test]
async fn upsert_creates_then_patches() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::open(dir.path()).await.unwrap();

    let created = store
        .upsert_process(
            "demo-app",
            ProcessPatch {
                port: Some(8080),
                is_html: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.port, Some(8080));
    assert!(created.is_html);
    assert_eq!(created.icon_status, IconStatus::Pending);
    assert!(created.last_seen.is_some());

    // A later patch leaves unrelated fields alone.
    let patched = store
        .upsert_process(
            "demo-app",
            ProcessPatch {
                description: Some("a todo list app".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.port, Some(8080));
    assert_eq!(patched.description.as_deref(), Some("a todo list app"));
}

#[tokio::test]
async fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = StateStore::open(dir.path()).await.unwrap();
        store
            .upsert_process(
                "demo-app",
                ProcessPatch {
                    port: Some(3000),
                    is_html: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store.add_website("docs", "https://docs.rs").await.unwrap();
        store.set_last_scan().await.unwrap();
    }

    let reopened = StateStore::open(dir.path()).await.unwrap();
    let process = reopened.get_process("demo-app").await.unwrap();
    assert_eq!(process.port, Some(3000));
    let website = reopened.get_website("docs").await.unwrap();
    assert_eq!(website.url, "https://docs.rs");
    assert!(reopened.last_scan().await.is_some());
}

#[tokio::test]
async fn visible_items_filter_and_sort() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::open(dir.path()).await.unwrap();

    // HTML + visible: shown.
    store
        .upsert_process(
            "Zulu",
            ProcessPatch {
                is_html: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // Not HTML: hidden.
    store
        .upsert_process(
            "api-only",
            ProcessPatch {
                is_html: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // HTML but later marked invisible: hidden.
    store
        .upsert_process(
            "gone",
            ProcessPatch {
                is_html: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    store.mark_invisible("gone").await.unwrap();

    store.add_website("alpha", "https://example.com").await.unwrap();

    let items = store.all_visible_items().await;
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    // Case-insensitive sort puts "alpha" before "Zulu".
    assert_eq!(names, vec!["alpha", "Zulu"]);
    assert_eq!(items[0].kind, ItemKind::Website);
    assert_eq!(items[1].kind, ItemKind::Process);
}

#[tokio::test]
async fn website_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::open(dir.path()).await.unwrap();

    store.add_website("docs", "https://docs.rs").await.unwrap();

    let updated = store
        .update_website(
            "docs",
            WebsitePatch {
                icon_status: Some(IconStatus::Ready),
                description: Some("Rust documentation host".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated);

    let record = store.get_website("docs").await.unwrap();
    assert_eq!(record.icon_status, IconStatus::Ready);

    assert!(store.remove_website("docs").await.unwrap());
    assert!(!store.remove_website("docs").await.unwrap());
    assert!(store.get_website("docs").await.is_none());

    // Updating a missing website is a no-op, not an error.
    let touched = store
        .update_website("docs", WebsitePatch::default())
        .await
        .unwrap();
    assert!(!touched);
}

#[tokio::test]
async fn resolve_item_prefers_process() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::open(dir.path()).await.unwrap();

    store
        .upsert_process(
            "shared-name",
            ProcessPatch {
                port: Some(9000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    store
        .add_website("shared-name", "https://example.com")
        .await
        .unwrap();

    let item = store.resolve_item("shared-name").await.unwrap();
    assert_eq!(item.kind, ItemKind::Process);
    assert_eq!(item.port, Some(9000));

    assert!(store.resolve_item("unknown").await.is_none());
}

#[tokio::test]
async fn mark_dead_sets_flag() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::open(dir.path()).await.unwrap();

    store
        .upsert_process("demo-app", ProcessPatch::default())
        .await
        .unwrap();
    store.mark_dead("demo-app").await.unwrap();

    assert!(store.get_process("demo-app").await.unwrap().is_dead);
    // Unknown names are ignored.
    store.mark_dead("nope").await.unwrap();
}
