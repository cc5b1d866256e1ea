use store::{EnrichmentRow, RecordStore, StoreConfig, StoreError};

async fn store_with(rows: &[(&str, Option<&str>, Option<&str>)]) -> RecordStore {
    let store = RecordStore::open(&StoreConfig::in_memory()).await.unwrap();
    store.init_schema().await.unwrap();
    for (id, external_ref, description) in rows {
        sqlx::query("INSERT INTO sites (id, external_ref, description) VALUES (?, ?, ?)")
            .bind(*id)
            .bind(*external_ref)
            .bind(*description)
            .execute(store.pool())
            .await
            .unwrap();
    }
    store
}

fn row(id: &str) -> EnrichmentRow {
    EnrichmentRow {
        id: id.to_string(),
        description: Some("Klass: Röse\n\nBeskrivning: Röse, 8 m diam.".to_string()),
        item_title: Some("Röse".to_string()),
        item_keywords: Some(r#"["röse","gravar"]"#.to_string()),
        generated_description: "A cairn about eight metres across.".to_string(),
        visibility: 1,
        condition_known: 1,
        class: Some("Röse".to_string()),
        placement: None,
        province: Some("Uppland".to_string()),
        county: None,
        municipality: None,
        parish: Some("Alsike".to_string()),
        qc_signals: r#"{"detail_score":2}"#.to_string(),
    }
}

#[tokio::test]
async fn load_batch_is_ordered_and_limited() {
    let store = store_with(&[
        ("c", None, None),
        ("a", Some("6c9bd1bd-0000-4000-8000-000000000001"), Some("Klass: Röse")),
        ("b", None, Some("")),
    ])
    .await;

    let all = store.load_batch(None).await.unwrap();
    let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(all[0].text(), Some("Klass: Röse"));
    assert_eq!(all[1].text(), None);
    assert_eq!(
        all[0].external_ref.as_deref(),
        Some("6c9bd1bd-0000-4000-8000-000000000001")
    );

    let two = store.load_batch(Some(2)).await.unwrap();
    assert_eq!(two.len(), 2);
    assert_eq!(two[1].id, "b");
}

#[tokio::test]
async fn save_writes_every_output_column() {
    let store = store_with(&[("a", None, None)]).await;
    let expected = row("a");

    store.save(&expected).await.unwrap();

    assert_eq!(store.load_result("a").await.unwrap(), Some(expected));
}

#[tokio::test]
async fn save_keeps_resolved_text_when_not_recomputed() {
    let store = store_with(&[("a", None, None)]).await;
    store.save(&row("a")).await.unwrap();

    let second = EnrichmentRow {
        description: None,
        item_title: None,
        item_keywords: None,
        generated_description: "missing".to_string(),
        visibility: 0,
        condition_known: 0,
        ..row("a")
    };
    store.save(&second).await.unwrap();

    let stored = store.load_result("a").await.unwrap().unwrap();
    assert_eq!(stored.description, row("a").description);
    assert_eq!(stored.item_title.as_deref(), Some("Röse"));
    assert_eq!(stored.generated_description, "missing");
    assert_eq!(stored.visibility, 0);
}

#[tokio::test]
async fn saving_an_unknown_id_is_an_error() {
    let store = store_with(&[("a", None, None)]).await;

    let err = store.save(&row("zzz")).await.unwrap_err();
    assert!(matches!(err, StoreError::RecordMissing(id) if id == "zzz"));
    assert_eq!(store.load_result("a").await.unwrap(), None);
}

#[tokio::test]
async fn coverage_reports_populated_columns() {
    let store = store_with(&[
        ("a", None, Some("kort")),
        ("b", None, Some("en längre beskrivning")),
        ("c", None, None),
    ])
    .await;
    store.save(&row("c")).await.unwrap();

    let report = store.coverage().await.unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.populated("description"), Some(3));
    assert_eq!(report.populated("generated_description"), Some(1));
    assert_eq!(report.populated("county"), Some(0));
    assert_eq!(report.populated("unknown"), None);

    let lengths = report.description_lengths.unwrap();
    assert_eq!(lengths.min, 4);
    assert!(lengths.max > lengths.min);
    assert_eq!(report.longest.len(), 3);
    assert_eq!(report.longest[0].id, "c");
    assert_eq!(report.longest[0].item_title.as_deref(), Some("Röse"));
}

#[tokio::test]
async fn empty_store_has_no_length_stats() {
    let store = store_with(&[]).await;
    let report = store.coverage().await.unwrap();
    assert_eq!(report.total, 0);
    assert!(report.description_lengths.is_none());
    assert!(report.longest.is_empty());
}

#[tokio::test]
async fn file_store_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::with_path(dir.path().join("sites.sqlite"));

    {
        let store = RecordStore::open(&config).await.unwrap();
        store.init_schema().await.unwrap();
        sqlx::query("INSERT INTO sites (id) VALUES ('a')")
            .execute(store.pool())
            .await
            .unwrap();
        store.save(&row("a")).await.unwrap();
        store.close().await;
    }

    let reopened = RecordStore::open(&config).await.unwrap();
    reopened.init_schema().await.unwrap();
    assert_eq!(reopened.load_result("a").await.unwrap(), Some(row("a")));
}

#[tokio::test]
async fn missing_directory_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::with_path(dir.path().join("absent").join("sites.sqlite"));

    let err = RecordStore::open(&config).await.unwrap_err();
    assert!(matches!(err, StoreError::Open { .. }));
}
