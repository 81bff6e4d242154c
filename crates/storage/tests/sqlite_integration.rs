use std::collections::BTreeSet;

use peyv_core::model::{ItemKey, LessonId, LessonProgress, LessonStatus};
use storage::repository::ProgressRepository;
use storage::sqlite::SqliteRepository;

fn build_progress(percent: u8, keys: Option<BTreeSet<ItemKey>>) -> LessonProgress {
    LessonProgress::from_persisted(
        LessonId::new("lesson-1"),
        percent,
        LessonStatus::InProgress,
        Some(80),
        4,
        keys,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_round_trips_exact_progress_record() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_exact?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let mut keys = BTreeSet::new();
    keys.insert(ItemKey::from_canonical("sêv"));
    keys.insert(ItemKey::from_canonical("ez têm malê"));
    let progress = build_progress(25, Some(keys.clone()));

    repo.put_progress(&progress).await.unwrap();

    let fetched = repo
        .get_progress(&LessonId::new("lesson-1"))
        .await
        .unwrap()
        .expect("record exists");
    assert_eq!(fetched.percent(), 25);
    assert_eq!(fetched.status(), LessonStatus::InProgress);
    assert_eq!(fetched.score(), Some(80));
    assert_eq!(fetched.time_spent_minutes(), 4);
    assert_eq!(fetched.played_audio_keys(), Some(&keys));
}

#[tokio::test]
async fn sqlite_preserves_legacy_records_without_keys() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_legacy?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let legacy = build_progress(40, None);
    repo.put_progress(&legacy).await.unwrap();

    let fetched = repo
        .get_progress(&LessonId::new("lesson-1"))
        .await
        .unwrap()
        .expect("record exists");
    assert!(fetched.is_legacy());
    assert_eq!(fetched.percent(), 40);
}

#[tokio::test]
async fn sqlite_put_overwrites_per_lesson() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.put_progress(&build_progress(25, Some(BTreeSet::new())))
        .await
        .unwrap();

    let completed = LessonProgress::from_persisted(
        LessonId::new("lesson-1"),
        100,
        LessonStatus::Completed,
        Some(95),
        30,
        Some(BTreeSet::new()),
    )
    .unwrap();
    repo.put_progress(&completed).await.unwrap();

    let fetched = repo
        .get_progress(&LessonId::new("lesson-1"))
        .await
        .unwrap()
        .expect("record exists");
    assert_eq!(fetched.percent(), 100);
    assert_eq!(fetched.status(), LessonStatus::Completed);
}

#[tokio::test]
async fn missing_lesson_reads_as_none() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress_missing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let fetched = repo.get_progress(&LessonId::new("lesson-9")).await.unwrap();
    assert!(fetched.is_none());
}
