use mathquiz_core::model::{Difficulty, PlayerName, ScoreId, ScoreRecord, Subject};
use mathquiz_core::time::fixed_now;
use storage::repository::{ScoreRepository, Storage, StorageError};
use storage::sqlite::SqliteRepository;

fn record(name: &str, score: u32, difficulty: Difficulty, subjects: &[Subject]) -> ScoreRecord {
    ScoreRecord::new(
        PlayerName::parse(name).unwrap(),
        score,
        difficulty,
        subjects.iter().copied(),
        fixed_now(),
    )
}

#[tokio::test]
async fn sqlite_roundtrip_keeps_every_field() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let saved = record(
        "Ada Lovelace",
        420,
        Difficulty::Hard,
        &[Subject::Algebra, Subject::Calculus],
    );
    let id = repo.append_score(&saved).await.unwrap();

    let fetched = repo.get_score(id).await.expect("fetch");
    assert_eq!(fetched, saved);
    assert_eq!(fetched.subjects_label(), "algebra, calculus");
}

#[tokio::test]
async fn sqlite_lists_highest_first_with_stable_ties() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_ordering?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    for (name, score) in [("a", 500), ("b", 300), ("c", 700), ("d", 500)] {
        repo.append_score(&record(name, score, Difficulty::Easy, &[Subject::Equations]))
            .await
            .unwrap();
    }

    let rows = repo.list_scores().await.unwrap();
    let listed: Vec<(&str, u32)> = rows
        .iter()
        .map(|row| (row.record.player_name().as_str(), row.record.score()))
        .collect();
    assert_eq!(listed, [("c", 700), ("a", 500), ("d", 500), ("b", 300)]);
}

#[tokio::test]
async fn sqlite_migrate_is_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.append_score(&record("keep", 100, Difficulty::Easy, &[Subject::Algebra]))
        .await
        .unwrap();
    repo.migrate().await.expect("second migrate");

    assert_eq!(repo.list_scores().await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_missing_score_is_not_found() {
    let storage = Storage::sqlite("sqlite:file:memdb_missing?mode=memory&cache=shared")
        .await
        .expect("storage");
    assert!(matches!(
        storage.scores.get_score(ScoreId::new(42)).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_rejects_rows_with_unknown_difficulty() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_bad_row?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    // The CHECK constraint guards the column even when the API is bypassed.
    let res = sqlx::query(
        "INSERT INTO scores (name, score, difficulty, subjects, created_at) VALUES ('x', 1, 'medium', 'algebra', '2023-11-14T22:13:20Z')",
    )
    .execute(repo.pool())
    .await;
    assert!(res.is_err());
}
