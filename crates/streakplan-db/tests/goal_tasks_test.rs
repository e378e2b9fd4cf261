//! Integration tests for the `goal_tasks` queries.
//!
//! These need a Postgres server: either `STREAKPLAN_TEST_PG_URL` or a local
//! container runtime for testcontainers. Run with `cargo test -- --ignored`.

use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use streakplan_db::models::{NewGoalTask, Priority, ProofMode, TaskType};
use streakplan_db::queries::tasks;
use streakplan_test_utils::TestDb;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn streak_row(owner: Uuid, goal: Uuid, date: NaiveDate, title: &str) -> NewGoalTask {
    NewGoalTask {
        owner_id: owner,
        goal_id: goal,
        title: title.to_string(),
        normalized_title: title.to_lowercase(),
        description: String::new(),
        task_type: TaskType::Streak,
        scheduled_date: date,
        scheduled_at: None,
        load: 1,
        proof_mode: ProofMode::Flexible,
        xp: 10,
        priority: Priority::Low,
        completed: false,
    }
}

fn today_row(owner: Uuid, goal: Uuid, date: NaiveDate, title: &str, load: i16) -> NewGoalTask {
    NewGoalTask {
        task_type: TaskType::Today,
        scheduled_at: Some(Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap())),
        load,
        xp: i32::from(load) * 10,
        priority: Priority::for_load(load as u8),
        proof_mode: ProofMode::Realtime,
        ..streak_row(owner, goal, date, title)
    }
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn batch_insert_writes_every_row() {
    let db = TestDb::create().await;
    let (owner, goal) = (Uuid::new_v4(), Uuid::new_v4());

    let rows = vec![
        streak_row(owner, goal, day(1), "Stretch"),
        today_row(owner, goal, day(1), "Set up", 1),
        streak_row(owner, goal, day(2), "Stretch"),
        today_row(owner, goal, day(2), "Tempo run", 3),
    ];

    let inserted = tasks::insert_tasks_batch(&db.pool, &rows).await.unwrap();
    assert_eq!(inserted, 4);
    assert_eq!(tasks::count_tasks_for_goal(&db.pool, goal).await.unwrap(), 4);

    let listed = tasks::list_tasks_for_goal(&db.pool, goal).await.unwrap();
    assert_eq!(listed.len(), 4);
    assert_eq!(listed[0].scheduled_date, day(1));
    assert_eq!(listed[0].task_type, TaskType::Streak);
    assert!(listed.iter().all(|t| !t.completed));

    let on_day_two = tasks::list_tasks_for_goal_on(&db.pool, goal, day(2)).await.unwrap();
    assert_eq!(on_day_two.len(), 2);
    let tempo = on_day_two.iter().find(|t| t.title == "Tempo run").unwrap();
    assert_eq!(tempo.priority, Priority::High);
    assert_eq!(tempo.xp, 30);
    assert!(tempo.scheduled_at.is_some());

    db.drop_db().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn duplicate_slot_rejects_whole_batch() {
    let db = TestDb::create().await;
    let (owner, goal) = (Uuid::new_v4(), Uuid::new_v4());

    let first = vec![streak_row(owner, goal, day(1), "Stretch")];
    tasks::insert_tasks_batch(&db.pool, &first).await.unwrap();

    // Second batch has one fresh row and one colliding row.
    let second = vec![
        streak_row(owner, goal, day(2), "Stretch"),
        streak_row(owner, goal, day(1), "Stretch"),
    ];
    let err = tasks::insert_tasks_batch(&db.pool, &second).await.unwrap_err();
    assert!(format!("{err:#}").contains("failed to insert task batch"));

    // Nothing from the second batch was committed.
    assert_eq!(tasks::count_tasks_for_goal(&db.pool, goal).await.unwrap(), 1);

    db.drop_db().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn empty_batch_is_a_no_op() {
    let db = TestDb::create().await;
    let inserted = tasks::insert_tasks_batch(&db.pool, &[]).await.unwrap();
    assert_eq!(inserted, 0);
    db.drop_db().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn batch_larger_than_one_statement_is_split() {
    let db = TestDb::create().await;
    let (owner, goal) = (Uuid::new_v4(), Uuid::new_v4());

    let total = tasks::ROWS_PER_STATEMENT + 10;
    let rows: Vec<_> = (0..total)
        .map(|i| streak_row(owner, goal, day(1), &format!("Habit {i}")))
        .collect();

    let inserted = tasks::insert_tasks_batch(&db.pool, &rows).await.unwrap();
    assert_eq!(inserted, total as u64);
    assert_eq!(
        tasks::count_tasks_for_goal(&db.pool, goal).await.unwrap(),
        total as i64
    );

    db.drop_db().await;
}
