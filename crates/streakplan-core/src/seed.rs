//! Seeding expanded schedules into storage.
//!
//! [`seed`] checks ownership and hands the whole batch to a [`TaskStore`]
//! in one call. Stores insert atomically: either every row lands or none do.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use streakplan_db::models::{GoalTask, NewGoalTask, TaskType};
use streakplan_db::queries::tasks as task_queries;

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Persistence seam for schedule rows.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert every row atomically, returning the number inserted.
    async fn insert_batch(&self, tasks: &[NewGoalTask]) -> Result<u64>;

    async fn count_for_goal(&self, goal_id: Uuid) -> Result<i64>;

    async fn tasks_for_goal(&self, goal_id: Uuid) -> Result<Vec<GoalTask>>;

    async fn tasks_on(&self, goal_id: Uuid, date: NaiveDate) -> Result<Vec<GoalTask>>;
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert_batch(&self, tasks: &[NewGoalTask]) -> Result<u64> {
        task_queries::insert_tasks_batch(&self.pool, tasks).await
    }

    async fn count_for_goal(&self, goal_id: Uuid) -> Result<i64> {
        task_queries::count_tasks_for_goal(&self.pool, goal_id).await
    }

    async fn tasks_for_goal(&self, goal_id: Uuid) -> Result<Vec<GoalTask>> {
        task_queries::list_tasks_for_goal(&self.pool, goal_id).await
    }

    async fn tasks_on(&self, goal_id: Uuid, date: NaiveDate) -> Result<Vec<GoalTask>> {
        task_queries::list_tasks_for_goal_on(&self.pool, goal_id, date).await
    }
}

/// In-process store for dry runs and tests.
///
/// Enforces the same unique slot as the database index:
/// (goal, date, type, normalized title).
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    rows: Mutex<Vec<GoalTask>>,
    reject_inserts: bool,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose inserts always fail, for exercising error paths.
    pub fn rejecting() -> Self {
        Self {
            reject_inserts: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<GoalTask>> {
        // A panic while holding the lock leaves plain data behind; keep using it.
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

type Slot = (Uuid, NaiveDate, TaskType, String);

fn slot_of(goal_id: Uuid, date: NaiveDate, task_type: TaskType, normalized: &str) -> Slot {
    (goal_id, date, task_type, normalized.to_string())
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert_batch(&self, tasks: &[NewGoalTask]) -> Result<u64> {
        if self.reject_inserts {
            bail!("store is rejecting inserts");
        }

        let mut rows = self.lock();
        let mut slots: HashSet<Slot> = rows
            .iter()
            .map(|r| slot_of(r.goal_id, r.scheduled_date, r.task_type, &r.normalized_title))
            .collect();
        for (index, t) in tasks.iter().enumerate() {
            let slot = slot_of(t.goal_id, t.scheduled_date, t.task_type, &t.normalized_title);
            if !slots.insert(slot) {
                bail!(
                    "duplicate slot at row {index}: {} {} {:?}",
                    t.scheduled_date,
                    t.task_type,
                    t.title
                );
            }
        }

        let now = Utc::now();
        rows.extend(tasks.iter().map(|t| GoalTask {
            id: Uuid::new_v4(),
            owner_id: t.owner_id,
            goal_id: t.goal_id,
            title: t.title.clone(),
            normalized_title: t.normalized_title.clone(),
            description: t.description.clone(),
            task_type: t.task_type,
            scheduled_date: t.scheduled_date,
            scheduled_at: t.scheduled_at,
            load: t.load,
            proof_mode: t.proof_mode,
            xp: t.xp,
            priority: t.priority,
            completed: t.completed,
            created_at: now,
        }));
        Ok(tasks.len() as u64)
    }

    async fn count_for_goal(&self, goal_id: Uuid) -> Result<i64> {
        Ok(self.lock().iter().filter(|r| r.goal_id == goal_id).count() as i64)
    }

    async fn tasks_for_goal(&self, goal_id: Uuid) -> Result<Vec<GoalTask>> {
        let mut tasks: Vec<GoalTask> = self
            .lock()
            .iter()
            .filter(|r| r.goal_id == goal_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| {
            (a.scheduled_date, a.task_type.to_string(), &a.title).cmp(&(
                b.scheduled_date,
                b.task_type.to_string(),
                &b.title,
            ))
        });
        Ok(tasks)
    }

    async fn tasks_on(&self, goal_id: Uuid, date: NaiveDate) -> Result<Vec<GoalTask>> {
        Ok(self
            .tasks_for_goal(goal_id)
            .await?
            .into_iter()
            .filter(|r| r.scheduled_date == date)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub success_count: u64,
    /// Set when the store accepted fewer rows than were offered.
    pub failure_summary: Option<String>,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("task {index} ({title:?}) does not belong to goal {goal_id} of owner {owner_id}")]
    ForeignTask {
        index: usize,
        title: String,
        owner_id: Uuid,
        goal_id: Uuid,
    },

    #[error("store rejected the batch: {0:#}")]
    Store(anyhow::Error),
}

/// Insert `tasks` for one goal in a single atomic batch.
///
/// Does not check whether the goal already has rows; callers that need
/// idempotency check first.
pub async fn seed(
    store: &dyn TaskStore,
    owner_id: Uuid,
    goal_id: Uuid,
    tasks: &[NewGoalTask],
) -> Result<SeedReport, SeedError> {
    if let Some((index, t)) = tasks
        .iter()
        .enumerate()
        .find(|(_, t)| t.owner_id != owner_id || t.goal_id != goal_id)
    {
        return Err(SeedError::ForeignTask {
            index,
            title: t.title.clone(),
            owner_id,
            goal_id,
        });
    }

    let inserted = store.insert_batch(tasks).await.map_err(SeedError::Store)?;
    let offered = tasks.len() as u64;
    info!(%goal_id, inserted, offered, "seeded schedule");

    let failure_summary = (inserted < offered)
        .then(|| format!("{} of {offered} rows were not inserted", offered - inserted));
    Ok(SeedReport {
        success_count: inserted,
        failure_summary,
    })
}
