//! Database query functions for the `goal_tasks` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::models::{GoalTask, NewGoalTask};

/// Columns bound per row by [`insert_tasks_batch`].
const COLUMNS_PER_ROW: usize = 13;

/// Postgres accepts at most this many bind parameters per statement.
const BIND_LIMIT: usize = 65_535;

/// Rows per INSERT statement, kept under the bind limit.
pub const ROWS_PER_STATEMENT: usize = BIND_LIMIT / COLUMNS_PER_ROW;

/// Insert every row in `tasks` inside one transaction.
///
/// Large batches are split into several multi-row INSERT statements, but all
/// of them share the transaction: if any statement fails, nothing is written.
/// Returns the number of rows the database reports as inserted.
pub async fn insert_tasks_batch(pool: &PgPool, tasks: &[NewGoalTask]) -> Result<u64> {
    if tasks.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await.context("failed to begin transaction")?;
    let mut inserted = 0u64;

    for (index, chunk) in tasks.chunks(ROWS_PER_STATEMENT).enumerate() {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO goal_tasks (owner_id, goal_id, title, normalized_title, description, \
             task_type, scheduled_date, scheduled_at, load, proof_mode, xp, priority, completed) ",
        );
        builder.push_values(chunk, |mut row, task| {
            row.push_bind(task.owner_id)
                .push_bind(task.goal_id)
                .push_bind(&task.title)
                .push_bind(&task.normalized_title)
                .push_bind(&task.description)
                .push_bind(task.task_type)
                .push_bind(task.scheduled_date)
                .push_bind(task.scheduled_at)
                .push_bind(task.load)
                .push_bind(task.proof_mode)
                .push_bind(task.xp)
                .push_bind(task.priority)
                .push_bind(task.completed);
        });

        let result = builder
            .build()
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert task batch chunk {index}"))?;
        debug!(chunk = index, rows = result.rows_affected(), "inserted task chunk");
        inserted += result.rows_affected();
    }

    tx.commit().await.context("failed to commit task batch")?;
    Ok(inserted)
}

/// All rows for a goal, ordered by date, then type (streaks first), then title.
pub async fn list_tasks_for_goal(pool: &PgPool, goal_id: Uuid) -> Result<Vec<GoalTask>> {
    let tasks = sqlx::query_as::<_, GoalTask>(
        "SELECT * FROM goal_tasks WHERE goal_id = $1 \
         ORDER BY scheduled_date ASC, task_type ASC, title ASC",
    )
    .bind(goal_id)
    .fetch_all(pool)
    .await
    .context("failed to list tasks for goal")?;

    Ok(tasks)
}

/// Rows for a goal on a single date.
pub async fn list_tasks_for_goal_on(
    pool: &PgPool,
    goal_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<GoalTask>> {
    let tasks = sqlx::query_as::<_, GoalTask>(
        "SELECT * FROM goal_tasks WHERE goal_id = $1 AND scheduled_date = $2 \
         ORDER BY task_type ASC, created_at ASC",
    )
    .bind(goal_id)
    .bind(date)
    .fetch_all(pool)
    .await
    .context("failed to list tasks for goal and date")?;

    Ok(tasks)
}

/// Number of rows already seeded for a goal.
pub async fn count_tasks_for_goal(pool: &PgPool, goal_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM goal_tasks WHERE goal_id = $1")
        .bind(goal_id)
        .fetch_one(pool)
        .await
        .context("failed to count tasks for goal")?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_size_stays_under_bind_limit() {
        assert!(ROWS_PER_STATEMENT * COLUMNS_PER_ROW <= BIND_LIMIT);
        assert!(ROWS_PER_STATEMENT > 1000);
    }
}
