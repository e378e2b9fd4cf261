//! CLI handlers for `streakplan tasks` subcommands.
//!
//! - `streakplan tasks add`  -- govern one ad-hoc task onto a date
//! - `streakplan tasks list` -- print a goal's scheduled rows

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use uuid::Uuid;

use streakplan_core::plan::{ProofMode, TaskKind, TodayTask};
use streakplan_core::seed::{PgTaskStore, TaskStore};
use streakplan_core::{AddTasksRequest, PlanningEngine};
use streakplan_db::models::{GoalTask, TaskType};
use streakplan_db::pool;

use crate::TasksCommands;
use crate::config::StreakplanConfig;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `TasksCommands` variant to the appropriate handler.
pub async fn run_tasks(command: TasksCommands, resolved: &StreakplanConfig) -> Result<()> {
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    let store = Arc::new(PgTaskStore::new(db_pool.clone()));

    let result = match command {
        TasksCommands::Add {
            goal,
            owner,
            date,
            title,
            description,
            load,
            streak_load,
            deadline,
            tz_offset,
        } => {
            let candidate = TodayTask {
                title,
                description,
                load,
                proof_mode: ProofMode::Flexible,
                kind: TaskKind::Regular,
            };
            cmd_add(
                store,
                AddTarget {
                    goal,
                    owner,
                    date,
                    streak_load,
                    deadline,
                    tz_offset,
                },
                candidate,
            )
            .await
        }
        TasksCommands::List { goal, date } => cmd_list(store.as_ref(), goal, date).await,
    };

    db_pool.close().await;
    result
}

// -----------------------------------------------------------------------
// tasks add
// -----------------------------------------------------------------------

struct AddTarget {
    goal: Uuid,
    owner: Uuid,
    date: NaiveDate,
    streak_load: Option<u32>,
    deadline: Option<NaiveDate>,
    tz_offset: i32,
}

async fn cmd_add(store: Arc<PgTaskStore>, target: AddTarget, candidate: TodayTask) -> Result<()> {
    let streak_load = match target.streak_load {
        Some(load) => load,
        None => streak_load_on(store.as_ref(), target.goal, target.date).await?,
    };

    let engine = PlanningEngine::with_store(store);
    let outcome = engine
        .add_tasks(AddTasksRequest {
            owner_id: target.owner,
            goal_id: target.goal,
            date: target.date,
            streak_load,
            deadline: target.deadline,
            tz_offset_minutes: target.tz_offset,
            candidates: vec![candidate],
        })
        .await?;

    for task in &outcome.accepted {
        println!(
            "Added \"{}\" on {} (load {}, proof {}).",
            task.title, target.date, task.load, task.proof_mode
        );
    }
    for rejected in &outcome.rejected {
        println!(
            "Rejected \"{}\" on {}: {}",
            rejected.title, rejected.date, rejected.reason
        );
    }
    if outcome.accepted.is_empty() {
        anyhow::bail!("no task was added");
    }
    Ok(())
}

/// Sum of stored streak loads on `date`.
async fn streak_load_on(store: &dyn TaskStore, goal_id: Uuid, date: NaiveDate) -> Result<u32> {
    let rows = store.tasks_on(goal_id, date).await?;
    Ok(rows
        .iter()
        .filter(|t| t.task_type == TaskType::Streak)
        .map(|t| u32::try_from(t.load).unwrap_or(0))
        .sum())
}

// -----------------------------------------------------------------------
// tasks list
// -----------------------------------------------------------------------

async fn cmd_list(store: &dyn TaskStore, goal_id: Uuid, date: Option<NaiveDate>) -> Result<()> {
    let rows = match date {
        Some(date) => store.tasks_on(goal_id, date).await?,
        None => store.tasks_for_goal(goal_id).await?,
    };
    if rows.is_empty() {
        println!("No tasks found for goal {goal_id}.");
        return Ok(());
    }
    print_rows(&rows);
    Ok(())
}

/// Print rows grouped by date, streaks first within each date.
pub fn print_rows(rows: &[GoalTask]) {
    let mut sorted: Vec<&GoalTask> = rows.iter().collect();
    sorted.sort_by_key(|t| (t.scheduled_date, t.task_type != TaskType::Streak, t.scheduled_at));

    println!(
        "{:<12} {:<7} {:<4} {:<4} {:<9} TITLE",
        "DATE", "TYPE", "LOAD", "XP", "PROOF"
    );
    println!("{}", "-".repeat(72));
    let mut last_date = None;
    for t in sorted {
        let date = if last_date == Some(t.scheduled_date) {
            String::new()
        } else {
            t.scheduled_date.to_string()
        };
        last_date = Some(t.scheduled_date);
        println!(
            "{:<12} {:<7} {:<4} {:<4} {:<9} {}",
            date,
            t.task_type.to_string(),
            t.load,
            t.xp,
            t.proof_mode.to_string(),
            t.title
        );
    }
}
