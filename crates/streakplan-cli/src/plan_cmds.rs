//! CLI handler for `streakplan plan`.
//!
//! Without `--dry-run` the schedule is seeded into PostgreSQL. With it, the
//! same pipeline runs against an in-memory store and the rows are printed.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

use streakplan_core::seed::{MemoryTaskStore, PgTaskStore, TaskStore};
use streakplan_core::{GoalRequest, PlanSummary, PlanningEngine};
use streakplan_db::pool;

use crate::config::StreakplanConfig;
use crate::tasks_cmds::print_rows;
use crate::{PlanArgs, build_generator};

/// Run the planning pipeline for the goal described by `args`.
pub async fn run_plan(args: PlanArgs, resolved: &StreakplanConfig) -> Result<()> {
    let request = GoalRequest {
        owner_id: args.owner.unwrap_or_else(Uuid::new_v4),
        goal_id: args.goal.unwrap_or_else(Uuid::new_v4),
        title: args.title,
        description: args.description,
        category: args.category,
        deadline: args.deadline,
        experience: args.experience,
        tz_offset_minutes: args.tz_offset,
    };
    let generator = build_generator(resolved)?;

    if args.dry_run {
        let store = Arc::new(MemoryTaskStore::new());
        let engine = PlanningEngine::new(generator, store.clone());
        let summary = engine.plan_goal(&request, Utc::now()).await?;
        let rows = store.tasks_for_goal(request.goal_id).await?;

        if args.json {
            let out = serde_json::json!({ "summary": summary, "tasks": rows });
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            print_summary(&summary, &request);
            println!();
            print_rows(&rows);
        }
        return Ok(());
    }

    let db_pool = pool::create_pool(&resolved.db_config)
        .await
        .with_context(|| format!("failed to connect to {}", resolved.db_config.redacted_url()))?;
    let engine = PlanningEngine::new(generator, Arc::new(PgTaskStore::new(db_pool.clone())));
    let result = engine.plan_goal(&request, Utc::now()).await;
    db_pool.close().await;
    let summary = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, &request);
        println!();
        println!(
            "Next: run `streakplan tasks list --goal {}` to see the schedule.",
            summary.goal_id
        );
    }
    Ok(())
}

fn print_summary(summary: &PlanSummary, request: &GoalRequest) {
    println!("Goal planned.");
    println!();
    println!("  Goal ID:       {}", summary.goal_id);
    println!("  Owner ID:      {}", request.owner_id);
    println!("  Title:         {}", request.title);
    println!("  Deadline:      {}", request.deadline);
    println!("  Days:          {}", summary.total_days);
    println!("  Streaks:       {}", summary.streak_count);
    println!("  Today tasks:   {}", summary.total_today_tasks);
    println!("  Trimmed days:  {}", summary.trimmed_day_count);
    println!(
        "  Source:        {} ({} remote attempt{})",
        summary.source,
        summary.attempts,
        if summary.attempts == 1 { "" } else { "s" }
    );
}
