//! The planning pipeline behind goal creation.
//!
//! ```text
//! GoalRequest -> Goal -> already seeded? -> generate -> govern -> expand
//!             -> seed -> PlanSummary
//! ```

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use streakplan_db::models::TaskType;

use crate::goal::{Goal, GoalError, GoalRequest};
use crate::plan::{GenerateError, PlanGenerator, PlanSource, TodayTask};
use crate::schedule::{
    DayLedger, RejectedTask, Rejection, RowContext, expand, govern_day, govern_plan,
};
use crate::seed::{SeedError, TaskStore, seed};

#[derive(Debug, Error)]
pub enum PlanningError {
    #[error(transparent)]
    Goal(#[from] GoalError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("goal {goal_id} already has {existing} scheduled tasks")]
    AlreadySeeded { goal_id: Uuid, existing: i64 },

    #[error("plan generated but not saved: {0}")]
    NotSaved(#[source] SeedError),

    #[error("task store unavailable: {0:#}")]
    Store(anyhow::Error),
}

/// What [`PlanningEngine::plan_goal`] produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub goal_id: Uuid,
    pub total_days: u32,
    pub streak_count: usize,
    pub total_today_tasks: usize,
    pub trimmed_day_count: usize,
    pub source: PlanSource,
    pub attempts: u32,
}

/// Ad-hoc tasks for one date of an existing goal.
#[derive(Debug, Clone)]
pub struct AddTasksRequest {
    pub owner_id: Uuid,
    pub goal_id: Uuid,
    pub date: NaiveDate,
    /// Load already taken by the goal's streak habits on `date`.
    pub streak_load: u32,
    /// Last date of the goal. When `None`, the latest stored row of the goal
    /// stands in for it, and a goal with no rows accepts nothing.
    pub deadline: Option<NaiveDate>,
    pub tz_offset_minutes: i32,
    pub candidates: Vec<TodayTask>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTasksOutcome {
    pub accepted: Vec<TodayTask>,
    pub rejected: Vec<RejectedTask>,
    pub seeded: u64,
}

pub struct PlanningEngine {
    generator: PlanGenerator,
    store: Arc<dyn TaskStore>,
}

impl PlanningEngine {
    pub fn new(generator: PlanGenerator, store: Arc<dyn TaskStore>) -> Self {
        Self { generator, store }
    }

    /// Engine for the ad-hoc path only; it never calls a remote generator.
    pub fn with_store(store: Arc<dyn TaskStore>) -> Self {
        Self::new(PlanGenerator::fallback_only(), store)
    }

    /// Plan a new goal and seed its schedule.
    pub async fn plan_goal(
        &self,
        request: &GoalRequest,
        now: DateTime<Utc>,
    ) -> Result<PlanSummary, PlanningError> {
        let goal = Goal::from_request(request, now)?;
        let goal_id = request.goal_id;
        info!(%goal_id, title = %goal.title, days = goal.total_days(), "planning goal");

        let existing = self
            .store
            .count_for_goal(goal_id)
            .await
            .map_err(PlanningError::Store)?;
        if existing > 0 {
            warn!(%goal_id, existing, "goal already seeded");
            return Err(PlanningError::AlreadySeeded { goal_id, existing });
        }

        let generated = self.generator.generate(&goal).await?;
        let (plan, governed) = govern_plan(generated.plan, &goal.window);
        if !governed.demoted.is_empty() {
            info!(%goal_id, demoted = governed.demoted.len(), "weekday streaks demoted");
        }

        let ctx = RowContext {
            owner_id: request.owner_id,
            goal_id,
            tz_offset_minutes: goal.tz_offset_minutes,
        };
        let expansion = expand(&plan, &goal.window, &ctx);

        let report = seed(self.store.as_ref(), request.owner_id, goal_id, &expansion.tasks)
            .await
            .map_err(|e| {
                warn!(%goal_id, error = %e, "seeding failed");
                PlanningError::NotSaved(e)
            })?;
        if let Some(summary) = &report.failure_summary {
            warn!(%goal_id, %summary, "partial seed");
        }

        let summary = PlanSummary {
            goal_id,
            total_days: goal.total_days(),
            streak_count: plan.streaks.len(),
            total_today_tasks: expansion.count_of(TaskType::Today),
            trimmed_day_count: expansion.report.trimmed_days.len(),
            source: generated.source,
            attempts: generated.attempts,
        };
        info!(
            %goal_id,
            source = %summary.source,
            attempts = summary.attempts,
            streaks = summary.streak_count,
            today_tasks = summary.total_today_tasks,
            trimmed_days = summary.trimmed_day_count,
            "goal planned"
        );
        Ok(summary)
    }

    /// Add tasks to one date of an existing goal, keeping the day within budget.
    ///
    /// Dates after the goal's deadline accept nothing.
    pub async fn add_tasks(
        &self,
        request: AddTasksRequest,
    ) -> Result<AddTasksOutcome, PlanningError> {
        let deadline = match request.deadline {
            Some(deadline) => Some(deadline),
            None => stored_deadline(self.store.as_ref(), request.goal_id).await?,
        };
        let refusal = match deadline {
            None => Some(Rejection::Unscheduled),
            Some(deadline) if request.date > deadline => Some(Rejection::PastDeadline { deadline }),
            Some(_) => None,
        };
        if let Some(reason) = refusal {
            warn!(goal_id = %request.goal_id, date = %request.date, %reason, "ad-hoc tasks refused");
            let rejected = request
                .candidates
                .iter()
                .map(|t| RejectedTask::new(request.date, t, reason.clone()))
                .collect();
            return Ok(AddTasksOutcome {
                accepted: Vec::new(),
                rejected,
                seeded: 0,
            });
        }

        let existing = self
            .store
            .tasks_on(request.goal_id, request.date)
            .await
            .map_err(PlanningError::Store)?;
        let ledger = DayLedger::with_existing(
            request.date,
            request.streak_load,
            existing
                .iter()
                .filter(|t| t.task_type == TaskType::Today)
                .map(|t| (t.title.as_str(), u8::try_from(t.load).unwrap_or(u8::MAX))),
        );

        let outcome = govern_day(ledger, request.candidates);
        let ctx = RowContext {
            owner_id: request.owner_id,
            goal_id: request.goal_id,
            tz_offset_minutes: request.tz_offset_minutes,
        };
        let rows: Vec<_> = outcome
            .accepted
            .iter()
            .map(|t| ctx.today_row(t, request.date))
            .collect();

        let seeded = if rows.is_empty() {
            0
        } else {
            seed(self.store.as_ref(), request.owner_id, request.goal_id, &rows)
                .await
                .map_err(PlanningError::NotSaved)?
                .success_count
        };
        info!(
            goal_id = %request.goal_id,
            date = %request.date,
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "ad-hoc tasks governed"
        );

        Ok(AddTasksOutcome {
            accepted: outcome.accepted,
            rejected: outcome.rejected,
            seeded,
        })
    }
}

/// Latest stored date of a goal, preferring streak rows, which cover every
/// date of the window.
async fn stored_deadline(
    store: &dyn TaskStore,
    goal_id: Uuid,
) -> Result<Option<NaiveDate>, PlanningError> {
    let rows = store
        .tasks_for_goal(goal_id)
        .await
        .map_err(PlanningError::Store)?;
    let latest_streak = rows
        .iter()
        .filter(|t| t.task_type == TaskType::Streak)
        .map(|t| t.scheduled_date)
        .max();
    Ok(latest_streak.or_else(|| rows.iter().map(|t| t.scheduled_date).max()))
}
