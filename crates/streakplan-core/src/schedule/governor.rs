//! Per-day admission, deduplication, proof forcing and streak demotion.
//!
//! [`DayLedger`] is the single admission rule: the expander and the
//! deterministic fallback feed it tasks in order, [`govern_day`] feeds it
//! tasks in value order.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use super::title::{mentioned_weekday, normalize_title, normalized_duplicate, requires_realtime_proof};
use crate::goal::PlanWindow;
use crate::plan::types::{
    DAILY_LOAD_BUDGET, MAX_TODAY_TASKS_PER_DAY, Plan, ProofMode, StreakHabit, TaskKind, TodayTask,
};

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

/// Why a task was not scheduled on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    DuplicateOf { title: String },
    OverCount { limit: usize },
    OverBudget { load: u8, remaining: u32 },
    PastDeadline { deadline: NaiveDate },
    /// The goal has no stored schedule to add to.
    Unscheduled,
}

impl Rejection {
    /// Duplicates are dropped; every other rejection may fit on a later date.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateOf { .. })
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateOf { title } => write!(f, "duplicate of {title:?}"),
            Self::OverCount { limit } => write!(f, "day already has {limit} tasks"),
            Self::OverBudget { load, remaining } => {
                write!(f, "load {load} exceeds remaining budget {remaining}")
            }
            Self::PastDeadline { deadline } => write!(f, "falls after deadline {deadline}"),
            Self::Unscheduled => f.write_str("goal has no scheduled tasks"),
        }
    }
}

/// A task that did not make it onto a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedTask {
    pub date: NaiveDate,
    pub title: String,
    pub load: u8,
    pub reason: Rejection,
}

impl RejectedTask {
    pub fn new(date: NaiveDate, task: &TodayTask, reason: Rejection) -> Self {
        Self {
            date,
            title: task.title.clone(),
            load: task.load,
            reason,
        }
    }
}

// ---------------------------------------------------------------------------
// Day ledger
// ---------------------------------------------------------------------------

/// Running totals for one date.
#[derive(Debug, Clone)]
pub struct DayLedger {
    date: NaiveDate,
    remaining_load: u32,
    /// Normalized title paired with the title as accepted.
    accepted: Vec<(String, String)>,
}

impl DayLedger {
    /// Empty day; `streak_load` is consumed up front.
    pub fn new(date: NaiveDate, streak_load: u32) -> Self {
        Self {
            date,
            remaining_load: DAILY_LOAD_BUDGET.saturating_sub(streak_load),
            accepted: Vec::new(),
        }
    }

    /// Day that already holds `existing` `(title, load)` tasks.
    pub fn with_existing<'a>(
        date: NaiveDate,
        streak_load: u32,
        existing: impl IntoIterator<Item = (&'a str, u8)>,
    ) -> Self {
        let mut ledger = Self::new(date, streak_load);
        for (title, load) in existing {
            ledger.record(title, load);
        }
        ledger
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn remaining_load(&self) -> u32 {
        self.remaining_load
    }

    pub fn task_count(&self) -> usize {
        self.accepted.len()
    }

    /// Whether `task` would be admitted, without admitting it.
    pub fn check(&self, task: &TodayTask) -> Result<(), Rejection> {
        self.check_normalized(&normalize_title(&task.title), task.load)
    }

    /// Admit `task` or explain why not. Duplicates are reported before caps.
    pub fn admit(&mut self, task: &TodayTask) -> Result<(), Rejection> {
        let normalized = normalize_title(&task.title);
        self.check_normalized(&normalized, task.load)?;
        self.remaining_load -= u32::from(task.load);
        self.accepted.push((normalized, task.title.clone()));
        Ok(())
    }

    fn check_normalized(&self, normalized: &str, load: u8) -> Result<(), Rejection> {
        if let Some((_, title)) = self
            .accepted
            .iter()
            .find(|(existing, _)| normalized_duplicate(existing, normalized))
        {
            return Err(Rejection::DuplicateOf {
                title: title.clone(),
            });
        }
        if self.accepted.len() >= MAX_TODAY_TASKS_PER_DAY {
            return Err(Rejection::OverCount {
                limit: MAX_TODAY_TASKS_PER_DAY,
            });
        }
        if u32::from(load) > self.remaining_load {
            return Err(Rejection::OverBudget {
                load,
                remaining: self.remaining_load,
            });
        }
        Ok(())
    }

    fn record(&mut self, title: &str, load: u8) {
        self.remaining_load = self.remaining_load.saturating_sub(u32::from(load));
        self.accepted.push((normalize_title(title), title.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Ad-hoc path
// ---------------------------------------------------------------------------

/// Result of governing one day's candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayOutcome {
    pub accepted: Vec<TodayTask>,
    pub rejected: Vec<RejectedTask>,
}

/// Admit the highest-value candidates that fit on `ledger`'s date.
///
/// Candidates are ranked by XP, ties kept in input order. Proof forcing is
/// applied to every accepted task.
pub fn govern_day(mut ledger: DayLedger, candidates: Vec<TodayTask>) -> DayOutcome {
    let mut ranked = candidates;
    ranked.sort_by_key(|t| std::cmp::Reverse(t.xp()));

    let mut outcome = DayOutcome::default();
    for mut task in ranked {
        match ledger.admit(&task) {
            Ok(()) => {
                force_proof(&mut task.proof_mode, &task.title);
                outcome.accepted.push(task);
            }
            Err(reason) => {
                debug!(date = %ledger.date(), title = %task.title, %reason, "candidate rejected");
                outcome
                    .rejected
                    .push(RejectedTask::new(ledger.date(), &task, reason));
            }
        }
    }
    outcome
}

// ---------------------------------------------------------------------------
// Plan-level governance
// ---------------------------------------------------------------------------

/// What [`govern_plan`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GovernReport {
    /// Streak titles turned into one-off tasks, with their new date.
    pub demoted: Vec<(String, NaiveDate)>,
    /// Number of tasks and habits switched to realtime proof.
    pub proof_forced: usize,
}

/// Switch to realtime proof when the title calls for a photo. Returns whether it changed.
pub fn force_proof(mode: &mut ProofMode, title: &str) -> bool {
    if *mode != ProofMode::Realtime && requires_realtime_proof(title) {
        *mode = ProofMode::Realtime;
        return true;
    }
    false
}

/// Apply proof forcing and weekday streak demotion to a validated plan.
///
/// A demoted habit is placed first on its date; the expander's admission
/// rule decides whether it fits there.
pub fn govern_plan(mut plan: Plan, window: &PlanWindow) -> (Plan, GovernReport) {
    let mut report = GovernReport::default();

    let (kept, demoted): (Vec<StreakHabit>, Vec<StreakHabit>) = plan
        .streaks
        .into_iter()
        .partition(|s| mentioned_weekday(&s.title).is_none());
    plan.streaks = kept;

    for habit in demoted {
        let date = mentioned_weekday(&habit.title)
            .and_then(|wd| window.dates().find(|d| d.weekday() == wd))
            .unwrap_or(window.start());
        debug!(title = %habit.title, %date, "demoting weekday streak to one-off task");
        if let Some(entry) = plan.daily_plan.iter_mut().find(|d| d.date == date) {
            entry.tasks.insert(
                0,
                TodayTask {
                    title: habit.title.clone(),
                    description: habit.description,
                    load: habit.load,
                    proof_mode: habit.proof_mode,
                    kind: TaskKind::Regular,
                },
            );
        }
        report.demoted.push((habit.title, date));
    }

    if plan.streaks.is_empty() {
        warn!("every streak habit was demoted; plan has no streaks");
    }

    for habit in &mut plan.streaks {
        if force_proof(&mut habit.proof_mode, &habit.title) {
            report.proof_forced += 1;
        }
    }
    for task in plan.daily_plan.iter_mut().flat_map(|d| d.tasks.iter_mut()) {
        if force_proof(&mut task.proof_mode, &task.title) {
            report.proof_forced += 1;
        }
    }

    (plan, report)
}
