//! Expansion of a plan into dated task rows.
//!
//! Each date gets one streak row per habit. Today-tasks go through a
//! [`DayLedger`]; those that do not fit are carried to the next date, except
//! duplicates, which are dropped. Carryover still pending after the deadline
//! is dropped and reported.

use std::collections::BTreeSet;
use std::collections::VecDeque;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use streakplan_db::models::{NewGoalTask, Priority, TaskType};

use super::governor::{DayLedger, RejectedTask, Rejection};
use super::title::normalize_title;
use crate::goal::{PlanWindow, local_anchor};
use crate::plan::types::{Plan, StreakHabit, TodayTask, XP_PER_LOAD};

/// Local hour at which today-tasks are anchored.
pub const TODAY_TASK_HOUR: u32 = 9;

/// Who the rows belong to and how to anchor them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowContext {
    pub owner_id: Uuid,
    pub goal_id: Uuid,
    pub tz_offset_minutes: i32,
}

impl RowContext {
    pub fn streak_row(&self, habit: &StreakHabit, date: NaiveDate) -> NewGoalTask {
        NewGoalTask {
            owner_id: self.owner_id,
            goal_id: self.goal_id,
            title: habit.title.clone(),
            normalized_title: normalize_title(&habit.title),
            description: habit.description.clone(),
            task_type: TaskType::Streak,
            scheduled_date: date,
            scheduled_at: None,
            load: i16::from(habit.load),
            proof_mode: habit.proof_mode,
            xp: xp_for_load(habit.load),
            priority: Priority::for_load(habit.load),
            completed: false,
        }
    }

    pub fn today_row(&self, task: &TodayTask, date: NaiveDate) -> NewGoalTask {
        NewGoalTask {
            owner_id: self.owner_id,
            goal_id: self.goal_id,
            title: task.title.clone(),
            normalized_title: normalize_title(&task.title),
            description: task.description.clone(),
            task_type: TaskType::Today,
            scheduled_date: date,
            scheduled_at: Some(local_anchor(date, TODAY_TASK_HOUR, self.tz_offset_minutes)),
            load: i16::from(task.load),
            proof_mode: task.proof_mode,
            xp: xp_for_load(task.load),
            priority: Priority::for_load(task.load),
            completed: false,
        }
    }
}

fn xp_for_load(load: u8) -> i32 {
    (u32::from(load) * XP_PER_LOAD) as i32
}

/// A task moved off its planned date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeferredTask {
    pub title: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub reason: Rejection,
}

/// What the expander changed relative to the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionReport {
    /// Dates where at least one task was turned away.
    pub trimmed_days: BTreeSet<NaiveDate>,
    pub deferred: Vec<DeferredTask>,
    /// Duplicates and carryover left over at the deadline.
    pub dropped: Vec<RejectedTask>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub tasks: Vec<NewGoalTask>,
    pub report: ExpansionReport,
}

impl Expansion {
    pub fn count_of(&self, task_type: TaskType) -> usize {
        self.tasks.iter().filter(|t| t.task_type == task_type).count()
    }
}

/// A task waiting for a date, remembering where it was first planned.
struct Pending {
    task: TodayTask,
    planned_for: NaiveDate,
    last_reason: Option<Rejection>,
}

/// Expand `plan` over `window` into ordered rows.
///
/// Rows come out date by date: streak rows first, then accepted today-tasks
/// in pool order.
pub fn expand(plan: &Plan, window: &PlanWindow, ctx: &RowContext) -> Expansion {
    let streak_load = plan.streak_load();
    let mut tasks = Vec::new();
    let mut report = ExpansionReport::default();
    let mut carryover: VecDeque<Pending> = VecDeque::new();

    for date in window.dates() {
        tasks.extend(plan.streaks.iter().map(|h| ctx.streak_row(h, date)));

        let planned = plan
            .entry(date)
            .map(|d| d.tasks.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|task| Pending {
                task: task.clone(),
                planned_for: date,
                last_reason: None,
            });
        let pool: Vec<Pending> = planned.chain(carryover.drain(..)).collect();

        let mut ledger = DayLedger::new(date, streak_load);
        for mut pending in pool {
            match ledger.admit(&pending.task) {
                Ok(()) => {
                    // Only carried tasks have a previous rejection.
                    if let Some(reason) = pending.last_reason.take() {
                        report.deferred.push(DeferredTask {
                            title: pending.task.title.clone(),
                            from: pending.planned_for,
                            to: date,
                            reason,
                        });
                    }
                    tasks.push(ctx.today_row(&pending.task, date));
                }
                Err(reason) => {
                    report.trimmed_days.insert(date);
                    debug!(%date, title = %pending.task.title, %reason, "task not admitted");
                    if reason.is_duplicate() {
                        report
                            .dropped
                            .push(RejectedTask::new(date, &pending.task, reason));
                    } else {
                        pending.last_reason = Some(reason);
                        carryover.push_back(pending);
                    }
                }
            }
        }
    }

    if !carryover.is_empty() {
        info!(
            count = carryover.len(),
            deadline = %window.deadline(),
            "dropping carryover left at deadline"
        );
        for pending in carryover {
            report.dropped.push(RejectedTask::new(
                window.deadline(),
                &pending.task,
                Rejection::PastDeadline {
                    deadline: window.deadline(),
                },
            ));
        }
    }

    Expansion { tasks, report }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Timelike};

    use super::*;
    use crate::plan::types::{DailyPlan, ProofMode, TaskKind};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn ctx() -> RowContext {
        RowContext {
            owner_id: Uuid::new_v4(),
            goal_id: Uuid::new_v4(),
            tz_offset_minutes: 120,
        }
    }

    fn task(title: &str, load: u8) -> TodayTask {
        TodayTask {
            title: title.to_string(),
            description: String::new(),
            load,
            proof_mode: ProofMode::Flexible,
            kind: TaskKind::Regular,
        }
    }

    fn habit(title: &str, load: u8) -> StreakHabit {
        StreakHabit {
            title: title.to_string(),
            description: String::new(),
            load,
            proof_mode: ProofMode::Flexible,
        }
    }

    fn plan(window: &PlanWindow, streaks: Vec<StreakHabit>) -> Plan {
        Plan {
            streaks,
            daily_plan: window
                .dates()
                .map(|date| DailyPlan {
                    date,
                    tasks: Vec::new(),
                })
                .collect(),
        }
    }

    fn today_titles_on(expansion: &Expansion, date: NaiveDate) -> Vec<String> {
        expansion
            .tasks
            .iter()
            .filter(|t| t.task_type == TaskType::Today && t.scheduled_date == date)
            .map(|t| t.title.clone())
            .collect()
    }

    #[test]
    fn one_streak_row_per_habit_per_day() {
        let window = PlanWindow::new(start(), start() + Duration::days(9)).unwrap();
        let p = plan(&window, vec![habit("Stretch", 1), habit("Journal", 2)]);
        let expansion = expand(&p, &window, &ctx());
        assert_eq!(expansion.count_of(TaskType::Streak), 20);
        assert_eq!(expansion.count_of(TaskType::Today), 0);
        assert!(expansion.report.trimmed_days.is_empty());
    }

    #[test]
    fn over_budget_pool_defers_the_excess() {
        // Streak load 2 leaves 3; the pool totals 6.
        let window = PlanWindow::new(start(), start() + Duration::days(1)).unwrap();
        let mut p = plan(&window, vec![habit("Stretch", 2)]);
        p.daily_plan[0].tasks = vec![task("Intervals", 2), task("Drills", 1), task("Long ride", 3)];

        let expansion = expand(&p, &window, &ctx());
        assert_eq!(today_titles_on(&expansion, start()), vec!["Intervals", "Drills"]);
        let day_two = start() + Duration::days(1);
        assert_eq!(today_titles_on(&expansion, day_two), vec!["Long ride"]);

        let report = &expansion.report;
        assert_eq!(report.trimmed_days.iter().copied().collect::<Vec<_>>(), vec![start()]);
        assert_eq!(report.deferred.len(), 1);
        assert_eq!(report.deferred[0].from, start());
        assert_eq!(report.deferred[0].to, day_two);
        assert!(matches!(report.deferred[0].reason, Rejection::OverBudget { load: 3, .. }));
    }

    #[test]
    fn planned_tasks_come_before_carryover() {
        let window = PlanWindow::new(start(), start() + Duration::days(1)).unwrap();
        let mut p = plan(&window, vec![habit("Stretch", 1)]);
        p.daily_plan[0].tasks = vec![task("A1", 2), task("A2", 2), task("A3", 2)];
        p.daily_plan[1].tasks = vec![task("B1", 2), task("B2", 2)];

        let expansion = expand(&p, &window, &ctx());
        assert_eq!(today_titles_on(&expansion, start()), vec!["A1", "A2"]);
        assert_eq!(
            today_titles_on(&expansion, start() + Duration::days(1)),
            vec!["B1", "B2"]
        );
        // A3 never fits and is dropped at the deadline.
        assert_eq!(expansion.report.dropped.len(), 1);
        assert_eq!(expansion.report.dropped[0].title, "A3");
        assert!(matches!(
            expansion.report.dropped[0].reason,
            Rejection::PastDeadline { .. }
        ));
    }

    #[test]
    fn carryover_never_lands_after_deadline() {
        let window = PlanWindow::new(start(), start() + Duration::days(2)).unwrap();
        let mut p = plan(&window, vec![habit("Stretch", 2)]);
        p.daily_plan[2].tasks = vec![task("Heavy", 3), task("Also heavy", 3)];

        let expansion = expand(&p, &window, &ctx());
        assert!(
            expansion
                .tasks
                .iter()
                .all(|t| t.scheduled_date <= window.deadline())
        );
        assert_eq!(expansion.report.dropped.len(), 1);
    }

    #[test]
    fn same_day_duplicates_collapse_and_are_not_carried() {
        let window = PlanWindow::new(start(), start() + Duration::days(1)).unwrap();
        let mut p = plan(&window, vec![habit("Stretch", 1)]);
        p.daily_plan[0].tasks = vec![task("Morning Run", 1), task("morning run!!", 1)];

        let expansion = expand(&p, &window, &ctx());
        assert_eq!(today_titles_on(&expansion, start()), vec!["Morning Run"]);
        assert!(today_titles_on(&expansion, start() + Duration::days(1)).is_empty());
        assert!(expansion.report.dropped[0].reason.is_duplicate());
        assert!(expansion.report.deferred.is_empty());
    }

    #[test]
    fn rows_carry_derived_values() {
        let window = PlanWindow::new(start(), start()).unwrap();
        let mut p = plan(&window, vec![habit("Stretch", 1)]);
        p.daily_plan[0].tasks = vec![task("Tempo Run!", 3)];
        let c = ctx();

        let expansion = expand(&p, &window, &c);
        let streak = &expansion.tasks[0];
        assert_eq!(streak.task_type, TaskType::Streak);
        assert_eq!(streak.scheduled_at, None);
        assert_eq!(streak.priority, Priority::Low);
        assert_eq!(streak.xp, 10);

        let today = &expansion.tasks[1];
        assert_eq!(today.owner_id, c.owner_id);
        assert_eq!(today.goal_id, c.goal_id);
        assert_eq!(today.normalized_title, "tempo run");
        assert_eq!(today.xp, 30);
        assert_eq!(today.priority, Priority::High);
        assert!(!today.completed);
        // 09:00 at UTC+2 is 07:00 UTC.
        let at = today.scheduled_at.unwrap();
        assert_eq!(at.date_naive(), start());
        assert_eq!(at.hour(), 7);
    }
}
