//! Deterministic plan synthesis from archetype templates.
//!
//! Used when no remote generator is configured or every remote attempt
//! failed. Candidates for each date are offered to a [`DayLedger`] in
//! priority order: milestones, the weekday template, then support work.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::types::{DailyPlan, MAX_STREAKS, MIN_LOAD, Plan, ProofMode, StreakHabit, TaskKind, TodayTask};
use super::validate::{ValidationError, validate_plan};
use crate::archetype::{Archetype, DomainTemplate};
use crate::goal::{ExperienceLevel, Goal};
use crate::phase::{PhaseName, design_phases, phase_for_date};
use crate::schedule::DayLedger;

/// Combined streak load the fallback allows, leaving room for today-tasks.
pub const MAX_FALLBACK_STREAK_LOAD: u32 = 3;

/// Progress thresholds that get a checkpoint task.
const CHECKPOINT_PERCENTS: [u32; 3] = [25, 50, 75];

/// Build and validate a plan for `goal` without any remote call.
pub fn synthesize(goal: &Goal, archetype: Archetype) -> Result<Plan, ValidationError> {
    let template = archetype.template();
    let streaks = choose_streaks(template.streaks(goal), goal.experience);
    let streak_load: u32 = streaks.iter().map(|s| u32::from(s.load)).sum();

    let weekly = template.weekly(goal);
    let support = template.support(goal);
    let phases = design_phases(goal.start(), goal.deadline());
    let milestones = milestone_days(goal.total_days());

    let mut daily_plan = Vec::with_capacity(goal.total_days() as usize);
    for (index, date) in goal.window.dates().enumerate() {
        let mut ledger = DayLedger::new(date, streak_load);
        let mut tasks = Vec::new();
        let mut offer = |task: TodayTask, ledger: &mut DayLedger| match ledger.admit(&task) {
            Ok(()) => tasks.push(task),
            Err(reason) => debug!(%date, title = %task.title, %reason, "fallback candidate skipped"),
        };

        for task in milestones_for(index as u32, goal, &milestones) {
            offer(task, &mut ledger);
        }

        let phase = phase_for_date(&phases, date).map(|p| p.name);
        let weekday_index = date.weekday().num_days_from_monday() as usize;
        if let Some(slot) = weekly.get(weekday_index) {
            let mut load = slot.load(phase == Some(PhaseName::Peak));
            if phase == Some(PhaseName::Deload) {
                load = load.saturating_sub(1).max(MIN_LOAD);
            }
            let remaining = ledger.remaining_load();
            if remaining >= u32::from(MIN_LOAD) {
                let load = u32::from(load).min(remaining) as u8;
                offer(
                    TodayTask {
                        title: slot.title.clone(),
                        description: slot.description.clone(),
                        load,
                        proof_mode: slot.proof_mode,
                        kind: TaskKind::Regular,
                    },
                    &mut ledger,
                );
            }
        }

        if matches!(phase, Some(PhaseName::Build | PhaseName::Peak)) {
            if let Some(s) = support.iter().find(|s| s.weekday == date.weekday()) {
                offer(
                    TodayTask {
                        title: s.title.clone(),
                        description: s.description.clone(),
                        load: s.load(),
                        proof_mode: s.proof_mode,
                        kind: TaskKind::Support,
                    },
                    &mut ledger,
                );
            }
        }

        daily_plan.push(DailyPlan { date, tasks });
    }

    let plan = Plan {
        streaks,
        daily_plan,
    };
    validate_plan(&plan, &goal.window)?;
    Ok(plan)
}

/// Pick habits in template order: one per experience step, total load capped.
fn choose_streaks(candidates: Vec<StreakHabit>, experience: ExperienceLevel) -> Vec<StreakHabit> {
    let wanted = match experience {
        ExperienceLevel::Beginner => 1,
        ExperienceLevel::Intermediate => 2,
        ExperienceLevel::Advanced => MAX_STREAKS,
    };

    let mut chosen = Vec::with_capacity(wanted);
    let mut load = 0u32;
    for habit in candidates {
        if chosen.len() == wanted {
            break;
        }
        if load + u32::from(habit.load) <= MAX_FALLBACK_STREAK_LOAD {
            load += u32::from(habit.load);
            chosen.push(habit);
        }
    }
    chosen
}

/// Day index of each checkpoint, keyed to its percentage. Collisions keep
/// the lower percentage; checkpoints never land on the first or last day.
fn milestone_days(total_days: u32) -> BTreeMap<u32, u32> {
    let last = total_days.saturating_sub(1);
    let mut days = BTreeMap::new();
    for pct in CHECKPOINT_PERCENTS {
        let index = total_days * pct / 100;
        if index > 0 && index < last {
            days.entry(index).or_insert(pct);
        }
    }
    days
}

fn milestones_for(index: u32, goal: &Goal, checkpoints: &BTreeMap<u32, u32>) -> Vec<TodayTask> {
    let last = goal.total_days() - 1;
    let mut out = Vec::new();

    // The final day always carries the completion task. On a one-day goal it
    // replaces setup, which the day's dedup could otherwise prefer.
    if index == last {
        out.push(milestone(
            format!("Complete: {}", goal.title),
            "Do the final attempt and record the result.",
            TaskKind::Completion,
        ));
    } else if index == 0 {
        out.push(milestone(
            format!("Set up for {}", goal.title),
            "Gather what you need and block time in your calendar.",
            TaskKind::Setup,
        ));
    }
    if let Some(pct) = checkpoints.get(&index) {
        out.push(milestone(
            format!("{pct}% checkpoint"),
            "Compare progress against the plan and adjust the coming days.",
            TaskKind::Checkpoint,
        ));
    }
    if (index + 1) % 7 == 0 && index != last {
        out.push(milestone(
            "Weekly review".to_string(),
            "Look back at the week: what worked, what to change.",
            TaskKind::WeeklyReview,
        ));
    }
    out
}

fn milestone(title: String, description: &str, kind: TaskKind) -> TodayTask {
    TodayTask {
        title,
        description: description.to_string(),
        load: MIN_LOAD,
        proof_mode: ProofMode::Flexible,
        kind,
    }
}
