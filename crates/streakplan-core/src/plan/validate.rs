//! Structural validation of plans.
//!
//! [`validate_draft`] turns the loose wire form into a typed [`Plan`];
//! [`validate_plan`] re-checks a typed plan. Both enforce the same rules, so
//! a plan accepted once is accepted again.

use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;

use super::types::{
    DAILY_LOAD_BUDGET, DailyPlan, MAX_LOAD, MAX_STREAK_LOAD, MAX_STREAKS, MAX_TODAY_TASKS_PER_DAY,
    MIN_LOAD, MIN_STREAKS, Plan, PlanDraft, ProofMode, StreakHabit, TaskKind, TodayTask,
};
use crate::goal::PlanWindow;
use crate::schedule::title::normalize_title;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("plan has {count} streak habits (expected {MIN_STREAKS}-{MAX_STREAKS})")]
    StreakCount { count: usize },

    #[error("streak {title:?} has load {load} (expected {MIN_LOAD}-{MAX_STREAK_LOAD})")]
    StreakLoad { title: String, load: i64 },

    #[error("task {title:?} on {date} has load {load} (expected {MIN_LOAD}-{MAX_LOAD})")]
    TaskLoad {
        date: NaiveDate,
        title: String,
        load: i64,
    },

    #[error("{date} has {count} tasks (maximum {MAX_TODAY_TASKS_PER_DAY})")]
    TooManyTasks { date: NaiveDate, count: usize },

    #[error("{date} carries load {load} (budget {DAILY_LOAD_BUDGET})")]
    DailyLoadExceeded { date: NaiveDate, load: u32 },

    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("{0} is outside the plan window")]
    DateOutOfRange(NaiveDate),

    #[error("{0} appears more than once")]
    DuplicateDate(NaiveDate),

    #[error("{found} is out of order (expected {expected})")]
    DateOutOfOrder { expected: NaiveDate, found: NaiveDate },

    #[error("no entry for {0}")]
    MissingDate(NaiveDate),

    #[error("empty title in {0}")]
    EmptyTitle(String),

    #[error("duplicate title {title:?} in {scope}")]
    DuplicateTitle { scope: String, title: String },

    #[error("unknown proof mode {0:?}")]
    InvalidProofMode(String),
}

impl ValidationError {
    /// Stable code for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::StreakCount { count } if *count > MAX_STREAKS => "too_many_streaks",
            Self::StreakCount { .. } => "too_few_streaks",
            Self::StreakLoad { .. } => "streak_load_out_of_range",
            Self::TaskLoad { .. } => "task_load_out_of_range",
            Self::TooManyTasks { .. } => "too_many_tasks",
            Self::DailyLoadExceeded { .. } => "daily_load_exceeded",
            Self::InvalidDate(_) => "invalid_date",
            Self::DateOutOfRange(_) => "date_out_of_range",
            Self::DuplicateDate(_) => "duplicate_date",
            Self::DateOutOfOrder { .. } => "date_out_of_order",
            Self::MissingDate(_) => "missing_date",
            Self::EmptyTitle(_) => "empty_title",
            Self::DuplicateTitle { .. } => "duplicate_title",
            Self::InvalidProofMode(_) => "invalid_proof_mode",
        }
    }
}

/// Convert and check a draft against `window`.
pub fn validate_draft(draft: &PlanDraft, window: &PlanWindow) -> Result<Plan, ValidationError> {
    let mut streaks = Vec::with_capacity(draft.streak_habits.len());
    for s in &draft.streak_habits {
        let load = u8::try_from(s.load)
            .ok()
            .filter(|l| (MIN_LOAD..=MAX_STREAK_LOAD).contains(l))
            .ok_or_else(|| ValidationError::StreakLoad {
                title: s.title.clone(),
                load: s.load,
            })?;
        streaks.push(StreakHabit {
            title: s.title.trim().to_string(),
            description: s.description.trim().to_string(),
            load,
            proof_mode: parse_proof_mode(s.proof_mode.as_deref())?,
        });
    }

    let mut daily_plan = Vec::with_capacity(draft.daily_plan.len());
    for entry in &draft.daily_plan {
        let date = NaiveDate::parse_from_str(entry.date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(entry.date.clone()))?;
        let mut tasks = Vec::with_capacity(entry.tasks.len());
        for t in &entry.tasks {
            let load = u8::try_from(t.load)
                .ok()
                .filter(|l| (MIN_LOAD..=MAX_LOAD).contains(l))
                .ok_or_else(|| ValidationError::TaskLoad {
                    date,
                    title: t.title.clone(),
                    load: t.load,
                })?;
            tasks.push(TodayTask {
                title: t.title.trim().to_string(),
                description: t.description.trim().to_string(),
                load,
                proof_mode: parse_proof_mode(t.proof_mode.as_deref())?,
                kind: t
                    .kind
                    .as_deref()
                    .map(TaskKind::parse_lenient)
                    .unwrap_or_default(),
            });
        }
        daily_plan.push(DailyPlan { date, tasks });
    }

    let plan = Plan {
        streaks,
        daily_plan,
    };
    validate_plan(&plan, window)?;
    Ok(plan)
}

/// Check every plan invariant against `window`.
pub fn validate_plan(plan: &Plan, window: &PlanWindow) -> Result<(), ValidationError> {
    let count = plan.streaks.len();
    if !(MIN_STREAKS..=MAX_STREAKS).contains(&count) {
        return Err(ValidationError::StreakCount { count });
    }

    let mut streak_titles = HashSet::new();
    for s in &plan.streaks {
        if !(MIN_LOAD..=MAX_STREAK_LOAD).contains(&s.load) {
            return Err(ValidationError::StreakLoad {
                title: s.title.clone(),
                load: i64::from(s.load),
            });
        }
        if s.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle("streak habits".to_string()));
        }
        if !streak_titles.insert(normalize_title(&s.title)) {
            return Err(ValidationError::DuplicateTitle {
                scope: "streak habits".to_string(),
                title: s.title.clone(),
            });
        }
    }

    let streak_load = plan.streak_load();
    let mut expected = window.dates();
    for entry in &plan.daily_plan {
        let date = entry.date;
        if !window.contains(date) {
            return Err(ValidationError::DateOutOfRange(date));
        }
        match expected.next() {
            Some(want) if want == date => {}
            Some(want) if date < want => return Err(ValidationError::DuplicateDate(date)),
            Some(want) => {
                return Err(ValidationError::DateOutOfOrder {
                    expected: want,
                    found: date,
                });
            }
            // Every in-range date already seen, so this one repeats.
            None => return Err(ValidationError::DuplicateDate(date)),
        }
        validate_day(entry, streak_load)?;
    }
    if let Some(missing) = expected.next() {
        return Err(ValidationError::MissingDate(missing));
    }

    Ok(())
}

fn validate_day(entry: &DailyPlan, streak_load: u32) -> Result<(), ValidationError> {
    let date = entry.date;
    if entry.tasks.len() > MAX_TODAY_TASKS_PER_DAY {
        return Err(ValidationError::TooManyTasks {
            date,
            count: entry.tasks.len(),
        });
    }

    let mut titles = HashSet::new();
    let mut load = streak_load;
    for t in &entry.tasks {
        if !(MIN_LOAD..=MAX_LOAD).contains(&t.load) {
            return Err(ValidationError::TaskLoad {
                date,
                title: t.title.clone(),
                load: i64::from(t.load),
            });
        }
        if t.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle(date.to_string()));
        }
        if !titles.insert(normalize_title(&t.title)) {
            return Err(ValidationError::DuplicateTitle {
                scope: date.to_string(),
                title: t.title.clone(),
            });
        }
        load += u32::from(t.load);
    }

    if load > DAILY_LOAD_BUDGET {
        return Err(ValidationError::DailyLoadExceeded { date, load });
    }
    Ok(())
}

fn parse_proof_mode(raw: Option<&str>) -> Result<ProofMode, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(ProofMode::default()),
        Some(s) => s
            .to_ascii_lowercase()
            .parse()
            .map_err(|_| ValidationError::InvalidProofMode(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::plan::types::{DailyDraft, StreakDraft, TaskDraft};

    fn window(days: i64) -> PlanWindow {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        PlanWindow::new(start, start + Duration::days(days - 1)).unwrap()
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

    fn plan(window: &PlanWindow) -> Plan {
        Plan {
            streaks: vec![StreakHabit {
                title: "Stretch".into(),
                description: String::new(),
                load: 1,
                proof_mode: ProofMode::Flexible,
            }],
            daily_plan: window
                .dates()
                .map(|date| DailyPlan {
                    date,
                    tasks: vec![task("Read", 2)],
                })
                .collect(),
        }
    }

    #[test]
    fn valid_plan_passes_twice() {
        let w = window(5);
        let p = plan(&w);
        assert_eq!(validate_plan(&p, &w), Ok(()));
        assert_eq!(validate_plan(&p, &w), Ok(()));
    }

    #[test]
    fn streak_rules() {
        let w = window(3);
        let mut p = plan(&w);
        p.streaks.clear();
        assert_eq!(validate_plan(&p, &w).unwrap_err().reason(), "too_few_streaks");

        let mut p = plan(&w);
        p.streaks = (0..4)
            .map(|i| StreakHabit {
                title: format!("Habit {i}"),
                description: String::new(),
                load: 1,
                proof_mode: ProofMode::Flexible,
            })
            .collect();
        assert_eq!(validate_plan(&p, &w).unwrap_err().reason(), "too_many_streaks");

        let mut p = plan(&w);
        p.streaks[0].load = 3;
        assert_eq!(
            validate_plan(&p, &w).unwrap_err().reason(),
            "streak_load_out_of_range"
        );

        let mut p = plan(&w);
        p.streaks.push(StreakHabit {
            title: "stretch!".into(),
            ..p.streaks[0].clone()
        });
        assert_eq!(validate_plan(&p, &w).unwrap_err().reason(), "duplicate_title");
    }

    #[test]
    fn daily_rules() {
        let w = window(3);

        let mut p = plan(&w);
        p.daily_plan[1].tasks = vec![task("A", 1), task("B", 1), task("C", 1), task("D", 1)];
        assert_eq!(validate_plan(&p, &w).unwrap_err().reason(), "too_many_tasks");

        let mut p = plan(&w);
        p.daily_plan[1].tasks = vec![task("A", 3), task("B", 2)];
        assert_eq!(
            validate_plan(&p, &w),
            Err(ValidationError::DailyLoadExceeded {
                date: p.daily_plan[1].date,
                load: 6
            })
        );

        let mut p = plan(&w);
        p.daily_plan[0].tasks = vec![task("Morning Run", 1), task("morning run!!", 1)];
        assert_eq!(validate_plan(&p, &w).unwrap_err().reason(), "duplicate_title");

        let mut p = plan(&w);
        p.daily_plan[2].tasks = vec![task("   ", 1)];
        assert_eq!(validate_plan(&p, &w).unwrap_err().reason(), "empty_title");
    }

    #[test]
    fn date_coverage_rules() {
        let w = window(3);

        let mut p = plan(&w);
        p.daily_plan.pop();
        assert_eq!(
            validate_plan(&p, &w),
            Err(ValidationError::MissingDate(w.deadline()))
        );

        let mut p = plan(&w);
        p.daily_plan.swap(0, 1);
        assert_eq!(validate_plan(&p, &w).unwrap_err().reason(), "date_out_of_order");

        let mut p = plan(&w);
        let dup = p.daily_plan[0].clone();
        p.daily_plan.insert(1, dup);
        assert_eq!(validate_plan(&p, &w).unwrap_err().reason(), "duplicate_date");

        let mut p = plan(&w);
        p.daily_plan.push(DailyPlan {
            date: w.deadline() + Duration::days(1),
            tasks: Vec::new(),
        });
        assert_eq!(validate_plan(&p, &w).unwrap_err().reason(), "date_out_of_range");

        let p = Plan {
            daily_plan: Vec::new(),
            ..plan(&w)
        };
        assert_eq!(validate_plan(&p, &w).unwrap_err().reason(), "missing_date");
    }

    fn draft(window: &PlanWindow) -> PlanDraft {
        PlanDraft {
            streak_habits: vec![StreakDraft {
                title: " Stretch ".into(),
                description: String::new(),
                load: 1,
                proof_mode: Some("REALTIME".into()),
            }],
            daily_plan: window
                .dates()
                .map(|d| DailyDraft {
                    date: d.format("%Y-%m-%d").to_string(),
                    tasks: vec![TaskDraft {
                        title: "Read".into(),
                        description: String::new(),
                        load: 2,
                        proof_mode: None,
                        kind: Some("checkpoint".into()),
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn draft_converts_to_typed_plan() {
        let w = window(2);
        let p = validate_draft(&draft(&w), &w).unwrap();
        assert_eq!(p.streaks[0].title, "Stretch");
        assert_eq!(p.streaks[0].proof_mode, ProofMode::Realtime);
        assert_eq!(p.daily_plan[0].tasks[0].proof_mode, ProofMode::Flexible);
        assert_eq!(p.daily_plan[0].tasks[0].kind, TaskKind::Checkpoint);
        assert_eq!(validate_plan(&p, &w), Ok(()));
    }

    #[test]
    fn draft_rejects_raw_values() {
        let w = window(2);

        let mut d = draft(&w);
        d.daily_plan[0].date = "03/02/2026".into();
        assert_eq!(
            validate_draft(&d, &w),
            Err(ValidationError::InvalidDate("03/02/2026".into()))
        );

        let mut d = draft(&w);
        d.daily_plan[1].tasks[0].load = -4;
        assert_eq!(validate_draft(&d, &w).unwrap_err().reason(), "task_load_out_of_range");

        let mut d = draft(&w);
        d.streak_habits[0].load = 9;
        assert_eq!(validate_draft(&d, &w).unwrap_err().reason(), "streak_load_out_of_range");

        let mut d = draft(&w);
        d.streak_habits[0].proof_mode = Some("video".into());
        assert_eq!(
            validate_draft(&d, &w),
            Err(ValidationError::InvalidProofMode("video".into()))
        );
    }
}
