//! Plan types: the typed plan the pipeline works on, and the loose wire
//! form a remote generator returns.
//!
//! The wire form ([`PlanDraft`]) keeps dates as strings and loads as raw
//! integers so that out-of-range values reach the validator instead of
//! failing deserialization with an opaque serde message.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use streakplan_db::models::ProofMode;

/// Effort points available per calendar day, across all task types.
pub const DAILY_LOAD_BUDGET: u32 = 5;
/// Maximum one-off tasks scheduled on a single date.
pub const MAX_TODAY_TASKS_PER_DAY: usize = 3;
/// Streak habits a plan may carry.
pub const MIN_STREAKS: usize = 1;
pub const MAX_STREAKS: usize = 3;
/// Upper bound on a single streak habit's load.
pub const MAX_STREAK_LOAD: u8 = 2;
/// Valid load range for any task.
pub const MIN_LOAD: u8 = 1;
pub const MAX_LOAD: u8 = 5;
/// Experience points granted per load point.
pub const XP_PER_LOAD: u32 = 10;

/// Convert an XP value to a load, clamped to the valid range.
pub fn load_for_xp(xp: u32) -> u8 {
    (xp / XP_PER_LOAD).clamp(u32::from(MIN_LOAD), u32::from(MAX_LOAD)) as u8
}

/// What a one-off task is for. Remote plans only produce `Regular`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Regular,
    Support,
    Setup,
    WeeklyReview,
    Checkpoint,
    Completion,
}

impl TaskKind {
    /// Lenient parse used for remote output; unknown kinds become `Regular`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "support" => Self::Support,
            "setup" => Self::Setup,
            "weekly_review" | "review" => Self::WeeklyReview,
            "checkpoint" | "milestone" => Self::Checkpoint,
            "completion" | "final" => Self::Completion,
            _ => Self::Regular,
        }
    }
}

/// A habit repeated once per calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakHabit {
    pub title: String,
    pub description: String,
    pub load: u8,
    pub proof_mode: ProofMode,
}

/// A one-off task. Its target date is the date of the [`DailyPlan`] holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayTask {
    pub title: String,
    pub description: String,
    pub load: u8,
    pub proof_mode: ProofMode,
    #[serde(default)]
    pub kind: TaskKind,
}

impl TodayTask {
    pub fn xp(&self) -> u32 {
        u32::from(self.load) * XP_PER_LOAD
    }
}

/// The one-off tasks planned for a single date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub tasks: Vec<TodayTask>,
}

/// Streak habits plus one entry per date in the goal window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub streaks: Vec<StreakHabit>,
    pub daily_plan: Vec<DailyPlan>,
}

impl Plan {
    /// Sum of streak loads, consumed every day.
    pub fn streak_load(&self) -> u32 {
        self.streaks.iter().map(|s| u32::from(s.load)).sum()
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&DailyPlan> {
        self.daily_plan.iter().find(|d| d.date == date)
    }

    pub fn today_task_count(&self) -> usize {
        self.daily_plan.iter().map(|d| d.tasks.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Wire form
// ---------------------------------------------------------------------------

/// Plan as returned by a remote generator, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDraft {
    #[serde(alias = "streaks", alias = "streakHabits")]
    pub streak_habits: Vec<StreakDraft>,
    #[serde(alias = "dailyPlan")]
    pub daily_plan: Vec<DailyDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub load: i64,
    #[serde(default, alias = "proofMode")]
    pub proof_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDraft {
    pub date: String,
    #[serde(default, alias = "today_tasks", alias = "todayTasks")]
    pub tasks: Vec<TaskDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub load: i64,
    #[serde(default, alias = "proofMode")]
    pub proof_mode: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

impl From<&Plan> for PlanDraft {
    fn from(plan: &Plan) -> Self {
        Self {
            streak_habits: plan
                .streaks
                .iter()
                .map(|s| StreakDraft {
                    title: s.title.clone(),
                    description: s.description.clone(),
                    load: i64::from(s.load),
                    proof_mode: Some(s.proof_mode.to_string()),
                })
                .collect(),
            daily_plan: plan
                .daily_plan
                .iter()
                .map(|d| DailyDraft {
                    date: d.date.format("%Y-%m-%d").to_string(),
                    tasks: d
                        .tasks
                        .iter()
                        .map(|t| TaskDraft {
                            title: t.title.clone(),
                            description: t.description.clone(),
                            load: i64::from(t.load),
                            proof_mode: Some(t.proof_mode.to_string()),
                            kind: serde_json::to_value(t.kind)
                                .ok()
                                .and_then(|v| v.as_str().map(str::to_owned)),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_maps_to_clamped_load() {
        assert_eq!(load_for_xp(0), 1);
        assert_eq!(load_for_xp(25), 2);
        assert_eq!(load_for_xp(30), 3);
        assert_eq!(load_for_xp(90), 5);
    }

    #[test]
    fn task_kind_parses_leniently() {
        assert_eq!(TaskKind::parse_lenient("Weekly-Review"), TaskKind::WeeklyReview);
        assert_eq!(TaskKind::parse_lenient("final"), TaskKind::Completion);
        assert_eq!(TaskKind::parse_lenient("whatever"), TaskKind::Regular);
    }

    #[test]
    fn draft_accepts_camel_case_aliases() {
        let json = r#"{
            "streakHabits": [{"title": "Stretch", "load": 1, "proofMode": "flexible"}],
            "dailyPlan": [{"date": "2026-03-02", "todayTasks": [{"title": "Run", "load": 2}]}]
        }"#;
        let draft: PlanDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.streak_habits[0].proof_mode.as_deref(), Some("flexible"));
        assert_eq!(draft.daily_plan[0].tasks[0].title, "Run");
        assert_eq!(draft.daily_plan[0].tasks[0].proof_mode, None);
    }

    #[test]
    fn draft_from_plan_keeps_kind_and_dates() {
        let plan = Plan {
            streaks: vec![StreakHabit {
                title: "Stretch".into(),
                description: String::new(),
                load: 1,
                proof_mode: ProofMode::Flexible,
            }],
            daily_plan: vec![DailyPlan {
                date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                tasks: vec![TodayTask {
                    title: "Finish".into(),
                    description: String::new(),
                    load: 1,
                    proof_mode: ProofMode::Realtime,
                    kind: TaskKind::Completion,
                }],
            }],
        };
        let draft = PlanDraft::from(&plan);
        assert_eq!(draft.daily_plan[0].date, "2026-03-02");
        assert_eq!(draft.daily_plan[0].tasks[0].kind.as_deref(), Some("completion"));
        assert_eq!(draft.daily_plan[0].tasks[0].proof_mode.as_deref(), Some("realtime"));
    }
}
