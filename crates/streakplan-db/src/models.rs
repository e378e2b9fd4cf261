use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Kind of a persisted schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Recurs once per calendar day for the life of the goal.
    Streak,
    /// One-off task anchored to a single date.
    Today,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Streak => "streak",
            Self::Today => "today",
        };
        f.write_str(s)
    }
}

impl FromStr for TaskType {
    type Err = TaskTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "streak" => Ok(Self::Streak),
            "today" => Ok(Self::Today),
            other => Err(TaskTypeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`TaskType`] string.
#[derive(Debug, Clone)]
pub struct TaskTypeParseError(pub String);

impl fmt::Display for TaskTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid task type: {:?}", self.0)
    }
}

impl std::error::Error for TaskTypeParseError {}

// ---------------------------------------------------------------------------

/// How completion of a task has to be evidenced.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProofMode {
    /// Evidence must be captured at the moment of completion.
    Realtime,
    /// Evidence may be attached at any point during the day.
    #[default]
    Flexible,
}

impl fmt::Display for ProofMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Realtime => "realtime",
            Self::Flexible => "flexible",
        };
        f.write_str(s)
    }
}

impl FromStr for ProofMode {
    type Err = ProofModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "realtime" => Ok(Self::Realtime),
            "flexible" => Ok(Self::Flexible),
            other => Err(ProofModeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ProofMode`] string.
#[derive(Debug, Clone)]
pub struct ProofModeParseError(pub String);

impl fmt::Display for ProofModeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid proof mode: {:?}", self.0)
    }
}

impl std::error::Error for ProofModeParseError {}

// ---------------------------------------------------------------------------

/// Priority tier derived from a task's load.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Tier for a given load: high at 3 and above, medium at 2, low otherwise.
    pub fn for_load(load: u8) -> Self {
        match load {
            3.. => Self::High,
            2 => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(PriorityParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Priority`] string.
#[derive(Debug, Clone)]
pub struct PriorityParseError(pub String);

impl fmt::Display for PriorityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid priority: {:?}", self.0)
    }
}

impl std::error::Error for PriorityParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A persisted schedule row in `goal_tasks`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GoalTask {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub goal_id: Uuid,
    pub title: String,
    pub normalized_title: String,
    pub description: String,
    pub task_type: TaskType,
    pub scheduled_date: NaiveDate,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub load: i16,
    pub proof_mode: ProofMode,
    pub xp: i32,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A schedule row that has not been inserted yet.
///
/// `scheduled_at` is set for today-tasks only; streak rows anchor to
/// `scheduled_date` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGoalTask {
    pub owner_id: Uuid,
    pub goal_id: Uuid,
    pub title: String,
    pub normalized_title: String,
    pub description: String,
    pub task_type: TaskType,
    pub scheduled_date: NaiveDate,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub load: i16,
    pub proof_mode: ProofMode,
    pub xp: i32,
    pub priority: Priority,
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_type_round_trips_through_strings() {
        for t in [TaskType::Streak, TaskType::Today] {
            assert_eq!(t.to_string().parse::<TaskType>().unwrap(), t);
        }
        assert!("weekly".parse::<TaskType>().is_err());
    }

    #[test]
    fn proof_mode_defaults_to_flexible() {
        assert_eq!(ProofMode::default(), ProofMode::Flexible);
        assert_eq!("realtime".parse::<ProofMode>().unwrap(), ProofMode::Realtime);
        let err = "photo".parse::<ProofMode>().unwrap_err();
        assert_eq!(err.to_string(), "invalid proof mode: \"photo\"");
    }

    #[test]
    fn priority_tiers_follow_load() {
        assert_eq!(Priority::for_load(1), Priority::Low);
        assert_eq!(Priority::for_load(2), Priority::Medium);
        assert_eq!(Priority::for_load(3), Priority::High);
        assert_eq!(Priority::for_load(5), Priority::High);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&TaskType::Streak).unwrap();
        assert_eq!(json, "\"streak\"");
        let p: Priority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(p, Priority::Medium);
    }
}
