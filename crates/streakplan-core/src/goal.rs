//! Goal descriptors: the inbound request and its normalized planning form.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Longest schedule the engine will expand, in days.
pub const MAX_PLAN_DAYS: u32 = 366;

/// Offsets at or beyond a full day are rejected.
const MAX_OFFSET_MINUTES: i32 = 24 * 60;

// ---------------------------------------------------------------------------
// Experience level
// ---------------------------------------------------------------------------

/// Self-reported experience with the goal's domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

impl FromStr for ExperienceLevel {
    type Err = ExperienceLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(ExperienceLevelParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ExperienceLevel`] string.
#[derive(Debug, Clone, Error)]
#[error("invalid experience level: {0:?} (expected beginner, intermediate, or advanced)")]
pub struct ExperienceLevelParseError(pub String);

// ---------------------------------------------------------------------------
// Request and normalized goal
// ---------------------------------------------------------------------------

/// Goal descriptor as received from the goal-creation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalRequest {
    pub owner_id: Uuid,
    pub goal_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub experience: ExperienceLevel,
    /// Minutes east of UTC.
    #[serde(default)]
    pub tz_offset_minutes: i32,
}

/// Reasons a goal descriptor cannot be planned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalError {
    #[error("goal title is empty")]
    EmptyTitle,

    #[error("deadline {deadline} is before the goal's start date {today}")]
    DeadlineInPast { deadline: NaiveDate, today: NaiveDate },

    #[error("plan would span {days} days (maximum {MAX_PLAN_DAYS})")]
    HorizonTooLong { days: i64 },

    #[error("timezone offset {0} minutes is out of range")]
    InvalidTimezoneOffset(i32),
}

/// Inclusive date range a plan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanWindow {
    start: NaiveDate,
    deadline: NaiveDate,
}

impl PlanWindow {
    /// Returns `None` when `deadline` precedes `start`.
    pub fn new(start: NaiveDate, deadline: NaiveDate) -> Option<Self> {
        (deadline >= start).then_some(Self { start, deadline })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn deadline(&self) -> NaiveDate {
        self.deadline
    }

    /// Number of calendar days, both ends included.
    pub fn total_days(&self) -> u32 {
        ((self.deadline - self.start).num_days() + 1) as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.deadline
    }

    /// Zero-based offset of `date` from the start, if inside the window.
    pub fn day_index(&self, date: NaiveDate) -> Option<u32> {
        self.contains(date)
            .then(|| (date - self.start).num_days() as u32)
    }

    /// Every date in the window, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        self.start.iter_days().take(self.total_days() as usize)
    }
}

/// A goal after normalization, ready for planning.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub experience: ExperienceLevel,
    pub tz_offset_minutes: i32,
    pub window: PlanWindow,
}

impl Goal {
    /// Normalize a request against the current instant.
    ///
    /// The start date is "today" in the goal's own timezone.
    pub fn from_request(request: &GoalRequest, now: DateTime<Utc>) -> Result<Self, GoalError> {
        let title = collapse_whitespace(&request.title);
        if title.is_empty() {
            return Err(GoalError::EmptyTitle);
        }

        let offset = offset_from_minutes(request.tz_offset_minutes)
            .ok_or(GoalError::InvalidTimezoneOffset(request.tz_offset_minutes))?;
        let today = now.with_timezone(&offset).date_naive();

        let window = PlanWindow::new(today, request.deadline).ok_or(GoalError::DeadlineInPast {
            deadline: request.deadline,
            today,
        })?;
        if window.total_days() > MAX_PLAN_DAYS {
            return Err(GoalError::HorizonTooLong {
                days: i64::from(window.total_days()),
            });
        }

        let category = request
            .category
            .as_deref()
            .map(collapse_whitespace)
            .filter(|c| !c.is_empty());

        Ok(Self {
            title,
            description: request.description.trim().to_string(),
            category,
            experience: request.experience,
            tz_offset_minutes: request.tz_offset_minutes,
            window,
        })
    }

    pub fn start(&self) -> NaiveDate {
        self.window.start()
    }

    pub fn deadline(&self) -> NaiveDate {
        self.window.deadline()
    }

    pub fn total_days(&self) -> u32 {
        self.window.total_days()
    }

    /// UTC instant of `hour`:00 local time on `date`.
    pub fn local_anchor(&self, date: NaiveDate, hour: u32) -> DateTime<Utc> {
        local_anchor(date, hour, self.tz_offset_minutes)
    }
}

/// UTC instant of `hour`:00 on `date` at `tz_offset_minutes` east of UTC.
pub fn local_anchor(date: NaiveDate, hour: u32, tz_offset_minutes: i32) -> DateTime<Utc> {
    let local = NaiveDateTime::from(date) + Duration::hours(i64::from(hour));
    (local - Duration::minutes(i64::from(tz_offset_minutes))).and_utc()
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    if minutes.abs() >= MAX_OFFSET_MINUTES {
        return None;
    }
    FixedOffset::east_opt(minutes * 60)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn experience_level_parses_case_insensitively() {
        assert_eq!("Advanced".parse::<ExperienceLevel>().unwrap(), ExperienceLevel::Advanced);
        assert!("expert".parse::<ExperienceLevel>().is_err());
    }

    #[test]
    fn from_request_normalizes_title() {
        let mut req = request("  Learn   Spanish \n", 10, ExperienceLevel::Beginner);
        req.category = Some("   ".to_string());
        let goal = Goal::from_request(&req, fixed_now()).unwrap();
        assert_eq!(goal.title, "Learn Spanish");
        assert_eq!(goal.category, None);
        assert_eq!(goal.total_days(), 11);
    }

    #[test]
    fn deadline_today_gives_one_day_window() {
        let goal = goal("Ship it", 0, ExperienceLevel::Beginner);
        assert_eq!(goal.total_days(), 1);
        assert_eq!(goal.start(), goal.deadline());
    }

    #[test]
    fn rejects_past_deadline_and_empty_title() {
        let req = request("Old goal", -1, ExperienceLevel::Beginner);
        assert!(matches!(
            Goal::from_request(&req, fixed_now()),
            Err(GoalError::DeadlineInPast { .. })
        ));

        let req = request("   ", 5, ExperienceLevel::Beginner);
        assert_eq!(Goal::from_request(&req, fixed_now()), Err(GoalError::EmptyTitle));
    }

    #[test]
    fn rejects_overlong_horizon_and_bad_offset() {
        let req = request("Forever", 400, ExperienceLevel::Beginner);
        assert!(matches!(
            Goal::from_request(&req, fixed_now()),
            Err(GoalError::HorizonTooLong { days: 401 })
        ));

        let mut req = request("Tz", 5, ExperienceLevel::Beginner);
        req.tz_offset_minutes = 24 * 60;
        assert_eq!(
            Goal::from_request(&req, fixed_now()),
            Err(GoalError::InvalidTimezoneOffset(1440))
        );
    }

    #[test]
    fn start_date_follows_goal_timezone() {
        // 12:00 UTC is already the next day at UTC+13.
        let mut req = request("Tz", 5, ExperienceLevel::Beginner);
        req.tz_offset_minutes = 13 * 60;
        let goal = Goal::from_request(&req, fixed_now()).unwrap();
        assert_eq!(goal.start(), fixed_now().date_naive() + Duration::days(1));
    }

    #[test]
    fn local_anchor_converts_to_utc() {
        let mut req = request("Tz", 5, ExperienceLevel::Beginner);
        req.tz_offset_minutes = -300;
        let goal = Goal::from_request(&req, fixed_now()).unwrap();
        let anchor = goal.local_anchor(goal.start(), 9);
        assert_eq!(anchor.to_rfc3339(), "2026-03-02T14:00:00+00:00");
    }

    #[test]
    fn window_iterates_every_date() {
        let goal = goal("Window", 6, ExperienceLevel::Beginner);
        let dates: Vec<_> = goal.window.dates().collect();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], goal.start());
        assert_eq!(dates[6], goal.deadline());
        assert_eq!(goal.window.day_index(goal.deadline()), Some(6));
        assert_eq!(goal.window.day_index(goal.deadline() + Duration::days(1)), None);
    }
}
