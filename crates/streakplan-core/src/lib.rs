//! Goal-to-schedule planning engine.
//!
//! A goal is classified into an [`archetype::Archetype`], turned into a
//! [`plan::Plan`] (remote generator first, template fallback second),
//! governed and expanded into dated rows, and seeded into a
//! [`seed::TaskStore`] in one batch.

pub mod archetype;
pub mod engine;
pub mod goal;
pub mod phase;
pub mod plan;
pub mod remote;
pub mod schedule;
pub mod seed;

pub use engine::{AddTasksOutcome, AddTasksRequest, PlanSummary, PlanningEngine, PlanningError};
pub use goal::{ExperienceLevel, Goal, GoalError, GoalRequest};
