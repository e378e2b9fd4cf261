//! Plans: types, generation (remote and fallback), extraction and validation.

pub mod extract;
pub mod fallback;
pub mod generate;
pub mod prompt;
pub mod types;
pub mod validate;

pub use extract::{ExtractError, extract_json, parse_embedded};
pub use generate::{
    AttemptFailure, GenerateError, GeneratedPlan, GeneratorConfig, PlanGenerator, PlanSource,
};
pub use types::{DailyPlan, Plan, PlanDraft, ProofMode, StreakHabit, TaskKind, TodayTask};
pub use validate::{ValidationError, validate_draft, validate_plan};
