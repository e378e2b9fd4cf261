//! Prompt construction for the remote plan generator.
//!
//! Pure string assembly: goal context, the JSON schema the response must
//! follow, and the numeric rules the validator will enforce.

use crate::archetype::Archetype;
use crate::goal::Goal;
use crate::plan::types::{
    DAILY_LOAD_BUDGET, MAX_LOAD, MAX_STREAK_LOAD, MAX_STREAKS, MAX_TODAY_TASKS_PER_DAY, MIN_LOAD,
    MIN_STREAKS,
};

/// Context assembled for one generation attempt.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub goal: &'a Goal,
    pub archetype: Archetype,
    /// Failure reason from the previous attempt, if this is a retry.
    pub previous_failure: Option<&'a str>,
}

const SYSTEM_PROMPT: &str = "You are a coaching planner. You turn one personal goal into a \
day-by-day schedule of small, achievable tasks. You respond with a single JSON object and \
nothing else.";

const SCHEMA_REFERENCE: &str = r#"## Response Schema

```json
{
  "streak_habits": [
    {"title": "string", "description": "string", "load": 1, "proof_mode": "flexible"}
  ],
  "daily_plan": [
    {
      "date": "YYYY-MM-DD",
      "tasks": [
        {"title": "string", "description": "string", "load": 2, "proof_mode": "realtime"}
      ]
    }
  ]
}
```

`proof_mode` is `realtime` (photo taken at the moment) or `flexible` (any evidence, any time).
"#;

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Build the user prompt for one attempt.
pub fn build_prompt(ctx: &PromptContext<'_>) -> String {
    let goal = ctx.goal;
    let mut prompt = String::with_capacity(2048);

    prompt.push_str("# Goal\n\n");
    prompt.push_str(&format!("- **Title:** {}\n", goal.title));
    if !goal.description.is_empty() {
        prompt.push_str(&format!("- **Description:** {}\n", goal.description));
    }
    prompt.push_str(&format!("- **Domain:** {}\n", ctx.archetype));
    prompt.push_str(&format!("- **Experience:** {}\n", goal.experience));
    prompt.push_str(&format!("- **Start date:** {}\n", goal.start()));
    prompt.push_str(&format!("- **Deadline:** {}\n", goal.deadline()));
    prompt.push_str(&format!("- **Total days:** {}\n", goal.total_days()));
    prompt.push_str(&format!(
        "- **Timezone offset:** {} minutes from UTC\n\n",
        goal.tz_offset_minutes
    ));

    prompt.push_str(SCHEMA_REFERENCE);
    prompt.push('\n');

    prompt.push_str("## Rules\n\n");
    prompt.push_str(&format!(
        "- {MIN_STREAKS} to {MAX_STREAKS} streak habits, each with load {MIN_LOAD}-{MAX_STREAK_LOAD}. \
         Streak habits repeat every day.\n"
    ));
    prompt.push_str(&format!(
        "- `daily_plan` has exactly one entry per date from {} to {} inclusive, in order. \
         Use an empty `tasks` array for rest days.\n",
        goal.start(),
        goal.deadline()
    ));
    prompt.push_str(&format!(
        "- At most {MAX_TODAY_TASKS_PER_DAY} tasks per date, each with load {MIN_LOAD}-{MAX_LOAD}.\n"
    ));
    prompt.push_str(&format!(
        "- On every date, the streak loads plus that date's task loads must not exceed {DAILY_LOAD_BUDGET}.\n"
    ));
    prompt.push_str("- Titles are non-empty and unique within a date. Streak titles are unique.\n");
    prompt.push_str("- Build gradually: lighter early days, the hardest work before the final week.\n");

    if let Some(reason) = ctx.previous_failure {
        prompt.push_str("\n## Previous Attempt\n\n");
        prompt.push_str(&format!(
            "The previous response was rejected: {reason}. Fix this and return the full plan again.\n"
        ));
    }

    prompt.push_str("\nRespond with the JSON object only.\n");
    prompt
}
