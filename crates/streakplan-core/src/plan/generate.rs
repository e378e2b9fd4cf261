//! Plan generation: bounded remote attempts, then deterministic fallback.
//!
//! Remote problems never reach the caller. Every failed attempt is recorded
//! as an [`AttemptFailure`] and logged; once attempts run out the plan is
//! synthesized from archetype templates.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::extract::{ExtractError, parse_embedded};
use super::fallback;
use super::prompt::{PromptContext, build_prompt, system_prompt};
use super::types::{Plan, PlanDraft};
use super::validate::{ValidationError, validate_draft};
use crate::archetype::{Archetype, classify_goal};
use crate::goal::Goal;
use crate::remote::{DEFAULT_MODEL_MAX_OUTPUT_TOKENS, GenerationRequest, GenerativeClient, RemoteError};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_TOKENS: u32 = DEFAULT_MODEL_MAX_OUTPUT_TOKENS;

/// Tuning for the remote strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Which strategy produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Remote,
    Fallback,
}

impl fmt::Display for PlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        })
    }
}

/// Why one remote attempt did not yield a plan.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("plan failed validation: {0}")]
    Invalid(#[from] ValidationError),
}

impl AttemptFailure {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Remote(e) => e.reason(),
            Self::Extract(e) => e.reason(),
            Self::Invalid(e) => e.reason(),
        }
    }
}

/// Terminal generation failure: the deterministic path itself is broken.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("fallback plan failed validation: {0}")]
    Fallback(#[source] ValidationError),
}

/// A valid plan plus how it was obtained.
#[derive(Debug)]
pub struct GeneratedPlan {
    pub plan: Plan,
    pub archetype: Archetype,
    pub source: PlanSource,
    /// Remote attempts made, successful or not.
    pub attempts: u32,
    pub failures: Vec<AttemptFailure>,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

pub struct PlanGenerator {
    client: Option<Arc<dyn GenerativeClient>>,
    config: GeneratorConfig,
}

impl PlanGenerator {
    pub fn new(client: Option<Arc<dyn GenerativeClient>>, config: GeneratorConfig) -> Self {
        Self { client, config }
    }

    /// Generator that never calls out.
    pub fn fallback_only() -> Self {
        Self::new(None, GeneratorConfig::default())
    }

    pub fn has_remote(&self) -> bool {
        self.client.is_some()
    }

    /// Produce a plan for `goal`.
    pub async fn generate(&self, goal: &Goal) -> Result<GeneratedPlan, GenerateError> {
        let archetype = classify_goal(goal);
        let mut failures: Vec<AttemptFailure> = Vec::new();
        let mut attempts = 0;

        if let Some(client) = &self.client {
            while attempts < self.config.max_attempts {
                attempts += 1;
                let previous = failures.last().map(|f| f.to_string());
                let ctx = PromptContext {
                    goal,
                    archetype,
                    previous_failure: previous.as_deref(),
                };

                match self.attempt(client.as_ref(), goal, &ctx).await {
                    Ok(plan) => {
                        info!(attempt = attempts, %archetype, "remote plan accepted");
                        return Ok(GeneratedPlan {
                            plan,
                            archetype,
                            source: PlanSource::Remote,
                            attempts,
                            failures,
                        });
                    }
                    Err(failure) => {
                        warn!(
                            attempt = attempts,
                            reason = failure.reason(),
                            error = %failure,
                            "remote plan attempt failed"
                        );
                        failures.push(failure);
                    }
                }
            }
        }

        let plan = fallback::synthesize(goal, archetype).map_err(|e| {
            warn!(reason = e.reason(), error = %e, "fallback plan failed validation");
            GenerateError::Fallback(e)
        })?;
        info!(attempts, %archetype, "using fallback plan");
        Ok(GeneratedPlan {
            plan,
            archetype,
            source: PlanSource::Fallback,
            attempts,
            failures,
        })
    }

    async fn attempt(
        &self,
        client: &dyn GenerativeClient,
        goal: &Goal,
        ctx: &PromptContext<'_>,
    ) -> Result<Plan, AttemptFailure> {
        let request = GenerationRequest {
            system: system_prompt().to_string(),
            prompt: build_prompt(ctx),
            max_tokens: self.config.max_tokens,
        };

        let text = tokio::time::timeout(self.config.attempt_timeout, client.generate(request))
            .await
            .map_err(|_| RemoteError::Timeout(self.config.attempt_timeout))??;

        let draft: PlanDraft = parse_embedded(&text)?;
        Ok(validate_draft(&draft, &goal.window)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::goal::ExperienceLevel;
    use crate::goal::test_support::goal;

    /// Replays canned responses and records the prompts it saw.
    struct Scripted {
        responses: Mutex<Vec<Result<String, RemoteError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<String, RemoteError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerativeClient for Scripted {
        async fn generate(&self, request: GenerationRequest) -> Result<String, RemoteError> {
            self.prompts.lock().unwrap().push(request.prompt);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(RemoteError::EmptyResponse))
        }
    }

    struct Stalls;

    #[async_trait]
    impl GenerativeClient for Stalls {
        async fn generate(&self, _request: GenerationRequest) -> Result<String, RemoteError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(RemoteError::EmptyResponse)
        }
    }

    fn valid_remote_json(g: &Goal) -> String {
        let plan = fallback::synthesize(g, Archetype::Generic).unwrap();
        format!(
            "Here you go:\n```json\n{}\n```",
            serde_json::to_string_pretty(&PlanDraft::from(&plan)).unwrap()
        )
    }

    #[test]
    fn default_token_budget_fits_default_model() {
        assert!(GeneratorConfig::default().max_tokens <= DEFAULT_MODEL_MAX_OUTPUT_TOKENS);
    }

    #[tokio::test]
    async fn no_client_goes_straight_to_fallback() {
        let g = goal("Declutter the garage", 6, ExperienceLevel::Beginner);
        let generated = PlanGenerator::fallback_only().generate(&g).await.unwrap();
        assert_eq!(generated.source, PlanSource::Fallback);
        assert_eq!(generated.attempts, 0);
        assert!(generated.failures.is_empty());
    }

    #[tokio::test]
    async fn valid_remote_plan_is_used() {
        let g = goal("Declutter the garage", 6, ExperienceLevel::Beginner);
        let client = Scripted::new(vec![Ok(valid_remote_json(&g))]);
        let generator = PlanGenerator::new(Some(client.clone()), GeneratorConfig::default());

        let generated = generator.generate(&g).await.unwrap();
        assert_eq!(generated.source, PlanSource::Remote);
        assert_eq!(generated.attempts, 1);
        assert_eq!(generated.plan.daily_plan.len(), 7);
    }

    #[tokio::test]
    async fn unparsable_responses_exhaust_attempts_then_fall_back() {
        let g = goal("Run my first marathon", 20, ExperienceLevel::Intermediate);
        let client = Scripted::new(vec![
            Ok("I cannot help with that.".into()),
            Ok("{\"streak_habits\": [".into()),
        ]);
        let generator = PlanGenerator::new(Some(client.clone()), GeneratorConfig::default());

        let generated = generator.generate(&g).await.unwrap();
        assert_eq!(generated.source, PlanSource::Fallback);
        assert_eq!(generated.attempts, 2);
        assert_eq!(generated.archetype, Archetype::Endurance);
        let reasons: Vec<_> = generated.failures.iter().map(AttemptFailure::reason).collect();
        assert_eq!(reasons, vec!["no_json", "unbalanced_json"]);

        let prompts = client.prompts.lock().unwrap();
        assert!(!prompts[0].contains("Previous Attempt"));
        assert!(prompts[1].contains("no JSON object or array found"));
    }

    #[tokio::test]
    async fn invalid_plan_is_retried() {
        let g = goal("Declutter the garage", 2, ExperienceLevel::Beginner);
        // Right shape, wrong window.
        let short = goal("Declutter the garage", 1, ExperienceLevel::Beginner);
        let client = Scripted::new(vec![Ok(valid_remote_json(&short)), Ok(valid_remote_json(&g))]);
        let generator = PlanGenerator::new(Some(client), GeneratorConfig::default());

        let generated = generator.generate(&g).await.unwrap();
        assert_eq!(generated.source, PlanSource::Remote);
        assert_eq!(generated.attempts, 2);
        assert_eq!(generated.failures[0].reason(), "missing_date");
    }

    #[tokio::test]
    async fn transport_errors_count_as_attempts() {
        let g = goal("Declutter the garage", 3, ExperienceLevel::Beginner);
        let client = Scripted::new(vec![
            Err(RemoteError::Api {
                status: 500,
                message: "boom".into(),
            }),
            Err(RemoteError::EmptyResponse),
        ]);
        let config = GeneratorConfig {
            max_attempts: 2,
            ..GeneratorConfig::default()
        };
        let generated = PlanGenerator::new(Some(client), config)
            .generate(&g)
            .await
            .unwrap();
        assert_eq!(generated.source, PlanSource::Fallback);
        assert_eq!(generated.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_counts_as_failed_attempt() {
        let g = goal("Declutter the garage", 3, ExperienceLevel::Beginner);
        let config = GeneratorConfig {
            max_attempts: 1,
            attempt_timeout: Duration::from_secs(5),
            ..GeneratorConfig::default()
        };
        let generated = PlanGenerator::new(Some(Arc::new(Stalls)), config)
            .generate(&g)
            .await
            .unwrap();
        assert_eq!(generated.source, PlanSource::Fallback);
        assert_eq!(generated.attempts, 1);
        assert_eq!(generated.failures[0].reason(), "timeout");
    }
}
