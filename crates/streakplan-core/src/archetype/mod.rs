//! Archetype classification and the per-domain template modules.
//!
//! [`classify`] maps a goal to one [`Archetype`] with an ordered list of
//! keyword rules. Each archetype resolves to a [`DomainTemplate`] that
//! supplies streak candidates, a weekday task rotation, and support tasks.
//! Adding a domain means adding a variant, a rule, and a module.

mod endurance;
mod exam_study;
mod generic;
mod instrument;
mod language;
mod muscle_gain;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::Weekday;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::goal::{ExperienceLevel, Goal};
use crate::plan::types::{ProofMode, StreakHabit, load_for_xp};

// ---------------------------------------------------------------------------
// Archetype
// ---------------------------------------------------------------------------

/// Closed set of goal domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    MuscleGain,
    ExamStudy,
    Language,
    Instrument,
    Endurance,
    Generic,
}

impl Archetype {
    pub const ALL: [Archetype; 6] = [
        Self::MuscleGain,
        Self::ExamStudy,
        Self::Language,
        Self::Instrument,
        Self::Endurance,
        Self::Generic,
    ];

    /// Template module backing this archetype.
    pub fn template(self) -> &'static dyn DomainTemplate {
        match self {
            Self::MuscleGain => &muscle_gain::MuscleGain,
            Self::ExamStudy => &exam_study::ExamStudy,
            Self::Language => &language::Language,
            Self::Instrument => &instrument::Instrument,
            Self::Endurance => &endurance::Endurance,
            Self::Generic => &generic::Generic,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MuscleGain => "muscle_gain",
            Self::ExamStudy => "exam_study",
            Self::Language => "language",
            Self::Instrument => "instrument",
            Self::Endurance => "endurance",
            Self::Generic => "generic",
        };
        f.write_str(s)
    }
}

impl FromStr for Archetype {
    type Err = ArchetypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|a| a.to_string() == key)
            .ok_or_else(|| ArchetypeParseError(s.to_owned()))
    }
}

/// Error returned when parsing an unknown archetype key.
#[derive(Debug, Clone, Error)]
#[error("unknown archetype: {0:?}")]
pub struct ArchetypeParseError(pub String);

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Rules evaluated top-down; the first match wins.
const RULES: &[(Archetype, &str)] = &[
    (
        Archetype::Endurance,
        r"\b(marathon|half[- ]?marathon|triathlon|ultra(marathon)?|ironman|duathlon|5k|10k|running|runner|run|jog(ging)?|cycling|cyclist|bike|swim(ming)?|endurance|race|hike|hiking|rowing)\b",
    ),
    (
        Archetype::MuscleGain,
        r"\b(muscle|muscles|bulk(ing)?|strength|strong(er)?|gym|lift(ing)?|weightlifting|powerlifting|bench|squat|deadlift|hypertrophy|gain (weight|mass)|physique|pull-?ups?|push-?ups?)\b",
    ),
    (
        Archetype::Language,
        r"\b(language|spanish|french|german|italian|portuguese|japanese|mandarin|chinese|korean|arabic|russian|hindi|dutch|fluent|fluency|vocabulary|grammar|jlpt|hsk|delf|dele|topik)\b",
    ),
    (
        Archetype::Instrument,
        r"\b(guitar|piano|violin|viola|cello|drums?|ukulele|bass|saxophone|sax|flute|trumpet|clarinet|keyboard|singing|vocals?|instrument|chords?|music)\b",
    ),
    (
        Archetype::ExamStudy,
        r"\b(exams?|test|sat|gre|gmat|lsat|mcat|ielts|toefl|certification|certified|finals|midterms?|study|studying|revise|revision|coursework|thesis)\b",
    ),
];

static COMPILED_RULES: LazyLock<Vec<(Archetype, Regex)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|(archetype, pattern)| {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("classifier rule patterns are valid");
            (*archetype, re)
        })
        .collect()
});

/// Classify a goal by its title, description and optional category.
///
/// A category that names an archetype (e.g. `"endurance"`) short-circuits the
/// keyword rules. No match is a valid outcome and yields [`Archetype::Generic`].
pub fn classify(title: &str, description: &str, category: Option<&str>) -> Archetype {
    if let Some(archetype) = category.and_then(|c| c.parse::<Archetype>().ok()) {
        return archetype;
    }

    let haystack = format!("{title}\n{description}\n{}", category.unwrap_or_default());
    COMPILED_RULES
        .iter()
        .find(|(_, re)| re.is_match(&haystack))
        .map(|(archetype, _)| *archetype)
        .unwrap_or(Archetype::Generic)
}

/// Convenience wrapper over [`classify`] for a normalized goal.
pub fn classify_goal(goal: &Goal) -> Archetype {
    classify(&goal.title, &goal.description, goal.category.as_deref())
}

// ---------------------------------------------------------------------------
// Template contract
// ---------------------------------------------------------------------------

/// One weekday slot in an archetype's weekly rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyTemplate {
    pub weekday: Weekday,
    pub title: String,
    pub description: String,
    pub proof_mode: ProofMode,
    pub base_xp: u32,
    /// XP used on peak-phase days; `None` means peak days reuse `base_xp`.
    pub peak_xp: Option<u32>,
}

impl WeeklyTemplate {
    pub fn xp(&self, peak: bool) -> u32 {
        if peak {
            self.peak_xp.unwrap_or(self.base_xp)
        } else {
            self.base_xp
        }
    }

    pub fn load(&self, peak: bool) -> u8 {
        load_for_xp(self.xp(peak))
    }
}

/// A lower-frequency maintenance task, tagged with the weekday it runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportTemplate {
    pub weekday: Weekday,
    pub title: String,
    pub description: String,
    pub proof_mode: ProofMode,
    pub xp: u32,
}

impl SupportTemplate {
    pub fn load(&self) -> u8 {
        load_for_xp(self.xp)
    }
}

/// Content source for one archetype.
pub trait DomainTemplate: Sync {
    /// One to four streak habit candidates, most important first.
    fn streaks(&self, goal: &Goal) -> Vec<StreakHabit>;

    /// Exactly seven templates, Monday through Sunday.
    fn weekly(&self, goal: &Goal) -> Vec<WeeklyTemplate>;

    /// Maintenance tasks; at most one per weekday.
    fn support(&self, goal: &Goal) -> Vec<SupportTemplate>;
}

// ---------------------------------------------------------------------------
// Helpers shared by the template modules
// ---------------------------------------------------------------------------

/// Compact row used by template modules to describe one weekday.
pub(crate) struct Slot {
    pub title: &'static str,
    pub description: &'static str,
    pub proof_mode: ProofMode,
    pub base_xp: u32,
    pub peak_xp: Option<u32>,
}

/// XP bonus applied to weekly templates for advanced goals.
const ADVANCED_XP_BONUS: u32 = 10;

/// Expand seven slots into Monday..Sunday templates, scaled to experience.
pub(crate) fn week(goal: &Goal, slots: [Slot; 7]) -> Vec<WeeklyTemplate> {
    let bonus = match goal.experience {
        ExperienceLevel::Advanced => ADVANCED_XP_BONUS,
        ExperienceLevel::Beginner | ExperienceLevel::Intermediate => 0,
    };

    let mut weekday = Weekday::Mon;
    slots
        .into_iter()
        .map(|slot| {
            let template = WeeklyTemplate {
                weekday,
                title: slot.title.to_string(),
                description: slot.description.to_string(),
                proof_mode: slot.proof_mode,
                base_xp: slot.base_xp + bonus,
                peak_xp: slot.peak_xp.map(|xp| xp + bonus),
            };
            weekday = weekday.succ();
            template
        })
        .collect()
}

pub(crate) fn streak(
    title: impl Into<String>,
    description: impl Into<String>,
    load: u8,
    proof_mode: ProofMode,
) -> StreakHabit {
    StreakHabit {
        title: title.into(),
        description: description.into(),
        load,
        proof_mode,
    }
}

pub(crate) fn support(
    weekday: Weekday,
    title: &str,
    description: &str,
    proof_mode: ProofMode,
    xp: u32,
) -> SupportTemplate {
    SupportTemplate {
        weekday,
        title: title.to_string(),
        description: description.to_string(),
        proof_mode,
        xp,
    }
}
