//! Language learning: vocabulary, listening, speaking practice.

use chrono::Weekday;

use super::{DomainTemplate, Slot, SupportTemplate, WeeklyTemplate, streak, support, week};
use crate::goal::Goal;
use crate::plan::types::{ProofMode, StreakHabit};

pub(crate) struct Language;

impl DomainTemplate for Language {
    fn streaks(&self, _goal: &Goal) -> Vec<StreakHabit> {
        vec![
            streak(
                "Vocabulary drill",
                "Fifteen minutes of spaced-repetition vocabulary.",
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Listen to native audio",
                "A podcast episode or show segment in the target language.",
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Write a short journal entry",
                "Three sentences about your day in the target language.",
                1,
                ProofMode::Flexible,
            ),
        ]
    }

    fn weekly(&self, goal: &Goal) -> Vec<WeeklyTemplate> {
        week(
            goal,
            [
                Slot {
                    title: "Grammar lesson",
                    description: "Study one grammar point and do the exercises.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Speaking practice",
                    description: "Record yourself answering three prompts aloud.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Reading comprehension",
                    description: "Read a short article and note new words.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Conversation exchange",
                    description: "Thirty minutes with a tutor or exchange partner.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Dictation exercise",
                    description: "Transcribe a short audio clip and check it.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Watch an episode without subtitles",
                    description: "Then summarize the plot aloud.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: None,
                },
                Slot {
                    title: "Vocabulary consolidation",
                    description: "Review the week's new words and retire known ones.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: None,
                },
            ],
        )
    }

    fn support(&self, _goal: &Goal) -> Vec<SupportTemplate> {
        vec![support(
            Weekday::Fri,
            "Book next conversation session",
            "Schedule the next tutor or exchange slot.",
            ProofMode::Flexible,
            10,
        )]
    }
}
