//! Instrument practice: technique, repertoire, recorded run-throughs.

use chrono::Weekday;

use super::{DomainTemplate, Slot, SupportTemplate, WeeklyTemplate, streak, support, week};
use crate::goal::Goal;
use crate::plan::types::{ProofMode, StreakHabit};

pub(crate) struct Instrument;

impl DomainTemplate for Instrument {
    fn streaks(&self, _goal: &Goal) -> Vec<StreakHabit> {
        vec![
            streak(
                "Scales and warm-up",
                "Ten minutes of scales or technical exercises.",
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Daily practice session",
                "Twenty focused minutes on the current piece.",
                2,
                ProofMode::Flexible,
            ),
            streak(
                "Ear training",
                "Five minutes of interval or chord recognition.",
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
                    title: "Learn a new passage",
                    description: "Work the next eight bars slowly, hands separate if needed.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Technique focus",
                    description: "Isolate the hardest technical spot and drill it.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Sight-reading practice",
                    description: "Read through unfamiliar material at a steady tempo.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Metronome tempo push",
                    description: "Raise the tempo of a learned section by a few beats.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Repertoire review",
                    description: "Play through previously learned pieces.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Record a full play-through",
                    description: "Record the piece start to finish and listen back.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Listen to reference recordings",
                    description: "Compare two professional interpretations.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: None,
                },
            ],
        )
    }

    fn support(&self, _goal: &Goal) -> Vec<SupportTemplate> {
        vec![support(
            Weekday::Sat,
            "Instrument maintenance",
            "Clean the instrument and check strings, reeds or tuning.",
            ProofMode::Flexible,
            10,
        )]
    }
}
