//! Endurance events: base mileage, intervals, a long session each week.

use chrono::Weekday;

use super::{DomainTemplate, Slot, SupportTemplate, WeeklyTemplate, streak, support, week};
use crate::goal::Goal;
use crate::plan::types::{ProofMode, StreakHabit};

pub(crate) struct Endurance;

impl DomainTemplate for Endurance {
    fn streaks(&self, _goal: &Goal) -> Vec<StreakHabit> {
        vec![
            streak(
                "Hydration check",
                "Drink at least two litres of water.",
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Foam rolling",
                "Ten minutes on calves, quads and glutes.",
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Log resting heart rate",
                "Measure and record after waking.",
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Core stability routine",
                "Planks, dead bugs and bridges.",
                2,
                ProofMode::Flexible,
            ),
        ]
    }

    fn weekly(&self, goal: &Goal) -> Vec<WeeklyTemplate> {
        week(
            goal,
            [
                Slot {
                    title: "Rest and mobility",
                    description: "No training load. Light stretching only.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: None,
                },
                Slot {
                    title: "Interval session",
                    description: "Warm up, then repeats at target pace with equal recovery.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Easy aerobic session",
                    description: "Conversational pace for 30 to 45 minutes.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 20,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Tempo session",
                    description: "Sustained comfortably hard effort in the middle block.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Strength for endurance",
                    description: "Single-leg work, step-ups and hip stability.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Long session",
                    description: "The week's longest effort at easy pace.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 30,
                    peak_xp: Some(40),
                },
                Slot {
                    title: "Recovery session",
                    description: "Short and very easy to flush the legs.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: None,
                },
            ],
        )
    }

    fn support(&self, _goal: &Goal) -> Vec<SupportTemplate> {
        vec![
            support(
                Weekday::Thu,
                "Check gear and shoes",
                "Inspect shoe wear and prepare kit for the long session.",
                ProofMode::Flexible,
                10,
            ),
            support(
                Weekday::Sat,
                "Practice race-day fuelling",
                "Test the gels or snacks you plan to use on the day.",
                ProofMode::Flexible,
                10,
            ),
        ]
    }
}
