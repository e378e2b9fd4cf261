//! Strength and hypertrophy goals: split training week, protein habit.

use chrono::Weekday;

use super::{DomainTemplate, Slot, SupportTemplate, WeeklyTemplate, streak, support, week};
use crate::goal::Goal;
use crate::plan::types::{ProofMode, StreakHabit};

pub(crate) struct MuscleGain;

impl DomainTemplate for MuscleGain {
    fn streaks(&self, _goal: &Goal) -> Vec<StreakHabit> {
        vec![
            streak(
                "Hit daily protein target",
                "Log protein intake and reach the day's target.",
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Mobility and stretching",
                "Ten minutes of mobility work for hips and shoulders.",
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Sleep eight hours",
                "Lights out on time to support recovery.",
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Log bodyweight",
                "Step on the scale after waking and record it.",
                1,
                ProofMode::Realtime,
            ),
        ]
    }

    fn weekly(&self, goal: &Goal) -> Vec<WeeklyTemplate> {
        week(
            goal,
            [
                Slot {
                    title: "Upper body push session",
                    description: "Bench, overhead press and dips. Add weight where form allows.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Lower body squat session",
                    description: "Squats, lunges and calf raises.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Active recovery walk",
                    description: "Thirty minutes of easy walking.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: None,
                },
                Slot {
                    title: "Upper body pull session",
                    description: "Rows, pull-ups and curls.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Lower body hinge session",
                    description: "Deadlifts, hip thrusts and hamstring curls.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Accessory and core circuit",
                    description: "Lighter accessory lifts plus planks and carries.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Plan next week's training",
                    description: "Review logged lifts and set next week's targets.",
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
                Weekday::Sun,
                "Meal prep for the week",
                "Cook protein-heavy meals for the next few days.",
                ProofMode::Realtime,
                10,
            ),
            support(
                Weekday::Wed,
                "Take progress photos",
                "Front, side and back photos in the same lighting.",
                ProofMode::Realtime,
                10,
            ),
        ]
    }
}
