//! Catch-all template built around the goal's own title.

use chrono::Weekday;

use super::{DomainTemplate, Slot, SupportTemplate, WeeklyTemplate, streak, support, week};
use crate::goal::Goal;
use crate::plan::types::{ProofMode, StreakHabit};

pub(crate) struct Generic;

impl DomainTemplate for Generic {
    fn streaks(&self, goal: &Goal) -> Vec<StreakHabit> {
        vec![
            streak(
                "Daily focus session",
                format!("Twenty minutes of uninterrupted work on: {}.", goal.title),
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Evening reflection",
                "Note what moved forward today and what is blocked.",
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Plan tomorrow's first step",
                "Write down the very next concrete action.",
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
                    title: "Set weekly objectives",
                    description: "Pick up to three outcomes for this week.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Deep work block",
                    description: "Ninety minutes on the hardest open item.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Research and learning",
                    description: "Read or watch material that unblocks the next step.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Build session",
                    description: "Produce something tangible toward the goal.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Share progress with someone",
                    description: "Show a friend or mentor where things stand.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Catch-up block",
                    description: "Finish anything that slipped during the week.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: None,
                },
                Slot {
                    title: "Rest and recharge",
                    description: "A light day. Tidy up loose ends only.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: None,
                },
            ],
        )
    }

    fn support(&self, _goal: &Goal) -> Vec<SupportTemplate> {
        vec![support(
            Weekday::Wed,
            "Tidy workspace and tools",
            "Clear clutter and organize files and materials.",
            ProofMode::Flexible,
            10,
        )]
    }
}
