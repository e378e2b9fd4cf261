//! Exam preparation: topic blocks, practice papers, spaced review.

use chrono::Weekday;

use super::{DomainTemplate, Slot, SupportTemplate, WeeklyTemplate, streak, support, week};
use crate::goal::Goal;
use crate::plan::types::{ProofMode, StreakHabit};

pub(crate) struct ExamStudy;

impl DomainTemplate for ExamStudy {
    fn streaks(&self, goal: &Goal) -> Vec<StreakHabit> {
        vec![
            streak(
                "Flashcard review",
                format!("Clear today's due flashcards for {}.", goal.title),
                1,
                ProofMode::Flexible,
            ),
            streak(
                "Focused study block",
                "One distraction-free 45 minute block.",
                2,
                ProofMode::Flexible,
            ),
            streak(
                "Summarize one concept",
                "Write a short summary of something learned today.",
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
                    title: "Study new topic",
                    description: "Work through the next unit in the syllabus.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Practice problem set",
                    description: "Solve problems on this week's topics without notes.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Review weak areas",
                    description: "Revisit topics with the lowest practice scores.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 10,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Study second topic",
                    description: "Cover the next unit and make notes.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: Some(20),
                },
                Slot {
                    title: "Timed practice questions",
                    description: "Answer questions under exam timing.",
                    proof_mode: ProofMode::Flexible,
                    base_xp: 20,
                    peak_xp: Some(30),
                },
                Slot {
                    title: "Full mock exam",
                    description: "Sit a complete past paper in exam conditions.",
                    proof_mode: ProofMode::Realtime,
                    base_xp: 30,
                    peak_xp: Some(40),
                },
                Slot {
                    title: "Mark mock and log errors",
                    description: "Grade the mock and record every mistake by topic.",
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
                Weekday::Mon,
                "Organize notes and materials",
                "File the week's notes and restock supplies.",
                ProofMode::Flexible,
                10,
            ),
            support(
                Weekday::Thu,
                "Check exam logistics",
                "Confirm date, location and permitted materials.",
                ProofMode::Flexible,
                10,
            ),
        ]
    }
}
