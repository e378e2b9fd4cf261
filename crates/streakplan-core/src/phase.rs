//! Training phases over a goal window.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Windows shorter than this get three phases instead of four.
pub const LONG_PLAN_DAYS: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Foundation,
    Build,
    Peak,
    Deload,
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Foundation => "foundation",
            Self::Build => "build",
            Self::Peak => "peak",
            Self::Deload => "deload",
        };
        f.write_str(s)
    }
}

/// A contiguous, inclusive date range with one training intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: PhaseName,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Phase {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> u32 {
        ((self.end - self.start).num_days() + 1) as u32
    }
}

const SHORT_SHARES: &[(PhaseName, u32)] = &[
    (PhaseName::Foundation, 40),
    (PhaseName::Build, 40),
    (PhaseName::Peak, 20),
];

const LONG_SHARES: &[(PhaseName, u32)] = &[
    (PhaseName::Foundation, 25),
    (PhaseName::Build, 50),
    (PhaseName::Peak, 20),
    (PhaseName::Deload, 5),
];

/// Split `[start, deadline]` into contiguous phases.
///
/// Lengths are floor(total × share), at least one day each. The last phase
/// absorbs whatever rounding leaves over. When the window has fewer days than
/// phases, only the leading phases are produced. Returns an empty list if
/// `deadline` precedes `start`.
pub fn design_phases(start: NaiveDate, deadline: NaiveDate) -> Vec<Phase> {
    if deadline < start {
        return Vec::new();
    }
    let total = ((deadline - start).num_days() + 1) as u32;
    let shares = if total < LONG_PLAN_DAYS {
        SHORT_SHARES
    } else {
        LONG_SHARES
    };
    let count = shares.len().min(total as usize);

    let mut phases = Vec::with_capacity(count);
    let mut cursor = start;
    let mut used = 0u32;
    for (i, (name, share)) in shares.iter().take(count).enumerate() {
        let phases_after = (count - i - 1) as u32;
        let len = if phases_after == 0 {
            total - used
        } else {
            // Leave at least one day for each phase still to come.
            (total * share / 100).max(1).min(total - used - phases_after)
        };
        let end = cursor + Duration::days(i64::from(len) - 1);
        phases.push(Phase {
            name: *name,
            start: cursor,
            end,
        });
        used += len;
        cursor = end + Duration::days(1);
    }
    phases
}

/// The phase containing `date`, or the last phase if none does.
pub fn phase_for_date(phases: &[Phase], date: NaiveDate) -> Option<&Phase> {
    phases
        .iter()
        .find(|p| p.contains(date))
        .or_else(|| phases.last())
}
