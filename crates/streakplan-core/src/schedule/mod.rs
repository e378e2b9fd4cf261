//! Turning a validated plan into dated rows under the daily budget.

pub mod expand;
pub mod governor;
pub mod title;

pub use expand::{DeferredTask, Expansion, ExpansionReport, RowContext, expand};
pub use governor::{
    DayLedger, DayOutcome, GovernReport, RejectedTask, Rejection, govern_day, govern_plan,
};
pub use title::{is_duplicate, normalize_title};
