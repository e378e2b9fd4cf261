//! Postgres persistence for streakplan schedules: row models, connection
//! pool, embedded migrations, and the `goal_tasks` queries.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
