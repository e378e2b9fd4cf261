mod config;
mod plan_cmds;
mod tasks_cmds;
#[cfg(test)]
mod test_util;

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use streakplan_core::ExperienceLevel;
use streakplan_core::plan::PlanGenerator;
use streakplan_core::remote::{GenerativeClient, HttpGenerativeClient};
use streakplan_db::pool;

use config::StreakplanConfig;

#[derive(Parser)]
#[command(
    name = "streakplan",
    about = "Turn a goal into a load-budgeted schedule of streaks and daily tasks"
)]
struct Cli {
    /// Database URL (overrides STREAKPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a streakplan config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = streakplan_db::config::DbConfig::DEFAULT_URL)]
        db_url: String,
        /// API key for the remote plan generator
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create and migrate the streakplan database
    DbInit,
    /// Generate and seed the schedule for a new goal
    Plan(PlanArgs),
    /// Ad-hoc tasks on an existing goal
    Tasks {
        #[command(subcommand)]
        command: TasksCommands,
    },
}

#[derive(clap::Args)]
pub struct PlanArgs {
    /// Goal title, e.g. "Run a half marathon"
    #[arg(long)]
    pub title: String,
    /// Last day of the plan (YYYY-MM-DD)
    #[arg(long)]
    pub deadline: NaiveDate,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Category hint used before keyword classification
    #[arg(long)]
    pub category: Option<String>,
    /// beginner, intermediate, or advanced
    #[arg(long, default_value = "beginner")]
    pub experience: ExperienceLevel,
    /// Minutes east of UTC
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub tz_offset: i32,
    /// Owner ID (random if omitted)
    #[arg(long)]
    pub owner: Option<Uuid>,
    /// Goal ID (random if omitted)
    #[arg(long)]
    pub goal: Option<Uuid>,
    /// Plan in memory and print the schedule instead of writing to the database
    #[arg(long)]
    pub dry_run: bool,
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum TasksCommands {
    /// Add one task to a date, subject to dedup and the daily load budget
    Add {
        #[arg(long)]
        goal: Uuid,
        #[arg(long)]
        owner: Uuid,
        /// Date to schedule on (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Task load, 1 to 3
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
        load: u8,
        /// Streak load on the date (summed from stored streak rows if omitted)
        #[arg(long)]
        streak_load: Option<u32>,
        /// Last date of the goal (latest stored date if omitted)
        #[arg(long)]
        deadline: Option<NaiveDate>,
        /// Minutes east of UTC
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        tz_offset: i32,
    },
    /// List the scheduled rows of a goal
    List {
        #[arg(long)]
        goal: Uuid,
        /// Only rows on this date
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

/// Execute the `streakplan init` command: write config file.
fn cmd_init(db_url: &str, api_key: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let has_key = api_key.is_some();
    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        generator: config::GeneratorSection {
            api_key,
            ..config::GeneratorSection::default()
        },
    };

    config::save_config_to(&cfg, &path)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  generator.model = {}", cfg.generator.model);
    if !has_key {
        println!("  generator.api_key not set: plans will use built-in templates");
    }
    println!();
    println!("Next: run `streakplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `streakplan db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = StreakplanConfig::resolve(cli_db_url)?;

    println!("Initializing streakplan database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("streakplan db-init complete.");
    Ok(())
}

/// Build the plan generator from resolved config; without an API key the
/// generator only uses template fallback.
pub fn build_generator(resolved: &StreakplanConfig) -> anyhow::Result<PlanGenerator> {
    let client = match &resolved.remote {
        Some(remote) => {
            let http = HttpGenerativeClient::new(remote.clone())
                .context("failed to build remote generator client")?;
            tracing::info!(base_url = %remote.base_url, model = %remote.model, "remote generator enabled");
            Some(Arc::new(http) as Arc<dyn GenerativeClient>)
        }
        None => {
            tracing::info!("no API key configured, using template fallback only");
            None
        }
    };
    Ok(PlanGenerator::new(client, resolved.generator))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            api_key,
            force,
        } => cmd_init(&db_url, api_key, force),
        Commands::DbInit => cmd_db_init(cli.database_url.as_deref()).await,
        Commands::Plan(args) => {
            let resolved = StreakplanConfig::resolve(cli.database_url.as_deref())?;
            plan_cmds::run_plan(args, &resolved).await
        }
        Commands::Tasks { command } => {
            let resolved = StreakplanConfig::resolve(cli.database_url.as_deref())?;
            tasks_cmds::run_tasks(command, &resolved).await
        }
    }
}
