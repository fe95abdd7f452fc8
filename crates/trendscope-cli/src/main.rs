mod commands;
mod watch;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use trendscope_core::CheckpointHour;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "trendscope")]
#[command(about = "Snapshot scheduling and trending filter for tracked videos")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Queue capture tasks for every recently published video
    Schedule {
        /// Override the active window in hours (1-168)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=168))]
        window_hours: Option<u32>,

        /// Report what would be queued without writing the task ledger
        #[arg(long)]
        dry_run: bool,
    },
    /// Cancel queued capture tasks for a video
    Cancel {
        video_id: Uuid,

        /// Cancel only this checkpoint instead of all of them
        #[arg(long, value_parser = parse_checkpoint)]
        hour: Option<CheckpointHour>,
    },
    /// List queued capture tasks
    Tasks {
        /// Restrict the listing to one video
        #[arg(long)]
        video: Option<Uuid>,
    },
    /// Record a snapshot of externally measured counts
    Capture {
        video_id: Uuid,

        #[arg(value_parser = parse_checkpoint)]
        hour: CheckpointHour,

        #[arg(long)]
        views: i64,

        #[arg(long, default_value_t = 0)]
        likes: i64,

        #[arg(long, default_value_t = 0)]
        subscriptions: i64,

        /// Snapshot source: websub, task or manual
        #[arg(long, default_value = "manual")]
        source: String,
    },
    /// Show captured snapshots for a video
    History { video_id: Uuid },
    /// Print the generated pattern for keywords, or for every catalog group
    Pattern {
        keywords: Vec<String>,

        /// Build a lenient single-name pattern instead of a keyword group
        #[arg(long, conflicts_with = "keywords")]
        name: Option<String>,
    },
    /// Classify one title against the keyword catalog
    Filter { title: String },
    /// Classify every trending candidate against the keyword catalog
    Trending {
        /// Print the full classification as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the schedule and trending passes on their cron schedules
    Watch,
}

fn parse_checkpoint(raw: &str) -> Result<CheckpointHour, String> {
    let hours: i64 = raw
        .parse()
        .map_err(|e| format!("'{raw}' is not a number: {e}"))?;
    CheckpointHour::try_from(hours)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = trendscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Schedule {
            window_hours,
            dry_run,
        }) => commands::run_schedule(&config, window_hours, dry_run)?,
        Some(Commands::Cancel { video_id, hour }) => commands::run_cancel(&config, video_id, hour)?,
        Some(Commands::Tasks { video }) => commands::run_tasks(&config, video)?,
        Some(Commands::Capture {
            video_id,
            hour,
            views,
            likes,
            subscriptions,
            source,
        }) => {
            let counts = trendscope_core::SnapshotCounts {
                views,
                likes,
                subscriptions,
            };
            commands::run_capture(&config, video_id, hour, counts, &source)?;
        }
        Some(Commands::History { video_id }) => commands::run_history(&config, video_id)?,
        Some(Commands::Pattern { keywords, name }) => {
            commands::run_pattern(&config, &keywords, name.as_deref())?;
        }
        Some(Commands::Filter { title }) => commands::run_filter(&config, &title)?,
        Some(Commands::Trending { json }) => commands::run_trending(&config, json)?,
        Some(Commands::Watch) => {
            let mut scheduler = watch::build_scheduler(Arc::new(config)).await?;
            tracing::info!("watch: scheduler started; waiting for shutdown signal");
            watch::shutdown_signal().await;
            scheduler.shutdown().await?;
            tracing::info!("watch: scheduler stopped");
        }
        None => println!("no command given; see `trendscope --help`"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
