use super::*;

const VIDEO: &str = "6a1f0c3e-0000-4000-8000-000000000001";

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["trendscope"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_schedule_defaults() {
    let cli = Cli::try_parse_from(["trendscope", "schedule"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Schedule {
            window_hours: None,
            dry_run: false
        })
    ));
}

#[test]
fn parses_schedule_with_window_and_dry_run() {
    let cli = Cli::try_parse_from(["trendscope", "schedule", "--window-hours", "48", "--dry-run"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Schedule {
            window_hours: Some(48),
            dry_run: true
        })
    ));
}

#[test]
fn schedule_window_out_of_range_is_rejected() {
    assert!(Cli::try_parse_from(["trendscope", "schedule", "--window-hours", "0"]).is_err());
    assert!(Cli::try_parse_from(["trendscope", "schedule", "--window-hours", "169"]).is_err());
}

#[test]
fn parses_cancel_all_checkpoints() {
    let cli = Cli::try_parse_from(["trendscope", "cancel", VIDEO]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Cancel { video_id, hour: None }) if video_id.to_string() == VIDEO
    ));
}

#[test]
fn parses_cancel_single_checkpoint() {
    let cli = Cli::try_parse_from(["trendscope", "cancel", VIDEO, "--hour", "24"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Cancel {
            hour: Some(CheckpointHour::H24),
            ..
        })
    ));
}

#[test]
fn cancel_rejects_unknown_checkpoint() {
    assert!(Cli::try_parse_from(["trendscope", "cancel", VIDEO, "--hour", "5"]).is_err());
}

#[test]
fn cancel_rejects_malformed_video_id() {
    assert!(Cli::try_parse_from(["trendscope", "cancel", "not-a-uuid"]).is_err());
}

#[test]
fn parses_capture_with_defaults() {
    let cli =
        Cli::try_parse_from(["trendscope", "capture", VIDEO, "3", "--views", "1200"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Capture {
            hour: CheckpointHour::H3,
            views: 1200,
            likes: 0,
            subscriptions: 0,
            ref source,
            ..
        }) if source == "manual"
    ));
}

#[test]
fn capture_requires_views() {
    assert!(Cli::try_parse_from(["trendscope", "capture", VIDEO, "3"]).is_err());
}

#[test]
fn parses_pattern_keywords() {
    let cli = Cli::try_parse_from(["trendscope", "pattern", "Next.js", "React"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Pattern { ref keywords, name: None }) if keywords == &["Next.js", "React"]
    ));
}

#[test]
fn pattern_name_conflicts_with_keywords() {
    assert!(Cli::try_parse_from(["trendscope", "pattern", "React", "--name", "Next.js"]).is_err());
}

#[test]
fn parses_filter_title() {
    let cli = Cli::try_parse_from(["trendscope", "filter", "Rust in 100 seconds"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Filter { ref title }) if title == "Rust in 100 seconds"
    ));
}

#[test]
fn parses_trending_json() {
    let cli = Cli::try_parse_from(["trendscope", "trending", "--json"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Trending { json: true })));
}

#[test]
fn parses_tasks_and_watch() {
    let cli = Cli::try_parse_from(["trendscope", "tasks", "--video", VIDEO]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Tasks { video: Some(_) })));

    let cli = Cli::try_parse_from(["trendscope", "watch"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Watch)));
}

#[test]
fn parse_checkpoint_reports_bad_input() {
    assert!(parse_checkpoint("abc").unwrap_err().contains("not a number"));
    assert!(parse_checkpoint("7").is_err());
    assert_eq!(parse_checkpoint("168").unwrap(), CheckpointHour::H168);
}
