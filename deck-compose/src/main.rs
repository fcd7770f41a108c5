//! deck-compose - Compose one post for several channels and save it

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::Parser;
use libpostdeck::composer::ScheduleField;
use libpostdeck::logging::LoggingConfig;
use libpostdeck::media_source::{MediaSource, MockMediaSource};
use libpostdeck::service::CaptionReport;
use libpostdeck::sinks::console::ConsoleSink;
use libpostdeck::types::{Post, PostMode};
use libpostdeck::{
    Composer, Config, PlatformCatalog, PostAssembler, PostStatus, PostdeckError, Result,
};
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(name = "deck-compose")]
#[command(version)]
#[command(about = "Compose one post for several channels and save it")]
#[command(long_about = "\
deck-compose - Compose one post for several channels and save it

DESCRIPTION:
    deck-compose builds a single post from a master caption and a shared
    media library, lets you override captions per channel, schedule each
    channel, and set platform options. The assembled post is handed to a
    console sink that simulates a save.

USAGE EXAMPLES:
    # Draft for two channels
    deck-compose \"New menu is out\" --channel instagram:Reel --channel x

    # Three mock uploads, a custom TikTok caption, scheduled
    deck-compose \"Weekend sale\" --media 3 --channel instagram --channel tiktok \\
        --caption-for tiktok=\"Sale on now\" \\
        --schedule instagram=2024-06-01T09:00 --action schedule

    # Platform options and JSON output
    deck-compose \"Behind the scenes\" --channel youtube:Short \\
        --option youtube.visibility=Unlisted --format json

    # Available platforms and their post types
    deck-compose --list-platforms

CONFIGURATION:
    Configuration file: ~/.config/postdeck/config.toml

    Override with environment variables:
        POSTDECK_CONFIG      - Path to config file
        POSTDECK_LOG_FORMAT  - text, json or pretty
        POSTDECK_LOG_LEVEL   - error, warn, info, debug or trace

EXIT CODES:
    0 - Success
    1 - Save or configuration failed
    3 - Invalid input or incomplete post
")]
struct Cli {
    /// Master caption shared by every channel
    caption: Option<String>,

    /// Channel to post to, as id or id:post_type (repeatable)
    #[arg(short, long = "channel", value_name = "ID[:TYPE]")]
    channels: Vec<String>,

    /// Number of mock media uploads added to the library
    #[arg(short, long, default_value_t = 0)]
    media: usize,

    /// Caption for one channel, as id=text (repeatable)
    #[arg(long = "caption-for", value_name = "ID=TEXT")]
    caption_for: Vec<String>,

    /// Copy this channel's caption to every channel
    #[arg(long = "apply-all", value_name = "ID")]
    apply_all: Option<String>,

    /// Schedule a channel, as id=YYYY-MM-DD[THH:MM] (repeatable)
    #[arg(long = "schedule", value_name = "ID=DATE")]
    schedules: Vec<String>,

    /// Send a channel as a reminder instead of posting it (repeatable)
    #[arg(long = "reminder", value_name = "ID")]
    reminders: Vec<String>,

    /// Platform option, as id.field=value (repeatable)
    #[arg(short, long = "option", value_name = "ID.FIELD=VALUE")]
    options: Vec<String>,

    /// Start channels with an empty media selection
    #[arg(long)]
    separate: bool,

    /// What to do with the post: draft, schedule or publish
    #[arg(short, long, default_value = "draft")]
    action: String,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: String,

    /// List available platforms and exit
    #[arg(long)]
    list_platforms: bool,

    /// Path to config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = OutputFormat::parse(&cli.format)?;

    if cli.list_platforms {
        output_platforms(&PlatformCatalog::builtin(), format);
        return Ok(());
    }

    let status: PostStatus = cli.action.parse().map_err(PostdeckError::InvalidInput)?;

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    debug!(?config, "loaded configuration");

    let composer = compose(&cli, &config)?;
    let report = CaptionReport::for_composer(&composer);
    for channel in &report.channels {
        for warning in &channel.warnings {
            warn!(platform = %channel.platform_id, "{}", warning);
        }
    }

    let mut assembler = PostAssembler::new(composer);
    let sink = ConsoleSink::new(config.sink.delay());
    let post = assembler.commit(status, &sink).await?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "post": post,
                "caption_report": report,
            });
            println!("{:#}", output);
        }
        OutputFormat::Text => output_post_text(&post, &assembler, &report),
    }
    Ok(())
}

/// Apply the command line to a fresh composer, in the order a user would
fn compose(cli: &Cli, config: &Config) -> Result<Composer> {
    let mut composer = Composer::new(PlatformCatalog::builtin(), config.composer.clone());

    if let Some(caption) = &cli.caption {
        composer.set_master_caption(caption.as_str());
    }
    if cli.media > 0 {
        let items = MockMediaSource::new().random_items(cli.media);
        let accepted = composer.add_master_media(items);
        if accepted < cli.media {
            warn!(
                requested = cli.media,
                accepted, "media library is full, some uploads were skipped"
            );
        }
    }
    composer.set_channels_separated(cli.separate);

    for raw in &cli.channels {
        let (platform_id, post_type) = match raw.split_once(':') {
            Some((id, post_type)) => (id, Some(post_type.to_string())),
            None => (raw.as_str(), None),
        };
        if !composer.add_channel(platform_id, post_type)? {
            warn!(platform = platform_id, "channel listed twice, keeping the first");
        }
    }

    for raw in &cli.caption_for {
        let (platform_id, text) = split_assignment(raw, "--caption-for")?;
        composer.edit_channel_caption(platform_id, text)?;
    }

    if let Some(source) = &cli.apply_all {
        composer.apply_caption_to_all(source)?;
    }

    for raw in &cli.schedules {
        let (platform_id, when) = split_assignment(raw, "--schedule")?;
        let (date, time) = parse_schedule(when)?;
        composer.set_schedule_field(platform_id, ScheduleField::Date(Some(date)))?;
        if let Some(time) = time {
            composer.set_schedule_field(platform_id, ScheduleField::Time(time))?;
        }
    }

    for platform_id in &cli.reminders {
        composer.set_schedule_field(platform_id, ScheduleField::Mode(PostMode::ReminderOnly))?;
    }

    for raw in &cli.options {
        let (target, value) = split_assignment(raw, "--option")?;
        let (platform_id, field_id) = target.split_once('.').ok_or_else(|| {
            PostdeckError::InvalidInput(format!(
                "Invalid --option '{}'. Expected id.field=value",
                raw
            ))
        })?;
        composer.set_option_from_str(platform_id, field_id, value)?;
    }

    Ok(composer)
}

fn split_assignment<'a>(raw: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    raw.split_once('=').ok_or_else(|| {
        PostdeckError::InvalidInput(format!("Invalid {} '{}'. Expected id=value", flag, raw))
    })
}

/// Parse `YYYY-MM-DD` with an optional `THH:MM`
fn parse_schedule(raw: &str) -> Result<(NaiveDate, Option<NaiveTime>)> {
    let invalid = || {
        PostdeckError::InvalidInput(format!(
            "Invalid schedule '{}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM",
            raw
        ))
    };

    let (date, time) = match raw.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (raw, None),
    };
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
    let time = time
        .map(|t| NaiveTime::parse_from_str(t, "%H:%M"))
        .transpose()
        .map_err(|_| invalid())?;
    Ok((date, time))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(PostdeckError::InvalidInput(format!(
                "Invalid format '{}'. Must be 'text' or 'json'",
                raw
            ))),
        }
    }
}

fn completion_message(status: PostStatus) -> &'static str {
    match status {
        PostStatus::Draft => "Draft saved",
        PostStatus::Scheduled => "Post scheduled",
        PostStatus::Published => "Post published",
    }
}

fn output_post_text(post: &Post, assembler: &PostAssembler, report: &CaptionReport) {
    let composer = assembler.composer();
    println!("{}: {}", completion_message(post.status), post.id);

    for channel in &post.channels {
        let name = match &channel.post_type {
            Some(post_type) => format!("{} ({})", channel.platform_id, post_type),
            None => channel.platform_id.clone(),
        };
        let when = match channel.scheduling.date {
            Some(date) => {
                let mode = match composer.effective_mode(&channel.platform_id) {
                    Some(PostMode::ReminderOnly) => "reminder",
                    _ => "auto-post",
                };
                format!(
                    "{} {} {}",
                    date,
                    composer.schedule().effective_time(&channel.platform_id).format("%H:%M"),
                    mode
                )
            }
            None => "unscheduled".to_string(),
        };
        let count = report
            .channel(&channel.platform_id)
            .map(|c| format!("{}/{}", c.char_count, report.soft_limit))
            .unwrap_or_default();

        println!(
            "  {} | {} | {} chars | {} media | {}",
            name,
            truncate_caption(&channel.resolved_caption, 40),
            count,
            channel.resolved_media.len(),
            when
        );
    }
}

/// Truncate on a character boundary with an ellipsis
fn truncate_caption(caption: &str, max_chars: usize) -> String {
    let single_line = caption.replace('\n', " ");
    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let cut: String = single_line.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

fn output_platforms(catalog: &PlatformCatalog, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{:#}", serde_json::json!(catalog.platforms()));
        }
        OutputFormat::Text => {
            for platform in catalog.platforms() {
                let status = if platform.is_connected() {
                    "connected"
                } else {
                    "not connected"
                };
                let post_types = if platform.supported_post_types.is_empty() {
                    "-".to_string()
                } else {
                    platform.supported_post_types.join(", ")
                };
                println!(
                    "{:<16} {:<18} {:<14} {}",
                    platform.id, platform.display_name, status, post_types
                );
            }
        }
    }
}
