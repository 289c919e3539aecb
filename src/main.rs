#![forbid(unsafe_code)]

//! `skilltrail` command-line front end for the learning roadmap store.
//!
//! Loads configuration, opens the local store, and runs a single command
//! against it. Logs go to stderr so command output stays pipeable.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use skilltrail::models::profile::{Depth, UserPreferences, VideoLength};
use skilltrail::models::roadmap::{PointLevel, Roadmap};
use skilltrail::{AppError, AppState, GlobalConfig, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "skilltrail", about = "Learning roadmap tracker", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the database file from the configuration.
    #[arg(long)]
    database: Option<PathBuf>,

    /// Use the built-in mock generator instead of the backend.
    #[arg(long)]
    offline: bool,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a roadmap for a topic and make it active.
    Generate {
        /// Topic to learn.
        topic: String,
    },
    /// List every stored roadmap.
    List,
    /// Print a roadmap as JSON.
    Show {
        /// Roadmap ID.
        id: String,
    },
    /// Print the active roadmap.
    Active,
    /// Make a stored roadmap the active one.
    Activate {
        /// Roadmap ID.
        id: String,
    },
    /// Clear the active roadmap pointer.
    Deactivate,
    /// Mark a point complete (or incomplete with `--undo`).
    Complete {
        /// Roadmap ID.
        roadmap_id: String,
        /// Point ID.
        point_id: String,
        /// Mark the point incomplete instead.
        #[arg(long)]
        undo: bool,
    },
    /// Show a point's playlist, generating it on first use.
    Playlists {
        /// Roadmap ID.
        roadmap_id: String,
        /// Point ID.
        point_id: String,
        /// Ask the generator again even if already loaded.
        #[arg(long)]
        regenerate: bool,
    },
    /// Search roadmaps by topic, title, or description.
    Search {
        /// Case-insensitive search text.
        query: String,
    },
    /// List the active roadmap's points at a difficulty level.
    Level {
        /// beginner, intermediate, or advanced.
        level: String,
    },
    /// Delete a roadmap.
    Delete {
        /// Roadmap ID.
        id: String,
    },
    /// Show aggregate learning statistics.
    Stats,
    /// Show or update the user profile.
    Profile {
        /// New display name.
        #[arg(long)]
        name: Option<String>,
        /// Roadmap depth: fast, balanced, or detailed.
        #[arg(long)]
        depth: Option<String>,
        /// Video length: short, medium, or long.
        #[arg(long)]
        video_length: Option<String>,
    },
    /// Delete all roadmaps and the user profile.
    Reset,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    if let Some(database) = args.database {
        config.database_path = database;
    }
    info!("configuration loaded");

    let state = AppState::connect(config, args.offline).await?;
    execute(&state, args.command).await
}

async fn execute(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Generate { topic } => {
            let roadmap = state.generate_new_roadmap(&topic).await?;
            print_roadmap_detail(&roadmap);
        }
        Command::List => {
            let active_id = state.roadmaps.get_active_roadmap().await?.map(|r| r.id);
            for roadmap in state.roadmaps.get_all_roadmaps().await {
                let marker = if active_id.as_deref() == Some(roadmap.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                print_roadmap_line(marker, &roadmap);
            }
        }
        Command::Show { id } => {
            let roadmap = state
                .roadmaps
                .get_roadmap_by_id(&id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("roadmap {id}")))?;
            let json = serde_json::to_string_pretty(&roadmap)
                .map_err(|err| AppError::Io(format!("failed to render roadmap: {err}")))?;
            println!("{json}");
        }
        Command::Active => match state.roadmaps.get_active_roadmap().await? {
            Some(roadmap) => print_roadmap_detail(&roadmap),
            None => println!("no active roadmap"),
        },
        Command::Activate { id } => {
            let roadmap = state
                .roadmaps
                .get_roadmap_by_id(&id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("roadmap {id}")))?;
            state.roadmaps.set_active_roadmap(&roadmap).await?;
            print_roadmap_line("*", &roadmap);
        }
        Command::Deactivate => state.roadmaps.clear_active_roadmap().await?,
        Command::Complete {
            roadmap_id,
            point_id,
            undo,
        } => {
            let roadmap = state
                .roadmaps
                .update_roadmap_progress(&roadmap_id, &point_id, !undo)
                .await?;
            print_roadmap_detail(&roadmap);
        }
        Command::Playlists {
            roadmap_id,
            point_id,
            regenerate,
        } => show_playlists(state, &roadmap_id, &point_id, regenerate).await?,
        Command::Search { query } => {
            for roadmap in state.roadmaps.search_roadmaps(&query).await {
                print_roadmap_line(" ", &roadmap);
            }
        }
        Command::Level { level } => {
            let level: PointLevel = level.parse()?;
            for point in state.roadmaps.get_points_by_level(level).await? {
                let check = if point.is_completed { "x" } else { " " };
                println!("[{check}] {}. {} ({})", point.order, point.title, point.id);
            }
        }
        Command::Delete { id } => state.roadmaps.delete_roadmap(&id).await?,
        Command::Stats => {
            let stats = state.roadmaps.learning_stats().await?;
            println!("roadmaps:        {}", stats.total_roadmaps);
            println!("points done:     {}/{}", stats.completed_points, stats.total_points);
            println!("active progress: {}%", stats.active_roadmap_progress);
        }
        Command::Profile {
            name,
            depth,
            video_length,
        } => update_profile(state, name, depth.as_deref(), video_length.as_deref()).await?,
        Command::Reset => state.reset().await?,
    }
    Ok(())
}

async fn show_playlists(
    state: &AppState,
    roadmap_id: &str,
    point_id: &str,
    regenerate: bool,
) -> Result<()> {
    let roadmap = state
        .roadmaps
        .get_roadmap_by_id(roadmap_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("roadmap {roadmap_id}")))?;
    let point_title = roadmap
        .point(point_id)
        .map(|point| point.title.clone())
        .ok_or_else(|| AppError::NotFound(format!("point {point_id}")))?;

    let items = if regenerate {
        state
            .playlists
            .regenerate_playlists_for_point(roadmap_id, point_id, &roadmap.topic, &point_title)
            .await?
    } else {
        state
            .playlists
            .load_playlists_for_point(roadmap_id, point_id, &roadmap.topic, &point_title)
            .await?
    };

    if items.is_empty() {
        println!("no videos for {point_title}");
    }
    for item in items {
        let duration = item.duration.as_deref().unwrap_or("--:--");
        println!("{duration:>8}  {}  {}", item.title, item.video_url);
    }
    Ok(())
}

async fn update_profile(
    state: &AppState,
    name: Option<String>,
    depth: Option<&str>,
    video_length: Option<&str>,
) -> Result<()> {
    if let Some(name) = name {
        state.profiles.set_user_name(&name).await?;
    }
    if depth.is_some() || video_length.is_some() {
        let current = state.profiles.get_preferences().await?;
        let preferences = UserPreferences {
            depth: depth
                .map(str::parse::<Depth>)
                .transpose()?
                .unwrap_or(current.depth),
            video_length: video_length
                .map(str::parse::<VideoLength>)
                .transpose()?
                .unwrap_or(current.video_length),
        };
        state.profiles.set_preferences(preferences).await?;
    }

    let profile = state.profiles.get_profile().await?;
    println!("name:         {}", profile.name);
    println!("depth:        {:?}", profile.preferences.depth);
    println!("video length: {:?}", profile.preferences.video_length);
    Ok(())
}

fn print_roadmap_line(marker: &str, roadmap: &Roadmap) {
    let percentage = roadmap.progress.map_or(0, |p| p.percentage);
    println!("{marker} {}  {:>3}%  {}", roadmap.id, percentage, roadmap.title);
}

fn print_roadmap_detail(roadmap: &Roadmap) {
    print_roadmap_line(" ", roadmap);
    for point in &roadmap.points {
        let check = if point.is_completed { "x" } else { " " };
        println!(
            "    [{check}] {}. {} ({}, {})",
            point.order, point.title, point.level, point.id
        );
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
