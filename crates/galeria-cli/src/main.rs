use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use galeria_core::calendar::CalendarIndex;
use galeria_infrastructure::{ConfigAuthProvider, ConfigService, backends};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Session;

#[derive(Parser)]
#[command(name = "galeria")]
#[command(about = "Galeria - media library, campaign and task calendar back office", long_about = None)]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage media-library images
    Image {
        #[command(subcommand)]
        action: commands::image::ImageAction,
    },
    /// Manage calendar tasks
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Manage flyers
    Flyer {
        #[command(subcommand)]
        action: commands::flyer::FlyerAction,
    },
    /// Manage campaigns
    Campaign {
        #[command(subcommand)]
        action: commands::campaign::CampaignAction,
    },
    /// Manage campaign segments
    Segment {
        #[command(subcommand)]
        action: commands::segment::SegmentAction,
    },
    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let loaded = config_service.get_config();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    if let Err(e) = &loaded {
        tracing::warn!("[Cli] Falling back to default config: {}", e);
    }
    tracing::debug!("[Cli] Media backend: {:?}", config.media.backend);

    if let Commands::Config = cli.command {
        return commands::show_config(&config_service, &config);
    }

    let documents = backends::document_store(&config).context("Failed to open document store")?;
    let media = backends::media_store(&config).context("Failed to open media store")?;
    let calendar = CalendarIndex::from_offset_minutes(config.calendar.utc_offset_minutes)
        .context("Invalid [calendar] utc_offset_minutes")?;
    let auth = ConfigAuthProvider::new(config.user.clone());

    let session = Session::open(documents, media, auth, calendar).await?;

    match cli.command {
        Commands::Image { action } => commands::image::run(&session, action).await,
        Commands::Task { action } => commands::task::run(&session, action).await,
        Commands::Flyer { action } => commands::flyer::run(&session, action).await,
        Commands::Campaign { action } => commands::campaign::run(&session, action).await,
        Commands::Segment { action } => commands::segment::run(&session, action).await,
        Commands::Config => Ok(()),
    }
}
