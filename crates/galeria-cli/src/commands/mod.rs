//! Subcommand implementations. Each module renders one collection.

pub mod campaign;
pub mod flyer;
pub mod image;
pub mod segment;
pub mod task;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use galeria_application::{GaleriaServices, Mutation, StoreEvent};
use galeria_core::calendar::CalendarIndex;
use galeria_core::config::AppConfig;
use galeria_core::history::{ChangeRecord, HistoryEntry, IMAGES_FIELD, ImageChangeKind};
use galeria_core::repository::{DocumentStore, MediaStore, MediaUpload};
use galeria_core::timestamp::parse_lenient;
use galeria_core::user::{Actor, AuthProvider};
use galeria_core::{Entity, EntityId};
use galeria_infrastructure::{ConfigAuthProvider, ConfigService};

/// Opened services for one command invocation.
pub struct Session {
    pub services: GaleriaServices,
}

impl Session {
    pub async fn open(
        documents: Arc<dyn DocumentStore>,
        media: Arc<dyn MediaStore>,
        auth: ConfigAuthProvider,
        calendar: CalendarIndex,
    ) -> Result<Self> {
        let auth: Arc<dyn AuthProvider> = Arc::new(auth);
        let services = GaleriaServices::open(documents, media, auth, calendar)
            .await
            .context("Failed to load collections")?;
        services.subscribe(Arc::new(report_failures));
        Ok(Self { services })
    }

    fn actor(&self) -> Result<Actor> {
        self.services
            .actor()
            .context("No user configured; set [user] email in the config file")
    }

    /// Fails unless the acting user may create and edit records.
    pub fn require_edit(&self) -> Result<String> {
        let actor = self.actor()?;
        if !actor.role.can_edit() {
            bail!("Role '{}' cannot modify records", actor.role.as_str());
        }
        Ok(actor.author_label())
    }

    /// Fails unless the acting user may destroy records permanently.
    pub fn require_destroy(&self) -> Result<()> {
        let actor = self.actor()?;
        if !actor.role.can_destroy() {
            bail!("Role '{}' cannot destroy records", actor.role.as_str());
        }
        Ok(())
    }
}

/// Local changes survive failed writes, so the user is told about them.
fn report_failures(event: &StoreEvent) {
    if !event.is_failure() {
        return;
    }
    match event {
        StoreEvent::PersistFailed { message, .. } => {
            eprintln!("warning: '{}' was not saved: {}", event.collection(), message)
        }
        StoreEvent::RemoteAssetFailed { id, message, .. } => {
            eprintln!(
                "warning: files of {} {} were not deleted: {}",
                event.collection(),
                id,
                message
            )
        }
        _ => {}
    }
}

pub fn show_config(service: &ConfigService, config: &AppConfig) -> Result<()> {
    let path = service.config_path()?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Reads `path` into an upload named after the file.
pub fn read_upload(path: &std::path::Path) -> Result<MediaUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(MediaUpload::new(name, bytes))
}

/// Parses a calendar date (`YYYY-MM-DD`) or a full timestamp.
pub fn parse_date(text: &str) -> Result<DateTime<Utc>> {
    parse_lenient(text).with_context(|| format!("Unrecognised date '{}'", text))
}

/// Parses `YYYY-MM-DD` for calendar lookups.
pub fn parse_day(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .with_context(|| format!("Expected YYYY-MM-DD, got '{}'", text))
}

pub fn report<E: Entity>(mutation: Mutation<E>, verb: &str) {
    match mutation {
        Mutation::Applied(entity) => println!("{} {} {}", verb, E::KIND, entity.id()),
        Mutation::Unchanged => println!("No changes"),
    }
}

pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("(no history)");
        return;
    }
    for entry in entries {
        println!(
            "#{} {} - {} ({})",
            entry.id,
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.title,
            entry.author
        );
        if !entry.summary.is_empty() {
            println!("    {}", entry.summary);
        }
        for change in &entry.changes {
            match change {
                ChangeRecord::Field {
                    field,
                    before,
                    after,
                } => println!("    {}: {} -> {}", field, before, after),
                ChangeRecord::Images { kind, image_ids } => {
                    let verb = match kind {
                        ImageChangeKind::Added => "agregadas",
                        ImageChangeKind::Removed => "eliminadas",
                    };
                    println!("    {} {}: {}", IMAGES_FIELD, verb, join_ids(image_ids))
                }
            }
        }
        if let Some(url) = &entry.url {
            println!("    url: {}", url);
        }
    }
}

pub fn join_ids(ids: &[EntityId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Marker column for list output.
pub fn status_marker<E: Entity>(entity: &E) -> &'static str {
    if entity.is_removed() { "x" } else { " " }
}
